//! Multi-step journey progress, one record per session.

use crate::analytics::Analytics;
use crate::errors::StoreError;
use crate::save::with_timeout;
use crate::storage::FileStore;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Journey {
    pub session_id: String,
    /// Form answers so far, stored as sent.
    #[serde(default)]
    pub form_data: Value,
    pub current_step: String,
    #[serde(default)]
    pub completed: bool,
    pub created_at: String,
    pub updated_at: String,
}

fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}

impl FileStore {
    pub async fn journey(&self, session_id: &str) -> Option<Journey> {
        self.read(|data| data.journeys.get(session_id).cloned()).await
    }

    /// Creates the session's journey or overwrites its form data and step.
    /// `completed` and `created_at` survive an overwrite.
    pub async fn upsert_journey(
        &self,
        session_id: &str,
        form_data: Value,
        current_step: &str,
    ) -> Result<Journey, StoreError> {
        let timestamp = now();
        self.update(|data| {
            let journey = data
                .journeys
                .entry(session_id.to_string())
                .or_insert_with(|| Journey {
                    session_id: session_id.to_string(),
                    form_data: Value::Null,
                    current_step: String::new(),
                    completed: false,
                    created_at: timestamp.clone(),
                    updated_at: timestamp.clone(),
                });
            journey.form_data = form_data;
            journey.current_step = current_step.to_string();
            journey.updated_at = timestamp;
            journey.clone()
        })
        .await
    }

    /// Returns `None` when the session has no journey; nothing is written then.
    pub async fn mark_journey_completed(
        &self,
        session_id: &str,
    ) -> Result<Option<Journey>, StoreError> {
        if self.journey(session_id).await.is_none() {
            return Ok(None);
        }
        let timestamp = now();
        self.update(|data| {
            data.journeys.get_mut(session_id).map(|journey| {
                journey.completed = true;
                journey.updated_at = timestamp;
                journey.clone()
            })
        })
        .await
    }

    pub async fn remove_journey(&self, session_id: &str) -> Result<bool, StoreError> {
        if self.journey(session_id).await.is_none() {
            return Ok(false);
        }
        self.update(|data| data.journeys.remove(session_id).is_some())
            .await
    }
}

pub async fn save_journey(
    store: &FileStore,
    session_id: &str,
    form_data: Value,
    current_step: &str,
    timeout: Duration,
    analytics: &Analytics,
) -> Result<Journey, StoreError> {
    let saved = with_timeout(
        "save journey",
        timeout,
        store.upsert_journey(session_id, form_data, current_step),
    )
    .await;

    match saved {
        Ok(journey) => {
            info!(session_id, step = current_step, "saved journey");
            analytics.capture("journey_saved", json!({ "step": current_step }));
            Ok(journey)
        }
        Err(err) => {
            warn!(session_id, "failed to save journey: {err}");
            analytics.capture("journey_save_failed", json!({ "error": err.to_string() }));
            Err(err)
        }
    }
}

/// A session without a journey is `Ok(None)`, not an error.
pub async fn load_journey(
    store: &FileStore,
    session_id: &str,
    timeout: Duration,
    analytics: &Analytics,
) -> Result<Option<Journey>, StoreError> {
    let journey = with_timeout("load journey", timeout, async {
        Ok(store.journey(session_id).await)
    })
    .await?;
    if journey.is_some() {
        analytics.capture("journey_loaded", Value::Null);
    }
    Ok(journey)
}

pub async fn complete_journey(
    store: &FileStore,
    session_id: &str,
    timeout: Duration,
    analytics: &Analytics,
) -> Result<Option<Journey>, StoreError> {
    let journey = with_timeout(
        "complete journey",
        timeout,
        store.mark_journey_completed(session_id),
    )
    .await?;
    if journey.is_some() {
        info!(session_id, "completed journey");
        analytics.capture("journey_completed", Value::Null);
    }
    Ok(journey)
}

/// Deleting a session with no journey succeeds.
pub async fn delete_journey(
    store: &FileStore,
    session_id: &str,
    timeout: Duration,
    analytics: &Analytics,
) -> Result<(), StoreError> {
    let removed = with_timeout("delete journey", timeout, store.remove_journey(session_id)).await?;
    info!(session_id, removed, "deleted journey");
    analytics.capture("journey_deleted", Value::Null);
    Ok(())
}
