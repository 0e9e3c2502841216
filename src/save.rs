use crate::analytics::Analytics;
use crate::errors::{SaveError, StoreError};
use crate::models::HabitRecord;
use crate::reconcile::{HabitSchedule, expand_for_persistence, group_for_editing};
use crate::storage::HabitStore;
use serde_json::json;
use std::future::Future;
use std::time::Duration;
use tracing::{info, warn};

/// Replace attempts before a save is reported as failed.
const REPLACE_ATTEMPTS: usize = 2;

#[derive(Debug, Clone)]
pub struct SaveOptions {
    pub timezone: String,
    pub timeout: Duration,
}

pub async fn load_schedule<S: HabitStore>(
    store: &S,
    period: &str,
    timeout: Duration,
) -> Result<HabitSchedule, StoreError> {
    let records = with_timeout("list records", timeout, store.list_records(period)).await?;
    Ok(group_for_editing(&records))
}

/// Writes `schedule` as the complete set of records for `period` and returns
/// the schedule as read back from the store.
///
/// Habits with no selected days are not written, so they are absent from the
/// returned schedule.
pub async fn save_schedule<S: HabitStore>(
    store: &S,
    period: &str,
    schedule: &HabitSchedule,
    options: &SaveOptions,
    analytics: &Analytics,
) -> Result<HabitSchedule, SaveError> {
    let records = expand_for_persistence(schedule, &options.timezone);
    let dropped: Vec<&str> = schedule
        .iter()
        .filter(|group| group.days.is_empty())
        .map(|group| group.habit_name.as_str())
        .collect();
    if !dropped.is_empty() {
        info!(period, ?dropped, "habits without days will not be stored");
    }

    let record_count = records.len();
    if let Err(source) = replace_with_retry(store, period, records, options.timeout).await {
        analytics.capture(
            "habits_save_failed",
            json!({ "period": period, "error": source.to_string() }),
        );
        return Err(SaveError::Persist {
            period: period.to_string(),
            source,
        });
    }

    let reloaded = load_schedule(store, period, options.timeout)
        .await
        .map_err(|source| SaveError::Reload {
            period: period.to_string(),
            source,
        })?;

    info!(period, records = record_count, habits = reloaded.len(), "saved habits");
    analytics.capture(
        "habits_saved",
        json!({ "period": period, "habits": reloaded.len(), "records": record_count }),
    );
    Ok(reloaded)
}

async fn replace_with_retry<S: HabitStore>(
    store: &S,
    period: &str,
    records: Vec<HabitRecord>,
    timeout: Duration,
) -> Result<(), StoreError> {
    let mut attempt = 1;
    loop {
        let result = with_timeout(
            "replace records",
            timeout,
            store.replace_records(period, records.clone()),
        )
        .await;
        match result {
            Ok(()) => return Ok(()),
            Err(err) if attempt < REPLACE_ATTEMPTS => {
                warn!(period, attempt, "replacing habit records failed, retrying: {err}");
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

pub(crate) async fn with_timeout<T>(
    operation: &'static str,
    timeout: Duration,
    fut: impl Future<Output = Result<T, StoreError>>,
) -> Result<T, StoreError> {
    tokio::time::timeout(timeout, fut)
        .await
        .map_err(|_| StoreError::TimedOut { operation })?
}
