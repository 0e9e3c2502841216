//! Fire-and-forget product analytics.
//!
//! Capturing an event never blocks the caller and never reports failure back
//! to it; delivery problems are only logged.

use crate::config::{Config, PostHogConfig};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

pub trait EventSink: Send + Sync {
    fn capture(&self, event: &str, properties: Value);
}

#[derive(Clone)]
pub struct Analytics {
    sink: Arc<dyn EventSink>,
}

impl Analytics {
    pub fn new(sink: impl EventSink + 'static) -> Self {
        Self {
            sink: Arc::new(sink),
        }
    }

    /// Logs events without sending them anywhere.
    pub fn disabled() -> Self {
        Self::new(LogSink)
    }

    pub fn from_config(config: &Config) -> Self {
        match &config.posthog {
            Some(posthog) => Self::new(PostHogSink::new(posthog, &config.session_id)),
            None => {
                debug!("no analytics key configured, events will only be logged");
                Self::disabled()
            }
        }
    }

    pub fn capture(&self, event: &str, properties: Value) {
        self.sink.capture(event, properties);
    }
}

pub struct LogSink;

impl EventSink for LogSink {
    fn capture(&self, event: &str, properties: Value) {
        debug!(event, %properties, "analytics event");
    }
}

/// Upper bound on one capture request, so a stalled endpoint cannot pile up
/// spawned tasks.
const CAPTURE_TIMEOUT: Duration = Duration::from_secs(10);

pub struct PostHogSink {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    distinct_id: String,
}

#[derive(Serialize)]
struct CapturePayload<'a> {
    api_key: &'a str,
    event: &'a str,
    distinct_id: &'a str,
    properties: Value,
}

impl PostHogSink {
    pub fn new(config: &PostHogConfig, distinct_id: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: format!("{}/capture/", config.host.trim_end_matches('/')),
            api_key: config.api_key.clone(),
            distinct_id: distinct_id.to_string(),
        }
    }
}

impl PostHogSink {
    fn request(&self, event: &str, properties: Value) -> reqwest::RequestBuilder {
        self.client
            .post(&self.endpoint)
            .timeout(CAPTURE_TIMEOUT)
            .json(&CapturePayload {
                api_key: &self.api_key,
                event,
                distinct_id: &self.distinct_id,
                properties,
            })
    }
}

impl EventSink for PostHogSink {
    fn capture(&self, event: &str, properties: Value) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!(event, "no runtime available, dropping analytics event");
            return;
        };

        let request = self.request(event, properties);
        let event = event.to_string();
        runtime.spawn(async move {
            match request.send().await {
                Ok(resp) if resp.status().is_success() => debug!(%event, "analytics event sent"),
                Ok(resp) => warn!(%event, status = %resp.status(), "analytics event rejected"),
                Err(err) => warn!(%event, "failed to send analytics event: {err}"),
            }
        });
    }
}
