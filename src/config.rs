use chrono::Utc;
use std::{env, path::PathBuf, str::FromStr, time::Duration};
use tracing::warn;

pub const DEFAULT_TIMEZONE: &str = "America/Chicago";
pub const DEFAULT_POSTHOG_HOST: &str = "https://us.i.posthog.com";

#[derive(Debug, Clone)]
pub struct Config {
    pub data_path: PathBuf,
    pub port: u16,
    /// Written into every stored habit record.
    pub timezone: String,
    /// Anonymous identity used as the analytics distinct id.
    pub session_id: String,
    pub posthog: Option<PostHogConfig>,
    pub store_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct PostHogConfig {
    pub api_key: String,
    pub host: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let posthog = get("POSTHOG_API_KEY").map(|api_key| PostHogConfig {
            api_key,
            host: get("POSTHOG_HOST").unwrap_or_else(|| DEFAULT_POSTHOG_HOST.to_string()),
        });

        Self {
            data_path: get("APP_DATA_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("data/habits.json")),
            port: parse_or("PORT", get("PORT"), 8080),
            timezone: get("HABIT_TIMEZONE").unwrap_or_else(|| DEFAULT_TIMEZONE.to_string()),
            session_id: get("HABIT_SESSION_ID").unwrap_or_else(new_session_id),
            posthog,
            store_timeout: Duration::from_millis(parse_or(
                "STORE_TIMEOUT_MS",
                get("STORE_TIMEOUT_MS"),
                5000,
            )),
        }
    }
}

fn parse_or<T: FromStr>(key: &str, value: Option<String>, default: T) -> T {
    match value {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("ignoring invalid {key}={raw}");
            default
        }),
        None => default,
    }
}

fn new_session_id() -> String {
    format!(
        "session_{}_{}",
        Utc::now().timestamp_millis(),
        std::process::id()
    )
}
