use crate::analytics::Analytics;
use crate::config::Config;
use crate::save::SaveOptions;
use crate::storage::FileStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: FileStore,
    pub analytics: Analytics,
}

impl AppState {
    pub fn new(config: Config, store: FileStore, analytics: Analytics) -> Self {
        Self {
            config: Arc::new(config),
            store,
            analytics,
        }
    }

    pub fn save_options(&self) -> SaveOptions {
        SaveOptions {
            timezone: self.config.timezone.clone(),
            timeout: self.config.store_timeout,
        }
    }
}
