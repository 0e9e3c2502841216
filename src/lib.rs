pub mod analytics;
pub mod app;
pub mod config;
pub mod days;
pub mod errors;
pub mod format;
pub mod handlers;
pub mod journey;
pub mod models;
pub mod period;
pub mod reconcile;
pub mod save;
pub mod session;
pub mod state;
pub mod storage;
pub mod time_slot;

pub use analytics::Analytics;
pub use app::router;
pub use config::Config;
pub use days::DaySet;
pub use format::{format_day_names, format_days};
pub use journey::Journey;
pub use reconcile::{HabitSchedule, expand_for_persistence, group_for_editing};
pub use state::AppState;
pub use storage::{FileStore, HabitStore};
pub use time_slot::TimeSlot;
