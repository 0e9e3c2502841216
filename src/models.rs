use crate::days::DaySet;
use crate::journey::Journey;
use crate::time_slot::{TimeSlot, parse_reminder_hour};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Stand-in for a missing day code; maps to no weekday.
pub const UNKNOWN_DAY_CODE: i32 = -1;

/// One stored (habit, day) assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HabitRecord {
    pub habit_name: String,
    /// 0 = Sunday through 6 = Saturday.
    #[serde(default = "unknown_day_code")]
    pub day_of_week: i32,
    #[serde(default)]
    pub reminder_time: Option<String>,
    #[serde(default)]
    pub timezone: String,
}

fn unknown_day_code() -> i32 {
    UNKNOWN_DAY_CODE
}

impl HabitRecord {
    pub fn reminder_hour(&self) -> Option<u8> {
        self.reminder_time.as_deref().and_then(parse_reminder_hour)
    }
}

/// Every day and the single time preference for one habit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HabitGroup {
    pub habit_name: String,
    #[serde(default)]
    pub days: DaySet,
    #[serde(default)]
    pub time_slot: TimeSlot,
}

impl HabitGroup {
    pub fn new(habit_name: impl Into<String>, days: DaySet, time_slot: TimeSlot) -> Self {
        Self {
            habit_name: habit_name.into(),
            days,
            time_slot,
        }
    }
}

/// Contents of the store file. Habit records are keyed by period id, journeys
/// by session id.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StoreData {
    #[serde(default)]
    pub periods: BTreeMap<String, Vec<HabitRecord>>,
    #[serde(default)]
    pub journeys: BTreeMap<String, Journey>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PeriodResponse {
    pub id: String,
    pub week_number: u32,
    pub label: String,
    pub start_date: String,
    pub end_date: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HabitGroupView {
    pub habit_name: String,
    pub days: DaySet,
    pub days_display: String,
    pub time_slot: TimeSlot,
    pub time_label: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HabitsResponse {
    pub period: PeriodResponse,
    pub habits: Vec<HabitGroupView>,
}

#[derive(Debug, Deserialize)]
pub struct SaveHabitsRequest {
    pub habits: Vec<HabitGroup>,
}

#[derive(Debug, Deserialize)]
pub struct InsertRecordsRequest {
    pub records: Vec<HabitRecord>,
}

#[derive(Debug, Deserialize)]
pub struct FormatQuery {
    #[serde(default)]
    pub days: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FormatResponse {
    pub days_display: String,
}

#[derive(Debug, Deserialize)]
pub struct SaveJourneyRequest {
    #[serde(default)]
    pub form_data: Value,
    pub current_step: String,
}
