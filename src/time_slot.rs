use serde::{Deserialize, Serialize};

/// Time-of-day bucket offered in place of an exact clock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TimeSlot {
    EarlyMorning,
    #[default]
    MidMorning,
    Lunch,
    EarlyAfternoon,
    Afternoon,
    AfterWork,
    Bedtime,
}

impl TimeSlot {
    pub const ALL: [TimeSlot; 7] = [
        TimeSlot::EarlyMorning,
        TimeSlot::MidMorning,
        TimeSlot::Lunch,
        TimeSlot::EarlyAfternoon,
        TimeSlot::Afternoon,
        TimeSlot::AfterWork,
        TimeSlot::Bedtime,
    ];

    pub fn label(self) -> &'static str {
        match self {
            TimeSlot::EarlyMorning => "Early Morning (6-8am)",
            TimeSlot::MidMorning => "Mid-Morning (8-10am)",
            TimeSlot::Lunch => "Lunch Time (12-1pm)",
            TimeSlot::EarlyAfternoon => "Early Afternoon (1-3pm)",
            TimeSlot::Afternoon => "Afternoon (3-5pm)",
            TimeSlot::AfterWork => "After Work (5-7pm)",
            TimeSlot::Bedtime => "Before Bedtime (9-10pm)",
        }
    }

    /// Canonical hour of day, used when storing a reminder.
    pub fn hour(self) -> u8 {
        match self {
            TimeSlot::EarlyMorning => 7,
            TimeSlot::MidMorning => 9,
            TimeSlot::Lunch => 12,
            TimeSlot::EarlyAfternoon => 14,
            TimeSlot::Afternoon => 16,
            TimeSlot::AfterWork => 18,
            TimeSlot::Bedtime => 21,
        }
    }

    /// Exact match on the canonical hour only.
    pub fn from_hour(hour: u8) -> Option<TimeSlot> {
        Self::ALL.into_iter().find(|slot| slot.hour() == hour)
    }

    pub fn reminder_time(self) -> String {
        format!("{:02}:00:00", self.hour())
    }
}

/// Reads the hour from an `HH:MM[:SS]` reminder time.
pub fn parse_reminder_hour(time: &str) -> Option<u8> {
    let hours = time.split(':').next()?.trim();
    hours.parse::<u8>().ok().filter(|hour| *hour < 24)
}
