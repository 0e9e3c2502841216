use chrono::Weekday;
use serde::{Deserialize, Serialize};

/// Display order, Monday first.
pub const WEEK_ORDER: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown day name: {0}")]
pub struct UnknownDay(pub String);

pub trait DayNames {
    fn full_name(&self) -> &'static str;
    fn short_name(&self) -> &'static str;
    /// Storage code, 0 = Sunday through 6 = Saturday.
    fn storage_code(&self) -> u8;
}

impl DayNames for Weekday {
    fn full_name(&self) -> &'static str {
        match self {
            Weekday::Mon => "Monday",
            Weekday::Tue => "Tuesday",
            Weekday::Wed => "Wednesday",
            Weekday::Thu => "Thursday",
            Weekday::Fri => "Friday",
            Weekday::Sat => "Saturday",
            Weekday::Sun => "Sunday",
        }
    }

    fn short_name(&self) -> &'static str {
        match self {
            Weekday::Mon => "Mon",
            Weekday::Tue => "Tue",
            Weekday::Wed => "Wed",
            Weekday::Thu => "Thu",
            Weekday::Fri => "Fri",
            Weekday::Sat => "Sat",
            Weekday::Sun => "Sun",
        }
    }

    fn storage_code(&self) -> u8 {
        self.num_days_from_sunday() as u8
    }
}

/// Inverse of [`DayNames::storage_code`]. Codes outside 0..=6 have no day.
pub fn weekday_from_code(code: i32) -> Option<Weekday> {
    match code {
        0 => Some(Weekday::Sun),
        1 => Some(Weekday::Mon),
        2 => Some(Weekday::Tue),
        3 => Some(Weekday::Wed),
        4 => Some(Weekday::Thu),
        5 => Some(Weekday::Fri),
        6 => Some(Weekday::Sat),
        _ => None,
    }
}

/// Parses a full or three-letter day name, ignoring case and surrounding space.
pub fn weekday_from_name(name: &str) -> Option<Weekday> {
    match name.trim().to_lowercase().as_str() {
        "monday" | "mon" => Some(Weekday::Mon),
        "tuesday" | "tue" => Some(Weekday::Tue),
        "wednesday" | "wed" => Some(Weekday::Wed),
        "thursday" | "thu" => Some(Weekday::Thu),
        "friday" | "fri" => Some(Weekday::Fri),
        "saturday" | "sat" => Some(Weekday::Sat),
        "sunday" | "sun" => Some(Weekday::Sun),
        _ => None,
    }
}

/// Maps a three-letter day name to its full name. Anything else is returned
/// unchanged.
pub fn short_to_full(token: &str) -> &str {
    WEEK_ORDER
        .iter()
        .find(|day| day.short_name() == token)
        .map(|day| day.full_name())
        .unwrap_or(token)
}

pub fn convert_short_to_full_days<S: AsRef<str>>(short_days: &[S]) -> Vec<String> {
    short_days
        .iter()
        .map(|day| short_to_full(day.as_ref()).to_string())
        .collect()
}

/// A set of weekdays, one bit per day in Monday-first order.
///
/// Iteration always yields days Monday through Sunday regardless of the
/// order they were inserted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "Vec<String>", try_from = "Vec<String>")]
pub struct DaySet(u8);

impl DaySet {
    pub const EMPTY: DaySet = DaySet(0);
    pub const WEEKDAYS: DaySet = DaySet(0b001_1111);
    pub const WEEKEND: DaySet = DaySet(0b110_0000);
    pub const EVERY_DAY: DaySet = DaySet(0b111_1111);

    fn bit(day: Weekday) -> u8 {
        1 << day.num_days_from_monday()
    }

    pub fn contains(self, day: Weekday) -> bool {
        self.0 & Self::bit(day) != 0
    }

    /// Returns `true` if the day was not already present.
    pub fn insert(&mut self, day: Weekday) -> bool {
        let added = !self.contains(day);
        self.0 |= Self::bit(day);
        added
    }

    /// Returns `true` if the day was present.
    pub fn remove(&mut self, day: Weekday) -> bool {
        let removed = self.contains(day);
        self.0 &= !Self::bit(day);
        removed
    }

    /// Flips membership of `day` and reports whether it is now selected.
    pub fn toggle(&mut self, day: Weekday) -> bool {
        self.0 ^= Self::bit(day);
        self.contains(day)
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn intersection(self, other: DaySet) -> DaySet {
        DaySet(self.0 & other.0)
    }

    pub fn iter(self) -> impl Iterator<Item = Weekday> {
        WEEK_ORDER.into_iter().filter(move |day| self.contains(*day))
    }
}

impl FromIterator<Weekday> for DaySet {
    fn from_iter<I: IntoIterator<Item = Weekday>>(iter: I) -> Self {
        let mut set = DaySet::EMPTY;
        set.extend(iter);
        set
    }
}

impl Extend<Weekday> for DaySet {
    fn extend<I: IntoIterator<Item = Weekday>>(&mut self, iter: I) {
        for day in iter {
            self.insert(day);
        }
    }
}

impl From<DaySet> for Vec<String> {
    fn from(set: DaySet) -> Self {
        set.iter().map(|day| day.full_name().to_string()).collect()
    }
}

impl TryFrom<Vec<String>> for DaySet {
    type Error = UnknownDay;

    fn try_from(names: Vec<String>) -> Result<Self, Self::Error> {
        names
            .iter()
            .map(|name| weekday_from_name(name).ok_or_else(|| UnknownDay(name.clone())))
            .collect()
    }
}
