use crate::models::PeriodResponse;
use chrono::{Datelike, Duration, Local, NaiveDate};

/// The Monday-to-Sunday week habits are scheduled against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Period {
    start: NaiveDate,
}

impl Period {
    pub fn current() -> Self {
        Self::containing(Local::now().date_naive())
    }

    pub fn containing(date: NaiveDate) -> Self {
        Self {
            start: week_start(date),
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.start + Duration::days(6)
    }

    pub fn week_number(&self) -> u32 {
        self.start.iso_week().week()
    }

    /// Store key, e.g. `2026-W42`.
    pub fn id(&self) -> String {
        let iso = self.start.iso_week();
        format!("{}-W{:02}", iso.year(), iso.week())
    }

    pub fn date_range_label(&self) -> String {
        format!(
            "{} - {}",
            self.start.format("%b %-d"),
            self.end().format("%b %-d, %Y")
        )
    }

    pub fn to_response(&self) -> PeriodResponse {
        PeriodResponse {
            id: self.id(),
            week_number: self.week_number(),
            label: self.date_range_label(),
            start_date: self.start.to_string(),
            end_date: self.end().to_string(),
        }
    }
}

fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}
