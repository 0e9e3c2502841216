use crate::days::{DayNames, DaySet, short_to_full, weekday_from_name};
use tracing::debug;

pub const NOT_SET: &str = "Not set";

/// Renders a day selection as a short phrase such as "Weekdays" or
/// "Weekends and Monday".
pub fn format_days(days: DaySet) -> String {
    if days.is_empty() {
        return NOT_SET.to_string();
    }

    let week_days = days.intersection(DaySet::WEEKDAYS);
    let weekend_days = days.intersection(DaySet::WEEKEND);

    if days == DaySet::EVERY_DAY {
        return "Every day".to_string();
    }
    if days == DaySet::WEEKDAYS {
        return "Weekdays".to_string();
    }
    if days == DaySet::WEEKEND {
        return "Weekends".to_string();
    }

    if week_days == DaySet::WEEKDAYS && weekend_days.len() == 1 {
        if let Some(extra) = weekend_days.iter().next() {
            return format!("Weekdays and {}", extra.full_name());
        }
    }

    // Every day was handled above, so there are between one and four weekdays here.
    if weekend_days == DaySet::WEEKEND {
        return format!("Weekends and {}", join_days(week_days));
    }

    join_days(days)
}

/// Formats day names given in either the full or the three-letter vocabulary.
/// Names that match no day are left out.
pub fn format_day_names<S: AsRef<str>>(names: &[S]) -> String {
    let days = names
        .iter()
        .filter_map(|name| {
            let name = short_to_full(name.as_ref().trim());
            let day = weekday_from_name(name);
            if day.is_none() {
                debug!(token = name, "ignoring unknown day token");
            }
            day
        })
        .collect();
    format_days(days)
}

fn join_days(days: DaySet) -> String {
    let names: Vec<&str> = days.iter().map(|day| day.full_name()).collect();
    join_list(&names)
}

fn join_list(items: &[&str]) -> String {
    match items {
        [] => String::new(),
        [only] => only.to_string(),
        [first, second] => format!("{first} and {second}"),
        [head @ .., last] => format!("{}, and {last}", head.join(", ")),
    }
}
