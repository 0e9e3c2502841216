use crate::days::{DayNames, weekday_from_code};
use crate::models::{HabitGroup, HabitRecord};
use crate::time_slot::TimeSlot;
use chrono::Weekday;
use serde::Serialize;
use tracing::debug;

/// Habit groups in first-seen order, addressed by habit name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct HabitSchedule {
    groups: Vec<HabitGroup>,
}

impl HabitSchedule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, HabitGroup> {
        self.groups.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|group| group.habit_name.as_str())
    }

    fn position(&self, habit_name: &str) -> Option<usize> {
        self.groups
            .iter()
            .position(|group| group.habit_name == habit_name)
    }

    pub fn get(&self, habit_name: &str) -> Option<&HabitGroup> {
        self.position(habit_name).map(|idx| &self.groups[idx])
    }

    pub fn get_mut(&mut self, habit_name: &str) -> Option<&mut HabitGroup> {
        self.position(habit_name).map(|idx| &mut self.groups[idx])
    }

    /// Replaces the group with the same name in place, or appends it.
    pub fn insert(&mut self, group: HabitGroup) -> Option<HabitGroup> {
        match self.position(&group.habit_name) {
            Some(idx) => Some(std::mem::replace(&mut self.groups[idx], group)),
            None => {
                self.groups.push(group);
                None
            }
        }
    }

    pub fn remove(&mut self, habit_name: &str) -> Option<HabitGroup> {
        self.position(habit_name).map(|idx| self.groups.remove(idx))
    }

    /// Returns whether the day is now selected, or `None` for an unknown habit.
    pub fn toggle_day(&mut self, habit_name: &str, day: Weekday) -> Option<bool> {
        self.get_mut(habit_name).map(|group| group.days.toggle(day))
    }

    pub fn set_time_slot(&mut self, habit_name: &str, slot: TimeSlot) -> bool {
        match self.get_mut(habit_name) {
            Some(group) => {
                group.time_slot = slot;
                true
            }
            None => false,
        }
    }

    pub fn into_groups(self) -> Vec<HabitGroup> {
        self.groups
    }
}

impl<'a> IntoIterator for &'a HabitSchedule {
    type Item = &'a HabitGroup;
    type IntoIter = std::slice::Iter<'a, HabitGroup>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.iter()
    }
}

impl FromIterator<HabitGroup> for HabitSchedule {
    fn from_iter<I: IntoIterator<Item = HabitGroup>>(iter: I) -> Self {
        let mut schedule = HabitSchedule::new();
        for group in iter {
            schedule.insert(group);
        }
        schedule
    }
}

/// Groups flat records by habit name, keeping the order names first appear in.
///
/// Day codes with no weekday are skipped. The time slot is taken from the
/// first record of each habit; a missing or unmatched hour yields the default
/// slot.
pub fn group_for_editing(records: &[HabitRecord]) -> HabitSchedule {
    let mut schedule = HabitSchedule::new();

    for record in records {
        let group = match schedule.position(&record.habit_name) {
            Some(idx) => &mut schedule.groups[idx],
            None => {
                schedule.groups.push(HabitGroup {
                    habit_name: record.habit_name.clone(),
                    days: Default::default(),
                    time_slot: slot_for_record(record),
                });
                let last = schedule.groups.len() - 1;
                &mut schedule.groups[last]
            }
        };

        match weekday_from_code(record.day_of_week) {
            Some(day) => {
                group.days.insert(day);
            }
            None => debug!(
                habit = %record.habit_name,
                code = record.day_of_week,
                "dropping unknown day code"
            ),
        }
    }

    schedule
}

fn slot_for_record(record: &HabitRecord) -> TimeSlot {
    record
        .reminder_hour()
        .and_then(TimeSlot::from_hour)
        .unwrap_or_default()
}

/// Emits one record per selected day. Groups without days produce nothing,
/// so they are gone after the next load.
pub fn expand_for_persistence<'a>(
    groups: impl IntoIterator<Item = &'a HabitGroup>,
    timezone: &str,
) -> Vec<HabitRecord> {
    groups
        .into_iter()
        .flat_map(|group| {
            let reminder_time = group.time_slot.reminder_time();
            group.days.iter().map(move |day| HabitRecord {
                habit_name: group.habit_name.clone(),
                day_of_week: i32::from(day.storage_code()),
                reminder_time: Some(reminder_time.clone()),
                timezone: timezone.to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::days::DaySet;
    use chrono::Weekday::{Fri, Mon, Sat, Sun, Thu, Tue, Wed};
    use pretty_assertions::assert_eq;

    fn record(name: &str, day: i32, time: Option<&str>) -> HabitRecord {
        HabitRecord {
            habit_name: name.to_string(),
            day_of_week: day,
            reminder_time: time.map(str::to_string),
            timezone: "America/Chicago".to_string(),
        }
    }

    #[test]
    fn empty_records_give_empty_schedule() {
        assert!(group_for_editing(&[]).is_empty());
        assert!(expand_for_persistence(&HabitSchedule::new(), "UTC").is_empty());
    }

    #[test]
    fn groups_keep_first_seen_order() {
        let records = vec![
            record("Walk", 2, Some("18:00:00")),
            record("Stretch", 1, Some("07:00:00")),
            record("Walk", 4, Some("18:00:00")),
            record("Stretch", 3, Some("07:00:00")),
        ];
        let schedule = group_for_editing(&records);
        let names: Vec<_> = schedule.names().collect();
        assert_eq!(names, vec!["Walk", "Stretch"]);

        let stretch = schedule.get("Stretch").unwrap();
        assert_eq!(stretch.days, [Mon, Wed].into_iter().collect::<DaySet>());
        assert_eq!(stretch.time_slot, TimeSlot::EarlyMorning);
        assert_eq!(schedule.get("Walk").unwrap().time_slot, TimeSlot::AfterWork);
    }

    #[test]
    fn interleaved_names_are_not_sorted() {
        let records = vec![
            record("B", 1, None),
            record("A", 2, None),
            record("B", 3, None),
            record("A", 4, None),
        ];
        let names: Vec<_> = group_for_editing(&records).names().map(str::to_string).collect();
        assert_eq!(names, vec!["B", "A"]);
    }

    #[test]
    fn time_slot_comes_from_first_record_only() {
        let records = vec![
            record("Read", 0, Some("21:00:00")),
            record("Read", 6, Some("12:00:00")),
        ];
        let schedule = group_for_editing(&records);
        let read = schedule.get("Read").unwrap();
        assert_eq!(read.time_slot, TimeSlot::Bedtime);
        assert_eq!(read.days, [Sat, Sun].into_iter().collect::<DaySet>());
    }

    #[test]
    fn unmatched_or_missing_hour_falls_back_to_default() {
        let records = vec![
            record("Meditate", 1, Some("08:00:00")),
            record("Journal", 2, None),
            record("Hydrate", 3, Some("garbage")),
        ];
        let schedule = group_for_editing(&records);
        for group in &schedule {
            assert_eq!(group.time_slot, TimeSlot::MidMorning, "{}", group.habit_name);
        }
    }

    #[test]
    fn unknown_day_codes_are_dropped() {
        let records = vec![
            record("Swim", 9, Some("07:00:00")),
            record("Swim", 5, Some("07:00:00")),
            record("Swim", -2, Some("07:00:00")),
        ];
        let schedule = group_for_editing(&records);
        assert_eq!(schedule.len(), 1);
        assert_eq!(
            schedule.get("Swim").unwrap().days,
            [Fri].into_iter().collect::<DaySet>()
        );
    }

    #[test]
    fn duplicate_day_records_collapse() {
        let records = vec![record("Run", 1, None), record("Run", 1, None)];
        let schedule = group_for_editing(&records);
        assert_eq!(schedule.get("Run").unwrap().days.len(), 1);
    }

    #[test]
    fn grouping_is_idempotent() {
        let records = vec![
            record("B", 1, Some("14:00:00")),
            record("A", 2, Some("16:00:00")),
            record("B", 3, Some("14:00:00")),
        ];
        assert_eq!(group_for_editing(&records), group_for_editing(&records));
    }

    #[test]
    fn expansion_round_trips_through_grouping() {
        let schedule: HabitSchedule = vec![
            HabitGroup::new(
                "Yoga",
                [Mon, Tue, Wed, Thu, Fri].into_iter().collect(),
                TimeSlot::Lunch,
            ),
            HabitGroup::new("Call family", [Sun].into_iter().collect(), TimeSlot::AfterWork),
            HabitGroup::new("Stretch", [Sat, Thu].into_iter().collect(), TimeSlot::Bedtime),
        ]
        .into_iter()
        .collect();

        let records = expand_for_persistence(&schedule, "America/Chicago");
        assert_eq!(records.len(), 8);
        assert!(records.iter().all(|r| r.timezone == "America/Chicago"));

        assert_eq!(group_for_editing(&records), schedule);
    }

    #[test]
    fn expanded_records_carry_storage_codes_and_hour() {
        let group = HabitGroup::new("Walk", [Sun, Sat].into_iter().collect(), TimeSlot::EarlyMorning);
        let records = expand_for_persistence([&group], "UTC");
        assert_eq!(
            records,
            vec![
                record_tz("Walk", 6, "07:00:00", "UTC"),
                record_tz("Walk", 0, "07:00:00", "UTC"),
            ]
        );
    }

    fn record_tz(name: &str, day: i32, time: &str, timezone: &str) -> HabitRecord {
        HabitRecord {
            habit_name: name.to_string(),
            day_of_week: day,
            reminder_time: Some(time.to_string()),
            timezone: timezone.to_string(),
        }
    }

    #[test]
    fn groups_without_days_disappear_after_reload() {
        let mut schedule: HabitSchedule = vec![
            HabitGroup::new("Keep", [Tue].into_iter().collect(), TimeSlot::Afternoon),
            HabitGroup::new("Drop", DaySet::EMPTY, TimeSlot::Afternoon),
        ]
        .into_iter()
        .collect();

        let reloaded = group_for_editing(&expand_for_persistence(&schedule, "UTC"));
        schedule.remove("Drop");
        assert_eq!(reloaded, schedule);
    }

    #[test]
    fn edits_are_addressed_by_name() {
        let mut schedule = group_for_editing(&[
            record("Walk", 1, Some("07:00:00")),
            record("Read", 2, Some("21:00:00")),
        ]);

        assert_eq!(schedule.toggle_day("Read", Thu), Some(true));
        assert_eq!(schedule.toggle_day("Read", Tue), Some(false));
        assert_eq!(schedule.toggle_day("Missing", Thu), None);
        assert!(schedule.set_time_slot("Walk", TimeSlot::Lunch));
        assert!(!schedule.set_time_slot("Missing", TimeSlot::Lunch));

        schedule.remove("Walk");
        let read = schedule.get("Read").unwrap();
        assert_eq!(read.days, [Thu].into_iter().collect::<DaySet>());

        let replaced = schedule.insert(HabitGroup::new("Read", DaySet::WEEKEND, TimeSlot::Bedtime));
        assert!(replaced.is_some());
        assert_eq!(schedule.len(), 1);
    }
}
