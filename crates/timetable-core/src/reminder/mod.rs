//! Reminder planning and scheduling.
//!
//! A scheduling pass turns the full entry set into at most one
//! [`ReminderEvent`] per entry and hands the whole batch to a
//! [`NotificationSink`], replacing whatever the sink held before.
//!
//! Cap policy: events are ordered by `(fire_at, entry_id)` and the batch is
//! truncated to the effective limit, so the furthest-in-the-future events
//! are the ones dropped. Ids are assigned after truncation.

pub mod scheduler;
pub mod sink;

use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::entry::{Entry, EntryId};
use crate::occurrence::reminder_slot;

pub use scheduler::{PassOutcome, ReminderScheduler, SchedulePass};
pub use sink::{MemorySink, NotificationSink, OutboxSink};

/// One logical reminder for one entry occurrence. Never persisted by the core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderEvent {
    /// Unique within the scheduling pass that produced it
    pub id: u32,
    pub entry_id: EntryId,
    /// Start of the occurrence being announced
    pub occurs_at: NaiveDateTime,
    /// Wall-clock instant the reminder should fire
    pub fire_at: NaiveDateTime,
    pub title: String,
    pub body: String,
}

/// Knobs for a scheduling pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderSettings {
    pub enabled: bool,
    /// Largest batch handed to the sink
    pub max_batch: usize,
    /// Id given to the first event of a pass
    pub first_id: u32,
    /// Name used to address the user in reminder bodies
    pub user_name: Option<String>,
}

impl Default for ReminderSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            max_batch: 50,
            first_id: 100,
            user_name: None,
        }
    }
}

/// Result of planning: what will be sent, and what the cap cut off.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReminderPlan {
    pub events: Vec<ReminderEvent>,
    pub dropped: Vec<EntryId>,
}

/// An entry is live for reminders unless it is a finished one-time entry.
/// Recurring entries come back every cycle regardless of the last one.
fn is_live(entry: &Entry) -> bool {
    entry.is_recurring() || !entry.completed
}

/// Compute the reminder batch for `entries` as of `now`.
pub fn plan_reminders(
    entries: &[Entry],
    now: NaiveDateTime,
    settings: &ReminderSettings,
) -> ReminderPlan {
    plan_with_limit(entries, now, settings, settings.max_batch)
}

pub(crate) fn plan_with_limit(
    entries: &[Entry],
    now: NaiveDateTime,
    settings: &ReminderSettings,
    limit: usize,
) -> ReminderPlan {
    let mut seen = HashSet::new();
    let mut pending: Vec<(&Entry, NaiveDateTime, NaiveDateTime)> = entries
        .iter()
        .filter(|entry| seen.insert(entry.id.as_str()))
        .filter(|entry| is_live(entry))
        .filter_map(|entry| {
            reminder_slot(entry, now).map(|slot| (entry, slot.occurs_at, slot.fire_at))
        })
        .collect();

    pending.sort_by(|a, b| a.2.cmp(&b.2).then_with(|| a.0.id.cmp(&b.0.id)));

    // Ids run from first_id up to u32::MAX and never wrap.
    let id_room = usize::try_from(u32::MAX - settings.first_id)
        .map_or(usize::MAX, |room| room.saturating_add(1));
    let limit = limit.min(id_room);

    let dropped = if pending.len() > limit {
        pending
            .split_off(limit)
            .into_iter()
            .map(|(entry, _, _)| entry.id.clone())
            .collect()
    } else {
        Vec::new()
    };

    let events = pending
        .into_iter()
        .zip(settings.first_id..=u32::MAX)
        .map(|((entry, occurs_at, fire_at), id)| ReminderEvent {
            id,
            entry_id: entry.id.clone(),
            occurs_at,
            fire_at,
            title: reminder_title(entry),
            body: reminder_body(entry, occurs_at, settings.user_name.as_deref()),
        })
        .collect();

    ReminderPlan { events, dropped }
}

pub fn reminder_title(entry: &Entry) -> String {
    format!("Time for {}", entry.subject)
}

/// "Pavan, it's 2pm! It's time to do DSA."
pub fn reminder_body(entry: &Entry, occurs_at: NaiveDateTime, user_name: Option<&str>) -> String {
    let clock = spoken_time(occurs_at);
    match user_name.map(str::trim).filter(|name| !name.is_empty()) {
        Some(name) => format!("{name}, it's {clock}! It's time to do {}.", entry.subject),
        None => format!("It's {clock}! It's time to do {}.", entry.subject),
    }
}

/// 12-hour clock without leading zero; minutes only when non-zero.
fn spoken_time(at: NaiveDateTime) -> String {
    let (pm, hour) = at.hour12();
    let suffix = if pm { "pm" } else { "am" };
    match at.minute() {
        0 => format!("{hour}{suffix}"),
        m => format!("{hour}:{m:02}{suffix}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{EntryDraft, Recurrence};
    use chrono::{NaiveDate, NaiveTime, Utc, Weekday};

    fn at(d: u32, h: u32, m: u32) -> NaiveDateTime {
        // May 2024; the 6th is a Monday.
        NaiveDate::from_ymd_opt(2024, 5, d)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn entry(id: &str, recurrence: Recurrence, day: Weekday, h: u32, offset: u32) -> Entry {
        let mut draft = EntryDraft::new(
            format!("Subject {id}"),
            day,
            NaiveTime::from_hms_opt(h, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(h, 50, 0).unwrap(),
        );
        draft.recurrence = recurrence;
        draft.alert_offset_minutes = offset;
        draft.into_entry(id.into(), Utc::now())
    }

    #[test]
    fn completed_one_time_entries_are_skipped() {
        let mut done = entry("a", Recurrence::None, Weekday::Tue, 9, 10);
        done.completed = true;
        let open = entry("b", Recurrence::None, Weekday::Tue, 9, 10);
        let plan = plan_reminders(&[done, open], at(6, 12, 0), &ReminderSettings::default());
        assert_eq!(plan.events.len(), 1);
        assert_eq!(plan.events[0].entry_id, "b");
    }

    #[test]
    fn recurring_entries_ignore_stale_flag() {
        let mut daily = entry("d", Recurrence::Daily, Weekday::Mon, 9, 10);
        daily.completed = true;
        let plan = plan_reminders(&[daily], at(6, 12, 0), &ReminderSettings::default());
        assert_eq!(plan.events.len(), 1);
        assert_eq!(plan.events[0].fire_at, at(7, 8, 50));
    }

    #[test]
    fn zero_offset_entries_produce_nothing() {
        let e = entry("z", Recurrence::Daily, Weekday::Mon, 9, 0);
        let plan = plan_reminders(&[e], at(6, 0, 0), &ReminderSettings::default());
        assert!(plan.events.is_empty());
    }

    #[test]
    fn duplicate_ids_yield_one_event() {
        let e = entry("x", Recurrence::Daily, Weekday::Mon, 9, 10);
        let plan = plan_reminders(&[e.clone(), e], at(6, 0, 0), &ReminderSettings::default());
        assert_eq!(plan.events.len(), 1);
    }

    #[test]
    fn cap_drops_furthest_events_and_ids_are_sequential() {
        let entries = vec![
            entry("late", Recurrence::Weekly, Weekday::Fri, 9, 5),
            entry("soon", Recurrence::Daily, Weekday::Mon, 13, 5),
            entry("mid", Recurrence::Weekly, Weekday::Wed, 9, 5),
        ];
        let settings = ReminderSettings {
            max_batch: 2,
            ..ReminderSettings::default()
        };
        let plan = plan_reminders(&entries, at(6, 12, 0), &settings);
        let ids: Vec<_> = plan.events.iter().map(|e| e.entry_id.as_str()).collect();
        assert_eq!(ids, vec!["soon", "mid"]);
        assert_eq!(plan.dropped, vec!["late".to_string()]);
        assert_eq!(plan.events[0].id, 100);
        assert_eq!(plan.events[1].id, 101);
    }

    #[test]
    fn ids_stop_at_u32_max_instead_of_wrapping() {
        let entries = vec![
            entry("a", Recurrence::Daily, Weekday::Mon, 13, 5),
            entry("b", Recurrence::Daily, Weekday::Mon, 14, 5),
            entry("c", Recurrence::Daily, Weekday::Mon, 15, 5),
        ];
        let settings = ReminderSettings {
            first_id: u32::MAX - 1,
            ..ReminderSettings::default()
        };
        let plan = plan_reminders(&entries, at(6, 12, 0), &settings);
        let ids: Vec<_> = plan.events.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![u32::MAX - 1, u32::MAX]);
        assert_eq!(plan.dropped, vec!["c".to_string()]);

        let settings = ReminderSettings {
            first_id: u32::MAX,
            ..ReminderSettings::default()
        };
        let plan = plan_reminders(&entries[..2], at(6, 12, 0), &settings);
        assert_eq!(plan.events.len(), 1);
        assert_eq!(plan.events[0].id, u32::MAX);
        assert_eq!(plan.dropped, vec!["b".to_string()]);
    }

    #[test]
    fn ties_break_on_entry_id() {
        let entries = vec![
            entry("b", Recurrence::Daily, Weekday::Mon, 13, 5),
            entry("a", Recurrence::Daily, Weekday::Mon, 13, 5),
        ];
        let plan = plan_reminders(&entries, at(6, 12, 0), &ReminderSettings::default());
        assert_eq!(plan.events[0].entry_id, "a");
        assert_eq!(plan.events[1].entry_id, "b");
    }

    #[test]
    fn body_names_user_and_time() {
        let e = entry("dsa", Recurrence::Daily, Weekday::Mon, 14, 5);
        assert_eq!(
            reminder_body(&e, at(6, 14, 0), Some("Pavan")),
            "Pavan, it's 2pm! It's time to do Subject dsa."
        );
        assert_eq!(
            reminder_body(&e, at(6, 0, 30), None),
            "It's 12:30am! It's time to do Subject dsa."
        );
        assert_eq!(reminder_title(&e), "Time for Subject dsa");
    }
}
