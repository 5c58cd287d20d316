//! Occurrence calculator: next wall-clock start of an entry and its reminder instant.
//!
//! All instants are local wall-clock `NaiveDateTime`s supplied by the caller.

use chrono::{Datelike, Duration, NaiveDateTime};

use crate::entry::{weekday_index, Entry, Recurrence};

/// Time between two consecutive occurrences.
pub fn period(recurrence: Recurrence) -> Duration {
    match recurrence {
        Recurrence::Daily => Duration::days(1),
        Recurrence::Weekly | Recurrence::None => Duration::days(7),
    }
}

/// The next instant strictly after `now` at which the entry starts.
pub fn next_occurrence(entry: &Entry, now: NaiveDateTime) -> NaiveDateTime {
    let candidate = now.date().and_time(entry.start_time);
    match entry.recurrence {
        Recurrence::Daily => {
            if candidate <= now {
                candidate + Duration::days(1)
            } else {
                candidate
            }
        }
        Recurrence::Weekly | Recurrence::None => {
            let dow = weekday_index(now.date().weekday());
            let days_away = (weekday_index(entry.day) - dow + 7) % 7;
            let shifted = candidate + Duration::days(days_away);
            if shifted <= now {
                shifted + Duration::days(7)
            } else {
                shifted
            }
        }
    }
}

/// A reminder instant together with the occurrence it announces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReminderSlot {
    pub occurs_at: NaiveDateTime,
    pub fire_at: NaiveDateTime,
}

/// When the reminder for the entry's next announceable occurrence fires.
///
/// Returns `None` when the entry has no alert offset. If the offset puts
/// the reminder at or before `now`, that occurrence is skipped (never
/// backdated) and the following one is used instead.
pub fn reminder_slot(entry: &Entry, now: NaiveDateTime) -> Option<ReminderSlot> {
    if entry.alert_offset_minutes == 0 {
        return None;
    }
    let offset = Duration::minutes(i64::from(entry.alert_offset_minutes));
    let step = period(entry.recurrence);
    let mut occurs_at = next_occurrence(entry, now);
    while occurs_at - offset <= now {
        occurs_at += step;
    }
    Some(ReminderSlot {
        occurs_at,
        fire_at: occurs_at - offset,
    })
}

/// Just the instant of [`reminder_slot`].
pub fn reminder_instant(entry: &Entry, now: NaiveDateTime) -> Option<NaiveDateTime> {
    reminder_slot(entry, now).map(|slot| slot.fire_at)
}
