//! Recurrence resolver: derives the present-tense "done" status of an entry.
//!
//! One-time entries carry their own permanent `completed` flag. Daily and
//! weekly entries are judged against the completion ledger for the cycle
//! that contains `now`:
//!
//! - daily: the cycle is `now`'s calendar date
//! - weekly: the cycle is this week's occurrence on the entry's weekday,
//!   using Sunday = 0 indexing. If that weekday is still ahead of `now`
//!   the occurrence has not happened and cannot be complete.

use chrono::{Datelike, Days, NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::entry::{weekday_index, Entry, Recurrence};
use crate::error::ValidationError;
use crate::ledger::CompletionLedger;

/// The ledger date an entry's current cycle resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleDate {
    /// No cycle; the entry's own flag is authoritative.
    OneTime,
    /// The cycle's occurrence is today or already behind us.
    Due(NaiveDate),
    /// This week's occurrence is still ahead (on the given date).
    NotYetDue(NaiveDate),
}

pub fn cycle_date(entry: &Entry, now: NaiveDateTime) -> CycleDate {
    let today = now.date();
    match entry.recurrence {
        Recurrence::None => CycleDate::OneTime,
        Recurrence::Daily => CycleDate::Due(today),
        Recurrence::Weekly => {
            let dow = weekday_index(today.weekday());
            let target = weekday_index(entry.day);
            if dow >= target {
                let back = Days::new((dow - target) as u64);
                CycleDate::Due(today - back)
            } else {
                let ahead = Days::new((target - dow) as u64);
                CycleDate::NotYetDue(today + ahead)
            }
        }
    }
}

/// Whether the entry counts as done at `now`.
pub fn effective_status(entry: &Entry, ledger: &CompletionLedger, now: NaiveDateTime) -> bool {
    match cycle_date(entry, now) {
        CycleDate::OneTime => entry.completed,
        CycleDate::Due(date) => ledger.is_completed(&entry.id, date),
        CycleDate::NotYetDue(_) => false,
    }
}

/// The write a completion toggle resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CompletionChange {
    /// One-time entry: persist `completed = done` on the entry.
    Flag { done: bool },
    /// Recurring entry: add or remove the ledger row for `date`.
    Logged { date: NaiveDate, done: bool },
    /// Nothing to persist.
    Unchanged,
}

/// Set the entry's completion for the cycle containing `now`.
///
/// Mutates either `entry.completed` (one-time) or `ledger` (recurring) and
/// returns the change for the store to persist. Recurring entries never
/// have their own flag touched.
///
/// # Errors
/// Returns [`ValidationError::OccurrenceNotDue`] when marking a weekly
/// entry done before this week's occurrence.
pub fn set_completion(
    entry: &mut Entry,
    ledger: &mut CompletionLedger,
    now: NaiveDateTime,
    done: bool,
) -> Result<CompletionChange, ValidationError> {
    match cycle_date(entry, now) {
        CycleDate::OneTime => {
            entry.completed = done;
            Ok(CompletionChange::Flag { done })
        }
        CycleDate::Due(date) => {
            if done {
                ledger.mark_completed(&entry.id, date);
            } else {
                ledger.mark_incomplete(&entry.id, date);
            }
            Ok(CompletionChange::Logged { date, done })
        }
        CycleDate::NotYetDue(due) if done => Err(ValidationError::OccurrenceNotDue { due }),
        CycleDate::NotYetDue(_) => Ok(CompletionChange::Unchanged),
    }
}
