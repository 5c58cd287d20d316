//! Completion ledger: which recurring entry was completed on which date.
//!
//! The ledger is a set of `(task_id, completed_date)` facts. It never holds
//! the same pair twice, and all operations are total.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// "Entry `task_id` was completed on `completed_date`."
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CompletionLogEntry {
    pub task_id: String,
    pub completed_date: NaiveDate,
}

/// In-memory completion ledger, ordered by task then date.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionLedger {
    rows: BTreeSet<CompletionLogEntry>,
}

impl CompletionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_completed(&self, task_id: &str, date: NaiveDate) -> bool {
        self.rows.contains(&CompletionLogEntry {
            task_id: task_id.to_string(),
            completed_date: date,
        })
    }

    /// Idempotent insert. Returns `true` if the row was new.
    pub fn mark_completed(&mut self, task_id: &str, date: NaiveDate) -> bool {
        self.rows.insert(CompletionLogEntry {
            task_id: task_id.to_string(),
            completed_date: date,
        })
    }

    /// Remove the pair if present. Returns `true` if a row was removed.
    pub fn mark_incomplete(&mut self, task_id: &str, date: NaiveDate) -> bool {
        self.rows.remove(&CompletionLogEntry {
            task_id: task_id.to_string(),
            completed_date: date,
        })
    }

    /// Drop every row for `task_id`; returns how many were removed.
    pub fn purge(&mut self, task_id: &str) -> usize {
        let before = self.rows.len();
        self.rows.retain(|row| row.task_id != task_id);
        before - self.rows.len()
    }

    /// Completion dates recorded for one entry, oldest first.
    pub fn entries_for(&self, task_id: &str) -> Vec<NaiveDate> {
        self.rows
            .iter()
            .filter(|row| row.task_id == task_id)
            .map(|row| row.completed_date)
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CompletionLogEntry> {
        self.rows.iter()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl FromIterator<CompletionLogEntry> for CompletionLedger {
    fn from_iter<I: IntoIterator<Item = CompletionLogEntry>>(iter: I) -> Self {
        Self {
            rows: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn mark_completed_is_idempotent() {
        let mut ledger = CompletionLedger::new();
        assert!(ledger.mark_completed("1", date(2024, 5, 1)));
        assert!(!ledger.mark_completed("1", date(2024, 5, 1)));
        assert_eq!(ledger.len(), 1);
        assert!(ledger.is_completed("1", date(2024, 5, 1)));
        assert!(!ledger.is_completed("1", date(2024, 5, 2)));
    }

    #[test]
    fn mark_incomplete_on_absent_pair_is_noop() {
        let mut ledger = CompletionLedger::new();
        ledger.mark_completed("1", date(2024, 5, 1));
        assert!(!ledger.mark_incomplete("1", date(2024, 5, 2)));
        assert!(!ledger.mark_incomplete("2", date(2024, 5, 1)));
        assert_eq!(ledger.len(), 1);
        assert!(ledger.mark_incomplete("1", date(2024, 5, 1)));
        assert!(ledger.is_empty());
    }

    #[test]
    fn purge_removes_only_that_task() {
        let mut ledger = CompletionLedger::new();
        ledger.mark_completed("1", date(2024, 5, 1));
        ledger.mark_completed("1", date(2024, 5, 8));
        ledger.mark_completed("2", date(2024, 5, 1));
        assert_eq!(ledger.purge("1"), 2);
        assert_eq!(ledger.entries_for("1"), Vec::<NaiveDate>::new());
        assert_eq!(ledger.entries_for("2"), vec![date(2024, 5, 1)]);
        assert_eq!(ledger.purge("1"), 0);
    }

    proptest! {
        #[test]
        fn repeated_marks_leave_one_row(times in 1usize..8, day in 1u32..28) {
            let mut ledger = CompletionLedger::new();
            for _ in 0..times {
                ledger.mark_completed("x", date(2024, 2, day));
            }
            prop_assert_eq!(ledger.len(), 1);
        }
    }
}
