//! Timetable service: store, recurrence resolver and reminder scheduler wired together.
//!
//! Every mutation is followed by a full reminder rebuild. Store errors
//! propagate to the caller; reminder failures are only reported through
//! [`Timetable::last_pass`] and the log.

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::entry::{Entry, EntryDraft, EntryPatch};
use crate::error::{CoreError, Result};
use crate::recurrence::{self, CompletionChange};
use crate::reminder::{NotificationSink, ReminderScheduler, ReminderSettings, SchedulePass};
use crate::storage::TaskStore;

/// An entry together with its effective completion status at some `now`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntryStatus {
    #[serde(flatten)]
    pub entry: Entry,
    /// Effective status for the current cycle (not the stored flag).
    pub done: bool,
}

pub struct Timetable<S: TaskStore, N: NotificationSink> {
    store: S,
    scheduler: ReminderScheduler<N>,
    last_pass: Option<SchedulePass>,
}

impl<S: TaskStore, N: NotificationSink> Timetable<S, N> {
    pub fn new(store: S, sink: N, settings: ReminderSettings) -> Self {
        Self {
            store,
            scheduler: ReminderScheduler::new(sink, settings),
            last_pass: None,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn scheduler(&self) -> &ReminderScheduler<N> {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut ReminderScheduler<N> {
        &mut self.scheduler
    }

    /// Report of the most recent reminder pass, if any ran.
    pub fn last_pass(&self) -> Option<&SchedulePass> {
        self.last_pass.as_ref()
    }

    /// All entries with their effective status at `now`.
    pub fn entries(&self, now: NaiveDateTime) -> Result<Vec<EntryStatus>> {
        let ledger = self.store.ledger()?;
        Ok(self
            .store
            .list()?
            .into_iter()
            .map(|entry| EntryStatus {
                done: recurrence::effective_status(&entry, &ledger, now),
                entry,
            })
            .collect())
    }

    pub fn status(&self, id: &str, now: NaiveDateTime) -> Result<EntryStatus> {
        let entry = self.store.get(id)?.ok_or_else(|| CoreError::not_found(id))?;
        let ledger = self.store.ledger()?;
        Ok(EntryStatus {
            done: recurrence::effective_status(&entry, &ledger, now),
            entry,
        })
    }

    pub fn add(&mut self, draft: EntryDraft, now: NaiveDateTime) -> Result<Entry> {
        let entry = self.store.create(draft)?;
        self.sync_reminders(now)?;
        Ok(entry)
    }

    /// Update fields of an entry. A `completed` value in the patch is routed
    /// through the recurrence rules so recurring entries go to the ledger
    /// instead of their own flag.
    ///
    /// The completion change is resolved against the patched entry before
    /// anything is written, so a rejected toggle leaves the entry untouched.
    pub fn edit(
        &mut self,
        id: &str,
        mut patch: EntryPatch,
        now: NaiveDateTime,
    ) -> Result<EntryStatus> {
        patch.validate()?;
        let mut entry = self.store.get(id)?.ok_or_else(|| CoreError::not_found(id))?;
        let mut ledger = self.store.ledger()?;

        let completed = patch.completed.take();
        patch.clone().apply(&mut entry);
        let change = match completed {
            Some(done) => recurrence::set_completion(&mut entry, &mut ledger, now, done)?,
            None => CompletionChange::Unchanged,
        };

        let change = match change {
            CompletionChange::Flag { done } => {
                patch.completed = Some(done);
                CompletionChange::Unchanged
            }
            other => other,
        };
        if !patch.is_empty() {
            entry = self.store.update(id, patch)?;
        }
        self.write_ledger_change(id, change)?;

        self.sync_reminders(now)?;
        Ok(EntryStatus {
            done: recurrence::effective_status(&entry, &ledger, now),
            entry,
        })
    }

    pub fn remove(&mut self, id: &str, now: NaiveDateTime) -> Result<()> {
        self.store.delete(id)?;
        self.sync_reminders(now)?;
        Ok(())
    }

    /// Mark the entry done (or not) for the cycle containing `now`.
    ///
    /// # Errors
    /// `NotFound` for unknown ids; `Validation` when a weekly occurrence
    /// is still ahead. The prior status is unchanged on error.
    pub fn set_completion(
        &mut self,
        id: &str,
        done: bool,
        now: NaiveDateTime,
    ) -> Result<EntryStatus> {
        let mut entry = self.store.get(id)?.ok_or_else(|| CoreError::not_found(id))?;
        let mut ledger = self.store.ledger()?;

        let change = recurrence::set_completion(&mut entry, &mut ledger, now, done)?;
        if let CompletionChange::Flag { done } = change {
            entry = self.store.update(id, EntryPatch::completed(done))?;
        }
        self.write_ledger_change(id, change)?;

        self.sync_reminders(now)?;
        Ok(EntryStatus {
            done: recurrence::effective_status(&entry, &ledger, now),
            entry,
        })
    }

    /// Persist a ledger write. Flag changes go through `update` instead.
    fn write_ledger_change(&mut self, id: &str, change: CompletionChange) -> Result<()> {
        match change {
            CompletionChange::Logged { date, done: true } => self.store.mark_completed(id, date)?,
            CompletionChange::Logged { date, done: false } => {
                self.store.mark_incomplete(id, date)?
            }
            CompletionChange::Flag { .. } | CompletionChange::Unchanged => return Ok(()),
        }
        tracing::debug!(id, ?change, "completion logged");
        Ok(())
    }

    /// Reload every entry and replace all pending reminders.
    pub fn sync_reminders(&mut self, now: NaiveDateTime) -> Result<&SchedulePass> {
        let entries = self.store.list()?;
        let pass = self.scheduler.rebuild(&entries, now);
        Ok(self.last_pass.insert(pass))
    }
}
