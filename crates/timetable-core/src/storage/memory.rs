//! In-memory task store.

use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use super::TaskStore;
use crate::entry::{Entry, EntryDraft, EntryPatch};
use crate::error::{CoreError, Result};
use crate::ledger::CompletionLedger;

/// Entries and ledger held in memory; insertion order is list order.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Vec<Entry>,
    ledger: CompletionLedger,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed with existing entries (ids are kept as given).
    pub fn with_entries(entries: Vec<Entry>) -> Self {
        Self {
            entries,
            ledger: CompletionLedger::new(),
        }
    }

    fn position(&self, id: &str) -> Result<usize> {
        self.entries
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| CoreError::not_found(id))
    }
}

impl TaskStore for MemoryStore {
    fn list(&self) -> Result<Vec<Entry>> {
        Ok(self.entries.clone())
    }

    fn get(&self, id: &str) -> Result<Option<Entry>> {
        Ok(self.entries.iter().find(|e| e.id == id).cloned())
    }

    fn create(&mut self, draft: EntryDraft) -> Result<Entry> {
        draft.validate()?;
        let entry = draft.into_entry(Uuid::new_v4().to_string(), Utc::now());
        self.entries.push(entry.clone());
        Ok(entry)
    }

    fn update(&mut self, id: &str, patch: EntryPatch) -> Result<Entry> {
        patch.validate()?;
        let idx = self.position(id)?;
        let entry = &mut self.entries[idx];
        patch.apply(entry);
        Ok(entry.clone())
    }

    fn delete(&mut self, id: &str) -> Result<()> {
        let idx = self.position(id)?;
        self.entries.remove(idx);
        self.ledger.purge(id);
        Ok(())
    }

    fn ledger(&self) -> Result<CompletionLedger> {
        Ok(self.ledger.clone())
    }

    fn mark_completed(&mut self, id: &str, date: NaiveDate) -> Result<()> {
        self.position(id)?;
        self.ledger.mark_completed(id, date);
        Ok(())
    }

    fn mark_incomplete(&mut self, id: &str, date: NaiveDate) -> Result<()> {
        self.position(id)?;
        self.ledger.mark_incomplete(id, date);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveTime, Weekday};

    fn draft(subject: &str) -> EntryDraft {
        EntryDraft::new(
            subject,
            Weekday::Mon,
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
        )
    }

    #[test]
    fn create_assigns_unique_ids() {
        let mut store = MemoryStore::new();
        let a = store.create(draft("A")).unwrap();
        let b = store.create(draft("B")).unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(store.list().unwrap().len(), 2);
    }

    #[test]
    fn unknown_ids_are_not_found() {
        let mut store = MemoryStore::new();
        assert!(matches!(
            store.update("missing", EntryPatch::completed(true)),
            Err(CoreError::NotFound { .. })
        ));
        assert!(matches!(store.delete("missing"), Err(CoreError::NotFound { .. })));
    }

    #[test]
    fn delete_purges_ledger() {
        let mut store = MemoryStore::new();
        let e = store.create(draft("A")).unwrap();
        let day = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        store.mark_completed(&e.id, day).unwrap();
        store.delete(&e.id).unwrap();
        assert!(!store.ledger().unwrap().is_completed(&e.id, day));
    }
}
