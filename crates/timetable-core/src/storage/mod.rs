mod config;
pub mod memory;
pub mod migrations;
pub mod timetable_db;

pub use config::{Config, LoggingConfig, RemindersConfig};
pub use memory::MemoryStore;
pub use timetable_db::TimetableDb;

use chrono::NaiveDate;
use std::path::PathBuf;

use crate::entry::{Entry, EntryDraft, EntryPatch};
use crate::error::{ConfigError, Result};
use crate::ledger::CompletionLedger;

/// Persistence for entries and their completion ledger.
///
/// `update` and `delete` on an unknown id fail with
/// [`CoreError::NotFound`](crate::error::CoreError::NotFound). `delete` also
/// purges the entry's ledger rows.
pub trait TaskStore {
    fn list(&self) -> Result<Vec<Entry>>;

    fn get(&self, id: &str) -> Result<Option<Entry>>;

    fn create(&mut self, draft: EntryDraft) -> Result<Entry>;

    fn update(&mut self, id: &str, patch: EntryPatch) -> Result<Entry>;

    fn delete(&mut self, id: &str) -> Result<()>;

    /// Snapshot of the whole completion ledger.
    fn ledger(&self) -> Result<CompletionLedger>;

    fn mark_completed(&mut self, id: &str, date: NaiveDate) -> Result<()>;

    fn mark_incomplete(&mut self, id: &str, date: NaiveDate) -> Result<()>;
}

/// Returns `~/.config/timetable[-dev]/` based on TIMETABLE_ENV.
///
/// Set TIMETABLE_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("TIMETABLE_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("timetable-dev")
    } else {
        base_dir.join("timetable")
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
