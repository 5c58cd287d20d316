//! # Timetable Core Library
//!
//! Recurrence and reminder logic for a weekly timetable. Every operation is
//! available through the standalone `timetable` CLI, which is a thin layer
//! over this crate.
//!
//! ## Architecture
//!
//! - **Recurrence**: entries are one-time, daily or weekly. Recurring entries
//!   keep their completion in a per-date ledger so status resets each cycle.
//! - **Reminders**: a scheduling pass replaces every pending reminder with a
//!   fresh, capped batch computed from the whole entry set.
//! - **Storage**: SQLite-backed entry store and TOML-based configuration.
//!
//! ## Key Components
//!
//! - [`Timetable`]: store, recurrence resolver and scheduler wired together
//! - [`TaskStore`]: persistence seam, with [`TimetableDb`] and [`MemoryStore`]
//! - [`NotificationSink`]: delivery seam for reminder batches
//! - [`Config`]: Application configuration management
//!
//! All "now" values are local wall-clock [`chrono::NaiveDateTime`]s supplied
//! by the caller.

pub mod agenda;
pub mod entry;
pub mod error;
pub mod ledger;
pub mod occurrence;
pub mod planner;
pub mod recurrence;
pub mod reminder;
pub mod storage;

pub use entry::{Entry, EntryDraft, EntryId, EntryPatch, Priority, Recurrence};
pub use error::{ConfigError, CoreError, DatabaseError, SinkError, ValidationError};
pub use ledger::{CompletionLedger, CompletionLogEntry};
pub use planner::{EntryStatus, Timetable};
pub use recurrence::{effective_status, set_completion, CompletionChange};
pub use reminder::{
    MemorySink, NotificationSink, OutboxSink, PassOutcome, ReminderEvent, ReminderScheduler,
    ReminderSettings, SchedulePass,
};
pub use storage::{Config, MemoryStore, TaskStore, TimetableDb};
