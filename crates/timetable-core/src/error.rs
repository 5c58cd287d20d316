//! Core error types for timetable-core.
//!
//! This module defines the error hierarchy using thiserror. Store and
//! validation failures propagate to callers; sink failures are recovered
//! inside the reminder scheduler and only surface through its pass report.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for timetable-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The referenced entry does not exist in the task store
    #[error("Entry not found: {id}")]
    NotFound { id: String },

    /// The notification sink rejected a request
    #[error("Notification sink error: {0}")]
    Sink(#[from] SinkError),
}

impl CoreError {
    pub fn not_found(id: impl Into<String>) -> Self {
        CoreError::NotFound { id: id.into() }
    }
}

/// Database-specific errors.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Migration failed
    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    /// A stored row could not be decoded
    #[error("Corrupt row in '{table}': {message}")]
    CorruptRow { table: &'static str, message: String },

    /// Database is locked
    #[error("Database is locked")]
    Locked,
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Unknown dot-path key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Home/config directory could not be resolved or created
    #[error("Data directory unavailable: {0}")]
    DataDir(String),
}

/// Validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },

    /// Time-of-day string is not `HH:MM`
    #[error("Invalid time '{0}': expected HH:MM")]
    InvalidTime(String),

    /// Weekday name not recognised
    #[error("Invalid weekday '{0}'")]
    InvalidWeekday(String),

    /// A weekly occurrence cannot be completed before it happens
    #[error("Occurrence on {due} has not happened yet")]
    OccurrenceNotDue { due: chrono::NaiveDate },
}

/// Notification sink errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SinkError {
    /// The platform refused permission to post reminders
    #[error("Permission to schedule reminders was denied")]
    PermissionDenied,

    /// The batch exceeds what the sink accepts
    #[error("Batch of {requested} reminders exceeds sink limit of {limit}")]
    QuotaExceeded { limit: usize, requested: usize },

    /// Delivery/transport failure
    #[error("Delivery failed: {0}")]
    Delivery(String),
}

/// A recurrence tag outside `None | Daily | Weekly`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Malformed recurrence tag '{tag}'")]
pub struct MalformedRecurrenceError {
    pub tag: String,
}

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, _msg) => {
                if e.code == rusqlite::ErrorCode::DatabaseLocked {
                    DatabaseError::Locked
                } else {
                    DatabaseError::QueryFailed(err.to_string())
                }
            }
            _ => DatabaseError::QueryFailed(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Database(err.into())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_includes_id() {
        let err = CoreError::not_found("abc");
        assert_eq!(err.to_string(), "Entry not found: abc");
    }

    #[test]
    fn locked_sqlite_maps_to_locked() {
        let err = rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error {
                code: rusqlite::ErrorCode::DatabaseLocked,
                extended_code: 6,
            },
            None,
        );
        assert!(matches!(DatabaseError::from(err), DatabaseError::Locked));
    }

    #[test]
    fn sink_error_converts_into_core_error() {
        let err: CoreError = SinkError::PermissionDenied.into();
        assert!(matches!(err, CoreError::Sink(SinkError::PermissionDenied)));
    }
}
