//! Notification sinks: where a scheduling pass delivers its batch.
//!
//! The core only decides *that* a reminder exists at an instant; a sink
//! owns delivery. Every pass calls `cancel_all` then `schedule_batch`.

use std::fs;
use std::path::{Path, PathBuf};

use super::ReminderEvent;
use crate::error::SinkError;

/// Consumer of reminder batches.
pub trait NotificationSink {
    /// Drop every reminder previously handed to this sink.
    fn cancel_all(&mut self) -> Result<(), SinkError>;

    /// Accept a full batch in one call.
    fn schedule_batch(&mut self, events: &[ReminderEvent]) -> Result<(), SinkError>;

    /// Largest batch this sink accepts.
    fn max_batch(&self) -> usize {
        usize::MAX
    }
}

/// Keeps the pending batch in memory. Used for dry runs and tests.
#[derive(Debug, Default)]
pub struct MemorySink {
    pending: Vec<ReminderEvent>,
    limit: Option<usize>,
    fail_next: Option<SinkError>,
    batches: usize,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            ..Self::default()
        }
    }

    /// Make the next `schedule_batch` call fail with `err`.
    pub fn fail_next(&mut self, err: SinkError) {
        self.fail_next = Some(err);
    }

    pub fn pending(&self) -> &[ReminderEvent] {
        &self.pending
    }

    /// Number of batches accepted so far.
    pub fn batches(&self) -> usize {
        self.batches
    }
}

impl NotificationSink for MemorySink {
    fn cancel_all(&mut self) -> Result<(), SinkError> {
        self.pending.clear();
        Ok(())
    }

    fn schedule_batch(&mut self, events: &[ReminderEvent]) -> Result<(), SinkError> {
        if let Some(err) = self.fail_next.take() {
            return Err(err);
        }
        if let Some(limit) = self.limit {
            if events.len() > limit {
                return Err(SinkError::QuotaExceeded {
                    limit,
                    requested: events.len(),
                });
            }
        }
        self.pending = events.to_vec();
        self.batches += 1;
        Ok(())
    }

    fn max_batch(&self) -> usize {
        self.limit.unwrap_or(usize::MAX)
    }
}

/// Writes the pending batch to a JSON file for an external delivery agent.
///
/// Writes go to a sibling temp file and are renamed into place, so readers
/// see either the old batch or the new one.
#[derive(Debug, Clone)]
pub struct OutboxSink {
    path: PathBuf,
}

impl OutboxSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read back what is currently pending. A missing file is an empty batch.
    pub fn read_pending(&self) -> Result<Vec<ReminderEvent>, SinkError> {
        match fs::read_to_string(&self.path) {
            Ok(content) => {
                serde_json::from_str(&content).map_err(|e| SinkError::Delivery(e.to_string()))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(io_error(e)),
        }
    }

    fn write(&self, events: &[ReminderEvent]) -> Result<(), SinkError> {
        let json = serde_json::to_string_pretty(events)
            .map_err(|e| SinkError::Delivery(e.to_string()))?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(io_error)?;
        fs::rename(&tmp, &self.path).map_err(io_error)
    }
}

fn io_error(err: std::io::Error) -> SinkError {
    if err.kind() == std::io::ErrorKind::PermissionDenied {
        SinkError::PermissionDenied
    } else {
        SinkError::Delivery(err.to_string())
    }
}

impl NotificationSink for OutboxSink {
    fn cancel_all(&mut self) -> Result<(), SinkError> {
        self.write(&[])
    }

    fn schedule_batch(&mut self, events: &[ReminderEvent]) -> Result<(), SinkError> {
        self.write(events)
    }
}
