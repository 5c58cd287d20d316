//! SQLite-based storage for timetable entries and the completion log.

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use uuid::Uuid;

use super::{data_dir, migrations, TaskStore};
use crate::entry::wire::{format_time, parse_time, parse_weekday, weekday_name, RawRecurrence};
use crate::entry::{Entry, EntryDraft, EntryPatch, Priority, Recurrence};
use crate::error::{CoreError, DatabaseError, Result};
use crate::ledger::{CompletionLedger, CompletionLogEntry};

const ENTRY_COLUMNS: &str = "id, subject, location, notes, day, start_time, end_time, priority,
     recurrence, alert_offset, completed, created_at";

const DATE_FORMAT: &str = "%Y-%m-%d";

fn corrupt(table: &'static str, message: impl Into<String>) -> CoreError {
    DatabaseError::CorruptRow {
        table,
        message: message.into(),
    }
    .into()
}

/// Raw column values; decoded outside the rusqlite row closure so decode
/// failures can carry our own error type.
struct EntryRow {
    id: String,
    subject: String,
    location: Option<String>,
    notes: Option<String>,
    day: String,
    start_time: String,
    end_time: String,
    priority: String,
    recurrence: String,
    alert_offset: i64,
    completed: bool,
    created_at: String,
}

impl EntryRow {
    fn read(row: &rusqlite::Row) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            id: row.get(0)?,
            subject: row.get(1)?,
            location: row.get(2)?,
            notes: row.get(3)?,
            day: row.get(4)?,
            start_time: row.get(5)?,
            end_time: row.get(6)?,
            priority: row.get(7)?,
            recurrence: row.get(8)?,
            alert_offset: row.get(9)?,
            completed: row.get(10)?,
            created_at: row.get(11)?,
        })
    }

    fn decode(self) -> Result<Entry> {
        let id = self.id;
        let field = |name: &str, err: &dyn std::fmt::Display| {
            corrupt("entries", format!("{id}.{name}: {err}"))
        };

        let day = parse_weekday(&self.day).map_err(|e| field("day", &e))?;
        let start_time = parse_time(&self.start_time).map_err(|e| field("start_time", &e))?;
        let end_time = parse_time(&self.end_time).map_err(|e| field("end_time", &e))?;
        let priority = self.priority.parse::<Priority>().unwrap_or_default();
        let alert_offset_minutes =
            u32::try_from(self.alert_offset).map_err(|e| field("alert_offset", &e))?;
        let created_at = DateTime::parse_from_rfc3339(&self.created_at)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| field("created_at", &e))?;
        let recurrence = Recurrence::from(RawRecurrence::Encoded(self.recurrence));

        Ok(Entry {
            id,
            subject: self.subject,
            location: self.location,
            notes: self.notes,
            day,
            start_time,
            end_time,
            priority,
            recurrence,
            alert_offset_minutes,
            completed: self.completed,
            created_at,
        })
    }
}

/// SQLite database for timetable storage.
pub struct TimetableDb {
    conn: Connection,
}

impl TimetableDb {
    /// Open the database at `~/.config/timetable/timetable.db`.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        let path = data_dir()?.join("timetable.db");
        Self::open_at(&path)
    }

    /// Open (or create) the database at an explicit path.
    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    fn migrate(&self) -> Result<()> {
        migrations::migrate(&self.conn)
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        Ok(())
    }

    fn exists(&self, id: &str) -> Result<bool> {
        let found = self
            .conn
            .query_row("SELECT 1 FROM entries WHERE id = ?1", params![id], |_| Ok(()))
            .optional()?;
        Ok(found.is_some())
    }

    fn ensure_exists(&self, id: &str) -> Result<()> {
        if self.exists(id)? {
            Ok(())
        } else {
            Err(CoreError::not_found(id))
        }
    }

    fn insert_entry(&self, entry: &Entry) -> Result<()> {
        self.conn.execute(
            &format!(
                "INSERT INTO entries ({ENTRY_COLUMNS})
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)"
            ),
            params![
                entry.id,
                entry.subject,
                entry.location,
                entry.notes,
                weekday_name(entry.day),
                format_time(entry.start_time),
                format_time(entry.end_time),
                entry.priority.as_str(),
                entry.recurrence.as_tag(),
                i64::from(entry.alert_offset_minutes),
                entry.completed,
                entry.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    fn write_entry(&self, entry: &Entry) -> Result<()> {
        self.conn.execute(
            "UPDATE entries
             SET subject = ?2, location = ?3, notes = ?4, day = ?5, start_time = ?6,
                 end_time = ?7, priority = ?8, recurrence = ?9, alert_offset = ?10,
                 completed = ?11
             WHERE id = ?1",
            params![
                entry.id,
                entry.subject,
                entry.location,
                entry.notes,
                weekday_name(entry.day),
                format_time(entry.start_time),
                format_time(entry.end_time),
                entry.priority.as_str(),
                entry.recurrence.as_tag(),
                i64::from(entry.alert_offset_minutes),
                entry.completed,
            ],
        )?;
        Ok(())
    }
}

impl TaskStore for TimetableDb {
    fn list(&self) -> Result<Vec<Entry>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {ENTRY_COLUMNS} FROM entries ORDER BY created_at ASC, id ASC"
        ))?;
        let rows = stmt.query_map([], EntryRow::read)?;
        let mut entries = Vec::new();
        for row in rows {
            entries.push(row?.decode()?);
        }
        Ok(entries)
    }

    fn get(&self, id: &str) -> Result<Option<Entry>> {
        let row = self
            .conn
            .query_row(
                &format!("SELECT {ENTRY_COLUMNS} FROM entries WHERE id = ?1"),
                params![id],
                EntryRow::read,
            )
            .optional()?;
        row.map(EntryRow::decode).transpose()
    }

    fn create(&mut self, draft: EntryDraft) -> Result<Entry> {
        draft.validate()?;
        let entry = draft.into_entry(Uuid::new_v4().to_string(), Utc::now());
        self.insert_entry(&entry)?;
        tracing::debug!(id = %entry.id, "entry created");
        Ok(entry)
    }

    fn update(&mut self, id: &str, patch: EntryPatch) -> Result<Entry> {
        patch.validate()?;
        let mut entry = self.get(id)?.ok_or_else(|| CoreError::not_found(id))?;
        patch.apply(&mut entry);
        self.write_entry(&entry)?;
        Ok(entry)
    }

    fn delete(&mut self, id: &str) -> Result<()> {
        let tx = self.conn.transaction()?;
        let removed = tx.execute("DELETE FROM entries WHERE id = ?1", params![id])?;
        if removed == 0 {
            return Err(CoreError::not_found(id));
        }
        let purged = tx.execute("DELETE FROM completion_log WHERE task_id = ?1", params![id])?;
        tx.commit()?;
        tracing::debug!(id, purged, "entry deleted");
        Ok(())
    }

    fn ledger(&self) -> Result<CompletionLedger> {
        let mut stmt = self
            .conn
            .prepare("SELECT task_id, completed_date FROM completion_log")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;
        let mut ledger = Vec::new();
        for row in rows {
            let (task_id, raw_date) = row?;
            let completed_date = NaiveDate::parse_from_str(&raw_date, DATE_FORMAT)
                .map_err(|e| corrupt("completion_log", format!("{task_id}/{raw_date}: {e}")))?;
            ledger.push(CompletionLogEntry {
                task_id,
                completed_date,
            });
        }
        Ok(ledger.into_iter().collect())
    }

    fn mark_completed(&mut self, id: &str, date: NaiveDate) -> Result<()> {
        self.ensure_exists(id)?;
        self.conn.execute(
            "INSERT OR IGNORE INTO completion_log (task_id, completed_date) VALUES (?1, ?2)",
            params![id, date.format(DATE_FORMAT).to_string()],
        )?;
        Ok(())
    }

    fn mark_incomplete(&mut self, id: &str, date: NaiveDate) -> Result<()> {
        self.ensure_exists(id)?;
        self.conn.execute(
            "DELETE FROM completion_log WHERE task_id = ?1 AND completed_date = ?2",
            params![id, date.format(DATE_FORMAT).to_string()],
        )?;
        Ok(())
    }
}
