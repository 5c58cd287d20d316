//! Database schema migrations for timetable.
//!
//! Migrations are versioned and applied automatically when opening the database.
//! The `schema_version` table tracks the current migration version.

use rusqlite::{Connection, Result as SqliteResult};

/// Current schema version.
pub const SCHEMA_VERSION: i32 = 2;

/// Apply all pending migrations to bring the database to the current schema version.
///
/// # Errors
/// Returns an error if migration fails.
pub fn migrate(conn: &Connection) -> SqliteResult<()> {
    create_schema_version_table(conn)?;

    let current_version = get_schema_version(conn);

    if current_version < 1 {
        migrate_v1(conn)?;
    }
    if current_version < 2 {
        migrate_v2(conn)?;
    }

    Ok(())
}

fn create_schema_version_table(conn: &Connection) -> SqliteResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY
        );",
    )
}

/// Returns 0 if no version is set (initial database).
pub fn get_schema_version(conn: &Connection) -> i32 {
    conn.query_row("SELECT version FROM schema_version", [], |row| {
        row.get::<_, i32>(0)
    })
    .unwrap_or_else(|e| {
        if !matches!(e, rusqlite::Error::QueryReturnedNoRows) {
            tracing::warn!(error = %e, "failed to read schema_version");
        }
        0
    })
}

fn set_schema_version(conn: &Connection, version: i32) -> SqliteResult<()> {
    conn.execute("DELETE FROM schema_version", [])?;
    conn.execute("INSERT INTO schema_version (version) VALUES (?1)", [version])?;
    Ok(())
}

/// Migration v1: entries and the completion log.
///
/// The composite primary key keeps `(task_id, completed_date)` unique at rest.
fn migrate_v1(conn: &Connection) -> SqliteResult<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute_batch(
        "CREATE TABLE IF NOT EXISTS entries (
            id           TEXT PRIMARY KEY,
            subject      TEXT NOT NULL,
            location     TEXT,
            notes        TEXT,
            day          TEXT NOT NULL,
            start_time   TEXT NOT NULL,
            end_time     TEXT NOT NULL,
            priority     TEXT NOT NULL DEFAULT 'Medium',
            recurrence   TEXT NOT NULL DEFAULT 'None',
            alert_offset INTEGER NOT NULL DEFAULT 0,
            completed    INTEGER NOT NULL DEFAULT 0,
            created_at   TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS completion_log (
            task_id        TEXT NOT NULL,
            completed_date TEXT NOT NULL,
            PRIMARY KEY (task_id, completed_date)
        );

        CREATE INDEX IF NOT EXISTS idx_entries_day ON entries(day);",
    )?;
    set_schema_version(&tx, 1)?;
    tx.commit()
}

/// Migration v2: normalise imported recurrence values.
///
/// Rows imported from older exports may hold the recurrence as a JSON
/// document (`{"type":"Weekly"}`) instead of the bare tag.
fn migrate_v2(conn: &Connection) -> SqliteResult<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute(
        "UPDATE entries
         SET recurrence = COALESCE(json_extract(recurrence, '$.type'), 'None')
         WHERE json_valid(recurrence) AND substr(trim(recurrence), 1, 1) = '{'",
        [],
    )?;
    tx.execute(
        "CREATE INDEX IF NOT EXISTS idx_completion_log_date ON completion_log(completed_date)",
        [],
    )?;
    set_schema_version(&tx, 2)?;
    tx.commit()
}
