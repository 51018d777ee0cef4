use rusqlite::{Connection, OptionalExtension};
use std::path::Path;

use crate::roster::StudentRecord;

pub const DB_FILE_NAME: &str = "gradebook.sqlite3";

/// Fixed key the full record sequence is stored under.
const ROSTER_KEY: &str = "roster.records";
/// Timestamp of the last successful save.
const SAVED_AT_KEY: &str = "roster.savedAt";

pub fn open_db(workspace: &Path) -> anyhow::Result<Connection> {
    std::fs::create_dir_all(workspace)?;
    let db_path = workspace.join(DB_FILE_NAME);
    let conn = Connection::open(db_path)?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS settings(
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        )",
        [],
    )?;

    Ok(conn)
}

fn settings_set(conn: &Connection, key: &str, value: &str) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO settings(key, value) VALUES(?, ?)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        (key, value),
    )?;
    Ok(())
}

fn settings_get(conn: &Connection, key: &str) -> anyhow::Result<Option<String>> {
    let value = conn
        .query_row("SELECT value FROM settings WHERE key = ?", [key], |r| {
            r.get(0)
        })
        .optional()?;
    Ok(value)
}

/// Persist the full record sequence under the fixed key, stamping the save
/// time alongside it.
pub fn roster_save(conn: &Connection, records: &[StudentRecord]) -> anyhow::Result<()> {
    let payload = serde_json::to_string(records)?;
    settings_set(conn, ROSTER_KEY, &payload)?;
    settings_set(conn, SAVED_AT_KEY, &chrono::Utc::now().to_rfc3339())?;
    Ok(())
}

/// Load a prior save. `None` means a fresh workspace.
pub fn roster_load(conn: &Connection) -> anyhow::Result<Option<Vec<StudentRecord>>> {
    let Some(payload) = settings_get(conn, ROSTER_KEY)? else {
        return Ok(None);
    };
    let records: Vec<StudentRecord> = serde_json::from_str(&payload)?;
    Ok(Some(records))
}

pub fn roster_saved_at(conn: &Connection) -> anyhow::Result<Option<String>> {
    settings_get(conn, SAVED_AT_KEY)
}
