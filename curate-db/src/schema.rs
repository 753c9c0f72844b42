//! Catalog schema and version check.

use std::path::Path;

use rusqlite::{Connection, OptionalExtension};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Catalog schema v{found} is newer than this build supports (v{expected})")]
    VersionMismatch { expected: i32, found: i32 },
}

/// Schema version written by this build.
pub const CURRENT_VERSION: i32 = 1;

/// Create the catalog tables and record [`CURRENT_VERSION`].
/// Only run on a database that has no schema yet.
pub fn create_schema(conn: &Connection) -> Result<(), SchemaError> {
    conn.execute_batch(SCHEMA_SQL)?;
    conn.execute(
        "INSERT INTO schema_version (version) VALUES (?1)",
        [CURRENT_VERSION],
    )?;
    Ok(())
}

/// Open the catalog at `path`, creating it on first use.
pub fn open_database(path: &Path) -> Result<Connection, SchemaError> {
    let conn = Connection::open(path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;

    match stored_version(&conn)? {
        None => create_schema(&conn)?,
        Some(found) if found > CURRENT_VERSION => {
            return Err(SchemaError::VersionMismatch {
                expected: CURRENT_VERSION,
                found,
            });
        }
        Some(found) => log::debug!("Catalog {} at schema v{}", path.display(), found),
    }
    Ok(conn)
}

/// An in-memory catalog with the full schema, for tests.
pub fn open_memory() -> Result<Connection, SchemaError> {
    let conn = Connection::open_in_memory()?;
    conn.execute_batch("PRAGMA foreign_keys=ON;")?;
    create_schema(&conn)?;
    Ok(conn)
}

/// Highest recorded schema version, or `None` for a fresh database.
fn stored_version(conn: &Connection) -> Result<Option<i32>, SchemaError> {
    let table: Option<String> = conn
        .query_row(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name = 'schema_version'",
            [],
            |row| row.get(0),
        )
        .optional()?;
    if table.is_none() {
        return Ok(None);
    }
    let version: Option<i32> =
        conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(version)
}

const SCHEMA_SQL: &str = r#"
-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER NOT NULL,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- Registered games. The full metadata record lives in meta_json; the
-- columns duplicate the fields used for listing and default statistics.
CREATE TABLE IF NOT EXISTS games (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    platform TEXT,
    application_path TEXT,
    launch_command TEXT,
    language TEXT,
    play_mode TEXT,
    status TEXT,
    developer TEXT,
    publisher TEXT,
    meta_json TEXT NOT NULL,
    date_added TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_games_platform ON games(platform);
CREATE INDEX IF NOT EXISTS idx_games_title ON games(title);

-- Additional applications, ordered by position within their game
CREATE TABLE IF NOT EXISTS additional_apps (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    game_id TEXT NOT NULL REFERENCES games(id) ON DELETE CASCADE,
    position INTEGER NOT NULL,
    heading TEXT,
    application_path TEXT,
    launch_command TEXT,
    auto_run_before BOOLEAN NOT NULL DEFAULT 0,
    wait_for_exit BOOLEAN NOT NULL DEFAULT 0,
    UNIQUE(game_id, position)
);
CREATE INDEX IF NOT EXISTS idx_add_apps_game ON additional_apps(game_id);
"#;
