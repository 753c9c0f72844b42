//! SQLite game catalog.
//!
//! [`SqliteCatalog`] implements the pipeline's [`GameCatalog`] trait. A game
//! and its additional applications are written in one transaction, so a
//! failed registration leaves nothing behind.

use std::collections::HashMap;
use std::path::Path;

use curate_core::{AddAppMeta, GameCatalog, GameMeta, LibraryError, LibraryGame};
use rusqlite::{Connection, OptionalExtension, params};
use thiserror::Error;

use crate::schema::{self, SchemaError};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),
    #[error("Metadata encoding error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Game already exists: {0}")]
    Duplicate(String),
    #[error("Game has no title: {0}")]
    MissingTitle(String),
}

impl From<CatalogError> for LibraryError {
    fn from(e: CatalogError) -> Self {
        match e {
            CatalogError::Duplicate(id) => LibraryError::AlreadyExists(id),
            other => LibraryError::storage(other.to_string()),
        }
    }
}

/// A game catalog stored in SQLite.
pub struct SqliteCatalog {
    conn: Connection,
}

impl SqliteCatalog {
    /// Open or create the catalog database at `path`.
    pub fn open(path: &Path) -> Result<Self, CatalogError> {
        Ok(Self {
            conn: schema::open_database(path)?,
        })
    }

    /// An in-memory catalog. Useful for testing.
    pub fn open_memory() -> Result<Self, CatalogError> {
        Ok(Self {
            conn: schema::open_memory()?,
        })
    }

    /// Wrap an existing connection whose schema is already set up.
    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Register a game and its additional applications in one transaction.
    pub fn insert_game(&mut self, game: &LibraryGame) -> Result<(), CatalogError> {
        let title = game
            .meta
            .title
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| CatalogError::MissingTitle(game.id.clone()))?;

        let tx = self.conn.transaction()?;

        let exists: bool = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM games WHERE id = ?1)",
            params![game.id],
            |row| row.get(0),
        )?;
        if exists {
            return Err(CatalogError::Duplicate(game.id.clone()));
        }

        let meta_json = serde_json::to_string(&game.meta)?;
        tx.execute(
            "INSERT INTO games (id, title, platform, application_path, launch_command,
                 language, play_mode, status, developer, publisher, meta_json, date_added)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            params![
                game.id,
                title,
                game.meta.platform,
                game.meta.application_path,
                game.meta.launch_command,
                game.meta.language,
                game.meta.play_mode,
                game.meta.status,
                game.meta.developer,
                game.meta.publisher,
                meta_json,
                game.date_added,
            ],
        )?;

        for (position, app) in game.add_apps.iter().enumerate() {
            tx.execute(
                "INSERT INTO additional_apps (game_id, position, heading, application_path,
                     launch_command, auto_run_before, wait_for_exit)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    game.id,
                    position as i64,
                    app.heading,
                    app.application_path,
                    app.launch_command,
                    app.auto_run_before,
                    app.wait_for_exit,
                ],
            )?;
        }

        tx.commit()?;
        log::debug!(
            "Registered game {} ('{}') with {} additional app(s)",
            game.id,
            title,
            game.add_apps.len()
        );
        Ok(())
    }

    /// All games, ordered by title.
    pub fn all_games(&self) -> Result<Vec<LibraryGame>, CatalogError> {
        let mut add_apps = load_add_apps(&self.conn, None)?;
        let mut stmt = self
            .conn
            .prepare("SELECT id, meta_json, date_added FROM games ORDER BY title, id")?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?;

        let mut games = Vec::new();
        for row in rows {
            let (id, meta_json, date_added) = row?;
            let meta: GameMeta = serde_json::from_str(&meta_json)?;
            let apps = add_apps.remove(&id).unwrap_or_default();
            games.push(LibraryGame {
                id,
                meta,
                add_apps: apps,
                date_added,
            });
        }
        Ok(games)
    }
}

impl GameCatalog for SqliteCatalog {
    fn list_games(&self) -> Result<Vec<LibraryGame>, LibraryError> {
        Ok(self.all_games()?)
    }

    fn add_game(&mut self, game: &LibraryGame) -> Result<(), LibraryError> {
        Ok(self.insert_game(game)?)
    }
}

// ── Queries ─────────────────────────────────────────────────────────────────

/// Number of registered games.
pub fn count_games(conn: &Connection) -> Result<i64, CatalogError> {
    Ok(conn.query_row("SELECT COUNT(*) FROM games", [], |r| r.get(0))?)
}

/// Look up a single game by id.
pub fn find_game(conn: &Connection, id: &str) -> Result<Option<LibraryGame>, CatalogError> {
    let row = conn
        .query_row(
            "SELECT id, meta_json, date_added FROM games WHERE id = ?1",
            params![id],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            },
        )
        .optional()?;

    let Some((id, meta_json, date_added)) = row else {
        return Ok(None);
    };
    let meta: GameMeta = serde_json::from_str(&meta_json)?;
    let add_apps = load_add_apps(conn, Some(&id))?.remove(&id).unwrap_or_default();
    Ok(Some(LibraryGame {
        id,
        meta,
        add_apps,
        date_added,
    }))
}

/// Game counts per platform, most populous first. Games with no platform
/// are counted under an empty string.
pub fn platform_counts(conn: &Connection) -> Result<Vec<(String, i64)>, CatalogError> {
    let mut stmt = conn.prepare(
        "SELECT COALESCE(platform, ''), COUNT(*) FROM games
         GROUP BY COALESCE(platform, '') ORDER BY COUNT(*) DESC, 1",
    )?;
    let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

/// Load additional applications grouped by game id, in position order.
fn load_add_apps(
    conn: &Connection,
    game_id: Option<&str>,
) -> Result<HashMap<String, Vec<AddAppMeta>>, CatalogError> {
    let mut stmt = conn.prepare(
        "SELECT game_id, heading, application_path, launch_command, auto_run_before, wait_for_exit
         FROM additional_apps
         WHERE ?1 IS NULL OR game_id = ?1
         ORDER BY game_id, position",
    )?;
    let rows = stmt.query_map(params![game_id], |row| {
        Ok((
            row.get::<_, String>(0)?,
            AddAppMeta {
                heading: row.get(1)?,
                application_path: row.get(2)?,
                launch_command: row.get(3)?,
                auto_run_before: row.get(4)?,
                wait_for_exit: row.get(5)?,
            },
        ))
    })?;

    let mut grouped: HashMap<String, Vec<AddAppMeta>> = HashMap::new();
    for row in rows {
        let (game_id, app) = row?;
        grouped.entry(game_id).or_default().push(app);
    }
    Ok(grouped)
}
