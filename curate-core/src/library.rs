//! The game library as seen by the import pipeline.
//!
//! The catalog and the image store are external collaborators; the pipeline
//! only needs the narrow interfaces defined here. `curate-db` provides the
//! SQLite and filesystem implementations.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::meta::{AddAppMeta, GameMeta};

/// Errors reported by library collaborators.
#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backing store rejected the operation
    #[error("Storage error: {0}")]
    Storage(String),

    /// A game with this id is already registered
    #[error("Game already exists: {0}")]
    AlreadyExists(String),
}

impl LibraryError {
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }
}

/// A game registered in the library.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryGame {
    pub id: String,
    pub meta: GameMeta,
    pub add_apps: Vec<AddAppMeta>,
    /// RFC 3339 timestamp.
    pub date_added: String,
}

/// Role of an image attached to a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageRole {
    Thumbnail,
    Screenshot,
}

impl ImageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Thumbnail => "thumbnail",
            Self::Screenshot => "screenshot",
        }
    }

    /// Folder name used by the on-disk image layout.
    pub fn folder_name(&self) -> &'static str {
        match self {
            Self::Thumbnail => "Logos",
            Self::Screenshot => "Screenshots",
        }
    }
}

/// The game catalog: an append target plus a full listing for statistics.
pub trait GameCatalog {
    /// Every registered game.
    fn list_games(&self) -> Result<Vec<LibraryGame>, LibraryError>;

    /// Register a game and its additional applications.
    ///
    /// Implementations must make this all-or-nothing: on error, no part of
    /// the game may be visible through [`list_games`](Self::list_games).
    fn add_game(&mut self, game: &LibraryGame) -> Result<(), LibraryError>;
}

/// The image collection, keyed by game.
pub trait ImageCollection {
    /// Store an image for a game and return where it was written.
    fn add_image(
        &mut self,
        game: &LibraryGame,
        role: ImageRole,
        data: &[u8],
        extension: &str,
    ) -> Result<PathBuf, LibraryError>;

    /// Remove a previously added image. Used to roll back a failed import.
    fn remove_image(&mut self, path: &Path) -> Result<(), LibraryError>;
}

/// Default metadata values derived from the current library contents.
///
/// Computed once per session and passed explicitly; never mutated after.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameMetaDefaults {
    pub language: String,
    pub play_mode: String,
    pub status: String,
    pub platform: String,
    /// Platform name → default application path.
    pub add_paths: BTreeMap<String, String>,
}
