//! On-disk layout of a curate library.

use std::path::{Path, PathBuf};

use crate::queue::QUEUE_FILE_NAME;

pub const DATABASE_FILE_NAME: &str = "library.db";
pub const GAMES_DIR_NAME: &str = "Games";
pub const IMAGES_DIR_NAME: &str = "Images";

/// Paths inside a library root:
///
/// ```text
/// <root>/library.db       game catalog
/// <root>/Games/<id>/      imported game content
/// <root>/Images/...       logos and screenshots
/// <root>/curations.json   pending curation queue
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryLayout {
    root: PathBuf,
}

impl LibraryLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn database(&self) -> PathBuf {
        self.root.join(DATABASE_FILE_NAME)
    }

    pub fn games_dir(&self) -> PathBuf {
        self.root.join(GAMES_DIR_NAME)
    }

    pub fn images_dir(&self) -> PathBuf {
        self.root.join(IMAGES_DIR_NAME)
    }

    pub fn queue_file(&self) -> PathBuf {
        self.root.join(QUEUE_FILE_NAME)
    }

    /// Create the root, games and images directories if missing.
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(self.games_dir())?;
        std::fs::create_dir_all(self.images_dir())?;
        Ok(())
    }
}
