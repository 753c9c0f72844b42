use std::path::PathBuf;

use curate_core::LibraryError;
use thiserror::Error;

/// Why a single curation could not be imported.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Malformed curation key {0:?}")]
    InvalidKey(String),

    #[error("Curation {key} has {count} unresolved problem(s)")]
    Blocked { key: String, count: usize },

    #[error("Curation {0} has no title")]
    MissingTitle(String),

    #[error("Content error: {0}")]
    Content(String),

    #[error("Game folder already exists: {}", .0.display())]
    TargetExists(PathBuf),

    #[error("Image error: {0}")]
    Image(#[source] LibraryError),

    #[error("Catalog error: {0}")]
    Catalog(#[source] LibraryError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Metadata encoding error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ImportError {
    pub fn content(msg: impl Into<String>) -> Self {
        Self::Content(msg.into())
    }
}
