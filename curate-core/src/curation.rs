//! Curations: pending import units and the index records they are built from.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::diagnostic::Diagnostic;
use crate::key::generate_key;
use crate::meta::{AddAppMeta, GameMeta, ParsedMeta};

/// Where a curation was loaded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    Archive,
    Folder,
    Meta,
}

impl SourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Archive => "archive",
            Self::Folder => "folder",
            Self::Meta => "meta",
        }
    }
}

/// Location of a curation's content subtree, copied into the library on import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentRef {
    /// A directory on disk.
    Folder { path: PathBuf },
    /// All entries of a zip archive whose names start with `prefix`.
    ///
    /// `prefix` always ends in `/`.
    Archive { archive: PathBuf, prefix: String },
}

/// Location of a single media asset (thumbnail or screenshot).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AssetRef {
    /// A file on disk.
    File { path: PathBuf },
    /// A single zip entry.
    Archive { archive: PathBuf, entry: String },
}

impl AssetRef {
    /// Lowercase file extension of the asset, if any.
    pub fn extension(&self) -> Option<String> {
        let name = match self {
            Self::File { path } => path.file_name()?.to_str()?.to_string(),
            Self::Archive { entry, .. } => entry.rsplit('/').next()?.to_string(),
        };
        let (_, ext) = name.rsplit_once('.')?;
        Some(ext.to_lowercase())
    }
}

/// The intermediate product of indexing a source.
///
/// Consumed exactly once by [`Curation::from_index`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CurationIndex {
    pub meta: ParsedMeta,
    pub content: Option<ContentRef>,
    pub thumbnail: Option<AssetRef>,
    pub screenshot: Option<AssetRef>,
    pub errors: Vec<Diagnostic>,
}

/// A secondary application attached to a curation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddApp {
    pub key: String,
    pub meta: AddAppMeta,
}

/// A pending import unit held in the curation queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Curation {
    /// Unique, immutable key.
    pub key: String,
    /// Archive path, folder path, or meta-file path.
    pub source: String,
    pub source_type: SourceType,
    pub meta: GameMeta,
    pub add_apps: Vec<AddApp>,
    #[serde(default)]
    pub content: Option<ContentRef>,
    #[serde(default)]
    pub thumbnail: Option<AssetRef>,
    #[serde(default)]
    pub screenshot: Option<AssetRef>,
    /// True while an import attempt is in flight.
    #[serde(default)]
    pub locked: bool,
    /// Problems found while indexing. Non-empty blocks import.
    #[serde(default)]
    pub errors: Vec<Diagnostic>,
}

impl Curation {
    /// Build a curation from an index record, assigning fresh keys to the
    /// curation and each of its additional applications.
    pub fn from_index(
        source: impl Into<String>,
        source_type: SourceType,
        index: CurationIndex,
    ) -> Self {
        let ParsedMeta { game, add_apps } = index.meta;
        Self {
            key: generate_key(),
            source: source.into(),
            source_type,
            meta: game,
            add_apps: add_apps
                .into_iter()
                .map(|meta| AddApp {
                    key: generate_key(),
                    meta,
                })
                .collect(),
            content: index.content,
            thumbnail: index.thumbnail,
            screenshot: index.screenshot,
            locked: false,
            errors: index.errors,
        }
    }

    /// Whether indexing problems prevent this curation from being imported.
    pub fn is_blocked(&self) -> bool {
        !self.errors.is_empty()
    }
}
