//! Core data model for curation ingestion.
//!
//! This crate defines the curation record, the normalized game metadata,
//! the tagged parse result type, and the traits through which the import
//! pipeline talks to a game library. It has no I/O of its own; parsers,
//! indexers, and persistence live in the other `curate-*` crates.

pub mod curation;
pub mod diagnostic;
pub mod key;
pub mod library;
pub mod meta;

pub use curation::{AddApp, AssetRef, ContentRef, Curation, CurationIndex, SourceType};
pub use diagnostic::{Diagnostic, DiagnosticKind, Parsed};
pub use key::{generate_key, validate_key};
pub use library::{
    GameCatalog, GameMetaDefaults, ImageCollection, ImageRole, LibraryError, LibraryGame,
};
pub use meta::{AddAppMeta, GameMeta, ParsedMeta};
