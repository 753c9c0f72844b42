//! Game library persistence.
//!
//! Provides the SQLite-backed game catalog (schema, registration, queries)
//! and the filesystem image collection used by the import pipeline.

pub mod catalog;
pub mod images;
pub mod schema;

pub use catalog::{CatalogError, SqliteCatalog, count_games, find_game, platform_counts};
pub use images::FsImageCollection;
pub use schema::{SchemaError, open_database, open_memory};
