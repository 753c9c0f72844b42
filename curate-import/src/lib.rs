//! Import curations into a game library.
//!
//! [`import_curation`] commits a single curation with stage-then-commit
//! semantics. [`import_all`] runs a whole queue sequentially, isolating
//! each curation's failure from the rest.

pub mod batch;
pub mod curation_import;
pub mod error;
pub mod progress;
mod stage;

pub use batch::{BatchStats, import_all};
pub use curation_import::{
    CURATION_FILE_NAME, ImportOptions, ImportedGame, Library, STAGING_DIR_NAME, import_curation,
};
pub use error::ImportError;
pub use progress::{BatchProgress, LogProgress, SilentProgress};
