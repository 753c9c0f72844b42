//! Curation ingestion: source indexing, library-derived defaults, the
//! pending-curation queue, and shared settings.

pub mod defaults;
pub mod indexer;
pub mod layout;
pub mod queue;
pub mod settings;
pub mod worker_pool;

pub use defaults::{apply_defaults, compute_defaults};
pub use indexer::{
    IndexedSource, SourceRequest, detect_source_type, index_curation_archive,
    index_curation_folder, index_launchbox_platform, index_meta_file, index_source,
    index_sources, index_sources_with_progress,
};
pub use layout::LibraryLayout;
pub use queue::{CurationAction, CurationDispatch, CurationQueue, QueueError};
pub use settings::Settings;
pub use worker_pool::WorkerPool;
