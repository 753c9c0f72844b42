use thiserror::Error;

/// Errors that can occur during CLI command execution.
#[derive(Debug, Error)]
pub(crate) enum CliError {
    /// I/O error
    #[error("{0}")]
    Io(#[from] std::io::Error),

    /// Catalog database could not be opened or queried
    #[error("Database error: {0}")]
    Database(String),

    /// Pending queue could not be read or updated
    #[error("Queue error: {0}")]
    Queue(#[from] curate_lib::QueueError),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(String),

    /// Runtime creation or async error
    #[error("Runtime error: {0}")]
    Runtime(String),

    /// Requested curation is not queued
    #[error("No queued curation with key {0}")]
    UnknownCuration(String),

    /// Some curations failed to import
    #[error("{failed} of {total} curation(s) failed to import")]
    ImportFailed { failed: usize, total: usize },
}

impl CliError {
    pub(crate) fn database(msg: impl std::fmt::Display) -> Self {
        Self::Database(msg.to_string())
    }

    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub(crate) fn runtime(msg: impl std::fmt::Display) -> Self {
        Self::Runtime(msg.to_string())
    }
}
