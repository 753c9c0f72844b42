//! Batch import progress reporting.

use crate::batch::BatchStats;

/// Trait for receiving progress updates during "import all".
pub trait BatchProgress {
    /// Called once before the first curation.
    fn on_start(&self, total: usize);

    /// Called after each curation, successful or not.
    fn on_curation(&self, current: usize, total: usize, title: &str, succeeded: bool);

    /// Called when the batch is done.
    fn on_complete(&self, stats: &BatchStats);
}

/// A no-op progress reporter that discards all updates.
pub struct SilentProgress;

impl BatchProgress for SilentProgress {
    fn on_start(&self, _total: usize) {}
    fn on_curation(&self, _current: usize, _total: usize, _title: &str, _succeeded: bool) {}
    fn on_complete(&self, _stats: &BatchStats) {}
}

/// A progress reporter that logs to the `log` crate.
pub struct LogProgress;

impl BatchProgress for LogProgress {
    fn on_start(&self, total: usize) {
        log::info!("Starting \"import all\" ({} curation(s))", total);
    }

    fn on_curation(&self, current: usize, total: usize, title: &str, succeeded: bool) {
        let status = if succeeded { "ok" } else { "FAILED" };
        log::info!("  [{}/{}] {} ... {}", current, total, title, status);
    }

    fn on_complete(&self, _stats: &BatchStats) {}
}
