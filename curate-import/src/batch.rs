//! "Import all": import every pending curation, one at a time.

use curate_core::Curation;
use curate_lib::{CurationAction, CurationDispatch};

use crate::curation_import::{ImportOptions, Library, import_curation};
use crate::progress::BatchProgress;

/// Outcome counts of a batch import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchStats {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl BatchStats {
    /// Percentage of curations imported. Zero for an empty batch.
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            100.0 * self.succeeded as f64 / self.total as f64
        }
    }
}

fn send(dispatch: &mut dyn CurationDispatch, action: CurationAction) {
    if let Err(e) = dispatch.dispatch(action) {
        log::warn!("Queue update failed: {}", e);
    }
}

/// Import `curations` in order.
///
/// Every curation in the batch is locked first; other queued curations are
/// left alone. A success removes the curation from the queue; a failure is
/// logged, unlocks it, and the batch moves on. Blocked curations count as
/// failures.
pub fn import_all(
    curations: &[Curation],
    library: &mut Library<'_>,
    options: &ImportOptions,
    dispatch: &mut dyn CurationDispatch,
    progress: &dyn BatchProgress,
) -> BatchStats {
    let total = curations.len();
    let mut stats = BatchStats {
        total,
        ..Default::default()
    };
    progress.on_start(total);

    for curation in curations {
        send(dispatch, CurationAction::Lock(curation.key.clone()));
    }

    for (i, curation) in curations.iter().enumerate() {
        log::debug!("Importing... (key: {})", curation.key);
        let ok = match import_curation(curation, library, options) {
            Ok(_) => {
                stats.succeeded += 1;
                send(dispatch, CurationAction::Remove(curation.key.clone()));
                true
            }
            Err(e) => {
                stats.failed += 1;
                log::warn!(
                    "Import failed for '{}' (key: {}): {}",
                    curation.meta.display_title(),
                    curation.key,
                    e
                );
                send(dispatch, CurationAction::Unlock(curation.key.clone()));
                false
            }
        };
        progress.on_curation(i + 1, total, curation.meta.display_title(), ok);
    }

    log::info!(
        "\"Import all\" complete\n  Total:   {}\n  Success: {} ({:.1}%)\n  Failed:  {}",
        stats.total,
        stats.succeeded,
        stats.success_rate(),
        stats.failed
    );
    progress.on_complete(&stats);
    stats
}
