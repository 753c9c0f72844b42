//! The pending-curation queue.
//!
//! Curations waiting to be imported live in a [`CurationQueue`]. The queue
//! is only changed through [`CurationAction`]s, applied in the order they
//! are dispatched. A queue opened with [`CurationQueue::load`] writes itself
//! back to `curations.json` after every action.

use std::io;
use std::path::{Path, PathBuf};

use curate_core::{Curation, validate_key};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// File name of the persisted queue inside the library root.
pub const QUEUE_FILE_NAME: &str = "curations.json";

#[derive(Debug, Error)]
pub enum QueueError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Queue file is corrupt: {0}")]
    Json(#[from] serde_json::Error),

    #[error("A curation with key {0} is already queued")]
    DuplicateKey(String),

    #[error("No queued curation has key {0}")]
    UnknownKey(String),

    #[error("Malformed curation key {0:?}")]
    InvalidKey(String),
}

/// A change to the pending queue.
#[derive(Debug, Clone, PartialEq)]
pub enum CurationAction {
    Add(Curation),
    Remove(String),
    Lock(String),
    Unlock(String),
}

/// Anything that accepts queue actions.
pub trait CurationDispatch {
    fn dispatch(&mut self, action: CurationAction) -> Result<(), QueueError>;
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct QueueFile {
    curations: Vec<Curation>,
}

/// Ordered store of pending curations, keyed by curation key.
#[derive(Debug, Default)]
pub struct CurationQueue {
    curations: Vec<Curation>,
    path: Option<PathBuf>,
}

impl CurationQueue {
    /// An empty queue that is never written to disk.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Load the queue from `path`, or start empty if the file does not exist.
    ///
    /// Lock flags are cleared on load: a lock only lives as long as the
    /// import attempt that set it. A file holding a malformed key is refused.
    pub fn load(path: &Path) -> Result<Self, QueueError> {
        let mut curations = match std::fs::read_to_string(path) {
            Ok(text) => serde_json::from_str::<QueueFile>(&text)?.curations,
            Err(e) if e.kind() == io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };
        if let Some(bad) = curations.iter().find(|c| !validate_key(&c.key)) {
            return Err(QueueError::InvalidKey(bad.key.clone()));
        }

        let stale = curations.iter().filter(|c| c.locked).count();
        if stale > 0 {
            log::warn!("Clearing {} stale lock(s) from {}", stale, path.display());
            for c in &mut curations {
                c.locked = false;
            }
        }

        Ok(Self {
            curations,
            path: Some(path.to_path_buf()),
        })
    }

    /// Write the queue to its file, if it has one.
    pub fn save(&self) -> Result<(), QueueError> {
        self.write(&self.curations)
    }

    fn write(&self, curations: &[Curation]) -> Result<(), QueueError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = QueueFile {
            curations: curations.to_vec(),
        };
        let serialized = serde_json::to_string_pretty(&file)?;
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, serialized)?;
        std::fs::rename(&tmp, path)?;
        Ok(())
    }

    pub fn curations(&self) -> &[Curation] {
        &self.curations
    }

    pub fn get(&self, key: &str) -> Option<&Curation> {
        self.curations.iter().find(|c| c.key == key)
    }

    pub fn len(&self) -> usize {
        self.curations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.curations.is_empty()
    }

    /// Apply an action in memory without saving.
    pub fn apply(&mut self, action: CurationAction) -> Result<(), QueueError> {
        apply_to(&mut self.curations, action)
    }
}

fn position(curations: &[Curation], key: &str) -> Result<usize, QueueError> {
    curations
        .iter()
        .position(|c| c.key == key)
        .ok_or_else(|| QueueError::UnknownKey(key.to_string()))
}

fn apply_to(curations: &mut Vec<Curation>, action: CurationAction) -> Result<(), QueueError> {
    match action {
        CurationAction::Add(curation) => {
            if !validate_key(&curation.key) {
                return Err(QueueError::InvalidKey(curation.key));
            }
            if curations.iter().any(|c| c.key == curation.key) {
                return Err(QueueError::DuplicateKey(curation.key));
            }
            curations.push(curation);
        }
        CurationAction::Remove(key) => {
            let pos = position(curations, &key)?;
            curations.remove(pos);
        }
        CurationAction::Lock(key) => {
            let pos = position(curations, &key)?;
            curations[pos].locked = true;
        }
        CurationAction::Unlock(key) => {
            let pos = position(curations, &key)?;
            curations[pos].locked = false;
        }
    }
    Ok(())
}

impl CurationDispatch for CurationQueue {
    /// Apply and persist an action. The in-memory queue only changes once
    /// the file has been written.
    fn dispatch(&mut self, action: CurationAction) -> Result<(), QueueError> {
        let mut next = self.curations.clone();
        apply_to(&mut next, action)?;
        self.write(&next)?;
        self.curations = next;
        Ok(())
    }
}
