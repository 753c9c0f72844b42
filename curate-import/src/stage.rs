//! Copying curation content and media out of their sources.

use std::fs::{self, File};
use std::io::Read;
use std::path::{Component, Path, PathBuf};

use curate_core::{AssetRef, ContentRef};
use walkdir::WalkDir;

use crate::error::ImportError;

const MACOS_METADATA_DIR: &str = "__MACOSX";

/// Removes a directory tree when dropped, unless disarmed.
pub(crate) struct StagingGuard {
    path: PathBuf,
    armed: bool,
}

impl StagingGuard {
    pub(crate) fn new(path: PathBuf) -> Self {
        Self { path, armed: true }
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for StagingGuard {
    fn drop(&mut self) {
        if self.armed {
            if let Err(e) = fs::remove_dir_all(&self.path) {
                if e.kind() != std::io::ErrorKind::NotFound {
                    log::warn!("Could not clean up {}: {}", self.path.display(), e);
                }
            }
        }
    }
}

/// Copy a curation's content into `dest`, which must already exist.
/// Returns the number of files written.
pub(crate) fn stage_content(content: &ContentRef, dest: &Path) -> Result<usize, ImportError> {
    match content {
        ContentRef::Folder { path } => copy_folder(path, dest),
        ContentRef::Archive { archive, prefix } => extract_prefix(archive, prefix, dest),
    }
}

fn copy_folder(source: &Path, dest: &Path) -> Result<usize, ImportError> {
    if !source.is_dir() {
        return Err(ImportError::content(format!(
            "content folder {} is missing",
            source.display()
        )));
    }

    let mut files = 0;
    for entry in WalkDir::new(source)
        .min_depth(1)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| e.file_name() != MACOS_METADATA_DIR)
    {
        let entry = entry.map_err(|e| ImportError::content(e.to_string()))?;
        let rel = entry
            .path()
            .strip_prefix(source)
            .map_err(|e| ImportError::content(e.to_string()))?;
        let target = dest.join(rel);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else if entry.file_type().is_file() {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(entry.path(), &target)?;
            files += 1;
        }
    }
    Ok(files)
}

/// A `/`-separated relative path that stays inside its destination.
fn safe_relative(rel: &str) -> Option<PathBuf> {
    let path = Path::new(rel);
    path.components()
        .all(|c| matches!(c, Component::Normal(_)))
        .then(|| path.to_path_buf())
}

/// Extract every archive entry under `prefix` (matched case-insensitively)
/// into `dest`, with the prefix stripped.
fn extract_prefix(archive: &Path, prefix: &str, dest: &Path) -> Result<usize, ImportError> {
    let mut zip = zip::ZipArchive::new(File::open(archive)?)?;

    let mut files = 0;
    for i in 0..zip.len() {
        let mut entry = zip.by_index(i)?;
        let name = entry.name().replace('\\', "/");
        let Some(head) = name.get(..prefix.len()) else {
            continue;
        };
        if !head.eq_ignore_ascii_case(prefix) {
            continue;
        }
        let rel = name[prefix.len()..].trim_end_matches('/');
        if rel.is_empty() || rel.split('/').any(|p| p == MACOS_METADATA_DIR) {
            continue;
        }
        let Some(rel_path) = safe_relative(rel) else {
            log::warn!("Skipping unsafe archive entry '{}' in {}", name, archive.display());
            continue;
        };

        let target = dest.join(rel_path);
        if entry.is_dir() {
            fs::create_dir_all(&target)?;
            continue;
        }
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut out = File::create(&target)?;
        std::io::copy(&mut entry, &mut out)?;
        files += 1;
    }
    Ok(files)
}

/// Read an image asset into memory.
pub(crate) fn read_asset(asset: &AssetRef) -> Result<Vec<u8>, ImportError> {
    match asset {
        AssetRef::File { path } => Ok(fs::read(path)?),
        AssetRef::Archive { archive, entry } => {
            let mut zip = zip::ZipArchive::new(File::open(archive)?)?;
            // `entry` uses `/`; the archive may store `\` separators.
            let index = (0..zip.len())
                .find(|&i| {
                    zip.name_for_index(i)
                        .is_some_and(|name| name.replace('\\', "/") == *entry)
                })
                .ok_or(zip::result::ZipError::FileNotFound)?;
            let mut file = zip.by_index(index)?;
            let mut bytes = Vec::new();
            file.read_to_end(&mut bytes)?;
            Ok(bytes)
        }
    }
}
