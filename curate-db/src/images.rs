//! Filesystem image collection.
//!
//! Images are stored as `<root>/<platform>/<Logos|Screenshots>/<game id>.<ext>`.
//! Games without a platform go under `Unknown`.

use std::path::{Path, PathBuf};

use curate_core::{ImageCollection, ImageRole, LibraryError, LibraryGame};

pub struct FsImageCollection {
    root: PathBuf,
}

impl FsImageCollection {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Where an image for `game` in `role` would be written.
    pub fn image_path(&self, game: &LibraryGame, role: ImageRole, extension: &str) -> PathBuf {
        let platform = game
            .meta
            .platform
            .as_deref()
            .map(sanitize_component)
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| "Unknown".to_string());
        let ext = extension.trim_start_matches('.').to_lowercase();
        self.root
            .join(platform)
            .join(role.folder_name())
            .join(format!("{}.{}", game.id, ext))
    }
}

impl ImageCollection for FsImageCollection {
    fn add_image(
        &mut self,
        game: &LibraryGame,
        role: ImageRole,
        data: &[u8],
        extension: &str,
    ) -> Result<PathBuf, LibraryError> {
        let path = self.image_path(game, role, extension);
        if path.exists() {
            return Err(LibraryError::AlreadyExists(path.display().to_string()));
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let tmp = path.with_extension("tmp");
        std::fs::write(&tmp, data)?;
        std::fs::rename(&tmp, &path)?;

        log::debug!("Stored {} for {} at {}", role.as_str(), game.id, path.display());
        Ok(path)
    }

    fn remove_image(&mut self, path: &Path) -> Result<(), LibraryError> {
        match std::fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Make a platform name safe to use as a single path component.
fn sanitize_component(name: &str) -> String {
    name.trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect::<String>()
        .trim_matches('.')
        .to_string()
}
