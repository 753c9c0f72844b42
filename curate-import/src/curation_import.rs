//! Import a single curation into the library.
//!
//! The import is staged: content is copied into
//! `<games_dir>/.staging/<curation key>/` first, then renamed into
//! `<games_dir>/<game id>/`. Images are added next, and registering the game
//! in the catalog is the final, committing step. If anything after the
//! rename fails, the images and the game folder are removed again, so a
//! failed import leaves no trace in the library.

use std::fs;
use std::path::{Path, PathBuf};

use curate_core::meta::fields;
use curate_core::{
    AssetRef, Curation, GameCatalog, ImageCollection, ImageRole, LibraryGame, generate_key,
    validate_key,
};

use crate::error::ImportError;
use crate::stage::{StagingGuard, read_asset, stage_content};

/// Folder under the games directory that holds in-progress imports.
pub const STAGING_DIR_NAME: &str = ".staging";

/// File written into the game folder when [`ImportOptions::save_curation`] is set.
pub const CURATION_FILE_NAME: &str = "curation.json";

/// The library an import writes into.
pub struct Library<'a> {
    pub catalog: &'a mut dyn GameCatalog,
    pub images: &'a mut dyn ImageCollection,
    /// Parent folder of every game's content folder.
    pub games_dir: PathBuf,
}

#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    /// Keep a copy of the curation record in the game folder. Stands in for
    /// the legacy "remove from add-apps staging on success" flag: staging is
    /// always cleared here, so the flag instead controls the saved record.
    pub save_curation: bool,
    /// Fixed `date_added` timestamp; the current time when `None`.
    pub date_added: Option<String>,
}

/// What a successful import produced.
#[derive(Debug, Clone)]
pub struct ImportedGame {
    pub game: LibraryGame,
    /// The game's content folder, if one was created.
    pub content_dir: Option<PathBuf>,
    /// Image files added to the image collection.
    pub images: Vec<PathBuf>,
    /// Number of content files copied.
    pub files: usize,
}

/// Import one curation. Curations with a malformed key, blocked curations
/// and untitled ones are rejected before anything is written.
pub fn import_curation(
    curation: &Curation,
    library: &mut Library<'_>,
    options: &ImportOptions,
) -> Result<ImportedGame, ImportError> {
    // The key names the staging folder.
    if !validate_key(&curation.key) {
        return Err(ImportError::InvalidKey(curation.key.clone()));
    }
    if curation.is_blocked() {
        return Err(ImportError::Blocked {
            key: curation.key.clone(),
            count: curation.errors.len(),
        });
    }
    if curation.meta.is_unset(fields::TITLE) {
        return Err(ImportError::MissingTitle(curation.key.clone()));
    }

    let game = build_game(curation, options);
    log::debug!(
        "Importing curation {} as game {} ('{}')",
        curation.key,
        game.id,
        curation.meta.display_title()
    );

    // Stage and promote the game folder.
    let (content_dir, files, mut promoted) = if curation.content.is_some() || options.save_curation
    {
        let (dir, files, guard) = stage_and_promote(curation, &game, library, options)?;
        (Some(dir), files, Some(guard))
    } else {
        (None, 0, None)
    };

    // Images, then the committing catalog write.
    let mut images = Vec::new();
    let committed = add_images(curation, &game, library, &mut images).and_then(|()| {
        library
            .catalog
            .add_game(&game)
            .map_err(ImportError::Catalog)
    });

    if let Err(e) = committed {
        for path in &images {
            if let Err(err) = library.images.remove_image(path) {
                log::warn!("Could not roll back image {}: {}", path.display(), err);
            }
        }
        // Dropping `promoted` removes the game folder.
        return Err(e);
    }

    if let Some(guard) = promoted.as_mut() {
        guard.disarm();
    }
    log::info!(
        "Imported '{}' ({} file(s), {} image(s))",
        game.meta.display_title(),
        files,
        images.len()
    );

    Ok(ImportedGame {
        game,
        content_dir,
        images,
        files,
    })
}

fn build_game(curation: &Curation, options: &ImportOptions) -> LibraryGame {
    LibraryGame {
        id: generate_key(),
        meta: curation.meta.clone(),
        add_apps: curation.add_apps.iter().map(|a| a.meta.clone()).collect(),
        date_added: options
            .date_added
            .clone()
            .unwrap_or_else(|| chrono::Utc::now().to_rfc3339()),
    }
}

/// Copy content into a staging folder, then rename it to the game folder.
///
/// The returned guard removes the game folder unless disarmed.
fn stage_and_promote(
    curation: &Curation,
    game: &LibraryGame,
    library: &Library<'_>,
    options: &ImportOptions,
) -> Result<(PathBuf, usize, StagingGuard), ImportError> {
    let target = library.games_dir.join(&game.id);
    if target.exists() {
        return Err(ImportError::TargetExists(target));
    }

    let staging_path = library.games_dir.join(STAGING_DIR_NAME).join(&curation.key);
    if staging_path.exists() {
        // Leftover from an interrupted run of this same curation.
        fs::remove_dir_all(&staging_path)?;
    }
    fs::create_dir_all(&staging_path)?;
    let mut staging = StagingGuard::new(staging_path);

    let files = match &curation.content {
        Some(content) => stage_content(content, staging.path())?,
        None => 0,
    };
    if options.save_curation {
        write_curation_file(curation, staging.path())?;
    }

    fs::rename(staging.path(), &target)?;
    staging.disarm();
    Ok((target.clone(), files, StagingGuard::new(target)))
}

fn write_curation_file(curation: &Curation, dir: &Path) -> Result<(), ImportError> {
    let json = serde_json::to_string_pretty(curation)?;
    fs::write(dir.join(CURATION_FILE_NAME), json)?;
    Ok(())
}

fn add_images(
    curation: &Curation,
    game: &LibraryGame,
    library: &mut Library<'_>,
    added: &mut Vec<PathBuf>,
) -> Result<(), ImportError> {
    let assets = [
        (ImageRole::Thumbnail, &curation.thumbnail),
        (ImageRole::Screenshot, &curation.screenshot),
    ];
    for (role, asset) in assets {
        let Some(asset) = asset else {
            continue;
        };
        let data = read_asset(asset)?;
        let ext = image_extension(asset);
        let path = library
            .images
            .add_image(game, role, &data, &ext)
            .map_err(ImportError::Image)?;
        added.push(path);
    }
    Ok(())
}

fn image_extension(asset: &AssetRef) -> String {
    asset.extension().unwrap_or_else(|| "png".to_string())
}
