pub(crate) mod config;
pub(crate) mod import;
pub(crate) mod index;
pub(crate) mod launchbox;
pub(crate) mod library;
pub(crate) mod queue;

use curate_core::{Diagnostic, GameCatalog, GameMetaDefaults};
use curate_db::{FsImageCollection, SqliteCatalog};
use curate_lib::settings::Settings;
use curate_lib::{CurationQueue, LibraryLayout, compute_defaults};
use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use crate::error::CliError;

/// Everything a command needs to find the library.
pub(crate) struct Context {
    pub layout: LibraryLayout,
    pub settings: Settings,
    pub quiet: bool,
}

impl Context {
    pub(crate) fn open_catalog(&self) -> Result<SqliteCatalog, CliError> {
        self.layout.ensure_dirs()?;
        SqliteCatalog::open(&self.layout.database()).map_err(CliError::database)
    }

    pub(crate) fn open_images(&self) -> FsImageCollection {
        FsImageCollection::new(self.layout.images_dir())
    }

    pub(crate) fn open_queue(&self) -> Result<CurationQueue, CliError> {
        Ok(CurationQueue::load(&self.layout.queue_file())?)
    }

    /// Defaults derived from the games currently in the catalog.
    pub(crate) fn defaults(&self, catalog: &SqliteCatalog) -> Result<GameMetaDefaults, CliError> {
        let games = catalog.list_games().map_err(CliError::database)?;
        Ok(compute_defaults(&games))
    }
}

pub(crate) fn log_diagnostics(errors: &[Diagnostic]) {
    for d in errors {
        log::info!(
            "    {} {}",
            format!("[{}]", d.kind.as_str()).if_supports_color(Stdout, |t| t.yellow()),
            d.message
        );
    }
}
