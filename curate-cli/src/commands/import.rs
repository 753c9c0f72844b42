use curate_core::Curation;
use curate_import::{ImportOptions, Library, LogProgress, SilentProgress, import_all};

use super::Context;
use crate::error::CliError;

/// Import queued curations, either the listed keys or all of them.
pub(crate) fn run_import(
    ctx: &Context,
    keys: Vec<String>,
    all: bool,
    save_curation: bool,
) -> Result<(), CliError> {
    let mut catalog = ctx.open_catalog()?;
    let mut images = ctx.open_images();
    let mut queue = ctx.open_queue()?;

    let selected: Vec<Curation> = if all || keys.is_empty() {
        queue.curations().to_vec()
    } else {
        keys.iter()
            .map(|k| {
                queue
                    .get(k)
                    .cloned()
                    .ok_or_else(|| CliError::UnknownCuration(k.clone()))
            })
            .collect::<Result<_, _>>()?
    };

    if selected.is_empty() {
        log::info!("Nothing to import.");
        return Ok(());
    }

    let mut library = Library {
        catalog: &mut catalog,
        images: &mut images,
        games_dir: ctx.layout.games_dir(),
    };
    let options = ImportOptions {
        save_curation,
        date_added: None,
    };

    let stats = if ctx.quiet {
        import_all(&selected, &mut library, &options, &mut queue, &SilentProgress)
    } else {
        import_all(&selected, &mut library, &options, &mut queue, &LogProgress)
    };

    if stats.failed > 0 {
        return Err(CliError::ImportFailed {
            failed: stats.failed,
            total: stats.total,
        });
    }
    Ok(())
}
