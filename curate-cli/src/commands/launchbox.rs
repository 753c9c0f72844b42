use std::path::Path;

use curate_core::{Curation, SourceType};
use curate_lib::{CurationAction, CurationDispatch, apply_defaults, index_launchbox_platform};
use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use super::{Context, log_diagnostics};
use crate::error::CliError;

/// Convert a LaunchBox platform file and queue one curation per game.
pub(crate) fn run_launchbox(
    ctx: &Context,
    xml: &Path,
    images: Option<&Path>,
    host: Option<&str>,
) -> Result<(), CliError> {
    let convert = ctx.settings.convert_context(host);
    log::debug!("Converting {} for host '{}'", xml.display(), convert.host);

    let catalog = ctx.open_catalog()?;
    let defaults = ctx.defaults(&catalog)?;
    let mut queue = ctx.open_queue()?;

    let (games, errors) = index_launchbox_platform(xml, images, &convert).into_parts();
    if !errors.is_empty() {
        log::warn!("{} problem(s) reading {}:", errors.len(), xml.display());
        log_diagnostics(&errors);
    }

    let source = xml.to_string_lossy().into_owned();
    let total = games.len();
    let mut with_images = 0;
    for index in games {
        let mut curation = Curation::from_index(source.clone(), SourceType::Meta, index);
        apply_defaults(&mut curation.meta, Some(&defaults));
        if curation.thumbnail.is_some() || curation.screenshot.is_some() {
            with_images += 1;
        }
        log::info!(
            "  {} {}",
            curation.key.if_supports_color(Stdout, |t| t.dimmed()),
            curation.meta.display_title()
        );
        queue.dispatch(CurationAction::Add(curation))?;
    }

    log::info!(
        "Queued {} game(s) from {} ({} with images).",
        total.if_supports_color(Stdout, |t| t.bold()),
        xml.display(),
        with_images
    );
    Ok(())
}
