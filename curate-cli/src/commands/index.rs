use std::path::PathBuf;
use std::time::Duration;

use curate_core::Curation;
use curate_lib::{CurationAction, CurationDispatch, SourceRequest, apply_defaults};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use super::{Context, log_diagnostics};
use crate::error::CliError;

/// Index sources and add the results to the pending queue.
pub(crate) fn run_index(
    ctx: &Context,
    sources: Vec<PathBuf>,
    workers: Option<usize>,
) -> Result<(), CliError> {
    let workers = workers.unwrap_or(ctx.settings.indexing.workers).max(1);
    let catalog = ctx.open_catalog()?;
    let defaults = ctx.defaults(&catalog)?;
    let mut queue = ctx.open_queue()?;

    let total = sources.len();
    let requests: Vec<SourceRequest> = sources.into_iter().map(SourceRequest::detect).collect();

    let pb = if ctx.quiet {
        ProgressBar::with_draw_target(None, ProgressDrawTarget::hidden())
    } else {
        ProgressBar::new_spinner()
    };
    pb.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("/-\\|"),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(format!("Indexing 0/{total}"));

    let rt = tokio::runtime::Runtime::new().map_err(CliError::runtime)?;
    let indexed = rt.block_on(curate_lib::index_sources_with_progress(
        requests,
        workers,
        |done, source| {
            pb.set_message(format!(
                "Indexing {done}/{total}: {}",
                source.path.display()
            ));
        },
    ));
    pb.finish_and_clear();

    let mut blocked = 0;
    for source in indexed {
        let mut curation: Curation = source.into_curation();
        apply_defaults(&mut curation.meta, Some(&defaults));

        let status = if curation.is_blocked() {
            blocked += 1;
            "blocked".if_supports_color(Stdout, |t| t.red()).to_string()
        } else {
            "ready".if_supports_color(Stdout, |t| t.green()).to_string()
        };
        log::info!(
            "  {} {} ({}, {})",
            curation.key.if_supports_color(Stdout, |t| t.dimmed()),
            curation.meta.display_title().if_supports_color(Stdout, |t| t.bold()),
            curation.source_type.as_str(),
            status
        );
        log_diagnostics(&curation.errors);

        queue.dispatch(CurationAction::Add(curation))?;
    }

    log::info!(
        "Queued {} curation(s), {} blocked. Queue now holds {}.",
        total,
        blocked,
        queue.len()
    );
    Ok(())
}
