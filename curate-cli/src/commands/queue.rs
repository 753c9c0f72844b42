use curate_lib::{CurationAction, CurationDispatch};
use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use super::{Context, log_diagnostics};
use crate::error::CliError;

/// List queued curations.
pub(crate) fn run_list(ctx: &Context) -> Result<(), CliError> {
    let queue = ctx.open_queue()?;
    if queue.is_empty() {
        log::info!("No curations queued.");
        return Ok(());
    }

    log::info!(
        "{}",
        format!("{} queued curation(s):", queue.len()).if_supports_color(Stdout, |t| t.bold())
    );
    for c in queue.curations() {
        let status = if c.is_blocked() {
            "blocked".if_supports_color(Stdout, |t| t.red()).to_string()
        } else if c.locked {
            "locked".if_supports_color(Stdout, |t| t.yellow()).to_string()
        } else {
            "ready".if_supports_color(Stdout, |t| t.green()).to_string()
        };
        log::info!(
            "  {} {} [{}] {}",
            c.key.if_supports_color(Stdout, |t| t.dimmed()),
            c.meta.display_title().if_supports_color(Stdout, |t| t.bold()),
            c.meta.platform.as_deref().unwrap_or("?"),
            status
        );
        log::info!("    {} {}", c.source_type.as_str(), c.source);
        if !c.add_apps.is_empty() {
            log::info!("    {} additional application(s)", c.add_apps.len());
        }
        log_diagnostics(&c.errors);
    }
    Ok(())
}

/// Drop a curation from the queue.
pub(crate) fn run_remove(ctx: &Context, key: &str) -> Result<(), CliError> {
    let mut queue = ctx.open_queue()?;
    let Some(title) = queue.get(key).map(|c| c.meta.display_title().to_string()) else {
        return Err(CliError::UnknownCuration(key.to_string()));
    };
    queue.dispatch(CurationAction::Remove(key.to_string()))?;
    log::info!("Removed '{}' from the queue.", title);
    Ok(())
}
