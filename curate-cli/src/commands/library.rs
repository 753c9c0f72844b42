use curate_core::GameCatalog;
use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use super::Context;
use crate::error::CliError;

fn or_none(value: &str) -> &str {
    if value.is_empty() { "(none)" } else { value }
}

/// Print the defaults new curations would receive.
pub(crate) fn run_defaults(ctx: &Context) -> Result<(), CliError> {
    let catalog = ctx.open_catalog()?;
    let defaults = ctx.defaults(&catalog)?;

    log::info!("{}", "Metadata defaults".if_supports_color(Stdout, |t| t.bold()));
    log::info!("  language:  {}", or_none(&defaults.language));
    log::info!("  playMode:  {}", or_none(&defaults.play_mode));
    log::info!("  status:    {}", or_none(&defaults.status));
    log::info!("  platform:  {}", or_none(&defaults.platform));

    if defaults.add_paths.is_empty() {
        return Ok(());
    }
    log::info!("{}", "Application paths".if_supports_color(Stdout, |t| t.bold()));
    for (platform, path) in &defaults.add_paths {
        log::info!(
            "  {}: {}",
            platform.if_supports_color(Stdout, |t| t.cyan()),
            path
        );
    }
    Ok(())
}

/// List the games in the catalog, then per-platform counts.
pub(crate) fn run_games(ctx: &Context) -> Result<(), CliError> {
    let catalog = ctx.open_catalog()?;
    let games = catalog.list_games().map_err(CliError::database)?;

    if games.is_empty() {
        log::info!("The library at {} is empty.", ctx.layout.root().display());
        return Ok(());
    }

    for game in &games {
        log::info!(
            "  {} {} [{}]",
            game.id.if_supports_color(Stdout, |t| t.dimmed()),
            game.meta.display_title().if_supports_color(Stdout, |t| t.bold()),
            game.meta.platform.as_deref().unwrap_or("?")
        );
        if !game.add_apps.is_empty() {
            log::info!("    {} additional application(s)", game.add_apps.len());
        }
    }

    let counts = curate_db::platform_counts(catalog.conn()).map_err(CliError::database)?;
    log::info!("");
    log::info!("{}", format!("{} game(s)", games.len()).if_supports_color(Stdout, |t| t.bold()));
    for (platform, count) in counts {
        log::info!("  {:<24} {:>6}", or_none(&platform), count);
    }
    Ok(())
}
