use std::path::Path;

use curate_lib::settings;
use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use super::Context;
use crate::error::CliError;

pub(crate) fn run_config_show(ctx: &Context) -> Result<(), CliError> {
    let path = settings::settings_path();
    log::info!(
        "{} {}",
        "Settings file:".if_supports_color(Stdout, |t| t.bold()),
        path.display()
    );
    match settings::load_settings_string() {
        Some(text) if !text.trim().is_empty() => log::info!("{}", text.trim_end()),
        Some(_) => log::info!("(empty)"),
        None => log::info!("(not found, using defaults)"),
    }
    log::info!(
        "{} {}",
        "Library:".if_supports_color(Stdout, |t| t.bold()),
        ctx.layout.root().display()
    );
    log::info!(
        "{} {}",
        "Indexing workers:".if_supports_color(Stdout, |t| t.bold()),
        ctx.settings.indexing.workers
    );
    Ok(())
}

pub(crate) fn run_config_path() -> Result<(), CliError> {
    log::info!("{}", settings::settings_path().display());
    Ok(())
}

pub(crate) fn run_config_set_library(dir: &Path) -> Result<(), CliError> {
    let dir = if dir.is_absolute() {
        dir.to_path_buf()
    } else {
        std::env::current_dir()?.join(dir)
    };
    settings::save_library_path(Some(&dir))
        .map_err(|e| CliError::config(format!("could not update settings: {e}")))?;
    log::info!(
        "Library set to {}",
        dir.display().if_supports_color(Stdout, |t| t.green())
    );
    Ok(())
}
