//! curate CLI
//!
//! Command-line interface for indexing game curations and importing them
//! into a library.

mod cli_types;
mod commands;
mod error;

use std::io::Write;

use clap::Parser;
use log::LevelFilter;

use cli_types::{Cli, Commands, ConfigAction};
use error::CliError;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.quiet, cli.verbose);

    let settings = curate_lib::settings::load_settings();
    let library = curate_lib::settings::resolve_library_path(cli.library.clone(), &settings);
    let ctx = commands::Context {
        layout: curate_lib::LibraryLayout::new(library),
        settings,
        quiet: cli.quiet,
    };

    let result: Result<(), CliError> = match cli.command {
        Commands::Index { sources, workers } => commands::index::run_index(&ctx, sources, workers),
        Commands::List => commands::queue::run_list(&ctx),
        Commands::Remove { key } => commands::queue::run_remove(&ctx, &key),
        Commands::Import {
            keys,
            all,
            save_curation,
        } => commands::import::run_import(&ctx, keys, all, save_curation),
        Commands::Launchbox { xml, images, host } => {
            commands::launchbox::run_launchbox(&ctx, &xml, images.as_deref(), host.as_deref())
        }
        Commands::Defaults => commands::library::run_defaults(&ctx),
        Commands::Games => commands::library::run_games(&ctx),
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config::run_config_show(&ctx),
            ConfigAction::Path => commands::config::run_config_path(),
            ConfigAction::SetLibrary { dir } => commands::config::run_config_set_library(&dir),
        },
    };

    if let Err(e) = result {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

/// Set up `env_logger`: warnings only with `--quiet`, plain messages by
/// default, and timestamped debug output with `--verbose`. `RUST_LOG`
/// overrides the level when set.
fn init_logging(quiet: bool, verbose: bool) {
    let level = if quiet {
        LevelFilter::Warn
    } else if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let mut builder = env_logger::Builder::new();
    builder.filter_level(level);
    if verbose {
        builder.format_timestamp_millis();
    } else {
        builder
            .target(env_logger::Target::Stdout)
            .format(|buf, record| {
                if record.level() <= log::Level::Warn {
                    writeln!(buf, "{}: {}", record.level(), record.args())
                } else {
                    writeln!(buf, "{}", record.args())
                }
            });
    }
    builder.parse_default_env();
    builder.init();
}
