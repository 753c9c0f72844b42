//! CLI type definitions: command enums and argument structs.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "curate")]
#[command(about = "Index game curations and import them into a library", long_about = None)]
pub(crate) struct Cli {
    /// Library root (defaults to the configured library, then the current directory)
    #[arg(short, long, global = true)]
    pub library: Option<PathBuf>,

    /// Only show warnings and errors (suppress normal output)
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Enable verbose/debug logging (timestamps + debug-level messages)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Index curation archives, folders, or meta files and queue them for import
    Index {
        /// Sources to index (type is detected from each path)
        #[arg(required = true)]
        sources: Vec<PathBuf>,

        /// Number of concurrent indexing workers
        #[arg(short, long)]
        workers: Option<usize>,
    },

    /// List queued curations
    List,

    /// Remove a curation from the queue without importing it
    Remove {
        /// Curation key
        key: String,
    },

    /// Import queued curations into the library
    Import {
        /// Curation keys to import
        keys: Vec<String>,

        /// Import every queued curation
        #[arg(short, long, conflicts_with = "keys")]
        all: bool,

        /// Keep a copy of each curation record in its game folder
        #[arg(long)]
        save_curation: bool,
    },

    /// Queue every game of a LaunchBox platform XML file
    Launchbox {
        /// LaunchBox platform file (e.g. Data/Platforms/Flash.xml)
        xml: PathBuf,

        /// LaunchBox images folder, used to find box art and screenshots
        #[arg(long)]
        images: Option<PathBuf>,

        /// Host platform for application-path rewriting (e.g. win32, linux)
        #[arg(long)]
        host: Option<String>,
    },

    /// Show the metadata defaults derived from the library
    Defaults,

    /// List games in the library
    Games,

    /// Manage settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Show the current settings
    Show,

    /// Print the settings file path
    Path,

    /// Set the default library root
    SetLibrary {
        /// Library root directory
        dir: PathBuf,
    },
}
