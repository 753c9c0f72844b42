//! Application settings (library path, indexing, legacy import).
//!
//! The settings file is `~/.config/curate/settings.toml`:
//!
//! ```toml
//! [library]
//! root = "/home/me/Flashpoint"
//!
//! [indexing]
//! workers = 8
//!
//! [legacy]
//! host_platform = "linux"
//!
//! [legacy.path_overrides]
//! macos = { fixed = "Games/Flash Player.app" }
//! win32 = "verbatim"
//! ```

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

use curate_meta::{ConvertContext, PathOverride, host_platform};
use serde::Deserialize;

pub const DEFAULT_WORKERS: usize = 4;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub library: LibrarySettings,
    pub indexing: IndexingSettings,
    pub legacy: LegacySettings,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LibrarySettings {
    pub root: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IndexingSettings {
    pub workers: usize,
}

impl Default for IndexingSettings {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LegacySettings {
    /// Overrides the detected host platform for LaunchBox conversion.
    pub host_platform: Option<String>,
    /// Extra or replacement application-path overrides, by host.
    pub path_overrides: BTreeMap<String, PathOverride>,
}

impl Settings {
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Conversion context for LaunchBox files.
    ///
    /// Host priority: `host_override`, then `legacy.host_platform`, then the
    /// running platform. Configured overrides are layered over the built-in table.
    pub fn convert_context(&self, host_override: Option<&str>) -> ConvertContext {
        let host = host_override
            .map(str::to_string)
            .or_else(|| self.legacy.host_platform.clone())
            .unwrap_or_else(|| host_platform().to_string());
        let mut ctx = ConvertContext::for_host(host);
        ctx.overrides.extend(
            self.legacy
                .path_overrides
                .iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        );
        ctx
    }
}

/// Canonical path to the settings file: `~/.config/curate/settings.toml`.
pub fn settings_path() -> PathBuf {
    let config = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    config.join("curate").join("settings.toml")
}

/// Load settings, falling back to defaults when the file is missing or invalid.
pub fn load_settings() -> Settings {
    load_settings_from(&settings_path())
}

pub fn load_settings_from(path: &Path) -> Settings {
    let Ok(contents) = std::fs::read_to_string(path) else {
        return Settings::default();
    };
    match Settings::from_toml_str(&contents) {
        Ok(s) => s,
        Err(e) => {
            log::warn!("Ignoring invalid settings file {}: {}", path.display(), e);
            Settings::default()
        }
    }
}

/// Resolve the library root path using a priority chain:
///
/// 1. CLI override (if `Some`)
/// 2. `library.root` in `settings.toml`
/// 3. Current working directory
pub fn resolve_library_path(cli_override: Option<PathBuf>, settings: &Settings) -> PathBuf {
    if let Some(p) = cli_override {
        return p;
    }
    if let Some(p) = settings
        .library
        .root
        .as_ref()
        .filter(|p| !p.as_os_str().is_empty())
    {
        return p.clone();
    }
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

/// Save (or clear) the library path in `settings.toml`.
pub fn save_library_path(path: Option<&Path>) -> io::Result<()> {
    save_library_path_to(&settings_path(), path)
}

/// Update `library.root` in the settings file at `settings`, keeping every
/// other key as it was.
pub fn save_library_path_to(settings: &Path, path: Option<&Path>) -> io::Result<()> {
    let mut doc: toml::Value = if let Ok(contents) = std::fs::read_to_string(settings) {
        contents
            .parse()
            .unwrap_or_else(|_| toml::Value::Table(Default::default()))
    } else {
        toml::Value::Table(Default::default())
    };

    let table = doc
        .as_table_mut()
        .ok_or_else(|| io::Error::other("settings.toml root is not a table"))?;
    let library = table
        .entry("library")
        .or_insert_with(|| toml::Value::Table(Default::default()));
    let lib_table = library
        .as_table_mut()
        .ok_or_else(|| io::Error::other("[library] is not a table"))?;

    match path {
        Some(p) => {
            lib_table.insert(
                "root".to_string(),
                toml::Value::String(p.to_string_lossy().into_owned()),
            );
        }
        None => {
            lib_table.remove("root");
        }
    }

    if let Some(parent) = settings.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let serialized = toml::to_string_pretty(&doc).map_err(io::Error::other)?;
    let tmp = settings.with_extension("toml.tmp");
    std::fs::write(&tmp, &serialized)?;
    std::fs::rename(&tmp, settings)?;

    Ok(())
}

/// Load the full settings file as a pretty-printed TOML string for display.
pub fn load_settings_string() -> Option<String> {
    let contents = std::fs::read_to_string(settings_path()).ok()?;
    let doc: toml::Value = contents.parse().ok()?;
    toml::to_string_pretty(&doc).ok()
}
