//! Conversion of legacy LaunchBox game records.
//!
//! A LaunchBox platform file looks like:
//! ```xml
//! <LaunchBox>
//!   <Game>
//!     <ID>0123abcd-fee2-0987-dfea-cd341234cdef</ID>
//!     <Title>Abobo's Big Adventure</Title>
//!     <ApplicationPath>Games\flashplayer.exe</ApplicationPath>
//!     <Platform>Flash</Platform>
//!   </Game>
//! </LaunchBox>
//! ```
//! Each child of `<Game>` whose tag is in [`LAUNCHBOX_TAGS`] becomes a
//! metadata field named by [`tag_name_to_field`].

use std::collections::BTreeMap;

use curate_core::meta::fields;
use curate_core::{Diagnostic, DiagnosticKind, GameMeta, Parsed};
use quick_xml::events::Event;
use quick_xml::reader::Reader;
use serde::{Deserialize, Serialize};

/// Every tag name recognized as a child of `<Game>`.
pub const LAUNCHBOX_TAGS: &[&str] = &[
    "ApplicationPath",
    "CommandLine",
    "Completed",
    "ConfigurationCommandLine",
    "ConfigurationPath",
    "DateAdded",
    "DateModified",
    "Developer",
    "DosBoxConfigurationPath",
    "Emulator",
    "Favorite",
    "ID",
    "ManualPath",
    "MusicPath",
    "Notes",
    "Platform",
    "Publisher",
    "Rating",
    "RootFolder",
    "ScummVMAspectCorrection",
    "ScummVMFullscreen",
    "ScummVMGameDataFolderPath",
    "ScummVMGameType",
    "SortTitle",
    "Source",
    "StarRatingFloat",
    "StarRating",
    "CommunityStarRating",
    "CommunityStarRatingTotalVotes",
    "Status",
    "WikipediaURL",
    "Title",
    "UseDosBox",
    "UseScummVM",
    "Version",
    "Series",
    "PlayMode",
    "Region",
    "PlayCount",
    "Portable",
    "VideoPath",
    "Hide",
    "Broken",
    "Genre",
    "MissingVideo",
    "MissingBoxFrontImage",
    "MissingScreenshotImage",
    "MissingClearLogoImage",
    "MissingBackgroundImage",
];

/// Map a `<Game>` child tag to its metadata field name.
///
/// Returns `None` for tags outside [`LAUNCHBOX_TAGS`] (matching is
/// case-sensitive). `ID` maps to `id`; every other tag has its first
/// character lower-cased.
pub fn tag_name_to_field(tag: &str) -> Option<String> {
    if !LAUNCHBOX_TAGS.contains(&tag) {
        return None;
    }
    if tag == "ID" {
        return Some(fields::ID.to_string());
    }
    let mut chars = tag.chars();
    let first = chars.next()?;
    Some(first.to_lowercase().chain(chars).collect())
}

/// Build the canonical image file name for a LaunchBox game.
///
/// Characters in `/ \ ? % * : | " < > '` become `_`. With an index, `-NN` is
/// appended, where the index is truncated to a non-negative integer and
/// zero-padded to two digits.
///
/// `("Abobo's Big Adventure", Some(1.0))` → `"Abobo_s Big Adventure-01"`,
/// `("$wag", None)` → `"$wag"`.
pub fn generate_image_filename(title: &str, index: Option<f64>) -> String {
    let clean: String = title
        .chars()
        .map(|c| match c {
            '/' | '\\' | '?' | '%' | '*' | ':' | '|' | '"' | '<' | '>' | '\'' => '_',
            other => other,
        })
        .collect();

    match index {
        None => clean,
        Some(i) => {
            let n = if i.is_finite() && i > 0.0 {
                i.trunc() as u64
            } else {
                0
            };
            format!("{clean}-{n:02}")
        }
    }
}

// ---------------------------------------------------------------------------
// Application path overrides
// ---------------------------------------------------------------------------

/// How a host platform rewrites a LaunchBox `ApplicationPath`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathOverride {
    /// Keep the value from the XML.
    Verbatim,
    /// Replace the value with a fixed path.
    Fixed(String),
}

/// Host-platform → application path rewrite table.
///
/// LaunchBox files store Windows launch paths. This table is a temporary
/// compatibility shim: on Linux the Flash projector is expected at
/// `Games/flashplayer` (extracted by hand from
/// `flash_player_sa_linux.x86_64.tar.gz`) until extraction is automated.
/// Hosts without an entry pass the XML value through unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PathOverrides(pub BTreeMap<String, PathOverride>);

impl Default for PathOverrides {
    fn default() -> Self {
        let mut table = BTreeMap::new();
        table.insert("win32".to_string(), PathOverride::Verbatim);
        table.insert(
            "linux".to_string(),
            PathOverride::Fixed("Games/flashplayer".to_string()),
        );
        Self(table)
    }
}

impl PathOverrides {
    /// Rewrite an application path for the given host.
    pub fn apply(&self, host: &str, value: &str) -> String {
        match self.0.get(host) {
            Some(PathOverride::Fixed(path)) => path.clone(),
            Some(PathOverride::Verbatim) | None => value.to_string(),
        }
    }

    /// Add or replace entries, e.g. from user settings.
    pub fn extend(&mut self, other: impl IntoIterator<Item = (String, PathOverride)>) {
        self.0.extend(other);
    }
}

/// Identifier of the running host, in the naming LaunchBox tooling uses
/// (`win32`, `linux`, `macos`, ...).
pub fn host_platform() -> &'static str {
    match std::env::consts::OS {
        "windows" => "win32",
        other => other,
    }
}

/// Everything a conversion needs besides the XML itself.
#[derive(Debug, Clone)]
pub struct ConvertContext {
    pub host: String,
    pub overrides: PathOverrides,
}

impl Default for ConvertContext {
    fn default() -> Self {
        Self {
            host: host_platform().to_string(),
            overrides: PathOverrides::default(),
        }
    }
}

impl ConvertContext {
    pub fn for_host(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            overrides: PathOverrides::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Conversion
// ---------------------------------------------------------------------------

/// Convert the children of one `<Game>` element into a metadata record.
///
/// `children` holds `(tag, text)` pairs in document order. Children without
/// text and tags outside the whitelist are skipped.
pub fn convert_game(children: &[(String, Option<String>)], ctx: &ConvertContext) -> GameMeta {
    let mut meta = GameMeta::new();
    for (tag, text) in children {
        let Some(text) = text else {
            continue;
        };
        let Some(field) = tag_name_to_field(tag) else {
            continue;
        };
        let value = if field == fields::APPLICATION_PATH {
            ctx.overrides.apply(&ctx.host, text)
        } else {
            text.clone()
        };
        meta.set_field(&field, value);
    }
    meta
}

/// Parse a LaunchBox platform XML document into metadata records.
///
/// Reading stops at the first XML error; games converted before that point
/// are kept and the error is reported as a diagnostic.
pub fn parse_launchbox_xml(text: &str, ctx: &ConvertContext) -> Parsed<Vec<GameMeta>> {
    let mut xml = Reader::from_str(text);
    xml.config_mut().trim_text(true);

    let mut games = Vec::new();
    let mut errors = Vec::new();

    // Children of the <Game> currently being read, and our depth inside it.
    let mut current: Option<Vec<(String, Option<String>)>> = None;
    let mut depth = 0usize;
    let mut field: Option<(String, Option<String>)> = None;

    loop {
        let event = match xml.read_event() {
            Ok(e) => e,
            Err(e) => {
                errors.push(Diagnostic::new(
                    DiagnosticKind::Xml,
                    format!("at byte {}: {e}", xml.buffer_position()),
                ));
                break;
            }
        };

        match event {
            Event::Start(ref e) => {
                let tag = String::from_utf8_lossy(e.name().as_ref()).to_string();
                if current.is_some() {
                    depth += 1;
                    if depth == 1 {
                        field = Some((tag, None));
                    }
                } else if tag == "Game" {
                    current = Some(Vec::new());
                    depth = 0;
                }
            }
            Event::Empty(ref e) => {
                if let (Some(children), 0) = (current.as_mut(), depth) {
                    let tag = String::from_utf8_lossy(e.name().as_ref()).to_string();
                    children.push((tag, None));
                }
            }
            Event::Text(ref e) => {
                if let (Some((_, value)), 1) = (field.as_mut(), depth) {
                    match e.unescape() {
                        Ok(t) => value.get_or_insert_with(String::new).push_str(&t),
                        Err(err) => errors.push(Diagnostic::new(
                            DiagnosticKind::Xml,
                            format!("bad text at byte {}: {err}", xml.buffer_position()),
                        )),
                    }
                }
            }
            Event::CData(ref e) => {
                if let (Some((_, value)), 1) = (field.as_mut(), depth) {
                    value
                        .get_or_insert_with(String::new)
                        .push_str(&String::from_utf8_lossy(e.as_ref()));
                }
            }
            Event::End(_) => {
                if depth == 0 {
                    if let Some(children) = current.take() {
                        games.push(convert_game(&children, ctx));
                    }
                } else {
                    if depth == 1 {
                        if let (Some(children), Some(f)) = (current.as_mut(), field.take()) {
                            children.push(f);
                        }
                    }
                    depth -= 1;
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if current.is_some() && errors.is_empty() {
        errors.push(Diagnostic::new(
            DiagnosticKind::Xml,
            "document ended inside a <Game> element",
        ));
    }

    Parsed::with_errors(games, errors)
}

#[cfg(test)]
#[path = "tests/launchbox_tests.rs"]
mod tests;
