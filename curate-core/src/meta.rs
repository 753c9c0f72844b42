//! Normalized game metadata.
//!
//! Every metadata source (the `meta.txt` line format, `meta.yaml`, LaunchBox
//! XML) is normalized into a [`GameMeta`]. Well-known fields are typed
//! struct members; anything else a source provides is kept in `extra` under
//! its camelCase field name so nothing is silently lost.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Canonical camelCase names of the well-known metadata fields.
pub mod fields {
    pub const ID: &str = "id";
    pub const TITLE: &str = "title";
    pub const ALTERNATE_TITLES: &str = "alternateTitles";
    pub const SERIES: &str = "series";
    pub const DEVELOPER: &str = "developer";
    pub const PUBLISHER: &str = "publisher";
    pub const PLATFORM: &str = "platform";
    pub const APPLICATION_PATH: &str = "applicationPath";
    pub const LAUNCH_COMMAND: &str = "launchCommand";
    pub const LANGUAGE: &str = "language";
    pub const PLAY_MODE: &str = "playMode";
    pub const STATUS: &str = "status";
    pub const GENRE: &str = "genre";
    pub const SOURCE: &str = "source";
    pub const RELEASE_DATE: &str = "releaseDate";
    pub const VERSION: &str = "version";
    pub const NOTES: &str = "notes";
    pub const ORIGINAL_DESCRIPTION: &str = "originalDescription";
    pub const AUTHOR_NOTES: &str = "authorNotes";
    pub const EXTREME: &str = "extreme";
    pub const LIBRARY: &str = "library";
    pub const TAGS: &str = "tags";
}

/// Normalized metadata for one game.
///
/// All fields are optional until resolved. A field counts as unset when it
/// is `None` or holds an empty string (see [`GameMeta::is_unset`]).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GameMeta {
    pub id: Option<String>,
    pub title: Option<String>,
    pub alternate_titles: Option<String>,
    pub series: Option<String>,
    pub developer: Option<String>,
    pub publisher: Option<String>,
    pub platform: Option<String>,
    pub application_path: Option<String>,
    pub launch_command: Option<String>,
    pub language: Option<String>,
    pub play_mode: Option<String>,
    pub status: Option<String>,
    pub genre: Option<String>,
    pub source: Option<String>,
    pub release_date: Option<String>,
    pub version: Option<String>,
    pub notes: Option<String>,
    pub original_description: Option<String>,
    pub author_notes: Option<String>,
    pub extreme: Option<String>,
    pub library: Option<String>,
    pub tags: Option<String>,

    /// Fields without a typed slot, keyed by camelCase name.
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
}

impl GameMeta {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a field by its canonical name.
    ///
    /// Returns `None` for unset fields, including empty strings.
    pub fn field(&self, name: &str) -> Option<&str> {
        let value = match self.slot(name) {
            Some(slot) => slot.as_deref(),
            None => self.extra.get(name).map(String::as_str),
        };
        value.filter(|v| !v.is_empty())
    }

    /// Set a field by its canonical name. Unknown names go to `extra`.
    pub fn set_field(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.slot_mut(name) {
            Some(slot) => *slot = Some(value),
            None => {
                self.extra.insert(name.to_string(), value);
            }
        }
    }

    /// Whether the named field is absent or empty.
    pub fn is_unset(&self, name: &str) -> bool {
        self.field(name).is_none()
    }

    /// Display title, falling back to a placeholder for untitled records.
    pub fn display_title(&self) -> &str {
        self.field(fields::TITLE).unwrap_or("(untitled)")
    }

    fn slot(&self, name: &str) -> Option<&Option<String>> {
        use fields::*;
        let slot = match name {
            ID => &self.id,
            TITLE => &self.title,
            ALTERNATE_TITLES => &self.alternate_titles,
            SERIES => &self.series,
            DEVELOPER => &self.developer,
            PUBLISHER => &self.publisher,
            PLATFORM => &self.platform,
            APPLICATION_PATH => &self.application_path,
            LAUNCH_COMMAND => &self.launch_command,
            LANGUAGE => &self.language,
            PLAY_MODE => &self.play_mode,
            STATUS => &self.status,
            GENRE => &self.genre,
            SOURCE => &self.source,
            RELEASE_DATE => &self.release_date,
            VERSION => &self.version,
            NOTES => &self.notes,
            ORIGINAL_DESCRIPTION => &self.original_description,
            AUTHOR_NOTES => &self.author_notes,
            EXTREME => &self.extreme,
            LIBRARY => &self.library,
            TAGS => &self.tags,
            _ => return None,
        };
        Some(slot)
    }

    fn slot_mut(&mut self, name: &str) -> Option<&mut Option<String>> {
        use fields::*;
        let slot = match name {
            ID => &mut self.id,
            TITLE => &mut self.title,
            ALTERNATE_TITLES => &mut self.alternate_titles,
            SERIES => &mut self.series,
            DEVELOPER => &mut self.developer,
            PUBLISHER => &mut self.publisher,
            PLATFORM => &mut self.platform,
            APPLICATION_PATH => &mut self.application_path,
            LAUNCH_COMMAND => &mut self.launch_command,
            LANGUAGE => &mut self.language,
            PLAY_MODE => &mut self.play_mode,
            STATUS => &mut self.status,
            GENRE => &mut self.genre,
            SOURCE => &mut self.source,
            RELEASE_DATE => &mut self.release_date,
            VERSION => &mut self.version,
            NOTES => &mut self.notes,
            ORIGINAL_DESCRIPTION => &mut self.original_description,
            AUTHOR_NOTES => &mut self.author_notes,
            EXTREME => &mut self.extreme,
            LIBRARY => &mut self.library,
            TAGS => &mut self.tags,
            _ => return None,
        };
        Some(slot)
    }
}

/// Launch path marking an "extras" additional application (opens a folder).
pub const EXTRAS_PATH: &str = ":extras:";

/// Launch path marking a "message" additional application (shows text).
pub const MESSAGE_PATH: &str = ":message:";

/// Metadata for a secondary application attached to a game.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AddAppMeta {
    pub heading: Option<String>,
    pub application_path: Option<String>,
    pub launch_command: Option<String>,
    pub auto_run_before: bool,
    pub wait_for_exit: bool,
}

impl AddAppMeta {
    /// An add-app that opens an extras folder.
    pub fn extras(folder: impl Into<String>) -> Self {
        Self {
            heading: Some("Extras".to_string()),
            application_path: Some(EXTRAS_PATH.to_string()),
            launch_command: Some(folder.into()),
            ..Default::default()
        }
    }

    /// An add-app that displays a message.
    pub fn message(text: impl Into<String>) -> Self {
        Self {
            heading: Some("Message".to_string()),
            application_path: Some(MESSAGE_PATH.to_string()),
            launch_command: Some(text.into()),
            ..Default::default()
        }
    }

    /// An empty add-app with only a heading.
    pub fn with_heading(heading: impl Into<String>) -> Self {
        Self {
            heading: Some(heading.into()),
            ..Default::default()
        }
    }
}

/// The output of a metadata parser: the game record and its add-apps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedMeta {
    pub game: GameMeta,
    pub add_apps: Vec<AddAppMeta>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_round_trips_through_typed_slots() {
        let mut meta = GameMeta::new();
        meta.set_field(fields::APPLICATION_PATH, "Games/flashplayer");
        assert_eq!(meta.application_path.as_deref(), Some("Games/flashplayer"));
        assert_eq!(meta.field("applicationPath"), Some("Games/flashplayer"));
        assert!(meta.extra.is_empty());
    }

    #[test]
    fn unknown_fields_land_in_extra() {
        let mut meta = GameMeta::new();
        meta.set_field("dosBoxConfigurationPath", "dosbox.conf");
        assert_eq!(meta.extra.get("dosBoxConfigurationPath").map(String::as_str), Some("dosbox.conf"));
        assert_eq!(meta.field("dosBoxConfigurationPath"), Some("dosbox.conf"));
    }

    #[test]
    fn empty_strings_count_as_unset() {
        let mut meta = GameMeta::new();
        assert!(meta.is_unset(fields::LANGUAGE));
        meta.language = Some(String::new());
        assert!(meta.is_unset(fields::LANGUAGE));
        meta.language = Some("en".to_string());
        assert!(!meta.is_unset(fields::LANGUAGE));
    }

    #[test]
    fn serializes_with_camel_case_names() {
        let mut meta = GameMeta::new();
        meta.play_mode = Some("Single Player".to_string());
        meta.extra.insert("starRating".to_string(), "5".to_string());
        let json = serde_json::to_value(&meta).unwrap();
        assert_eq!(json["playMode"], "Single Player");
        assert_eq!(json["starRating"], "5");

        let back: GameMeta = serde_json::from_value(json).unwrap();
        assert_eq!(back, meta);
    }
}
