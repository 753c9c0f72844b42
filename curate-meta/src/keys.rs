//! Key tables shared by the text and YAML metadata parsers.

use curate_core::AddAppMeta;
use curate_core::meta::fields;

/// Key that opens the additional-applications section.
pub(crate) const ADD_APPS_KEY: &str = "additional applications";

/// Map a human-readable metadata key to a canonical field name.
///
/// Matching is case-insensitive and ignores surrounding whitespace.
pub(crate) fn game_field(key: &str) -> Option<&'static str> {
    let field = match key.trim().to_lowercase().as_str() {
        "id" => fields::ID,
        "title" => fields::TITLE,
        "alternate titles" => fields::ALTERNATE_TITLES,
        "series" => fields::SERIES,
        "developer" => fields::DEVELOPER,
        "publisher" => fields::PUBLISHER,
        "platform" => fields::PLATFORM,
        "application path" => fields::APPLICATION_PATH,
        "launch command" => fields::LAUNCH_COMMAND,
        "languages" | "language" => fields::LANGUAGE,
        "play mode" => fields::PLAY_MODE,
        "status" => fields::STATUS,
        "genre" | "genres" => fields::GENRE,
        "tags" => fields::TAGS,
        "source" => fields::SOURCE,
        "release date" => fields::RELEASE_DATE,
        "version" => fields::VERSION,
        "notes" => fields::NOTES,
        "original description" | "description" => fields::ORIGINAL_DESCRIPTION,
        "author notes" => fields::AUTHOR_NOTES,
        "extreme" => fields::EXTREME,
        "library" => fields::LIBRARY,
        _ => return None,
    };
    Some(field)
}

/// Kind of an additional-application header line.
pub(crate) enum AddAppHeader {
    Extras,
    Message,
    Named,
}

pub(crate) fn add_app_header(key: &str) -> AddAppHeader {
    match key.trim().to_lowercase().as_str() {
        "extras" => AddAppHeader::Extras,
        "message" => AddAppHeader::Message,
        _ => AddAppHeader::Named,
    }
}

/// Apply one `key: value` pair to an additional application.
///
/// Returns `false` if the key is not an add-app field.
pub(crate) fn set_add_app_field(app: &mut AddAppMeta, key: &str, value: &str) -> bool {
    match key.trim().to_lowercase().as_str() {
        "heading" => app.heading = Some(value.to_string()),
        "application path" => app.application_path = Some(value.to_string()),
        "launch command" => app.launch_command = Some(value.to_string()),
        "auto run before" => app.auto_run_before = parse_flag(value),
        "wait for exit" => app.wait_for_exit = parse_flag(value),
        _ => return false,
    }
    true
}

/// Loose boolean parsing for yes/no style metadata values.
pub(crate) fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "yes" | "true" | "1" | "y"
    )
}
