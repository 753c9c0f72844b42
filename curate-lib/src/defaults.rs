//! Library-derived default metadata.
//!
//! [`compute_defaults`] derives a [`GameMetaDefaults`] once per session from
//! the games already in the library; [`apply_defaults`] fills the gaps in a
//! curation's metadata from it.

use std::collections::BTreeMap;

use curate_core::meta::fields;
use curate_core::{GameMeta, GameMetaDefaults, LibraryGame};

/// Most frequent value; ties go to the lexicographically smallest.
fn most_frequent<'a>(values: impl Iterator<Item = &'a str>) -> Option<&'a str> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for v in values.filter(|v| !v.is_empty()) {
        *counts.entry(v).or_default() += 1;
    }
    let mut best: Option<(&str, usize)> = None;
    for (value, count) in counts {
        if best.is_none_or(|(_, c)| count > c) {
            best = Some((value, count));
        }
    }
    best.map(|(v, _)| v)
}

fn most_frequent_field(games: &[LibraryGame], name: &str) -> String {
    most_frequent(games.iter().filter_map(|g| g.meta.field(name)))
        .unwrap_or_default()
        .to_string()
}

/// Derive defaults from the current library contents.
pub fn compute_defaults(games: &[LibraryGame]) -> GameMetaDefaults {
    let mut paths_by_platform: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for game in games {
        let (Some(platform), Some(path)) = (
            game.meta.field(fields::PLATFORM),
            game.meta.field(fields::APPLICATION_PATH),
        ) else {
            continue;
        };
        paths_by_platform.entry(platform).or_default().push(path);
    }

    let add_paths = paths_by_platform
        .into_iter()
        .filter_map(|(platform, paths)| {
            most_frequent(paths.into_iter()).map(|p| (platform.to_string(), p.to_string()))
        })
        .collect();

    GameMetaDefaults {
        language: most_frequent_field(games, fields::LANGUAGE),
        play_mode: most_frequent_field(games, fields::PLAY_MODE),
        status: most_frequent_field(games, fields::STATUS),
        platform: most_frequent_field(games, fields::PLATFORM),
        add_paths,
    }
}

fn fill(meta: &mut GameMeta, name: &str, value: &str) {
    if meta.is_unset(name) && !value.is_empty() {
        meta.set_field(name, value);
    }
}

/// Fill unset fields of `meta` from `defaults`.
///
/// Order matters: `platform` is resolved before `applicationPath`, which is
/// looked up by that platform. A platform with no known path leaves
/// `applicationPath` unset. Applying twice is the same as applying once.
pub fn apply_defaults(meta: &mut GameMeta, defaults: Option<&GameMetaDefaults>) {
    let Some(defaults) = defaults else {
        return;
    };

    fill(meta, fields::LANGUAGE, &defaults.language);
    fill(meta, fields::PLAY_MODE, &defaults.play_mode);
    fill(meta, fields::STATUS, &defaults.status);
    fill(meta, fields::PLATFORM, &defaults.platform);

    if meta.is_unset(fields::APPLICATION_PATH) {
        let path = meta
            .field(fields::PLATFORM)
            .and_then(|p| defaults.add_paths.get(p))
            .filter(|p| !p.is_empty())
            .cloned();
        if let Some(path) = path {
            meta.set_field(fields::APPLICATION_PATH, path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game(platform: &str, path: &str, language: &str) -> LibraryGame {
        let mut meta = GameMeta::new();
        meta.set_field(fields::PLATFORM, platform);
        meta.set_field(fields::APPLICATION_PATH, path);
        meta.set_field(fields::LANGUAGE, language);
        meta.set_field(fields::PLAY_MODE, "Single Player");
        LibraryGame {
            id: format!("{platform}-{path}"),
            meta,
            add_apps: vec![],
            date_added: String::new(),
        }
    }

    fn defaults() -> GameMetaDefaults {
        GameMetaDefaults {
            language: "en".to_string(),
            play_mode: "Single Player".to_string(),
            status: "Playable".to_string(),
            platform: "Flash".to_string(),
            add_paths: BTreeMap::from([
                ("Flash".to_string(), "flashplayer.exe".to_string()),
                ("HTML5".to_string(), "browser.exe".to_string()),
            ]),
        }
    }

    #[test]
    fn most_frequent_breaks_ties_lexicographically() {
        assert_eq!(most_frequent(["b", "a", "b", "a"].into_iter()), Some("a"));
        assert_eq!(most_frequent(["b", "a", "b"].into_iter()), Some("b"));
        assert_eq!(most_frequent(["", ""].into_iter()), None);
    }

    #[test]
    fn computes_defaults_from_library() {
        let games = vec![
            game("Flash", "flash.exe", "en"),
            game("Flash", "flash.exe", "ja"),
            game("Flash", "other.exe", "en"),
            game("HTML5", "browser.exe", "en"),
        ];
        let d = compute_defaults(&games);
        assert_eq!(d.platform, "Flash");
        assert_eq!(d.language, "en");
        assert_eq!(d.play_mode, "Single Player");
        assert_eq!(d.status, "");
        assert_eq!(d.add_paths.get("Flash").map(String::as_str), Some("flash.exe"));
        assert_eq!(d.add_paths.get("HTML5").map(String::as_str), Some("browser.exe"));
    }

    #[test]
    fn empty_library_yields_empty_defaults() {
        assert_eq!(compute_defaults(&[]), GameMetaDefaults::default());
    }

    #[test]
    fn none_is_a_no_op() {
        let mut meta = GameMeta::new();
        apply_defaults(&mut meta, None);
        assert_eq!(meta, GameMeta::new());
    }

    #[test]
    fn platform_is_resolved_before_application_path() {
        let mut meta = GameMeta::new();
        apply_defaults(&mut meta, Some(&defaults()));
        assert_eq!(meta.platform.as_deref(), Some("Flash"));
        assert_eq!(meta.application_path.as_deref(), Some("flashplayer.exe"));
        assert_eq!(meta.language.as_deref(), Some("en"));
        assert_eq!(meta.status.as_deref(), Some("Playable"));
    }

    #[test]
    fn path_follows_existing_platform() {
        let mut meta = GameMeta::new();
        meta.set_field(fields::PLATFORM, "HTML5");
        apply_defaults(&mut meta, Some(&defaults()));
        assert_eq!(meta.application_path.as_deref(), Some("browser.exe"));
    }

    #[test]
    fn unknown_platform_leaves_path_unset() {
        let mut meta = GameMeta::new();
        meta.set_field(fields::PLATFORM, "Shockwave");
        apply_defaults(&mut meta, Some(&defaults()));
        assert_eq!(meta.platform.as_deref(), Some("Shockwave"));
        assert!(meta.application_path.is_none());
    }

    #[test]
    fn set_fields_are_kept() {
        let mut meta = GameMeta::new();
        meta.set_field(fields::LANGUAGE, "de");
        meta.set_field(fields::APPLICATION_PATH, "custom.exe");
        apply_defaults(&mut meta, Some(&defaults()));
        assert_eq!(meta.language.as_deref(), Some("de"));
        assert_eq!(meta.application_path.as_deref(), Some("custom.exe"));
    }

    #[test]
    fn empty_strings_count_as_unset() {
        let mut meta = GameMeta::new();
        meta.set_field(fields::STATUS, "");
        apply_defaults(&mut meta, Some(&defaults()));
        assert_eq!(meta.status.as_deref(), Some("Playable"));
    }

    #[test]
    fn empty_defaults_are_not_assigned() {
        let mut meta = GameMeta::new();
        apply_defaults(&mut meta, Some(&GameMetaDefaults::default()));
        assert_eq!(meta, GameMeta::new());
    }

    #[test]
    fn applying_twice_changes_nothing() {
        let mut once = GameMeta::new();
        once.set_field(fields::TITLE, "Thing");
        apply_defaults(&mut once, Some(&defaults()));
        let mut twice = once.clone();
        apply_defaults(&mut twice, Some(&defaults()));
        assert_eq!(once, twice);
    }
}
