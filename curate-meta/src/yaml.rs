//! Parser for `meta.yaml` curation metadata.
//!
//! Uses the same keys as the text format. Sequence values are joined with
//! `"; "`. `Additional Applications` is a mapping from heading to either a
//! string (for `Extras` and `Message`) or a mapping of add-app keys:
//!
//! ```yaml
//! Title: Alien Hominid
//! Tags:
//!   - Action
//!   - Shooter
//! Additional Applications:
//!   Extras: alien_extras
//!   Level Select:
//!     Application Path: FPSoftware\Flash\flashplayer_32_sa.exe
//!     Launch Command: http://www.example.com/levels.swf
//! ```

use curate_core::{AddAppMeta, Diagnostic, DiagnosticKind, GameMeta, Parsed, ParsedMeta};
use serde_yml::{Mapping, Value};

use crate::keys::{self, AddAppHeader};

/// Parse `meta.yaml` contents. Invalid YAML yields an empty record plus a diagnostic.
pub fn parse_meta_yaml(text: &str) -> Parsed<ParsedMeta> {
    let doc: Value = match serde_yml::from_str(text) {
        Ok(v) => v,
        Err(e) => {
            return Parsed::with_errors(
                ParsedMeta::default(),
                vec![Diagnostic::new(
                    DiagnosticKind::MalformedMeta,
                    format!("invalid YAML: {e}"),
                )],
            );
        }
    };

    let root = match doc {
        Value::Mapping(m) => m,
        Value::Null => return Parsed::ok(ParsedMeta::default()),
        _ => {
            return Parsed::with_errors(
                ParsedMeta::default(),
                vec![Diagnostic::new(
                    DiagnosticKind::MalformedMeta,
                    "YAML meta must be a mapping of keys to values",
                )],
            );
        }
    };

    let mut game = GameMeta::new();
    let mut add_apps = Vec::new();
    let mut errors = Vec::new();

    for (key, value) in &root {
        let Some(key) = key.as_str() else {
            errors.push(Diagnostic::new(
                DiagnosticKind::MalformedLine,
                "skipping non-string YAML key",
            ));
            continue;
        };

        if key.trim().eq_ignore_ascii_case(keys::ADD_APPS_KEY) {
            match value {
                Value::Mapping(apps) => parse_add_apps(apps, &mut add_apps, &mut errors),
                Value::Null => {}
                _ => errors.push(Diagnostic::new(
                    DiagnosticKind::MalformedLine,
                    "'Additional Applications' must be a mapping",
                )),
            }
            continue;
        }

        let Some(field) = keys::game_field(key) else {
            log::debug!("meta.yaml: ignoring unknown key '{}'", key);
            continue;
        };
        if let Some(text) = scalar_to_string(value) {
            if !text.is_empty() {
                game.set_field(field, text);
            }
        }
    }

    Parsed::with_errors(ParsedMeta { game, add_apps }, errors)
}

fn parse_add_apps(apps: &Mapping, out: &mut Vec<AddAppMeta>, errors: &mut Vec<Diagnostic>) {
    for (heading, body) in apps {
        let Some(heading) = heading.as_str() else {
            continue;
        };
        match (keys::add_app_header(heading), body) {
            (AddAppHeader::Extras, body) => {
                out.push(AddAppMeta::extras(scalar_to_string(body).unwrap_or_default()));
            }
            (AddAppHeader::Message, body) => {
                out.push(AddAppMeta::message(scalar_to_string(body).unwrap_or_default()));
            }
            (AddAppHeader::Named, Value::Mapping(fields)) => {
                let mut app = AddAppMeta::with_heading(heading);
                for (k, v) in fields {
                    let (Some(k), Some(v)) = (k.as_str(), scalar_to_string(v)) else {
                        continue;
                    };
                    if !keys::set_add_app_field(&mut app, k, &v) {
                        log::debug!("meta.yaml: ignoring unknown add-app key '{}'", k);
                    }
                }
                out.push(app);
            }
            (AddAppHeader::Named, _) => errors.push(Diagnostic::new(
                DiagnosticKind::MalformedLine,
                format!("additional application '{heading}' must be a mapping"),
            )),
        }
    }
}

/// Render a YAML value as a metadata string. Mappings have no string form.
fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::Bool(b) => Some(if *b { "Yes" } else { "No" }.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(s.trim().to_string()),
        Value::Sequence(items) => Some(
            items
                .iter()
                .filter_map(scalar_to_string)
                .collect::<Vec<_>>()
                .join("; "),
        ),
        Value::Tagged(tagged) => scalar_to_string(&tagged.value),
        Value::Mapping(_) => None,
    }
}
