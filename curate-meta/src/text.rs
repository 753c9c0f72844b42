//! Parser for the line-oriented `meta.txt` curation format.
//!
//! Format:
//! ```text
//! Title: Alien Hominid
//! Platform: Flash
//! Application Path: FPSoftware\Flash\flashplayer_32_sa.exe
//! Launch Command: http://www.example.com/alien.swf
//! # comment lines start with '#'
//! Additional Applications:
//!     Extras: alien_extras
//!     Message: Press space to start.
//!     Level Select:
//!         Application Path: FPSoftware\Flash\flashplayer_32_sa.exe
//!         Launch Command: http://www.example.com/levels.swf
//! ```
//!
//! Unknown keys are ignored. Lines that are not `key: value` pairs are
//! skipped with a diagnostic.

use curate_core::{AddAppMeta, Diagnostic, DiagnosticKind, GameMeta, Parsed, ParsedMeta};

use crate::keys::{self, AddAppHeader};

/// A single `key: value` line.
#[derive(Debug, Clone, PartialEq)]
struct Token<'a> {
    line: usize,
    indent: usize,
    key: &'a str,
    value: &'a str,
}

/// Parse `meta.txt` contents from raw bytes.
///
/// Text that is not valid UTF-8 yields an empty record plus a diagnostic.
pub fn parse_meta_bytes(bytes: &[u8]) -> Parsed<ParsedMeta> {
    match std::str::from_utf8(bytes) {
        Ok(text) => parse_meta(text),
        Err(e) => Parsed::with_errors(
            ParsedMeta::default(),
            vec![Diagnostic::new(
                DiagnosticKind::MalformedMeta,
                format!("meta text is not valid UTF-8 ({e})"),
            )],
        ),
    }
}

/// Parse `meta.txt` contents into a game record and its additional applications.
///
/// Never fails. Required fields that are missing are simply left unset.
pub fn parse_meta(text: &str) -> Parsed<ParsedMeta> {
    let text = text.trim_start_matches('\u{feff}');
    let (tokens, mut errors) = tokenize(text);

    if tokens.is_empty() && !text.trim().is_empty() {
        return Parsed::with_errors(
            ParsedMeta::default(),
            vec![Diagnostic::new(
                DiagnosticKind::MalformedMeta,
                "no `key: value` lines found in meta text",
            )],
        );
    }

    let mut game = GameMeta::new();
    let mut add_apps: Vec<AddAppMeta> = Vec::new();
    let mut in_add_apps = false;
    let mut header_indent: Option<usize> = None;
    let mut current: Option<AddAppMeta> = None;

    for token in &tokens {
        if token.indent == 0 {
            if let Some(app) = current.take() {
                add_apps.push(app);
            }
            in_add_apps = token.key.trim().eq_ignore_ascii_case(keys::ADD_APPS_KEY);
            header_indent = None;
            if !in_add_apps {
                apply_game_field(&mut game, token);
            }
            continue;
        }

        if !in_add_apps {
            // Stray indentation outside the add-app section.
            apply_game_field(&mut game, token);
            continue;
        }

        let level = *header_indent.get_or_insert(token.indent);
        if token.indent <= level {
            if let Some(app) = current.take() {
                add_apps.push(app);
            }
            match keys::add_app_header(token.key) {
                AddAppHeader::Extras => add_apps.push(AddAppMeta::extras(token.value)),
                AddAppHeader::Message => add_apps.push(AddAppMeta::message(token.value)),
                AddAppHeader::Named => current = Some(AddAppMeta::with_heading(token.key)),
            }
            continue;
        }

        match current.as_mut() {
            Some(app) => {
                if !keys::set_add_app_field(app, token.key, token.value) {
                    log::debug!(
                        "meta line {}: ignoring unknown add-app key '{}'",
                        token.line,
                        token.key
                    );
                }
            }
            None => errors.push(Diagnostic::new(
                DiagnosticKind::MalformedLine,
                format!(
                    "line {}: '{}' is not inside an additional application",
                    token.line, token.key
                ),
            )),
        }
    }

    if let Some(app) = current.take() {
        add_apps.push(app);
    }

    Parsed::with_errors(ParsedMeta { game, add_apps }, errors)
}

fn apply_game_field(game: &mut GameMeta, token: &Token<'_>) {
    match keys::game_field(token.key) {
        Some(field) => {
            if !token.value.is_empty() {
                game.set_field(field, token.value);
            }
        }
        None => log::debug!(
            "meta line {}: ignoring unknown key '{}'",
            token.line,
            token.key
        ),
    }
}

/// Split text into `key: value` tokens, reporting lines that are not pairs.
fn tokenize(text: &str) -> (Vec<Token<'_>>, Vec<Diagnostic>) {
    let mut tokens = Vec::new();
    let mut errors = Vec::new();

    for (i, raw) in text.lines().enumerate() {
        let line = i + 1;
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        match trimmed.split_once(':') {
            Some((key, value)) if !key.trim().is_empty() => tokens.push(Token {
                line,
                indent: indent_width(raw),
                key: key.trim(),
                value: value.trim(),
            }),
            _ => errors.push(Diagnostic::new(
                DiagnosticKind::MalformedLine,
                format!("line {line}: expected `Key: value`, got '{trimmed}'"),
            )),
        }
    }

    (tokens, errors)
}

/// Width of a line's leading whitespace, counting a tab as four columns.
fn indent_width(line: &str) -> usize {
    line.chars()
        .take_while(|c| c.is_whitespace())
        .map(|c| if c == '\t' { 4 } else { 1 })
        .sum()
}

#[cfg(test)]
#[path = "tests/text_tests.rs"]
mod tests;
