//! Metadata parsers for curation packages.
//!
//! - [`text`]: the line-oriented `meta.txt` format
//! - [`yaml`]: the `meta.yaml` format
//! - [`launchbox`]: the legacy LaunchBox `<Game>` XML schema
//!
//! None of the parsers fail on bad input. Each returns a
//! [`Parsed`](curate_core::Parsed) value carrying whatever could be
//! recovered plus diagnostics.

mod keys;
pub mod launchbox;
pub mod text;
pub mod yaml;

use curate_core::{Diagnostic, DiagnosticKind, Parsed, ParsedMeta};

pub use launchbox::{
    ConvertContext, LAUNCHBOX_TAGS, PathOverride, PathOverrides, convert_game,
    generate_image_filename, host_platform, parse_launchbox_xml, tag_name_to_field,
};
pub use text::{parse_meta, parse_meta_bytes};
pub use yaml::parse_meta_yaml;

/// File names recognized as curation metadata, in preference order.
pub const META_FILE_NAMES: &[&str] = &["meta.yaml", "meta.yml", "meta.txt"];

/// Whether a bare file name (no directories) is a curation metadata file.
pub fn is_meta_file_name(name: &str) -> bool {
    META_FILE_NAMES
        .iter()
        .any(|candidate| candidate.eq_ignore_ascii_case(name))
}

/// Parse metadata file contents, picking the format from the file name.
///
/// `.yaml`/`.yml` files use the YAML parser; everything else the line format.
pub fn parse_meta_file_contents(file_name: &str, bytes: &[u8]) -> Parsed<ParsedMeta> {
    let lower = file_name.to_lowercase();
    if lower.ends_with(".yaml") || lower.ends_with(".yml") {
        match std::str::from_utf8(bytes) {
            Ok(text) => parse_meta_yaml(text),
            Err(_) => Parsed::with_errors(
                ParsedMeta::default(),
                vec![Diagnostic::new(
                    DiagnosticKind::MalformedMeta,
                    format!("{file_name} is not valid UTF-8 text"),
                )],
            ),
        }
    } else {
        parse_meta_bytes(bytes)
    }
}
