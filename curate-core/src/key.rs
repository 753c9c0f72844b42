//! Curation and game keys.
//!
//! Keys are random (v4) UUIDs rendered in the canonical lowercase hyphenated
//! form, e.g. `0123abcd-fee2-0987-dfea-cd341234cdef`.

/// Length of a well-formed key.
pub const KEY_LEN: usize = 36;

/// Byte offsets of the hyphens in a well-formed key.
const HYPHEN_POSITIONS: [usize; 4] = [8, 13, 18, 23];

/// Generate a fresh key for a curation, additional application, or game.
pub fn generate_key() -> String {
    uuid::Uuid::new_v4().hyphenated().to_string()
}

/// Check that a string is a well-formed key.
///
/// Only the shape is checked (length, lowercase hex digits, hyphen
/// placement); the version and variant nibbles are not validated, so any
/// UUID-shaped identifier from another tool is accepted.
pub fn validate_key(s: &str) -> bool {
    if s.len() != KEY_LEN {
        return false;
    }
    s.bytes().enumerate().all(|(i, b)| {
        if HYPHEN_POSITIONS.contains(&i) {
            b == b'-'
        } else {
            matches!(b, b'0'..=b'9' | b'a'..=b'f')
        }
    })
}

#[cfg(test)]
#[path = "tests/key_tests.rs"]
mod tests;
