//! Non-fatal problems found while parsing or indexing.
//!
//! Parsers and indexers never abort on bad input. They return whatever they
//! could recover wrapped in [`Parsed`], with the problems attached as
//! [`Diagnostic`]s so a batch can keep going and the operator can see what
//! went wrong.

use serde::{Deserialize, Serialize};

/// Category of a non-fatal problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// No metadata file was found in the source.
    MissingMeta,
    /// The archive or folder could not be opened or read.
    UnreadableSource,
    /// More than one candidate curation root was found.
    AmbiguousRoot,
    /// The curation root has no `content` folder.
    MissingContent,
    /// The metadata text could not be tokenized at all.
    MalformedMeta,
    /// A single metadata line was skipped.
    MalformedLine,
    /// The legacy XML document could not be read to the end.
    Xml,
}

impl DiagnosticKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingMeta => "missing meta",
            Self::UnreadableSource => "unreadable source",
            Self::AmbiguousRoot => "ambiguous root",
            Self::MissingContent => "missing content",
            Self::MalformedMeta => "malformed meta",
            Self::MalformedLine => "malformed line",
            Self::Xml => "xml",
        }
    }
}

/// A single non-fatal problem with a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind.as_str(), self.message)
    }
}

/// A value recovered from possibly-bad input, plus what went wrong.
#[derive(Debug, Clone, PartialEq)]
pub struct Parsed<T> {
    pub value: T,
    pub errors: Vec<Diagnostic>,
}

impl<T> Parsed<T> {
    /// A clean result with no diagnostics.
    pub fn ok(value: T) -> Self {
        Self {
            value,
            errors: Vec::new(),
        }
    }

    /// A result carrying diagnostics.
    pub fn with_errors(value: T, errors: Vec<Diagnostic>) -> Self {
        Self { value, errors }
    }

    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    /// Transform the value, keeping the diagnostics.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Parsed<U> {
        Parsed {
            value: f(self.value),
            errors: self.errors,
        }
    }

    /// Split into the value and its diagnostics.
    pub fn into_parts(self) -> (T, Vec<Diagnostic>) {
        (self.value, self.errors)
    }
}

impl<T: Default> Default for Parsed<T> {
    fn default() -> Self {
        Self::ok(T::default())
    }
}
