//! Error types for build-metadata aggregation.
//!
//! Defines [`MergeError`], the unified error type for the merge layer.
//! Aggregation fails closed: any structural mismatch aborts the whole merge
//! and no partially-merged output is returned. The two documented fallback
//! behaviors (bag-union downgrade on malformed identity, last-writer-wins
//! on property collision) are policies, not errors, and never surface here.

use std::fmt;
use std::path::PathBuf;

// ---------------------------------------------------------------------------
// ValueKind
// ---------------------------------------------------------------------------

/// Coarse JSON value classification, used in mismatch reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValueKind {
    Null,
    Bool,
    Number,
    String,
    Array,
    Object,
}

impl ValueKind {
    /// Classify a JSON value.
    #[must_use]
    pub fn of(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(_) => Self::Bool,
            serde_json::Value::Number(_) => Self::Number,
            serde_json::Value::String(_) => Self::String,
            serde_json::Value::Array(_) => Self::Array,
            serde_json::Value::Object(_) => Self::Object,
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Null => "null",
            Self::Bool => "boolean",
            Self::Number => "number",
            Self::String => "string",
            Self::Array => "array",
            Self::Object => "object",
        };
        write!(f, "{name}")
    }
}

// ---------------------------------------------------------------------------
// MergeError
// ---------------------------------------------------------------------------

/// Unified error type for structural merge and fragment-file operations.
#[derive(Debug)]
pub enum MergeError {
    /// Two values at the same position have irreconcilable shapes
    /// (e.g. an array merged against a scalar at the same key).
    ShapeMismatch {
        /// The object key where the mismatch occurred, or `None` at the
        /// top level of the two documents.
        key: Option<String>,
        /// Kind of the source-side value.
        source: ValueKind,
        /// Kind of the destination-side value.
        destination: ValueKind,
    },

    /// A fragment file could not be parsed as JSON.
    Json {
        /// Path of the offending file.
        path: PathBuf,
        /// Parser diagnostic.
        detail: String,
    },

    /// An I/O error while reading or writing a fragment file.
    Io(std::io::Error),
}

impl fmt::Display for MergeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ShapeMismatch {
                key,
                source,
                destination,
            } => match key {
                Some(key) => write!(
                    f,
                    "cannot merge {source} into {destination} at key '{key}': \
                     fragments disagree on the document shape"
                ),
                None => write!(
                    f,
                    "cannot merge {source} into {destination}: \
                     fragments disagree on the document shape"
                ),
            },
            Self::Json { path, detail } => {
                write!(f, "invalid JSON in fragment '{}': {detail}", path.display())
            }
            Self::Io(err) => write!(f, "fragment I/O error: {err}"),
        }
    }
}

impl std::error::Error for MergeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for MergeError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
