//! Merge configuration.
//!
//! The structural merge engine decides whether two JSON arrays hold
//! identity-keyed records by probing the first source element for one of a
//! configured, ordered list of candidate key names. The probe order matters:
//! the first candidate present wins, so `"id"` before `"name"` means an
//! element carrying both is matched by `"id"`.

use serde::{Deserialize, Serialize};

/// Options for the structural merge engine.
///
/// Serde-derived so embedding tools can load it from their own
/// configuration files; [`MergeOptions::default`] matches the persisted
/// build-info contract (`"id"` preferred, `"name"` as fallback).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeOptions {
    /// Ordered candidate identity-key names for list-of-records merging.
    pub identity_keys: Vec<String>,
}

impl MergeOptions {
    /// Options with an explicit identity-key probe order.
    #[must_use]
    pub fn with_identity_keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            identity_keys: keys.into_iter().map(Into::into).collect(),
        }
    }
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            identity_keys: vec!["id".to_owned(), "name".to_owned()],
        }
    }
}
