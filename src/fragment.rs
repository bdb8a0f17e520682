//! Persisted fragment handling.
//!
//! Workers that cannot hand fragments over in memory persist them as JSON
//! documents and merge into a shared destination file. This module is the
//! only place in the crate that touches the filesystem; the merge itself is
//! the structural engine from [`crate::merge::tree`].

use std::fs;
use std::path::Path;

use serde_json::Value;
use tracing::debug;

use crate::config::MergeOptions;
use crate::error::MergeError;
use crate::merge::tree::merge;
use crate::model::types::BuildRecord;

/// Merge the JSON document at `source` into the one at `destination`,
/// overwrite `destination` with the result, and return the merged tree.
///
/// # Errors
///
/// I/O failures, unparseable JSON on either side, or a structural mismatch
/// between the two documents. On error the destination file is left
/// untouched — the merged result is written only after the merge succeeds.
pub fn merge_fragment_files(
    source: &Path,
    destination: &Path,
    options: &MergeOptions,
) -> Result<Value, MergeError> {
    let source_tree = read_tree(source)?;
    let destination_tree = read_tree(destination)?;
    let merged = merge(&source_tree, &destination_tree, options)?;
    write_tree(destination, &merged)?;
    debug!(
        source = %source.display(),
        destination = %destination.display(),
        "fragment files merged"
    );
    Ok(merged)
}

/// Read a raw JSON tree from disk.
///
/// # Errors
///
/// [`MergeError::Io`] on read failure, [`MergeError::Json`] when the file
/// content is not valid JSON.
pub fn read_tree(path: &Path) -> Result<Value, MergeError> {
    let content = fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|err| MergeError::Json {
        path: path.to_path_buf(),
        detail: err.to_string(),
    })
}

/// Write a JSON tree to disk, pretty-printed (the persisted format is read
/// by humans during build troubleshooting).
///
/// # Errors
///
/// [`MergeError::Io`] on write failure.
pub fn write_tree(path: &Path, tree: &Value) -> Result<(), MergeError> {
    let rendered = serde_json::to_string_pretty(tree).map_err(|err| MergeError::Json {
        path: path.to_path_buf(),
        detail: err.to_string(),
    })?;
    fs::write(path, rendered)?;
    Ok(())
}

/// Read a typed build-record fragment from disk.
///
/// # Errors
///
/// [`MergeError::Io`] on read failure, [`MergeError::Json`] when the
/// content does not deserialize as a build record.
pub fn read_record(path: &Path) -> Result<BuildRecord, MergeError> {
    let content = fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|err| MergeError::Json {
        path: path.to_path_buf(),
        detail: err.to_string(),
    })
}

/// Persist a typed build-record fragment.
///
/// # Errors
///
/// [`MergeError::Io`] on write failure.
pub fn write_record(path: &Path, record: &BuildRecord) -> Result<(), MergeError> {
    let rendered = serde_json::to_string_pretty(record).map_err(|err| MergeError::Json {
        path: path.to_path_buf(),
        detail: err.to_string(),
    })?;
    fs::write(path, rendered)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
