//! Structural merge engine for semi-structured trees.
//!
//! Deep-merges two JSON documents ([`serde_json::Value`]) produced by
//! independent workers of the same build. Objects merge key-by-key, arrays
//! of identity-keyed records merge element-wise by id, and all other arrays
//! merge as unordered bags.
//!
//! # Policy summary
//!
//! - Absent (null / empty object / empty array) on either side: the other
//!   side wins unchanged.
//! - Deep-equal: either side.
//! - Object + object: destination copy, source keys merged in; a source
//!   scalar replaces whatever the destination holds at that key.
//! - Array + array: identity-keyed record merge when the first source
//!   element carries one of the configured candidate keys, otherwise bag
//!   union with exact duplicates removed. Bag union keeps the first
//!   occurrence of each distinct element (destination first, then source),
//!   so the original interleaving is not preserved — a documented
//!   trade-off, not a defect.
//! - Anything else (array vs scalar at the same key, object vs array at
//!   the top level): fatal [`MergeError::ShapeMismatch`]. Aggregation
//!   fails closed; no partially-merged tree is returned.
//!
//! # Malformed identity
//!
//! If any element of either list is not an object, or lacks the probed
//! identity key, the whole list pair downgrades to bag union. This guard is
//! deliberate: matching semantics never change mid-list, and a fragment
//! with a stray untagged element cannot crash the merge.
//!
//! Record matching is O(n·m) per list pair. Lists hold modules, artifacts,
//! and dependencies of a single build, so n and m are bounded by project
//! size, not request volume.

use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::config::MergeOptions;
use crate::error::{MergeError, ValueKind};

// ---------------------------------------------------------------------------
// merge
// ---------------------------------------------------------------------------

/// Merge `source` into `destination`, producing a new tree.
///
/// Neither input is mutated. See the module docs for the full policy.
///
/// # Errors
///
/// [`MergeError::ShapeMismatch`] when the two documents (or two values at
/// the same object key) have irreconcilable kinds.
pub fn merge(
    source: &Value,
    destination: &Value,
    options: &MergeOptions,
) -> Result<Value, MergeError> {
    if is_absent(source) {
        return Ok(destination.clone());
    }
    if is_absent(destination) {
        return Ok(source.clone());
    }
    if source == destination {
        return Ok(source.clone());
    }

    match (source, destination) {
        (Value::Object(src), Value::Object(dst)) => {
            merge_objects(src, dst, options).map(Value::Object)
        }
        (Value::Array(src), Value::Array(dst)) => {
            merge_arrays(src, dst, options).map(Value::Array)
        }
        _ => Err(MergeError::ShapeMismatch {
            key: None,
            source: ValueKind::of(source),
            destination: ValueKind::of(destination),
        }),
    }
}

/// A tree is absent when there is nothing to merge from it.
fn is_absent(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Array(items) => items.is_empty(),
        Value::Object(entries) => entries.is_empty(),
        _ => false,
    }
}

// ---------------------------------------------------------------------------
// Object merge
// ---------------------------------------------------------------------------

fn merge_objects(
    source: &Map<String, Value>,
    destination: &Map<String, Value>,
    options: &MergeOptions,
) -> Result<Map<String, Value>, MergeError> {
    let mut result = destination.clone();

    for (key, source_value) in source {
        let merged = match result.get(key) {
            None => source_value.clone(),
            Some(destination_value) => {
                merge_entry(key, source_value, destination_value, options)?
            }
        };
        result.insert(key.clone(), merged);
    }

    Ok(result)
}

/// Merge two values that share an object key.
///
/// Scalars from the source replace the destination value outright; arrays
/// and objects recurse, and a kind mismatch on a container is fatal.
fn merge_entry(
    key: &str,
    source: &Value,
    destination: &Value,
    options: &MergeOptions,
) -> Result<Value, MergeError> {
    if is_absent(destination) {
        return Ok(source.clone());
    }
    if source == destination {
        return Ok(source.clone());
    }

    match (source, destination) {
        (Value::Object(src), Value::Object(dst)) => {
            merge_objects(src, dst, options).map(Value::Object)
        }
        (Value::Array(src), Value::Array(dst)) => {
            merge_arrays(src, dst, options).map(Value::Array)
        }
        (Value::Object(_) | Value::Array(_), _) => Err(MergeError::ShapeMismatch {
            key: Some(key.to_owned()),
            source: ValueKind::of(source),
            destination: ValueKind::of(destination),
        }),
        // Scalar source wins at this key, whatever the destination held.
        _ => Ok(source.clone()),
    }
}

// ---------------------------------------------------------------------------
// Array merge
// ---------------------------------------------------------------------------

fn merge_arrays(
    source: &[Value],
    destination: &[Value],
    options: &MergeOptions,
) -> Result<Vec<Value>, MergeError> {
    if source.is_empty() {
        return Ok(destination.to_vec());
    }
    if destination.is_empty() || source == destination {
        return Ok(source.to_vec());
    }

    if let Some(id_key) = probe_identity_key(source, options) {
        if lists_keyed_by(source, id_key) && lists_keyed_by(destination, id_key) {
            trace!(id_key, "identity-keyed record merge");
            return merge_records(source, destination, id_key, options);
        }
        // An element on one side is missing the key the probe chose.
        // Looking its identity up would be meaningless, so the whole pair
        // degrades to bag semantics instead of failing.
        debug!(id_key, "identity extraction failed, using bag union");
    }

    Ok(bag_union(source, destination))
}

/// Probe the first source element for the first configured candidate key it
/// carries with a non-null value.
fn probe_identity_key<'a>(source: &[Value], options: &'a MergeOptions) -> Option<&'a str> {
    let first = source.first()?.as_object()?;
    options
        .identity_keys
        .iter()
        .map(String::as_str)
        .find(|key| first.get(*key).is_some_and(|v| !v.is_null()))
}

/// Every element is an object carrying a non-null value for `id_key`.
fn lists_keyed_by(list: &[Value], id_key: &str) -> bool {
    list.iter().all(|element| {
        element
            .as_object()
            .and_then(|obj| obj.get(id_key))
            .is_some_and(|v| !v.is_null())
    })
}

/// Element-wise merge of two lists of records sharing `id_key`.
///
/// Result ordering: unmatched destination records (original order), then
/// merged matched pairs (source iteration order), then unmatched source
/// records (source order). Recently-merged and newly-introduced records
/// surface after previously-settled ones.
fn merge_records(
    source: &[Value],
    destination: &[Value],
    id_key: &str,
    options: &MergeOptions,
) -> Result<Vec<Value>, MergeError> {
    let mut remaining: Vec<Option<&Value>> = destination.iter().map(Some).collect();
    let mut merged_pairs = Vec::new();
    let mut unmatched_source = Vec::new();

    for record in source {
        let id = &record[id_key];
        let matched = remaining
            .iter()
            .position(|slot| slot.is_some_and(|candidate| &candidate[id_key] == id));

        match matched {
            Some(slot) => {
                trace!(%id, "matched record");
                if let Some(counterpart) = remaining[slot].take() {
                    merged_pairs.push(merge_entry(id_key, record, counterpart, options)?);
                }
            }
            None => unmatched_source.push(record.clone()),
        }
    }

    let mut result: Vec<Value> = remaining.into_iter().flatten().cloned().collect();
    result.extend(merged_pairs);
    result.extend(unmatched_source);
    Ok(result)
}

/// Union of two lists with exact duplicates removed; destination elements
/// first, each distinct element kept at its first occurrence.
fn bag_union(source: &[Value], destination: &[Value]) -> Vec<Value> {
    let mut result: Vec<Value> = Vec::with_capacity(source.len() + destination.len());
    for element in destination.iter().chain(source) {
        if !result.contains(element) {
            result.push(element.clone());
        }
    }
    result
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn merge_default(source: &Value, destination: &Value) -> Result<Value, MergeError> {
        merge(source, destination, &MergeOptions::default())
    }

    // -- absent / equal --

    #[test]
    fn absent_side_yields_other() {
        let tree = json!({"a": 1});
        assert_eq!(merge_default(&json!(null), &tree).unwrap(), tree);
        assert_eq!(merge_default(&tree, &json!(null)).unwrap(), tree);
        assert_eq!(merge_default(&json!({}), &tree).unwrap(), tree);
        assert_eq!(merge_default(&tree, &json!([])).unwrap(), tree);
    }

    #[test]
    fn equal_trees_collapse() {
        let tree = json!({"a": [1, 2], "b": {"c": "d"}});
        assert_eq!(merge_default(&tree, &tree).unwrap(), tree);
    }

    #[test]
    fn equal_scalars_collapse() {
        assert_eq!(merge_default(&json!(7), &json!(7)).unwrap(), json!(7));
    }

    // -- objects --

    #[test]
    fn object_merge_adds_and_replaces() {
        let source = json!({"b": 2, "c": 3});
        let destination = json!({"a": 1, "b": 9});
        let merged = merge_default(&source, &destination).unwrap();
        assert_eq!(merged, json!({"a": 1, "b": 2, "c": 3}));
    }

    #[test]
    fn object_merge_recurses() {
        let source = json!({"nested": {"x": 1}});
        let destination = json!({"nested": {"y": 2}});
        let merged = merge_default(&source, &destination).unwrap();
        assert_eq!(merged, json!({"nested": {"x": 1, "y": 2}}));
    }

    #[test]
    fn scalar_source_replaces_destination_value() {
        let source = json!({"k": "new"});
        let destination = json!({"k": {"was": "an object"}});
        let merged = merge_default(&source, &destination).unwrap();
        assert_eq!(merged, json!({"k": "new"}));
    }

    // -- shape mismatches --

    #[test]
    fn array_vs_scalar_at_key_is_fatal() {
        let source = json!({"deps": [1, 2]});
        let destination = json!({"deps": "none"});
        let err = merge_default(&source, &destination).unwrap_err();
        match err {
            MergeError::ShapeMismatch { key, .. } => {
                assert_eq!(key.as_deref(), Some("deps"));
            }
            other => panic!("expected ShapeMismatch, got {other:?}"),
        }
    }

    #[test]
    fn object_vs_array_top_level_is_fatal() {
        let err = merge_default(&json!({"a": 1}), &json!([1])).unwrap_err();
        assert!(matches!(err, MergeError::ShapeMismatch { key: None, .. }));
    }

    #[test]
    fn unequal_scalars_top_level_is_fatal() {
        let err = merge_default(&json!(1), &json!(2)).unwrap_err();
        assert!(matches!(err, MergeError::ShapeMismatch { .. }));
    }

    // -- bag union --

    #[test]
    fn scalar_lists_union_without_duplicates() {
        let source = json!(["c", "a"]);
        let destination = json!(["a", "b"]);
        let merged = merge_default(&source, &destination).unwrap();
        assert_eq!(merged, json!(["a", "b", "c"]));
    }

    #[test]
    fn bag_union_removes_intra_list_duplicates() {
        let source = json!([1, 1, 2]);
        let destination = json!([2, 2, 3]);
        let merged = merge_default(&source, &destination).unwrap();
        assert_eq!(merged, json!([2, 3, 1]));
    }

    // -- identity-keyed record merge --

    #[test]
    fn records_merge_by_id() {
        let source = json!([{"id": "m1", "x": 1}, {"id": "m3", "x": 3}]);
        let destination = json!([{"id": "m1", "y": 2}, {"id": "m2", "y": 9}]);
        let merged = merge_default(&source, &destination).unwrap();
        // Unmatched destination, then merged pairs, then unmatched source.
        assert_eq!(
            merged,
            json!([
                {"id": "m2", "y": 9},
                {"id": "m1", "x": 1, "y": 2},
                {"id": "m3", "x": 3},
            ])
        );
    }

    #[test]
    fn name_key_is_probed_when_id_absent() {
        let source = json!([{"name": "a.jar", "sha1": "s"}]);
        let destination = json!([{"name": "a.jar", "md5": "m"}]);
        let merged = merge_default(&source, &destination).unwrap();
        assert_eq!(merged, json!([{"name": "a.jar", "md5": "m", "sha1": "s"}]));
    }

    #[test]
    fn id_preferred_over_name() {
        // Both keys present: "id" wins, so records with equal names but
        // different ids stay separate.
        let source = json!([{"id": "1", "name": "same"}]);
        let destination = json!([{"id": "2", "name": "same"}]);
        let merged = merge_default(&source, &destination).unwrap();
        assert_eq!(merged.as_array().unwrap().len(), 2);
    }

    #[test]
    fn duplicate_source_ids_consume_one_destination_match() {
        let source = json!([{"id": "d", "a": 1}, {"id": "d", "b": 2}]);
        let destination = json!([{"id": "d", "c": 3}]);
        let merged = merge_default(&source, &destination).unwrap();
        assert_eq!(
            merged,
            json!([{"id": "d", "a": 1, "c": 3}, {"id": "d", "b": 2}])
        );
    }

    #[test]
    fn malformed_identity_downgrades_to_bag_union() {
        // Second destination element lacks "id": matching would dereference
        // a missing identity, so the pair degrades to bag union.
        let source = json!([{"id": "m1", "x": 1}]);
        let destination = json!([{"id": "m1", "y": 2}, {"other": true}]);
        let merged = merge_default(&source, &destination).unwrap();
        assert_eq!(
            merged,
            json!([{"id": "m1", "y": 2}, {"other": true}, {"id": "m1", "x": 1}])
        );
    }

    #[test]
    fn non_object_source_head_means_bag_union() {
        let source = json!([1, {"id": "x"}]);
        let destination = json!([{"id": "x"}]);
        let merged = merge_default(&source, &destination).unwrap();
        assert_eq!(merged, json!([{"id": "x"}, 1]));
    }

    #[test]
    fn nested_record_error_carries_inner_key() {
        let source = json!([{"id": "m1", "deps": [1]}]);
        let destination = json!([{"id": "m1", "deps": "broken"}]);
        let err = merge_default(&source, &destination).unwrap_err();
        match err {
            MergeError::ShapeMismatch { key, .. } => assert_eq!(key.as_deref(), Some("deps")),
            other => panic!("expected ShapeMismatch, got {other:?}"),
        }
    }

    #[test]
    fn custom_identity_keys_respected() {
        let options = MergeOptions::with_identity_keys(["coordinate"]);
        let source = json!([{"coordinate": "g:a:1", "scope": "test"}]);
        let destination = json!([{"coordinate": "g:a:1", "scope": "compile"}]);
        let merged = merge(&source, &destination, &options).unwrap();
        assert_eq!(merged, json!([{"coordinate": "g:a:1", "scope": "test"}]));
    }
}
