//! Build graph aggregator.
//!
//! Folds one build fragment into a base record. Three independent,
//! deliberately different merge policies are in play:
//!
//! - **first-non-null-wins** — the build agent;
//! - **last-writer-wins** — build properties, key by key;
//! - **pure append** — build-level dependency references, which form a log
//!   of consumed builds and are never matched or deduplicated.
//!
//! Because of the first two, `append` is not commutative: folding fragments
//! in a different order can produce a different agent or property value.
//! That order dependence is inherited behavior and is preserved, not fixed
//! (see DESIGN.md). Module lists are the exception — they merge by id via
//! [`crate::merge::module::merge_module`] and are order-insensitive up to
//! list ordering.
//!
//! The record's own identity (name, number) and timestamps belong to the
//! base and are never taken from the appended fragment.

use std::collections::BTreeMap;

use tracing::debug;

use crate::merge::module::merge_module;
use crate::model::types::{BuildRecord, BuildRef, Issues, Module};

// ---------------------------------------------------------------------------
// append
// ---------------------------------------------------------------------------

/// Merge `other` into `base`, in place.
pub fn append(base: &mut BuildRecord, other: BuildRecord) {
    let BuildRecord {
        name: _,
        number: _,
        version: _,
        started: _,
        build_agent,
        vcs: _,
        properties,
        modules,
        build_dependencies,
        issues,
    } = other;

    // First-non-null-wins.
    if base.build_agent.is_none() {
        base.build_agent = build_agent;
    }

    append_properties(base, properties);
    append_modules(base, modules);
    append_build_refs(base, build_dependencies);
    append_issues(&mut base.issues, issues);
}

/// Per-key last-writer-wins: on collision the appended fragment's value
/// replaces the base's. Never an error.
fn append_properties(base: &mut BuildRecord, properties: BTreeMap<String, String>) {
    if properties.is_empty() {
        return;
    }
    if base.properties.is_empty() {
        debug!(count = properties.len(), "adopting property map wholesale");
        base.properties = properties;
    } else {
        base.properties.extend(properties);
    }
}

fn append_modules(base: &mut BuildRecord, modules: Vec<Module>) {
    if modules.is_empty() {
        return;
    }
    if base.modules.is_empty() {
        debug!(count = modules.len(), "adopting module list wholesale");
        base.modules = modules;
        return;
    }

    for module in modules {
        match base.module_mut(&module.id) {
            Some(existing) => merge_module(existing, module),
            None => base.modules.push(module),
        }
    }
}

/// Pure append. The build-level dependency list is a log of referenced
/// builds, so identical entries are kept.
fn append_build_refs(base: &mut BuildRecord, refs: Vec<BuildRef>) {
    if refs.is_empty() {
        return;
    }
    if base.build_dependencies.is_empty() {
        base.build_dependencies = refs;
    } else {
        base.build_dependencies.extend(refs);
    }
}

/// Issues fold with true set semantics on the affected-issue set.
///
/// A side that collected nothing (no tracker, or no affected issues) is
/// ignored; if the base collected nothing, the other block is adopted
/// wholesale, flags included. When both collected, the sets union only if
/// the tracker names match — issues from a different tracker are dropped
/// rather than mixed.
fn append_issues(base: &mut Option<Issues>, other: Option<Issues>) {
    let Some(other) = other else {
        return;
    };
    let Some(existing) = base else {
        *base = Some(other);
        return;
    };

    if !other.has_collected() {
        return;
    }
    if !existing.has_collected() {
        debug!("adopting issues block wholesale");
        *existing = other;
        return;
    }

    let same_tracker = match (&existing.tracker, &other.tracker) {
        (Some(a), Some(b)) => a.name == b.name,
        _ => false,
    };
    if same_tracker {
        existing.affected_issues.extend(other.affected_issues);
    } else {
        debug!("tracker names differ, keeping base issues unchanged");
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
