//! Module merge resolver.
//!
//! Merges a second fragment of a module into the instance already held by
//! the consolidated build record. Policy is stricter and field-specific
//! compared to the generic tree merge:
//!
//! - **Artifacts** match by name. A matched artifact is enriched
//!   one-directionally: type, checksums, and properties are copied from the
//!   incoming artifact only while the existing one has no checksum data.
//!   First-checksummed-wins; an already-checksummed artifact is never
//!   overwritten.
//! - **Dependencies** match by id. A match unions the scope sets — scopes
//!   only ever grow.
//! - **Module metadata** (type, repository, md5, sha1) fills in blanks from
//!   the incoming module, never replaces.
//!
//! Properties and `requested_by` paths are not merged here; they are
//! populated by the build aggregator and the provenance tracker.

use std::collections::BTreeMap;

use tracing::{debug, trace};

use crate::merge::provenance::ProvenanceMap;
use crate::model::types::{Artifact, Dependency, Module, is_filled};

// ---------------------------------------------------------------------------
// merge_module
// ---------------------------------------------------------------------------

/// Merge `incoming` into `existing`, in place.
///
/// Callers are expected to have matched the two by id; the resolver does
/// not check.
pub fn merge_module(existing: &mut Module, incoming: Module) {
    let Module {
        id: _,
        module_type,
        repository,
        md5,
        sha1,
        properties: _,
        artifacts,
        dependencies,
    } = incoming;

    merge_artifacts(existing, artifacts);
    merge_dependencies(existing, dependencies);

    // Blank metadata fills from the incoming side, set metadata stays.
    fill_blank(&mut existing.module_type, module_type);
    fill_blank(&mut existing.repository, repository);
    fill_blank(&mut existing.md5, md5);
    fill_blank(&mut existing.sha1, sha1);
}

fn fill_blank(existing: &mut Option<String>, incoming: Option<String>) {
    if !is_filled(existing.as_ref()) && is_filled(incoming.as_ref()) {
        *existing = incoming;
    }
}

fn merge_artifacts(existing: &mut Module, incoming: Vec<Artifact>) {
    if incoming.is_empty() {
        return;
    }
    if existing.artifacts.is_empty() {
        debug!(module = %existing.id, count = incoming.len(), "adopting artifact list wholesale");
        existing.artifacts = incoming;
        return;
    }

    for artifact in incoming {
        match existing.artifacts.iter_mut().find(|a| a.name == artifact.name) {
            None => existing.artifacts.push(artifact),
            Some(found) => {
                if found.has_checksums() {
                    // First-checksummed-wins: the existing artifact already
                    // carries checksum data and is never overwritten.
                    trace!(artifact = %found.name, "existing artifact already checksummed");
                } else {
                    trace!(artifact = %found.name, "enriching artifact from incoming fragment");
                    found.artifact_type = artifact.artifact_type;
                    found.md5 = artifact.md5;
                    found.sha1 = artifact.sha1;
                    found.properties = artifact.properties;
                }
            }
        }
    }
}

fn merge_dependencies(existing: &mut Module, incoming: Vec<Dependency>) {
    if incoming.is_empty() {
        return;
    }
    if existing.dependencies.is_empty() {
        debug!(module = %existing.id, count = incoming.len(), "adopting dependency list wholesale");
        existing.dependencies = incoming;
        return;
    }

    for dependency in incoming {
        match existing
            .dependencies
            .iter_mut()
            .find(|d| d.id == dependency.id)
        {
            None => existing.dependencies.push(dependency),
            Some(found) => {
                trace!(dependency = %found.id, "unioning scopes");
                found.scopes.extend(dependency.scopes);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Provenance attachment
// ---------------------------------------------------------------------------

/// Attach `requested_by` paths to each of the module's dependencies from a
/// provenance map computed for this module's resolution pass.
///
/// Paths are appended, never replaced: a later resolution pass adds its
/// paths on top of earlier ones, duplicates included (the list is a bag).
pub fn attach_requested_by(module: &mut Module, provenance: &ProvenanceMap) {
    for dependency in &mut module.dependencies {
        if let Some(paths) = provenance.get(&dependency.id) {
            dependency.requested_by.extend(paths.iter().cloned());
        }
    }
}

/// Overlay per-dependency properties (e.g. classifier or resolution flags
/// published by the build tool) onto matching dependencies by id.
pub fn attach_dependency_properties(
    module: &mut Module,
    properties: &BTreeMap<String, BTreeMap<String, String>>,
) {
    for dependency in &mut module.dependencies {
        if let Some(extra) = properties.get(&dependency.id) {
            dependency
                .properties
                .extend(extra.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
