//! buildfold — build metadata consolidation.
//!
//! Records about a build (produced artifacts, resolved dependencies, VCS
//! state, issue history) arrive in fragments: one per module of a
//! multi-module build, one per distributed worker, or one per repeated
//! build run. This crate merges those fragments into a single consolidated
//! record:
//!
//! - [`merge::tree`] — generic structural merge of raw JSON fragments,
//!   with identity-keyed list merging;
//! - [`merge::module`] / [`merge::build`] — field-specific merge policies
//!   for typed module and build records;
//! - [`merge::provenance`] — "who requested this dependency, through what
//!   chain" path tracking over resolved dependency trees;
//! - [`collect`] — per-module accumulators and the aggregation barrier;
//! - [`fragment`] — merging fragments persisted as JSON files.
//!
//! Publishing the consolidated record (serialization endpoints, HTTP,
//! checksum computation) is the surrounding tooling's job, not this
//! crate's.

pub mod collect;
pub mod config;
pub mod error;
pub mod fragment;
pub mod merge;
pub mod model;

pub use config::MergeOptions;
pub use error::MergeError;
pub use model::types::{
    Artifact, BuildAgent, BuildRecord, BuildRef, Dependency, Issue, IssueTracker, Issues, Module,
    ProvenancePath, Vcs,
};
