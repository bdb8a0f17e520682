//! Data model for consolidated build metadata.
//!
//! Plain record types only — all merge policy lives in [`crate::merge`].

pub mod types;

pub use types::{
    Artifact, BuildAgent, BuildRecord, BuildRef, Dependency, Issue, IssueTracker, Issues, Module,
    ProvenancePath, Vcs,
};
