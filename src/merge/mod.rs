//! Merge layer: consolidating build fragments into one record.
//!
//! Four components, leaves first:
//!
//! - **tree** — generic structural merge of two raw JSON documents, used
//!   when fragments are still in persisted-tree form rather than typed
//!   records.
//! - **module** — identity-aware merge of a module's artifact and
//!   dependency lists, with field-specific enrichment rules.
//! - **build** — whole-record aggregation: properties, modules (via the
//!   module resolver), build-level references, issue sets.
//! - **provenance** — turns a module's resolved dependency tree into an
//!   identity → requested-by-paths map, attached to dependencies before or
//!   after module merge.
//!
//! All merge functions are pure transformations over in-memory data: no
//! I/O, no locking (callers run them after the extraction barrier), no
//! retries. Structural mismatches fail the whole merge — a partially
//! merged record is never returned.

pub mod build;
pub mod module;
pub mod provenance;
pub mod tree;

pub use build::append;
pub use module::{attach_dependency_properties, attach_requested_by, merge_module};
pub use provenance::{DependencyNode, ProvenanceMap, build_provenance_map};
pub use tree::merge;
