//! Dependency provenance tracker.
//!
//! Walks a module's resolved dependency tree and produces, for every
//! transitive dependency, every distinct chain of parents through which it
//! was requested. The input is a physical tree: re-converging identities
//! (diamond dependencies) appear as separate nodes under separate parents,
//! so the walk needs no cycle detection — it terminates on any finite tree.
//!
//! Each recorded path is ordered nearest-parent-first and ends at the
//! module/root identity; downstream consumers render it as a "path to
//! root". Diamonds yield one path per distinct ancestor chain, appended in
//! pre-order traversal order and never merged, deduplicated, or reduced to
//! a shortest path.

use std::collections::BTreeMap;

use tracing::debug;

use crate::model::types::ProvenancePath;

/// Dependency identity → every chain that requested it.
pub type ProvenanceMap = BTreeMap<String, Vec<ProvenancePath>>;

// ---------------------------------------------------------------------------
// DependencyNode
// ---------------------------------------------------------------------------

/// One node of a resolved dependency tree, as reported by the build tool's
/// resolution listener. Transient input to [`build_provenance_map`] only.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DependencyNode {
    /// Coordinate identity. The same identity may appear at several
    /// positions in the tree.
    pub id: String,
    /// Direct children, in resolution order.
    pub children: Vec<DependencyNode>,
}

impl DependencyNode {
    /// Create a leaf node.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            children: Vec::new(),
        }
    }

    /// Create a node with children.
    #[must_use]
    pub fn with_children(id: impl Into<String>, children: Vec<Self>) -> Self {
        Self {
            id: id.into(),
            children,
        }
    }

    /// Append a child, returning `self` for chained construction.
    #[must_use]
    pub fn child(mut self, child: Self) -> Self {
        self.children.push(child);
        self
    }
}

// ---------------------------------------------------------------------------
// build_provenance_map
// ---------------------------------------------------------------------------

/// Compute the identity → paths map for one module's resolution pass.
///
/// The root node is the module itself; its direct children are recorded
/// with the single-element path `[root]`, deeper descendants with their
/// full ancestor chain. `None` (no resolution happened) produces an empty
/// map, not an error.
#[must_use]
pub fn build_provenance_map(root: Option<&DependencyNode>) -> ProvenanceMap {
    let mut map = ProvenanceMap::new();
    let Some(root) = root else {
        return map;
    };

    let mut ancestors = vec![root.id.clone()];
    visit(root, &mut ancestors, &mut map);
    debug!(
        root = %root.id,
        dependencies = map.len(),
        "computed provenance map"
    );
    map
}

/// Pre-order walk. `ancestors` holds the chain from `node` up to the root,
/// nearest-first with `node`'s own identity at the front.
fn visit(node: &DependencyNode, ancestors: &mut Vec<String>, map: &mut ProvenanceMap) {
    for child in &node.children {
        map.entry(child.id.clone())
            .or_default()
            .push(ProvenancePath::new(ancestors.clone()));

        ancestors.insert(0, child.id.clone());
        visit(child, ancestors, map);
        ancestors.remove(0);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
