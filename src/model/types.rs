//! Record types for build metadata.
//!
//! These are the typed counterparts of the persisted JSON build-info
//! document. Field names serialize in camelCase because the JSON shape is
//! an external contract shared with the publishing tooling.
//!
//! Identity rules (used by the merge layer, never enforced here):
//! - [`BuildRecord`]: (name, number), assigned by the producer.
//! - [`Module`]: `id`, unique within a build record.
//! - [`Artifact`]: `name`, unique within a module.
//! - [`Dependency`]: `id` (a coordinate string).

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

/// Returns `true` if the optional string carries actual content.
///
/// Producers emit both missing fields and empty strings for "no value";
/// merge policy treats the two identically.
pub(crate) fn is_filled(value: Option<&String>) -> bool {
    value.is_some_and(|v| !v.is_empty())
}

// ---------------------------------------------------------------------------
// BuildRecord
// ---------------------------------------------------------------------------

/// A build record — either a partial fragment produced by one worker/module,
/// or the consolidated whole.
///
/// Fragments carry the same shape as the final record; consolidation is
/// performed by [`crate::merge::build::append`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BuildRecord {
    /// Build name. Together with `number` this is the record's identity.
    pub name: String,
    /// Build number (a string: producers use counters, timestamps, or hashes).
    pub number: String,
    /// Schema version of the producing tool.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// ISO-8601 start timestamp.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started: Option<String>,
    /// The build tool that produced this record (first fragment wins on merge).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build_agent: Option<BuildAgent>,
    /// VCS state at build time. May list several repositories.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub vcs: Vec<Vcs>,
    /// Free-form build properties (environment capture, tool settings).
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, String>,
    /// Modules of a multi-module build, keyed by module id.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub modules: Vec<Module>,
    /// References to other builds this build consumed. A log, not a set:
    /// entries are appended on merge, never deduplicated.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub build_dependencies: Vec<BuildRef>,
    /// Issue-tracker state accumulated across builds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issues: Option<Issues>,
}

impl BuildRecord {
    /// Create an empty record with the given identity.
    #[must_use]
    pub fn new(name: impl Into<String>, number: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            number: number.into(),
            ..Self::default()
        }
    }

    /// Find a module by id.
    #[must_use]
    pub fn module(&self, id: &str) -> Option<&Module> {
        self.modules.iter().find(|m| m.id == id)
    }

    /// Find a module by id, mutably.
    pub fn module_mut(&mut self, id: &str) -> Option<&mut Module> {
        self.modules.iter_mut().find(|m| m.id == id)
    }
}

// ---------------------------------------------------------------------------
// BuildAgent / Vcs
// ---------------------------------------------------------------------------

/// The build tool (name + version) that produced a fragment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildAgent {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl fmt::Display for BuildAgent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version {
            Some(v) => write!(f, "{}/{v}", self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

/// VCS state captured at build time.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Vcs {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revision: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

// ---------------------------------------------------------------------------
// Module
// ---------------------------------------------------------------------------

/// One module of a multi-module build.
///
/// Created once per build unit; when a second fragment reports the same id,
/// the two are merged in place by [`crate::merge::module::merge_module`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Module {
    /// Module identity, unique within a build record.
    pub id: String,
    /// Packaging type (e.g. `"jar"`, `"docker"`).
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub module_type: Option<String>,
    /// Target repository for the module's artifacts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub md5: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha1: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub artifacts: Vec<Artifact>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<Dependency>,
}

impl Module {
    /// Create an empty module with the given id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Find an artifact by name.
    #[must_use]
    pub fn artifact(&self, name: &str) -> Option<&Artifact> {
        self.artifacts.iter().find(|a| a.name == name)
    }

    /// Find a dependency by id.
    #[must_use]
    pub fn dependency(&self, id: &str) -> Option<&Dependency> {
        self.dependencies.iter().find(|d| d.id == id)
    }
}

// ---------------------------------------------------------------------------
// Artifact
// ---------------------------------------------------------------------------

/// A produced artifact. Identity within a module is `name`.
///
/// Checksums are computed by an external collaborator; fragments produced
/// before checksum calculation carry none. Partial checksum sets (md5
/// without sha1, or vice versa) occur in practice and count as "has
/// checksum data" for enrichment purposes.
#[derive(
    Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase", default)]
pub struct Artifact {
    pub name: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub artifact_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub md5: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha1: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, String>,
}

impl Artifact {
    /// Create an artifact with no type, checksums, or properties.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Returns `true` if any checksum field carries a non-blank value.
    #[must_use]
    pub fn has_checksums(&self) -> bool {
        is_filled(self.md5.as_ref()) || is_filled(self.sha1.as_ref())
    }
}

// ---------------------------------------------------------------------------
// Dependency
// ---------------------------------------------------------------------------

/// A resolved dependency of a module. Identity is `id`, a coordinate string
/// such as `"org.example:lib:1.2"`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Dependency {
    pub id: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub dependency_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub md5: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha1: Option<String>,
    /// Resolution scopes (e.g. `"compile"`, `"test"`). Unordered,
    /// deduplicated; merge policy only ever grows this set.
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub scopes: BTreeSet<String>,
    /// Every distinct chain through which this dependency was requested,
    /// nearest parent first, module root last. A bag, not a set: repeated
    /// resolution passes may record the same path twice, and duplicates are
    /// deliberately kept.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub requested_by: Vec<ProvenancePath>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, String>,
}

impl Dependency {
    /// Create a dependency with the given coordinate id and no metadata.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Create a dependency carrying a single scope.
    #[must_use]
    pub fn with_scope(id: impl Into<String>, scope: impl Into<String>) -> Self {
        let mut dep = Self::new(id);
        dep.scopes.insert(scope.into());
        dep
    }

    /// Append one provenance path. Paths accumulate; nothing is replaced.
    pub fn add_requested_by(&mut self, path: ProvenancePath) {
        self.requested_by.push(path);
    }
}

// ---------------------------------------------------------------------------
// ProvenancePath
// ---------------------------------------------------------------------------

/// One route by which a dependency was pulled into a module.
///
/// Ordered nearest-parent-first, ending at the module/root identity.
/// Downstream consumers render it as a "path to root", so the ordering is
/// part of the contract.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProvenancePath(pub Vec<String>);

impl ProvenancePath {
    #[must_use]
    pub fn new(identities: Vec<String>) -> Self {
        Self(identities)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Identities, nearest parent first.
    #[must_use]
    pub fn identities(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for ProvenancePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join(" <- "))
    }
}

impl From<Vec<&str>> for ProvenancePath {
    fn from(identities: Vec<&str>) -> Self {
        Self(identities.into_iter().map(str::to_owned).collect())
    }
}

// ---------------------------------------------------------------------------
// BuildRef
// ---------------------------------------------------------------------------

/// A reference to another build consumed by this one.
///
/// Unlike [`Dependency`], these are never matched by identity during merge:
/// the build-level dependency list is an append-only log of referenced
/// builds.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildRef {
    pub name: String,
    pub number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl BuildRef {
    #[must_use]
    pub fn new(name: impl Into<String>, number: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            number: number.into(),
            started: None,
            url: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Issues
// ---------------------------------------------------------------------------

/// Issue-tracker state accumulated across repeated builds.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Issues {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracker: Option<IssueTracker>,
    /// Whether issues from previous builds are folded into this record.
    pub aggregate_build_issues: bool,
    /// Build status up to which previous builds' issues are aggregated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aggregation_build_status: Option<String>,
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub affected_issues: BTreeSet<Issue>,
}

impl Issues {
    /// Returns `true` if this block actually collected anything — a tracker
    /// with no affected issues (or vice versa) counts as "nothing collected"
    /// and is ignored by the merge.
    #[must_use]
    pub fn has_collected(&self) -> bool {
        self.tracker.is_some() && !self.affected_issues.is_empty()
    }
}

/// The issue tracker the affected issues came from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueTracker {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// A single issue affected by a build.
///
/// Identity (equality, ordering, hashing) is (key, url, summary); the
/// `aggregated` flag marks issues carried over from previous builds and is
/// deliberately excluded so that re-observing a carried-over issue does not
/// duplicate it in the set.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Issue {
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    pub aggregated: bool,
}

impl Issue {
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }

    fn identity(&self) -> (&String, Option<&String>, Option<&String>) {
        (&self.key, self.url.as_ref(), self.summary.as_ref())
    }
}

impl PartialEq for Issue {
    fn eq(&self, other: &Self) -> bool {
        self.identity() == other.identity()
    }
}

impl Eq for Issue {}

impl PartialOrd for Issue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Issue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.identity().cmp(&other.identity())
    }
}

impl std::hash::Hash for Issue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.identity().hash(state);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
