//! Fragment collection: per-module accumulation and the aggregation barrier.
//!
//! Extraction may run one worker per module. Each worker owns a
//! [`ModuleAccumulator`] — an explicit per-execution-context object, passed
//! into the extraction call by ownership, so there is no global or
//! thread-local mutable state. The single shared structure is the
//! [`ResolvedArtifactPool`], an append-only set of globally resolved
//! artifacts that is written concurrently and read exactly once, after all
//! workers have reported.
//!
//! [`consolidate`] runs strictly after that barrier, single-threaded,
//! folding the fragments left-to-right through the build aggregator.

use std::collections::BTreeSet;
use std::sync::Mutex;

use tracing::debug;

use crate::merge::build::append;
use crate::model::types::{Artifact, BuildRecord, Dependency, Module};

// ---------------------------------------------------------------------------
// ModuleAccumulator
// ---------------------------------------------------------------------------

/// Accumulates one module's artifacts and dependencies during extraction.
///
/// Inserts deduplicate by identity as they arrive: an artifact name is
/// recorded once (first observation wins), a dependency id is recorded once
/// with its scope set and requested-by paths growing across observations.
#[derive(Debug)]
pub struct ModuleAccumulator {
    module: Module,
}

impl ModuleAccumulator {
    /// Start accumulating for the module with the given id.
    #[must_use]
    pub fn new(module_id: impl Into<String>) -> Self {
        Self {
            module: Module::new(module_id),
        }
    }

    /// The id this accumulator collects for.
    #[must_use]
    pub fn module_id(&self) -> &str {
        &self.module.id
    }

    /// Record a build property on the module.
    pub fn property(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.module.properties.insert(key.into(), value.into());
    }

    /// Record a produced artifact. A repeated name is ignored.
    pub fn artifact(&mut self, artifact: Artifact) {
        if self.module.artifact(&artifact.name).is_none() {
            self.module.artifacts.push(artifact);
        }
    }

    /// Record a resolved dependency. Re-observing an id unions its scopes
    /// and appends its requested-by paths (paths are a bag; duplicates are
    /// kept).
    pub fn dependency(&mut self, dependency: Dependency) {
        match self
            .module
            .dependencies
            .iter_mut()
            .find(|d| d.id == dependency.id)
        {
            None => self.module.dependencies.push(dependency),
            Some(found) => {
                found.scopes.extend(dependency.scopes);
                found.requested_by.extend(dependency.requested_by);
            }
        }
    }

    /// Finish accumulation, yielding the module fragment.
    #[must_use]
    pub fn finish(self) -> Module {
        debug!(
            module = %self.module.id,
            artifacts = self.module.artifacts.len(),
            dependencies = self.module.dependencies.len(),
            "module accumulation finished"
        );
        self.module
    }
}

// ---------------------------------------------------------------------------
// ResolvedArtifactPool
// ---------------------------------------------------------------------------

/// Append-only, thread-safe pool of globally resolved artifacts.
///
/// Grows monotonically during extraction; must not be read until all
/// writers have finished. [`ResolvedArtifactPool::into_artifacts`] consumes
/// the pool, making post-barrier reads impossible to get wrong.
#[derive(Debug, Default)]
pub struct ResolvedArtifactPool {
    inner: Mutex<BTreeSet<Artifact>>,
}

impl ResolvedArtifactPool {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an artifact. Returns `false` if an equal artifact was already
    /// present.
    pub fn insert(&self, artifact: Artifact) -> bool {
        self.lock().insert(artifact)
    }

    /// Number of distinct artifacts recorded so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Consume the pool at the aggregation barrier, yielding the artifacts
    /// in deterministic (sorted) order.
    #[must_use]
    pub fn into_artifacts(self) -> Vec<Artifact> {
        match self.inner.into_inner() {
            Ok(set) => set.into_iter().collect(),
            Err(poisoned) => poisoned.into_inner().into_iter().collect(),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeSet<Artifact>> {
        // A panicked writer cannot leave the set half-updated (BTreeSet
        // insert is all-or-nothing), so a poisoned lock is still usable.
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

// ---------------------------------------------------------------------------
// consolidate
// ---------------------------------------------------------------------------

/// Fold build fragments into one consolidated record.
///
/// The first fragment becomes the base — its identity, timestamps, and
/// agent take precedence per the aggregator's policies — and the remaining
/// fragments are appended in the order given. Returns `None` for an empty
/// input.
#[must_use]
pub fn consolidate(fragments: Vec<BuildRecord>) -> Option<BuildRecord> {
    let mut fragments = fragments.into_iter();
    let mut base = fragments.next()?;
    for fragment in fragments {
        append(&mut base, fragment);
    }
    debug!(
        build = %base.name,
        number = %base.number,
        modules = base.modules.len(),
        "fragments consolidated"
    );
    Some(base)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::types::ProvenancePath;

    #[test]
    fn accumulator_dedups_artifacts_by_name() {
        let mut acc = ModuleAccumulator::new("m1");
        acc.artifact(Artifact::new("a.jar"));
        acc.artifact(Artifact {
            md5: Some("later".to_owned()),
            ..Artifact::new("a.jar")
        });
        acc.artifact(Artifact::new("b.jar"));

        let module = acc.finish();
        assert_eq!(module.artifacts.len(), 2);
        assert_eq!(module.artifacts[0].md5, None, "first observation wins");
    }

    #[test]
    fn accumulator_merges_dependency_observations() {
        let mut acc = ModuleAccumulator::new("m1");
        let mut first = Dependency::with_scope("d1", "compile");
        first.add_requested_by(ProvenancePath::from(vec!["m1"]));
        acc.dependency(first);

        let mut second = Dependency::with_scope("d1", "test");
        second.add_requested_by(ProvenancePath::from(vec!["m1"]));
        acc.dependency(second);

        let module = acc.finish();
        assert_eq!(module.dependencies.len(), 1);
        let dep = &module.dependencies[0];
        assert_eq!(dep.scopes.len(), 2);
        assert_eq!(dep.requested_by.len(), 2, "paths accumulate as a bag");
    }

    #[test]
    fn pool_dedups_and_sorts() {
        let pool = ResolvedArtifactPool::new();
        assert!(pool.insert(Artifact::new("b.jar")));
        assert!(pool.insert(Artifact::new("a.jar")));
        assert!(!pool.insert(Artifact::new("a.jar")));
        assert_eq!(pool.len(), 2);

        let artifacts = pool.into_artifacts();
        let names: Vec<_> = artifacts.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, ["a.jar", "b.jar"]);
    }

    #[test]
    fn pool_accepts_concurrent_writers() {
        use std::sync::Arc;

        let pool = Arc::new(ResolvedArtifactPool::new());
        let handles: Vec<_> = (0..8)
            .map(|worker| {
                let pool = Arc::clone(&pool);
                std::thread::spawn(move || {
                    for n in 0..50 {
                        pool.insert(Artifact::new(format!("w{worker}-{n}.jar")));
                        // Every worker also reports this shared artifact.
                        pool.insert(Artifact::new("shared.jar"));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().expect("worker panicked");
        }

        let pool = Arc::into_inner(pool).expect("all workers joined");
        assert_eq!(pool.into_artifacts().len(), 8 * 50 + 1);
    }

    #[test]
    fn consolidate_empty_input() {
        assert!(consolidate(Vec::new()).is_none());
    }

    #[test]
    fn consolidate_folds_in_order() {
        let mut first = BuildRecord::new("app", "1");
        first.properties.insert("jdk".to_owned(), "17".to_owned());
        let mut second = BuildRecord::new("app", "1");
        second.properties.insert("jdk".to_owned(), "21".to_owned());
        second.modules.push(Module::new("m1"));
        let mut third = BuildRecord::new("app", "1");
        third.modules.push(Module::new("m2"));

        let record = consolidate(vec![first, second, third]).expect("non-empty input");
        assert_eq!(record.properties.get("jdk").map(String::as_str), Some("21"));
        assert_eq!(record.modules.len(), 2);
    }

    #[test]
    fn consolidate_single_fragment_is_identity() {
        let mut only = BuildRecord::new("app", "1");
        only.modules.push(Module::new("m1"));
        let record = consolidate(vec![only.clone()]).expect("non-empty input");
        assert_eq!(record, only);
    }
}
