//! Shared helpers for integration tests: terse constructors for build
//! fragments.

#![allow(dead_code)]

use buildfold::{Artifact, BuildRecord, Dependency, Module};

pub fn fragment(name: &str, number: &str) -> BuildRecord {
    BuildRecord::new(name, number)
}

pub fn module(id: &str, artifacts: Vec<Artifact>, dependencies: Vec<Dependency>) -> Module {
    Module {
        artifacts,
        dependencies,
        ..Module::new(id)
    }
}

pub fn artifact(name: &str) -> Artifact {
    Artifact::new(name)
}

pub fn checksummed_artifact(name: &str, md5: &str) -> Artifact {
    Artifact {
        md5: Some(md5.to_owned()),
        ..Artifact::new(name)
    }
}

pub fn dependency(id: &str, scope: &str) -> Dependency {
    Dependency::with_scope(id, scope)
}
