//! Integration tests for dependency provenance: resolution tree in,
//! requested-by paths attached to module dependencies out.

mod common;

use buildfold::merge::module::attach_requested_by;
use buildfold::merge::provenance::{DependencyNode, build_provenance_map};
use buildfold::ProvenancePath;
use common::{dependency, module};

#[test]
fn diamond_dependency_keeps_both_paths() {
    // root -> a -> c and root -> b -> c
    let root = DependencyNode::new("root")
        .child(DependencyNode::new("a").child(DependencyNode::new("c")))
        .child(DependencyNode::new("b").child(DependencyNode::new("c")));

    let map = build_provenance_map(Some(&root));
    let paths: Vec<_> = map["c"].iter().map(|p| p.identities().to_vec()).collect();
    assert_eq!(paths, [["a", "root"], ["b", "root"]]);
}

#[test]
fn resolution_pass_attaches_paths_to_module_dependencies() {
    // The build tool resolved this tree for module app:core:
    //   app:core -> org.dep:x:1 -> org.dep:y:2
    //   app:core -> org.junit:junit:5
    let root = DependencyNode::new("app:core")
        .child(
            DependencyNode::new("org.dep:x:1").child(DependencyNode::new("org.dep:y:2")),
        )
        .child(DependencyNode::new("org.junit:junit:5"));
    let provenance = build_provenance_map(Some(&root));

    let mut m = module(
        "app:core",
        vec![],
        vec![
            dependency("org.dep:x:1", "compile"),
            dependency("org.dep:y:2", "compile"),
            dependency("org.junit:junit:5", "test"),
        ],
    );
    attach_requested_by(&mut m, &provenance);

    let direct = m.dependency("org.dep:x:1").unwrap();
    assert_eq!(direct.requested_by, [ProvenancePath::from(vec!["app:core"])]);

    let transitive = m.dependency("org.dep:y:2").unwrap();
    assert_eq!(
        transitive.requested_by,
        [ProvenancePath::from(vec!["org.dep:x:1", "app:core"])]
    );
}

#[test]
fn second_resolution_pass_appends_without_deduplication() {
    let root = DependencyNode::new("app:core").child(DependencyNode::new("org.dep:x:1"));
    let provenance = build_provenance_map(Some(&root));

    let mut m = module("app:core", vec![], vec![dependency("org.dep:x:1", "compile")]);
    attach_requested_by(&mut m, &provenance);
    attach_requested_by(&mut m, &provenance);

    // Paths are write-once-append: the second pass adds a duplicate rather
    // than replacing or deduplicating.
    assert_eq!(m.dependency("org.dep:x:1").unwrap().requested_by.len(), 2);
}

#[test]
fn deep_paths_render_nearest_parent_first() {
    let root = DependencyNode::new("app:core").child(
        DependencyNode::new("a").child(DependencyNode::new("b").child(DependencyNode::new("c"))),
    );
    let map = build_provenance_map(Some(&root));
    assert_eq!(format!("{}", map["c"][0]), "b <- a <- app:core");
}

#[test]
fn provenance_survives_record_serialization() {
    let root = DependencyNode::new("m1").child(DependencyNode::new("d1"));
    let provenance = build_provenance_map(Some(&root));

    let mut m = module("m1", vec![], vec![dependency("d1", "compile")]);
    attach_requested_by(&mut m, &provenance);

    let json = serde_json::to_value(&m).unwrap();
    assert_eq!(json["dependencies"][0]["requestedBy"], serde_json::json!([["m1"]]));
}
