//! DocumentBuilder behaviour and document-level contracts.

use cross_section::{ReconstructConfig, ReconstructError};
use section_tree::{Document, TreeError};
use test_harness::helpers::*;
use test_harness::{DocumentBuilder, HarnessError};

fn small_document() -> DocumentBuilder {
    let mut b = DocumentBuilder::new(1.0);
    b.layer_stack(2, 1.0);
    b.tree("1").unwrap();
    b.root("1", "a", "L0", 5.0, 5.0).unwrap();
    b.contour("a", square_contour(5.0, 5.0, 10.0)).unwrap();
    b.child("a", "b", "L1", 5.0, 5.0).unwrap();
    b.contour("b", square_contour(5.0, 5.0, 10.0)).unwrap();
    b
}

#[test]
fn test_duplicate_names_rejected() {
    let mut b = small_document();
    assert!(matches!(
        b.root("1", "a", "L0", 0.0, 0.0),
        Err(HarnessError::DuplicateName { .. })
    ));
    assert!(matches!(b.tree("1"), Err(HarnessError::DuplicateName { .. })));
}

#[test]
fn test_unknown_references_rejected() {
    let mut b = small_document();
    assert!(matches!(
        b.child("nope", "c", "L1", 0.0, 0.0),
        Err(HarnessError::NodeNotFound { .. })
    ));
    assert!(matches!(
        b.root("missing-tree", "c", "L0", 0.0, 0.0),
        Err(HarnessError::TreeNotFound { .. })
    ));
    assert!(b.radius("nope").is_err());
}

#[test]
fn test_missing_calibration_is_fatal() {
    let mut b = small_document();
    b.doc.calibration = None;
    let err = b.run().unwrap_err();
    assert!(matches!(
        err,
        HarnessError::Reconstruct(ReconstructError::Tree(TreeError::MissingCalibration))
    ));
    assert_eq!(b.radius("a").unwrap(), None);
    assert!(b.last_report().is_none());
}

#[test]
fn test_invalid_config_is_fatal() {
    let mut b = small_document().with_config(ReconstructConfig {
        distance_filter_factor: f64::NAN,
        ..ReconstructConfig::default()
    });
    assert!(matches!(
        b.run(),
        Err(HarnessError::Reconstruct(ReconstructError::Config(_)))
    ));
}

#[test]
fn test_json_document_round_trip_reconstructs_identically() {
    let mut direct = small_document();
    let json = direct.doc.to_json().unwrap();
    direct.run().unwrap();

    let mut reloaded = DocumentBuilder::from_document(Document::from_json(&json).unwrap()).unwrap();
    reloaded.run().unwrap();

    assert_eq!(reloaded.radii("1").unwrap(), direct.radii("1").unwrap());
    assert_eq!(reloaded.radius("a").unwrap(), Some(5));

    // Written-back attributes survive serialization.
    let back = Document::from_json(&reloaded.doc.to_json().unwrap()).unwrap();
    let tree = back.tree("1").unwrap();
    assert!(tree.nodes.values().all(|n| n.cross_radius == Some(5)));
}

#[test]
fn test_config_from_json_drives_filter() {
    let config = ReconstructConfig::from_json(r#"{ "distance_filter_factor": 0.0 }"#).unwrap();
    let mut b = small_document().with_config(config);
    b.run().unwrap();
    // Every crossing lies farther than a zero bound.
    assert_eq!(b.radius("a").unwrap(), Some(0));
}

#[test]
fn test_report_serializes() {
    let mut b = small_document();
    let report = b.run().unwrap();
    let tree = report.completed().next().unwrap();
    let value = serde_json::to_value(tree).unwrap();
    assert_eq!(value["oid"], "1");
    assert_eq!(value["node_count"], 2);
    assert_eq!(value["radii"][0][0], "a");
    assert_eq!(value["radii"][0][1], 5);
}

#[test]
fn test_report_display_lists_each_tree() {
    let mut b = small_document();
    b.tree("2").unwrap();
    b.root("2", "z", "L0", 0.0, 0.0).unwrap();
    let text = b.run().unwrap().to_string();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("1: 2 nodes"));
    assert!(lines[1].starts_with("2: 1 nodes, 0 segments"));
}

#[test]
fn test_duplicate_oids_in_loaded_document_rejected() {
    let mut b = small_document();
    b.tree("2").unwrap();
    let mut doc = b.doc.clone();
    doc.trees[1].add_root(section_tree::Node::new("a", "L0", 0.0, 0.0));
    assert!(matches!(
        DocumentBuilder::from_document(doc),
        Err(HarnessError::DuplicateName { .. })
    ));
}
