//! Per-tree and per-document orchestration of the three passes.

use std::fmt;

use serde::Serialize;
use slotmap::SecondaryMap;
use tracing::{info, instrument};

use section_tree::{AreaTree, Document, LayerTable, NodeId};

use crate::collect::collect_node_samples;
use crate::config::ReconstructConfig;
use crate::error::{Degeneracies, Degeneracy, DegeneracyKind, ReconstructError};
use crate::extract::extract_cross_section;
use crate::surface::build_surface;

/// What happened while reconstructing one area tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubtreeReport {
    pub oid: String,
    pub node_count: usize,
    pub segment_count: usize,
    pub normal_count: usize,
    /// Cross-section radius per node oid, in document order.
    pub radii: Vec<(String, u64)>,
    pub degeneracies: Vec<Degeneracy>,
}

impl SubtreeReport {
    pub fn radius_of(&self, oid: &str) -> Option<u64> {
        self.radii.iter().find(|(o, _)| o == oid).map(|&(_, r)| r)
    }

    pub fn count(&self, kind: DegeneracyKind) -> usize {
        self.degeneracies.iter().filter(|d| d.kind == kind).count()
    }
}

/// Run all three passes over one tree and write the radii back onto its nodes.
///
/// A missing layer fails before the tree is modified.
#[instrument(skip_all, fields(tree = %tree.oid))]
pub fn reconstruct_tree(
    tree: &mut AreaTree,
    layers: &LayerTable,
    pixel_width: f64,
    config: &ReconstructConfig,
) -> Result<SubtreeReport, ReconstructError> {
    info!(nodes = tree.len(), "processing");
    let mut degeneracies = Degeneracies::new();

    let samples = collect_node_samples(tree, layers, pixel_width, &mut degeneracies)?;
    let model = build_surface(tree, layers, config, &mut degeneracies)?;

    let mut radii: SecondaryMap<NodeId, u64> = SecondaryMap::new();
    if model.is_empty() {
        degeneracies.record(&tree.oid, DegeneracyKind::EmptySurface, "no surface");
    } else {
        for sample in &samples {
            let section = extract_cross_section(sample, &model, pixel_width, config, &mut degeneracies);
            radii.insert(sample.id, section.radius);
        }
    }

    let radii = write_back(tree, &radii);
    info!(
        segments = model.segments.len(),
        warnings = degeneracies.len(),
        "done"
    );

    Ok(SubtreeReport {
        oid: tree.oid.clone(),
        node_count: tree.len(),
        segment_count: model.segments.len(),
        normal_count: model.normals.len(),
        radii,
        degeneracies: degeneracies.into_vec(),
    })
}

/// Store each node's radius (0 when none was computed), returning them in document order.
fn write_back(tree: &mut AreaTree, radii: &SecondaryMap<NodeId, u64>) -> Vec<(String, u64)> {
    tree.preorder()
        .into_iter()
        .map(|id| {
            let radius = radii.get(id).copied().unwrap_or(0);
            let node = &mut tree.nodes[id];
            node.cross_radius = Some(radius);
            (node.oid.clone(), radius)
        })
        .collect()
}

/// The result for one area tree of a document.
#[derive(Debug, Clone, PartialEq)]
pub struct SubtreeOutcome {
    pub oid: String,
    pub result: Result<SubtreeReport, ReconstructError>,
}

/// Per-tree outcomes in document order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentReport {
    pub subtrees: Vec<SubtreeOutcome>,
}

impl DocumentReport {
    pub fn completed(&self) -> impl Iterator<Item = &SubtreeReport> {
        self.subtrees.iter().filter_map(|s| s.result.as_ref().ok())
    }

    pub fn failed(&self) -> impl Iterator<Item = (&str, &ReconstructError)> {
        self.subtrees
            .iter()
            .filter_map(|s| s.result.as_ref().err().map(|e| (s.oid.as_str(), e)))
    }

    pub fn subtree(&self, oid: &str) -> Option<&SubtreeOutcome> {
        self.subtrees.iter().find(|s| s.oid == oid)
    }
}

impl fmt::Display for DocumentReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for outcome in &self.subtrees {
            match &outcome.result {
                Ok(report) => writeln!(
                    f,
                    "{}: {} nodes, {} segments, {} warnings",
                    report.oid,
                    report.node_count,
                    report.segment_count,
                    report.degeneracies.len()
                )?,
                Err(err) => writeln!(f, "{}: failed: {err}", outcome.oid)?,
            }
        }
        Ok(())
    }
}

/// Reconstruct every area tree of `doc`.
///
/// Calibration and configuration problems abort the whole run. A data error
/// inside one tree is reported in that tree's outcome and leaves it unmodified.
#[instrument(skip_all, fields(trees = doc.trees.len()))]
pub fn reconstruct_document(
    doc: &mut Document,
    config: &ReconstructConfig,
) -> Result<DocumentReport, ReconstructError> {
    config.validate()?;
    let pixel_width = doc.pixel_width()?;
    let layers = &doc.layers;

    let run = |tree: &mut AreaTree| SubtreeOutcome {
        oid: tree.oid.clone(),
        result: reconstruct_tree(tree, layers, pixel_width, config),
    };

    #[cfg(feature = "parallel")]
    let subtrees: Vec<SubtreeOutcome> = {
        use rayon::prelude::*;
        doc.trees.par_iter_mut().map(run).collect()
    };
    #[cfg(not(feature = "parallel"))]
    let subtrees: Vec<SubtreeOutcome> = doc.trees.iter_mut().map(run).collect();

    let report = DocumentReport { subtrees };
    info!(
        completed = report.completed().count(),
        failed = report.failed().count(),
        "document done"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use section_tree::{Calibration, Contour, Node, TreeError};

    fn square(side: f64) -> Contour {
        Contour::from_coords(&[(0.0, 0.0), (side, 0.0), (side, side), (0.0, side)])
    }

    fn two_section_tree(oid: &str, lid: &str) -> AreaTree {
        let mut tree = AreaTree::new(oid);
        let root = tree.add_root(Node::new(format!("{oid}.a"), "L0", 5.0, 5.0).with_contour(square(10.0)));
        tree.add_child(root, Node::new(format!("{oid}.b"), lid, 5.0, 5.0).with_contour(square(10.0)))
            .unwrap();
        tree
    }

    fn document() -> Document {
        Document::new([("L0", 0.0), ("L1", 1.0)].into_iter().collect(), Calibration::new(1.0))
    }

    #[test]
    fn test_tree_radii_written_back() {
        let mut tree = two_section_tree("1", "L1");
        let report =
            reconstruct_tree(&mut tree, &document().layers, 1.0, &ReconstructConfig::default()).unwrap();

        assert_eq!(report.node_count, 2);
        assert_eq!(report.normal_count, 2);
        assert_eq!(report.radius_of("1.a"), Some(5));
        assert_eq!(report.radius_of("1.b"), Some(5));
        for id in tree.preorder() {
            assert_eq!(tree.nodes[id].cross_radius_attr().as_deref(), Some("5"));
        }
    }

    #[test]
    fn test_empty_surface_gives_zero_everywhere() {
        let mut tree = AreaTree::new("2");
        let root = tree.add_root(Node::new("2.a", "L0", 1.0, 1.0));
        tree.add_child(root, Node::new("2.b", "L1", 1.0, 1.0)).unwrap();

        let report =
            reconstruct_tree(&mut tree, &document().layers, 1.0, &ReconstructConfig::default()).unwrap();

        assert_eq!(report.segment_count, 0);
        assert_eq!(report.count(DegeneracyKind::EmptySurface), 1);
        assert_eq!(report.radii, vec![("2.a".to_string(), 0), ("2.b".to_string(), 0)]);
        assert!(tree.nodes.values().all(|n| n.cross_radius == Some(0)));
    }

    #[test]
    fn test_bad_layer_fails_only_its_tree() {
        let mut doc = document();
        doc.trees.push(two_section_tree("1", "L1"));
        doc.trees.push(two_section_tree("2", "missing"));
        doc.trees.push(two_section_tree("3", "L1"));

        let report = reconstruct_document(&mut doc, &ReconstructConfig::default()).unwrap();

        assert_eq!(report.completed().count(), 2);
        let failed: Vec<_> = report.failed().collect();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].0, "2");
        assert!(matches!(
            failed[0].1,
            ReconstructError::Tree(TreeError::MissingLayer { .. })
        ));
        assert!(doc.trees[1].nodes.values().all(|n| n.cross_radius.is_none()));
        assert!(doc.trees[2].nodes.values().all(|n| n.cross_radius == Some(5)));

        let order: Vec<&str> = report.subtrees.iter().map(|s| s.oid.as_str()).collect();
        assert_eq!(order, ["1", "2", "3"]);
    }

    #[test]
    fn test_missing_calibration_is_fatal() {
        let mut doc = document();
        doc.calibration = None;
        doc.trees.push(two_section_tree("1", "L1"));

        let err = reconstruct_document(&mut doc, &ReconstructConfig::default()).unwrap_err();
        assert_eq!(err, ReconstructError::Tree(TreeError::MissingCalibration));
        assert!(doc.trees[0].nodes.values().all(|n| n.cross_radius.is_none()));
    }

    #[test]
    fn test_report_display() {
        let mut doc = document();
        doc.trees.push(two_section_tree("1", "L1"));
        doc.trees.push(two_section_tree("2", "missing"));
        let report = reconstruct_document(&mut doc, &ReconstructConfig::default()).unwrap();

        let text = report.to_string();
        assert!(text.starts_with("1: 2 nodes, 16 segments, 0 warnings\n"));
        assert!(text.contains("2: failed: "));
    }
}
