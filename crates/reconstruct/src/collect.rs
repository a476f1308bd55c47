//! First pass: merge contours node by node and remember where each node was traced.

use tracing::debug;

use section_kernel::Point3d;
use section_tree::{AreaTree, LayerTable, NodeId};

use crate::contour::merge_contours;
use crate::error::{Degeneracies, DegeneracyKind, ReconstructError};

/// A node as it was before the merge pass rewrote its coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeSample {
    pub id: NodeId,
    pub oid: String,
    /// Traced x/y with the layer depth as z.
    pub position: Point3d,
    /// Squared bounding-box diagonal of the merged contour, in pixels².
    pub flat_radius: f64,
}

/// Merge every node's contours in document order and rewrite the tree in place.
///
/// Each node's x/y become the merged centroid, its contours become the single
/// merged ring (or nothing), and `flat_radius` is set in calibrated units.
/// Layer references are checked up front, so a missing layer leaves the tree
/// untouched.
pub fn collect_node_samples(
    tree: &mut AreaTree,
    layers: &LayerTable,
    pixel_width: f64,
    degeneracies: &mut Degeneracies,
) -> Result<Vec<NodeSample>, ReconstructError> {
    tree.validate_layers(layers)?;

    let order = tree.preorder();
    let mut samples = Vec::with_capacity(order.len());

    for id in order {
        let node = &mut tree.nodes[id];
        let depth = layers.depth_of(node)?;
        let merged = merge_contours(&node.contours, node.planar());

        if merged.is_empty() {
            degeneracies.record(
                &node.oid,
                DegeneracyKind::NoContour,
                format!("no contour contains ({}, {})", node.x, node.y),
            );
        }
        debug!(
            oid = %node.oid,
            raw = node.contours.len(),
            flat_radius = merged.flat_radius,
            "merged contours"
        );

        samples.push(NodeSample {
            id,
            oid: node.oid.clone(),
            position: Point3d::new(node.x, node.y, depth),
            flat_radius: merged.flat_radius,
        });

        node.x = merged.centroid.x;
        node.y = merged.centroid.y;
        node.flat_radius = Some(merged.real_flat_radius * pixel_width);
        node.contours = merged.boundary.into_iter().collect();
    }

    Ok(samples)
}
