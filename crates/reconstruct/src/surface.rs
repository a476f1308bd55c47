//! Second pass: stitch merged contours into a segment soup and fit local normals.
//!
//! Each node contributes its merged outline as a closed chain of segments at
//! its layer depth. Outline vertices are joined to the nearest contributing
//! ancestor's outline by casting rays from the ancestor centroid, so a plane
//! cutting between two sections crosses the connectors. Nodes without an
//! outline are transparent: their children connect to the ancestor above them.

use tracing::debug;

use section_kernel::{ray_segment_intersection, Intersection, Point3d, Ray3d, Segment3d, Vec3};
use section_tree::{AreaTree, LayerTable, NodeId};

use crate::config::ReconstructConfig;
use crate::error::{Degeneracies, DegeneracyKind, ReconstructError};
use crate::normal::fit_normal;

/// A node's merged centroid paired with its fitted axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CentroidNormal {
    pub position: Point3d,
    pub normal: Vec3,
}

/// The nearest ancestor outline visible to a node.
#[derive(Debug, Clone, Copy, PartialEq)]
enum AncestorSurface {
    None,
    /// Centroid plus the `start..end` slice of the soup holding the ancestor's outline.
    Surface {
        centroid: Point3d,
        start: usize,
        end: usize,
    },
}

/// Everything the extractor needs for one area tree.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SurfaceModel {
    pub segments: Vec<Segment3d>,
    pub normals: Vec<CentroidNormal>,
}

impl SurfaceModel {
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

/// Walk the merged tree parent-first and build its surface soup.
///
/// Must run after [`collect_node_samples`](crate::collect::collect_node_samples):
/// node coordinates and contours are read in their merged form.
pub fn build_surface(
    tree: &AreaTree,
    layers: &LayerTable,
    config: &ReconstructConfig,
    degeneracies: &mut Degeneracies,
) -> Result<SurfaceModel, ReconstructError> {
    let mut model = SurfaceModel::default();
    let mut stack: Vec<(NodeId, AncestorSurface)> = tree
        .roots
        .iter()
        .rev()
        .map(|&id| (id, AncestorSurface::None))
        .collect();

    while let Some((id, ancestor)) = stack.pop() {
        let Some(node) = tree.get(id) else {
            continue;
        };
        let depth = layers.depth_of(node)?;
        let position = Point3d::new(node.x, node.y, depth);

        let mut points = vec![position];
        if let Some(parent) = node.parent.and_then(|p| tree.get(p)) {
            points.push(Point3d::new(parent.x, parent.y, layers.depth_of(parent)?));
        }
        for child in node.children.iter().filter_map(|&c| tree.get(c)) {
            points.push(Point3d::new(child.x, child.y, layers.depth_of(child)?));
        }

        let Some(normal) = fit_normal(&points, &config.solver) else {
            degeneracies.record(
                &node.oid,
                DegeneracyKind::NoNormal,
                "isolated node, branch skipped",
            );
            continue;
        };
        debug!(oid = %node.oid, ?normal, "fitted normal");
        model.normals.push(CentroidNormal { position, normal });

        let ring: Vec<Point3d> = node
            .contours
            .first()
            .map(|c| {
                c.closed_ring()
                    .into_iter()
                    .map(|p| Point3d::from_planar(p, depth))
                    .collect()
            })
            .unwrap_or_default();

        if let AncestorSurface::Surface { centroid, start, end } = ancestor {
            let vertex_count = ring.len().saturating_sub(1);
            for &vertex in &ring[..vertex_count] {
                let hits = connectors(
                    centroid,
                    &model.segments[start..end],
                    vertex,
                    position,
                    config,
                );
                if hits.is_empty() {
                    degeneracies.record(
                        &node.oid,
                        DegeneracyKind::NoRayHit,
                        format!(
                            "ray through ({}, {}, {}) missed the ancestor contour",
                            vertex.x, vertex.y, vertex.z
                        ),
                    );
                }
                model.segments.extend(hits);
            }
        }

        let inherited = if ring.is_empty() {
            ancestor
        } else {
            let start = model.segments.len();
            model.segments.extend(Segment3d::chain(&ring));
            AncestorSurface::Surface {
                centroid: position,
                start,
                end: model.segments.len(),
            }
        };

        stack.extend(node.children.iter().rev().map(|&c| (c, inherited)));
    }

    debug!(
        tree = %tree.oid,
        segments = model.segments.len(),
        normals = model.normals.len(),
        "surface built"
    );
    Ok(model)
}

/// Segments joining `vertex` to every point where a ray from the ancestor
/// centroid, parallel to `vertex - position`, meets the ancestor outline.
fn connectors(
    ancestor_centroid: Point3d,
    ancestor_outline: &[Segment3d],
    vertex: Point3d,
    position: Point3d,
    config: &ReconstructConfig,
) -> Vec<Segment3d> {
    let ray = Ray3d::new(ancestor_centroid, vertex - position);
    ancestor_outline
        .iter()
        .filter_map(|seg| match ray_segment_intersection(&ray, seg, &config.tolerance) {
            Intersection::Point(hit) => Some(Segment3d::new(vertex, hit)),
            _ => None,
        })
        .collect()
}
