//! Third pass: cut the surface soup with each node's normal plane.

use std::f64::consts::PI;

use serde::Serialize;
use tracing::debug;

use section_kernel::{convex_hull, plane_segment_intersection, signed_area, Plane, Point2d, Point3d, Vec3};

use crate::collect::NodeSample;
use crate::config::ReconstructConfig;
use crate::error::{Degeneracies, DegeneracyKind};
use crate::surface::{CentroidNormal, SurfaceModel};

/// The record closest to `position`; the earliest record wins a tie.
pub fn nearest_normal<'a>(normals: &'a [CentroidNormal], position: &Point3d) -> Option<&'a CentroidNormal> {
    let mut best: Option<(&CentroidNormal, f64)> = None;
    for record in normals {
        let d = record.position.distance_squared_to(position);
        match best {
            Some((_, best_d)) if d >= best_d => {}
            _ => best = Some((record, d)),
        }
    }
    best.map(|(record, _)| record)
}

/// Absolute direction cosines of a normal against the z, y and x axes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AxisCosines {
    /// Against z: how well the normal faces the XY plane.
    pub xy: f64,
    /// Against y.
    pub xz: f64,
    /// Against x.
    pub yz: f64,
}

impl AxisCosines {
    /// All zero for a zero-length or non-finite normal.
    pub fn of(normal: &Vec3) -> Self {
        let len = normal.length();
        if !len.is_finite() || len == 0.0 {
            return Self {
                xy: 0.0,
                xz: 0.0,
                yz: 0.0,
            };
        }
        Self {
            xy: normal.z.abs() / len,
            xz: normal.y.abs() / len,
            yz: normal.x.abs() / len,
        }
    }

    pub fn is_degenerate(&self) -> bool {
        self.xy == 0.0 && self.xz == 0.0 && self.yz == 0.0
    }

    /// The projection plane facing the normal most directly, with its cosine.
    /// Ties resolve XY, then XZ, then YZ.
    pub fn dominant(&self) -> (ProjectionPlane, f64) {
        if self.xy >= self.xz && self.xy >= self.yz {
            (ProjectionPlane::Xy, self.xy)
        } else if self.xz >= self.yz {
            (ProjectionPlane::Xz, self.xz)
        } else {
            (ProjectionPlane::Yz, self.yz)
        }
    }
}

/// Principal plane used to flatten the cut before taking its hull.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ProjectionPlane {
    Xy,
    Xz,
    Yz,
}

impl ProjectionPlane {
    pub fn project(self, p: &Point3d) -> Point2d {
        match self {
            ProjectionPlane::Xy => Point2d::new(p.x, p.y),
            ProjectionPlane::Xz => Point2d::new(p.x, p.z),
            ProjectionPlane::Yz => Point2d::new(p.y, p.z),
        }
    }
}

/// Outcome of cutting the surface at one node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrossSection {
    /// Equivalent-circle radius in calibrated units, truncated.
    pub radius: u64,
    /// Corrected cross-section area in pixels².
    pub area: f64,
    /// `None` when no usable normal was found.
    pub plane: Option<ProjectionPlane>,
    /// Plane hits that survived the distance filter.
    pub points: Vec<Point3d>,
}

impl CrossSection {
    fn zero() -> Self {
        Self {
            radius: 0,
            area: 0.0,
            plane: None,
            points: Vec::new(),
        }
    }
}

/// Intersect the plane through `sample` with every soup segment and size the hull of the cut.
pub fn extract_cross_section(
    sample: &NodeSample,
    model: &SurfaceModel,
    pixel_width: f64,
    config: &ReconstructConfig,
    degeneracies: &mut Degeneracies,
) -> CrossSection {
    let Some(record) = nearest_normal(&model.normals, &sample.position) else {
        degeneracies.record(&sample.oid, DegeneracyKind::ZeroNormal, "no fitted normal in tree");
        return CrossSection::zero();
    };
    let cosines = AxisCosines::of(&record.normal);
    if cosines.is_degenerate() {
        degeneracies.record(&sample.oid, DegeneracyKind::ZeroNormal, "nearest normal has zero length");
        return CrossSection::zero();
    }

    let plane = Plane::new(sample.position, record.normal);
    let hits: Vec<Point3d> = model
        .segments
        .iter()
        .filter_map(|seg| plane_segment_intersection(&plane, seg, &config.tolerance).point())
        .collect();
    if hits.is_empty() {
        degeneracies.record(
            &sample.oid,
            DegeneracyKind::NoPlaneHit,
            "no segment crosses the cutting plane",
        );
    }

    let limit = config.distance_filter_factor * sample.flat_radius;
    let points: Vec<Point3d> = hits
        .into_iter()
        .filter(|p| p.distance_squared_to(&sample.position) <= limit)
        .collect();

    let (axis, cosine) = cosines.dominant();
    let projected: Vec<Point2d> = points.iter().map(|p| axis.project(p)).collect();
    let area = signed_area(&convex_hull(&projected)).abs() / cosine;
    let radius = equivalent_radius(area, pixel_width);

    debug!(oid = %sample.oid, kept = points.len(), ?axis, area, radius, "cross-section");

    CrossSection {
        radius,
        area,
        plane: Some(axis),
        points,
    }
}

/// `floor(sqrt(area / π) * pixel_width)`; non-finite or negative input yields 0.
pub fn equivalent_radius(area: f64, pixel_width: f64) -> u64 {
    let r = (area / PI).sqrt() * pixel_width;
    if r.is_finite() && r > 0.0 { r.floor() as u64 } else { 0 }
}
