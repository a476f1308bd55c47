pub mod geometry;

pub use geometry::curves::{Line3d, Ray3d, Segment3d};
pub use geometry::hull::{convex_hull, convex_hull_area, signed_area};
pub use geometry::intersection::{plane_segment_intersection, ray_segment_intersection, Intersection};
pub use geometry::point::{Point2d, Point3d};
pub use geometry::surfaces::Plane;
pub use geometry::vector::Vec3;

use serde::{Deserialize, Serialize};

/// Tolerance configuration for geometric predicates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tolerance {
    /// Distances below this are treated as zero (same units as the input coordinates).
    pub coincidence: f64,
    /// Slack applied to segment/ray parameters when testing for containment.
    pub parametric: f64,
}

impl Default for Tolerance {
    fn default() -> Self {
        Self {
            coincidence: 1e-9,
            parametric: 1e-12,
        }
    }
}

impl Tolerance {
    pub fn is_zero_distance(&self, distance: f64) -> bool {
        distance.abs() <= self.coincidence
    }

    /// True if `t` lies in `[lo, hi]` widened by the parametric slack.
    pub fn param_in_range(&self, t: f64, lo: f64, hi: f64) -> bool {
        t >= lo - self.parametric && t <= hi + self.parametric
    }
}
