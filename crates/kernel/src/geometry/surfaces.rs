use serde::{Deserialize, Serialize};

use super::point::Point3d;
use super::vector::Vec3;

/// An infinite plane through `origin` with (unnormalized) `normal`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Plane {
    pub origin: Point3d,
    pub normal: Vec3,
}

impl Plane {
    pub fn new(origin: Point3d, normal: Vec3) -> Self {
        Self { origin, normal }
    }

    pub fn is_degenerate(&self) -> bool {
        self.normal.is_zero()
    }

    /// `normal · (p - origin)`; its sign tells the side of `p`.
    pub fn side_value(&self, p: &Point3d) -> f64 {
        (*p - self.origin).dot(&self.normal)
    }

    /// Signed Euclidean distance from the plane.
    pub fn signed_distance(&self, p: &Point3d) -> f64 {
        self.side_value(p) / self.normal.length()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signed_distance_uses_unit_normal() {
        let plane = Plane::new(Point3d::new(0.0, 0.0, 2.0), Vec3::new(0.0, 0.0, 4.0));
        assert!((plane.signed_distance(&Point3d::new(3.0, 3.0, 5.0)) - 3.0).abs() < 1e-12);
        assert!((plane.signed_distance(&Point3d::new(3.0, 3.0, 0.0)) + 2.0).abs() < 1e-12);
    }
}
