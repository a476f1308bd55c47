use serde::{Deserialize, Serialize};

use super::point::Point3d;
use super::vector::Vec3;

/// An infinite line through `origin` along `direction`.
///
/// The direction is kept as given (not normalized) so a fitted direction can be
/// evaluated for any scale; distance queries divide by its length.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Line3d {
    pub origin: Point3d,
    pub direction: Vec3,
}

impl Line3d {
    pub fn new(origin: Point3d, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    pub fn is_degenerate(&self) -> bool {
        self.direction.is_zero()
    }

    /// Squared perpendicular distance from `p` to the line.
    ///
    /// NaN when the direction is the zero vector.
    pub fn squared_distance_to(&self, p: &Point3d) -> f64 {
        let w = *p - self.origin;
        let c = w.cross(&self.direction);
        c.length_squared() / self.direction.length_squared()
    }

    pub fn distance_to_point(&self, p: &Point3d) -> f64 {
        self.squared_distance_to(p).sqrt()
    }
}

/// A half-infinite ray starting at `origin`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ray3d {
    pub origin: Point3d,
    pub direction: Vec3,
}

impl Ray3d {
    pub fn new(origin: Point3d, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    pub fn at(&self, t: f64) -> Point3d {
        self.origin + self.direction * t
    }
}

/// A bounded segment from `source` to `target`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment3d {
    pub source: Point3d,
    pub target: Point3d,
}

impl Segment3d {
    pub fn new(source: Point3d, target: Point3d) -> Self {
        Self { source, target }
    }

    pub fn direction(&self) -> Vec3 {
        self.target - self.source
    }

    pub fn is_degenerate(&self) -> bool {
        self.source == self.target
    }

    pub fn at(&self, s: f64) -> Point3d {
        self.source.lerp(&self.target, s)
    }

    /// Chain consecutive points into segments. A closed ring yields a closed chain.
    pub fn chain(points: &[Point3d]) -> Vec<Segment3d> {
        points
            .windows(2)
            .map(|w| Segment3d::new(w[0], w[1]))
            .collect()
    }
}
