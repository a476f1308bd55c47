//! 2-D convex hull and polygon area.

use geo::{ConvexHull, MultiPoint};

use super::point::Point2d;

/// Convex hull of a planar point set as a closed counter-clockwise ring.
///
/// Fewer than three points are returned unchanged (no closing vertex).
pub fn convex_hull(points: &[Point2d]) -> Vec<Point2d> {
    if points.len() < 3 {
        return points.to_vec();
    }
    let cloud = MultiPoint::new(points.iter().map(|p| geo::Point::from(*p)).collect());
    cloud
        .convex_hull()
        .exterior()
        .coords()
        .map(|c| Point2d::from(*c))
        .collect()
}

/// Shoelace signed area of a ring (positive for counter-clockwise).
///
/// The ring may be open or closed; the closing edge is implied.
pub fn signed_area(ring: &[Point2d]) -> f64 {
    if ring.len() < 3 {
        return 0.0;
    }
    let mut twice = 0.0;
    for (i, a) in ring.iter().enumerate() {
        let b = ring[(i + 1) % ring.len()];
        twice += a.x * b.y - b.x * a.y;
    }
    twice * 0.5
}

/// Absolute area of the convex hull of `points`; zero for degenerate input.
pub fn convex_hull_area(points: &[Point2d]) -> f64 {
    signed_area(&convex_hull(points)).abs()
}
