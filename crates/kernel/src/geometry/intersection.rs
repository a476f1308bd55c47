use serde::{Deserialize, Serialize};

use super::curves::{Ray3d, Segment3d};
use super::point::Point3d;
use super::surfaces::Plane;
use crate::Tolerance;

/// Result of intersecting a ray or plane with a segment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Intersection {
    Empty,
    Point(Point3d),
    /// The primitives overlap along a segment (collinear or coincident).
    Segment(Segment3d),
}

impl Intersection {
    pub fn is_empty(&self) -> bool {
        matches!(self, Intersection::Empty)
    }

    /// The intersection point, if the result is a proper point.
    pub fn point(&self) -> Option<Point3d> {
        match self {
            Intersection::Point(p) => Some(*p),
            _ => None,
        }
    }
}

// ─── Ray-Segment Intersection ───────────────────────────────────────────────

/// Intersect a ray with a segment in 3D.
///
/// Skew configurations (line distance above `tol.coincidence`) are empty.
/// Collinear overlaps return `Segment`, or `Point` when the overlap collapses
/// to the ray origin.
pub fn ray_segment_intersection(ray: &Ray3d, seg: &Segment3d, tol: &Tolerance) -> Intersection {
    let d = ray.direction;
    if d.is_zero() {
        return Intersection::Empty;
    }
    let e = seg.direction();
    let w = seg.source - ray.origin;

    if e.is_zero() {
        let off = w.cross(&d).length() / d.length();
        if tol.is_zero_distance(off) && w.dot(&d) >= 0.0 {
            return Intersection::Point(seg.source);
        }
        return Intersection::Empty;
    }

    let n = d.cross(&e);
    let n_len = n.length();

    if n_len <= tol.parametric * d.length() * e.length() {
        return collinear_overlap(ray, seg, tol);
    }

    // Distance between the two supporting lines.
    if !tol.is_zero_distance(w.dot(&n) / n_len) {
        return Intersection::Empty;
    }

    let n2 = n_len * n_len;
    let t = w.cross(&e).dot(&n) / n2;
    let s = w.cross(&d).dot(&n) / n2;

    if t < -tol.parametric || !tol.param_in_range(s, 0.0, 1.0) {
        return Intersection::Empty;
    }

    let point = if s <= 0.0 {
        seg.source
    } else if s >= 1.0 {
        seg.target
    } else {
        seg.at(s)
    };
    Intersection::Point(point)
}

fn collinear_overlap(ray: &Ray3d, seg: &Segment3d, tol: &Tolerance) -> Intersection {
    let d = ray.direction;
    let w = seg.source - ray.origin;
    let off = w.cross(&d).length() / d.length();
    if !tol.is_zero_distance(off) {
        return Intersection::Empty; // parallel, not collinear
    }

    let d2 = d.length_squared();
    let t0 = w.dot(&d) / d2;
    let t1 = (seg.target - ray.origin).dot(&d) / d2;
    let (lo, hi) = (t0.min(t1), t0.max(t1));
    if hi < -tol.parametric {
        return Intersection::Empty;
    }
    let lo = lo.max(0.0);
    if hi - lo <= tol.parametric {
        return Intersection::Point(ray.at(lo));
    }
    Intersection::Segment(Segment3d::new(ray.at(lo), ray.at(hi)))
}

// ─── Plane-Segment Intersection ─────────────────────────────────────────────

/// Intersect a plane with a segment.
///
/// An endpoint lying on the plane is returned exactly; a segment lying in the
/// plane yields `Segment`.
pub fn plane_segment_intersection(plane: &Plane, seg: &Segment3d, tol: &Tolerance) -> Intersection {
    if plane.is_degenerate() {
        return Intersection::Empty;
    }
    let a = plane.signed_distance(&seg.source);
    let b = plane.signed_distance(&seg.target);

    match (tol.is_zero_distance(a), tol.is_zero_distance(b)) {
        (true, true) if seg.is_degenerate() => Intersection::Point(seg.source),
        (true, true) => Intersection::Segment(*seg),
        (true, false) => Intersection::Point(seg.source),
        (false, true) => Intersection::Point(seg.target),
        (false, false) => {
            if (a > 0.0) == (b > 0.0) {
                return Intersection::Empty;
            }
            Intersection::Point(seg.at(a / (a - b)))
        }
    }
}
