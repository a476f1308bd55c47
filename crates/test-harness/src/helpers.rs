//! Helper functions: error type, contour builders, radius math.

use std::f64::consts::PI;

use section_tree::Contour;

// ── Error Type ──────────────────────────────────────────────────────────────

/// Unified error type for the test harness.
#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    #[error("node not found: {name}")]
    NodeNotFound { name: String },

    #[error("tree not found: {name}")]
    TreeNotFound { name: String },

    #[error("duplicate name: {name}")]
    DuplicateName { name: String },

    #[error("assertion failed: {detail}")]
    AssertionFailed { detail: String },

    #[error("reconstruction error: {0}")]
    Reconstruct(#[from] cross_section::ReconstructError),

    #[error("tree error: {0}")]
    Tree(#[from] section_tree::TreeError),
}

// ── Contour Builders ────────────────────────────────────────────────────────

/// Axis-aligned rectangle with its lower-left corner at `(x, y)`, counter-clockwise.
pub fn rect_contour(x: f64, y: f64, w: f64, h: f64) -> Contour {
    Contour::from_coords(&[(x, y), (x + w, y), (x + w, y + h), (x, y + h)])
}

/// Square of side `side` centred on `(cx, cy)`.
pub fn square_contour(cx: f64, cy: f64, side: f64) -> Contour {
    let half = side / 2.0;
    rect_contour(cx - half, cy - half, side, side)
}

/// Regular `n`-gon inscribed in the circle of radius `r`, first vertex on +x.
pub fn circle_contour(cx: f64, cy: f64, r: f64, n: usize) -> Contour {
    let coords: Vec<(f64, f64)> = (0..n)
        .map(|i| {
            let a = 2.0 * PI * i as f64 / n as f64;
            (cx + r * a.cos(), cy + r * a.sin())
        })
        .collect();
    Contour::from_coords(&coords)
}

/// Area of the regular `n`-gon inscribed in a circle of radius `r`.
pub fn regular_polygon_area(r: f64, n: usize) -> f64 {
    0.5 * n as f64 * r * r * (2.0 * PI / n as f64).sin()
}

// ── Radius Math ─────────────────────────────────────────────────────────────

/// Radius of the circle with the given area, before truncation.
pub fn circle_radius(area: f64) -> f64 {
    (area / PI).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circle_contour_vertices_on_circle() {
        let c = circle_contour(3.0, -2.0, 5.0, 12);
        assert_eq!(c.points.len(), 12);
        for p in &c.points {
            let d = ((p.x - 3.0).powi(2) + (p.y + 2.0).powi(2)).sqrt();
            assert!((d - 5.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_polygon_area_approaches_circle() {
        let a = regular_polygon_area(1.0, 1024);
        assert!((a - PI).abs() < 1e-4);
        assert!((regular_polygon_area(1.0, 4) - 2.0).abs() < 1e-12);
    }
}
