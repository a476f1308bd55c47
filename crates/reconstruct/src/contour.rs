//! Merge a node's raw contours into one outline.

use std::f64::consts::PI;

use geo::{Area, BooleanOps, BoundingRect, Centroid, Contains, ConvexHull, MultiPolygon, Polygon, Rect};

use section_kernel::Point2d;
use section_tree::Contour;

/// The union of every raw contour that contains the node's nominal position.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedContour {
    /// Closed outer ring of the union; `None` when no contour qualified.
    pub boundary: Option<Contour>,
    /// Union centroid when it lies inside the union, otherwise the nominal position.
    pub centroid: Point2d,
    pub bounds: Option<Rect<f64>>,
    /// `width² + height²` of the bounding box. Only a locality threshold, not a radius.
    pub flat_radius: f64,
    /// `sqrt(hull_area / π)` in pixels.
    pub real_flat_radius: f64,
}

impl MergedContour {
    fn empty(nominal: Point2d) -> Self {
        Self {
            boundary: None,
            centroid: nominal,
            bounds: None,
            flat_radius: 0.0,
            real_flat_radius: 0.0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.boundary.is_none()
    }
}

/// Union the contours that strictly contain `nominal`.
///
/// Polygons not containing the nominal position are discarded. A single
/// qualifying polygon is taken as is, so re-merging an already merged contour
/// reproduces it exactly.
pub fn merge_contours(contours: &[Contour], nominal: Point2d) -> MergedContour {
    let probe = geo::Point::from(nominal);
    let mut qualifying: Vec<Polygon<f64>> = contours
        .iter()
        .filter(|c| c.vertices().len() >= 3)
        .map(Contour::to_geo)
        .filter(|poly| poly.contains(&probe))
        .collect();

    let union = match qualifying.len() {
        0 => return MergedContour::empty(nominal),
        1 => MultiPolygon::new(qualifying),
        _ => {
            let first = qualifying.remove(0);
            qualifying
                .into_iter()
                .fold(MultiPolygon::new(vec![first]), |acc, poly| {
                    acc.union(&MultiPolygon::new(vec![poly]))
                })
        }
    };

    let Some(outline) = outer_component(&union, &probe) else {
        return MergedContour::empty(nominal);
    };

    let bounds = union.bounding_rect();
    let flat_radius = bounds
        .map(|r| r.width() * r.width() + r.height() * r.height())
        .unwrap_or(0.0);
    let real_flat_radius = (union.convex_hull().unsigned_area() / PI).sqrt();

    let centroid = match union.centroid() {
        Some(c) if union.contains(&c) => Point2d::from(c),
        _ => nominal,
    };

    let boundary = Contour::new(outline.exterior().coords().map(|c| Point2d::from(*c)).collect());

    MergedContour {
        boundary: Some(boundary),
        centroid,
        bounds,
        flat_radius,
        real_flat_radius,
    }
}

/// The union component containing `probe`.
///
/// Every qualifying contour holds `probe` strictly inside, so one component
/// always contains it unless the union snapped an edge onto it; the largest
/// component stands in for that case.
fn outer_component<'a>(union: &'a MultiPolygon<f64>, probe: &geo::Point<f64>) -> Option<&'a Polygon<f64>> {
    union.0.iter().find(|poly| poly.contains(probe)).or_else(|| {
        union
            .0
            .iter()
            .max_by(|a, b| a.unsigned_area().total_cmp(&b.unsigned_area()))
    })
}
