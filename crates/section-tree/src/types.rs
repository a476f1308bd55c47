use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

use section_kernel::Point2d;

new_key_type! {
    pub struct NodeId;
}

/// A closed 2-D outline traced on one section.
///
/// Points are stored as traced; the ring may or may not repeat its first point.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Contour {
    pub points: Vec<Point2d>,
}

impl Contour {
    pub fn new(points: Vec<Point2d>) -> Self {
        Self { points }
    }

    pub fn from_coords(coords: &[(f64, f64)]) -> Self {
        Self {
            points: coords.iter().map(|&c| Point2d::from(c)).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn is_closed(&self) -> bool {
        self.points.len() > 1 && self.points.first() == self.points.last()
    }

    /// Points with the first vertex repeated at the end.
    pub fn closed_ring(&self) -> Vec<Point2d> {
        let mut ring = self.points.clone();
        if !self.is_closed() {
            if let Some(&first) = ring.first() {
                ring.push(first);
            }
        }
        ring
    }

    /// Distinct ring vertices (closing duplicate dropped).
    pub fn vertices(&self) -> &[Point2d] {
        if self.is_closed() {
            &self.points[..self.points.len() - 1]
        } else {
            &self.points
        }
    }

    pub fn to_geo(&self) -> geo::Polygon<f64> {
        let exterior: Vec<geo::Coord<f64>> = self.points.iter().map(|&p| p.into()).collect();
        geo::Polygon::new(geo::LineString::new(exterior), vec![])
    }
}

/// One traced point of an area tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    /// Document object id.
    pub oid: String,
    /// Layer reference, resolved to a depth through the [`LayerTable`](crate::LayerTable).
    pub lid: String,
    pub x: f64,
    pub y: f64,
    pub contours: Vec<Contour>,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    /// Equivalent-circle radius of the merged contour footprint, in calibrated units.
    pub flat_radius: Option<f64>,
    /// Equivalent-circle radius of the local cross-section, in calibrated units.
    pub cross_radius: Option<u64>,
}

impl Node {
    pub fn new(oid: impl Into<String>, lid: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            oid: oid.into(),
            lid: lid.into(),
            x,
            y,
            contours: Vec::new(),
            parent: None,
            children: Vec::new(),
            flat_radius: None,
            cross_radius: None,
        }
    }

    pub fn with_contour(mut self, contour: Contour) -> Self {
        self.contours.push(contour);
        self
    }

    pub fn planar(&self) -> Point2d {
        Point2d::new(self.x, self.y)
    }

    /// The cross-section attribute as the document stores it.
    pub fn cross_radius_attr(&self) -> Option<String> {
        self.cross_radius.map(encode_radius)
    }
}

/// String encoding of an integer radius for attribute storage.
pub fn encode_radius(radius: u64) -> String {
    radius.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closed_ring_appends_first_point_once() {
        let open = Contour::from_coords(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0)]);
        let ring = open.closed_ring();
        assert_eq!(ring.len(), 4);
        assert_eq!(ring[3], ring[0]);

        let closed = Contour::new(ring.clone());
        assert_eq!(closed.closed_ring(), ring);
        assert_eq!(closed.vertices().len(), 3);
    }

    #[test]
    fn test_empty_contour_ring_is_empty() {
        assert!(Contour::default().closed_ring().is_empty());
        assert!(Contour::default().vertices().is_empty());
    }

    #[test]
    fn test_cross_radius_attr_encoding() {
        let mut node = Node::new("12", "3", 0.0, 0.0);
        assert_eq!(node.cross_radius_attr(), None);
        node.cross_radius = Some(0);
        assert_eq!(node.cross_radius_attr().as_deref(), Some("0"));
        node.cross_radius = Some(42);
        assert_eq!(node.cross_radius_attr().as_deref(), Some("42"));
    }
}
