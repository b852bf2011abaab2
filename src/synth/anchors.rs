//! Static connection-point tables.
//!
//! Anchors are normalized into a shape's bounding box, `(0, 0)` top-left
//! and `(1, 1)` bottom-right. Kinds with no entry (ellipses, arrows, lines,
//! freehand strokes) never take part in snapping.

use serde::Serialize;

use crate::types::{BBox, Point};

use super::shapes::GeometryKind;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ConnectionAnchor {
    pub name: &'static str,
    pub x: f64,
    pub y: f64,
}

impl ConnectionAnchor {
    const fn new(name: &'static str, x: f64, y: f64) -> Self {
        Self { name, x, y }
    }

    /// Page-space position of this anchor on `bounds`
    pub fn resolve(&self, bounds: &BBox) -> Point {
        bounds.point_at(self.x, self.y)
    }
}

pub static RECTANGLE_ANCHORS: [ConnectionAnchor; 4] = [
    ConnectionAnchor::new("top", 0.5, 0.0),
    ConnectionAnchor::new("right", 1.0, 0.5),
    ConnectionAnchor::new("bottom", 0.5, 1.0),
    ConnectionAnchor::new("left", 0.0, 0.5),
];

pub static DIAMOND_ANCHORS: [ConnectionAnchor; 4] = [
    ConnectionAnchor::new("top", 0.5, 0.0),
    ConnectionAnchor::new("right", 1.0, 0.5),
    ConnectionAnchor::new("bottom", 0.5, 1.0),
    ConnectionAnchor::new("left", 0.0, 0.5),
];

pub static TRIANGLE_ANCHORS: [ConnectionAnchor; 4] = [
    ConnectionAnchor::new("apex", 0.5, 0.0),
    ConnectionAnchor::new("right", 0.75, 0.5),
    ConnectionAnchor::new("base", 0.5, 1.0),
    ConnectionAnchor::new("left", 0.25, 0.5),
];

/// Anchor table for a geometry kind, empty when it has none
pub fn anchors_for(kind: GeometryKind) -> &'static [ConnectionAnchor] {
    match kind {
        GeometryKind::Rectangle => &RECTANGLE_ANCHORS,
        GeometryKind::Diamond => &DIAMOND_ANCHORS,
        GeometryKind::Triangle => &TRIANGLE_ANCHORS,
        GeometryKind::Ellipse
        | GeometryKind::Arrow
        | GeometryKind::Line
        | GeometryKind::Freehand
        | GeometryKind::Other => &[],
    }
}
