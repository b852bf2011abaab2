//! Nearest-anchor and alignment searches.
//!
//! Both scan shapes in host order, then anchors in table order, and only
//! replace the current best on a strictly smaller distance. Equal distances
//! therefore resolve to the first candidate found.

use crate::types::{Offset, Point};

use super::ShapeId;
use super::anchors::ConnectionAnchor;
use super::host::CanvasShape;
use super::shapes::{ShapeGeometry, ShapeKind};

/// A candidate binding of a point to another shape's anchor
#[derive(Debug, Clone, PartialEq)]
pub struct SnapMatch {
    pub target: ShapeId,
    pub anchor: ConnectionAnchor,
    /// Page-space position of `anchor`
    pub position: Point,
    pub distance: f64,
}

/// Nearest anchor to `point` on any shape except `exclude`, strictly closer
/// than `max_distance`.
pub fn nearest_anchor(
    point: Point,
    shapes: &[CanvasShape],
    exclude: ShapeId,
    max_distance: f64,
) -> Option<SnapMatch> {
    let mut best: Option<SnapMatch> = None;
    for shape in shapes.iter().filter(|s| s.id != exclude) {
        for anchor in super::anchors_for(shape.geometry) {
            let position = anchor.resolve(&shape.bounds);
            let distance = point.distance(position);
            let limit = best.as_ref().map_or(max_distance, |b| b.distance);
            if distance < limit {
                best = Some(SnapMatch {
                    target: shape.id,
                    anchor: *anchor,
                    position,
                    distance,
                });
            }
        }
    }
    best
}

/// Translation that makes one of a shape's anchors coincide with an anchor
/// of a neighbour
#[derive(Debug, Clone, PartialEq)]
pub struct Alignment {
    pub own: ConnectionAnchor,
    pub target: ShapeId,
    pub anchor: ConnectionAnchor,
    pub offset: Offset,
    pub distance: f64,
}

/// Closest (own anchor, neighbour anchor) pair strictly under `max_distance`.
pub fn closest_alignment(
    shape: &ShapeKind,
    shapes: &[CanvasShape],
    exclude: ShapeId,
    max_distance: f64,
) -> Option<Alignment> {
    let own = shape.anchors();
    if own.is_empty() {
        return None;
    }
    let mut best: Option<Alignment> = None;
    for other in shapes.iter().filter(|s| s.id != exclude) {
        for anchor in super::anchors_for(other.geometry) {
            let target_pos = anchor.resolve(&other.bounds);
            for (own_anchor, own_pos) in &own {
                let distance = own_pos.distance(target_pos);
                let limit = best.as_ref().map_or(max_distance, |b| b.distance);
                if distance < limit {
                    best = Some(Alignment {
                        own: *own_anchor,
                        target: other.id,
                        anchor: *anchor,
                        offset: target_pos - *own_pos,
                        distance,
                    });
                }
            }
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synth::shapes::{GeometryKind, RectangleShape};
    use crate::types::BBox;

    fn rect(id: u64, x: f64, y: f64) -> CanvasShape {
        CanvasShape {
            id: ShapeId(id),
            geometry: GeometryKind::Rectangle,
            bounds: BBox::from_origin_size(Point::new(x, y), 100.0, 50.0),
        }
    }

    #[test]
    fn picks_nearest_anchor_within_radius() {
        let shapes = [rect(1, 0.0, 0.0)];
        let m = nearest_anchor(Point::new(104.0, 27.0), &shapes, ShapeId(99), 20.0).unwrap();
        assert_eq!(m.target, ShapeId(1));
        assert_eq!(m.anchor.name, "right");
        assert_eq!(m.position, Point::new(100.0, 25.0));
        assert!(nearest_anchor(Point::new(150.0, 25.0), &shapes, ShapeId(99), 20.0).is_none());
    }

    #[test]
    fn radius_is_strict() {
        let shapes = [rect(1, 0.0, 0.0)];
        assert!(nearest_anchor(Point::new(120.0, 25.0), &shapes, ShapeId(99), 20.0).is_none());
    }

    #[test]
    fn excluded_and_anchorless_shapes_are_skipped() {
        let ellipse = CanvasShape {
            id: ShapeId(2),
            geometry: GeometryKind::Ellipse,
            bounds: BBox::from_origin_size(Point::ORIGIN, 100.0, 50.0),
        };
        let shapes = [rect(1, 0.0, 0.0), ellipse];
        assert!(nearest_anchor(Point::new(100.0, 25.0), &shapes, ShapeId(1), 20.0).is_none());
    }

    #[test]
    fn equidistant_anchors_resolve_to_first_shape() {
        // Point halfway between the right anchor of #1 and the left anchor of #2
        let shapes = [rect(1, 0.0, 0.0), rect(2, 120.0, 0.0)];
        for _ in 0..10 {
            let m = nearest_anchor(Point::new(110.0, 25.0), &shapes, ShapeId(99), 20.0).unwrap();
            assert_eq!(m.target, ShapeId(1));
            assert_eq!(m.distance, 10.0);
        }
        let reversed = [rect(2, 120.0, 0.0), rect(1, 0.0, 0.0)];
        let m = nearest_anchor(Point::new(110.0, 25.0), &reversed, ShapeId(99), 20.0).unwrap();
        assert_eq!(m.target, ShapeId(2));
    }

    #[test]
    fn alignment_offsets_closest_pair() {
        // New shape's left anchor sits 6 units right of #1's right anchor
        let new: ShapeKind = RectangleShape::new(Point::new(106.0, 2.0), 100.0, 50.0).into();
        let a = closest_alignment(&new, &[rect(1, 0.0, 0.0)], ShapeId(99), 10.0).unwrap();
        assert_eq!(a.own.name, "left");
        assert_eq!(a.anchor.name, "right");
        assert_eq!(a.offset, Offset::new(-6.0, -2.0));
    }

    #[test]
    fn alignment_needs_own_anchors() {
        let new: ShapeKind = crate::synth::shapes::EllipseShape::new(Point::new(100.0, 0.0), 10.0, 10.0).into();
        assert!(closest_alignment(&new, &[rect(1, 0.0, 0.0)], ShapeId(99), 10.0).is_none());
    }
}
