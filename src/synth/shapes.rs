//! Replacement shape variants
//!
//! Each variant is its own type that knows how to:
//! - Report its geometry kind and bounding box
//! - Resolve its connection anchors in page space
//! - Move bodily by an offset

use enum_dispatch::enum_dispatch;
use serde::{Deserialize, Serialize};

use crate::label::ShapeLabel;
use crate::types::{BBox, Offset, Point};

use super::anchors::{ConnectionAnchor, anchors_for};

/// Geometry kinds the host may report, including kinds the engine never
/// produces itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GeometryKind {
    Rectangle,
    Ellipse,
    Diamond,
    Triangle,
    Arrow,
    Line,
    Freehand,
    Other,
}

/// Common behavior for all synthesized shapes
#[enum_dispatch]
pub trait ShapeGeometry {
    fn geometry(&self) -> GeometryKind;

    fn bounds(&self) -> BBox;

    fn translate(&mut self, by: Offset);

    /// Connection anchors resolved against the current bounds, in table order
    fn anchors(&self) -> Vec<(ConnectionAnchor, Point)> {
        let bounds = self.bounds();
        anchors_for(self.geometry())
            .iter()
            .map(|a| (*a, a.resolve(&bounds)))
            .collect()
    }
}

macro_rules! boxed_shape {
    ($(#[$doc:meta])* $name:ident => $kind:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
        pub struct $name {
            /// Top-left corner
            pub origin: Point,
            pub width: f64,
            pub height: f64,
        }

        impl $name {
            pub fn new(origin: Point, width: f64, height: f64) -> Self {
                Self { origin, width, height }
            }
        }

        impl ShapeGeometry for $name {
            fn geometry(&self) -> GeometryKind {
                GeometryKind::$kind
            }

            fn bounds(&self) -> BBox {
                BBox::from_origin_size(self.origin, self.width, self.height)
            }

            fn translate(&mut self, by: Offset) {
                self.origin += by;
            }
        }
    };
}

boxed_shape!(
    /// Axis-aligned rectangle
    RectangleShape => Rectangle
);
boxed_shape!(
    /// Ellipse inscribed in its box
    EllipseShape => Ellipse
);
boxed_shape!(
    /// Rhombus with its vertices on the box's edge midpoints
    DiamondShape => Diamond
);
boxed_shape!(
    /// Isosceles triangle with its apex at the top edge midpoint
    TriangleShape => Triangle
);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArrowDirection {
    Left,
    Right,
    Up,
    Down,
}

impl ArrowDirection {
    pub fn from_label(label: ShapeLabel) -> Option<Self> {
        match label {
            ShapeLabel::ArrowLeft => Some(ArrowDirection::Left),
            ShapeLabel::ArrowRight => Some(ArrowDirection::Right),
            ShapeLabel::ArrowUp => Some(ArrowDirection::Up),
            ShapeLabel::ArrowDown => Some(ArrowDirection::Down),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArrowShape {
    pub start: Point,
    pub end: Point,
    /// Heading the recognizer saw; the drawn arrow always points at `end`
    pub direction: ArrowDirection,
}

impl ShapeGeometry for ArrowShape {
    fn geometry(&self) -> GeometryKind {
        GeometryKind::Arrow
    }

    fn bounds(&self) -> BBox {
        BBox::from_points(&[self.start, self.end])
    }

    fn translate(&mut self, by: Offset) {
        self.start += by;
        self.end += by;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineShape {
    pub start: Point,
    pub end: Point,
}

impl ShapeGeometry for LineShape {
    fn geometry(&self) -> GeometryKind {
        GeometryKind::Line
    }

    fn bounds(&self) -> BBox {
        BBox::from_points(&[self.start, self.end])
    }

    fn translate(&mut self, by: Offset) {
        self.start += by;
        self.end += by;
    }
}

/// A shape the engine can produce, one variant per geometry kind
#[enum_dispatch(ShapeGeometry)]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ShapeKind {
    Rectangle(RectangleShape),
    Ellipse(EllipseShape),
    Diamond(DiamondShape),
    Triangle(TriangleShape),
    Arrow(ArrowShape),
    Line(LineShape),
}

impl ShapeKind {
    /// Two-point shapes whose endpoints may bind to other shapes
    pub fn is_directional(&self) -> bool {
        matches!(self, ShapeKind::Arrow(_) | ShapeKind::Line(_))
    }

    pub fn endpoints(&self) -> Option<(Point, Point)> {
        match self {
            ShapeKind::Arrow(a) => Some((a.start, a.end)),
            ShapeKind::Line(l) => Some((l.start, l.end)),
            _ => None,
        }
    }

    pub fn endpoints_mut(&mut self) -> Option<(&mut Point, &mut Point)> {
        match self {
            ShapeKind::Arrow(a) => Some((&mut a.start, &mut a.end)),
            ShapeKind::Line(l) => Some((&mut l.start, &mut l.end)),
            _ => None,
        }
    }
}
