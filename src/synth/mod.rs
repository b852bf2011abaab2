//! Shape synthesis and snapping
//!
//! This module is organized into submodules:
//! - `shapes`: the replacement shape variants and their geometry
//! - `anchors`: static connection-point tables per geometry kind
//! - `snap`: nearest-anchor and alignment searches
//! - `host`: the editor surface the engine talks to
//! - `engine`: the per-editor state machine driving recognition and commit

pub mod anchors;
pub mod engine;
pub mod host;
pub mod shapes;
pub mod snap;

pub use anchors::{ConnectionAnchor, anchors_for};
pub use engine::{CompletedStroke, EngineState, RejectReason, Replacement, StrokeOutcome, SynthesisEngine};
pub use host::{Binding, CanvasShape, EditorHost, HistoryMark, Terminal};
pub use shapes::{
    ArrowDirection, ArrowShape, DiamondShape, EllipseShape, GeometryKind, LineShape, RectangleShape,
    ShapeGeometry, ShapeKind, TriangleShape,
};
pub use snap::{Alignment, SnapMatch, closest_alignment, nearest_anchor};

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::label::ShapeLabel;
use crate::types::{BBox, Point};

/// Host-assigned shape identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ShapeId(pub u64);

impl fmt::Display for ShapeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "shape:{}", self.0)
    }
}

/// Tunables of the synthesis engine.
///
/// Pixel distances are in screen space and divided by the zoom level before
/// being compared against page-space distances.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthConfig {
    /// Results at or below this confidence leave the stroke untouched
    pub confidence_threshold: f64,
    pub snap_distance_px: f64,
    pub align_distance_px: f64,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.35,
            snap_distance_px: 20.0,
            align_distance_px: 10.0,
        }
    }
}

/// Build the replacement shape for a recognized stroke.
///
/// Returns `None` for labels without a vector counterpart and for an empty
/// stroke.
pub fn synthesize(label: ShapeLabel, points: &[Point]) -> Option<ShapeKind> {
    let (&first, &last) = (points.first()?, points.last()?);
    let bb = BBox::from_points(points);
    let (w, h) = (bb.width(), bb.height());

    let shape: ShapeKind = match label {
        ShapeLabel::Circle => EllipseShape::new(bb.min, w, h).into(),
        ShapeLabel::Rectangle => RectangleShape::new(bb.min, w, h).into(),
        ShapeLabel::Square => {
            let side = w.max(h);
            let c = bb.center();
            RectangleShape::new(Point::new(c.x - side / 2.0, c.y - side / 2.0), side, side).into()
        }
        ShapeLabel::Diamond => DiamondShape::new(bb.min, w, h).into(),
        ShapeLabel::Triangle => TriangleShape::new(bb.min, w, h).into(),
        ShapeLabel::ArrowLeft | ShapeLabel::ArrowRight | ShapeLabel::ArrowUp | ShapeLabel::ArrowDown => {
            let direction = ArrowDirection::from_label(label)?;
            ArrowShape { start: first, end: last, direction }.into()
        }
        ShapeLabel::Line => LineShape { start: first, end: last }.into(),
        ShapeLabel::Star | ShapeLabel::Pentagon | ShapeLabel::Hexagon | ShapeLabel::Unknown => return None,
    };
    Some(shape)
}
