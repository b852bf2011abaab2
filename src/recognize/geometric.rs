//! Closed-form recognizer over polyline metrics.
//!
//! Branches are tried in a fixed order and the first satisfied one wins:
//! line, circle, rectangle, diamond, unknown. Linearity comes first so a
//! near-straight stroke is never read as a degenerate closed shape.

use serde::{Deserialize, Serialize};

use crate::errors::ClassifierError;
use crate::label::ShapeLabel;
use crate::preprocess::{centroid, path_length, point_segment_distance};
use crate::types::{BBox, Point};

use super::{MIN_STROKE_POINTS, RecognitionResult, Recognizer};

/// Acceptance cutoffs for each branch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeometricThresholds {
    /// A stroke is closed when its endpoint gap is below this fraction of
    /// its path length
    pub closed_gap_ratio: f64,
    /// Linearity above which any stroke is a line
    pub line: f64,
    /// Linearity above which an open stroke is a line
    pub open_line: f64,
    pub circle: f64,
    pub rectangle: f64,
    /// Rectangularity above which a closed stroke is reported as a diamond.
    /// This is a heuristic: nothing checks for a rotated square.
    pub diamond: f64,
    /// Diamond confidence is the rectangularity scaled by this factor
    pub diamond_discount: f64,
}

impl Default for GeometricThresholds {
    fn default() -> Self {
        Self {
            closed_gap_ratio: 0.15,
            line: 0.92,
            open_line: 0.6,
            circle: 0.8,
            rectangle: 0.72,
            diamond: 0.5,
            diamond_discount: 0.9,
        }
    }
}

/// Intermediate scores of the geometric recognizer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrokeMetrics {
    pub path_length: f64,
    pub closed: bool,
    pub linearity: f64,
    pub circularity: f64,
    pub rectangularity: f64,
}

impl StrokeMetrics {
    /// Measure a stroke with the default closedness ratio.
    /// `None` when the stroke has fewer than three points.
    pub fn measure(points: &[Point]) -> Option<Self> {
        Self::measure_with(points, GeometricThresholds::default().closed_gap_ratio)
    }

    pub fn measure_with(points: &[Point], closed_gap_ratio: f64) -> Option<Self> {
        if points.len() < MIN_STROKE_POINTS {
            return None;
        }
        let first = points[0];
        let last = points[points.len() - 1];
        let plen = path_length(points);

        Some(StrokeMetrics {
            path_length: plen,
            closed: first.distance(last) < plen * closed_gap_ratio,
            linearity: linearity(points, first, last),
            circularity: circularity(points),
            rectangularity: rectangularity(points, plen),
        })
    }
}

/// `1 - 3 * maxDeviation / chord`, clamped at zero. A zero-length chord
/// scores zero.
fn linearity(points: &[Point], first: Point, last: Point) -> f64 {
    let chord = first.distance(last);
    if chord == 0.0 {
        return 0.0;
    }
    let max_dev = points
        .iter()
        .map(|&p| point_segment_distance(p, first, last))
        .fold(0.0, f64::max);
    (1.0 - max_dev / chord * 3.0).max(0.0)
}

/// `1 - 4 * std(radii) / mean(radii)`, clamped at zero
fn circularity(points: &[Point]) -> f64 {
    let Some(c) = centroid(points) else {
        return 0.0;
    };
    let radii: Vec<f64> = points.iter().map(|p| p.distance(c)).collect();
    let n = radii.len() as f64;
    let avg = radii.iter().sum::<f64>() / n;
    let ratio = if avg == 0.0 {
        1.0
    } else {
        let var = radii.iter().map(|r| (r - avg).powi(2)).sum::<f64>() / n;
        var.sqrt() / avg
    };
    (1.0 - ratio * 4.0).max(0.0)
}

/// How close the path length is to the bounding-box perimeter
fn rectangularity(points: &[Point], plen: f64) -> f64 {
    let bb = BBox::from_points(points);
    let perim = match 2.0 * (bb.width() + bb.height()) {
        p if p == 0.0 => 1.0,
        p => p,
    };
    (1.0 - (1.0 - plen / perim).abs()).max(0.0)
}

/// Deterministic, total recognizer for lines, circles, rectangles and
/// diamonds.
#[derive(Debug, Clone, Default)]
pub struct GeometricRecognizer {
    pub thresholds: GeometricThresholds,
}

impl GeometricRecognizer {
    pub fn new(thresholds: GeometricThresholds) -> Self {
        Self { thresholds }
    }

    pub fn recognize(&self, points: &[Point]) -> RecognitionResult {
        let Some(m) = StrokeMetrics::measure_with(points, self.thresholds.closed_gap_ratio) else {
            return RecognitionResult::unknown();
        };
        self.classify(&m)
    }

    /// Apply the branch order to precomputed metrics
    pub fn classify(&self, m: &StrokeMetrics) -> RecognitionResult {
        let t = &self.thresholds;
        if m.linearity > t.line || (!m.closed && m.linearity > t.open_line) {
            return RecognitionResult::new(ShapeLabel::Line, m.linearity);
        }
        if !m.closed {
            return RecognitionResult::unknown();
        }
        if m.circularity > t.circle {
            RecognitionResult::new(ShapeLabel::Circle, m.circularity)
        } else if m.rectangularity > t.rectangle {
            RecognitionResult::new(ShapeLabel::Rectangle, m.rectangularity)
        } else if m.rectangularity > t.diamond {
            RecognitionResult::new(ShapeLabel::Diamond, m.rectangularity * t.diamond_discount)
        } else {
            RecognitionResult::unknown()
        }
    }
}

impl Recognizer for GeometricRecognizer {
    async fn recognize(&self, points: &[Point]) -> Result<RecognitionResult, ClassifierError> {
        Ok(GeometricRecognizer::recognize(self, points))
    }
}
