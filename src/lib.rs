//! Free-hand stroke recognition and shape synthesis.
//!
//! A stroke goes through a [`Recognizer`] (the closed-form
//! [`GeometricRecognizer`] or a raster [`ClassifierRecognizer`]), is gated on
//! confidence, and is replaced by a vector [`ShapeKind`] whose endpoints snap
//! to connection anchors of neighbouring shapes. The editor itself stays
//! behind the [`EditorHost`] trait.

pub mod errors;
pub mod label;
pub mod log;
pub mod preprocess;
pub mod recognize;
pub mod synth;
pub mod types;

pub use errors::{ClassifierError, HostError};
pub use label::ShapeLabel;
pub use recognize::{
    ClassifierRecognizer, GeometricRecognizer, Prediction, RecognitionRequest, RecognitionResult, Recognizer,
    WithFallback,
};
pub use synth::{CompletedStroke, EditorHost, ShapeId, ShapeKind, StrokeOutcome, SynthConfig, SynthesisEngine};
pub use types::{BBox, Confidence, Offset, Point, Zoom};

/// Recognize a stroke with the default geometric thresholds.
pub fn recognize_geometric(points: &[Point]) -> RecognitionResult {
    GeometricRecognizer::default().recognize(points)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognize_closed_square() {
        let pts = [
            Point::new(0.0, 0.0),
            Point::new(100.0, 0.0),
            Point::new(100.0, 100.0),
            Point::new(0.0, 100.0),
            Point::new(0.0, 0.0),
        ];
        assert_eq!(recognize_geometric(&pts).name, ShapeLabel::Rectangle);
    }

    #[test]
    fn two_points_are_unknown() {
        let result = recognize_geometric(&[Point::new(0.0, 0.0), Point::new(100.0, 0.0)]);
        assert_eq!(result, RecognitionResult::unknown());
    }
}
