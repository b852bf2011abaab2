//! Stroke recognizers
//!
//! This module is organized into submodules:
//! - `geometric`: closed-form polyline heuristics
//! - `classifier`: raster classifier behind the [`ShapeModel`] trait
//! - `template`: nearest-prototype model fitted from a synthetic dataset
//!
//! Every backend answers the same question through [`Recognizer`]: given a
//! stroke, which label and how confident.

pub mod classifier;
pub mod geometric;
pub mod template;

pub use classifier::{ClassifierRecognizer, JsonModelSource, LinearModel, ModelSource, ShapeModel};
pub use geometric::{GeometricRecognizer, GeometricThresholds, StrokeMetrics};
pub use template::TemplateModel;

use serde::{Deserialize, Serialize};

use crate::errors::ClassifierError;
use crate::label::ShapeLabel;
use crate::log::warn;
use crate::types::{Confidence, Point};

/// Fewest points a recognizer will look at
pub const MIN_STROKE_POINTS: usize = 3;

/// One entry of a ranked prediction list
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub label: ShapeLabel,
    pub confidence: Confidence,
}

/// Best-guess label for a stroke.
///
/// When `all_predictions` is present it is sorted by descending confidence
/// and its first entry equals `name`/`confidence`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecognitionResult {
    pub name: ShapeLabel,
    pub confidence: Confidence,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub all_predictions: Option<Vec<Prediction>>,
}

impl RecognitionResult {
    /// The "no match" sentinel
    pub fn unknown() -> Self {
        Self::new(ShapeLabel::Unknown, Confidence::ZERO)
    }

    pub fn new(name: ShapeLabel, confidence: impl Into<Confidence>) -> Self {
        RecognitionResult {
            name,
            confidence: confidence.into(),
            all_predictions: None,
        }
    }

    /// Build a result from a probability vector aligned with `labels`.
    ///
    /// The ranking is stable: equal probabilities keep vocabulary order.
    /// An empty vocabulary gives [`RecognitionResult::unknown`].
    pub fn from_distribution(labels: &[ShapeLabel], probabilities: &[f32]) -> Self {
        let mut ranked: Vec<Prediction> = labels
            .iter()
            .zip(probabilities)
            .map(|(&label, &p)| Prediction {
                label,
                confidence: Confidence::new(f64::from(p)),
            })
            .collect();
        ranked.sort_by(|a, b| b.confidence.raw().total_cmp(&a.confidence.raw()));

        let Some(&best) = ranked.first() else {
            return Self::unknown();
        };
        RecognitionResult {
            name: best.label,
            confidence: best.confidence,
            all_predictions: Some(ranked),
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.name == ShapeLabel::Unknown
    }

    /// Check the ranking invariant on a result that did not come from
    /// [`RecognitionResult::from_distribution`], such as a remote response.
    pub fn validate(&self) -> Result<(), ClassifierError> {
        let Some(ranked) = &self.all_predictions else {
            return Ok(());
        };
        let invalid = |reason: String| Err(ClassifierError::InvalidRanking { reason });
        let Some(head) = ranked.first() else {
            return invalid("empty prediction list".to_string());
        };
        if head.label != self.name || head.confidence != self.confidence {
            return invalid(format!(
                "top prediction {}/{} differs from {}/{}",
                head.label, head.confidence, self.name, self.confidence
            ));
        }
        if let Some(i) = ranked
            .windows(2)
            .position(|pair| pair[0].confidence.raw() < pair[1].confidence.raw())
        {
            return invalid(format!("entry {} ranks above a lower-confidence entry", i + 1));
        }
        Ok(())
    }
}

/// Body of a remote recognition request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognitionRequest {
    pub points: Vec<Point>,
}

/// Common contract of every recognition backend.
///
/// Strokes shorter than [`MIN_STROKE_POINTS`] must yield
/// [`RecognitionResult::unknown`], never an error.
#[allow(async_fn_in_trait)]
pub trait Recognizer {
    async fn recognize(&self, points: &[Point]) -> Result<RecognitionResult, ClassifierError>;
}

impl<T: Recognizer + ?Sized> Recognizer for &T {
    async fn recognize(&self, points: &[Point]) -> Result<RecognitionResult, ClassifierError> {
        (**self).recognize(points).await
    }
}

/// Use `primary`, and when its model cannot be loaded answer with `fallback`.
///
/// Only [`ClassifierError::ModelUnavailable`] triggers the fallback; other
/// errors propagate.
#[derive(Debug, Clone)]
pub struct WithFallback<P, F> {
    pub primary: P,
    pub fallback: F,
}

impl<P, F> WithFallback<P, F> {
    pub fn new(primary: P, fallback: F) -> Self {
        Self { primary, fallback }
    }
}

impl<P: Recognizer, F: Recognizer> Recognizer for WithFallback<P, F> {
    async fn recognize(&self, points: &[Point]) -> Result<RecognitionResult, ClassifierError> {
        match self.primary.recognize(points).await {
            Err(err) if err.is_model_unavailable() => {
                warn!(%err, "primary recognizer unavailable, falling back");
                self.fallback.recognize(points).await
            }
            other => other,
        }
    }
}
