//! Raster classifier recognizer.
//!
//! The trained network is an opaque [`ShapeModel`]. It is fetched once
//! through a [`ModelSource`] on the first call and cached in the recognizer
//! for its lifetime.

use std::future::Future;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;

use crate::errors::ClassifierError;
use crate::label::ShapeLabel;
use crate::log::{debug, info};
use crate::preprocess::{FloatGrid, rasterize};
use crate::types::Point;

use super::{MIN_STROKE_POINTS, RecognitionResult, Recognizer};

/// A trained image classifier over square float rasters.
pub trait ShapeModel {
    /// Side length of the expected input grid
    fn input_size(&self) -> usize;

    /// Output vocabulary, aligned with the probability vector
    fn labels(&self) -> &[ShapeLabel];

    /// Class probabilities for one input grid
    fn predict(&self, input: &FloatGrid) -> Result<Vec<f32>, ClassifierError>;
}

/// Where model weights come from.
///
/// Any `Fn() -> impl Future<Output = Result<Box<dyn ShapeModel>, _>>` is a
/// source, so tests can hand in a closure returning a canned model.
#[allow(async_fn_in_trait)]
pub trait ModelSource {
    async fn load(&self) -> Result<Box<dyn ShapeModel>, ClassifierError>;
}

impl<F, Fut> ModelSource for F
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<Box<dyn ShapeModel>, ClassifierError>>,
{
    async fn load(&self) -> Result<Box<dyn ShapeModel>, ClassifierError> {
        self().await
    }
}

/// Recognizer that rasterizes a stroke and asks a lazily-loaded model.
pub struct ClassifierRecognizer<S> {
    source: S,
    model: OnceCell<Box<dyn ShapeModel>>,
}

impl<S: ModelSource> ClassifierRecognizer<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            model: OnceCell::new(),
        }
    }

    /// Load the model if it is not loaded yet.
    ///
    /// Calling this again after a successful load is a no-op. A failed load
    /// leaves the cell empty, so the next call retries.
    pub async fn ensure_loaded(&self) -> Result<&dyn ShapeModel, ClassifierError> {
        let model = self
            .model
            .get_or_try_init(|| async {
                let model = self.source.load().await?;
                info!(input_size = model.input_size(), classes = model.labels().len(), "classifier model loaded");
                Ok::<_, ClassifierError>(model)
            })
            .await?;
        Ok(&**model)
    }

    pub fn is_loaded(&self) -> bool {
        self.model.initialized()
    }
}

impl<S: ModelSource> Recognizer for ClassifierRecognizer<S> {
    async fn recognize(&self, points: &[Point]) -> Result<RecognitionResult, ClassifierError> {
        if points.len() < MIN_STROKE_POINTS {
            return Ok(RecognitionResult::unknown());
        }
        let model = self.ensure_loaded().await?;
        let grid = rasterize(points, model.input_size());
        let probabilities = model.predict(&grid)?;
        let labels = model.labels();
        if probabilities.len() != labels.len() {
            return Err(ClassifierError::OutputMismatch {
                expected: labels.len(),
                got: probabilities.len(),
            });
        }
        let result = RecognitionResult::from_distribution(labels, &probabilities);
        debug!(name = %result.name, confidence = %result.confidence, "classifier prediction");
        Ok(result)
    }
}

/// Numerically stable softmax
pub(crate) fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|&z| (z - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    if sum > 0.0 && sum.is_finite() {
        exps.into_iter().map(|e| e / sum).collect()
    } else {
        vec![1.0 / logits.len().max(1) as f32; logits.len()]
    }
}

/// Softmax regression over the flattened raster.
///
/// Serialized as JSON with `input_size`, `labels`, `weights` (one row of
/// `input_size²` values per label) and `bias`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    pub input_size: usize,
    pub labels: Vec<ShapeLabel>,
    pub weights: Vec<Vec<f32>>,
    pub bias: Vec<f32>,
}

impl LinearModel {
    /// Check that every dimension agrees with the declared shape
    pub fn validate(&self) -> Result<(), String> {
        let features = self.input_size * self.input_size;
        if self.input_size == 0 {
            return Err("input_size is zero".into());
        }
        if self.labels.is_empty() {
            return Err("no labels".into());
        }
        if self.weights.len() != self.labels.len() {
            return Err(format!("{} weight rows for {} labels", self.weights.len(), self.labels.len()));
        }
        if self.bias.len() != self.labels.len() {
            return Err(format!("{} bias values for {} labels", self.bias.len(), self.labels.len()));
        }
        if let Some((i, row)) = self.weights.iter().enumerate().find(|(_, row)| row.len() != features) {
            return Err(format!("weight row {i} has {} values, expected {features}", row.len()));
        }
        Ok(())
    }
}

impl ShapeModel for LinearModel {
    fn input_size(&self) -> usize {
        self.input_size
    }

    fn labels(&self) -> &[ShapeLabel] {
        &self.labels
    }

    fn predict(&self, input: &FloatGrid) -> Result<Vec<f32>, ClassifierError> {
        if input.size() != self.input_size {
            return Err(ClassifierError::Inference {
                message: format!("expected a {0}x{0} grid, got {1}x{1}", self.input_size, input.size()),
            });
        }
        let logits: Vec<f32> = self
            .weights
            .iter()
            .zip(&self.bias)
            .map(|(row, b)| row.iter().zip(input.cells()).map(|(w, x)| w * x).sum::<f32>() + b)
            .collect();
        Ok(softmax(&logits))
    }
}

/// Loads a [`LinearModel`] from a JSON file.
#[derive(Debug, Clone)]
pub struct JsonModelSource {
    path: PathBuf,
}

impl JsonModelSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ModelSource for JsonModelSource {
    async fn load(&self) -> Result<Box<dyn ShapeModel>, ClassifierError> {
        let origin = self.path.display().to_string();
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|e| ClassifierError::unavailable(&origin, e))?;
        let model: LinearModel =
            serde_json::from_slice(&bytes).map_err(|e| ClassifierError::unavailable(&origin, e))?;
        model.validate().map_err(|reason| ClassifierError::unavailable(&origin, reason))?;
        Ok(Box::new(model))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    /// Always answers with the same probabilities
    struct Fixed {
        labels: Vec<ShapeLabel>,
        probs: Vec<f32>,
    }

    impl ShapeModel for Fixed {
        fn input_size(&self) -> usize {
            8
        }
        fn labels(&self) -> &[ShapeLabel] {
            &self.labels
        }
        fn predict(&self, input: &FloatGrid) -> Result<Vec<f32>, ClassifierError> {
            assert_eq!(input.size(), 8);
            Ok(self.probs.clone())
        }
    }

    fn triangle() -> Vec<Point> {
        vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(5.0, 8.0),
            Point::new(0.0, 0.0),
        ]
    }

    #[tokio::test]
    async fn loads_once_and_ranks_predictions() {
        let loads = &Cell::new(0);
        let source = move || async move {
            loads.set(loads.get() + 1);
            Ok(Box::new(Fixed {
                labels: vec![ShapeLabel::Circle, ShapeLabel::Triangle],
                probs: vec![0.25, 0.75],
            }) as Box<dyn ShapeModel>)
        };
        let recognizer = ClassifierRecognizer::new(source);
        assert!(!recognizer.is_loaded());

        let first = recognizer.recognize(&triangle()).await.unwrap();
        let second = recognizer.recognize(&triangle()).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.name, ShapeLabel::Triangle);
        assert_eq!(first.confidence.raw(), 0.75);
        assert_eq!(loads.get(), 1);
        assert!(recognizer.is_loaded());
    }

    #[tokio::test]
    async fn short_stroke_skips_the_model() {
        let source = || async { Err::<Box<dyn ShapeModel>, _>(ClassifierError::unavailable("test", "never")) };
        let recognizer = ClassifierRecognizer::new(source);
        let result = recognizer.recognize(&[Point::ORIGIN, Point::ORIGIN]).await.unwrap();
        assert_eq!(result, RecognitionResult::unknown());
        assert!(!recognizer.is_loaded());
    }

    #[tokio::test]
    async fn failed_load_is_model_unavailable_and_retried() {
        let attempts = &Cell::new(0);
        let source = move || async move {
            attempts.set(attempts.get() + 1);
            Err::<Box<dyn ShapeModel>, _>(ClassifierError::unavailable("assets/model.json", "404"))
        };
        let recognizer = ClassifierRecognizer::new(source);
        let err = recognizer.recognize(&triangle()).await.unwrap_err();
        assert!(err.is_model_unavailable());
        let _ = recognizer.recognize(&triangle()).await;
        assert_eq!(attempts.get(), 2);
    }

    #[tokio::test]
    async fn output_length_is_checked() {
        let source = || async {
            Ok(Box::new(Fixed {
                labels: vec![ShapeLabel::Circle, ShapeLabel::Line],
                probs: vec![1.0],
            }) as Box<dyn ShapeModel>)
        };
        let err = ClassifierRecognizer::new(source).recognize(&triangle()).await.unwrap_err();
        assert!(matches!(err, ClassifierError::OutputMismatch { expected: 2, got: 1 }));
    }

    #[test]
    fn softmax_is_a_distribution() {
        let p = softmax(&[1.0, 2.0, 3.0]);
        assert!((p.iter().sum::<f32>() - 1.0).abs() < 1e-6);
        assert!(p[2] > p[1] && p[1] > p[0]);
        // Large logits do not overflow
        let q = softmax(&[1000.0, 1000.0]);
        assert_eq!(q, vec![0.5, 0.5]);
    }

    #[test]
    fn linear_model_validation_catches_bad_shapes() {
        let model = LinearModel {
            input_size: 2,
            labels: vec![ShapeLabel::Line, ShapeLabel::Circle],
            weights: vec![vec![0.0; 4], vec![0.0; 3]],
            bias: vec![0.0, 0.0],
        };
        let err = model.validate().unwrap_err();
        assert!(err.contains("row 1"), "{err}");
    }

    #[test]
    fn linear_model_scores_lit_cells() {
        // Class 0 likes the top-left cell, class 1 the bottom-right
        let model = LinearModel {
            input_size: 2,
            labels: vec![ShapeLabel::Line, ShapeLabel::Circle],
            weights: vec![vec![4.0, 0.0, 0.0, 0.0], vec![0.0, 0.0, 0.0, 4.0]],
            bias: vec![0.0, 0.0],
        };
        model.validate().unwrap();
        let grid = crate::preprocess::rasterize(&[Point::ORIGIN], 2);
        let probs = model.predict(&grid).unwrap();
        assert_eq!(probs.len(), 2);
        assert!(model.predict(&FloatGrid::new(3)).is_err());
    }

    #[tokio::test]
    async fn json_source_reports_missing_file() {
        let source = JsonModelSource::new("/nonexistent/sketchsnap/model.json");
        let err = source.load().await.err().unwrap();
        assert!(err.is_model_unavailable());
        assert!(err.to_string().contains("model.json"));
    }

    #[tokio::test]
    async fn json_source_loads_linear_model() {
        let model = LinearModel {
            input_size: 4,
            labels: vec![ShapeLabel::Line, ShapeLabel::Circle],
            weights: vec![vec![0.1; 16], vec![-0.1; 16]],
            bias: vec![0.0, 0.5],
        };
        let path = std::env::temp_dir().join(format!("sketchsnap-model-{}.json", std::process::id()));
        std::fs::write(&path, serde_json::to_vec(&model).unwrap()).unwrap();

        let recognizer = ClassifierRecognizer::new(JsonModelSource::new(&path));
        let pts = [Point::new(0.0, 0.0), Point::new(5.0, 5.0), Point::new(10.0, 0.0)];
        let result = recognizer.recognize(&pts).await.unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(result.all_predictions.map(|p| p.len()), Some(2));
        assert_eq!(recognizer.ensure_loaded().await.unwrap().input_size(), 4);
    }
}
