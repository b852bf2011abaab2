//! Nearest-prototype classifier fitted from a synthetic dataset.

use serde::{Deserialize, Serialize};

use crate::errors::ClassifierError;
use crate::label::ShapeLabel;
use crate::preprocess::{FloatGrid, TrainingDataset};

use super::classifier::{ShapeModel, softmax};

/// One mean raster per class; predictions are a softmax over cosine
/// similarities divided by `temperature`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateModel {
    input_size: usize,
    labels: Vec<ShapeLabel>,
    prototypes: Vec<Vec<f32>>,
    temperature: f32,
}

impl TemplateModel {
    pub const DEFAULT_TEMPERATURE: f32 = 0.05;

    /// Average every class's rasters into its prototype.
    ///
    /// A class with no samples gets an all-zero prototype, which scores a
    /// similarity of zero against any input.
    pub fn fit(dataset: &TrainingDataset, temperature: f32) -> Result<Self, ClassifierError> {
        let Some(first) = dataset.inputs.first() else {
            return Err(ClassifierError::Inference {
                message: "cannot fit a template model on an empty dataset".into(),
            });
        };
        let input_size = first.size();
        let cells = input_size * input_size;
        let mut sums = vec![vec![0.0f32; cells]; dataset.shape_names.len()];
        let mut counts = vec![0usize; dataset.shape_names.len()];

        for (grid, &label) in dataset.inputs.iter().zip(&dataset.labels) {
            if grid.size() != input_size {
                return Err(ClassifierError::Inference {
                    message: format!("mixed raster sizes {input_size} and {}", grid.size()),
                });
            }
            let Some(sum) = sums.get_mut(label) else {
                continue;
            };
            for (s, &c) in sum.iter_mut().zip(grid.cells()) {
                *s += c;
            }
            counts[label] += 1;
        }

        let prototypes = sums
            .into_iter()
            .zip(&counts)
            .map(|(sum, &n)| match n {
                0 => sum,
                n => sum.into_iter().map(|s| s / n as f32).collect(),
            })
            .collect();

        Ok(TemplateModel {
            input_size,
            labels: dataset.shape_names.clone(),
            prototypes,
            temperature: temperature.max(f32::EPSILON),
        })
    }

    pub fn prototype(&self, label: ShapeLabel) -> Option<&[f32]> {
        let idx = self.labels.iter().position(|&l| l == label)?;
        self.prototypes.get(idx).map(Vec::as_slice)
    }
}

fn cosine(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let na = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let nb = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if na == 0.0 || nb == 0.0 { 0.0 } else { dot / (na * nb) }
}

impl ShapeModel for TemplateModel {
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
            .prototypes
            .iter()
            .map(|p| cosine(p, input.cells()) / self.temperature)
            .collect();
        Ok(softmax(&logits))
    }
}
