//! Synthetic training datasets.
//!
//! A dataset is generated, handed to a trainer and discarded. Each sample
//! runs template → hand simulation → augmentation → rasterization.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::label::ShapeLabel;
use crate::log::debug;

use super::augment::{AugmentConfig, augment, simulate_hand};
use super::raster::{FloatGrid, RasterConfig, rasterize_with};
use super::templates::{rotation_range, template};

/// Parameters for [`TrainingDataset::generate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    pub samples_per_class: usize,
    /// Classes to generate, in class-index order
    pub classes: Vec<ShapeLabel>,
    pub raster: RasterConfig,
    /// Augmentation ranges. The rotation range is replaced per class.
    pub augment: AugmentConfig,
    /// Skip [`simulate_hand`] and augment the clean template directly
    pub clean_templates: bool,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            samples_per_class: 1000,
            classes: ShapeLabel::CLASSIFIER_VOCABULARY.to_vec(),
            raster: RasterConfig::default(),
            augment: AugmentConfig::default(),
            clean_templates: false,
        }
    }
}

/// Rasterized samples with integer class labels indexing `shape_names`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingDataset {
    pub inputs: Vec<FloatGrid>,
    pub labels: Vec<usize>,
    pub shape_names: Vec<ShapeLabel>,
}

impl TrainingDataset {
    /// Generate `samples_per_class` samples for every configured class.
    /// Classes without a template generator are skipped but keep their index.
    pub fn generate<R: Rng + ?Sized>(config: &DatasetConfig, rng: &mut R) -> Self {
        let total = config.samples_per_class * config.classes.len();
        let mut inputs = Vec::with_capacity(total);
        let mut labels = Vec::with_capacity(total);

        for (class_idx, &label) in config.classes.iter().enumerate() {
            let augment_config = AugmentConfig {
                rotation_deg: rotation_range(label),
                ..config.augment.clone()
            };
            let mut generated = 0;
            for _ in 0..config.samples_per_class {
                let Some(base) = template(label, rng) else {
                    break;
                };
                let base = if config.clean_templates { base } else { simulate_hand(&base, label, rng) };
                let stroke = augment(&base, &augment_config, rng);
                inputs.push(rasterize_with(&stroke, &config.raster));
                labels.push(class_idx);
                generated += 1;
            }
            debug!(%label, generated, "generated class samples");
        }

        TrainingDataset {
            inputs,
            labels,
            shape_names: config.classes.clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }

    /// Number of samples carrying each class index
    pub fn class_counts(&self) -> Vec<usize> {
        let mut counts = vec![0; self.shape_names.len()];
        for &l in &self.labels {
            if let Some(c) = counts.get_mut(l) {
                *c += 1;
            }
        }
        counts
    }

    /// Iterate `(grid, label)` pairs
    pub fn samples(&self) -> impl Iterator<Item = (&FloatGrid, ShapeLabel)> + '_ {
        self.inputs
            .iter()
            .zip(&self.labels)
            .filter_map(|(grid, &idx)| self.shape_names.get(idx).map(|&name| (grid, name)))
    }
}
