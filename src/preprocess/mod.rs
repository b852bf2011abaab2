//! Stroke preprocessing
//!
//! This module is organized into submodules:
//! - `raster`: fixed-size bitmap rendering for classifier input
//! - `resample`: constant arc-length resampling
//! - `augment`: randomized geometric augmentation and hand-drawing simulation
//! - `templates`: canonical shape generators for synthetic strokes
//! - `dataset`: synthetic training dataset generation

pub mod augment;
pub mod dataset;
pub mod raster;
pub mod resample;
pub mod templates;

pub use augment::{AugmentConfig, augment, simulate_hand};
pub use dataset::{DatasetConfig, TrainingDataset};
pub use raster::{CLASSIFIER_INPUT_SIZE, FloatGrid, RasterConfig, rasterize, rasterize_with};
pub use resample::resample;

use crate::types::Point;
use glam::DVec2;

/// Sum of consecutive Euclidean distances
pub fn path_length(points: &[Point]) -> f64 {
    points.windows(2).map(|w| w[0].distance(w[1])).sum()
}

/// Mean of all points. `None` for an empty stroke.
pub fn centroid(points: &[Point]) -> Option<Point> {
    if points.is_empty() {
        return None;
    }
    let sum: DVec2 = points.iter().map(|p| p.to_dvec2()).sum();
    Some(Point::from_dvec2(sum / points.len() as f64))
}

/// Distance from `p` to the segment `a`-`b`, with the projection clamped to
/// the segment so points beyond either end measure to that endpoint.
pub fn point_segment_distance(p: Point, a: Point, b: Point) -> f64 {
    let (p, a, b) = (p.to_dvec2(), a.to_dvec2(), b.to_dvec2());
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq == 0.0 {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}
