//! Randomized augmentation for synthetic training strokes.
//!
//! None of this runs at inference time. Every function takes the RNG
//! explicitly so a seeded generator reproduces a dataset exactly.

use std::f64::consts::TAU;
use std::ops::RangeInclusive;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::label::ShapeLabel;
use crate::types::{Offset, Point};

use super::resample::resample;
use super::templates::{TEMPLATE_CANVAS, rotation_range};
use super::centroid;

/// Ranges sampled by [`augment`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AugmentConfig {
    /// Rotation about the centroid, degrees
    pub rotation_deg: (f64, f64),
    /// Uniform scale factor about the centroid
    pub scale: (f64, f64),
    /// Maximum translation on each axis as a fraction of `canvas_size`
    pub translate_fraction: f64,
    pub canvas_size: f64,
    /// Standard deviation of per-point Gaussian noise
    pub noise_std: (f64, f64),
    /// Output point count after resampling
    pub point_count: RangeInclusive<usize>,
}

impl Default for AugmentConfig {
    fn default() -> Self {
        Self {
            rotation_deg: (-15.0, 15.0),
            scale: (0.6, 1.8),
            translate_fraction: 0.08,
            canvas_size: TEMPLATE_CANVAS,
            noise_std: (0.3, 1.5),
            point_count: 32..=64,
        }
    }
}

impl AugmentConfig {
    /// Default ranges with the rotation range tuned for `label`
    pub fn for_label(label: ShapeLabel) -> Self {
        Self {
            rotation_deg: rotation_range(label),
            ..Self::default()
        }
    }
}

/// Sample uniformly from `(lo, hi)`; a collapsed range returns `lo`.
fn uniform<R: Rng + ?Sized>(rng: &mut R, (lo, hi): (f64, f64)) -> f64 {
    if hi > lo { rng.gen_range(lo..hi) } else { lo }
}

/// Standard normal sample via the Box–Muller transform.
pub fn gaussian<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    // u1 in (0, 1] keeps ln() finite
    let u1 = 1.0 - rng.gen_range(0.0..1.0);
    let u2: f64 = rng.gen_range(0.0..1.0);
    (-2.0 * f64::ln(u1)).sqrt() * (TAU * u2).cos()
}

/// Apply rotation, scale, translation, Gaussian noise and resampling, in
/// that order.
pub fn augment<R: Rng + ?Sized>(template: &[Point], config: &AugmentConfig, rng: &mut R) -> Vec<Point> {
    let Some(c) = centroid(template) else {
        return Vec::new();
    };

    let angle = uniform(rng, config.rotation_deg).to_radians();
    let factor = uniform(rng, config.scale);
    let max_shift = config.translate_fraction * config.canvas_size;
    let shift = Offset::new(
        uniform(rng, (-max_shift, max_shift)),
        uniform(rng, (-max_shift, max_shift)),
    );
    let noise = uniform(rng, config.noise_std);

    let (sin, cos) = angle.sin_cos();
    let mut pts: Vec<Point> = template
        .iter()
        .map(|p| {
            let (dx, dy) = (p.x - c.x, p.y - c.y);
            let rotated = Point::new(c.x + dx * cos - dy * sin, c.y + dx * sin + dy * cos);
            let scaled = c + (rotated - c) * factor;
            scaled + shift
        })
        .collect();

    for p in &mut pts {
        *p += Offset::new(gaussian(rng) * noise, gaussian(rng) * noise);
    }

    let lo = *config.point_count.start();
    let hi = *config.point_count.end();
    let count = if hi > lo { rng.gen_range(lo..=hi) } else { lo };
    resample(&pts, count.max(2))
}

/// Simulate the imperfections of a real pen: tremor, unfinished loops,
/// uneven sampling speed and slow drift.
pub fn simulate_hand<R: Rng + ?Sized>(points: &[Point], label: ShapeLabel, rng: &mut R) -> Vec<Point> {
    let intensity = rng.gen_range(0.5..2.5);
    let mut pts = hand_wobble(points, intensity, rng);

    if label.is_closed() && rng.gen_bool(0.4) {
        let keep = rng.gen_range(0.80..0.95);
        let n = ((pts.len() as f64 * keep) as usize).max(3).min(pts.len());
        pts.truncate(n);
    }

    if rng.gen_bool(0.5) {
        pts = vary_speed(&pts, rng);
    }

    if rng.gen_bool(0.6) {
        let alpha = rng.gen_range(2.0..6.0);
        pts = elastic_deform(&pts, alpha, 3.0, rng);
    }

    pts
}

/// Displace each point along the local normal by two low-frequency sines
/// plus Gaussian tremor.
fn hand_wobble<R: Rng + ?Sized>(points: &[Point], intensity: f64, rng: &mut R) -> Vec<Point> {
    let n = points.len();
    if n < 2 {
        return points.to_vec();
    }
    let freq1 = rng.gen_range(0.05..0.15);
    let freq2 = rng.gen_range(0.2..0.4);
    let phase1 = rng.gen_range(0.0..TAU);
    let phase2 = rng.gen_range(0.0..TAU);

    (0..n)
        .map(|i| {
            let t = i as f64 / (n - 1) as f64;
            let (a, b) = match i {
                0 => (points[0], points[1]),
                _ if i == n - 1 => (points[n - 2], points[n - 1]),
                _ => (points[i - 1], points[i + 1]),
            };
            let tangent = b - a;
            let mag = tangent.length() + 1e-8;
            let normal = Offset::new(-tangent.dy / mag, tangent.dx / mag);
            let wobble = (t * n as f64 * freq1 + phase1).sin() * intensity * 0.6
                + (t * n as f64 * freq2 + phase2).sin() * intensity * 0.3
                + gaussian(rng) * intensity * 0.3;
            points[i] + normal * wobble
        })
        .collect()
}

/// Keep every sharp turn, randomly thin out straight runs.
fn vary_speed<R: Rng + ?Sized>(points: &[Point], rng: &mut R) -> Vec<Point> {
    if points.len() < 5 {
        return points.to_vec();
    }
    let turn = |i: usize| -> f64 {
        if i == 0 || i == points.len() - 1 {
            return 0.0;
        }
        let v1 = points[i] - points[i - 1];
        let v2 = points[i + 1] - points[i];
        let cross = (v1.dx * v2.dy - v1.dy * v2.dx).abs();
        let dot = v1.dx * v2.dx + v1.dy * v2.dy;
        cross.atan2(dot + 1e-8)
    };

    let mut out = vec![points[0]];
    for (i, &p) in points.iter().enumerate().skip(1) {
        let keep_prob = 0.3 + 0.7 * (turn(i) / 0.5).min(1.0);
        if rng.gen_bool(keep_prob.clamp(0.0, 1.0)) {
            out.push(p);
        }
    }
    if out.len() < 3 { points.to_vec() } else { out }
}

/// Random per-point displacement smoothed by a Gaussian kernel.
fn elastic_deform<R: Rng + ?Sized>(points: &[Point], alpha: f64, sigma: f64, rng: &mut R) -> Vec<Point> {
    let n = points.len();
    if n < 2 {
        return points.to_vec();
    }
    let dx: Vec<f64> = (0..n).map(|_| gaussian(rng) * alpha).collect();
    let dy: Vec<f64> = (0..n).map(|_| gaussian(rng) * alpha).collect();

    let kernel = gaussian_kernel(sigma);
    let dx = convolve_same(&dx, &kernel);
    let dy = convolve_same(&dy, &kernel);

    points
        .iter()
        .enumerate()
        .map(|(i, &p)| p + Offset::new(dx[i], dy[i]))
        .collect()
}

/// Odd-length normalized kernel sampled over `[-2, 2]`
fn gaussian_kernel(sigma: f64) -> Vec<f64> {
    let size = ((sigma * 2.0) as usize | 1).max(3);
    let raw: Vec<f64> = (0..size)
        .map(|i| {
            let x = -2.0 + 4.0 * i as f64 / (size - 1) as f64;
            (-0.5 * x * x).exp()
        })
        .collect();
    let sum: f64 = raw.iter().sum();
    raw.into_iter().map(|k| k / sum).collect()
}

/// Convolution whose output has the length of `signal`, zero-padded.
fn convolve_same(signal: &[f64], kernel: &[f64]) -> Vec<f64> {
    let half = kernel.len() / 2;
    (0..signal.len())
        .map(|i| {
            kernel
                .iter()
                .enumerate()
                .filter_map(|(k, w)| {
                    let j = (i + half).checked_sub(k)?;
                    signal.get(j).map(|s| s * w)
                })
                .sum()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preprocess::path_length;
    use crate::preprocess::raster::{CLASSIFIER_INPUT_SIZE, rasterize};
    use crate::preprocess::templates::template;
    use crate::types::BBox;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn square() -> Vec<Point> {
        vec![
            Point::new(0.0, 0.0),
            Point::new(100.0, 0.0),
            Point::new(100.0, 100.0),
            Point::new(0.0, 100.0),
            Point::new(0.0, 0.0),
        ]
    }

    #[test]
    fn gaussian_has_unit_spread() {
        let mut rng = StdRng::seed_from_u64(1);
        let samples: Vec<f64> = (0..20_000).map(|_| gaussian(&mut rng)).collect();
        let mean = samples.iter().sum::<f64>() / samples.len() as f64;
        let var = samples.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / samples.len() as f64;
        assert!(mean.abs() < 0.05, "mean {mean}");
        assert!((var - 1.0).abs() < 0.05, "variance {var}");
    }

    #[test]
    fn identity_config_only_resamples() {
        let config = AugmentConfig {
            rotation_deg: (0.0, 0.0),
            scale: (1.0, 1.0),
            translate_fraction: 0.0,
            noise_std: (0.0, 0.0),
            point_count: 9..=9,
            ..AugmentConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(5);
        let out = augment(&square(), &config, &mut rng);
        assert_eq!(out.len(), 9);
        assert!((path_length(&out) - 400.0).abs() < 1e-6);
        assert!(out[2].distance(Point::new(100.0, 0.0)) < 1e-9);
    }

    #[test]
    fn rotation_keeps_centroid() {
        let config = AugmentConfig {
            rotation_deg: (90.0, 90.0),
            scale: (1.0, 1.0),
            translate_fraction: 0.0,
            noise_std: (0.0, 0.0),
            point_count: 5..=5,
            ..AugmentConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(5);
        let pts = [Point::new(0.0, 0.0), Point::new(10.0, 0.0)];
        let out = augment(&pts, &config, &mut rng);
        let bb = BBox::from_points(&out);
        assert!(bb.width() < 1e-9);
        assert!((bb.height() - 10.0).abs() < 1e-9);
        assert!(out[0].distance(Point::new(5.0, -5.0)) < 1e-9);
    }

    #[test]
    fn point_count_stays_in_range() {
        let config = AugmentConfig::default();
        let mut rng = StdRng::seed_from_u64(99);
        for _ in 0..50 {
            let n = augment(&square(), &config, &mut rng).len();
            assert!(config.point_count.contains(&n), "{n}");
        }
    }

    #[test]
    fn augment_then_rasterize_always_inks() {
        let mut rng = StdRng::seed_from_u64(2024);
        for label in ShapeLabel::CLASSIFIER_VOCABULARY {
            let config = AugmentConfig::for_label(label);
            for _ in 0..25 {
                let base = template(label, &mut rng).unwrap();
                let hand = simulate_hand(&base, label, &mut rng);
                let stroke = augment(&hand, &config, &mut rng);
                let grid = rasterize(&stroke, CLASSIFIER_INPUT_SIZE);
                assert!(grid.lit_count() > 0, "{label} erased");
            }
        }
    }

    #[test]
    fn simulate_hand_keeps_a_circle_recognizable() {
        let mut rng = StdRng::seed_from_u64(17);
        for _ in 0..20 {
            let base = template(ShapeLabel::Circle, &mut rng).unwrap();
            let hand = simulate_hand(&base, ShapeLabel::Circle, &mut rng);
            assert!(hand.len() >= 3);
            let bb = BBox::from_points(&hand);
            assert!(bb.width() > 30.0 && bb.height() > 30.0, "{bb:?}");
            let c = centroid(&hand).unwrap();
            assert!(c.distance(Point::new(50.0, 50.0)) < 20.0, "{c:?}");
        }
    }

    #[test]
    fn kernel_is_normalized_and_odd() {
        let k = gaussian_kernel(3.0);
        assert_eq!(k.len(), 7);
        assert!((k.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        assert_eq!(k[0], k[6]);
    }

    #[test]
    fn convolve_same_preserves_length() {
        let out = convolve_same(&[0.0, 0.0, 3.0, 0.0, 0.0], &[0.25, 0.5, 0.25]);
        assert_eq!(out, vec![0.0, 0.75, 1.5, 0.75, 0.0]);
    }
}
