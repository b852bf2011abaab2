//! Canonical shape generators for synthetic training strokes.
//!
//! Every template is drawn on a 100×100 canvas centred at (50, 50) with
//! randomized proportions, so two calls never produce the same outline.

use std::f64::consts::{PI, TAU};

use rand::Rng;

use crate::label::ShapeLabel;
use crate::types::Point;

/// Canvas the templates are drawn on
pub const TEMPLATE_CANVAS: f64 = 100.0;

const CENTER: Point = Point::new(50.0, 50.0);

/// Rotation range in degrees applied during augmentation, per label.
/// Boxy shapes stay roughly axis-aligned so they remain distinguishable.
pub fn rotation_range(label: ShapeLabel) -> (f64, f64) {
    match label {
        ShapeLabel::Circle | ShapeLabel::Line => (-180.0, 180.0),
        ShapeLabel::Square | ShapeLabel::Rectangle | ShapeLabel::Diamond => (-15.0, 15.0),
        ShapeLabel::Triangle => (-30.0, 30.0),
        ShapeLabel::ArrowLeft | ShapeLabel::ArrowRight | ShapeLabel::ArrowUp | ShapeLabel::ArrowDown => {
            (-10.0, 10.0)
        }
        _ => (0.0, 0.0),
    }
}

/// Generate a randomized template stroke for `label`.
/// Labels without a generator return `None`.
pub fn template<R: Rng + ?Sized>(label: ShapeLabel, rng: &mut R) -> Option<Vec<Point>> {
    let pts = match label {
        ShapeLabel::Circle => circle(rng),
        ShapeLabel::Square => square(rng),
        ShapeLabel::Rectangle => rectangle(rng),
        ShapeLabel::Triangle => triangle(rng),
        ShapeLabel::ArrowLeft => arrow(rng, ArrowHeading::Left),
        ShapeLabel::ArrowRight => arrow(rng, ArrowHeading::Right),
        ShapeLabel::ArrowUp => arrow(rng, ArrowHeading::Up),
        ShapeLabel::ArrowDown => arrow(rng, ArrowHeading::Down),
        ShapeLabel::Diamond => diamond(rng),
        ShapeLabel::Line => line(rng),
        ShapeLabel::Star | ShapeLabel::Pentagon | ShapeLabel::Hexagon | ShapeLabel::Unknown => {
            return None;
        }
    };
    Some(pts)
}

/// `n` points evenly spaced from `a` to `b`, both ends included
fn lerp_points(a: Point, b: Point, n: usize) -> impl Iterator<Item = Point> {
    let denom = n.saturating_sub(1).max(1) as f64;
    (0..n).map(move |i| a.lerp(b, i as f64 / denom))
}

/// Spread roughly `total` points along consecutive polygon edges in
/// proportion to edge length.
fn along_edges(vertices: &[Point], total: usize) -> Vec<Point> {
    let lengths: Vec<f64> = vertices.windows(2).map(|w| w[0].distance(w[1])).collect();
    let sum: f64 = lengths.iter().sum();
    if sum == 0.0 {
        return vec![vertices[0]; total];
    }
    let mut pts = Vec::with_capacity(total + vertices.len() * 2);
    for (edge, len) in vertices.windows(2).zip(&lengths) {
        let n = ((total as f64 * len / sum).round() as usize).max(2);
        pts.extend(lerp_points(edge[0], edge[1], n));
    }
    pts.truncate(total);
    pts
}

fn circle<R: Rng + ?Sized>(rng: &mut R) -> Vec<Point> {
    let base_r = rng.gen_range(25.0..40.0);
    let eccentricity = rng.gen_range(0.85..1.15);
    let n = rng.gen_range(50..=80);
    let start = rng.gen_range(0.0..TAU);
    (0..=n)
        .map(|i| {
            let theta = start + i as f64 / n as f64 * TAU;
            let r = base_r * (1.0 + rng.gen_range(-0.08..0.08));
            Point::new(
                CENTER.x + r * eccentricity * theta.cos(),
                CENTER.y + r / eccentricity * theta.sin(),
            )
        })
        .collect()
}

fn square<R: Rng + ?Sized>(rng: &mut R) -> Vec<Point> {
    let size = rng.gen_range(40.0..65.0);
    let half = size / 2.0;
    let skew = rng.gen_range(-0.08..0.08);
    let v: [f64; 4] = std::array::from_fn(|_| rng.gen_range(0.9..1.1));
    let (cx, cy) = (CENTER.x, CENTER.y);
    let corners = [
        Point::new(cx - half * v[0], cy - half * v[1]),
        Point::new(cx + half * v[0], cy - half * v[1] + skew * size),
        Point::new(cx + half * v[2] + skew * size, cy + half * v[3]),
        Point::new(cx - half * v[2], cy + half * v[3]),
        Point::new(cx - half * v[0], cy - half * v[1]),
    ];
    let n = rng.gen_range(40..=70);
    along_edges(&corners, n)
}

fn rectangle<R: Rng + ?Sized>(rng: &mut R) -> Vec<Point> {
    let w = rng.gen_range(50.0..80.0);
    let h = w / rng.gen_range(1.4..2.8);
    let skew = rng.gen_range(-0.06..0.06);
    let (cx, cy) = (CENTER.x, CENTER.y);
    let mut corners = [
        Point::new(cx - w / 2.0, cy - h / 2.0),
        Point::new(cx + w / 2.0, cy - h / 2.0 + skew * h),
        Point::new(cx + w / 2.0 + skew * w, cy + h / 2.0),
        Point::new(cx - w / 2.0, cy + h / 2.0),
        Point::new(cx - w / 2.0, cy - h / 2.0),
    ];
    // Portrait half of the time
    if rng.gen_bool(0.5) {
        for c in &mut corners {
            *c = Point::new(c.y, c.x);
        }
    }
    let n = rng.gen_range(40..=70);
    along_edges(&corners, n)
}

fn triangle<R: Rng + ?Sized>(rng: &mut R) -> Vec<Point> {
    let base_r = rng.gen_range(25.0..40.0);
    let mut angles: [f64; 3] = std::array::from_fn(|_| rng.gen_range(0.0..TAU));
    angles.sort_by(f64::total_cmp);
    let mut vertices: Vec<Point> = angles
        .iter()
        .map(|a| {
            let r = base_r * rng.gen_range(0.8..1.2);
            Point::new(CENTER.x + r * a.cos(), CENTER.y + r * a.sin())
        })
        .collect();
    vertices.push(vertices[0]);
    let n = rng.gen_range(35..=60);
    along_edges(&vertices, n)
}

#[derive(Clone, Copy)]
enum ArrowHeading {
    Left,
    Right,
    Up,
    Down,
}

impl ArrowHeading {
    /// Unit direction of travel (screen coordinates, y down)
    fn dir(self) -> (f64, f64) {
        match self {
            ArrowHeading::Left => (-1.0, 0.0),
            ArrowHeading::Right => (1.0, 0.0),
            ArrowHeading::Up => (0.0, -1.0),
            ArrowHeading::Down => (0.0, 1.0),
        }
    }
}

/// Curved shaft followed by a two-wing head: shaft, wing, tip, wing.
fn arrow<R: Rng + ?Sized>(rng: &mut R, heading: ArrowHeading) -> Vec<Point> {
    let length = rng.gen_range(45.0..70.0);
    let head_size = rng.gen_range(14.0..24.0);
    let head_angle = PI / 6.0 + rng.gen_range(-0.15..0.15);
    let shaft_points = rng.gen_range(20..=40);
    let curvature = rng.gen_range(-3.0..3.0);

    let (dx, dy) = heading.dir();
    let start = Point::new(CENTER.x - dx * length / 2.0, CENTER.y - dy * length / 2.0);
    let tip = Point::new(CENTER.x + dx * length / 2.0, CENTER.y + dy * length / 2.0);
    let (px, py) = (-dy, dx);

    let mut pts: Vec<Point> = (0..shaft_points)
        .map(|i| {
            let t = i as f64 / (shaft_points - 1) as f64;
            let bend = curvature * (t * PI).sin();
            let p = start.lerp(tip, t);
            Point::new(p.x + px * bend, p.y + py * bend)
        })
        .collect();

    let angle = dy.atan2(dx);
    let wing = |a: f64| Point::new(tip.x - head_size * a.cos(), tip.y - head_size * a.sin());
    pts.push(wing(angle - head_angle));
    pts.push(tip);
    pts.push(wing(angle + head_angle));
    pts
}

/// Taller than wide so it reads differently from a rotated square.
fn diamond<R: Rng + ?Sized>(rng: &mut R) -> Vec<Point> {
    let size = rng.gen_range(40.0..65.0);
    let h_stretch = rng.gen_range(1.1..1.5);
    let w_stretch = rng.gen_range(0.7..1.0);
    let v: [f64; 4] = std::array::from_fn(|_| rng.gen_range(0.93..1.07));
    let (cx, cy) = (CENTER.x, CENTER.y);
    let half = size / 2.0;
    let top = Point::new(cx, cy - half * h_stretch * v[0]);
    let corners = [
        top,
        Point::new(cx + half * w_stretch * v[1], cy),
        Point::new(cx, cy + half * h_stretch * v[2]),
        Point::new(cx - half * w_stretch * v[3], cy),
        top,
    ];
    let n = rng.gen_range(35..=60);
    along_edges(&corners, n)
}

fn line<R: Rng + ?Sized>(rng: &mut R) -> Vec<Point> {
    let length = rng.gen_range(45.0..80.0);
    let angle = rng.gen_range(0.0..PI);
    let (c, s) = (angle.cos(), angle.sin());
    let a = Point::new(CENTER.x - length / 2.0 * c, CENTER.y - length / 2.0 * s);
    let b = Point::new(CENTER.x + length / 2.0 * c, CENTER.y + length / 2.0 * s);
    let n = rng.gen_range(20..=40);
    let curvature = rng.gen_range(-2.0..2.0);
    let (px, py) = (-s, c);
    (0..n)
        .map(|i| {
            let t = i as f64 / (n - 1) as f64;
            let bend = curvature * (t * PI).sin();
            let p = a.lerp(b, t);
            Point::new(p.x + px * bend, p.y + py * bend)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BBox;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn every_vocabulary_label_has_a_template() {
        let mut rng = StdRng::seed_from_u64(7);
        for label in ShapeLabel::CLASSIFIER_VOCABULARY {
            let pts = template(label, &mut rng).expect("vocabulary label");
            assert!(pts.len() >= 3, "{label}: {} points", pts.len());
            let bb = BBox::from_points(&pts);
            assert!(bb.min.x > -10.0 && bb.max.x < TEMPLATE_CANVAS + 10.0, "{label}: {bb:?}");
            assert!(bb.min.y > -10.0 && bb.max.y < TEMPLATE_CANVAS + 10.0, "{label}: {bb:?}");
        }
    }

    #[test]
    fn untrained_labels_have_no_template() {
        let mut rng = StdRng::seed_from_u64(7);
        assert!(template(ShapeLabel::Star, &mut rng).is_none());
        assert!(template(ShapeLabel::Unknown, &mut rng).is_none());
    }

    #[test]
    fn closed_templates_end_near_their_start() {
        let mut rng = StdRng::seed_from_u64(11);
        for label in [ShapeLabel::Circle, ShapeLabel::Square, ShapeLabel::Diamond] {
            let pts = template(label, &mut rng).unwrap();
            let gap = pts[0].distance(pts[pts.len() - 1]);
            assert!(gap < 20.0, "{label}: gap {gap}");
        }
    }

    #[test]
    fn arrow_right_tip_is_rightmost() {
        let mut rng = StdRng::seed_from_u64(3);
        let pts = template(ShapeLabel::ArrowRight, &mut rng).unwrap();
        let tip = pts[pts.len() - 2];
        let max_x = pts.iter().map(|p| p.x).fold(f64::MIN, f64::max);
        assert!((tip.x - max_x).abs() < 1e-9, "tip {tip:?}, max x {max_x}");
    }
}
