//! Constant arc-length resampling.

use crate::types::Point;

use super::path_length;

/// Resample a polyline to exactly `target_count` points spaced evenly by arc
/// length.
///
/// Walks the polyline accumulating distance and emits a point each time the
/// accumulated distance reaches `total / (target_count - 1)`. Floating-point
/// drift can end the walk one point early; the tail is padded with the last
/// input point.
pub fn resample(points: &[Point], target_count: usize) -> Vec<Point> {
    let Some(&first) = points.first() else {
        return Vec::new();
    };
    if target_count == 0 {
        return Vec::new();
    }
    let last = points[points.len() - 1];
    let total = path_length(points);
    if target_count == 1 || total == 0.0 {
        return vec![first; target_count];
    }

    let interval = total / (target_count - 1) as f64;
    let mut out = Vec::with_capacity(target_count);
    out.push(first);

    let mut acc = 0.0;
    let mut prev = first;
    let mut i = 1;
    while i < points.len() && out.len() < target_count {
        let cur = points[i];
        let d = prev.distance(cur);
        if d > 0.0 && acc + d >= interval {
            let q = prev.lerp(cur, (interval - acc) / d);
            out.push(q);
            // Continue from the emitted point along the same segment
            prev = q;
            acc = 0.0;
        } else {
            acc += d;
            prev = cur;
            i += 1;
        }
    }

    while out.len() < target_count {
        out.push(last);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Point, b: Point) -> bool {
        a.distance(b) < 1e-9
    }

    #[test]
    fn resample_straight_line_evenly() {
        let pts = [Point::new(0.0, 0.0), Point::new(10.0, 0.0)];
        let out = resample(&pts, 6);
        assert_eq!(out.len(), 6);
        for (i, p) in out.iter().enumerate() {
            assert!(close(*p, Point::new(2.0 * i as f64, 0.0)), "point {i}: {p:?}");
        }
    }

    #[test]
    fn resample_follows_corners() {
        let pts = [Point::new(0.0, 0.0), Point::new(4.0, 0.0), Point::new(4.0, 4.0)];
        let out = resample(&pts, 3);
        assert!(close(out[0], Point::new(0.0, 0.0)));
        assert!(close(out[1], Point::new(4.0, 0.0)));
        assert!(close(out[2], Point::new(4.0, 4.0)));
    }

    #[test]
    fn resample_pads_degenerate_input() {
        let pts = [Point::new(1.0, 1.0), Point::new(1.0, 1.0)];
        assert_eq!(resample(&pts, 4), vec![Point::new(1.0, 1.0); 4]);
        assert!(resample(&[], 4).is_empty());
        assert!(resample(&pts, 0).is_empty());
    }

    #[test]
    fn resample_always_hits_target_count() {
        let pts: Vec<Point> = (0..17)
            .map(|i| Point::new((i as f64 * 0.7).sin() * 30.0, i as f64 * 3.1))
            .collect();
        for n in [2, 3, 10, 33, 64, 200] {
            assert_eq!(resample(&pts, n).len(), n);
        }
    }
}
