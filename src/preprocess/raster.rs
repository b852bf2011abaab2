//! Rasterization of strokes into fixed-size float bitmaps.

use serde::{Deserialize, Serialize};

use crate::types::{BBox, Point};

/// Input resolution of the shipped classifier
pub const CLASSIFIER_INPUT_SIZE: usize = 48;

/// Raster settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RasterConfig {
    /// Grid side length in cells
    pub size: usize,
    /// Padding on each side, as a fraction of `size`
    pub padding_ratio: f64,
    /// Radius of the disk stamped along the path, in cells
    pub stroke_radius: f64,
}

impl Default for RasterConfig {
    fn default() -> Self {
        Self {
            size: CLASSIFIER_INPUT_SIZE,
            padding_ratio: 0.1,
            stroke_radius: 1.5,
        }
    }
}

impl RasterConfig {
    pub fn with_size(size: usize) -> Self {
        Self { size, ..Self::default() }
    }
}

/// Square row-major grid of `f32` cells, `0.0` (blank) or `1.0` (ink).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloatGrid {
    size: usize,
    cells: Vec<f32>,
}

impl FloatGrid {
    pub fn new(size: usize) -> Self {
        Self { size, cells: vec![0.0; size * size] }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn cells(&self) -> &[f32] {
        &self.cells
    }

    /// Cell at column `x`, row `y`, or `None` outside the grid.
    pub fn get(&self, x: usize, y: usize) -> Option<f32> {
        if x >= self.size {
            return None;
        }
        self.cells.get(y * self.size + x).copied()
    }

    /// Light the cell at signed coordinates; out-of-range writes are dropped.
    fn light(&mut self, x: i64, y: i64) {
        let size = self.size as i64;
        if (0..size).contains(&x) && (0..size).contains(&y) {
            self.cells[(y * size + x) as usize] = 1.0;
        }
    }

    pub fn lit_count(&self) -> usize {
        self.cells.iter().filter(|&&c| c > 0.0).count()
    }

    /// One text row per grid row: `#` for ink, `.` for blank.
    pub fn to_ascii(&self) -> String {
        self.cells
            .chunks(self.size.max(1))
            .map(|row| row.iter().map(|&c| if c > 0.0 { '#' } else { '.' }).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Rasterize with the default padding and stroke radius at `size`×`size`.
pub fn rasterize(points: &[Point], size: usize) -> FloatGrid {
    rasterize_with(points, &RasterConfig::with_size(size))
}

/// Rasterize a stroke, scaled uniformly to fit inside the padded grid and
/// centred on both axes.
///
/// Degenerate input: an empty stroke yields an empty grid; a stroke whose
/// bounding box has zero width and zero height yields a single disk at the
/// grid centre. A stroke with only one zero extent is scaled by the other.
pub fn rasterize_with(points: &[Point], config: &RasterConfig) -> FloatGrid {
    let size = config.size;
    let mut grid = FloatGrid::new(size);
    if points.is_empty() || size == 0 {
        return grid;
    }

    let bb = BBox::from_points(points);
    let (w, h) = (bb.width(), bb.height());
    let extent = w.max(h);
    let sizef = size as f64;

    if extent == 0.0 || !extent.is_finite() {
        stamp(&mut grid, sizef / 2.0, sizef / 2.0, config.stroke_radius);
        return grid;
    }

    let padding = sizef * config.padding_ratio;
    let scale = (sizef - 2.0 * padding) / extent;
    let offset_x = (sizef - w * scale) / 2.0;
    let offset_y = (sizef - h * scale) / 2.0;

    let norm: Vec<(f64, f64)> = points
        .iter()
        .map(|p| ((p.x - bb.min.x) * scale + offset_x, (p.y - bb.min.y) * scale + offset_y))
        .collect();

    if let [(x, y)] = norm[..] {
        stamp(&mut grid, x, y, config.stroke_radius);
        return grid;
    }

    for pair in norm.windows(2) {
        let (x1, y1) = pair[0];
        let (x2, y2) = pair[1];
        let (dx, dy) = (x2 - x1, y2 - y1);
        let steps = ((dx.abs().max(dy.abs()) * 2.0).ceil() as usize).max(1);
        for s in 0..=steps {
            let t = s as f64 / steps as f64;
            stamp(&mut grid, x1 + t * dx, y1 + t * dy, config.stroke_radius);
        }
    }

    grid
}

/// Light every cell whose integer offset from `(cx, cy)` lies within `radius`.
fn stamp(grid: &mut FloatGrid, cx: f64, cy: f64, radius: f64) {
    let reach = radius.ceil() as i64 + 1;
    for wx in -reach..=reach {
        for wy in -reach..=reach {
            let (fx, fy) = (wx as f64, wy as f64);
            if (fx * fx + fy * fy).sqrt() <= radius {
                grid.light((cx + fx).round() as i64, (cy + fy).round() as i64);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_stroke_gives_empty_grid() {
        let grid = rasterize(&[], 16);
        assert_eq!(grid.size(), 16);
        assert_eq!(grid.lit_count(), 0);
    }

    #[test]
    fn single_point_stamps_centre_disk() {
        let grid = rasterize(&[Point::new(42.0, -7.0)], 8);
        insta::assert_snapshot!(grid.to_ascii(), @r"
        ........
        ........
        ........
        ...###..
        ...###..
        ...###..
        ........
        ........
        ");
    }

    #[test]
    fn coincident_points_use_centre_policy() {
        let p = Point::new(5.0, 5.0);
        assert_eq!(rasterize(&[p, p, p], 8), rasterize(&[p], 8));
    }

    #[test]
    fn horizontal_line_scales_by_width() {
        let grid = rasterize(&[Point::new(0.0, 0.0), Point::new(10.0, 0.0)], 8);
        insta::assert_snapshot!(grid.to_ascii(), @r"
        ........
        ........
        ........
        ########
        ########
        ########
        ........
        ........
        ");
    }

    #[test]
    fn rasterize_is_deterministic() {
        let pts: Vec<Point> = (0..40)
            .map(|i| {
                let a = i as f64 / 40.0 * std::f64::consts::TAU;
                Point::new(50.0 + 30.0 * a.cos(), 50.0 + 20.0 * a.sin())
            })
            .collect();
        let a = rasterize(&pts, CLASSIFIER_INPUT_SIZE);
        let b = rasterize(&pts, CLASSIFIER_INPUT_SIZE);
        assert_eq!(a, b);
        assert!(a.lit_count() > 0);
    }

    #[test]
    fn ink_stays_inside_padding_for_square() {
        let pts = [
            Point::new(0.0, 0.0),
            Point::new(100.0, 0.0),
            Point::new(100.0, 100.0),
            Point::new(0.0, 100.0),
            Point::new(0.0, 0.0),
        ];
        let grid = rasterize(&pts, 20);
        // corners land on (2,2) and (18,18); the disk reaches one cell out
        for i in 0..20 {
            assert_eq!(grid.get(i, 0), Some(0.0));
            assert_eq!(grid.get(0, i), Some(0.0));
        }
        assert_eq!(grid.get(1, 10), Some(1.0));
        assert_eq!(grid.get(19, 10), Some(1.0));
        assert_eq!(grid.get(2, 2), Some(1.0));
        assert_eq!(grid.get(18, 18), Some(1.0));
        assert_eq!(grid.get(10, 10), Some(0.0));
    }

    #[test]
    fn get_outside_grid_is_none() {
        let grid = rasterize(&[Point::new(0.0, 0.0), Point::new(10.0, 10.0)], 8);
        assert!(grid.get(7, 7).is_some());
        assert_eq!(grid.get(8, 0), None);
        assert_eq!(grid.get(0, 8), None);
        assert_eq!(FloatGrid::new(0).get(0, 0), None);
    }
}
