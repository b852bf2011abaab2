//! Value types shared by every stage: page-space points, offsets, bounding
//! boxes, confidence scores and the zoom level used to scale snap radii.

use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub};

use glam::{DVec2, dvec2};
use serde::{Deserialize, Serialize};

/// Error type for invalid numeric values
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumericError {
    /// Value is NaN
    NaN,
    /// Value is infinite
    Infinite,
    /// Value is zero when non-zero required
    Zero,
    /// Value is negative when positive required
    Negative,
}

impl fmt::Display for NumericError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumericError::NaN => write!(f, "value is NaN"),
            NumericError::Infinite => write!(f, "value is infinite"),
            NumericError::Zero => write!(f, "value is zero"),
            NumericError::Negative => write!(f, "value is negative"),
        }
    }
}

impl std::error::Error for NumericError {}

/// A 2-D coordinate in page space.
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }

    #[inline]
    pub fn to_dvec2(self) -> DVec2 {
        dvec2(self.x, self.y)
    }

    #[inline]
    pub fn from_dvec2(v: DVec2) -> Self {
        Point { x: v.x, y: v.y }
    }

    /// Euclidean distance to another point
    #[inline]
    pub fn distance(self, other: Point) -> f64 {
        self.to_dvec2().distance(other.to_dvec2())
    }

    /// Linear interpolation toward `other` (`t = 0` is `self`)
    #[inline]
    pub fn lerp(self, other: Point, t: f64) -> Point {
        Point::from_dvec2(self.to_dvec2().lerp(other.to_dvec2(), t))
    }

    /// Calculate the midpoint between two points
    pub fn midpoint(self, other: Self) -> Self {
        self.lerp(other, 0.5)
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Point { x, y }
    }
}

/// A displacement vector (not an absolute position).
/// Point + Offset = Point, Point - Point = Offset.
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct Offset {
    pub dx: f64,
    pub dy: f64,
}

impl Offset {
    pub const ZERO: Offset = Offset { dx: 0.0, dy: 0.0 };

    pub const fn new(dx: f64, dy: f64) -> Self {
        Offset { dx, dy }
    }

    pub fn length(self) -> f64 {
        dvec2(self.dx, self.dy).length()
    }
}

impl Add<Offset> for Point {
    type Output = Point;
    fn add(self, rhs: Offset) -> Point {
        Point { x: self.x + rhs.dx, y: self.y + rhs.dy }
    }
}

impl AddAssign<Offset> for Point {
    fn add_assign(&mut self, rhs: Offset) {
        self.x += rhs.dx;
        self.y += rhs.dy;
    }
}

impl Sub<Point> for Point {
    type Output = Offset;
    fn sub(self, rhs: Point) -> Offset {
        Offset { dx: self.x - rhs.x, dy: self.y - rhs.y }
    }
}

impl Mul<f64> for Offset {
    type Output = Offset;
    fn mul(self, rhs: f64) -> Offset {
        Offset { dx: self.dx * rhs, dy: self.dy * rhs }
    }
}

/// Axis-aligned bounding box
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    pub min: Point,
    pub max: Point,
}

impl Default for BBox {
    fn default() -> Self {
        Self::new()
    }
}

impl BBox {
    /// Create an empty bounding box (will expand on first point)
    pub fn new() -> Self {
        BBox {
            min: Point { x: f64::MAX, y: f64::MAX },
            max: Point { x: f64::MIN, y: f64::MIN },
        }
    }

    /// Box spanning `origin` to `origin + (width, height)`
    pub fn from_origin_size(origin: Point, width: f64, height: f64) -> Self {
        BBox {
            min: origin,
            max: Point::new(origin.x + width, origin.y + height),
        }
    }

    /// Smallest box containing every point. Empty input gives an empty box.
    pub fn from_points(points: &[Point]) -> Self {
        let mut bb = BBox::new();
        for &p in points {
            bb.expand_point(p);
        }
        bb
    }

    /// Check if the bbox is empty (never expanded)
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y
    }

    /// Expand to include a point
    pub fn expand_point(&mut self, p: Point) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
    }

    pub fn width(&self) -> f64 {
        if self.is_empty() { 0.0 } else { self.max.x - self.min.x }
    }

    pub fn height(&self) -> f64 {
        if self.is_empty() { 0.0 } else { self.max.y - self.min.y }
    }

    pub fn center(&self) -> Point {
        self.min.midpoint(self.max)
    }

    /// Map a normalized `(u, v)` in `[0,1]²` to page space.
    pub fn point_at(&self, u: f64, v: f64) -> Point {
        Point::new(self.min.x + u * self.width(), self.min.y + v * self.height())
    }

    pub fn translated(&self, offset: Offset) -> BBox {
        BBox { min: self.min + offset, max: self.max + offset }
    }
}

/// Recognizer confidence, always within `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(from = "f64", into = "f64")]
pub struct Confidence(f64);

impl Confidence {
    pub const ZERO: Confidence = Confidence(0.0);
    pub const ONE: Confidence = Confidence(1.0);

    /// Clamp into `[0, 1]`. NaN becomes zero.
    pub fn new(val: f64) -> Self {
        if val.is_nan() {
            Confidence(0.0)
        } else {
            Confidence(val.clamp(0.0, 1.0))
        }
    }

    #[inline]
    pub fn raw(self) -> f64 {
        self.0
    }

    /// `true` when strictly above `threshold`
    #[inline]
    pub fn exceeds(self, threshold: f64) -> bool {
        self.0 > threshold
    }
}

impl From<f64> for Confidence {
    fn from(val: f64) -> Self {
        Confidence::new(val)
    }
}

impl From<Confidence> for f64 {
    fn from(c: Confidence) -> f64 {
        c.0
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}", self.0)
    }
}

/// Editor zoom level; converts screen-pixel radii into page units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Zoom(f64);

impl Zoom {
    pub const ONE: Zoom = Zoom(1.0);

    /// Create a Zoom with validation (rejects NaN, infinite, zero, negative)
    pub fn try_new(level: f64) -> Result<Self, NumericError> {
        if level.is_nan() {
            Err(NumericError::NaN)
        } else if level.is_infinite() {
            Err(NumericError::Infinite)
        } else if level == 0.0 {
            Err(NumericError::Zero)
        } else if level < 0.0 {
            Err(NumericError::Negative)
        } else {
            Ok(Zoom(level))
        }
    }

    #[inline]
    pub fn level(self) -> f64 {
        self.0
    }

    /// Screen pixels → page units
    #[inline]
    pub fn screen_to_page(self, px: f64) -> f64 {
        px / self.0
    }
}

impl Default for Zoom {
    fn default() -> Self {
        Zoom::ONE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_distance_and_midpoint() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(3.0, 4.0);
        assert_eq!(a.distance(b), 5.0);
        assert_eq!(a.midpoint(b), Point::new(1.5, 2.0));
    }

    #[test]
    fn point_plus_offset_gives_point() {
        let p = Point::new(1.0, 2.0);
        let o = Offset::new(3.0, 4.0);
        assert_eq!(p + o, Point::new(4.0, 6.0));
    }

    #[test]
    fn point_minus_point_gives_offset() {
        let offset = Point::new(5.0, 7.0) - Point::new(2.0, 3.0);
        assert_eq!(offset, Offset::new(3.0, 4.0));
    }

    #[test]
    fn bbox_new_is_empty() {
        let bb = BBox::new();
        assert!(bb.is_empty());
        assert_eq!(bb.width(), 0.0);
    }

    #[test]
    fn bbox_from_points() {
        let bb = BBox::from_points(&[
            Point::new(1.0, 2.0),
            Point::new(5.0, 8.0),
            Point::new(3.0, -1.0),
        ]);
        assert_eq!(bb.min, Point::new(1.0, -1.0));
        assert_eq!(bb.max, Point::new(5.0, 8.0));
        assert_eq!(bb.width(), 4.0);
        assert_eq!(bb.height(), 9.0);
    }

    #[test]
    fn bbox_point_at_maps_normalized_coords() {
        let bb = BBox::from_origin_size(Point::new(10.0, 20.0), 100.0, 50.0);
        assert_eq!(bb.point_at(0.5, 0.0), Point::new(60.0, 20.0));
        assert_eq!(bb.point_at(1.0, 0.5), Point::new(110.0, 45.0));
        assert_eq!(bb.center(), Point::new(60.0, 45.0));
    }

    #[test]
    fn confidence_clamps_and_maps_nan_to_zero() {
        assert_eq!(Confidence::new(1.7).raw(), 1.0);
        assert_eq!(Confidence::new(-0.2).raw(), 0.0);
        assert_eq!(Confidence::new(f64::NAN).raw(), 0.0);
        assert!(Confidence::new(0.5).exceeds(0.35));
        assert!(!Confidence::new(0.35).exceeds(0.35));
    }

    #[test]
    fn confidence_serializes_as_number() {
        let json = serde_json::to_string(&Confidence::new(0.25)).unwrap();
        assert_eq!(json, "0.25");
        let back: Confidence = serde_json::from_str("3.0").unwrap();
        assert_eq!(back, Confidence::ONE);
    }

    #[test]
    fn zoom_try_new_rejects_bad_levels() {
        assert_eq!(Zoom::try_new(0.0), Err(NumericError::Zero));
        assert_eq!(Zoom::try_new(-1.0), Err(NumericError::Negative));
        assert_eq!(Zoom::try_new(f64::NAN), Err(NumericError::NaN));
        assert_eq!(Zoom::try_new(f64::INFINITY), Err(NumericError::Infinite));
    }

    #[test]
    fn zoom_scales_screen_pixels() {
        let zoom = Zoom::try_new(2.0).unwrap();
        assert_eq!(zoom.screen_to_page(20.0), 10.0);
    }
}
