//! Core types for spark-frames.
//!
//! These are the value types everything else builds on: points, rectangles,
//! the two layout axes, the three points an axis can be pinned at, the nine
//! named anchors, and colors handed to the renderer.

use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

// =============================================================================
// Point
// =============================================================================

/// A 2D coordinate in screen space (y grows downward).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    /// Create a new point.
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Component along an axis.
    #[inline]
    pub fn get(self, axis: Axis) -> f32 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
        }
    }

    /// Replace the component along an axis.
    #[inline]
    pub fn set(&mut self, axis: Axis, value: f32) {
        match axis {
            Axis::X => self.x = value,
            Axis::Y => self.y = value,
        }
    }

    /// Clamp each component between `min` and `max`.
    pub fn clamp(self, min: Point, max: Point) -> Self {
        Self {
            x: self.x.max(min.x).min(max.x),
            y: self.y.max(min.y).min(max.y),
        }
    }
}

impl Add for Point {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl AddAssign for Point {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl SubAssign for Point {
    fn sub_assign(&mut self, rhs: Self) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl Mul<f32> for Point {
    type Output = Self;
    fn mul(self, rhs: f32) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

// =============================================================================
// Rect
// =============================================================================

/// An axis-aligned rectangle, `start` is top-left and `end` bottom-right.
///
/// A rect whose end lies before its start on either axis is *inverted*. That
/// only happens with contradictory pins and is treated as empty, never as an
/// error.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub start: Point,
    pub end: Point,
}

impl Rect {
    /// Create a rect from its four edges.
    pub const fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            start: Point::new(left, top),
            end: Point::new(right, bottom),
        }
    }

    pub const fn from_points(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.start.x
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.start.y
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.end.x
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.end.y
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.end.x - self.start.x
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.end.y - self.start.y
    }

    /// Size as a point (may have negative components when inverted).
    pub fn size(&self) -> Point {
        self.end - self.start
    }

    /// True for zero-or-negative area rects.
    pub fn is_empty(&self) -> bool {
        self.width() <= 0.0 || self.height() <= 0.0
    }

    /// Half-open containment test; empty rects contain nothing.
    pub fn contains(&self, point: Point) -> bool {
        !self.is_empty()
            && point.x >= self.start.x
            && point.x < self.end.x
            && point.y >= self.start.y
            && point.y < self.end.y
    }

    /// Overlap of two rects. The result may be empty.
    pub fn intersect(&self, other: &Rect) -> Rect {
        Rect::new(
            self.start.x.max(other.start.x),
            self.start.y.max(other.start.y),
            self.end.x.min(other.end.x),
            self.end.y.min(other.end.y),
        )
    }

    /// Coordinate of an edge along an axis. Center is the midpoint.
    pub fn edge(&self, axis: Axis, edge: Edge) -> f32 {
        let start = self.start.get(axis);
        let end = self.end.get(axis);
        start + (end - start) * edge.fraction()
    }
}

// =============================================================================
// Axis / Edge / Anchor
// =============================================================================

/// One of the two independently resolved layout axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    pub const ALL: [Axis; 2] = [Axis::X, Axis::Y];

    #[inline]
    pub(crate) fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::X => f.write_str("X"),
            Axis::Y => f.write_str("Y"),
        }
    }
}

/// A pinnable point along one axis.
///
/// `Start` is left/top, `End` is right/bottom. `Center` sits halfway between
/// the two and is always computed from them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Edge {
    Start,
    Center,
    End,
}

impl Edge {
    pub const ALL: [Edge; 3] = [Edge::Start, Edge::Center, Edge::End];

    /// Position of this point as a fraction of the axis extent.
    #[inline]
    pub fn fraction(self) -> f32 {
        match self {
            Edge::Start => 0.0,
            Edge::Center => 0.5,
            Edge::End => 1.0,
        }
    }

    #[inline]
    pub(crate) fn index(self) -> usize {
        match self {
            Edge::Start => 0,
            Edge::Center => 1,
            Edge::End => 2,
        }
    }

    /// Human-readable name of this point on an axis (`LEFT`, `BOTTOM`, ...).
    pub fn name(self, axis: Axis) -> &'static str {
        match (axis, self) {
            (Axis::X, Edge::Start) => "LEFT",
            (Axis::X, Edge::Center) => "CENTERX",
            (Axis::X, Edge::End) => "RIGHT",
            (Axis::Y, Edge::Start) => "TOP",
            (Axis::Y, Edge::Center) => "CENTERY",
            (Axis::Y, Edge::End) => "BOTTOM",
        }
    }
}

/// The nine named reference points of a rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Anchor {
    TopLeft,
    TopCenter,
    TopRight,
    CenterLeft,
    Center,
    CenterRight,
    BottomLeft,
    BottomCenter,
    BottomRight,
}

impl Anchor {
    pub const ALL: [Anchor; 9] = [
        Anchor::TopLeft,
        Anchor::TopCenter,
        Anchor::TopRight,
        Anchor::CenterLeft,
        Anchor::Center,
        Anchor::CenterRight,
        Anchor::BottomLeft,
        Anchor::BottomCenter,
        Anchor::BottomRight,
    ];

    /// The point this anchor names on the given axis.
    pub fn edge(self, axis: Axis) -> Edge {
        let (x, y) = match self {
            Anchor::TopLeft => (Edge::Start, Edge::Start),
            Anchor::TopCenter => (Edge::Center, Edge::Start),
            Anchor::TopRight => (Edge::End, Edge::Start),
            Anchor::CenterLeft => (Edge::Start, Edge::Center),
            Anchor::Center => (Edge::Center, Edge::Center),
            Anchor::CenterRight => (Edge::End, Edge::Center),
            Anchor::BottomLeft => (Edge::Start, Edge::End),
            Anchor::BottomCenter => (Edge::Center, Edge::End),
            Anchor::BottomRight => (Edge::End, Edge::End),
        };
        match axis {
            Axis::X => x,
            Axis::Y => y,
        }
    }
}

// =============================================================================
// Color
// =============================================================================

/// Linear RGBA color with floating-point channels in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

impl Color {
    /// Create a new color.
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Create an opaque color.
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::new(r, g, b, 1.0)
    }

    pub const TRANSPARENT: Self = Self::new(0.0, 0.0, 0.0, 0.0);
    pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);
    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);
    pub const RED: Self = Self::rgb(1.0, 0.0, 0.0);
    pub const GREEN: Self = Self::rgb(0.0, 1.0, 0.0);
    pub const BLUE: Self = Self::rgb(0.0, 0.0, 1.0);
    pub const GRAY: Self = Self::rgb(0.5, 0.5, 0.5);

    /// Check if color is fully transparent.
    #[inline]
    pub fn is_transparent(&self) -> bool {
        self.a <= 0.0
    }

    /// Same color with alpha scaled by `factor`.
    #[inline]
    pub fn fade(self, factor: f32) -> Self {
        Self {
            a: self.a * factor,
            ..self
        }
    }

    /// Linear interpolation between two colors.
    pub fn lerp(a: Self, b: Self, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        let inv_t = 1.0 - t;
        Self {
            r: a.r * inv_t + b.r * t,
            g: a.g * inv_t + b.g * t,
            b: a.b * inv_t + b.b * t,
            a: a.a * inv_t + b.a * t,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_arithmetic() {
        let a = Point::new(1.0, 2.0);
        let b = Point::new(3.0, 5.0);
        assert_eq!(a + b, Point::new(4.0, 7.0));
        assert_eq!(b - a, Point::new(2.0, 3.0));
        assert_eq!(a * 2.0, Point::new(2.0, 4.0));

        let mut c = a;
        c += b;
        c -= Point::new(1.0, 1.0);
        assert_eq!(c, Point::new(3.0, 6.0));
    }

    #[test]
    fn test_point_axis_access() {
        let mut p = Point::ZERO;
        p.set(Axis::Y, 4.0);
        assert_eq!(p.get(Axis::X), 0.0);
        assert_eq!(p.get(Axis::Y), 4.0);
    }

    #[test]
    fn test_rect_contains_is_half_open() {
        let r = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(r.contains(Point::new(0.0, 0.0)));
        assert!(r.contains(Point::new(9.9, 9.9)));
        assert!(!r.contains(Point::new(10.0, 5.0)));
        assert!(!r.contains(Point::new(5.0, -0.1)));
    }

    #[test]
    fn test_inverted_rect_is_empty() {
        let r = Rect::new(10.0, 0.0, 0.0, 10.0);
        assert!(r.is_empty());
        assert_eq!(r.width(), -10.0);
        assert!(!r.contains(Point::new(5.0, 5.0)));
    }

    #[test]
    fn test_rect_edge_center() {
        let r = Rect::new(10.0, 20.0, 30.0, 60.0);
        assert_eq!(r.edge(Axis::X, Edge::Center), 20.0);
        assert_eq!(r.edge(Axis::Y, Edge::End), 60.0);
    }

    #[test]
    fn test_anchor_edges() {
        assert_eq!(Anchor::TopRight.edge(Axis::X), Edge::End);
        assert_eq!(Anchor::TopRight.edge(Axis::Y), Edge::Start);
        assert_eq!(Anchor::Center.edge(Axis::X), Edge::Center);
        assert_eq!(Anchor::BottomCenter.edge(Axis::Y), Edge::End);
    }

    #[test]
    fn test_edge_names() {
        assert_eq!(Edge::Start.name(Axis::X), "LEFT");
        assert_eq!(Edge::End.name(Axis::Y), "BOTTOM");
    }

    #[test]
    fn test_color_lerp_and_fade() {
        let mid = Color::lerp(Color::BLACK, Color::WHITE, 0.5);
        assert_eq!(mid, Color::new(0.5, 0.5, 0.5, 1.0));
        assert!(Color::RED.fade(0.0).is_transparent());
    }
}
