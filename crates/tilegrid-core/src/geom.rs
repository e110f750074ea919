//! Pixel-space geometry: [`Point`], [`Size`] and [`Rect`].
//!
//! All coordinates are integer pixels. X grows right, Y grows down, matching
//! texture and canvas addressing.

use std::fmt;
use std::ops::{Add, Div, Mul, Sub};
use std::str::FromStr;

// ---------------------------------------------------------------------------
// Point
// ---------------------------------------------------------------------------

/// A 2D integer point.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    /// Origin (0, 0).
    pub const ZERO: Self = Self { x: 0, y: 0 };

    /// Create a new point.
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Return a point shifted by (dx, dy).
    #[inline]
    pub const fn shift(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

impl PartialOrd for Point {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Point {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.y.cmp(&other.y).then(self.x.cmp(&other.x))
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl Add for Point {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<i32> for Point {
    type Output = Self;
    #[inline]
    fn mul(self, rhs: i32) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

impl Div<i32> for Point {
    type Output = Self;
    #[inline]
    fn div(self, rhs: i32) -> Self {
        Self::new(self.x / rhs, self.y / rhs)
    }
}

// ---------------------------------------------------------------------------
// Size
// ---------------------------------------------------------------------------

/// Width and height in pixels (or in cells, for tile spacing).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    /// Create a new size.
    #[inline]
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// Width × height, widened so page-sized products cannot overflow.
    #[inline]
    pub const fn area(self) -> i64 {
        self.width as i64 * self.height as i64
    }

    /// Whether either dimension is zero or negative.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Whether `other` fits inside `self` on both axes.
    #[inline]
    pub const fn fits(self, other: Size) -> bool {
        other.width <= self.width && other.height <= self.height
    }

    /// Round each dimension up to a multiple of `to`.
    #[inline]
    pub const fn round_up_to(self, to: i32) -> Self {
        Self::new(round_up(self.width, to), round_up(self.height, to))
    }

    /// Round each dimension up to the next power of two.
    #[inline]
    pub fn next_power_of_two(self) -> Self {
        Self::new(pot(self.width), pot(self.height))
    }

    /// Whether both dimensions are powers of two.
    #[inline]
    pub fn is_power_of_two(self) -> bool {
        self.width > 0
            && self.height > 0
            && (self.width as u32).is_power_of_two()
            && (self.height as u32).is_power_of_two()
    }
}

const fn round_up(value: i32, to: i32) -> i32 {
    let rem = value % to;
    if rem == 0 { value } else { value + (to - rem) }
}

fn pot(value: i32) -> i32 {
    (value.max(1) as u32).next_power_of_two() as i32
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Error returned when a `WxH` size string is malformed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseSizeError(pub String);

impl fmt::Display for ParseSizeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid size \u{201c}{}\u{201d}, expected WxH", self.0)
    }
}

impl std::error::Error for ParseSizeError {}

impl FromStr for Size {
    type Err = ParseSizeError;

    /// Parse `"8x16"`. A single number `"12"` is read as a square size.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseSizeError(s.to_owned());
        let s = s.trim();
        match s.split_once(['x', 'X']) {
            Some((w, h)) => {
                let w = w.trim().parse().map_err(|_| err())?;
                let h = h.trim().parse().map_err(|_| err())?;
                Ok(Self::new(w, h))
            }
            None => {
                let n = s.parse().map_err(|_| err())?;
                Ok(Self::new(n, n))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Rect
// ---------------------------------------------------------------------------

/// An axis-aligned pixel rectangle: `left`/`top` inclusive, spanning
/// `width` × `height` pixels.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    /// Create a rectangle from its top-left corner and dimensions.
    #[inline]
    pub const fn new(left: i32, top: i32, width: i32, height: i32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// A rectangle of `size` anchored at the origin.
    #[inline]
    pub const fn from_size(size: Size) -> Self {
        Self::new(0, 0, size.width, size.height)
    }

    /// A rectangle of `size` anchored at `location`.
    #[inline]
    pub const fn at(location: Point, size: Size) -> Self {
        Self::new(location.x, location.y, size.width, size.height)
    }

    /// Top-left corner.
    #[inline]
    pub const fn location(self) -> Point {
        Point::new(self.left, self.top)
    }

    /// Dimensions.
    #[inline]
    pub const fn size(self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Exclusive right edge.
    #[inline]
    pub const fn right(self) -> i32 {
        self.left + self.width
    }

    /// Exclusive bottom edge.
    #[inline]
    pub const fn bottom(self) -> i32 {
        self.top + self.height
    }

    #[inline]
    pub const fn area(self) -> i64 {
        self.size().area()
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.size().is_empty()
    }

    /// Whether the pixel at `p` lies inside.
    #[inline]
    pub const fn contains_point(self, p: Point) -> bool {
        p.x >= self.left && p.y >= self.top && p.x < self.right() && p.y < self.bottom()
    }

    /// Whether `other` lies entirely inside. Empty rectangles are contained
    /// only when their corner is.
    #[inline]
    pub const fn contains(self, other: Rect) -> bool {
        other.left >= self.left
            && other.top >= self.top
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Whether the two rectangles share at least one pixel.
    #[inline]
    pub const fn overlaps(self, other: Rect) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.left < other.right()
            && other.left < self.right()
            && self.top < other.bottom()
            && other.top < self.bottom()
    }

    /// Intersection, or the default (empty) rectangle when disjoint.
    pub fn intersect(self, other: Rect) -> Rect {
        let left = self.left.max(other.left);
        let top = self.top.max(other.top);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if right <= left || bottom <= top {
            Rect::default()
        } else {
            Rect::new(left, top, right - left, bottom - top)
        }
    }

    /// Expand by `n` pixels on every side (shrink for negative `n`).
    #[inline]
    pub const fn inflate(self, n: i32) -> Rect {
        Rect::new(self.left - n, self.top - n, self.width + 2 * n, self.height + 2 * n)
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}+{}+{}", self.width, self.height, self.left, self.top)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_arithmetic() {
        let a = Point::new(1, 2);
        let b = Point::new(3, 4);
        assert_eq!(a + b, Point::new(4, 6));
        assert_eq!(b - a, Point::new(2, 2));
        assert_eq!(a * 3, Point::new(3, 6));
        assert_eq!(b / 2, Point::new(1, 2));
        assert_eq!(a.shift(-1, 1), Point::new(0, 3));
    }

    #[test]
    fn size_rounding() {
        assert_eq!(Size::new(10, 12).round_up_to(4), Size::new(12, 12));
        assert_eq!(Size::new(1, 4).round_up_to(4), Size::new(4, 4));
        assert_eq!(Size::new(100, 257).next_power_of_two(), Size::new(128, 512));
        assert!(Size::new(256, 64).is_power_of_two());
        assert!(!Size::new(256, 65).is_power_of_two());
    }

    #[test]
    fn size_parse_and_display() {
        assert_eq!("8x16".parse::<Size>().unwrap(), Size::new(8, 16));
        assert_eq!(" 10 X 20 ".parse::<Size>().unwrap(), Size::new(10, 20));
        assert_eq!("12".parse::<Size>().unwrap(), Size::new(12, 12));
        assert!("8x".parse::<Size>().is_err());
        assert!("axb".parse::<Size>().is_err());
        assert_eq!(Size::new(8, 16).to_string(), "8x16");
    }

    #[test]
    fn rect_edges_and_area() {
        let r = Rect::new(2, 3, 4, 5);
        assert_eq!(r.right(), 6);
        assert_eq!(r.bottom(), 8);
        assert_eq!(r.area(), 20);
        assert_eq!(r.location(), Point::new(2, 3));
        assert_eq!(r.size(), Size::new(4, 5));
        assert!(r.contains_point(Point::new(5, 7)));
        assert!(!r.contains_point(Point::new(6, 7)));
    }

    #[test]
    fn rect_overlap_is_exclusive_of_touching_edges() {
        let a = Rect::new(0, 0, 4, 4);
        let b = Rect::new(4, 0, 4, 4);
        let c = Rect::new(3, 3, 4, 4);
        assert!(!a.overlaps(b));
        assert!(a.overlaps(c));
        assert!(!a.overlaps(Rect::new(1, 1, 0, 3)));
    }

    #[test]
    fn rect_intersect() {
        let a = Rect::new(0, 0, 4, 4);
        let b = Rect::new(2, 2, 4, 4);
        assert_eq!(a.intersect(b), Rect::new(2, 2, 2, 2));
        assert!(a.intersect(Rect::new(10, 10, 1, 1)).is_empty());
    }

    #[test]
    fn rect_inflate_contains() {
        let useful = Rect::new(5, 5, 10, 10);
        let total = useful.inflate(1);
        assert_eq!(total, Rect::new(4, 4, 12, 12));
        assert!(total.contains(useful));
        assert!(!useful.contains(total));
        assert_eq!(total.inflate(-1), useful);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn rect_serde_round_trip() {
        let r = Rect::new(1, 2, 3, 4);
        let json = serde_json::to_string(&r).unwrap();
        assert_eq!(serde_json::from_str::<Rect>(&json).unwrap(), r);
    }
}
