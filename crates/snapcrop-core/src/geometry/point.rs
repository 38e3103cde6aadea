//! Points, sizes and rectangles.

use serde::{Deserialize, Serialize};

/// A 2D point. Which space it lives in is implied by context.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// True when both coordinates are finite numbers.
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Offset this point by `(dx, dy)`.
    pub fn translate(self, dx: f64, dy: f64) -> Self {
        translate(self, dx, dy)
    }
}

/// Width and height of a container, view or image.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Size of a pixel buffer.
    pub fn from_pixels(width: u32, height: u32) -> Self {
        Self::new(width as f64, height as f64)
    }

    /// True if either dimension is zero, negative or not finite.
    ///
    /// Space conversions and scale factors are undefined for empty sizes.
    pub fn is_empty(self) -> bool {
        !(self.width.is_finite() && self.height.is_finite())
            || self.width <= 0.0
            || self.height <= 0.0
    }
}

/// Axis-aligned rectangle in display space.
///
/// Corners and center are always derived from `origin` and `size`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub origin: Point,
    pub size: Size,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            origin: Point::new(x, y),
            size: Size::new(width, height),
        }
    }

    /// Rectangle of `size` centered on `center`.
    pub fn from_center(center: Point, size: Size) -> Self {
        Self::new(
            center.x - size.width / 2.0,
            center.y - size.height / 2.0,
            size.width,
            size.height,
        )
    }

    /// Rectangle anchored at the origin with the given size.
    pub fn from_size(size: Size) -> Self {
        Self {
            origin: Point::ZERO,
            size,
        }
    }

    /// Smallest rectangle containing every point. `None` for an empty slice.
    pub fn bounding(points: &[Point]) -> Option<Self> {
        let first = points.first()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for p in &points[1..] {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        Some(Self::new(min_x, min_y, max_x - min_x, max_y - min_y))
    }

    pub fn width(&self) -> f64 {
        self.size.width
    }

    pub fn height(&self) -> f64 {
        self.size.height
    }

    pub fn min_x(&self) -> f64 {
        self.origin.x
    }

    pub fn min_y(&self) -> f64 {
        self.origin.y
    }

    pub fn max_x(&self) -> f64 {
        self.origin.x + self.size.width
    }

    pub fn max_y(&self) -> f64 {
        self.origin.y + self.size.height
    }

    pub fn top_left(&self) -> Point {
        self.origin
    }

    pub fn top_right(&self) -> Point {
        self.origin.translate(self.size.width, 0.0)
    }

    pub fn bottom_left(&self) -> Point {
        self.origin.translate(0.0, self.size.height)
    }

    pub fn bottom_right(&self) -> Point {
        self.origin.translate(self.size.width, self.size.height)
    }

    pub fn center(&self) -> Point {
        Point::new(
            self.origin.x + self.size.width / 2.0,
            self.origin.y + self.size.height / 2.0,
        )
    }

    /// Same rectangle shifted by `(dx, dy)`.
    pub fn translate(&self, dx: f64, dy: f64) -> Self {
        Self {
            origin: self.origin.translate(dx, dy),
            size: self.size,
        }
    }

    /// Shrink every edge by `dx` horizontally and `dy` vertically.
    pub fn inset(&self, dx: f64, dy: f64) -> Self {
        Self::new(
            self.origin.x + dx,
            self.origin.y + dy,
            self.size.width - 2.0 * dx,
            self.size.height - 2.0 * dy,
        )
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.min_x()
            && point.x <= self.max_x()
            && point.y >= self.min_y()
            && point.y <= self.max_y()
    }

    /// Express this rectangle relative to `container` (each field in 0..1).
    ///
    /// Returns `None` for an empty container.
    pub fn normalized_in(&self, container: Size) -> Option<Self> {
        if container.is_empty() {
            return None;
        }
        Some(Self::new(
            self.origin.x / container.width,
            self.origin.y / container.height,
            self.size.width / container.width,
            self.size.height / container.height,
        ))
    }
}

/// Pure offset of a point.
pub fn translate(point: Point, dx: f64, dy: f64) -> Point {
    Point::new(point.x + dx, point.y + dy)
}

/// Euclidean distance between two points.
pub fn distance(a: Point, b: Point) -> f64 {
    (a.x - b.x).hypot(a.y - b.y)
}

/// Convert a display-space point into processing space within `container`.
///
/// Returns `None` when the container has a zero (or non-finite) dimension.
pub fn to_processing_space(point: Point, container: Size) -> Option<Point> {
    if container.is_empty() {
        return None;
    }
    Some(Point::new(point.x, container.height - point.y))
}

/// Convert a processing-space point back into display space within `container`.
///
/// Inverse of [`to_processing_space`] for the same container.
pub fn to_display_space(point: Point, container: Size) -> Option<Point> {
    if container.is_empty() {
        return None;
    }
    Some(Point::new(point.x, container.height - point.y))
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: display -> processing -> display is the identity.
        #[test]
        fn prop_space_round_trip(
            x in -1.0e4f64..1.0e4,
            y in -1.0e4f64..1.0e4,
            w in 0.01f64..1.0e4,
            h in 0.01f64..1.0e4,
        ) {
            let container = Size::new(w, h);
            let p = Point::new(x, y);
            let there = to_processing_space(p, container).unwrap();
            let back = to_display_space(there, container).unwrap();
            prop_assert!((back.x - p.x).abs() < 1e-9);
            prop_assert!((back.y - p.y).abs() < 1e-9);

            let there = to_display_space(p, container).unwrap();
            let back = to_processing_space(there, container).unwrap();
            prop_assert!((back.y - p.y).abs() < 1e-9);
        }

        /// Property: distance is symmetric and non-negative.
        #[test]
        fn prop_distance_symmetric(
            ax in -1.0e3f64..1.0e3, ay in -1.0e3f64..1.0e3,
            bx in -1.0e3f64..1.0e3, by in -1.0e3f64..1.0e3,
        ) {
            let a = Point::new(ax, ay);
            let b = Point::new(bx, by);
            prop_assert!(distance(a, b) >= 0.0);
            prop_assert!((distance(a, b) - distance(b, a)).abs() < 1e-12);
        }
    }
}
