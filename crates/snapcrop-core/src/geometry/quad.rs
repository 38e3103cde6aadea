//! Four-corner quadrilaterals and degeneracy checks.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{distance, Point, Rect};

/// Corners closer than this are treated as the same point.
const COINCIDENT_EPSILON: f64 = 1e-3;

/// Absolute area below which a quad is considered flat.
const AREA_EPSILON: f64 = 1e-6;

/// Sine of the smallest corner angle accepted before three corners are
/// considered collinear.
const COLLINEAR_EPSILON: f64 = 1e-6;

/// Role of a corner handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    /// Every corner in storage order.
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomLeft,
        Corner::BottomRight,
    ];

    /// The diagonally opposite corner.
    pub fn opposite(self) -> Corner {
        match self {
            Corner::TopLeft => Corner::BottomRight,
            Corner::TopRight => Corner::BottomLeft,
            Corner::BottomLeft => Corner::TopRight,
            Corner::BottomRight => Corner::TopLeft,
        }
    }

    /// Whether dragging this corner moves the left edge of a rectangle.
    pub fn on_left_edge(self) -> bool {
        matches!(self, Corner::TopLeft | Corner::BottomLeft)
    }

    /// Whether dragging this corner moves the top edge of a rectangle.
    pub fn on_top_edge(self) -> bool {
        matches!(self, Corner::TopLeft | Corner::TopRight)
    }

    fn index(self) -> usize {
        match self {
            Corner::TopLeft => 0,
            Corner::TopRight => 1,
            Corner::BottomLeft => 2,
            Corner::BottomRight => 3,
        }
    }
}

/// Why a quad cannot be used as a crop region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DegenerateReason {
    #[error("corner coordinates are not finite")]
    NonFinite,
    #[error("two corners coincide")]
    CoincidentCorners,
    #[error("quad has near-zero area")]
    ZeroArea,
    #[error("three corners are collinear")]
    Collinear,
    #[error("quad edges intersect each other")]
    SelfIntersecting,
    #[error("quad is not convex")]
    NotConvex,
}

/// Quadrilateral with corners stored by role.
///
/// Storage order is `(top_left, top_right, bottom_left, bottom_right)`;
/// the polygon order used for area and winding is
/// `top_left -> top_right -> bottom_right -> bottom_left`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quad {
    pub top_left: Point,
    pub top_right: Point,
    pub bottom_left: Point,
    pub bottom_right: Point,
}

impl Quad {
    pub fn new(top_left: Point, top_right: Point, bottom_left: Point, bottom_right: Point) -> Self {
        Self {
            top_left,
            top_right,
            bottom_left,
            bottom_right,
        }
    }

    pub fn from_rect(rect: &Rect) -> Self {
        Self::new(
            rect.top_left(),
            rect.top_right(),
            rect.bottom_left(),
            rect.bottom_right(),
        )
    }

    /// Build a quad from points in any order, assigning roles by position.
    ///
    /// Points are sorted by angle around their centroid and the ring is
    /// rotated so that the point with the smallest `x + y` becomes the top
    /// left. Assumes y grows downward; for processing-space points flip
    /// the result's vertical roles with [`Quad::flip_vertical_roles`].
    pub fn from_unordered(points: [Point; 4]) -> Self {
        let cx = points.iter().map(|p| p.x).sum::<f64>() / 4.0;
        let cy = points.iter().map(|p| p.y).sum::<f64>() / 4.0;

        let mut ring = points;
        ring.sort_by(|a, b| {
            let ta = (a.y - cy).atan2(a.x - cx);
            let tb = (b.y - cy).atan2(b.x - cx);
            ta.total_cmp(&tb)
        });

        let start = ring
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| (a.x + a.y).total_cmp(&(b.x + b.y)))
            .map(|(i, _)| i)
            .unwrap_or(0);
        ring.rotate_left(start);

        // With y down, increasing atan2 walks clockwise on screen:
        // tl -> tr -> br -> bl.
        Self::new(ring[0], ring[1], ring[3], ring[2])
    }

    /// Swap top and bottom roles.
    ///
    /// A quad ordered in a y-up space has its vertical roles inverted
    /// relative to display space.
    pub fn flip_vertical_roles(&self) -> Self {
        Self::new(
            self.bottom_left,
            self.bottom_right,
            self.top_left,
            self.top_right,
        )
    }

    /// Corners in storage order.
    pub fn corners(&self) -> [Point; 4] {
        [
            self.top_left,
            self.top_right,
            self.bottom_left,
            self.bottom_right,
        ]
    }

    /// Corners in ring order (`tl, tr, br, bl`).
    pub fn polygon(&self) -> [Point; 4] {
        [
            self.top_left,
            self.top_right,
            self.bottom_right,
            self.bottom_left,
        ]
    }

    pub fn corner(&self, corner: Corner) -> Point {
        self.corners()[corner.index()]
    }

    pub fn set_corner(&mut self, corner: Corner, point: Point) {
        match corner {
            Corner::TopLeft => self.top_left = point,
            Corner::TopRight => self.top_right = point,
            Corner::BottomLeft => self.bottom_left = point,
            Corner::BottomRight => self.bottom_right = point,
        }
    }

    pub fn translate(&self, dx: f64, dy: f64) -> Self {
        self.map(|p| p.translate(dx, dy))
    }

    /// Apply `f` to every corner, keeping roles.
    pub fn map<F: FnMut(Point) -> Point>(&self, mut f: F) -> Self {
        Self::new(
            f(self.top_left),
            f(self.top_right),
            f(self.bottom_left),
            f(self.bottom_right),
        )
    }

    pub fn is_finite(&self) -> bool {
        self.corners().iter().all(|p| p.is_finite())
    }

    pub fn bounding_box(&self) -> Rect {
        let c = self.corners();
        let min_x = c.iter().map(|p| p.x).fold(f64::INFINITY, f64::min);
        let min_y = c.iter().map(|p| p.y).fold(f64::INFINITY, f64::min);
        let max_x = c.iter().map(|p| p.x).fold(f64::NEG_INFINITY, f64::max);
        let max_y = c.iter().map(|p| p.y).fold(f64::NEG_INFINITY, f64::max);
        Rect::new(min_x, min_y, max_x - min_x, max_y - min_y)
    }

    /// Shoelace area over the ring order. Sign depends on winding.
    pub fn signed_area(&self) -> f64 {
        let ring = self.polygon();
        let twice: f64 = (0..4)
            .map(|i| {
                let a = ring[i];
                let b = ring[(i + 1) % 4];
                a.x * b.y - b.x * a.y
            })
            .sum();
        twice / 2.0
    }

    /// Check that this quad describes a usable crop region.
    pub fn validate(&self) -> Result<(), DegenerateReason> {
        if !self.is_finite() {
            return Err(DegenerateReason::NonFinite);
        }

        let ring = self.polygon();
        for i in 0..4 {
            for j in (i + 1)..4 {
                if distance(ring[i], ring[j]) < COINCIDENT_EPSILON {
                    return Err(DegenerateReason::CoincidentCorners);
                }
            }
        }

        if self.signed_area().abs() < AREA_EPSILON {
            return Err(DegenerateReason::ZeroArea);
        }

        let mut turns = [0.0f64; 4];
        for i in 0..4 {
            let prev = ring[(i + 3) % 4];
            let cur = ring[i];
            let next = ring[(i + 1) % 4];
            let cross = cross(prev, cur, next);
            let norm = distance(prev, cur) * distance(cur, next);
            if (cross / norm).abs() < COLLINEAR_EPSILON {
                return Err(DegenerateReason::Collinear);
            }
            turns[i] = cross;
        }

        if segments_cross(ring[0], ring[1], ring[2], ring[3])
            || segments_cross(ring[1], ring[2], ring[3], ring[0])
        {
            return Err(DegenerateReason::SelfIntersecting);
        }

        let positive = turns.iter().filter(|t| **t > 0.0).count();
        if positive != 0 && positive != 4 {
            return Err(DegenerateReason::NotConvex);
        }

        Ok(())
    }

    pub fn is_degenerate(&self) -> bool {
        self.validate().is_err()
    }
}

/// Z component of `(b - a) x (c - b)`.
fn cross(a: Point, b: Point, c: Point) -> f64 {
    (b.x - a.x) * (c.y - b.y) - (b.y - a.y) * (c.x - b.x)
}

fn orient(a: Point, b: Point, c: Point) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

/// Proper intersection of segments `p1p2` and `p3p4`.
fn segments_cross(p1: Point, p2: Point, p3: Point, p4: Point) -> bool {
    let d1 = orient(p3, p4, p1);
    let d2 = orient(p3, p4, p2);
    let d3 = orient(p1, p2, p3);
    let d4 = orient(p1, p2, p4);
    d1 * d2 < 0.0 && d3 * d4 < 0.0
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: any input order of a rectangle's corners yields the same roles.
        #[test]
        fn prop_from_unordered_is_order_independent(
            x in -500.0f64..500.0,
            y in -500.0f64..500.0,
            w in 1.0f64..500.0,
            h in 1.0f64..500.0,
            rot in 0usize..4,
        ) {
            let q = Quad::from_rect(&Rect::new(x, y, w, h));
            let mut ring = q.polygon();
            ring.rotate_left(rot);
            prop_assert_eq!(Quad::from_unordered(ring), q);
        }

        /// Property: axis-aligned rectangles with positive size are never degenerate.
        #[test]
        fn prop_rects_are_valid(
            x in -500.0f64..500.0,
            y in -500.0f64..500.0,
            w in 0.5f64..500.0,
            h in 0.5f64..500.0,
        ) {
            prop_assert!(!Quad::from_rect(&Rect::new(x, y, w, h)).is_degenerate());
        }
    }
}
