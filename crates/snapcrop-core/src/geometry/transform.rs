//! Affine and projective 2D transforms.
//!
//! Both transforms follow the same composition convention: `a.then(&b)`
//! is the transform that applies `a` first and `b` second, so
//!
//! ```text
//! apply(apply(p, a), b) == apply(p, a.then(&b))
//! ```
//!
//! The projective matrix is stored row-major and maps `(x, y, 1)` to
//! homogeneous `(x', y', w')`, with the projected point `(x'/w', y'/w')`.

use super::Point;

/// Below this magnitude a homogeneous `w` or a pivot is treated as zero.
const EPSILON: f64 = 1e-12;

/// 2D affine transform.
///
/// ```text
/// x' = a * x + c * y + tx
/// y' = b * x + d * y + ty
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AffineTransform {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub tx: f64,
    pub ty: f64,
}

impl Default for AffineTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl AffineTransform {
    pub const IDENTITY: Self = Self {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        tx: 0.0,
        ty: 0.0,
    };

    pub fn translation(tx: f64, ty: f64) -> Self {
        Self {
            tx,
            ty,
            ..Self::IDENTITY
        }
    }

    pub fn scale(sx: f64, sy: f64) -> Self {
        Self {
            a: sx,
            d: sy,
            ..Self::IDENTITY
        }
    }

    /// Vertical flip inside a container of the given height.
    ///
    /// This is the display <-> processing space conversion as a transform.
    pub fn flip_vertical(height: f64) -> Self {
        Self {
            d: -1.0,
            ty: height,
            ..Self::IDENTITY
        }
    }

    /// Transform applying `self` first, then `next`.
    pub fn then(&self, next: &AffineTransform) -> AffineTransform {
        AffineTransform {
            a: next.a * self.a + next.c * self.b,
            b: next.b * self.a + next.d * self.b,
            c: next.a * self.c + next.c * self.d,
            d: next.b * self.c + next.d * self.d,
            tx: next.a * self.tx + next.c * self.ty + next.tx,
            ty: next.b * self.tx + next.d * self.ty + next.ty,
        }
    }

    /// Mathematical composition `self ∘ first` (apply `first`, then `self`).
    pub fn compose(&self, first: &AffineTransform) -> AffineTransform {
        first.then(self)
    }

    pub fn apply(&self, p: Point) -> Point {
        Point::new(
            self.a * p.x + self.c * p.y + self.tx,
            self.b * p.x + self.d * p.y + self.ty,
        )
    }
}

/// Apply an affine transform to a point.
pub fn apply_affine(point: Point, transform: &AffineTransform) -> Point {
    transform.apply(point)
}

/// 2D projective transform (homography).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectiveTransform {
    /// Row-major 3x3 coefficients.
    pub m: [f64; 9],
}

impl Default for ProjectiveTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl From<AffineTransform> for ProjectiveTransform {
    fn from(t: AffineTransform) -> Self {
        Self {
            m: [t.a, t.c, t.tx, t.b, t.d, t.ty, 0.0, 0.0, 1.0],
        }
    }
}

impl ProjectiveTransform {
    pub const IDENTITY: Self = Self {
        m: [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0],
    };

    /// Build the unique homography taking each `src[i]` to `dst[i]`.
    ///
    /// Returns `None` when the correspondences do not determine a unique
    /// transform (three collinear points, repeated points, non-finite input).
    pub fn from_quad_to_quad(src: [Point; 4], dst: [Point; 4]) -> Option<Self> {
        if !src.iter().chain(dst.iter()).all(|p| p.is_finite()) {
            return None;
        }

        // Unknowns [m0 m1 m2 m3 m4 m5 m6 m7] with m8 fixed to 1:
        //   m0 x + m1 y + m2 - m6 x X - m7 y X = X
        //   m3 x + m4 y + m5 - m6 x Y - m7 y Y = Y
        let mut a = [[0.0f64; 8]; 8];
        let mut b = [0.0f64; 8];
        for i in 0..4 {
            let (s, d) = (src[i], dst[i]);
            let r0 = 2 * i;
            let r1 = r0 + 1;

            a[r0] = [s.x, s.y, 1.0, 0.0, 0.0, 0.0, -s.x * d.x, -s.y * d.x];
            b[r0] = d.x;
            a[r1] = [0.0, 0.0, 0.0, s.x, s.y, 1.0, -s.x * d.y, -s.y * d.y];
            b[r1] = d.y;
        }

        let h = solve_8x8(a, b)?;
        let mut m = [1.0f64; 9];
        m[..8].copy_from_slice(&h);

        let t = Self { m };
        (t.is_finite() && t.determinant().abs() > EPSILON).then_some(t)
    }

    pub fn is_finite(&self) -> bool {
        self.m.iter().all(|v| v.is_finite())
    }

    pub fn determinant(&self) -> f64 {
        let [a, b, c, d, e, f, g, h, i] = self.m;
        a * (e * i - f * h) - b * (d * i - f * g) + c * (d * h - e * g)
    }

    /// Inverse transform, `None` if singular.
    pub fn invert(&self) -> Option<Self> {
        let [a, b, c, d, e, f, g, h, i] = self.m;
        let det = self.determinant();
        if !det.is_finite() || det.abs() < EPSILON {
            return None;
        }
        let inv = 1.0 / det;
        let m = [
            (e * i - f * h) * inv,
            (c * h - b * i) * inv,
            (b * f - c * e) * inv,
            (f * g - d * i) * inv,
            (a * i - c * g) * inv,
            (c * d - a * f) * inv,
            (d * h - e * g) * inv,
            (b * g - a * h) * inv,
            (a * e - b * d) * inv,
        ];
        let t = Self { m };
        t.is_finite().then_some(t)
    }

    /// Transform applying `self` first, then `next`.
    pub fn then(&self, next: &ProjectiveTransform) -> ProjectiveTransform {
        let mut out = [0.0f64; 9];
        for row in 0..3 {
            for col in 0..3 {
                out[row * 3 + col] = (0..3)
                    .map(|k| next.m[row * 3 + k] * self.m[k * 3 + col])
                    .sum();
            }
        }
        ProjectiveTransform { m: out }
    }

    /// Mathematical composition `self ∘ first` (apply `first`, then `self`).
    pub fn compose(&self, first: &ProjectiveTransform) -> ProjectiveTransform {
        first.then(self)
    }

    /// Map a point. `None` when it lands on the line at infinity.
    pub fn apply(&self, p: Point) -> Option<Point> {
        let m = &self.m;
        let w = m[6] * p.x + m[7] * p.y + m[8];
        if !w.is_finite() || w.abs() < EPSILON {
            return None;
        }
        let x = (m[0] * p.x + m[1] * p.y + m[2]) / w;
        let y = (m[3] * p.x + m[4] * p.y + m[5]) / w;
        let out = Point::new(x, y);
        out.is_finite().then_some(out)
    }
}

/// Apply a projective transform to a point.
pub fn apply_projective(point: Point, transform: &ProjectiveTransform) -> Option<Point> {
    transform.apply(point)
}

/// Gaussian elimination with partial pivoting.
fn solve_8x8(mut a: [[f64; 8]; 8], mut b: [f64; 8]) -> Option<[f64; 8]> {
    for col in 0..8 {
        let pivot = (col..8).max_by(|&r1, &r2| a[r1][col].abs().total_cmp(&a[r2][col].abs()))?;
        if a[pivot][col].abs() < EPSILON {
            return None;
        }
        a.swap(col, pivot);
        b.swap(col, pivot);

        for row in (col + 1)..8 {
            let factor = a[row][col] / a[col][col];
            if factor == 0.0 {
                continue;
            }
            for k in col..8 {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = [0.0f64; 8];
    for row in (0..8).rev() {
        let tail: f64 = ((row + 1)..8).map(|k| a[row][k] * x[k]).sum();
        x[row] = (b[row] - tail) / a[row][row];
    }
    x.iter().all(|v| v.is_finite()).then_some(x)
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn affine_strategy() -> impl Strategy<Value = AffineTransform> {
        (
            -3.0f64..3.0,
            -3.0f64..3.0,
            -3.0f64..3.0,
            -3.0f64..3.0,
            -100.0f64..100.0,
            -100.0f64..100.0,
        )
            .prop_map(|(a, b, c, d, tx, ty)| AffineTransform { a, b, c, d, tx, ty })
    }

    fn projective_strategy() -> impl Strategy<Value = ProjectiveTransform> {
        (affine_strategy(), -1e-3f64..1e-3, -1e-3f64..1e-3).prop_map(|(t, g, h)| {
            let mut p = ProjectiveTransform::from(t);
            p.m[6] = g;
            p.m[7] = h;
            p
        })
    }

    proptest! {
        /// Property: applying T1 then T2 equals applying the composed transform.
        #[test]
        fn prop_affine_composition_associative(
            t1 in affine_strategy(),
            t2 in affine_strategy(),
            x in -100.0f64..100.0,
            y in -100.0f64..100.0,
        ) {
            let p = Point::new(x, y);
            let stepwise = apply_affine(apply_affine(p, &t1), &t2);
            let composed = apply_affine(p, &t2.compose(&t1));
            prop_assert!((stepwise.x - composed.x).abs() < 1e-6);
            prop_assert!((stepwise.y - composed.y).abs() < 1e-6);
        }

        /// Property: projective composition agrees with stepwise application.
        #[test]
        fn prop_projective_composition_associative(
            t1 in projective_strategy(),
            t2 in projective_strategy(),
            x in -50.0f64..50.0,
            y in -50.0f64..50.0,
        ) {
            let p = Point::new(x, y);
            let stepwise = apply_projective(p, &t1).and_then(|q| apply_projective(q, &t2));
            let composed = apply_projective(p, &t1.then(&t2));
            if let (Some(s), Some(c)) = (stepwise, composed) {
                let tol = 1e-6 * (1.0 + s.x.abs().max(s.y.abs()));
                prop_assert!((s.x - c.x).abs() < tol);
                prop_assert!((s.y - c.y).abs() < tol);
            }
        }
    }
}
