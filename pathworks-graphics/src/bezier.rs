//! Cubic Bezier segment operations.
//!
//! This module provides the shared `CubicSegment` type and the polyline
//! subdivision used by the path flattener: recursive de Casteljau splitting
//! down to a flatness tolerance.

use kurbo::Vec2;

use crate::types::{FloatPoint, Scalar, NEAR_ZERO};

/// Default flatness tolerance, in device pixels.
pub const FLATTEN_TOLERANCE: Scalar = 0.25;

/// Recursion limit for subdivision; 2^16 segments is far beyond any
/// realistic device-space curve.
const MAX_SPLIT_DEPTH: u32 = 16;

/// Four control points of a cubic Bezier segment.
#[derive(Debug, Clone, Copy)]
pub struct CubicSegment {
    pub p0: FloatPoint,
    pub p1: FloatPoint,
    pub p2: FloatPoint,
    pub p3: FloatPoint,
}

impl CubicSegment {
    /// Create a new cubic segment from four control points.
    #[must_use]
    pub const fn new(p0: FloatPoint, p1: FloatPoint, p2: FloatPoint, p3: FloatPoint) -> Self {
        Self { p0, p1, p2, p3 }
    }

    /// Evaluate the point at parameter `t` in [0, 1].
    #[expect(
        clippy::many_single_char_names,
        reason = "standard Bezier math variable names (a, b, c, d, s, t)"
    )]
    #[must_use]
    pub fn eval(&self, t: Scalar) -> FloatPoint {
        let s = 1.0 - t;
        let a = s * s * s;
        let b = 3.0 * s * s * t;
        let c = 3.0 * s * t * t;
        let d = t * t * t;
        FloatPoint::new(
            d.mul_add(
                self.p3.x,
                a.mul_add(self.p0.x, b.mul_add(self.p1.x, c * self.p2.x)),
            ),
            d.mul_add(
                self.p3.y,
                a.mul_add(self.p0.y, b.mul_add(self.p1.y, c * self.p2.y)),
            ),
        )
    }

    /// Split at parameter `t` using de Casteljau's algorithm.
    ///
    /// Returns `(left_half, right_half)`.
    #[must_use]
    pub fn split(&self, t: Scalar) -> (Self, Self) {
        let ab = self.p0.lerp(self.p1, t);
        let bc = self.p1.lerp(self.p2, t);
        let cd = self.p2.lerp(self.p3, t);
        let abc = ab.lerp(bc, t);
        let bcd = bc.lerp(cd, t);
        let abcd = abc.lerp(bcd, t);

        (
            Self {
                p0: self.p0,
                p1: ab,
                p2: abc,
                p3: abcd,
            },
            Self {
                p0: abcd,
                p1: bcd,
                p2: cd,
                p3: self.p3,
            },
        )
    }

    /// Whether both control points lie within `tolerance` of the chord.
    fn is_flat(&self, tolerance: Scalar) -> bool {
        let chord: Vec2 = self.p3 - self.p0;
        let len = chord.hypot();
        if len < NEAR_ZERO {
            // Degenerate chord: measure the control handles directly.
            let d1 = (self.p1 - self.p0).hypot();
            let d2 = (self.p2 - self.p3).hypot();
            return d1.max(d2) <= tolerance;
        }
        let d1 = chord.cross(self.p1 - self.p0).abs() / len;
        let d2 = chord.cross(self.p2 - self.p0).abs() / len;
        d1.max(d2) <= tolerance
    }
}

// ---------------------------------------------------------------------------
// Polyline subdivision
// ---------------------------------------------------------------------------

/// Subdivide a cubic segment into a polyline within `tolerance`.
///
/// Returns at least two points; the first is `seg.p0` and the last is
/// `seg.p3` exactly.
#[must_use]
pub fn flatten_points(seg: &CubicSegment, tolerance: Scalar) -> Vec<FloatPoint> {
    let mut out = vec![seg.p0];
    subdivide(seg, tolerance, MAX_SPLIT_DEPTH, &mut out);
    out
}

fn subdivide(seg: &CubicSegment, tolerance: Scalar, depth: u32, out: &mut Vec<FloatPoint>) {
    if depth == 0 || seg.is_flat(tolerance) {
        out.push(seg.p3);
        return;
    }
    let (left, right) = seg.split(0.5);
    subdivide(&left, tolerance, depth - 1, out);
    subdivide(&right, tolerance, depth - 1, out);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
