//! Core types shared across the `PathWorks` system.

use std::fmt;

// ---------------------------------------------------------------------------
// Scalar
// ---------------------------------------------------------------------------

/// Convenience alias for floating-point coordinates and angles.
pub type Scalar = f64;

/// Tolerance for floating-point comparisons.
pub const EPSILON: Scalar = 1.0 / 65536.0;

/// Near-zero guard for avoiding division by zero or singularity.
pub const NEAR_ZERO: Scalar = 1e-30;

/// A 2D point with floating-point coordinates.
///
/// Path entries store [`Point`]; intermediate geometry (transforms, arc and
/// Bezier math) runs in `kurbo`'s float types and is rounded back at the end.
pub type FloatPoint = kurbo::Point;

/// Round a coordinate to the nearest integer, half up toward +∞.
#[expect(
    clippy::cast_possible_truncation,
    reason = "device coordinates are far below i32 range"
)]
#[must_use]
pub fn round_coord(v: Scalar) -> i32 {
    (v + 0.5).floor() as i32
}

// ---------------------------------------------------------------------------
// Point
// ---------------------------------------------------------------------------

/// A 2D point with integer coordinates.
///
/// Paths store integer points. Whether a given point is in logical or device
/// space depends on context; the path buffer itself always holds device
/// coordinates.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    /// The origin (0, 0).
    pub const ZERO: Self = Self { x: 0, y: 0 };

    /// Create a new point.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Convert to a floating-point point.
    #[must_use]
    pub fn to_float(self) -> FloatPoint {
        FloatPoint::new(f64::from(self.x), f64::from(self.y))
    }

    /// Round a floating-point point to the nearest integer point, half up.
    #[must_use]
    pub fn from_float(p: FloatPoint) -> Self {
        Self {
            x: round_coord(p.x),
            y: round_coord(p.y),
        }
    }
}

impl fmt::Debug for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_coord_half_up() {
        assert_eq!(round_coord(1.4), 1);
        assert_eq!(round_coord(1.5), 2);
        assert_eq!(round_coord(1.6), 2);
        assert_eq!(round_coord(-1.5), -1);
        assert_eq!(round_coord(-1.6), -2);
        assert_eq!(round_coord(0.0), 0);
    }

    #[test]
    fn point_float_roundtrip() {
        let p = Point::new(7, -3);
        assert_eq!(Point::from_float(p.to_float()), p);
    }

    #[test]
    fn from_float_rounds_each_coordinate() {
        let p = Point::from_float(FloatPoint::new(2.5, -0.5));
        assert_eq!(p, Point::new(3, 0));
    }
}
