//! Circular-arc approximation by cubic Bezier segments.
//!
//! Arcs are generated in a normalized space where the unit circle maps onto
//! the caller's bounding box: `(-1, -1)` is the top-left corner, `(1, 1)` the
//! bottom-right. One cubic segment approximates at most a quarter turn.

use crate::types::{FloatPoint, Scalar};

/// Angle below which an arc segment degenerates to a single point.
const DEGENERATE_SWEEP: Scalar = 1e-8;

/// Control points of a cubic approximating the unit-circle arc from
/// `angle_start` to `angle_end`, in normalized space.
///
/// The sweep must span at most a quarter turn. Sweeps below
/// [`DEGENERATE_SWEEP`] collapse all four control points onto the start
/// point.
#[must_use]
pub fn quarter_arc(angle_start: Scalar, angle_end: Scalar) -> [FloatPoint; 4] {
    debug_assert!(
        (angle_end - angle_start).abs() <= std::f64::consts::FRAC_PI_2 + 1e-12,
        "arc segment sweep exceeds a quarter turn"
    );

    let half_angle = (angle_end - angle_start) / 2.0;
    if half_angle.abs() <= DEGENERATE_SWEEP {
        let p = FloatPoint::new(angle_start.cos(), angle_start.sin());
        return [p; 4];
    }

    // Standard kappa construction: tangent handles of length a keep the
    // cubic within ~0.03% of the true circle over a quarter turn.
    let a = 4.0 / 3.0 * (1.0 - half_angle.cos()) / half_angle.sin();
    let (sin_s, cos_s) = angle_start.sin_cos();
    let (sin_e, cos_e) = angle_end.sin_cos();
    [
        FloatPoint::new(cos_s, sin_s),
        FloatPoint::new(a.mul_add(-sin_s, cos_s), a.mul_add(cos_s, sin_s)),
        FloatPoint::new(a.mul_add(sin_e, cos_e), a.mul_add(-cos_e, sin_e)),
        FloatPoint::new(cos_e, sin_e),
    ]
}

// ---------------------------------------------------------------------------
// ArcBox
// ---------------------------------------------------------------------------

/// An axis-aligned bounding box an arc is inscribed in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcBox {
    pub min: FloatPoint,
    pub max: FloatPoint,
}

impl ArcBox {
    /// Create a box from two arbitrary corners, canonicalizing so that
    /// `min` is the top-left and `max` the bottom-right.
    #[must_use]
    pub fn from_corners(a: FloatPoint, b: FloatPoint) -> Self {
        Self {
            min: FloatPoint::new(a.x.min(b.x), a.y.min(b.y)),
            max: FloatPoint::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    /// Map a normalized point (unit-circle space) into this box.
    #[must_use]
    pub fn scale(&self, p: FloatPoint) -> FloatPoint {
        FloatPoint::new(
            ((self.max.x - self.min.x) * 0.5).mul_add(p.x + 1.0, self.min.x),
            ((self.max.y - self.min.y) * 0.5).mul_add(p.y + 1.0, self.min.y),
        )
    }

    /// Map a point in this box into normalized unit-circle space.
    #[must_use]
    pub fn normalize(&self, p: FloatPoint) -> FloatPoint {
        FloatPoint::new(
            (p.x - self.min.x) / (self.max.x - self.min.x) * 2.0 - 1.0,
            (p.y - self.min.y) / (self.max.y - self.min.y) * 2.0 - 1.0,
        )
    }

    /// The center of the box.
    #[must_use]
    pub fn center(&self) -> FloatPoint {
        self.min.midpoint(self.max)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
