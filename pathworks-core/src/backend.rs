//! The output backend a device context draws through.
//!
//! When no path is open, geometry passes straight through to the backend;
//! terminal path operations (`fill_path`, `stroke_path`, `select_clip_path`)
//! hand the backend the consumed device geometry. All methods have empty
//! default bodies, so a backend only implements what it renders and
//! [`NullBackend`] is a complete no-op device.

use pathworks_graphics::region::{FillMode, Region};
use pathworks_graphics::types::Point;

use crate::path::PointKind;
use crate::pen::Pen;

/// How a clip region combines with the current clip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClipCombine {
    #[default]
    Copy,
    And,
    Or,
    Xor,
    Diff,
}

/// Rendering entry points consumed by the path subsystem.
///
/// Points and kinds arrive in device coordinates, already flattened to
/// moves and lines.
pub trait Backend {
    /// Fill a poly-polygon under the given fill rule.
    fn fill_polygons(&mut self, _points: &[Point], _counts: &[usize], _mode: FillMode) {}

    /// Stroke a recorded device path with the given pen.
    fn stroke_path(&mut self, _points: &[Point], _kinds: &[PointKind], _pen: &Pen) {}

    /// Install a clip region.
    fn set_clip_region(&mut self, _region: &Region, _mode: ClipCombine) {}

    /// Draw an open polyline (passthrough drawing with no path open).
    fn polyline(&mut self, _points: &[Point], _pen: &Pen) {}
}

/// A backend that discards everything.
pub struct NullBackend;

impl Backend for NullBackend {}
