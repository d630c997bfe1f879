//! The device context: drawing attributes, coordinate conversion, the
//! driver stack, and path readback.
//!
//! A device context is single-threaded: the enclosing library serializes
//! calls per context, so every operation here runs to completion with
//! exclusive access to the context state.

use kurbo::Affine;

use pathworks_graphics::region::FillMode;
use pathworks_graphics::types::{FloatPoint, Point, Scalar, NEAR_ZERO};

use crate::backend::{Backend, NullBackend};
use crate::driver::DriverFrame;
use crate::error::{PathError, Result};
use crate::flatten;
use crate::path::{PathBuffer, PointKind};
use crate::pen::Pen;
use crate::recorder::Recorder;

// ---------------------------------------------------------------------------
// Attributes
// ---------------------------------------------------------------------------

/// Coordinate-rounding convention for rectangle edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GraphicsMode {
    /// Legacy half-open rectangles: the right and bottom edges are excluded.
    #[default]
    Compatible,
    /// Rectangles include all four device corners as given.
    Advanced,
}

/// Orientation convention for sweeping arc angles, in device space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArcDirection {
    #[default]
    CounterClockwise,
    Clockwise,
}

/// The drawing attributes the path subsystem consumes.
#[derive(Debug, Clone, Copy)]
pub struct DcAttributes {
    /// World-to-device transform applied to every logical input.
    pub transform: Affine,
    pub graphics_mode: GraphicsMode,
    pub arc_direction: ArcDirection,
    pub fill_mode: FillMode,
    /// Maximum miter-length to pen-width ratio before a miter join
    /// degenerates to a bevel.
    pub miter_limit: Scalar,
    pub pen: Pen,
    /// Current position, in logical coordinates.
    pub position: Point,
}

impl Default for DcAttributes {
    fn default() -> Self {
        Self {
            transform: Affine::IDENTITY,
            graphics_mode: GraphicsMode::default(),
            arc_direction: ArcDirection::default(),
            fill_mode: FillMode::default(),
            miter_limit: 10.0,
            pen: Pen::default(),
            position: Point::ZERO,
        }
    }
}

// ---------------------------------------------------------------------------
// DeviceContext
// ---------------------------------------------------------------------------

struct SavedDc {
    attrs: DcAttributes,
    path: Option<PathBuffer>,
    path_open: bool,
}

/// A device context.
///
/// Owns the drawing attributes, the driver stack (with at most one path
/// recorder frame on top of the output frame), the closed-path slot, and
/// the save stack.
pub struct DeviceContext {
    pub(crate) attrs: DcAttributes,
    pub(crate) backend: Box<dyn Backend>,
    pub(crate) drivers: Vec<DriverFrame>,
    pub(crate) closed: Option<PathBuffer>,
    saved: Vec<SavedDc>,
}

impl DeviceContext {
    /// Create a context drawing into the given backend.
    #[must_use]
    pub fn new(backend: Box<dyn Backend>) -> Self {
        Self {
            attrs: DcAttributes::default(),
            backend,
            drivers: vec![DriverFrame::Output],
            closed: None,
            saved: Vec::new(),
        }
    }

    /// The drawing attributes.
    #[must_use]
    pub const fn attrs(&self) -> &DcAttributes {
        &self.attrs
    }

    /// Mutable access to the drawing attributes.
    pub fn attrs_mut(&mut self) -> &mut DcAttributes {
        &mut self.attrs
    }

    /// Whether a path is currently being recorded.
    #[must_use]
    pub fn is_recording(&self) -> bool {
        matches!(self.drivers.last(), Some(DriverFrame::Recorder(_)))
    }

    // -- coordinate conversion ---------------------------------------------

    pub(crate) fn lp_to_dp_float(&self, p: FloatPoint) -> FloatPoint {
        self.attrs.transform * p
    }

    pub(crate) fn lp_to_dp(&self, p: Point) -> Point {
        Point::from_float(self.lp_to_dp_float(p.to_float()))
    }

    fn dp_to_lp(&self, p: Point) -> Result<Point> {
        if self.attrs.transform.determinant().abs() < NEAR_ZERO {
            return Err(PathError::CannotComplete);
        }
        Ok(Point::from_float(
            self.attrs.transform.inverse() * p.to_float(),
        ))
    }

    // -- driver dispatch ---------------------------------------------------

    /// Run `f` against the open path recorder, if one is on the stack.
    pub(crate) fn record<T>(
        &mut self,
        f: impl FnOnce(&mut Recorder<'_>) -> Result<T>,
    ) -> Option<Result<T>> {
        match self.drivers.last_mut() {
            Some(DriverFrame::Recorder(path)) => {
                let mut recorder = Recorder {
                    path,
                    attrs: &self.attrs,
                };
                Some(f(&mut recorder))
            }
            _ => None,
        }
    }

    /// Passthrough drawing: record the shape into a scratch path, flatten
    /// it, and hand the polyline to the backend as stroked geometry.
    ///
    /// This is the delegated-rasterization seam; filling and styling beyond
    /// the current pen are the backend's concern.
    pub(crate) fn passthrough_stroke(
        &mut self,
        build: impl FnOnce(&mut Recorder<'_>) -> Result<()>,
    ) -> Result<PathBuffer> {
        let mut scratch = PathBuffer::alloc(0)?;
        scratch.set_pos(self.lp_to_dp(self.attrs.position));
        {
            let mut recorder = Recorder {
                path: &mut scratch,
                attrs: &self.attrs,
            };
            build(&mut recorder)?;
        }
        let flat = flatten::flatten(&scratch)?;
        self.backend
            .stroke_path(flat.points(), flat.kinds(), &self.attrs.pen);
        Ok(scratch)
    }

    /// Flatten the closed path and consume it.
    ///
    /// The stored path is removed only after flattening succeeds, so a
    /// failure leaves the context unchanged.
    pub(crate) fn take_flat_path(&mut self) -> Result<PathBuffer> {
        let Some(path) = &self.closed else {
            return Err(PathError::CannotComplete);
        };
        let flat = flatten::flatten(path)?;
        self.closed = None;
        Ok(flat)
    }

    // -- readback ----------------------------------------------------------

    /// Read back the closed path in logical coordinates.
    ///
    /// With `points` and `kinds` both `None`, returns the entry count
    /// without copying. Otherwise both slices must be provided and hold at
    /// least that many elements; points are converted through the inverse
    /// transform.
    ///
    /// # Errors
    ///
    /// [`PathError::CannotComplete`] if no closed path exists or the
    /// transform is singular; [`PathError::InvalidParameter`] if a slice is
    /// missing or undersized.
    pub fn get_path(
        &self,
        points: Option<&mut [Point]>,
        kinds: Option<&mut [PointKind]>,
    ) -> Result<usize> {
        let Some(path) = &self.closed else {
            return Err(PathError::CannotComplete);
        };
        let count = path.len();

        let (points, kinds) = match (points, kinds) {
            (None, None) => return Ok(count),
            (Some(p), Some(k)) => (p, k),
            _ => return Err(PathError::InvalidParameter),
        };
        if points.len() < count || kinds.len() < count {
            return Err(PathError::InvalidParameter);
        }

        for (dst, src) in points.iter_mut().zip(path.points()) {
            *dst = self.dp_to_lp(*src)?;
        }
        kinds[..count].copy_from_slice(path.kinds());
        Ok(count)
    }

    // -- save / restore ----------------------------------------------------

    /// Snapshot the drawing attributes and any path (closed, or the open
    /// recorder buffer).
    ///
    /// # Errors
    ///
    /// [`PathError::OutOfMemory`] if the path copy fails.
    pub fn save_dc(&mut self) -> Result<()> {
        let (path, path_open) = if let Some(DriverFrame::Recorder(open)) = self.drivers.last() {
            (Some(open.try_clone()?), true)
        } else if let Some(closed) = &self.closed {
            (Some(closed.try_clone()?), false)
        } else {
            (None, false)
        };
        self.saved.push(SavedDc {
            attrs: self.attrs,
            path,
            path_open,
        });
        Ok(())
    }

    /// Restore the most recent snapshot, reinstating an open recorder frame
    /// if the snapshot was taken mid-recording.
    ///
    /// # Errors
    ///
    /// [`PathError::CannotComplete`] if there is nothing to restore.
    pub fn restore_dc(&mut self) -> Result<()> {
        let Some(snapshot) = self.saved.pop() else {
            return Err(PathError::CannotComplete);
        };

        if self.is_recording() {
            self.drivers.pop();
        }
        self.attrs = snapshot.attrs;
        match (snapshot.path, snapshot.path_open) {
            (Some(path), true) => {
                self.drivers.push(DriverFrame::Recorder(path));
                self.closed = None;
            }
            (path, _) => self.closed = path,
        }
        Ok(())
    }
}

impl Default for DeviceContext {
    fn default() -> Self {
        Self::new(Box::new(NullBackend))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn advanced_dc() -> DeviceContext {
        let mut dc = DeviceContext::default();
        dc.attrs_mut().graphics_mode = GraphicsMode::Advanced;
        dc
    }

    #[test]
    fn get_path_without_closed_path_fails() {
        let dc = DeviceContext::default();
        assert_eq!(dc.get_path(None, None), Err(PathError::CannotComplete));
    }

    #[test]
    fn get_path_count_query_and_copy() {
        let mut dc = advanced_dc();
        dc.begin_path().unwrap();
        dc.move_to(1, 2).unwrap();
        dc.line_to(3, 4).unwrap();
        dc.end_path().unwrap();

        let count = dc.get_path(None, None).unwrap();
        assert_eq!(count, 2);

        let mut points = [Point::ZERO; 2];
        let mut kinds = [PointKind::LINE; 2];
        let copied = dc
            .get_path(Some(&mut points), Some(&mut kinds))
            .unwrap();
        assert_eq!(copied, 2);
        assert_eq!(points, [Point::new(1, 2), Point::new(3, 4)]);
        assert_eq!(kinds, [PointKind::MOVE, PointKind::LINE]);
    }

    #[test]
    fn get_path_undersized_buffer_fails() {
        let mut dc = advanced_dc();
        dc.begin_path().unwrap();
        dc.move_to(0, 0).unwrap();
        dc.line_to(1, 1).unwrap();
        dc.end_path().unwrap();

        let mut points = [Point::ZERO; 1];
        let mut kinds = [PointKind::LINE; 1];
        assert_eq!(
            dc.get_path(Some(&mut points), Some(&mut kinds)),
            Err(PathError::InvalidParameter)
        );
    }

    #[test]
    fn get_path_applies_inverse_transform() {
        let mut dc = advanced_dc();
        dc.attrs_mut().transform = Affine::scale(2.0);
        dc.begin_path().unwrap();
        dc.move_to(3, 5).unwrap();
        dc.line_to(7, 9).unwrap();
        dc.end_path().unwrap();

        let mut points = [Point::ZERO; 2];
        let mut kinds = [PointKind::LINE; 2];
        dc.get_path(Some(&mut points), Some(&mut kinds)).unwrap();
        assert_eq!(points, [Point::new(3, 5), Point::new(7, 9)]);
    }

    #[test]
    fn save_restore_roundtrips_closed_path() {
        let mut dc = advanced_dc();
        dc.begin_path().unwrap();
        dc.rectangle(0, 0, 10, 10).unwrap();
        dc.end_path().unwrap();
        dc.save_dc().unwrap();

        dc.begin_path().unwrap();
        dc.abort_path().unwrap();
        assert_eq!(dc.get_path(None, None), Err(PathError::CannotComplete));

        dc.restore_dc().unwrap();
        assert_eq!(dc.get_path(None, None).unwrap(), 4);
    }

    #[test]
    fn save_restore_reinstates_open_recorder() {
        let mut dc = advanced_dc();
        dc.begin_path().unwrap();
        dc.move_to(0, 0).unwrap();
        dc.line_to(4, 0).unwrap();
        dc.save_dc().unwrap();
        dc.abort_path().unwrap();
        assert!(!dc.is_recording());

        dc.restore_dc().unwrap();
        assert!(dc.is_recording());
        // The restored recorder continues the same stroke.
        dc.line_to(4, 4).unwrap();
        dc.end_path().unwrap();
        assert_eq!(dc.get_path(None, None).unwrap(), 3);
    }

    #[test]
    fn restore_without_save_fails() {
        let mut dc = DeviceContext::default();
        assert_eq!(dc.restore_dc(), Err(PathError::CannotComplete));
    }

    #[test]
    fn restore_replaces_attributes() {
        let mut dc = DeviceContext::default();
        dc.save_dc().unwrap();
        dc.attrs_mut().miter_limit = 2.0;
        dc.restore_dc().unwrap();
        assert!((dc.attrs().miter_limit - 10.0).abs() < f64::EPSILON);
    }
}
