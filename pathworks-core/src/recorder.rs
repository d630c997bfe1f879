//! The primitive recorder: appending moves, lines and Beziers to an open
//! path, with stroke-continuity logic and logical-to-device conversion.

use pathworks_graphics::types::{FloatPoint, Point};

use crate::dc::{DcAttributes, DeviceContext};
use crate::error::{PathError, Result};
use crate::path::{PathBuffer, PointKind};

/// Borrow of an open path plus the attributes needed to record into it.
pub(crate) struct Recorder<'a> {
    pub(crate) path: &'a mut PathBuffer,
    pub(crate) attrs: &'a DcAttributes,
}

impl Recorder<'_> {
    pub(crate) fn lp_to_dp_float(&self, p: FloatPoint) -> FloatPoint {
        self.attrs.transform * p
    }

    pub(crate) fn lp_to_dp(&self, p: Point) -> Point {
        Point::from_float(self.lp_to_dp_float(p.to_float()))
    }

    /// Append logical points as device entries, all with the same kind.
    /// Returns the index of the first new kind slot.
    pub(crate) fn add_log_points(&mut self, points: &[Point], kind: PointKind) -> Result<usize> {
        self.path.reserve(self.path.len() + points.len())?;
        let mut first = self.path.len();
        let patch = first;
        for p in points {
            let dev = self.lp_to_dp(*p);
            self.path.add_entry(dev, kind)?;
            first += 1;
        }
        debug_assert_eq!(first, self.path.len());
        Ok(patch)
    }

    /// Open a new stroke at the cursor unless the last entry already
    /// continues one: the previous entry must exist, be unclosed, and sit
    /// exactly at the cursor.
    pub(crate) fn start_new_stroke(&mut self) -> Result<()> {
        let path = &mut *self.path;
        if !path.new_stroke() && !path.is_empty() {
            let last = path.len() - 1;
            if !path.kinds()[last].is_close() && path.points()[last] == path.pos() {
                return Ok(());
            }
        }
        path.set_new_stroke(false);
        let pos = path.pos();
        path.add_entry(pos, PointKind::MOVE)
    }

    /// Append logical points through stroke continuity and advance the
    /// cursor to the last of them.
    pub(crate) fn add_log_points_new_stroke(
        &mut self,
        points: &[Point],
        kind: PointKind,
    ) -> Result<()> {
        self.start_new_stroke()?;
        self.add_log_points(points, kind)?;
        self.path.update_pos_from_last();
        Ok(())
    }

    // -- primitive operations ----------------------------------------------

    pub(crate) fn move_to(&mut self, x: i32, y: i32) -> Result<()> {
        let pos = self.lp_to_dp(Point::new(x, y));
        self.path.set_new_stroke(true);
        self.path.set_pos(pos);
        Ok(())
    }

    pub(crate) fn line_to(&mut self, x: i32, y: i32) -> Result<()> {
        self.add_log_points_new_stroke(&[Point::new(x, y)], PointKind::LINE)
    }

    pub(crate) fn polyline_to(&mut self, points: &[Point]) -> Result<()> {
        if points.is_empty() {
            return Ok(());
        }
        self.add_log_points_new_stroke(points, PointKind::LINE)
    }

    pub(crate) fn poly_bezier_to(&mut self, points: &[Point]) -> Result<()> {
        if points.len() % 3 != 0 {
            return Err(PathError::InvalidParameter);
        }
        if points.is_empty() {
            return Ok(());
        }
        self.add_log_points_new_stroke(points, PointKind::BEZIER)
    }

    /// Start point followed by control-point triples; does not touch the
    /// cursor.
    pub(crate) fn poly_bezier(&mut self, points: &[Point]) -> Result<()> {
        if points.len() % 3 != 1 {
            return Err(PathError::InvalidParameter);
        }
        let first = self.add_log_points(points, PointKind::BEZIER)?;
        self.path.kinds_mut()[first] = PointKind::MOVE;
        Ok(())
    }

    pub(crate) fn polyline(&mut self, points: &[Point]) -> Result<()> {
        if points.len() < 2 {
            return Err(PathError::InvalidParameter);
        }
        let first = self.add_log_points(points, PointKind::LINE)?;
        self.path.kinds_mut()[first] = PointKind::MOVE;
        Ok(())
    }

    pub(crate) fn polygon(&mut self, points: &[Point]) -> Result<()> {
        if points.len() < 2 {
            return Err(PathError::InvalidParameter);
        }
        let first = self.add_log_points(points, PointKind::LINE)?;
        let kinds = self.path.kinds_mut();
        kinds[first] = PointKind::MOVE;
        kinds[first + points.len() - 1] = PointKind::LINE.with_close();
        Ok(())
    }

    pub(crate) fn poly_polyline(&mut self, points: &[Point], counts: &[usize]) -> Result<()> {
        self.poly_poly(points, counts, false)
    }

    pub(crate) fn poly_polygon(&mut self, points: &[Point], counts: &[usize]) -> Result<()> {
        self.poly_poly(points, counts, true)
    }

    fn poly_poly(&mut self, points: &[Point], counts: &[usize], close: bool) -> Result<()> {
        if counts.is_empty() {
            return Err(PathError::InvalidParameter);
        }
        let mut total = 0usize;
        for &count in counts {
            if count < 2 {
                return Err(PathError::InvalidParameter);
            }
            total += count;
        }
        if total != points.len() {
            return Err(PathError::InvalidParameter);
        }

        let mut first = self.add_log_points(points, PointKind::LINE)?;
        // Make the first point of each run a move; close polygon runs.
        for &count in counts {
            let kinds = self.path.kinds_mut();
            kinds[first] = PointKind::MOVE;
            if close {
                kinds[first + count - 1] = PointKind::LINE.with_close();
            }
            first += count;
        }
        Ok(())
    }

    /// Stateful walk over caller-tagged points.
    ///
    /// Moves update the cursor, lines and Bezier triples append through
    /// stroke continuity, and a close bit seals the figure and resets the
    /// cursor to its opening move. Any other tag pattern fails and restores
    /// the cursor to its value before the call.
    pub(crate) fn poly_draw(&mut self, points: &[Point], kinds: &[PointKind]) -> Result<()> {
        if points.len() != kinds.len() {
            return Err(PathError::InvalidParameter);
        }

        // Index of the opening move of the figure under construction.
        let mut last_move = 0;
        for (i, kind) in self.path.kinds().iter().enumerate() {
            if *kind == PointKind::MOVE {
                last_move = i;
            }
        }
        let orig_pos = self.path.pos();

        let mut i = 0;
        while i < points.len() {
            let kind = kinds[i];
            if kind == PointKind::MOVE {
                self.path.set_new_stroke(true);
                let pos = self.lp_to_dp(points[i]);
                self.path.set_pos(pos);
                last_move = self.path.len();
            } else if kind.verb() == PointKind::LINE {
                self.add_log_points_new_stroke(&points[i..=i], PointKind::LINE)?;
            } else if kind == PointKind::BEZIER
                && i + 2 < points.len()
                && kinds[i + 1] == PointKind::BEZIER
                && kinds[i + 2].verb() == PointKind::BEZIER
            {
                self.add_log_points_new_stroke(&points[i..i + 3], PointKind::BEZIER)?;
                i += 2;
            } else {
                self.path.set_pos(orig_pos);
                return Err(PathError::InvalidParameter);
            }

            if kinds[i].is_close() {
                self.path.close_figure();
                if last_move < self.path.len() {
                    let opening = self.path.points()[last_move];
                    self.path.set_pos(opening);
                }
            }
            i += 1;
        }
        Ok(())
    }

    pub(crate) fn close_figure(&mut self) {
        // The close bit is a virtual closing edge; no line entry is drawn.
        if !self.path.is_empty() {
            self.path.close_figure();
            self.path.set_new_stroke(true);
        }
    }
}

// ---------------------------------------------------------------------------
// Public operations
// ---------------------------------------------------------------------------

impl DeviceContext {
    /// Move the current position without emitting geometry.
    pub fn move_to(&mut self, x: i32, y: i32) -> Result<()> {
        self.record(|r| r.move_to(x, y)).transpose()?;
        self.attrs.position = Point::new(x, y);
        Ok(())
    }

    /// Draw a line from the current position, which advances to `(x, y)`.
    pub fn line_to(&mut self, x: i32, y: i32) -> Result<()> {
        match self.record(|r| r.line_to(x, y)) {
            Some(result) => result?,
            None => {
                let from = self.lp_to_dp(self.attrs.position);
                let to = self.lp_to_dp(Point::new(x, y));
                let pen = self.attrs.pen;
                self.backend.polyline(&[from, to], &pen);
            }
        }
        self.attrs.position = Point::new(x, y);
        Ok(())
    }

    /// Draw lines through each point in turn, advancing the current
    /// position to the last.
    pub fn polyline_to(&mut self, points: &[Point]) -> Result<()> {
        match self.record(|r| r.polyline_to(points)) {
            Some(result) => result?,
            None => {
                let mut device = Vec::with_capacity(points.len() + 1);
                device.push(self.lp_to_dp(self.attrs.position));
                device.extend(points.iter().map(|p| self.lp_to_dp(*p)));
                let pen = self.attrs.pen;
                self.backend.polyline(&device, &pen);
            }
        }
        if let Some(last) = points.last() {
            self.attrs.position = *last;
        }
        Ok(())
    }

    /// Draw cubic Beziers from the current position; `points` holds
    /// control-point triples. Advances the current position to the last
    /// point.
    pub fn poly_bezier_to(&mut self, points: &[Point]) -> Result<()> {
        match self.record(|r| r.poly_bezier_to(points)) {
            Some(result) => result?,
            None => {
                if points.len() % 3 != 0 {
                    return Err(PathError::InvalidParameter);
                }
                self.passthrough_stroke(|r| r.poly_bezier_to(points))
                    .map(|_| ())?;
            }
        }
        if let Some(last) = points.last() {
            self.attrs.position = *last;
        }
        Ok(())
    }

    /// Draw cubic Beziers; `points` is a start point followed by
    /// control-point triples. The current position is not changed.
    pub fn poly_bezier(&mut self, points: &[Point]) -> Result<()> {
        match self.record(|r| r.poly_bezier(points)) {
            Some(result) => result,
            None => self.passthrough_stroke(|r| r.poly_bezier(points)).map(|_| ()),
        }
    }

    /// Draw an open polyline. The current position is not changed.
    pub fn polyline(&mut self, points: &[Point]) -> Result<()> {
        match self.record(|r| r.polyline(points)) {
            Some(result) => result,
            None => self.passthrough_stroke(|r| r.polyline(points)).map(|_| ()),
        }
    }

    /// Draw a closed polygon. The current position is not changed.
    pub fn polygon(&mut self, points: &[Point]) -> Result<()> {
        match self.record(|r| r.polygon(points)) {
            Some(result) => result,
            None => self.passthrough_stroke(|r| r.polygon(points)).map(|_| ()),
        }
    }

    /// Draw several open polylines; `counts` partitions `points`.
    pub fn poly_polyline(&mut self, points: &[Point], counts: &[usize]) -> Result<()> {
        match self.record(|r| r.poly_polyline(points, counts)) {
            Some(result) => result,
            None => self
                .passthrough_stroke(|r| r.poly_polyline(points, counts))
                .map(|_| ()),
        }
    }

    /// Draw several closed polygons; `counts` partitions `points`.
    pub fn poly_polygon(&mut self, points: &[Point], counts: &[usize]) -> Result<()> {
        match self.record(|r| r.poly_polygon(points, counts)) {
            Some(result) => result,
            None => self
                .passthrough_stroke(|r| r.poly_polygon(points, counts))
                .map(|_| ()),
        }
    }

    /// Draw a mixed sequence of moves, lines and Bezier triples tagged by
    /// `kinds`. The current position follows the walk.
    pub fn poly_draw(&mut self, points: &[Point], kinds: &[PointKind]) -> Result<()> {
        let final_pos = match self.record(|r| {
            r.poly_draw(points, kinds)?;
            Ok(r.path.pos())
        }) {
            Some(result) => result?,
            None => {
                let scratch = self.passthrough_stroke(|r| r.poly_draw(points, kinds))?;
                scratch.pos()
            }
        };
        self.attrs.position = self.device_to_logical_pos(final_pos);
        Ok(())
    }

    /// Best-effort logical equivalent of a device-space cursor, for ops
    /// whose endpoint is only known in device coordinates.
    pub(crate) fn device_to_logical_pos(&self, pos: Point) -> Point {
        if self.attrs.transform.determinant().abs() < pathworks_graphics::types::NEAR_ZERO {
            return self.attrs.position;
        }
        Point::from_float(self.attrs.transform.inverse() * pos.to_float())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
