//! Shape constructors: rectangles, round-rects, arcs, pies, chords,
//! ellipses and angle-arcs, built on the primitive recorder.
//!
//! Corner and control inputs are converted to device space first; arcs are
//! emitted as one cubic Bezier per quadrant spanned.

use std::f64::consts::{FRAC_PI_2, PI, TAU};

use pathworks_graphics::arc::{quarter_arc, ArcBox};
use pathworks_graphics::types::{round_coord, FloatPoint, Point, Scalar};

use crate::dc::{ArcDirection, DeviceContext, GraphicsMode};
use crate::error::Result;
use crate::path::{PathBuffer, PointKind};
use crate::recorder::Recorder;

/// What an arc invocation produces beyond the curve itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ArcKind {
    /// Just the arc.
    Open,
    /// Close the figure across the arc's ends.
    Chord,
    /// A line to the box center, closed.
    Pie,
    /// Continue the current stroke into the arc and leave the cursor at its
    /// end.
    ArcTo,
}

/// Append one Bezier arc segment spanning at most a quarter turn.
///
/// With `lead`, the segment's first control point is appended with that
/// kind; without it the current last entry is assumed to be the first
/// control point and only the remaining three are appended.
pub(crate) fn add_arc_part(
    path: &mut PathBuffer,
    arc_box: &ArcBox,
    angle_start: Scalar,
    angle_end: Scalar,
    lead: Option<PointKind>,
) -> Result<()> {
    let controls = quarter_arc(angle_start, angle_end);
    let mut device = [Point::ZERO; 4];
    for (dst, norm) in device.iter_mut().zip(&controls) {
        *dst = Point::from_float(arc_box.scale(*norm));
    }

    let skip = usize::from(lead.is_none());
    let first = path.add_points(&device[skip..], PointKind::BEZIER)?;
    if let Some(kind) = lead {
        path.kinds_mut()[first] = kind;
    }
    Ok(())
}

impl Recorder<'_> {
    /// Convert two logical corners to device space, canonicalized so the
    /// first is top-left. In compatible mode the bottom-right corner is
    /// pulled in by one pixel (half-open edges).
    fn check_corners(&self, x1: i32, y1: i32, x2: i32, y2: i32) -> (Point, Point) {
        let a = self.lp_to_dp(Point::new(x1, y1));
        let b = self.lp_to_dp(Point::new(x2, y2));
        let tl = Point::new(a.x.min(b.x), a.y.min(b.y));
        let mut br = Point::new(a.x.max(b.x), a.y.max(b.y));
        if self.attrs.graphics_mode == GraphicsMode::Compatible {
            br.x -= 1;
            br.y -= 1;
        }
        (tl, br)
    }

    pub(crate) fn rectangle(&mut self, x1: i32, y1: i32, x2: i32, y2: i32) -> Result<()> {
        let (tl, br) = self.check_corners(x1, y1, x2, y2);
        let points = [
            Point::new(br.x, tl.y),
            tl,
            Point::new(tl.x, br.y),
            br,
        ];
        let first = self.path.add_points(&points, PointKind::LINE)?;
        let kinds = self.path.kinds_mut();
        kinds[first] = PointKind::MOVE;
        kinds[first + 3] = kinds[first + 3].with_close();
        Ok(())
    }

    pub(crate) fn round_rect(
        &mut self,
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
        ell_width: i32,
        ell_height: i32,
    ) -> Result<()> {
        let (tl, br) = self.check_corners(x1, y1, x2, y2);
        let (ew, eh) = (f64::from(ell_width), f64::from(ell_height));

        // Top-right corner, then flats and corners counterclockwise in
        // logical terms (clockwise on a y-down device).
        let mut corner = ArcBox {
            min: FloatPoint::new(f64::from(br.x) - ew, f64::from(tl.y)),
            max: FloatPoint::new(f64::from(br.x), f64::from(tl.y) + eh),
        };
        add_arc_part(self.path, &corner, 0.0, -FRAC_PI_2, Some(PointKind::MOVE))?;
        self.path
            .add_entry(Point::new(tl.x + ell_width / 2, tl.y), PointKind::LINE)?;

        corner.min.x = f64::from(tl.x);
        corner.max.x = f64::from(tl.x) + ew;
        add_arc_part(self.path, &corner, -FRAC_PI_2, -PI, None)?;
        self.path
            .add_entry(Point::new(tl.x, br.y - ell_height / 2), PointKind::LINE)?;

        corner.min.y = f64::from(br.y) - eh;
        corner.max.y = f64::from(br.y);
        add_arc_part(self.path, &corner, PI, FRAC_PI_2, None)?;
        self.path
            .add_entry(Point::new(br.x - ell_width / 2, br.y), PointKind::LINE)?;

        corner.min.x = f64::from(br.x) - ew;
        corner.max.x = f64::from(br.x);
        add_arc_part(self.path, &corner, FRAC_PI_2, 0.0, None)?;

        self.path.close_figure();
        Ok(())
    }

    /// The arc primitive behind `arc`, `arc_to`, `chord`, `pie` and
    /// `ellipse`.
    ///
    /// The ellipse is inscribed in the logical box `(x1, y1)-(x2, y2)`; the
    /// arc sweeps from the ray toward `(xs, ys)` to the ray toward
    /// `(xe, ye)` in the given direction. A zero-width or zero-height box
    /// is a silent no-op.
    #[expect(
        clippy::too_many_arguments,
        reason = "the primitive takes the full bounding box and both rays"
    )]
    pub(crate) fn arc_core(
        &mut self,
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
        xs: i32,
        ys: i32,
        xe: i32,
        ye: i32,
        direction: ArcDirection,
        kind: ArcKind,
    ) -> Result<()> {
        if x1 == x2 || y1 == y2 {
            return Ok(());
        }

        let corner_a = self.lp_to_dp_float(FloatPoint::new(f64::from(x1), f64::from(y1)));
        let corner_b = self.lp_to_dp_float(FloatPoint::new(f64::from(x2), f64::from(y2)));
        let start = self.lp_to_dp_float(FloatPoint::new(f64::from(xs), f64::from(ys)));
        let end = self.lp_to_dp_float(FloatPoint::new(f64::from(xe), f64::from(ye)));

        let mut arc_box = ArcBox::from_corners(corner_a, corner_b);

        let n_start = arc_box.normalize(start);
        let n_end = arc_box.normalize(end);
        let angle_start = n_start.y.atan2(n_start.x);
        let mut angle_end = n_end.y.atan2(n_end.x);

        // Put the end angle on the correct side of the start angle.
        let clockwise = direction == ArcDirection::Clockwise;
        if clockwise {
            if angle_end <= angle_start {
                angle_end += TAU;
            }
        } else if angle_end >= angle_start {
            angle_end -= TAU;
        }

        if self.attrs.graphics_mode == GraphicsMode::Compatible {
            arc_box.max.x -= 1.0;
            arc_box.max.y -= 1.0;
        }

        // arc-to continues the current stroke; emit its opening move first.
        if kind == ArcKind::ArcTo {
            self.start_new_stroke()?;
        }

        // One Bezier per quadrant the sweep crosses, clamped by the end
        // angle.
        let mut first = true;
        let mut done = false;
        let mut quad_start: Scalar;
        let mut quad_end = 0.0;
        while !done {
            if first {
                quad_start = angle_start;
                quad_end = if clockwise {
                    ((angle_start / FRAC_PI_2).floor() + 1.0) * FRAC_PI_2
                } else {
                    ((angle_start / FRAC_PI_2).ceil() - 1.0) * FRAC_PI_2
                };
            } else {
                quad_start = quad_end;
                quad_end += if clockwise { FRAC_PI_2 } else { -FRAC_PI_2 };
            }
            if (clockwise && angle_end <= quad_end) || (!clockwise && angle_end >= quad_end) {
                quad_end = angle_end;
                done = true;
            }
            let lead = first.then(|| {
                if kind == ArcKind::ArcTo {
                    PointKind::LINE
                } else {
                    PointKind::MOVE
                }
            });
            add_arc_part(self.path, &arc_box, quad_start, quad_end, lead)?;
            first = false;
        }

        match kind {
            ArcKind::ArcTo => self.path.update_pos_from_last(),
            ArcKind::Open => {}
            ArcKind::Chord => self.path.close_figure(),
            ArcKind::Pie => {
                let center = arc_box.center();
                #[expect(
                    clippy::cast_possible_truncation,
                    reason = "pie centers truncate toward zero, matching rectangle math"
                )]
                let center = Point::new(center.x as i32, center.y as i32);
                self.path
                    .add_entry(center, PointKind::LINE.with_close())?;
            }
        }
        Ok(())
    }

    pub(crate) fn ellipse(&mut self, x1: i32, y1: i32, x2: i32, y2: i32) -> Result<()> {
        let mid_y = (y1 + y2) / 2;
        self.arc_core(
            x1,
            y1,
            x2,
            y2,
            x1,
            mid_y,
            x1,
            mid_y,
            self.attrs.arc_direction,
            ArcKind::Chord,
        )
    }

    /// Polar arc: center, radius, start angle and sweep in degrees
    /// (positive angles counterclockwise in logical space). Returns the
    /// logical end point.
    pub(crate) fn angle_arc(
        &mut self,
        x: i32,
        y: i32,
        radius: i32,
        start_deg: Scalar,
        sweep_deg: Scalar,
    ) -> Result<Point> {
        let r = f64::from(radius);
        let a0 = start_deg.to_radians();
        let a1 = (start_deg + sweep_deg).to_radians();
        // Logical y grows up for angles, device y grows down.
        let p1 = Point::new(
            round_coord(a0.cos().mul_add(r, f64::from(x))),
            round_coord(f64::from(y) - a0.sin() * r),
        );
        let p2 = Point::new(
            round_coord(a1.cos().mul_add(r, f64::from(x))),
            round_coord(f64::from(y) - a1.sin() * r),
        );
        let direction = if sweep_deg >= 0.0 {
            ArcDirection::CounterClockwise
        } else {
            ArcDirection::Clockwise
        };
        self.arc_core(
            x - radius,
            y - radius,
            x + radius,
            y + radius,
            p1.x,
            p1.y,
            p2.x,
            p2.y,
            direction,
            ArcKind::ArcTo,
        )?;
        Ok(p2)
    }
}

// ---------------------------------------------------------------------------
// Public operations
// ---------------------------------------------------------------------------

impl DeviceContext {
    /// Draw a rectangle with the given logical corners.
    pub fn rectangle(&mut self, x1: i32, y1: i32, x2: i32, y2: i32) -> Result<()> {
        match self.record(|r| r.rectangle(x1, y1, x2, y2)) {
            Some(result) => result,
            None => self
                .passthrough_stroke(|r| r.rectangle(x1, y1, x2, y2))
                .map(|_| ()),
        }
    }

    /// Draw a rectangle with elliptical corners of the given diameters.
    pub fn round_rect(
        &mut self,
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
        ell_width: i32,
        ell_height: i32,
    ) -> Result<()> {
        match self.record(|r| r.round_rect(x1, y1, x2, y2, ell_width, ell_height)) {
            Some(result) => result,
            None => self
                .passthrough_stroke(|r| r.round_rect(x1, y1, x2, y2, ell_width, ell_height))
                .map(|_| ()),
        }
    }

    /// Draw an elliptical arc in the current arc direction.
    #[expect(clippy::too_many_arguments, reason = "bounding box plus two rays")]
    pub fn arc(
        &mut self,
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
        xs: i32,
        ys: i32,
        xe: i32,
        ye: i32,
    ) -> Result<()> {
        let direction = self.attrs.arc_direction;
        match self.record(|r| r.arc_core(x1, y1, x2, y2, xs, ys, xe, ye, direction, ArcKind::Open))
        {
            Some(result) => result,
            None => self
                .passthrough_stroke(|r| {
                    r.arc_core(x1, y1, x2, y2, xs, ys, xe, ye, direction, ArcKind::Open)
                })
                .map(|_| ()),
        }
    }

    /// Draw an elliptical arc continuing the current stroke; the current
    /// position advances to the arc's end.
    #[expect(clippy::too_many_arguments, reason = "bounding box plus two rays")]
    pub fn arc_to(
        &mut self,
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
        xs: i32,
        ys: i32,
        xe: i32,
        ye: i32,
    ) -> Result<()> {
        let direction = self.attrs.arc_direction;
        let device_pos = match self.record(|r| {
            r.arc_core(x1, y1, x2, y2, xs, ys, xe, ye, direction, ArcKind::ArcTo)?;
            Ok(r.path.pos())
        }) {
            Some(result) => result?,
            None => {
                let scratch = self.passthrough_stroke(|r| {
                    r.arc_core(x1, y1, x2, y2, xs, ys, xe, ye, direction, ArcKind::ArcTo)
                })?;
                scratch.pos()
            }
        };
        self.attrs.position = self.device_to_logical_pos(device_pos);
        Ok(())
    }

    /// Draw an arc closed across its ends.
    #[expect(clippy::too_many_arguments, reason = "bounding box plus two rays")]
    pub fn chord(
        &mut self,
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
        xs: i32,
        ys: i32,
        xe: i32,
        ye: i32,
    ) -> Result<()> {
        let direction = self.attrs.arc_direction;
        match self.record(|r| r.arc_core(x1, y1, x2, y2, xs, ys, xe, ye, direction, ArcKind::Chord))
        {
            Some(result) => result,
            None => self
                .passthrough_stroke(|r| {
                    r.arc_core(x1, y1, x2, y2, xs, ys, xe, ye, direction, ArcKind::Chord)
                })
                .map(|_| ()),
        }
    }

    /// Draw an arc closed through the box center.
    #[expect(clippy::too_many_arguments, reason = "bounding box plus two rays")]
    pub fn pie(
        &mut self,
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
        xs: i32,
        ys: i32,
        xe: i32,
        ye: i32,
    ) -> Result<()> {
        let direction = self.attrs.arc_direction;
        match self.record(|r| r.arc_core(x1, y1, x2, y2, xs, ys, xe, ye, direction, ArcKind::Pie)) {
            Some(result) => result,
            None => self
                .passthrough_stroke(|r| {
                    r.arc_core(x1, y1, x2, y2, xs, ys, xe, ye, direction, ArcKind::Pie)
                })
                .map(|_| ()),
        }
    }

    /// Draw a full ellipse inscribed in the logical box.
    pub fn ellipse(&mut self, x1: i32, y1: i32, x2: i32, y2: i32) -> Result<()> {
        match self.record(|r| r.ellipse(x1, y1, x2, y2)) {
            Some(result) => result,
            None => self
                .passthrough_stroke(|r| r.ellipse(x1, y1, x2, y2))
                .map(|_| ()),
        }
    }

    /// Draw a circular arc from polar inputs, continuing the current
    /// stroke; the current position advances to the arc's end.
    pub fn angle_arc(
        &mut self,
        x: i32,
        y: i32,
        radius: i32,
        start_deg: Scalar,
        sweep_deg: Scalar,
    ) -> Result<()> {
        let end = match self.record(|r| r.angle_arc(x, y, radius, start_deg, sweep_deg)) {
            Some(result) => result?,
            None => {
                let mut end = Point::ZERO;
                self.passthrough_stroke(|r| {
                    end = r.angle_arc(x, y, radius, start_deg, sweep_deg)?;
                    Ok(())
                })?;
                end
            }
        };
        self.attrs.position = end;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PathError;

    fn open_dc() -> DeviceContext {
        let mut dc = DeviceContext::default();
        dc.attrs_mut().graphics_mode = GraphicsMode::Advanced;
        dc.begin_path().unwrap();
        dc
    }

    fn recorded(dc: &mut DeviceContext) -> (Vec<Point>, Vec<PointKind>) {
        dc.end_path().unwrap();
        let count = dc.get_path(None, None).unwrap();
        let mut points = vec![Point::ZERO; count];
        let mut kinds = vec![PointKind::LINE; count];
        dc.get_path(Some(&mut points), Some(&mut kinds)).unwrap();
        (points, kinds)
    }

    #[test]
    fn rectangle_entries() {
        let mut dc = open_dc();
        dc.rectangle(10, 20, 30, 40).unwrap();
        let (points, kinds) = recorded(&mut dc);
        assert_eq!(
            points,
            [
                Point::new(30, 20),
                Point::new(10, 20),
                Point::new(10, 40),
                Point::new(30, 40),
            ]
        );
        assert_eq!(
            kinds,
            [
                PointKind::MOVE,
                PointKind::LINE,
                PointKind::LINE,
                PointKind::LINE.with_close(),
            ]
        );
    }

    #[test]
    fn rectangle_canonicalizes_corners() {
        let mut dc = open_dc();
        dc.rectangle(30, 40, 10, 20).unwrap();
        let (points, _) = recorded(&mut dc);
        assert_eq!(points[1], Point::new(10, 20));
        assert_eq!(points[3], Point::new(30, 40));
    }

    #[test]
    fn rectangle_compatible_mode_shrinks() {
        let mut dc = DeviceContext::default();
        dc.begin_path().unwrap();
        dc.rectangle(10, 20, 30, 40).unwrap();
        let (points, _) = recorded(&mut dc);
        assert_eq!(
            points,
            [
                Point::new(29, 20),
                Point::new(10, 20),
                Point::new(10, 39),
                Point::new(29, 39),
            ]
        );
    }

    #[test]
    fn arc_single_quadrant() {
        let mut dc = open_dc();
        dc.arc(0, 0, 100, 100, 100, 50, 50, 0).unwrap();
        let (points, kinds) = recorded(&mut dc);
        assert_eq!(kinds.len(), 4);
        assert_eq!(kinds[0], PointKind::MOVE);
        assert_eq!(&kinds[1..], [PointKind::BEZIER; 3]);
        assert!(kinds.iter().all(|k| !k.is_close()));
        // Start of the sweep is the rightmost point of the box.
        assert_eq!(points[0], Point::new(100, 50));
        // End of the quadrant is the topmost point.
        assert_eq!(points[3], Point::new(50, 0));
    }

    #[test]
    fn arc_degenerate_box_appends_nothing() {
        let mut dc = open_dc();
        dc.arc(5, 0, 5, 100, 100, 50, 50, 0).unwrap();
        let (points, _) = recorded(&mut dc);
        assert!(points.is_empty());
    }

    #[test]
    fn chord_closes_figure() {
        let mut dc = open_dc();
        dc.chord(0, 0, 100, 100, 100, 50, 50, 0).unwrap();
        let (_, kinds) = recorded(&mut dc);
        assert!(kinds.last().unwrap().is_close());
    }

    #[test]
    fn pie_adds_closing_line_to_center() {
        let mut dc = open_dc();
        dc.pie(0, 0, 100, 100, 100, 50, 50, 0).unwrap();
        let (points, kinds) = recorded(&mut dc);
        assert_eq!(*kinds.last().unwrap(), PointKind::LINE.with_close());
        assert_eq!(*points.last().unwrap(), Point::new(50, 50));
    }

    #[test]
    fn ellipse_is_four_closed_quadrants() {
        let mut dc = open_dc();
        dc.ellipse(0, 0, 100, 100).unwrap();
        let (points, kinds) = recorded(&mut dc);
        assert_eq!(kinds.len(), 13);
        assert_eq!(kinds[0], PointKind::MOVE);
        assert!(kinds[1..].iter().all(|k| k.verb() == PointKind::BEZIER));
        assert!(kinds[12].is_close());
        // Starts and ends at the leftmost point of the box.
        assert_eq!(points[0], Point::new(0, 50));
        assert_eq!(points[12], Point::new(0, 50));
    }

    #[test]
    fn arc_to_continues_stroke() {
        let mut dc = open_dc();
        dc.move_to(0, 50).unwrap();
        dc.arc_to(0, 0, 100, 100, 100, 50, 50, 0).unwrap();
        let (points, kinds) = recorded(&mut dc);
        // Move at the cursor, a line onto the arc start, then the quadrant.
        assert_eq!(kinds[0], PointKind::MOVE);
        assert_eq!(kinds[1], PointKind::LINE);
        assert_eq!(points[0], Point::new(0, 50));
        assert_eq!(points[1], Point::new(100, 50));
        assert_eq!(&kinds[2..], [PointKind::BEZIER; 3]);
    }

    #[test]
    fn arc_to_updates_current_position() {
        let mut dc = open_dc();
        dc.move_to(0, 50).unwrap();
        dc.arc_to(0, 0, 100, 100, 100, 50, 50, 0).unwrap();
        assert_eq!(dc.attrs().position, Point::new(50, 0));
        dc.abort_path().unwrap();
    }

    #[test]
    fn angle_arc_quarter_turn() {
        let mut dc = open_dc();
        dc.move_to(100, 50).unwrap();
        dc.angle_arc(50, 50, 50, 0.0, 90.0).unwrap();
        // A 90° counterclockwise sweep from (100, 50) ends at the top of
        // the circle (device y grows down).
        assert_eq!(dc.attrs().position, Point::new(50, 0));
        let (_, kinds) = recorded(&mut dc);
        assert_eq!(kinds[0], PointKind::MOVE);
        assert_eq!(kinds[1], PointKind::LINE);
        assert!(kinds[2..].iter().all(|k| k.verb() == PointKind::BEZIER));
    }

    #[test]
    fn round_rect_shape() {
        let mut dc = open_dc();
        dc.round_rect(0, 0, 100, 80, 20, 20).unwrap();
        let (points, kinds) = recorded(&mut dc);
        // Four corner arcs (4 + 3 + 3 + 3 entries) and three flat lines;
        // the close bit supplies the fourth edge.
        assert_eq!(kinds.len(), 16);
        assert_eq!(kinds[0], PointKind::MOVE);
        assert!(kinds.last().unwrap().is_close());
        let lines = kinds
            .iter()
            .filter(|k| k.verb() == PointKind::LINE)
            .count();
        assert_eq!(lines, 3);
        // Flat-edge points sit on the rectangle borders.
        assert_eq!(points[4], Point::new(10, 0));
    }

    #[test]
    fn shape_ops_fail_without_open_path_only_on_bad_args() {
        // Shapes with no open path go to the backend, still validating.
        let mut dc = DeviceContext::default();
        assert_eq!(dc.polyline(&[]), Err(PathError::InvalidParameter));
        dc.rectangle(0, 0, 10, 10).unwrap();
    }
}
