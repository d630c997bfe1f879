//! Recording glyph outlines into a path.
//!
//! Each character's outline arrives as a stream of fixed-point contours
//! (y up); contours are recorded as a move, line runs, and cubic Bezier
//! segments expanded from spline runs by the midpoint construction. Each
//! contour closes its own figure.

use pathworks_fonts::{FixedPoint, GlyphOutline, GlyphSource, OutlineCurve};
use pathworks_graphics::types::Point;

use crate::dc::DeviceContext;
use crate::error::{PathError, Result};
use crate::path::PointKind;
use crate::recorder::Recorder;

impl Recorder<'_> {
    /// Record the outlines of `text` starting at the logical point
    /// `(x, y)`.
    ///
    /// Glyph coordinates are in device units relative to the baseline
    /// origin; the outline's y grows up, so it is subtracted from the
    /// device y. After each character the origin advances by the glyph's
    /// advance width, or by the matching entry of `advances` when given.
    pub(crate) fn text_out(
        &mut self,
        x: i32,
        y: i32,
        text: &str,
        advances: Option<&[i32]>,
        source: &dyn GlyphSource,
    ) -> Result<()> {
        if let Some(advances) = advances {
            if advances.len() < text.chars().count() {
                return Err(PathError::InvalidParameter);
            }
        }

        let origin = self.lp_to_dp(Point::new(x, y));
        let mut offset = 0i32;
        for (index, c) in text.chars().enumerate() {
            let Some(outline) = source.glyph_outline(c) else {
                return Err(PathError::CannotComplete);
            };
            if !outline.is_empty() {
                self.add_outline(Point::new(origin.x + offset, origin.y), &outline)?;
            }
            offset += advances.map_or(outline.advance, |a| a[index]);
        }
        Ok(())
    }

    fn add_outline(&mut self, origin: Point, outline: &GlyphOutline) -> Result<()> {
        for contour in &outline.contours {
            self.path
                .add_entry(fixed_to_device(origin, contour.start), PointKind::MOVE)?;

            // Spline runs continue from the last on-curve point.
            let mut anchor = contour.start;
            for curve in &contour.curves {
                match curve {
                    OutlineCurve::Line(points) => {
                        for p in points {
                            self.path
                                .add_entry(fixed_to_device(origin, *p), PointKind::LINE)?;
                        }
                        if let Some(last) = points.last() {
                            anchor = *last;
                        }
                    }
                    OutlineCurve::Quadratic(points) | OutlineCurve::Cubic(points) => {
                        let mut run = Vec::with_capacity(points.len() + 1);
                        run.push(fixed_to_device(origin, anchor));
                        run.extend(points.iter().map(|p| fixed_to_device(origin, *p)));
                        self.bezier_run(&run)?;
                        if let Some(last) = points.last() {
                            anchor = *last;
                        }
                    }
                }
            }
            self.path.close_figure();
        }
        Ok(())
    }

    /// Append a spline run of `points` (anchor first) as cubic segments.
    ///
    /// Two points degenerate to a line; three are one cubic whose first
    /// control point is the anchor itself. Longer runs emit one cubic per
    /// interior control point, with on-curve joints at the midpoints of
    /// consecutive controls.
    fn bezier_run(&mut self, points: &[Point]) -> Result<()> {
        match points.len() {
            0 | 1 => Ok(()),
            2 => self.path.add_entry(points[1], PointKind::LINE),
            3 => {
                self.path.add_points(points, PointKind::BEZIER)?;
                Ok(())
            }
            _ => {
                let mut anchor = points[0];
                let last_pair = points.len() - 2;
                for i in 1..last_pair {
                    let joint = Point::new(
                        (points[i].x + points[i + 1].x) / 2,
                        (points[i].y + points[i + 1].y) / 2,
                    );
                    self.path
                        .add_points(&[anchor, points[i], joint], PointKind::BEZIER)?;
                    anchor = joint;
                }
                self.path.add_points(
                    &[anchor, points[last_pair], points[last_pair + 1]],
                    PointKind::BEZIER,
                )?;
                Ok(())
            }
        }
    }
}

fn fixed_to_device(origin: Point, p: FixedPoint) -> Point {
    Point::new(
        origin.x + p.x.round_to_int(),
        origin.y - p.y.round_to_int(),
    )
}

// ---------------------------------------------------------------------------
// Public operation
// ---------------------------------------------------------------------------

impl DeviceContext {
    /// Record (or draw) the glyph outlines of `text` at the logical point
    /// `(x, y)`, advancing across characters by the glyph advances or the
    /// per-character `advances` when given.
    pub fn text_out(
        &mut self,
        x: i32,
        y: i32,
        text: &str,
        advances: Option<&[i32]>,
        source: &dyn GlyphSource,
    ) -> Result<()> {
        match self.record(|r| r.text_out(x, y, text, advances, source)) {
            Some(result) => result,
            None => self
                .passthrough_stroke(|r| r.text_out(x, y, text, advances, source))
                .map(|_| ()),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dc::GraphicsMode;
    use pathworks_fonts::{Contour, Fixed};

    fn fx(v: i32) -> Fixed {
        Fixed::from_int(v)
    }

    fn fp(x: i32, y: i32) -> FixedPoint {
        FixedPoint::new(fx(x), fx(y))
    }

    /// A source with a square glyph for 'o', an empty glyph for ' ', and a
    /// quadratic-spline glyph for 'q'.
    struct TestSource;

    impl GlyphSource for TestSource {
        fn glyph_outline(&self, c: char) -> Option<GlyphOutline> {
            match c {
                'o' => Some(GlyphOutline {
                    contours: vec![Contour {
                        start: fp(0, 0),
                        curves: vec![OutlineCurve::Line(vec![
                            fp(8, 0),
                            fp(8, 8),
                            fp(0, 8),
                        ])],
                    }],
                    advance: 10,
                }),
                'q' => Some(GlyphOutline {
                    contours: vec![Contour {
                        start: fp(0, 0),
                        curves: vec![OutlineCurve::Quadratic(vec![fp(4, 8), fp(8, 0)])],
                    }],
                    advance: 10,
                }),
                ' ' => Some(GlyphOutline {
                    contours: Vec::new(),
                    advance: 6,
                }),
                _ => None,
            }
        }
    }

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
    fn square_glyph_records_closed_contour() {
        let mut dc = open_dc();
        dc.text_out(100, 50, "o", None, &TestSource).unwrap();
        let (points, kinds) = recorded(&mut dc);
        assert_eq!(
            kinds,
            [
                PointKind::MOVE,
                PointKind::LINE,
                PointKind::LINE,
                PointKind::LINE.with_close(),
            ]
        );
        // Outline y is subtracted: the glyph rises above the baseline.
        assert_eq!(points[0], Point::new(100, 50));
        assert_eq!(points[1], Point::new(108, 50));
        assert_eq!(points[2], Point::new(108, 42));
        assert_eq!(points[3], Point::new(100, 42));
    }

    #[test]
    fn advance_offsets_following_glyphs() {
        let mut dc = open_dc();
        dc.text_out(0, 0, "oo", None, &TestSource).unwrap();
        let (points, _) = recorded(&mut dc);
        assert_eq!(points.len(), 8);
        assert_eq!(points[4], Point::new(10, 0));
    }

    #[test]
    fn caller_advances_override_glyph_advances() {
        let mut dc = open_dc();
        dc.text_out(0, 0, "oo", Some(&[20, 20]), &TestSource).unwrap();
        let (points, _) = recorded(&mut dc);
        assert_eq!(points[4], Point::new(20, 0));
    }

    #[test]
    fn undersized_advances_fail() {
        let mut dc = open_dc();
        assert_eq!(
            dc.text_out(0, 0, "oo", Some(&[20]), &TestSource),
            Err(PathError::InvalidParameter)
        );
        dc.abort_path().unwrap();
    }

    #[test]
    fn blank_glyph_is_skipped_but_advances() {
        let mut dc = open_dc();
        dc.text_out(0, 0, "o o", None, &TestSource).unwrap();
        let (points, kinds) = recorded(&mut dc);
        assert_eq!(kinds.len(), 8);
        // Second square starts after both advances: 10 + 6.
        assert_eq!(points[4], Point::new(16, 0));
    }

    #[test]
    fn unresolvable_character_fails() {
        let mut dc = open_dc();
        assert_eq!(
            dc.text_out(0, 0, "ox", None, &TestSource),
            Err(PathError::CannotComplete)
        );
        dc.abort_path().unwrap();
    }

    #[test]
    fn quadratic_spline_becomes_one_cubic() {
        let mut dc = open_dc();
        dc.text_out(0, 0, "q", None, &TestSource).unwrap();
        let (points, kinds) = recorded(&mut dc);
        // Anchor-as-control cubic: MOVE plus three Bezier entries.
        assert_eq!(
            kinds,
            [
                PointKind::MOVE,
                PointKind::BEZIER,
                PointKind::BEZIER,
                PointKind::BEZIER.with_close(),
            ]
        );
        assert_eq!(points[1], Point::new(0, 0));
        assert_eq!(points[2], Point::new(4, -8));
        assert_eq!(points[3], Point::new(8, 0));
    }

    #[test]
    fn long_spline_run_uses_midpoint_joints() {
        struct RunSource;
        impl GlyphSource for RunSource {
            fn glyph_outline(&self, _c: char) -> Option<GlyphOutline> {
                Some(GlyphOutline {
                    contours: vec![Contour {
                        start: fp(0, 0),
                        curves: vec![OutlineCurve::Quadratic(vec![
                            fp(10, 0),
                            fp(20, 0),
                            fp(30, 0),
                        ])],
                    }],
                    advance: 0,
                })
            }
        }

        let mut dc = open_dc();
        dc.text_out(0, 0, "a", None, &RunSource).unwrap();
        let (points, kinds) = recorded(&mut dc);
        // Anchor + 3 points: two cubic segments.
        assert_eq!(kinds.len(), 7);
        assert_eq!(kinds[0], PointKind::MOVE);
        assert_eq!(
            kinds[1..]
                .iter()
                .filter(|k| k.verb() == PointKind::BEZIER)
                .count(),
            6
        );
        // First segment: anchor, first control, midpoint of controls.
        assert_eq!(points[1], Point::new(0, 0));
        assert_eq!(points[2], Point::new(10, 0));
        assert_eq!(points[3], Point::new(15, 0));
        // Second segment restarts from the joint.
        assert_eq!(points[4], Point::new(15, 0));
        assert_eq!(points[5], Point::new(20, 0));
        assert_eq!(points[6], Point::new(30, 0));
    }
}
