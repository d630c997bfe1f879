//! The widener: build the stroked outline of a path.
//!
//! The path is flattened first, then split into sub-paths on each move.
//! Every sub-path is walked vertex by vertex producing two offset
//! polylines, *up* (left of the direction of travel) and *down* (right).
//! Open sub-paths get cap geometry at both ends, emitted into the up
//! polyline; interior vertices get an inner offset pair plus join geometry
//! on the outer side. The polylines are finally concatenated, the down side
//! reversed, into one outline figure per open sub-path and an outer/inner
//! ring pair per closed one.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

use log::error;

use pathworks_graphics::arc::ArcBox;
use pathworks_graphics::types::{FloatPoint, Point, Scalar};

use crate::error::{PathError, Result};
use crate::flatten;
use crate::path::{PathBuffer, PointKind};
use crate::pen::{EndCap, LineJoin, Pen};
use crate::shapes::add_arc_part;

/// Round an offset to the nearest integer, half away from zero.
#[expect(
    clippy::cast_possible_truncation,
    reason = "pen offsets are far below i32 range"
)]
fn round_offset(v: Scalar) -> i32 {
    (if v > 0.0 { v + 0.5 } else { v - 0.5 }) as i32
}

/// Split a flattened path into per-stroke sub-paths.
///
/// The first entry, and every entry following a closed figure, must be a
/// move; Beziers cannot appear in a flattened path.
fn split_strokes(flat: &PathBuffer) -> Result<Vec<PathBuffer>> {
    let mut strokes: Vec<PathBuffer> = Vec::new();
    for i in 0..flat.len() {
        let kind = flat.kinds()[i];
        if (i == 0 || flat.kinds()[i - 1].is_close()) && kind != PointKind::MOVE {
            error!(
                "expected a move {}, got {kind:?}",
                if i == 0 {
                    "as first entry"
                } else {
                    "after a closed figure"
                }
            );
            return Err(PathError::CannotComplete);
        }
        if kind == PointKind::MOVE {
            strokes.push(PathBuffer::alloc(0)?);
        } else if kind.verb() != PointKind::LINE {
            error!("unexpected entry {kind:?} in flattened path");
            return Err(PathError::CannotComplete);
        }
        let Some(stroke) = strokes.last_mut() else {
            return Err(PathError::CannotComplete);
        };
        stroke.add_entry(flat.points()[i], kind)?;
    }
    Ok(strokes)
}

/// Widen `path` into its stroked outline under `pen`.
#[expect(
    clippy::float_cmp,
    reason = "a turn angle of exactly zero skips the vertex"
)]
#[expect(
    clippy::too_many_lines,
    reason = "the cap/join vertex walk is one coherent algorithm"
)]
pub(crate) fn widen(path: &PathBuffer, pen: &Pen, miter_limit: Scalar) -> Result<PathBuffer> {
    let flat = flatten::flatten(path)?;

    // An odd width hangs the extra pixel on the outer side.
    let width_in = pen.width / 2;
    let width_out = pen.width - width_in;
    let w_in = f64::from(width_in);
    let w_out = f64::from(width_out);

    let strokes = split_strokes(&flat)?;
    let mut result = PathBuffer::alloc(flat.len())?;

    for stroke in &strokes {
        let pts = stroke.points();
        let n = pts.len();
        let closed = stroke.kinds()[n - 1].is_close();
        let mut up = PathBuffer::alloc(n)?;
        let mut down = PathBuffer::alloc(n)?;

        for j in 0..n {
            let xo = f64::from(pts[j].x);
            let yo = f64::from(pts[j].y);

            if !closed && (j == 0 || j == n - 1) {
                // Endpoint of an open sub-path: emit the cap.
                if n < 2 {
                    // A lone move has no direction to cap against.
                    continue;
                }
                let neighbor = if j == 0 { pts[1] } else { pts[j - 1] };
                let theta = (f64::from(neighbor.y) - yo).atan2(f64::from(neighbor.x) - xo);
                let lead = if j == 0 { PointKind::MOVE } else { PointKind::LINE };

                match pen.end_cap {
                    EndCap::Square => {
                        let diag = 2.0_f64.sqrt();
                        up.add_entry(
                            Point::new(
                                pts[j].x + round_offset(diag * w_out * (FRAC_PI_4 + theta).cos()),
                                pts[j].y + round_offset(diag * w_out * (FRAC_PI_4 + theta).sin()),
                            ),
                            lead,
                        )?;
                        up.add_entry(
                            Point::new(
                                pts[j].x + round_offset(diag * w_in * (-FRAC_PI_4 + theta).cos()),
                                pts[j].y + round_offset(diag * w_in * (-FRAC_PI_4 + theta).sin()),
                            ),
                            PointKind::LINE,
                        )?;
                    }
                    EndCap::Flat => {
                        up.add_entry(
                            Point::new(
                                pts[j].x + round_offset(w_out * (theta + FRAC_PI_2).cos()),
                                pts[j].y + round_offset(w_out * (theta + FRAC_PI_2).sin()),
                            ),
                            lead,
                        )?;
                        up.add_entry(
                            Point::new(
                                pts[j].x - round_offset(w_in * (theta + FRAC_PI_2).cos()),
                                pts[j].y - round_offset(w_in * (theta + FRAC_PI_2).sin()),
                            ),
                            PointKind::LINE,
                        )?;
                    }
                    EndCap::Round => {
                        let cap_box = ArcBox {
                            min: FloatPoint::new(xo - w_in, yo - w_in),
                            max: FloatPoint::new(xo + w_out, yo + w_out),
                        };
                        let first = (j == 0).then_some(PointKind::MOVE);
                        add_arc_part(
                            &mut up,
                            &cap_box,
                            theta + FRAC_PI_2,
                            theta + 3.0 * FRAC_PI_4,
                            first,
                        )?;
                        add_arc_part(&mut up, &cap_box, theta + 3.0 * FRAC_PI_4, theta + PI, None)?;
                        add_arc_part(&mut up, &cap_box, theta + PI, theta + 5.0 * FRAC_PI_4, None)?;
                        add_arc_part(
                            &mut up,
                            &cap_box,
                            theta + 5.0 * FRAC_PI_4,
                            theta + 3.0 * FRAC_PI_2,
                            None,
                        )?;
                    }
                }
            } else {
                // Interior vertex (or any vertex of a closed sub-path).
                let previous = if j == 0 { n - 1 } else { j - 1 };
                let next = if j == n - 1 { 0 } else { j + 1 };
                let xa = f64::from(pts[previous].x);
                let ya = f64::from(pts[previous].y);
                let xb = f64::from(pts[next].x);
                let yb = f64::from(pts[next].y);

                let theta = (yo - ya).atan2(xo - xa);
                // Turn angle, shifted onto the interior side.
                let mut alpha = (yb - yo).atan2(xb - xo) - theta;
                if alpha > 0.0 {
                    alpha -= PI;
                } else {
                    alpha += PI;
                }

                let mut join = pen.join;
                if join == LineJoin::Miter && miter_limit < (1.0 / (alpha / 2.0).sin()).abs() {
                    join = LineJoin::Bevel;
                }
                if alpha == 0.0 {
                    continue;
                }
                let (inside, outside) = if alpha > 0.0 {
                    (&mut up, &mut down)
                } else {
                    (&mut down, &mut up)
                };
                let inner_sign = if alpha > 0.0 { -1 } else { 1 };

                // Two inner offset points approximate the inside corner.
                inside.add_entry(
                    Point::new(
                        pts[j].x + inner_sign * round_offset(w_in * (theta + FRAC_PI_2).cos()),
                        pts[j].y + inner_sign * round_offset(w_in * (theta + FRAC_PI_2).sin()),
                    ),
                    PointKind::LINE,
                )?;
                inside.add_entry(
                    Point::new(
                        pts[j].x
                            - inner_sign * round_offset(w_in * (FRAC_PI_2 + alpha + theta).cos()),
                        pts[j].y
                            - inner_sign * round_offset(w_in * (FRAC_PI_2 + alpha + theta).sin()),
                    ),
                    PointKind::LINE,
                )?;

                match join {
                    LineJoin::Miter => {
                        let miter_width = (w_out / (FRAC_PI_2 - alpha.abs() / 2.0).cos()).abs();
                        outside.add_entry(
                            Point::new(
                                pts[j].x + round_offset(miter_width * (theta + alpha / 2.0).cos()),
                                pts[j].y + round_offset(miter_width * (theta + alpha / 2.0).sin()),
                            ),
                            PointKind::LINE,
                        )?;
                    }
                    LineJoin::Bevel => {
                        outside.add_entry(
                            Point::new(
                                pts[j].x
                                    - inner_sign * round_offset(w_out * (theta + FRAC_PI_2).cos()),
                                pts[j].y
                                    - inner_sign * round_offset(w_out * (theta + FRAC_PI_2).sin()),
                            ),
                            PointKind::LINE,
                        )?;
                        outside.add_entry(
                            Point::new(
                                pts[j].x
                                    + inner_sign
                                        * round_offset(w_out * (FRAC_PI_2 + alpha + theta).cos()),
                                pts[j].y
                                    + inner_sign
                                        * round_offset(w_out * (FRAC_PI_2 + alpha + theta).sin()),
                            ),
                            PointKind::LINE,
                        )?;
                    }
                    LineJoin::Round => {
                        // A cubic across the outer corner; the control
                        // entries become plain vertices at concatenation.
                        outside.add_entry(
                            Point::new(
                                pts[j].x
                                    - inner_sign * round_offset(w_out * (theta + FRAC_PI_2).cos()),
                                pts[j].y
                                    - inner_sign * round_offset(w_out * (theta + FRAC_PI_2).sin()),
                            ),
                            PointKind::BEZIER,
                        )?;
                        outside.add_entry(
                            Point::new(
                                pts[j].x + round_offset(w_out * (theta + alpha / 2.0).cos()),
                                pts[j].y + round_offset(w_out * (theta + alpha / 2.0).sin()),
                            ),
                            PointKind::BEZIER,
                        )?;
                        outside.add_entry(
                            Point::new(
                                pts[j].x
                                    + inner_sign
                                        * round_offset(w_out * (FRAC_PI_2 + alpha + theta).cos()),
                                pts[j].y
                                    + inner_sign
                                        * round_offset(w_out * (FRAC_PI_2 + alpha + theta).sin()),
                            ),
                            PointKind::BEZIER,
                        )?;
                    }
                }
            }
        }

        // Concatenate: up forward, then down reversed. An open sub-path
        // yields one outline figure (the caps connect the sides); a closed
        // one yields separate outer and inner rings.
        for (j, p) in up.points().iter().enumerate() {
            let kind = if j == 0 {
                PointKind::MOVE
            } else {
                PointKind::LINE
            };
            result.add_entry(*p, kind)?;
        }
        for (j, p) in down.points().iter().rev().enumerate() {
            let kind = if j == 0 && closed {
                PointKind::MOVE
            } else {
                PointKind::LINE
            };
            result.add_entry(*p, kind)?;
        }
    }
    Ok(result)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn open_l_path() -> PathBuffer {
        let mut path = PathBuffer::alloc(0).unwrap();
        path.add_entry(Point::new(0, 0), PointKind::MOVE).unwrap();
        path.add_entry(Point::new(10, 0), PointKind::LINE).unwrap();
        path.add_entry(Point::new(10, 10), PointKind::LINE).unwrap();
        path
    }

    fn closed_rect_path() -> PathBuffer {
        let mut path = PathBuffer::alloc(0).unwrap();
        path.add_entry(Point::new(10, 0), PointKind::MOVE).unwrap();
        path.add_entry(Point::new(0, 0), PointKind::LINE).unwrap();
        path.add_entry(Point::new(0, 10), PointKind::LINE).unwrap();
        path.add_entry(Point::new(10, 10), PointKind::LINE.with_close())
            .unwrap();
        path
    }

    fn pen(width: i32, end_cap: EndCap, join: LineJoin) -> Pen {
        Pen {
            width,
            end_cap,
            join,
            kind: crate::pen::PenKind::Geometric,
        }
    }

    fn move_count(path: &PathBuffer) -> usize {
        path.kinds()
            .iter()
            .filter(|k| **k == PointKind::MOVE)
            .count()
    }

    #[test]
    fn single_segment_flat_caps_is_a_quad() {
        let mut path = PathBuffer::alloc(0).unwrap();
        path.add_entry(Point::new(0, 0), PointKind::MOVE).unwrap();
        path.add_entry(Point::new(10, 0), PointKind::LINE).unwrap();

        let wide = widen(&path, &pen(4, EndCap::Flat, LineJoin::Miter), 10.0).unwrap();
        assert_eq!(wide.len(), 4);
        assert_eq!(wide.kinds()[0], PointKind::MOVE);
        assert_eq!(
            wide.points(),
            [
                Point::new(0, 2),
                Point::new(0, -2),
                Point::new(10, -2),
                Point::new(10, 2),
            ]
        );
    }

    #[test]
    fn open_path_point_counts_by_join() {
        let path = open_l_path();
        let miter = widen(&path, &pen(4, EndCap::Flat, LineJoin::Miter), 10.0).unwrap();
        let bevel = widen(&path, &pen(4, EndCap::Flat, LineJoin::Bevel), 10.0).unwrap();
        let round = widen(&path, &pen(4, EndCap::Flat, LineJoin::Round), 10.0).unwrap();
        // Caps contribute 2 + 2, the inner corner 2; the outer corner is 1,
        // 2 or 3 points by join style.
        assert_eq!(miter.len(), 7);
        assert_eq!(bevel.len(), 8);
        assert_eq!(round.len(), 9);
    }

    #[test]
    fn open_path_is_one_figure() {
        let wide = widen(
            &open_l_path(),
            &pen(4, EndCap::Flat, LineJoin::Miter),
            10.0,
        )
        .unwrap();
        assert_eq!(move_count(&wide), 1);
        assert_eq!(wide.kinds()[0], PointKind::MOVE);
    }

    #[test]
    fn miter_apex_position() {
        let wide = widen(
            &open_l_path(),
            &pen(4, EndCap::Flat, LineJoin::Miter),
            10.0,
        )
        .unwrap();
        // Right-angle corner at (10, 0), outer side away from (10, 10).
        assert!(wide.points().contains(&Point::new(12, -2)));
    }

    #[test]
    fn tight_miter_limit_falls_back_to_bevel() {
        let wide = widen(
            &open_l_path(),
            &pen(4, EndCap::Flat, LineJoin::Miter),
            1.0,
        )
        .unwrap();
        // Bevel fallback adds a second outer point.
        assert_eq!(wide.len(), 8);
    }

    #[test]
    fn closed_path_yields_two_rings() {
        let wide = widen(
            &closed_rect_path(),
            &pen(4, EndCap::Flat, LineJoin::Round),
            10.0,
        )
        .unwrap();
        // Outer ring of 3-point round joins, inner ring of offset pairs.
        assert_eq!(move_count(&wide), 2);
        assert_eq!(wide.kinds()[0], PointKind::MOVE);
        assert_eq!(wide.len(), 20);
        assert!(wide
            .kinds()
            .iter()
            .all(|k| k.verb() == PointKind::MOVE || k.verb() == PointKind::LINE));
        assert!(wide.kinds().iter().all(|k| !k.is_close()));
    }

    #[test]
    fn round_caps_emit_arc_geometry() {
        let mut path = PathBuffer::alloc(0).unwrap();
        path.add_entry(Point::new(0, 0), PointKind::MOVE).unwrap();
        path.add_entry(Point::new(20, 0), PointKind::LINE).unwrap();

        let wide = widen(&path, &pen(6, EndCap::Round, LineJoin::Miter), 10.0).unwrap();
        // Two half-turn caps of four arc parts each: 4 + 3 * 3 entries for
        // the leading cap, 3 * 4 for the trailing one.
        assert_eq!(wide.len(), 25);
        assert_eq!(move_count(&wide), 1);
    }

    #[test]
    fn widen_missing_leading_move_fails() {
        let mut path = PathBuffer::alloc(0).unwrap();
        path.add_entry(Point::new(0, 0), PointKind::LINE).unwrap();
        path.add_entry(Point::new(5, 5), PointKind::LINE).unwrap();
        assert_eq!(
            widen(&path, &pen(4, EndCap::Flat, LineJoin::Miter), 10.0)
                .err(),
            Some(PathError::CannotComplete)
        );
    }

    #[test]
    fn widen_empty_path_is_empty() {
        let path = PathBuffer::alloc(0).unwrap();
        let wide = widen(&path, &pen(4, EndCap::Flat, LineJoin::Miter), 10.0).unwrap();
        assert!(wide.is_empty());
    }

    #[test]
    fn odd_width_splits_two_and_three() {
        let mut path = PathBuffer::alloc(0).unwrap();
        path.add_entry(Point::new(0, 0), PointKind::MOVE).unwrap();
        path.add_entry(Point::new(10, 0), PointKind::LINE).unwrap();

        let wide = widen(&path, &pen(5, EndCap::Flat, LineJoin::Miter), 10.0).unwrap();
        // Width 5 splits into 2 + 3; each cap hangs the wider half on its
        // own outward side, so the quad is skewed.
        assert_eq!(
            wide.points(),
            [
                Point::new(0, 3),
                Point::new(0, -2),
                Point::new(10, -3),
                Point::new(10, 2),
            ]
        );
    }
}
