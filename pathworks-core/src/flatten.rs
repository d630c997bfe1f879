//! The flattener: replace Bezier entries with line segments.

use log::error;

use pathworks_graphics::bezier::{flatten_points, CubicSegment, FLATTEN_TOLERANCE};
use pathworks_graphics::types::Point;

use crate::error::{PathError, Result};
use crate::path::{PathBuffer, PointKind};

/// Produce a copy of `path` containing only moves and lines.
///
/// Each Bezier triple is subdivided against its preceding anchor point; a
/// close bit on the triple's last entry moves onto the last generated line.
pub(crate) fn flatten(path: &PathBuffer) -> Result<PathBuffer> {
    let mut out = PathBuffer::alloc(path.len())?;
    let points = path.points();
    let kinds = path.kinds();

    let mut i = 0;
    while i < points.len() {
        match kinds[i].verb() {
            PointKind::MOVE | PointKind::LINE => {
                out.add_entry(points[i], kinds[i])?;
                i += 1;
            }
            PointKind::BEZIER => {
                if i == 0 || i + 2 >= points.len() {
                    error!("truncated Bezier run at entry {i}");
                    return Err(PathError::CannotComplete);
                }
                let seg = CubicSegment::new(
                    points[i - 1].to_float(),
                    points[i].to_float(),
                    points[i + 1].to_float(),
                    points[i + 2].to_float(),
                );
                let closed = kinds[i + 2].is_close();
                let line = flatten_points(&seg, FLATTEN_TOLERANCE);
                // The first subdivision point is the anchor, already present.
                for p in &line[1..] {
                    out.add_entry(Point::from_float(*p), PointKind::LINE)?;
                }
                if closed {
                    out.close_figure();
                }
                i += 3;
            }
            other => {
                error!("unexpected path entry kind {other:?}");
                return Err(PathError::CannotComplete);
            }
        }
    }
    Ok(out)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
