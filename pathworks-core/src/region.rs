//! The region bridge: partition a flattened path into sub-polygons and
//! hand them to the polygon-region constructor.

use pathworks_graphics::region::{FillMode, Region};

use crate::path::{PathBuffer, PointKind};

/// Per-polygon point counts for a flattened path, splitting on each move.
///
/// A trailing sub-polygon with fewer than two points is dropped; the region
/// constructor tolerates counts that cover only a prefix of the points.
pub(crate) fn polygon_counts(kinds: &[PointKind]) -> Vec<usize> {
    debug_assert!(
        kinds.is_empty() || kinds[0] == PointKind::MOVE,
        "flattened path must open with a move"
    );

    let mut counts = Vec::with_capacity(kinds.len() / 2 + 1);
    let mut pos = 0;
    for (i, kind) in kinds.iter().enumerate().skip(1) {
        if *kind == PointKind::MOVE {
            counts.push(i - pos);
            pos = i;
        }
    }
    if kinds.len() > pos + 1 {
        counts.push(kinds.len() - pos);
    }
    counts
}

/// Build a region from a flattened path, or `None` for an empty path.
pub(crate) fn region_from_path(path: &PathBuffer, mode: FillMode) -> Option<Region> {
    if path.is_empty() {
        return None;
    }
    let counts = polygon_counts(path.kinds());
    Region::from_poly_polygon(path.points(), &counts, mode)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pathworks_graphics::types::Point;

    #[expect(clippy::cast_possible_truncation, reason = "small test indices")]
    fn path_from(kinds: &[PointKind]) -> PathBuffer {
        let mut path = PathBuffer::alloc(0).unwrap();
        for (i, kind) in kinds.iter().enumerate() {
            path.add_entry(Point::new(i as i32, 0), *kind).unwrap();
        }
        path
    }

    #[test]
    fn single_polygon() {
        let kinds = [
            PointKind::MOVE,
            PointKind::LINE,
            PointKind::LINE,
            PointKind::LINE.with_close(),
        ];
        assert_eq!(polygon_counts(&kinds), [4]);
    }

    #[test]
    fn splits_on_moves() {
        let kinds = [
            PointKind::MOVE,
            PointKind::LINE,
            PointKind::LINE,
            PointKind::MOVE,
            PointKind::LINE,
        ];
        assert_eq!(polygon_counts(&kinds), [3, 2]);
    }

    #[test]
    fn trailing_lone_move_dropped() {
        let kinds = [
            PointKind::MOVE,
            PointKind::LINE,
            PointKind::LINE,
            PointKind::MOVE,
        ];
        assert_eq!(polygon_counts(&kinds), [3]);
    }

    #[test]
    fn empty_path_has_no_region() {
        let path = PathBuffer::alloc(0).unwrap();
        assert!(region_from_path(&path, FillMode::Alternate).is_none());
    }

    #[test]
    fn region_covers_rectangle() {
        let mut path = PathBuffer::alloc(0).unwrap();
        path.add_entry(Point::new(8, 0), PointKind::MOVE).unwrap();
        path.add_entry(Point::new(0, 0), PointKind::LINE).unwrap();
        path.add_entry(Point::new(0, 6), PointKind::LINE).unwrap();
        path.add_entry(Point::new(8, 6), PointKind::LINE.with_close())
            .unwrap();

        let region = region_from_path(&path, FillMode::Alternate).unwrap();
        assert!(region.contains(0, 0));
        assert!(region.contains(7, 5));
        assert!(!region.contains(8, 6));
    }

    #[test]
    fn counts_skip_degenerate_tail() {
        let path = path_from(&[
            PointKind::MOVE,
            PointKind::LINE,
            PointKind::LINE,
            PointKind::MOVE,
        ]);
        let region = region_from_path(&path, FillMode::Winding).unwrap();
        assert_eq!(region.contour_count(), 1);
    }
}
