//! The path buffer: dual growable arrays of points and kind flags.
//!
//! The buffer is deliberately two parallel arrays rather than a vector of
//! tagged entries: the region bridge hands the point array to the polygon
//! constructor without copying, and several recording sites patch a kind
//! slot after a bulk append (e.g. downgrading the first entry of a run to a
//! move). Points are always stored in device coordinates.
//!
//! A *stroke* is a move entry followed by line or Bezier entries up to, but
//! not including, the next move. A *figure* runs between two moves and may
//! contain several strokes; its last entry may carry the close bit.

use std::fmt;

use log::trace;
use pathworks_graphics::types::Point;

use crate::error::{PathError, Result};

/// Initial size of the points / kinds arrays.
const INITIAL_ENTRIES: usize = 16;

// ---------------------------------------------------------------------------
// PointKind
// ---------------------------------------------------------------------------

/// Kind flags for one path entry.
///
/// The low bits hold the primary verb (move, line or Bezier); the close bit
/// may be ORed onto the final entry of a figure.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct PointKind(u8);

impl PointKind {
    const CLOSE_BIT: u8 = 0x01;

    /// Starts a new stroke at the entry's point.
    pub const MOVE: Self = Self(0x06);
    /// A straight segment from the previous point.
    pub const LINE: Self = Self(0x02);
    /// One of three consecutive cubic Bezier control entries.
    pub const BEZIER: Self = Self(0x04);

    /// The primary verb, with the close bit masked off.
    #[must_use]
    pub const fn verb(self) -> Self {
        Self(self.0 & !Self::CLOSE_BIT)
    }

    /// Whether the close bit is set.
    #[must_use]
    pub const fn is_close(self) -> bool {
        self.0 & Self::CLOSE_BIT != 0
    }

    /// This kind with the close bit set.
    #[must_use]
    pub const fn with_close(self) -> Self {
        Self(self.0 | Self::CLOSE_BIT)
    }

    /// Raw flag byte.
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }
}

impl fmt::Debug for PointKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.verb() {
            Self::MOVE => write!(f, "MOVE")?,
            Self::LINE => write!(f, "LINE")?,
            Self::BEZIER => write!(f, "BEZIER")?,
            other => write!(f, "PointKind({:#04x})", other.0)?,
        }
        if self.is_close() {
            write!(f, "|CLOSE")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// PathBuffer
// ---------------------------------------------------------------------------

/// A recorded path plus the recording cursor state.
///
/// `pos` is the current position in device coordinates; `new_stroke` is true
/// when the next non-move append must open a new stroke with an implicit
/// move at `pos`.
pub struct PathBuffer {
    points: Vec<Point>,
    kinds: Vec<PointKind>,
    /// Guaranteed capacity of both arrays.
    allocated: usize,
    pos: Point,
    new_stroke: bool,
}

impl PathBuffer {
    /// Allocate an empty path with room for at least `count` entries
    /// (minimum [`INITIAL_ENTRIES`]).
    ///
    /// # Errors
    ///
    /// [`PathError::OutOfMemory`] if either array cannot be allocated.
    pub fn alloc(count: usize) -> Result<Self> {
        let mut path = Self {
            points: Vec::new(),
            kinds: Vec::new(),
            allocated: 0,
            pos: Point::ZERO,
            new_stroke: true,
        };
        path.grow(count.max(INITIAL_ENTRIES))?;
        Ok(path)
    }

    /// Deep-copy the path, including cursor state. The copy's capacity
    /// equals its entry count.
    ///
    /// # Errors
    ///
    /// [`PathError::OutOfMemory`] if either array cannot be allocated.
    pub fn try_clone(&self) -> Result<Self> {
        let mut points = Vec::new();
        points
            .try_reserve_exact(self.points.len())
            .map_err(|_| PathError::OutOfMemory)?;
        points.extend_from_slice(&self.points);

        let mut kinds = Vec::new();
        kinds
            .try_reserve_exact(self.kinds.len())
            .map_err(|_| PathError::OutOfMemory)?;
        kinds.extend_from_slice(&self.kinds);

        Ok(Self {
            allocated: points.len(),
            points,
            kinds,
            pos: self.pos,
            new_stroke: self.new_stroke,
        })
    }

    /// Ensure capacity for at least `count` entries.
    ///
    /// Capacity grows exponentially (at least doubling), which keeps total
    /// append cost linear.
    ///
    /// # Errors
    ///
    /// [`PathError::OutOfMemory`] if an array cannot be grown. The points
    /// array may already have been expanded when the kinds array fails;
    /// existing entries are intact either way and the caller is expected to
    /// abort the path.
    pub fn reserve(&mut self, count: usize) -> Result<()> {
        if count <= self.allocated {
            return Ok(());
        }
        let target = count.max(self.allocated * 2);
        self.grow(target)
    }

    fn grow(&mut self, target: usize) -> Result<()> {
        self.points
            .try_reserve_exact(target - self.points.len())
            .map_err(|_| PathError::OutOfMemory)?;
        self.kinds
            .try_reserve_exact(target - self.kinds.len())
            .map_err(|_| PathError::OutOfMemory)?;
        self.allocated = target;
        Ok(())
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the path has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Guaranteed capacity of both arrays.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.allocated
    }

    /// The recorded points, in device coordinates.
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// The recorded kind flags.
    #[must_use]
    pub fn kinds(&self) -> &[PointKind] {
        &self.kinds
    }

    /// Mutable access to the kind flags, for patching after a bulk append.
    #[must_use]
    pub fn kinds_mut(&mut self) -> &mut [PointKind] {
        &mut self.kinds
    }

    /// The current position (device coordinates).
    #[must_use]
    pub const fn pos(&self) -> Point {
        self.pos
    }

    pub fn set_pos(&mut self, pos: Point) {
        self.pos = pos;
    }

    /// Whether the next non-move append must open a new stroke.
    #[must_use]
    pub const fn new_stroke(&self) -> bool {
        self.new_stroke
    }

    pub fn set_new_stroke(&mut self, new_stroke: bool) {
        self.new_stroke = new_stroke;
    }

    /// Append one entry.
    ///
    /// # Errors
    ///
    /// [`PathError::OutOfMemory`] if the buffer cannot be grown.
    pub fn add_entry(&mut self, point: Point, kind: PointKind) -> Result<()> {
        trace!("({}, {}) - {:?}", point.x, point.y, kind);
        self.reserve(self.len() + 1)?;
        self.points.push(point);
        self.kinds.push(kind);
        Ok(())
    }

    /// Append a run of device-space points, all with the same kind.
    ///
    /// Returns the index of the first new kind slot so the caller can patch
    /// it (e.g. downgrade the leading entry of a run to [`PointKind::MOVE`]).
    ///
    /// # Errors
    ///
    /// [`PathError::OutOfMemory`] if the buffer cannot be grown.
    pub fn add_points(&mut self, points: &[Point], kind: PointKind) -> Result<usize> {
        self.reserve(self.len() + points.len())?;
        let first = self.kinds.len();
        self.points.extend_from_slice(points);
        self.kinds.resize(first + points.len(), kind);
        Ok(first)
    }

    /// Set the close bit on the last entry.
    pub fn close_figure(&mut self) {
        debug_assert!(!self.is_empty(), "close_figure on an empty path");
        if let Some(last) = self.kinds.last_mut() {
            *last = last.with_close();
        }
    }

    /// Set the current position to the last appended point.
    pub fn update_pos_from_last(&mut self) {
        debug_assert!(!self.is_empty(), "no entries to take the position from");
        if let Some(last) = self.points.last() {
            self.pos = *last;
        }
    }
}

impl fmt::Debug for PathBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PathBuffer")
            .field("count", &self.len())
            .field("pos", &self.pos)
            .field("new_stroke", &self.new_stroke)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
