//! The path driver: a recorder frame stacked on top of the output driver.
//!
//! While a path is open, a [`DriverFrame::Recorder`] sits on top of the
//! context's driver stack and every geometric drawing operation is diverted
//! into it; closing or aborting the path pops the frame and the base
//! [`DriverFrame::Output`] frame resumes forwarding to the backend.

use pathworks_graphics::region::Region;

use crate::backend::ClipCombine;
use crate::dc::DeviceContext;
use crate::error::{PathError, Result};
use crate::path::PathBuffer;
use crate::pen::PenKind;
use crate::region::{polygon_counts, region_from_path};
use crate::widen;

/// One frame of a device context's driver stack.
pub(crate) enum DriverFrame {
    /// Diverts drawing operations into an open path.
    Recorder(PathBuffer),
    /// Forwards drawing operations to the backend.
    Output,
}

impl DeviceContext {
    // -- path lifecycle ----------------------------------------------------

    /// Open a path and start diverting drawing operations into it.
    ///
    /// The recorder's cursor is seeded from the current position, and any
    /// previously closed path is discarded. Opening while already recording
    /// is a no-op.
    ///
    /// # Errors
    ///
    /// [`PathError::OutOfMemory`] if the path buffer cannot be allocated.
    pub fn begin_path(&mut self) -> Result<()> {
        if self.is_recording() {
            return Ok(());
        }
        let mut path = PathBuffer::alloc(0)?;
        path.set_pos(self.lp_to_dp(self.attrs.position));
        self.drivers.push(DriverFrame::Recorder(path));
        self.closed = None;
        Ok(())
    }

    /// Seal the open path, moving it into the closed-path slot.
    ///
    /// # Errors
    ///
    /// [`PathError::CannotComplete`] if no path is open.
    pub fn end_path(&mut self) -> Result<()> {
        if !self.is_recording() {
            return Err(PathError::CannotComplete);
        }
        if let Some(DriverFrame::Recorder(path)) = self.drivers.pop() {
            self.closed = Some(path);
        }
        Ok(())
    }

    /// Discard the open path (if any) and the closed path.
    pub fn abort_path(&mut self) -> Result<()> {
        if self.is_recording() {
            self.drivers.pop();
        }
        self.closed = None;
        Ok(())
    }

    /// Close the current figure of the open path.
    ///
    /// Sets the close bit on the last entry; no line is drawn, the bit
    /// itself is the virtual closing edge. A no-op on an empty path.
    ///
    /// # Errors
    ///
    /// [`PathError::CannotComplete`] if no path is open.
    pub fn close_figure(&mut self) -> Result<()> {
        self.record(|r| {
            r.close_figure();
            Ok(())
        })
        .unwrap_or(Err(PathError::CannotComplete))
    }

    // -- terminal operations -----------------------------------------------

    /// Replace the closed path with its flattened form.
    ///
    /// # Errors
    ///
    /// [`PathError::CannotComplete`] if no closed path exists;
    /// [`PathError::OutOfMemory`] on allocation failure (the stored path is
    /// left intact).
    pub fn flatten_path(&mut self) -> Result<()> {
        let flat = {
            let Some(path) = &self.closed else {
                return Err(PathError::CannotComplete);
            };
            crate::flatten::flatten(path)?
        };
        self.closed = Some(flat);
        Ok(())
    }

    /// Replace the closed path with its widened (stroked-outline) form.
    ///
    /// # Errors
    ///
    /// [`PathError::CannotComplete`] for a cosmetic pen or when no closed
    /// path exists; [`PathError::OutOfMemory`] on allocation failure. The
    /// stored path is left intact on failure.
    pub fn widen_path(&mut self) -> Result<()> {
        if self.attrs.pen.kind == PenKind::Cosmetic {
            return Err(PathError::CannotComplete);
        }
        let widened = {
            let Some(path) = &self.closed else {
                return Err(PathError::CannotComplete);
            };
            widen::widen(path, &self.attrs.pen, self.attrs.miter_limit)?
        };
        self.closed = Some(widened);
        Ok(())
    }

    /// Convert the closed path to a filled region, consuming it.
    ///
    /// Returns `None` for an empty path.
    ///
    /// # Errors
    ///
    /// [`PathError::CannotComplete`] if no closed path exists.
    pub fn path_to_region(&mut self) -> Result<Option<Region>> {
        let flat = self.take_flat_path()?;
        Ok(region_from_path(&flat, self.attrs.fill_mode))
    }

    /// Fill the closed path through the backend, consuming it.
    ///
    /// # Errors
    ///
    /// [`PathError::CannotComplete`] if no closed path exists.
    pub fn fill_path(&mut self) -> Result<()> {
        let flat = self.take_flat_path()?;
        let counts = polygon_counts(flat.kinds());
        self.backend
            .fill_polygons(flat.points(), &counts, self.attrs.fill_mode);
        Ok(())
    }

    /// Stroke the closed path through the backend, consuming it.
    ///
    /// # Errors
    ///
    /// [`PathError::CannotComplete`] if no closed path exists.
    pub fn stroke_path(&mut self) -> Result<()> {
        let flat = self.take_flat_path()?;
        self.backend
            .stroke_path(flat.points(), flat.kinds(), &self.attrs.pen);
        Ok(())
    }

    /// Fill and stroke the closed path through the backend, consuming it.
    ///
    /// # Errors
    ///
    /// [`PathError::CannotComplete`] if no closed path exists.
    pub fn stroke_and_fill_path(&mut self) -> Result<()> {
        let flat = self.take_flat_path()?;
        let counts = polygon_counts(flat.kinds());
        self.backend
            .fill_polygons(flat.points(), &counts, self.attrs.fill_mode);
        self.backend
            .stroke_path(flat.points(), flat.kinds(), &self.attrs.pen);
        Ok(())
    }

    /// Convert the closed path to a region and install it as the clip,
    /// consuming the path.
    ///
    /// # Errors
    ///
    /// [`PathError::CannotComplete`] if no closed path exists or the path
    /// is empty.
    pub fn select_clip_path(&mut self, mode: ClipCombine) -> Result<()> {
        let flat = self.take_flat_path()?;
        let Some(region) = region_from_path(&flat, self.attrs.fill_mode) else {
            return Err(PathError::CannotComplete);
        };
        self.backend.set_clip_region(&region, mode);
        Ok(())
    }
}
