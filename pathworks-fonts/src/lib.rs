//! Glyph outline extraction for `PathWorks`.
//!
//! This crate wraps `ttf-parser` to provide glyph outlines as fixed-point
//! contour streams. It is intentionally independent of the other
//! `PathWorks` crates — all types are plain integers and fixed-point
//! values. Bridging to path entries happens in `pathworks-core`.

pub mod data;
pub mod error;
pub mod outline;
pub mod source;

pub use data::FontData;
pub use error::FontError;
pub use outline::{Contour, Fixed, FixedPoint, GlyphOutline, OutlineCurve};
pub use source::GlyphSource;
