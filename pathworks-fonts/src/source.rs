//! The glyph source trait.

use crate::outline::GlyphOutline;

/// Provider of glyph outlines.
///
/// Implementations return outlines pre-scaled to device units, y up.
/// `None` means the character cannot be resolved at all; a glyph with no
/// contours (a space) is an empty [`GlyphOutline`], not `None`.
pub trait GlyphSource {
    fn glyph_outline(&self, c: char) -> Option<GlyphOutline>;
}
