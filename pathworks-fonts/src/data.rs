//! Font data wrapper around `ttf-parser`.

use crate::error::FontError;
use crate::outline::{Contour, Fixed, FixedPoint, GlyphOutline, OutlineCurve};
use crate::source::GlyphSource;

/// A loaded font, scaled to a nominal pixel size.
///
/// Keeps the raw bytes and re-parses the zero-copy
/// `ttf_parser::Face` on demand for individual queries — parsing is
/// cheap (table directory lookups), and this avoids a self-referential
/// struct.
pub struct FontData {
    bytes: Vec<u8>,
    /// Scale from font design units to device pixels.
    scale: f32,
}

impl FontData {
    /// Parse font bytes, scaling outlines so the em square maps to
    /// `pixels_per_em`.
    ///
    /// # Errors
    ///
    /// [`FontError::ParseError`] if the bytes are not a valid font.
    pub fn from_bytes(bytes: Vec<u8>, pixels_per_em: f32) -> Result<Self, FontError> {
        let face = ttf_parser::Face::parse(&bytes, 0)
            .map_err(|e| FontError::ParseError(e.to_string()))?;
        let scale = pixels_per_em / f32::from(face.units_per_em());
        drop(face);
        Ok(Self { bytes, scale })
    }

    fn face(&self) -> ttf_parser::Face<'_> {
        // Bytes were validated in from_bytes.
        ttf_parser::Face::parse(&self.bytes, 0).expect("font bytes validated at construction")
    }
}

impl GlyphSource for FontData {
    fn glyph_outline(&self, c: char) -> Option<GlyphOutline> {
        let face = self.face();
        let glyph = face.glyph_index(c)?;

        let mut collector = OutlineCollector::new(self.scale);
        // A glyph with no outline (e.g. a space) is still a valid result.
        let _ = face.outline_glyph(glyph, &mut collector);
        collector.finish_contour();

        #[expect(
            clippy::cast_possible_truncation,
            reason = "scaled advances fit comfortably in i32"
        )]
        let advance = face
            .glyph_hor_advance(glyph)
            .map_or(0, |adv| (f32::from(adv) * self.scale).round() as i32);
        Some(GlyphOutline {
            contours: collector.contours,
            advance,
        })
    }
}

// ---------------------------------------------------------------------------
// Outline collection
// ---------------------------------------------------------------------------

/// Adapter from `ttf_parser::OutlineBuilder` to the contour stream.
struct OutlineCollector {
    scale: f32,
    contours: Vec<Contour>,
    current: Option<Contour>,
}

impl OutlineCollector {
    const fn new(scale: f32) -> Self {
        Self {
            scale,
            contours: Vec::new(),
            current: None,
        }
    }

    fn fixed(&self, x: f32, y: f32) -> FixedPoint {
        FixedPoint::new(
            Fixed::from_f32(x * self.scale),
            Fixed::from_f32(y * self.scale),
        )
    }

    fn finish_contour(&mut self) {
        if let Some(contour) = self.current.take() {
            self.contours.push(contour);
        }
    }

    /// Extend the current line run, or start one.
    fn push_line_point(&mut self, p: FixedPoint) {
        let Some(contour) = &mut self.current else {
            return;
        };
        if let Some(OutlineCurve::Line(points)) = contour.curves.last_mut() {
            points.push(p);
        } else {
            contour.curves.push(OutlineCurve::Line(vec![p]));
        }
    }
}

impl ttf_parser::OutlineBuilder for OutlineCollector {
    fn move_to(&mut self, x: f32, y: f32) {
        self.finish_contour();
        self.current = Some(Contour {
            start: self.fixed(x, y),
            curves: Vec::new(),
        });
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let p = self.fixed(x, y);
        self.push_line_point(p);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        let control = self.fixed(x1, y1);
        let end = self.fixed(x, y);
        if let Some(contour) = &mut self.current {
            contour
                .curves
                .push(OutlineCurve::Quadratic(vec![control, end]));
        }
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        let c1 = self.fixed(x1, y1);
        let c2 = self.fixed(x2, y2);
        let end = self.fixed(x, y);
        if let Some(contour) = &mut self.current {
            contour.curves.push(OutlineCurve::Cubic(vec![c1, c2, end]));
        }
    }

    fn close(&mut self) {
        self.finish_contour();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
