//! SVG output backend for `PathWorks`.
//!
//! Implements the core [`Backend`] trait by collecting filled and stroked
//! device geometry into SVG `<path>` elements. Device coordinates map
//! directly onto the SVG user space (both are y-down), so no transform is
//! needed. Path data is built as raw `d` strings.

use pathworks_core::{
    Backend, ClipCombine, EndCap, FillMode, LineJoin, Pen, Point, PointKind,
};
use pathworks_graphics::region::Region;
use svg::node::element::Path as SvgPath;
use svg::Document;

/// A backend that renders everything it receives into an SVG document.
#[derive(Default)]
pub struct SvgBackend {
    elements: Vec<SvgPath>,
}

impl SvgBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of elements collected so far.
    #[must_use]
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// Build the document, sized to the given device-pixel viewport.
    #[must_use]
    pub fn into_document(self, width: i32, height: i32) -> Document {
        let mut doc = Document::new().set("viewBox", (0, 0, width, height));
        for element in self.elements {
            doc = doc.add(element);
        }
        doc
    }
}

impl Backend for SvgBackend {
    fn fill_polygons(&mut self, points: &[Point], counts: &[usize], mode: FillMode) {
        let mut d = String::new();
        let mut pos = 0;
        for &count in counts {
            polygon_data(&mut d, &points[pos..pos + count]);
            pos += count;
        }
        if d.is_empty() {
            return;
        }
        self.elements.push(
            SvgPath::new()
                .set("d", d)
                .set("fill", "black")
                .set("fill-rule", fill_rule(mode)),
        );
    }

    fn stroke_path(&mut self, points: &[Point], kinds: &[PointKind], pen: &Pen) {
        let d = stroke_data(points, kinds);
        if d.is_empty() {
            return;
        }
        self.elements.push(
            SvgPath::new()
                .set("d", d)
                .set("fill", "none")
                .set("stroke", "black")
                .set("stroke-width", pen.width)
                .set("stroke-linecap", line_cap(pen.end_cap))
                .set("stroke-linejoin", line_join(pen.join)),
        );
    }

    fn set_clip_region(&mut self, region: &Region, _mode: ClipCombine) {
        // Represent the clip as an outlined element; nested clip groups are
        // not modeled.
        let mut d = String::new();
        for contour in region.contours() {
            polygon_data(&mut d, contour);
        }
        if d.is_empty() {
            return;
        }
        self.elements
            .push(SvgPath::new().set("d", d).set("fill", "none"));
    }

    fn polyline(&mut self, points: &[Point], pen: &Pen) {
        let Some((first, rest)) = points.split_first() else {
            return;
        };
        let mut d = format!("M {} {}", first.x, first.y);
        for p in rest {
            push_segment(&mut d, 'L', *p);
        }
        self.elements.push(
            SvgPath::new()
                .set("d", d)
                .set("fill", "none")
                .set("stroke", "black")
                .set("stroke-width", pen.width),
        );
    }
}

// ---------------------------------------------------------------------------
// Path data construction
// ---------------------------------------------------------------------------

fn push_segment(d: &mut String, verb: char, p: Point) {
    use std::fmt::Write;
    let _ = write!(d, " {verb} {} {}", p.x, p.y);
}

fn polygon_data(d: &mut String, points: &[Point]) {
    use std::fmt::Write;
    let Some((first, rest)) = points.split_first() else {
        return;
    };
    if !d.is_empty() {
        d.push(' ');
    }
    let _ = write!(d, "M {} {}", first.x, first.y);
    for p in rest {
        push_segment(d, 'L', *p);
    }
    d.push_str(" Z");
}

/// Convert a recorded device path (moves and lines, with close bits) to
/// SVG path data.
fn stroke_data(points: &[Point], kinds: &[PointKind]) -> String {
    use std::fmt::Write;
    let mut d = String::new();
    for (p, kind) in points.iter().zip(kinds) {
        if kind.verb() == PointKind::MOVE {
            if !d.is_empty() {
                d.push(' ');
            }
            let _ = write!(d, "M {} {}", p.x, p.y);
        } else {
            push_segment(&mut d, 'L', *p);
        }
        if kind.is_close() {
            d.push_str(" Z");
        }
    }
    d
}

fn fill_rule(mode: FillMode) -> &'static str {
    match mode {
        FillMode::Alternate => "evenodd",
        FillMode::Winding => "nonzero",
    }
}

fn line_cap(cap: EndCap) -> &'static str {
    match cap {
        EndCap::Round => "round",
        EndCap::Square => "square",
        EndCap::Flat => "butt",
    }
}

fn line_join(join: LineJoin) -> &'static str {
    match join {
        LineJoin::Round => "round",
        LineJoin::Bevel => "bevel",
        LineJoin::Miter => "miter",
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pathworks_core::{DeviceContext, GraphicsMode};

    #[test]
    fn stroke_data_emits_moves_lines_and_closes() {
        let points = [
            Point::new(0, 0),
            Point::new(10, 0),
            Point::new(10, 10),
        ];
        let kinds = [
            PointKind::MOVE,
            PointKind::LINE,
            PointKind::LINE.with_close(),
        ];
        assert_eq!(stroke_data(&points, &kinds), "M 0 0 L 10 0 L 10 10 Z");
    }

    #[test]
    fn fill_path_renders_an_element() {
        let mut backend = SvgBackend::new();
        backend.fill_polygons(
            &[Point::new(0, 0), Point::new(4, 0), Point::new(4, 4)],
            &[3],
            FillMode::Winding,
        );
        assert_eq!(backend.element_count(), 1);
        let doc = backend.into_document(10, 10).to_string();
        assert!(doc.contains("nonzero"));
        assert!(doc.contains("M 0 0 L 4 0 L 4 4 Z"));
    }

    /// Shares one [`SvgBackend`] between the context and the test.
    #[derive(Clone, Default)]
    struct SharedSvg(std::rc::Rc<std::cell::RefCell<SvgBackend>>);

    impl Backend for SharedSvg {
        fn fill_polygons(&mut self, points: &[Point], counts: &[usize], mode: FillMode) {
            self.0.borrow_mut().fill_polygons(points, counts, mode);
        }

        fn stroke_path(&mut self, points: &[Point], kinds: &[PointKind], pen: &Pen) {
            self.0.borrow_mut().stroke_path(points, kinds, pen);
        }
    }

    #[test]
    fn dc_fill_path_reaches_the_backend() {
        let shared = SharedSvg::default();
        let mut dc = DeviceContext::new(Box::new(shared.clone()));
        dc.attrs_mut().graphics_mode = GraphicsMode::Advanced;
        dc.begin_path().unwrap();
        dc.rectangle(0, 0, 20, 20).unwrap();
        dc.end_path().unwrap();
        dc.fill_path().unwrap();
        assert_eq!(shared.0.borrow().element_count(), 1);

        dc.begin_path().unwrap();
        dc.ellipse(0, 0, 40, 40).unwrap();
        dc.end_path().unwrap();
        dc.stroke_path().unwrap();
        assert_eq!(shared.0.borrow().element_count(), 2);
    }

    #[test]
    fn pen_styles_map_to_svg_attributes() {
        let mut backend = SvgBackend::new();
        let pen = Pen {
            width: 3,
            end_cap: EndCap::Flat,
            join: LineJoin::Bevel,
            kind: pathworks_core::PenKind::Geometric,
        };
        backend.stroke_path(
            &[Point::new(0, 0), Point::new(9, 0)],
            &[PointKind::MOVE, PointKind::LINE],
            &pen,
        );
        let doc = backend.into_document(10, 10).to_string();
        assert!(doc.contains("stroke-width=\"3\""));
        assert!(doc.contains("butt"));
        assert!(doc.contains("bevel"));
    }

    #[test]
    fn empty_geometry_adds_no_elements() {
        let mut backend = SvgBackend::new();
        backend.fill_polygons(&[], &[], FillMode::Alternate);
        backend.polyline(&[], &Pen::default());
        assert_eq!(backend.element_count(), 0);
    }
}
