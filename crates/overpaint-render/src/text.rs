//! Glyph outlines for text objects.

use ab_glyph::{Font, FontRef, GlyphId, OutlineCurve, ScaleFont};
use kurbo::{Affine, BezPath, Point};
use overpaint_core::shapes::Text;
use std::sync::OnceLock;

/// Embedded DejaVu Sans, used for every text object.
static DEJAVU_SANS: &[u8] = include_bytes!("../assets/DejaVuSans.ttf");

/// Line height as a multiple of the font size.
const LINE_HEIGHT: f64 = 1.2;

fn font() -> Option<&'static FontRef<'static>> {
    static FONT: OnceLock<Option<FontRef<'static>>> = OnceLock::new();
    FONT.get_or_init(|| match FontRef::try_from_slice(DEJAVU_SANS) {
        Ok(font) => Some(font),
        Err(e) => {
            log::error!("Failed to load embedded font: {}", e);
            None
        }
    })
    .as_ref()
}

/// Outline every glyph of `text` in canvas coordinates.
///
/// The first baseline sits one ascent below the text position. Each line
/// advances by the line height and the object's scale applies around its
/// position. Returns `None` when nothing would be drawn.
pub(crate) fn text_path(text: &Text) -> Option<BezPath> {
    let size = text.font_size.abs();
    if size <= 0.0 || text.content.trim().is_empty() {
        return None;
    }
    let font = font()?;
    let scaled = font.as_scaled(size as f32);
    let factor = scaled.scale_factor();
    let (sx, sy) = (factor.horizontal as f64, factor.vertical as f64);

    let mut path = BezPath::new();
    let mut baseline = text.position.y + scaled.ascent() as f64;
    for line in text.content.lines() {
        let mut caret = text.position.x;
        let mut previous: Option<GlyphId> = None;
        for ch in line.chars() {
            let id = font.glyph_id(ch);
            if let Some(prev) = previous {
                caret += scaled.kern(prev, id) as f64;
            }
            if let Some(outline) = font.outline(id) {
                // Font units are y-up.
                let to_canvas = |p: ab_glyph::Point| {
                    Point::new(caret + p.x as f64 * sx, baseline - p.y as f64 * sy)
                };
                append_curves(&mut path, &outline.curves, to_canvas);
            }
            caret += scaled.h_advance(id) as f64;
            previous = Some(id);
        }
        baseline += size * LINE_HEIGHT;
    }
    if path.elements().is_empty() {
        return None;
    }

    let origin = text.position.to_vec2();
    path.apply_affine(
        Affine::translate(origin)
            * Affine::scale_non_uniform(text.scale.x, text.scale.y)
            * Affine::translate(-origin),
    );
    Some(path)
}

fn append_curves(path: &mut BezPath, curves: &[OutlineCurve], to_canvas: impl Fn(ab_glyph::Point) -> Point) {
    let mut last: Option<Point> = None;
    for curve in curves {
        let start = match curve {
            OutlineCurve::Line(p0, _) | OutlineCurve::Quad(p0, _, _) | OutlineCurve::Cubic(p0, _, _, _) => {
                to_canvas(*p0)
            }
        };
        if last.is_none_or(|p| (p - start).hypot2() > 1e-12) {
            if last.is_some() {
                path.close_path();
            }
            path.move_to(start);
        }
        let end = match curve {
            OutlineCurve::Line(_, p1) => {
                let p1 = to_canvas(*p1);
                path.line_to(p1);
                p1
            }
            OutlineCurve::Quad(_, c, p2) => {
                let p2 = to_canvas(*p2);
                path.quad_to(to_canvas(*c), p2);
                p2
            }
            OutlineCurve::Cubic(_, c1, c2, p3) => {
                let p3 = to_canvas(*p3);
                path.curve_to(to_canvas(*c1), to_canvas(*c2), p3);
                p3
            }
        };
        last = Some(end);
    }
    if last.is_some() {
        path.close_path();
    }
}
