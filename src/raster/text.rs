use ab_glyph::{point, Font, FontArc, GlyphId, PxScale, ScaleFont};

use crate::geometry::{Color, ImagePoint};
use crate::surface::PixelSurface;

/// Size of a laid-out text block in image pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextExtent {
    pub width: f32,
    pub height: f32,
    pub line_height: f32,
}

/// Glyph ids with their pen x offsets for one line, plus the line advance.
fn layout_line<F: Font>(font: &F, scale: PxScale, line: &str) -> (Vec<(GlyphId, f32)>, f32) {
    let scaled = font.as_scaled(scale);
    let mut glyphs = Vec::with_capacity(line.len());
    let mut cursor_x = 0.0_f32;
    let mut previous: Option<GlyphId> = None;
    for ch in line.chars() {
        let glyph_id = font.glyph_id(ch);
        if let Some(previous) = previous {
            cursor_x += scaled.kern(previous, glyph_id);
        }
        glyphs.push((glyph_id, cursor_x));
        cursor_x += scaled.h_advance(glyph_id);
        previous = Some(glyph_id);
    }
    (glyphs, cursor_x)
}

pub fn measure_text(font: &FontArc, text: &str, size: u32) -> TextExtent {
    let scale = PxScale::from(size.max(1) as f32);
    let scaled = font.as_scaled(scale);
    let line_height = scaled.height() + scaled.line_gap();
    let mut width = 0.0_f32;
    let mut lines = 0_u32;
    for line in text.split('\n') {
        let (_, advance) = layout_line(font, scale, line);
        width = width.max(advance);
        lines += 1;
    }
    TextExtent {
        width,
        height: line_height * lines as f32,
        line_height,
    }
}

/// Draws `text` in one solid color with its first line's top-left at `anchor`.
/// `\n` starts a new line; nothing wraps. Returns `false` if no pixel was touched.
pub fn draw_text(
    surface: &mut PixelSurface,
    font: &FontArc,
    text: &str,
    anchor: ImagePoint,
    size: u32,
    color: Color,
) -> bool {
    let scale = PxScale::from(size.max(1) as f32);
    let scaled = font.as_scaled(scale);
    let ascent = scaled.ascent();
    let line_height = scaled.height() + scaled.line_gap();
    let premultiplied = color.premultiplied();
    let width = i64::from(surface.width());
    let height = i64::from(surface.height());
    let mut touched = false;

    for (index, line) in text.split('\n').enumerate() {
        let baseline = anchor.y as f32 + ascent + index as f32 * line_height;
        let (glyphs, _) = layout_line(font, scale, line);
        for (glyph_id, offset_x) in glyphs {
            let glyph = glyph_id.with_scale_and_position(scale, point(anchor.x as f32 + offset_x, baseline));
            let Some(outlined) = font.outline_glyph(glyph) else {
                continue;
            };
            let bounds = outlined.px_bounds();
            let left = bounds.min.x as i64;
            let top = bounds.min.y as i64;
            outlined.draw(|px, py, coverage| {
                let x = left + i64::from(px);
                let y = top + i64::from(py);
                if coverage <= 0.0 || x < 0 || y < 0 || x >= width || y >= height {
                    return;
                }
                surface.blend_pixel(x as u32, y as u32, premultiplied, coverage);
                touched = true;
            });
        }
    }
    touched
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::FontBook;

    fn system_font() -> Option<FontArc> {
        let mut book = FontBook::new();
        book.load_system_fallbacks();
        book.resolve("sans").ok().cloned()
    }

    #[test]
    fn text_is_drawn_below_and_right_of_anchor() {
        let Some(font) = system_font() else {
            return;
        };
        let mut surface = PixelSurface::filled(120, 60, Color::WHITE).expect("surface");
        let before = surface.clone();
        assert!(draw_text(&mut surface, &font, "Hi", ImagePoint::new(20, 10), 24, Color::BLACK));
        assert_ne!(surface, before);
        for y in 0..10 {
            for x in 0..120 {
                assert_eq!(surface.pixel(x, y), before.pixel(x, y), "pixel ({x},{y}) above anchor");
            }
        }
    }

    #[test]
    fn newline_stacks_lines_vertically() {
        let Some(font) = system_font() else {
            return;
        };
        let single = measure_text(&font, "abc", 20);
        let double = measure_text(&font, "abc\nabcdef", 20);
        assert!((double.height - single.height * 2.0).abs() < 0.01);
        assert!(double.width > single.width);
    }

    #[test]
    fn text_fully_outside_touches_nothing() {
        let Some(font) = system_font() else {
            return;
        };
        let mut surface = PixelSurface::filled(30, 30, Color::WHITE).expect("surface");
        let before = surface.clone();
        assert!(!draw_text(&mut surface, &font, "X", ImagePoint::new(200, 200), 16, Color::BLACK));
        assert_eq!(surface, before);
    }
}
