//! Rasterizers that draw onto a [`PixelSurface`](crate::surface::PixelSurface):
//! brush strokes through `tiny-skia`, text through `ab_glyph`.

mod fonts;
mod stroke;
mod text;

pub use fonts::{FontBook, FontError, SYSTEM_FONT_CANDIDATES};
pub use stroke::draw_stroke;
pub use text::{draw_text, measure_text, TextExtent};
