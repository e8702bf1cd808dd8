use crate::geometry::{Anchor, Color, ImagePoint, ImageSize};
use crate::raster::{self, FontBook};
use crate::surface::{PixelSurface, SurfaceError};
use crate::tools::FontSpec;

use super::{EditOutcome, EditorError, EditorResult, ImageEditor};

impl ImageEditor {
    /// Paints a brush stroke through `points` (image space, clamped onto the
    /// canvas). A zero `size` is rejected before anything changes.
    pub fn draw_brush_stroke(
        &mut self,
        points: &[ImagePoint],
        size: u32,
        color: Color,
    ) -> EditorResult<EditOutcome> {
        if size == 0 {
            return Err(EditorError::Surface {
                operation: "brush stroke",
                source: SurfaceError::Dimension {
                    reason: "brush size must be at least 1 pixel".to_string(),
                },
            });
        }
        if points.is_empty() {
            return Ok(EditOutcome::Unchanged);
        }
        let mut painted = self.composited().into_owned();
        let drawn = raster::draw_stroke(&mut painted, points, size, color)
            .map_err(EditorError::surface("brush stroke"))?;
        if !drawn {
            return Ok(EditOutcome::Unchanged);
        }
        self.commit_floating();
        self.history
            .record(std::mem::replace(&mut self.surface, painted));
        tracing::debug!(points = points.len(), size, "brush stroke drawn");
        Ok(EditOutcome::Changed)
    }

    /// Stamps `text`, trimmed, with its first line's top-left at `anchor`.
    /// Blank text is a no-op; an unknown family falls back to the font book's
    /// default.
    pub fn add_text(
        &mut self,
        text: &str,
        anchor: ImagePoint,
        fonts: &FontBook,
        font: &FontSpec,
        color: Color,
    ) -> EditorResult<EditOutcome> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(EditOutcome::Unchanged);
        }
        let face = fonts
            .resolve(&font.family)
            .map_err(|source| EditorError::Font {
                operation: "add text",
                source,
            })?;
        let mut painted = self.composited().into_owned();
        if !raster::draw_text(&mut painted, face, text, anchor, font.size, color) {
            return Ok(EditOutcome::Unchanged);
        }
        self.commit_floating();
        self.history
            .record(std::mem::replace(&mut self.surface, painted));
        tracing::debug!(x = anchor.x, y = anchor.y, size = font.size, "text added");
        Ok(EditOutcome::Changed)
    }

    /// Changes the canvas size. The old pixels keep the position `anchor`
    /// describes; uncovered area is transparent and overhang is cropped.
    pub fn resize_canvas(
        &mut self,
        width: u32,
        height: u32,
        anchor: Anchor,
    ) -> EditorResult<EditOutcome> {
        let mut resized =
            PixelSurface::new(width, height).map_err(EditorError::surface("resize canvas"))?;
        let new_size = ImageSize::new(width, height);
        if new_size == self.size() {
            return Ok(EditOutcome::Unchanged);
        }
        self.commit_floating();
        let placement = anchor.placement(self.size(), new_size);
        resized.write_region(&self.surface, placement);
        self.history
            .record(std::mem::replace(&mut self.surface, resized));
        self.selection.clear();
        tracing::debug!(width, height, %anchor, "canvas resized");
        Ok(EditOutcome::Changed)
    }
}
