//! Owned premultiplied RGBA pixel surfaces.

pub(crate) mod blend;
mod codec;

use crate::geometry::{Color, ImagePoint, ImageRect, ImageSize};
use thiserror::Error;

const BYTES_PER_PIXEL: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SurfaceError {
    #[error("failed to decode image: {reason}")]
    Decode { reason: String },
    #[error("failed to encode image: {reason}")]
    Encode { reason: String },
    #[error("invalid surface geometry: {reason}")]
    Dimension { reason: String },
}

pub type SurfaceResult<T> = std::result::Result<T, SurfaceError>;

/// A width × height buffer of premultiplied RGBA8 pixels, row-major.
///
/// The shape never changes after construction: crop, resize and snapshot
/// restore all produce a new surface. `Clone` is a full deep copy.
#[derive(Clone, PartialEq, Eq)]
pub struct PixelSurface {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl std::fmt::Debug for PixelSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PixelSurface")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

fn buffer_len(width: u32, height: u32) -> SurfaceResult<usize> {
    if width == 0 || height == 0 {
        return Err(SurfaceError::Dimension {
            reason: format!("surface must be at least 1x1, got {width}x{height}"),
        });
    }
    usize::try_from(width)
        .ok()
        .and_then(|w| w.checked_mul(usize::try_from(height).ok()?))
        .and_then(|pixels| pixels.checked_mul(BYTES_PER_PIXEL))
        .ok_or_else(|| SurfaceError::Dimension {
            reason: format!("surface {width}x{height} is too large"),
        })
}

impl PixelSurface {
    /// Fully transparent surface.
    pub fn new(width: u32, height: u32) -> SurfaceResult<Self> {
        let len = buffer_len(width, height)?;
        Ok(Self {
            width,
            height,
            data: vec![0; len],
        })
    }

    pub fn filled(width: u32, height: u32, color: Color) -> SurfaceResult<Self> {
        let mut surface = Self::new(width, height)?;
        let pixel = color.premultiplied();
        if pixel != [0, 0, 0, 0] {
            for chunk in surface.data.chunks_exact_mut(BYTES_PER_PIXEL) {
                chunk.copy_from_slice(&pixel);
            }
        }
        Ok(surface)
    }

    pub fn from_premultiplied(width: u32, height: u32, data: Vec<u8>) -> SurfaceResult<Self> {
        let expected = buffer_len(width, height)?;
        if data.len() != expected {
            return Err(SurfaceError::Dimension {
                reason: format!(
                    "buffer holds {} bytes, {width}x{height} needs {expected}",
                    data.len()
                ),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub const fn width(&self) -> u32 {
        self.width
    }

    pub const fn height(&self) -> u32 {
        self.height
    }

    pub const fn size(&self) -> ImageSize {
        ImageSize::new(self.width, self.height)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub(crate) fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    fn offset_of(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * BYTES_PER_PIXEL
    }

    fn row_len(&self) -> usize {
        self.width as usize * BYTES_PER_PIXEL
    }

    /// Premultiplied pixel at `(x, y)`, `None` outside the surface.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = self.offset_of(x, y);
        let mut pixel = [0_u8; 4];
        pixel.copy_from_slice(&self.data[offset..offset + BYTES_PER_PIXEL]);
        Some(pixel)
    }

    /// Overwrites one pixel; out-of-bounds writes are ignored.
    pub fn set_pixel(&mut self, x: u32, y: u32, premultiplied: [u8; 4]) {
        if x >= self.width || y >= self.height {
            return;
        }
        let offset = self.offset_of(x, y);
        self.data[offset..offset + BYTES_PER_PIXEL].copy_from_slice(&premultiplied);
    }

    /// Source-over blends a premultiplied color scaled by `coverage` onto one pixel.
    pub fn blend_pixel(&mut self, x: u32, y: u32, premultiplied: [u8; 4], coverage: f32) {
        let Some(dst) = self.pixel(x, y) else {
            return;
        };
        let src = blend::scale_by_coverage(premultiplied, coverage);
        self.set_pixel(x, y, blend::source_over(src, dst));
    }

    fn check_region(&self, rect: ImageRect) -> SurfaceResult<()> {
        if rect.is_empty() || !rect.fits_within(self.size()) {
            return Err(SurfaceError::Dimension {
                reason: format!(
                    "region {rect:?} is empty or outside {}x{} surface",
                    self.width, self.height
                ),
            });
        }
        Ok(())
    }

    /// Deep copy of a sub-region. The rectangle must already be clamped to the surface.
    pub fn region(&self, rect: ImageRect) -> SurfaceResult<PixelSurface> {
        self.check_region(rect)?;
        let mut out = PixelSurface::new(rect.width, rect.height)?;
        let src_x = rect.x as u32;
        let copy_len = out.row_len();
        for row in 0..rect.height {
            let src_offset = self.offset_of(src_x, rect.y as u32 + row);
            let dst_offset = out.offset_of(0, row);
            out.data[dst_offset..dst_offset + copy_len]
                .copy_from_slice(&self.data[src_offset..src_offset + copy_len]);
        }
        Ok(out)
    }

    /// Sets every pixel inside the rectangle to fully transparent.
    pub fn clear_region(&mut self, rect: ImageRect) -> SurfaceResult<()> {
        self.check_region(rect)?;
        let clear_len = rect.width as usize * BYTES_PER_PIXEL;
        for row in 0..rect.height {
            let offset = self.offset_of(rect.x as u32, rect.y as u32 + row);
            self.data[offset..offset + clear_len].fill(0);
        }
        Ok(())
    }

    /// Overlap between `src` placed at `at` and this surface, as
    /// `(dst_rect, src_x, src_y)`. `None` when they do not overlap.
    fn overlap(&self, src: &PixelSurface, at: ImagePoint) -> Option<(ImageRect, u32, u32)> {
        let placed = ImageRect::new(at.x, at.y, src.width, src.height);
        let visible = placed.clamp_to(self.size());
        if visible.is_empty() {
            return None;
        }
        let src_x = u32::try_from(i64::from(visible.x) - i64::from(at.x)).ok()?;
        let src_y = u32::try_from(i64::from(visible.y) - i64::from(at.y)).ok()?;
        Some((visible, src_x, src_y))
    }

    /// Copies `src` into this surface with its top-left at `at`, replacing pixels.
    /// Parts of `src` falling outside are dropped.
    pub fn write_region(&mut self, src: &PixelSurface, at: ImagePoint) {
        let Some((visible, src_x, src_y)) = self.overlap(src, at) else {
            return;
        };
        let copy_len = visible.width as usize * BYTES_PER_PIXEL;
        for row in 0..visible.height {
            let src_offset = src.offset_of(src_x, src_y + row);
            let dst_offset = self.offset_of(visible.x as u32, visible.y as u32 + row);
            self.data[dst_offset..dst_offset + copy_len]
                .copy_from_slice(&src.data[src_offset..src_offset + copy_len]);
        }
    }

    /// Source-over composites `src` with its top-left at `at`, clipped to this surface.
    pub fn composite_over(&mut self, src: &PixelSurface, at: ImagePoint) {
        let Some((visible, src_x, src_y)) = self.overlap(src, at) else {
            return;
        };
        for row in 0..visible.height {
            for column in 0..visible.width {
                let src_offset = src.offset_of(src_x + column, src_y + row);
                let dst_offset = self.offset_of(visible.x as u32 + column, visible.y as u32 + row);
                let mut src_pixel = [0_u8; 4];
                src_pixel.copy_from_slice(&src.data[src_offset..src_offset + BYTES_PER_PIXEL]);
                let mut dst_pixel = [0_u8; 4];
                dst_pixel.copy_from_slice(&self.data[dst_offset..dst_offset + BYTES_PER_PIXEL]);
                self.data[dst_offset..dst_offset + BYTES_PER_PIXEL]
                    .copy_from_slice(&blend::source_over(src_pixel, dst_pixel));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(width: u32, height: u32) -> PixelSurface {
        let mut surface = PixelSurface::new(width, height).expect("surface");
        for y in 0..height {
            for x in 0..width {
                surface.set_pixel(x, y, [(x % 256) as u8, (y % 256) as u8, 7, 255]);
            }
        }
        surface
    }

    #[test]
    fn new_surface_is_transparent_and_sized() {
        let surface = PixelSurface::new(4, 3).expect("surface");
        assert_eq!(surface.as_bytes().len(), 4 * 3 * 4);
        assert!(surface.as_bytes().iter().all(|byte| *byte == 0));
    }

    #[test]
    fn zero_sized_surface_is_rejected() {
        let err = PixelSurface::new(0, 10).unwrap_err();
        assert!(matches!(err, SurfaceError::Dimension { .. }));
    }

    #[test]
    fn from_premultiplied_rejects_length_mismatch() {
        let err = PixelSurface::from_premultiplied(2, 2, vec![0; 15]).unwrap_err();
        assert!(matches!(err, SurfaceError::Dimension { .. }));
    }

    #[test]
    fn region_copies_requested_pixels() {
        let surface = gradient(10, 10);
        let region = surface
            .region(ImageRect::new(2, 3, 4, 5))
            .expect("region inside bounds");
        assert_eq!(region.size(), ImageSize::new(4, 5));
        assert_eq!(region.pixel(0, 0), surface.pixel(2, 3));
        assert_eq!(region.pixel(3, 4), surface.pixel(5, 7));
    }

    #[test]
    fn region_outside_bounds_is_a_dimension_error() {
        let surface = gradient(10, 10);
        let err = surface.region(ImageRect::new(8, 8, 4, 4)).unwrap_err();
        assert!(matches!(err, SurfaceError::Dimension { .. }));
    }

    #[test]
    fn clear_region_only_touches_rect() {
        let mut surface = gradient(6, 6);
        surface
            .clear_region(ImageRect::new(1, 1, 2, 2))
            .expect("clear inside bounds");
        assert_eq!(surface.pixel(1, 1), Some([0, 0, 0, 0]));
        assert_eq!(surface.pixel(2, 2), Some([0, 0, 0, 0]));
        assert_eq!(surface.pixel(3, 3), Some([3, 3, 7, 255]));
    }

    #[test]
    fn write_region_clips_negative_offsets() {
        let mut surface = PixelSurface::new(4, 4).expect("surface");
        let patch = PixelSurface::filled(3, 3, Color::RED).expect("patch");
        surface.write_region(&patch, ImagePoint::new(-2, -2));
        assert_eq!(surface.pixel(0, 0), Some([255, 0, 0, 255]));
        assert_eq!(surface.pixel(1, 0), Some([0, 0, 0, 0]));
        assert_eq!(surface.pixel(0, 1), Some([0, 0, 0, 0]));
    }

    #[test]
    fn composite_over_respects_source_alpha() {
        let mut surface = PixelSurface::filled(2, 1, Color::rgb(0, 0, 255)).expect("surface");
        let mut patch = PixelSurface::new(2, 1).expect("patch");
        patch.set_pixel(0, 0, Color::RED.premultiplied());
        surface.composite_over(&patch, ImagePoint::new(0, 0));
        assert_eq!(surface.pixel(0, 0), Some([255, 0, 0, 255]));
        assert_eq!(surface.pixel(1, 0), Some([0, 0, 255, 255]));
    }

    #[test]
    fn composite_entirely_outside_is_ignored() {
        let mut surface = gradient(4, 4);
        let before = surface.clone();
        let patch = PixelSurface::filled(2, 2, Color::RED).expect("patch");
        surface.composite_over(&patch, ImagePoint::new(10, 10));
        assert_eq!(surface, before);
    }

    #[test]
    fn clones_do_not_alias() {
        let original = gradient(3, 3);
        let mut copy = original.clone();
        copy.set_pixel(0, 0, [1, 1, 1, 1]);
        assert_ne!(copy.pixel(0, 0), original.pixel(0, 0));
    }
}
