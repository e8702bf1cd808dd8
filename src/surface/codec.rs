//! PNG decode/encode and straight ⇄ premultiplied RGBA conversion.

use std::io::Cursor;

use image::{ImageFormat, RgbaImage};

use super::blend::{premultiply, unpremultiply};
use super::{PixelSurface, SurfaceError, SurfaceResult};

impl PixelSurface {
    /// Decodes PNG bytes. Any other container is rejected, even if `image` could read it.
    pub fn decode_png(bytes: &[u8]) -> SurfaceResult<Self> {
        let format = image::guess_format(bytes).map_err(|err| SurfaceError::Decode {
            reason: err.to_string(),
        })?;
        if format != ImageFormat::Png {
            return Err(SurfaceError::Decode {
                reason: format!("unsupported image format {format:?}, expected PNG"),
            });
        }

        let decoded = image::load_from_memory_with_format(bytes, ImageFormat::Png)
            .map_err(|err| SurfaceError::Decode {
                reason: err.to_string(),
            })?
            .to_rgba8();
        let (width, height) = decoded.dimensions();
        let mut data = decoded.into_raw();
        for pixel in data.chunks_exact_mut(4) {
            let premultiplied = premultiply([pixel[0], pixel[1], pixel[2], pixel[3]]);
            pixel.copy_from_slice(&premultiplied);
        }
        Self::from_premultiplied(width, height, data).map_err(|err| SurfaceError::Decode {
            reason: err.to_string(),
        })
    }

    /// Encodes the surface as an RGBA8 PNG with straight alpha.
    pub fn encode_png(&self) -> SurfaceResult<Vec<u8>> {
        let image = RgbaImage::from_raw(self.width(), self.height(), self.to_straight_rgba())
            .ok_or_else(|| SurfaceError::Encode {
                reason: "pixel buffer does not match surface dimensions".to_string(),
            })?;
        let mut encoded = Cursor::new(Vec::new());
        image
            .write_to(&mut encoded, ImageFormat::Png)
            .map_err(|err| SurfaceError::Encode {
                reason: err.to_string(),
            })?;
        Ok(encoded.into_inner())
    }

    /// Copies the buffer out as straight-alpha RGBA8, row-major.
    pub fn to_straight_rgba(&self) -> Vec<u8> {
        let mut straight = self.as_bytes().to_vec();
        for pixel in straight.chunks_exact_mut(4) {
            let converted = unpremultiply([pixel[0], pixel[1], pixel[2], pixel[3]]);
            pixel.copy_from_slice(&converted);
        }
        straight
    }

    /// Builds a surface from straight-alpha RGBA8 bytes (system clipboard images).
    pub fn from_straight_rgba(width: u32, height: u32, mut data: Vec<u8>) -> SurfaceResult<Self> {
        for pixel in data.chunks_exact_mut(4) {
            let converted = premultiply([pixel[0], pixel[1], pixel[2], pixel[3]]);
            pixel.copy_from_slice(&converted);
        }
        Self::from_premultiplied(width, height, data)
    }
}
