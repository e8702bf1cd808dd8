//! Premultiplied-alpha pixel math.

/// Source-over for premultiplied RGBA8: `out = src + dst * (1 - src_alpha)`.
#[inline]
pub(crate) fn source_over(src: [u8; 4], dst: [u8; 4]) -> [u8; 4] {
    match src[3] {
        255 => src,
        0 => dst,
        src_alpha => {
            let inverse = 255 - u16::from(src_alpha);
            let mut out = [0_u8; 4];
            for channel in 0..4 {
                let blended = u16::from(src[channel]) + mul_div_255(u16::from(dst[channel]), inverse);
                out[channel] = blended.min(255) as u8;
            }
            out
        }
    }
}

/// Scales a premultiplied pixel by a coverage value in `[0, 1]`.
#[inline]
pub(crate) fn scale_by_coverage(pixel: [u8; 4], coverage: f32) -> [u8; 4] {
    if coverage >= 1.0 {
        return pixel;
    }
    if coverage <= 0.0 {
        return [0, 0, 0, 0];
    }
    pixel.map(|channel| (f32::from(channel) * coverage).round().min(255.0) as u8)
}

/// Converts one premultiplied pixel back to straight alpha.
#[inline]
pub(crate) fn unpremultiply(pixel: [u8; 4]) -> [u8; 4] {
    match pixel[3] {
        0 => [0, 0, 0, 0],
        255 => pixel,
        alpha => {
            let alpha = u32::from(alpha);
            let unscale = |channel: u8| -> u8 {
                ((u32::from(channel) * 255 + alpha / 2) / alpha).min(255) as u8
            };
            [unscale(pixel[0]), unscale(pixel[1]), unscale(pixel[2]), pixel[3]]
        }
    }
}

/// Converts one straight-alpha pixel to premultiplied storage.
#[inline]
pub(crate) fn premultiply(pixel: [u8; 4]) -> [u8; 4] {
    crate::geometry::Color::rgba(pixel[0], pixel[1], pixel[2], pixel[3]).premultiplied()
}

#[inline]
fn mul_div_255(value: u16, factor: u16) -> u16 {
    let product = u32::from(value) * u32::from(factor) + 128;
    ((product + (product >> 8)) >> 8) as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opaque_source_replaces_destination() {
        assert_eq!(source_over([1, 2, 3, 255], [200, 200, 200, 255]), [1, 2, 3, 255]);
    }

    #[test]
    fn transparent_source_keeps_destination() {
        assert_eq!(source_over([0, 0, 0, 0], [9, 8, 7, 200]), [9, 8, 7, 200]);
    }

    #[test]
    fn half_transparent_source_blends_over_opaque_destination() {
        let out = source_over([0, 0, 128, 128], [255, 0, 0, 255]);
        assert_eq!(out[3], 255);
        assert_eq!(out[0], 127);
        assert_eq!(out[2], 128);
    }

    #[test]
    fn source_over_onto_transparent_keeps_source() {
        assert_eq!(source_over([40, 20, 10, 100], [0, 0, 0, 0]), [40, 20, 10, 100]);
    }

    #[test]
    fn unpremultiply_restores_straight_channels() {
        assert_eq!(unpremultiply([128, 64, 0, 128]), [255, 128, 0, 128]);
        assert_eq!(unpremultiply([0, 0, 0, 0]), [0, 0, 0, 0]);
    }

    #[test]
    fn coverage_scaling_clamps_to_bounds() {
        assert_eq!(scale_by_coverage([200, 100, 50, 200], 1.5), [200, 100, 50, 200]);
        assert_eq!(scale_by_coverage([200, 100, 50, 200], 0.0), [0, 0, 0, 0]);
        assert_eq!(scale_by_coverage([200, 100, 50, 200], 0.5), [100, 50, 25, 100]);
    }
}
