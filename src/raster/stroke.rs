use tiny_skia::{FillRule, LineCap, LineJoin, Paint, PathBuilder, PixmapMut, Stroke, Transform};

use crate::geometry::{Color, ImagePoint};
use crate::surface::{PixelSurface, SurfaceError, SurfaceResult};

fn clamp_point(point: ImagePoint, surface: &PixelSurface) -> (f32, f32) {
    let max_x = i32::try_from(surface.width().saturating_sub(1)).unwrap_or(i32::MAX);
    let max_y = i32::try_from(surface.height().saturating_sub(1)).unwrap_or(i32::MAX);
    // Centers of the clamped pixels.
    (
        point.x.clamp(0, max_x) as f32 + 0.5,
        point.y.clamp(0, max_y) as f32 + 0.5,
    )
}

/// Strokes the polyline through `points` with round caps and joins, blending
/// source-over. Points are clamped onto the surface. A single point, or a run
/// of identical points, draws a filled dot of diameter `size`.
///
/// Returns `false` when there was nothing to draw.
pub fn draw_stroke(
    surface: &mut PixelSurface,
    points: &[ImagePoint],
    size: u32,
    color: Color,
) -> SurfaceResult<bool> {
    if size == 0 {
        return Err(SurfaceError::Dimension {
            reason: "brush size must be at least 1 pixel".to_string(),
        });
    }
    let Some(first) = points.first() else {
        return Ok(false);
    };

    let clamped: Vec<(f32, f32)> = points
        .iter()
        .map(|point| clamp_point(*point, surface))
        .collect();
    let start = clamp_point(*first, surface);
    let is_dot = clamped.iter().all(|point| *point == start);

    let width = surface.width();
    let height = surface.height();
    let mut pixmap = PixmapMut::from_bytes(surface.as_bytes_mut(), width, height).ok_or_else(|| {
        SurfaceError::Dimension {
            reason: format!("cannot rasterize onto {width}x{height} surface"),
        }
    })?;

    let mut paint = Paint::default();
    paint.set_color_rgba8(color.r, color.g, color.b, color.a);
    paint.anti_alias = true;

    if is_dot {
        let radius = size as f32 / 2.0;
        let Some(dot) = PathBuilder::from_circle(start.0, start.1, radius) else {
            return Ok(false);
        };
        pixmap.fill_path(&dot, &paint, FillRule::Winding, Transform::identity(), None);
        return Ok(true);
    }

    let mut builder = PathBuilder::new();
    builder.move_to(start.0, start.1);
    for (x, y) in clamped.iter().skip(1) {
        builder.line_to(*x, *y);
    }
    let Some(path) = builder.finish() else {
        return Ok(false);
    };
    let stroke = Stroke {
        width: size as f32,
        line_cap: LineCap::Round,
        line_join: LineJoin::Round,
        ..Stroke::default()
    };
    pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn white(width: u32, height: u32) -> PixelSurface {
        PixelSurface::filled(width, height, Color::WHITE).expect("surface")
    }

    #[test]
    fn zero_size_is_a_dimension_error() {
        let mut surface = white(10, 10);
        let err = draw_stroke(&mut surface, &[ImagePoint::new(1, 1)], 0, Color::RED).unwrap_err();
        assert!(matches!(err, SurfaceError::Dimension { .. }));
    }

    #[test]
    fn no_points_draw_nothing() {
        let mut surface = white(10, 10);
        let before = surface.clone();
        assert!(!draw_stroke(&mut surface, &[], 4, Color::RED).expect("empty stroke"));
        assert_eq!(surface, before);
    }

    #[test]
    fn single_point_draws_a_dot_centered_on_the_pixel() {
        let mut surface = white(21, 21);
        assert!(draw_stroke(&mut surface, &[ImagePoint::new(10, 10)], 9, Color::RED).expect("dot"));
        assert_eq!(surface.pixel(10, 10), Some([255, 0, 0, 255]));
        assert_eq!(surface.pixel(0, 0), Some([255, 255, 255, 255]));
        assert_eq!(surface.pixel(20, 10), Some([255, 255, 255, 255]));
    }

    #[test]
    fn segment_covers_pixels_along_the_line() {
        let mut surface = white(40, 20);
        let points = [ImagePoint::new(5, 10), ImagePoint::new(34, 10)];
        assert!(draw_stroke(&mut surface, &points, 5, Color::BLACK).expect("stroke"));
        for x in [5, 15, 25, 34] {
            assert_eq!(surface.pixel(x, 10), Some([0, 0, 0, 255]), "pixel {x} should be inked");
        }
        assert_eq!(surface.pixel(20, 0), Some([255, 255, 255, 255]));
    }

    #[test]
    fn out_of_bounds_points_are_clamped() {
        let mut surface = white(10, 10);
        let points = [ImagePoint::new(-50, 5), ImagePoint::new(500, 5)];
        assert!(draw_stroke(&mut surface, &points, 3, Color::BLACK).expect("stroke"));
        assert_eq!(surface.pixel(0, 5), Some([0, 0, 0, 255]));
        assert_eq!(surface.pixel(9, 5), Some([0, 0, 0, 255]));
    }
}
