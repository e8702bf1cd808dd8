//! Display ⇄ image coordinate mapping for a zoomed and panned canvas.
//!
//! The image is fitted into the viewport with its aspect ratio preserved,
//! scaled by the zoom factor, centered and then shifted by the pan offset.
//! The resulting [`DisplayGeometry`] is cached until the viewport size, image
//! size, zoom or pan change.

mod handles;

use crate::geometry::{
    DisplayPoint, DisplaySize, ImagePoint, ImagePosition, ImageRect, ImageSize,
};

pub use handles::{ResizeHandle, RESIZE_HANDLE_MARGIN};

pub const ZOOM_MIN: f64 = 0.1;
pub const ZOOM_MAX: f64 = 10.0;
pub const SCROLL_ZOOM_STEP: f64 = 1.1;

fn clamp_zoom(zoom: f64) -> f64 {
    if zoom.is_nan() {
        1.0
    } else {
        zoom.clamp(ZOOM_MIN, ZOOM_MAX)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollDirection {
    Up,
    Down,
}

/// Where the image lands on screen: top-left origin, drawn size and the
/// display pixels per image pixel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayGeometry {
    pub origin: DisplayPoint,
    pub size: DisplaySize,
    pub scale: f64,
}

impl DisplayGeometry {
    pub fn contains(&self, point: DisplayPoint) -> bool {
        point.x >= self.origin.x
            && point.x < self.origin.x + self.size.width
            && point.y >= self.origin.y
            && point.y < self.origin.y + self.size.height
    }

    pub fn to_image(&self, point: DisplayPoint) -> ImagePosition {
        ImagePosition::new(
            (point.x - self.origin.x) / self.scale,
            (point.y - self.origin.y) / self.scale,
        )
    }

    pub fn to_display(&self, position: ImagePosition) -> DisplayPoint {
        DisplayPoint::new(
            self.origin.x + position.x * self.scale,
            self.origin.y + position.y * self.scale,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct GeometryKey {
    viewport: DisplaySize,
    image: ImageSize,
    zoom: f64,
    pan: DisplayPoint,
}

#[derive(Debug, Clone)]
pub struct CoordinateMapper {
    zoom: f64,
    pan: DisplayPoint,
    cached: Option<(GeometryKey, DisplayGeometry)>,
}

impl Default for CoordinateMapper {
    fn default() -> Self {
        Self::new()
    }
}

impl CoordinateMapper {
    pub const fn new() -> Self {
        Self {
            zoom: 1.0,
            pan: DisplayPoint::new(0.0, 0.0),
            cached: None,
        }
    }

    pub const fn zoom(&self) -> f64 {
        self.zoom
    }

    pub const fn pan(&self) -> DisplayPoint {
        self.pan
    }

    /// Last computed geometry, if any.
    pub fn geometry(&self) -> Option<DisplayGeometry> {
        self.cached.map(|(_, geometry)| geometry)
    }

    /// Clamps to `[ZOOM_MIN, ZOOM_MAX]` and drops the cached geometry.
    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = clamp_zoom(zoom);
        self.cached = None;
    }

    /// Shifts the drawn image by a display-space offset and drops the cached geometry.
    pub fn pan_by(&mut self, delta_x: f64, delta_y: f64) {
        self.pan = DisplayPoint::new(self.pan.x + delta_x, self.pan.y + delta_y);
        self.cached = None;
    }

    /// Back to fit-to-viewport: zoom 1, no pan.
    pub fn reset(&mut self) {
        self.zoom = 1.0;
        self.pan = DisplayPoint::default();
        self.cached = None;
    }

    /// Fits, scales, centers and pans the image, caching the result.
    /// `None` (and an empty cache) when either size has no area.
    pub fn recompute_geometry(
        &mut self,
        viewport: DisplaySize,
        image: ImageSize,
        zoom: f64,
    ) -> Option<DisplayGeometry> {
        self.zoom = clamp_zoom(zoom);
        self.cached = None;
        let key = GeometryKey {
            viewport,
            image,
            zoom: self.zoom,
            pan: self.pan,
        };
        let geometry = compute_geometry(&key)?;
        self.cached = Some((key, geometry));
        Some(geometry)
    }

    /// Cached geometry for this viewport and image, recomputed only when an input changed.
    pub fn geometry_for(
        &mut self,
        viewport: DisplaySize,
        image: ImageSize,
    ) -> Option<DisplayGeometry> {
        let key = GeometryKey {
            viewport,
            image,
            zoom: self.zoom,
            pan: self.pan,
        };
        if let Some((cached_key, geometry)) = self.cached {
            if cached_key == key {
                return Some(geometry);
            }
        }
        self.recompute_geometry(viewport, image, self.zoom)
    }

    pub fn to_image_space(&self, point: DisplayPoint) -> Option<ImagePosition> {
        self.geometry().map(|geometry| geometry.to_image(point))
    }

    pub fn to_display_space(&self, position: ImagePosition) -> Option<DisplayPoint> {
        self.geometry().map(|geometry| geometry.to_display(position))
    }

    /// Pixel under a display point, `None` when the point is off the drawn image.
    pub fn to_image_pixel(&self, point: DisplayPoint) -> Option<ImagePoint> {
        let (key, geometry) = self.cached?;
        if !geometry.contains(point) {
            return None;
        }
        let pixel = geometry.to_image(point).to_pixel();
        key.image.bounds().contains(pixel).then_some(pixel)
    }

    /// Image pixel nearest to a display point, clamped onto the image.
    /// Brush drags use it once the pointer leaves the drawn image.
    pub fn to_clamped_image_pixel(&self, point: DisplayPoint) -> Option<ImagePoint> {
        let (key, geometry) = self.cached?;
        let position = geometry.to_image(point).to_pixel();
        let max_x = i32::try_from(key.image.width.saturating_sub(1)).unwrap_or(i32::MAX);
        let max_y = i32::try_from(key.image.height.saturating_sub(1)).unwrap_or(i32::MAX);
        Some(ImagePoint::new(
            position.x.clamp(0, max_x),
            position.y.clamp(0, max_y),
        ))
    }

    /// Normalized image rectangle spanned by two display points, clamped to the image.
    pub fn display_rect_to_image_rect(
        &self,
        start: DisplayPoint,
        end: DisplayPoint,
    ) -> Option<ImageRect> {
        let (key, geometry) = self.cached?;
        let clamp_corner = |point: DisplayPoint| {
            let position = geometry.to_image(point);
            ImagePosition::new(
                position.x.clamp(0.0, f64::from(key.image.width)),
                position.y.clamp(0.0, f64::from(key.image.height)),
            )
            .to_pixel()
        };
        Some(ImageRect::from_corners(clamp_corner(start), clamp_corner(end)))
    }

    /// Image rectangle to the display rectangle it occupies, as `(origin, size)`.
    pub fn image_rect_to_display(&self, rect: ImageRect) -> Option<(DisplayPoint, DisplaySize)> {
        let geometry = self.geometry()?;
        let origin = geometry.to_display(rect.origin().into());
        Some((
            origin,
            DisplaySize::new(
                f64::from(rect.width) * geometry.scale,
                f64::from(rect.height) * geometry.scale,
            ),
        ))
    }

    /// Zooms to `zoom` keeping the image point under `anchor` visually fixed.
    /// Without cached geometry this is a plain [`CoordinateMapper::set_zoom`].
    pub fn zoom_at(&mut self, zoom: f64, anchor: DisplayPoint) -> Option<DisplayGeometry> {
        let Some((key, geometry)) = self.cached else {
            self.set_zoom(zoom);
            return None;
        };
        let fixed = geometry.to_image(anchor);
        let zoom = clamp_zoom(zoom);
        let unpanned = compute_geometry(&GeometryKey {
            zoom,
            pan: DisplayPoint::default(),
            ..key
        })?;
        let wanted_origin = DisplayPoint::new(
            anchor.x - fixed.x * unpanned.scale,
            anchor.y - fixed.y * unpanned.scale,
        );
        self.pan = DisplayPoint::new(
            wanted_origin.x - unpanned.origin.x,
            wanted_origin.y - unpanned.origin.y,
        );
        let geometry = self.recompute_geometry(key.viewport, key.image, zoom);
        tracing::debug!(zoom = self.zoom, "zoomed around anchor");
        geometry
    }

    /// One scroll notch: up zooms in by [`SCROLL_ZOOM_STEP`], down zooms out.
    pub fn scroll_zoom(
        &mut self,
        direction: ScrollDirection,
        anchor: DisplayPoint,
    ) -> Option<DisplayGeometry> {
        let zoom = match direction {
            ScrollDirection::Up => self.zoom * SCROLL_ZOOM_STEP,
            ScrollDirection::Down => self.zoom / SCROLL_ZOOM_STEP,
        };
        self.zoom_at(zoom, anchor)
    }

    pub fn hit_test_resize_handle(&self, point: DisplayPoint) -> Option<ResizeHandle> {
        handles::hit_test(&self.geometry()?, point)
    }
}

fn compute_geometry(key: &GeometryKey) -> Option<DisplayGeometry> {
    if key.viewport.is_empty() || key.image.width == 0 || key.image.height == 0 {
        return None;
    }
    let image_width = f64::from(key.image.width);
    let image_height = f64::from(key.image.height);
    let fit = (key.viewport.width / image_width).min(key.viewport.height / image_height);
    let scale = fit * key.zoom;
    let size = DisplaySize::new(image_width * scale, image_height * scale);
    let origin = DisplayPoint::new(
        (key.viewport.width - size.width) / 2.0 + key.pan.x,
        (key.viewport.height - size.height) / 2.0 + key.pan.y,
    );
    Some(DisplayGeometry {
        origin,
        size,
        scale,
    })
}
