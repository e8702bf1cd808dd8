//! Shared geometric and color primitives used across surface, editor and viewport modules.

use serde::Deserialize;

/// Integer pixel coordinate in image space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImagePoint {
    pub x: i32,
    pub y: i32,
}

impl ImagePoint {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub const fn offset_by(self, delta_x: i32, delta_y: i32) -> Self {
        Self {
            x: self.x.saturating_add(delta_x),
            y: self.y.saturating_add(delta_y),
        }
    }
}

/// Sub-pixel position in image space, produced by display-to-image mapping.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ImagePosition {
    pub x: f64,
    pub y: f64,
}

impl ImagePosition {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Pixel that contains this position.
    pub fn to_pixel(self) -> ImagePoint {
        ImagePoint::new(saturating_f64_to_i32(self.x.floor()), saturating_f64_to_i32(self.y.floor()))
    }
}

impl From<ImagePoint> for ImagePosition {
    fn from(point: ImagePoint) -> Self {
        Self::new(f64::from(point.x), f64::from(point.y))
    }
}

/// Point in display (widget) space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DisplayPoint {
    pub x: f64,
    pub y: f64,
}

impl DisplayPoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DisplaySize {
    pub width: f64,
    pub height: f64,
}

impl DisplaySize {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

impl ImageSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub const fn bounds(self) -> ImageRect {
        ImageRect::new(0, 0, self.width, self.height)
    }
}

/// Axis-aligned rectangle in image space. Width and height are never negative;
/// a zero width or height means "no area".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImageRect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl ImageRect {
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Builds the rectangle spanned by two corner points, whatever the drag direction.
    pub fn from_corners(start: ImagePoint, end: ImagePoint) -> Self {
        let left = start.x.min(end.x);
        let top = start.y.min(end.y);
        let width = i64::from(start.x.max(end.x)) - i64::from(left);
        let height = i64::from(start.y.max(end.y)) - i64::from(top);
        Self::new(
            left,
            top,
            u32::try_from(width).unwrap_or(u32::MAX),
            u32::try_from(height).unwrap_or(u32::MAX),
        )
    }

    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub const fn origin(&self) -> ImagePoint {
        ImagePoint::new(self.x, self.y)
    }

    pub fn right(&self) -> i64 {
        i64::from(self.x) + i64::from(self.width)
    }

    pub fn bottom(&self) -> i64 {
        i64::from(self.y) + i64::from(self.height)
    }

    pub fn contains(&self, point: ImagePoint) -> bool {
        let x = i64::from(point.x);
        let y = i64::from(point.y);
        x >= i64::from(self.x) && x < self.right() && y >= i64::from(self.y) && y < self.bottom()
    }

    /// Intersection with `[0, size)`; empty when the rectangle lies fully outside.
    pub fn clamp_to(&self, size: ImageSize) -> ImageRect {
        let left = i64::from(self.x).clamp(0, i64::from(size.width));
        let top = i64::from(self.y).clamp(0, i64::from(size.height));
        let right = self.right().clamp(0, i64::from(size.width));
        let bottom = self.bottom().clamp(0, i64::from(size.height));
        ImageRect::new(
            i32::try_from(left).unwrap_or(i32::MAX),
            i32::try_from(top).unwrap_or(i32::MAX),
            u32::try_from(right - left).unwrap_or(0),
            u32::try_from(bottom - top).unwrap_or(0),
        )
    }

    pub fn fits_within(&self, size: ImageSize) -> bool {
        self.x >= 0
            && self.y >= 0
            && self.right() <= i64::from(size.width)
            && self.bottom() <= i64::from(size.height)
    }

    pub const fn translated(&self, delta_x: i32, delta_y: i32) -> Self {
        Self::new(
            self.x.saturating_add(delta_x),
            self.y.saturating_add(delta_y),
            self.width,
            self.height,
        )
    }
}

/// Canvas point that stays fixed while a canvas is resized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Anchor {
    #[default]
    TopLeft,
    Top,
    TopRight,
    Left,
    Center,
    Right,
    BottomLeft,
    Bottom,
    BottomRight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AxisAnchor {
    Start,
    Middle,
    End,
}

impl AxisAnchor {
    fn offset(self, old: u32, new: u32) -> i32 {
        let delta = i64::from(new) - i64::from(old);
        let offset = match self {
            Self::Start => 0,
            Self::Middle => delta.div_euclid(2),
            Self::End => delta,
        };
        i32::try_from(offset).unwrap_or(if offset < 0 { i32::MIN } else { i32::MAX })
    }
}

impl Anchor {
    pub const ALL: [Anchor; 9] = [
        Self::TopLeft,
        Self::Top,
        Self::TopRight,
        Self::Left,
        Self::Center,
        Self::Right,
        Self::BottomLeft,
        Self::Bottom,
        Self::BottomRight,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Self::TopLeft => "top-left",
            Self::Top => "top",
            Self::TopRight => "top-right",
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
            Self::BottomLeft => "bottom-left",
            Self::Bottom => "bottom",
            Self::BottomRight => "bottom-right",
        }
    }

    const fn axes(self) -> (AxisAnchor, AxisAnchor) {
        match self {
            Self::TopLeft => (AxisAnchor::Start, AxisAnchor::Start),
            Self::Top => (AxisAnchor::Middle, AxisAnchor::Start),
            Self::TopRight => (AxisAnchor::End, AxisAnchor::Start),
            Self::Left => (AxisAnchor::Start, AxisAnchor::Middle),
            Self::Center => (AxisAnchor::Middle, AxisAnchor::Middle),
            Self::Right => (AxisAnchor::End, AxisAnchor::Middle),
            Self::BottomLeft => (AxisAnchor::Start, AxisAnchor::End),
            Self::Bottom => (AxisAnchor::Middle, AxisAnchor::End),
            Self::BottomRight => (AxisAnchor::End, AxisAnchor::End),
        }
    }

    /// Where the old canvas's top-left lands inside the resized canvas.
    /// Centered axes split the difference with floor division.
    pub fn placement(self, old: ImageSize, new: ImageSize) -> ImagePoint {
        let (horizontal, vertical) = self.axes();
        ImagePoint::new(
            horizontal.offset(old.width, new.width),
            vertical.offset(old.height, new.height),
        )
    }
}

impl std::fmt::Display for Anchor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Anchor {
    type Err = String;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|anchor| anchor.name() == name)
            .ok_or_else(|| format!("unknown anchor '{name}'"))
    }
}

/// Straight (non-premultiplied) RGBA color as supplied by callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    #[serde(default = "opaque_alpha")]
    pub a: u8,
}

const fn opaque_alpha() -> u8 {
    255
}

impl Color {
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const RED: Color = Color::rgb(255, 0, 0);

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 255)
    }

    pub const fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Premultiplied RGBA bytes in surface storage order.
    pub const fn premultiplied(self) -> [u8; 4] {
        match self.a {
            0 => [0, 0, 0, 0],
            255 => [self.r, self.g, self.b, 255],
            a => [
                premultiply_channel(self.r, a),
                premultiply_channel(self.g, a),
                premultiply_channel(self.b, a),
                a,
            ],
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

const fn premultiply_channel(channel: u8, alpha: u8) -> u8 {
    ((channel as u16 * alpha as u16 + 127) / 255) as u8
}

fn saturating_f64_to_i32(value: f64) -> i32 {
    if value.is_nan() {
        0
    } else {
        value.clamp(f64::from(i32::MIN), f64::from(i32::MAX)) as i32
    }
}
