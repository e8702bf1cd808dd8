use crate::geometry::{Anchor, DisplayPoint, ImageSize};

use super::DisplayGeometry;

/// Distance in display pixels within which an image edge counts as grabbed.
pub const RESIZE_HANDLE_MARGIN: f64 = 8.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResizeHandle {
    TopLeft,
    Top,
    TopRight,
    Right,
    BottomRight,
    Bottom,
    BottomLeft,
    Left,
}

impl ResizeHandle {
    pub const fn name(self) -> &'static str {
        match self {
            Self::TopLeft => "top-left",
            Self::Top => "top",
            Self::TopRight => "top-right",
            Self::Right => "right",
            Self::BottomRight => "bottom-right",
            Self::Bottom => "bottom",
            Self::BottomLeft => "bottom-left",
            Self::Left => "left",
        }
    }

    /// Canvas anchor that stays put while this handle is dragged.
    pub const fn anchor(self) -> Anchor {
        match self {
            Self::TopLeft => Anchor::BottomRight,
            Self::Top | Self::TopRight => Anchor::BottomLeft,
            Self::BottomLeft | Self::Left => Anchor::TopRight,
            Self::Right | Self::BottomRight | Self::Bottom => Anchor::TopLeft,
        }
    }

    const fn moves_left_edge(self) -> bool {
        matches!(self, Self::Left | Self::TopLeft | Self::BottomLeft)
    }

    const fn moves_right_edge(self) -> bool {
        matches!(self, Self::Right | Self::TopRight | Self::BottomRight)
    }

    const fn moves_top_edge(self) -> bool {
        matches!(self, Self::Top | Self::TopLeft | Self::TopRight)
    }

    const fn moves_bottom_edge(self) -> bool {
        matches!(self, Self::Bottom | Self::BottomLeft | Self::BottomRight)
    }

    /// Canvas size after dragging this handle by a display-space delta.
    /// Each side is rounded and never drops below one pixel.
    pub fn resized_canvas_size(
        self,
        start: ImageSize,
        display_dx: f64,
        display_dy: f64,
        scale: f64,
    ) -> ImageSize {
        if scale.is_nan() || scale <= 0.0 {
            return start;
        }
        let dx = display_dx / scale;
        let dy = display_dy / scale;
        let mut width = f64::from(start.width);
        let mut height = f64::from(start.height);
        if self.moves_left_edge() {
            width -= dx;
        } else if self.moves_right_edge() {
            width += dx;
        }
        if self.moves_top_edge() {
            height -= dy;
        } else if self.moves_bottom_edge() {
            height += dy;
        }
        ImageSize::new(round_to_side(width), round_to_side(height))
    }
}

fn round_to_side(value: f64) -> u32 {
    if value.is_nan() {
        return 1;
    }
    value.round().clamp(1.0, f64::from(u32::MAX)) as u32
}

/// Handle under `point`, if any. Corners win over edges, the top and bottom
/// edges over the sides.
pub(super) fn hit_test(geometry: &DisplayGeometry, point: DisplayPoint) -> Option<ResizeHandle> {
    if geometry.size.is_empty() {
        return None;
    }
    let left = geometry.origin.x;
    let right = left + geometry.size.width;
    let top = geometry.origin.y;
    let bottom = top + geometry.size.height;

    let within_x = point.x >= left - RESIZE_HANDLE_MARGIN && point.x <= right + RESIZE_HANDLE_MARGIN;
    let within_y = point.y >= top - RESIZE_HANDLE_MARGIN && point.y <= bottom + RESIZE_HANDLE_MARGIN;
    if !within_x || !within_y {
        return None;
    }

    let on_left = (point.x - left).abs() <= RESIZE_HANDLE_MARGIN;
    let on_right = (point.x - right).abs() <= RESIZE_HANDLE_MARGIN;
    let on_top = (point.y - top).abs() <= RESIZE_HANDLE_MARGIN;
    let on_bottom = (point.y - bottom).abs() <= RESIZE_HANDLE_MARGIN;

    match (on_top, on_bottom, on_left, on_right) {
        (true, _, true, _) => Some(ResizeHandle::TopLeft),
        (true, _, _, true) => Some(ResizeHandle::TopRight),
        (true, _, _, _) => Some(ResizeHandle::Top),
        (_, true, true, _) => Some(ResizeHandle::BottomLeft),
        (_, true, _, true) => Some(ResizeHandle::BottomRight),
        (_, true, _, _) => Some(ResizeHandle::Bottom),
        (_, _, true, _) => Some(ResizeHandle::Left),
        (_, _, _, true) => Some(ResizeHandle::Right),
        _ => None,
    }
}
