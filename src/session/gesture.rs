use crate::geometry::{Color, DisplayPoint, ImagePoint, ImagePosition, ImageRect, ImageSize};
use crate::viewport::ResizeHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum RectPurpose {
    Select,
    Crop,
    TextBox,
}

/// Drag in progress. Nothing here has touched the surface yet.
#[derive(Debug, Clone, PartialEq)]
pub(super) enum Gesture {
    ResizeCanvas {
        handle: ResizeHandle,
        start: DisplayPoint,
        start_size: ImageSize,
        scale: f64,
        preview: ImageSize,
    },
    Rectangle {
        purpose: RectPurpose,
        start: DisplayPoint,
        current: DisplayPoint,
    },
    /// The floating payload follows the pointer; `grab` is the pointer's
    /// position relative to the payload's top-left, in image pixels.
    MoveFloating {
        grab: ImagePosition,
        start_offset: ImagePoint,
    },
    /// Dragging an active rectangle; it is cut only when the drag ends.
    MoveSelection {
        rect: ImageRect,
        start: ImagePosition,
        current: ImagePosition,
    },
    Brush {
        points: Vec<ImagePoint>,
    },
}

impl Gesture {
    pub(super) const fn name(&self) -> &'static str {
        match self {
            Self::ResizeCanvas { .. } => "resize-canvas",
            Self::Rectangle {
                purpose: RectPurpose::Select,
                ..
            } => "select",
            Self::Rectangle {
                purpose: RectPurpose::Crop,
                ..
            } => "crop",
            Self::Rectangle {
                purpose: RectPurpose::TextBox,
                ..
            } => "text-box",
            Self::MoveFloating { .. } => "move-floating",
            Self::MoveSelection { .. } => "move-selection",
            Self::Brush { .. } => "brush",
        }
    }
}

/// Whole-pixel distance between two image positions.
pub(super) fn pixel_delta(from: ImagePosition, to: ImagePosition) -> (i32, i32) {
    let delta = ImagePosition::new(to.x - from.x, to.y - from.y);
    let rounded = ImagePosition::new(delta.x.round(), delta.y.round());
    let pixel = rounded.to_pixel();
    (pixel.x, pixel.y)
}

/// What a shell should draw over the canvas while a drag is live.
#[derive(Debug, Clone, PartialEq)]
pub enum GesturePreview {
    SelectionRect(ImageRect),
    CropRect(ImageRect),
    TextBox(ImageRect),
    /// Active selection outline following the pointer before it is cut.
    MovedSelection(ImageRect),
    Stroke {
        points: Vec<ImagePoint>,
        size: u32,
        color: Color,
    },
    CanvasSize {
        handle: ResizeHandle,
        size: ImageSize,
    },
}
