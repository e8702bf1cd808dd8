//! Selection rectangle and floating-selection state machine.
//!
//! `Empty` → `Active(rect)` on a completed drag, `Active` → `Floating` on cut
//! or paste, `Floating` → `Empty` on commit or discard. Only [`ImageEditor`]
//! mutates the surface; this module holds the bookkeeping.
//!
//! [`ImageEditor`]: crate::editor::ImageEditor

use crate::geometry::{ImagePoint, ImageRect};
use crate::surface::PixelSurface;

/// Pixel content detached from the surface, drawn at `offset` until committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FloatingSelection {
    payload: PixelSurface,
    offset: ImagePoint,
    source: Option<ImageRect>,
}

impl FloatingSelection {
    pub fn new(payload: PixelSurface, offset: ImagePoint) -> Self {
        Self {
            payload,
            offset,
            source: None,
        }
    }

    pub fn cut_from(payload: PixelSurface, source: ImageRect) -> Self {
        Self {
            payload,
            offset: source.origin(),
            source: Some(source),
        }
    }

    pub fn payload(&self) -> &PixelSurface {
        &self.payload
    }

    pub fn into_payload(self) -> PixelSurface {
        self.payload
    }

    pub const fn offset(&self) -> ImagePoint {
        self.offset
    }

    /// Rectangle the payload was cut from, `None` for pasted content.
    pub const fn source(&self) -> Option<ImageRect> {
        self.source
    }

    /// Current footprint in image space.
    pub fn bounds(&self) -> ImageRect {
        ImageRect::new(
            self.offset.x,
            self.offset.y,
            self.payload.width(),
            self.payload.height(),
        )
    }

    pub fn contains(&self, point: ImagePoint) -> bool {
        self.bounds().contains(point)
    }

    pub fn move_by(&mut self, delta_x: i32, delta_y: i32) {
        self.offset = self.offset.offset_by(delta_x, delta_y);
    }

    pub fn move_to(&mut self, offset: ImagePoint) {
        self.offset = offset;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SelectionState {
    #[default]
    Empty,
    Active(ImageRect),
    Floating(FloatingSelection),
}

impl SelectionState {
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    pub const fn is_floating(&self) -> bool {
        matches!(self, Self::Floating(_))
    }

    /// Rectangle currently outlined on screen, for either state.
    pub fn rect(&self) -> Option<ImageRect> {
        match self {
            Self::Empty => None,
            Self::Active(rect) => Some(*rect),
            Self::Floating(floating) => Some(floating.bounds()),
        }
    }

    pub fn active_rect(&self) -> Option<ImageRect> {
        match self {
            Self::Active(rect) => Some(*rect),
            _ => None,
        }
    }

    pub fn floating(&self) -> Option<&FloatingSelection> {
        match self {
            Self::Floating(floating) => Some(floating),
            _ => None,
        }
    }

    pub fn floating_mut(&mut self) -> Option<&mut FloatingSelection> {
        match self {
            Self::Floating(floating) => Some(floating),
            _ => None,
        }
    }

    /// Marks `rect` as the active selection. Empty rectangles clear the selection.
    pub fn activate(&mut self, rect: ImageRect) {
        *self = if rect.is_empty() {
            Self::Empty
        } else {
            Self::Active(rect)
        };
    }

    pub fn float(&mut self, floating: FloatingSelection) {
        *self = Self::Floating(floating);
    }

    /// Removes a floating payload, leaving the selection empty.
    pub fn take_floating(&mut self) -> Option<FloatingSelection> {
        match std::mem::take(self) {
            Self::Floating(floating) => Some(floating),
            other => {
                *self = other;
                None
            }
        }
    }

    pub fn clear(&mut self) {
        *self = Self::Empty;
    }
}
