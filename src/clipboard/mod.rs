//! Clipboard payloads and the slot the session copies into and pastes from.
//!
//! System clipboards live in the shell; they implement [`ClipboardSlot`] and
//! exchange straight-alpha RGBA through [`ClipboardPayload`].

use thiserror::Error;

use crate::surface::{PixelSurface, SurfaceError};

#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("clipboard unavailable: {reason}")]
    Unavailable { reason: String },
    #[error("clipboard image is invalid: {0}")]
    InvalidImage(#[from] SurfaceError),
}

pub type ClipboardResult<T> = std::result::Result<T, ClipboardError>;

/// Width, height and pixels of copied content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipboardPayload {
    surface: PixelSurface,
}

impl ClipboardPayload {
    pub fn from_surface(surface: PixelSurface) -> Self {
        Self { surface }
    }

    /// Builds a payload from straight-alpha RGBA8 bytes as system clipboards deliver them.
    pub fn from_straight_rgba(width: u32, height: u32, data: Vec<u8>) -> ClipboardResult<Self> {
        Ok(Self::from_surface(PixelSurface::from_straight_rgba(
            width, height, data,
        )?))
    }

    pub const fn width(&self) -> u32 {
        self.surface.width()
    }

    pub const fn height(&self) -> u32 {
        self.surface.height()
    }

    pub fn surface(&self) -> &PixelSurface {
        &self.surface
    }

    pub fn into_surface(self) -> PixelSurface {
        self.surface
    }

    pub fn to_straight_rgba(&self) -> Vec<u8> {
        self.surface.to_straight_rgba()
    }
}

impl From<PixelSurface> for ClipboardPayload {
    fn from(surface: PixelSurface) -> Self {
        Self::from_surface(surface)
    }
}

pub trait ClipboardSlot {
    fn store(&mut self, payload: ClipboardPayload) -> ClipboardResult<()>;
    fn load(&self) -> ClipboardResult<Option<ClipboardPayload>>;
}

/// Process-local clipboard holding at most one payload.
#[derive(Debug, Default, Clone)]
pub struct InMemoryClipboard {
    payload: Option<ClipboardPayload>,
}

impl InMemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_none()
    }

    pub fn clear(&mut self) {
        self.payload = None;
    }
}

impl ClipboardSlot for InMemoryClipboard {
    fn store(&mut self, payload: ClipboardPayload) -> ClipboardResult<()> {
        tracing::debug!(
            width = payload.width(),
            height = payload.height(),
            "stored clipboard image"
        );
        self.payload = Some(payload);
        Ok(())
    }

    fn load(&self) -> ClipboardResult<Option<ClipboardPayload>> {
        Ok(self.payload.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Color;

    #[test]
    fn in_memory_clipboard_keeps_latest_payload() {
        let mut clipboard = InMemoryClipboard::new();
        assert!(clipboard.load().unwrap().is_none());

        let first = ClipboardPayload::from_surface(PixelSurface::filled(2, 2, Color::RED).unwrap());
        let second =
            ClipboardPayload::from_surface(PixelSurface::filled(3, 1, Color::BLACK).unwrap());
        clipboard.store(first).unwrap();
        clipboard.store(second.clone()).unwrap();
        assert_eq!(clipboard.load().unwrap(), Some(second));
    }

    #[test]
    fn straight_rgba_payload_round_trips_translucent_pixels() {
        let payload = ClipboardPayload::from_straight_rgba(1, 1, vec![255, 0, 0, 128]).unwrap();
        assert_eq!(payload.surface().pixel(0, 0), Some([128, 0, 0, 128]));
        assert_eq!(payload.to_straight_rgba(), vec![255, 0, 0, 128]);
    }

    #[test]
    fn malformed_straight_rgba_is_rejected() {
        let err = ClipboardPayload::from_straight_rgba(2, 2, vec![0; 3]).unwrap_err();
        assert!(matches!(err, ClipboardError::InvalidImage(_)));
    }
}
