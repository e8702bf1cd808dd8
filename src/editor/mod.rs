//! The image editing engine: current surface, selection and undo history.
//!
//! Every mutating operation snapshots the surface it is about to change onto
//! [`EditHistory`] and leaves the editor untouched when it fails. Null
//! operations (empty rectangles, empty strokes, blank text) report
//! [`EditOutcome::Unchanged`] and record nothing.

mod paint;
mod region;

use std::borrow::Cow;

use thiserror::Error;

use crate::geometry::{Color, ImageSize};
use crate::history::{EditHistory, HistoryDirection};
use crate::raster::FontError;
use crate::selection::SelectionState;
use crate::surface::{PixelSurface, SurfaceError};

/// Canvas created when no image is loaded.
pub const DEFAULT_CANVAS_SIZE: ImageSize = ImageSize::new(800, 600);

#[derive(Debug, Error)]
pub enum EditorError {
    #[error("{operation} failed: {source}")]
    Surface {
        operation: &'static str,
        #[source]
        source: SurfaceError,
    },
    #[error("{operation} failed: {source}")]
    Font {
        operation: &'static str,
        #[source]
        source: FontError,
    },
}

impl EditorError {
    fn surface(operation: &'static str) -> impl FnOnce(SurfaceError) -> Self {
        move |source| Self::Surface { operation, source }
    }

    /// Underlying surface failure, if this is one.
    pub fn surface_error(&self) -> Option<&SurfaceError> {
        match self {
            Self::Surface { source, .. } => Some(source),
            Self::Font { .. } => None,
        }
    }
}

pub type EditorResult<T> = std::result::Result<T, EditorError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    Changed,
    Unchanged,
}

impl EditOutcome {
    pub const fn is_changed(self) -> bool {
        matches!(self, Self::Changed)
    }

    pub const fn from_changed(changed: bool) -> Self {
        if changed {
            Self::Changed
        } else {
            Self::Unchanged
        }
    }
}

#[derive(Debug, Clone)]
pub struct ImageEditor {
    surface: PixelSurface,
    selection: SelectionState,
    history: EditHistory,
}

impl ImageEditor {
    pub fn new(surface: PixelSurface) -> Self {
        Self {
            surface,
            selection: SelectionState::Empty,
            history: EditHistory::new(),
        }
    }

    /// Opaque white canvas of [`DEFAULT_CANVAS_SIZE`].
    pub fn with_default_canvas() -> EditorResult<Self> {
        let surface = PixelSurface::filled(
            DEFAULT_CANVAS_SIZE.width,
            DEFAULT_CANVAS_SIZE.height,
            Color::WHITE,
        )
        .map_err(EditorError::surface("create canvas"))?;
        Ok(Self::new(surface))
    }

    pub fn surface(&self) -> &PixelSurface {
        &self.surface
    }

    pub const fn size(&self) -> ImageSize {
        self.surface.size()
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn history(&self) -> &EditHistory {
        &self.history
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Decodes `bytes` and, only on success, replaces the surface and resets
    /// history and selection.
    pub fn load(&mut self, bytes: &[u8]) -> EditorResult<()> {
        let surface = PixelSurface::decode_png(bytes).map_err(EditorError::surface("load"))?;
        tracing::info!(width = surface.width(), height = surface.height(), "image loaded");
        self.reset_to(surface);
        Ok(())
    }

    pub fn create_blank(&mut self, width: u32, height: u32, color: Color) -> EditorResult<()> {
        let surface = PixelSurface::filled(width, height, color)
            .map_err(EditorError::surface("create canvas"))?;
        tracing::info!(width, height, "blank canvas created");
        self.reset_to(surface);
        Ok(())
    }

    fn reset_to(&mut self, surface: PixelSurface) {
        self.surface = surface;
        self.history.clear();
        self.selection.clear();
    }

    /// Encodes what the user sees, floating content included. Nothing is committed.
    pub fn save(&self) -> EditorResult<Vec<u8>> {
        let bytes = self
            .composited()
            .encode_png()
            .map_err(EditorError::surface("save"))?;
        tracing::info!(len = bytes.len(), "image encoded");
        Ok(bytes)
    }

    /// The surface with any floating payload drawn on top.
    pub fn composited(&self) -> Cow<'_, PixelSurface> {
        match self.selection.floating() {
            Some(floating) => {
                let mut view = self.surface.clone();
                view.composite_over(floating.payload(), floating.offset());
                Cow::Owned(view)
            }
            None => Cow::Borrowed(&self.surface),
        }
    }

    fn record_snapshot(&mut self) {
        self.history.record(self.surface.clone());
    }

    /// Blends a pending floating payload into the surface. The snapshot for it
    /// was recorded when it was cut or pasted, so no history entry is added.
    fn commit_floating(&mut self) -> bool {
        let Some(floating) = self.selection.take_floating() else {
            return false;
        };
        self.surface
            .composite_over(floating.payload(), floating.offset());
        tracing::debug!(
            x = floating.offset().x,
            y = floating.offset().y,
            "floating selection committed"
        );
        true
    }

    pub fn undo(&mut self) -> bool {
        self.step_history(HistoryDirection::Undo)
    }

    pub fn redo(&mut self) -> bool {
        self.step_history(HistoryDirection::Redo)
    }

    fn step_history(&mut self, direction: HistoryDirection) -> bool {
        let current = self.surface.clone();
        let restored = match direction {
            HistoryDirection::Undo => self.history.undo(current),
            HistoryDirection::Redo => self.history.redo(current),
        };
        let Some(restored) = restored else {
            tracing::debug!("{}", direction.empty_message());
            return false;
        };
        self.surface = restored;
        self.selection.clear();
        tracing::debug!(
            undo = self.history.undo_len(),
            redo = self.history.redo_len(),
            "{}",
            direction.applied_message()
        );
        true
    }
}
