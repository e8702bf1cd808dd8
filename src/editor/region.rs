use crate::clipboard::ClipboardPayload;
use crate::geometry::{ImagePoint, ImageRect};
use crate::selection::FloatingSelection;

use super::{EditOutcome, EditorError, EditorResult, ImageEditor};

impl ImageEditor {
    fn clamp_rect(&self, rect: ImageRect) -> Option<ImageRect> {
        let clamped = rect.clamp_to(self.size());
        (!clamped.is_empty()).then_some(clamped)
    }

    /// Replaces the surface with the clamped sub-region.
    pub fn apply_crop(&mut self, rect: ImageRect) -> EditorResult<EditOutcome> {
        let Some(rect) = self.clamp_rect(rect) else {
            return Ok(EditOutcome::Unchanged);
        };
        self.commit_floating();
        let cropped = self
            .surface
            .region(rect)
            .map_err(EditorError::surface("crop"))?;
        self.record_snapshot();
        self.surface = cropped;
        self.selection.clear();
        tracing::debug!(?rect, "crop applied");
        Ok(EditOutcome::Changed)
    }

    /// Lifts the region into a floating selection and leaves a transparent hole.
    pub fn cut_selection(&mut self, rect: ImageRect) -> EditorResult<EditOutcome> {
        let Some(rect) = self.clamp_rect(rect) else {
            return Ok(EditOutcome::Unchanged);
        };
        self.commit_floating();
        let payload = self
            .surface
            .region(rect)
            .map_err(EditorError::surface("cut"))?;
        let mut holed = self.surface.clone();
        holed
            .clear_region(rect)
            .map_err(EditorError::surface("cut"))?;
        self.history
            .record(std::mem::replace(&mut self.surface, holed));
        self.selection
            .float(FloatingSelection::cut_from(payload, rect));
        tracing::debug!(?rect, "selection cut");
        Ok(EditOutcome::Changed)
    }

    /// Copies the region out; the surface and selection rectangle stay as they are.
    pub fn copy_selection(&mut self, rect: ImageRect) -> EditorResult<Option<ClipboardPayload>> {
        let Some(rect) = self.clamp_rect(rect) else {
            return Ok(None);
        };
        self.commit_floating();
        let payload = self
            .surface
            .region(rect)
            .map_err(EditorError::surface("copy"))?;
        tracing::debug!(?rect, "selection copied");
        Ok(Some(ClipboardPayload::from_surface(payload)))
    }

    /// Installs `payload` as a floating selection at `at`, committing any
    /// earlier floating content first.
    pub fn paste_clipboard(&mut self, payload: ClipboardPayload, at: ImagePoint) -> EditOutcome {
        self.commit_floating();
        self.record_snapshot();
        tracing::debug!(
            width = payload.width(),
            height = payload.height(),
            x = at.x,
            y = at.y,
            "clipboard pasted as floating selection"
        );
        self.selection
            .float(FloatingSelection::new(payload.into_surface(), at));
        EditOutcome::Changed
    }

    /// Starts a new rectangular selection, committing floating content first.
    /// Rectangles with no area inside the image clear the selection.
    pub fn select(&mut self, rect: ImageRect) {
        self.commit_floating();
        self.selection.activate(rect.clamp_to(self.size()));
    }

    /// Drops the selection. Floating content is discarded, not committed.
    pub fn clear_selection(&mut self) {
        if self.selection.take_floating().is_some() {
            tracing::debug!("floating selection discarded");
        }
        self.selection.clear();
    }

    /// Removes selected pixels: a floating payload is discarded, an active
    /// rectangle is cleared to transparent.
    pub fn delete_selection(&mut self) -> EditorResult<EditOutcome> {
        if self.selection.is_floating() {
            self.clear_selection();
            return Ok(EditOutcome::Changed);
        }
        let Some(rect) = self
            .selection
            .active_rect()
            .and_then(|rect| self.clamp_rect(rect))
        else {
            return Ok(EditOutcome::Unchanged);
        };
        let mut holed = self.surface.clone();
        holed
            .clear_region(rect)
            .map_err(EditorError::surface("delete"))?;
        self.history
            .record(std::mem::replace(&mut self.surface, holed));
        self.selection.clear();
        tracing::debug!(?rect, "selection deleted");
        Ok(EditOutcome::Changed)
    }

    /// Shifts floating content; `false` when nothing is floating.
    pub fn move_floating(&mut self, delta_x: i32, delta_y: i32) -> bool {
        let Some(floating) = self.selection.floating_mut() else {
            return false;
        };
        floating.move_by(delta_x, delta_y);
        true
    }

    pub fn move_floating_to(&mut self, offset: ImagePoint) -> bool {
        let Some(floating) = self.selection.floating_mut() else {
            return false;
        };
        floating.move_to(offset);
        true
    }

    pub fn commit_paste(&mut self) -> EditOutcome {
        EditOutcome::from_changed(self.commit_floating())
    }
}
