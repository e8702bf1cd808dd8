//! Shell-facing driver around [`ImageEditor`].
//!
//! A windowing shell feeds display-space drags, clicks and discrete actions
//! into [`EditorSession`]; the session maps them through its
//! [`CoordinateMapper`], applies tool semantics and calls the editor. Drags
//! only touch the surface in [`EditorSession::end_drag`]. A single redraw
//! callback fires after every call that changed what should be on screen.

mod gesture;

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::clipboard::{ClipboardError, ClipboardPayload, ClipboardSlot, InMemoryClipboard};
use crate::config::AppConfig;
use crate::editor::{EditOutcome, EditorError, ImageEditor};
use crate::geometry::{Anchor, Color, DisplayPoint, DisplaySize, ImagePoint, ImagePosition, ImageRect};
use crate::raster::FontBook;
use crate::storage::{self, FileStorage, ImageStorage, StorageError};
use crate::tools::{BrushOptions, TextOptions, ToolError, ToolKind, ToolState, ToolSwitch};
use crate::viewport::{CoordinateMapper, DisplayGeometry, ScrollDirection};

use gesture::{pixel_delta, Gesture, RectPurpose};
pub use gesture::GesturePreview;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Editor(#[from] EditorError),
    #[error(transparent)]
    Clipboard(#[from] ClipboardError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Tool(#[from] ToolError),
    #[error("image has no file path yet; choose where to save it")]
    MissingPath,
}

pub type SessionResult<T> = std::result::Result<T, SessionError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionAction {
    Undo,
    Redo,
    Copy,
    /// Copies the selection to the clipboard and leaves a transparent hole.
    Cut,
    /// Pastes the clipboard as a floating selection at the top-left and
    /// switches to the select tool.
    Paste,
    Delete,
    ApplyCrop,
    CommitSelection,
    ClearSelection,
    SelectTool(ToolKind),
    CommitText,
    CancelText,
    ResizeCanvas {
        width: u32,
        height: u32,
        anchor: Anchor,
    },
    Load(Vec<u8>),
    Save,
    CreateBlank {
        width: u32,
        height: u32,
        color: Color,
    },
}

impl SessionAction {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Undo => "undo",
            Self::Redo => "redo",
            Self::Copy => "copy",
            Self::Cut => "cut",
            Self::Paste => "paste",
            Self::Delete => "delete",
            Self::ApplyCrop => "apply-crop",
            Self::CommitSelection => "commit-selection",
            Self::ClearSelection => "clear-selection",
            Self::SelectTool(_) => "select-tool",
            Self::CommitText => "commit-text",
            Self::CancelText => "cancel-text",
            Self::ResizeCanvas { .. } => "resize-canvas",
            Self::Load(_) => "load",
            Self::Save => "save",
            Self::CreateBlank { .. } => "create-blank",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    Changed,
    Unchanged,
    Saved(Vec<u8>),
}

impl ActionOutcome {
    pub const fn is_changed(&self) -> bool {
        matches!(self, Self::Changed)
    }
}

impl From<EditOutcome> for ActionOutcome {
    fn from(outcome: EditOutcome) -> Self {
        match outcome {
            EditOutcome::Changed => Self::Changed,
            EditOutcome::Unchanged => Self::Unchanged,
        }
    }
}

/// Text being typed into a box before it is stamped onto the surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingText {
    anchor: ImagePoint,
    area: Option<ImageRect>,
    content: String,
}

impl PendingText {
    fn new(anchor: ImagePoint, area: Option<ImageRect>) -> Self {
        Self {
            anchor,
            area,
            content: String::new(),
        }
    }

    pub const fn anchor(&self) -> ImagePoint {
        self.anchor
    }

    /// Box the user dragged out, if the text was started by a drag.
    pub const fn area(&self) -> Option<ImageRect> {
        self.area
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn is_blank(&self) -> bool {
        self.content.trim().is_empty()
    }
}

type RedrawHandler = Box<dyn FnMut() + Send>;

pub struct EditorSession<C: ClipboardSlot = InMemoryClipboard> {
    editor: ImageEditor,
    tools: ToolState,
    mapper: CoordinateMapper,
    viewport: DisplaySize,
    clipboard: C,
    fonts: FontBook,
    brush: BrushOptions,
    text: TextOptions,
    crop_rect: Option<ImageRect>,
    pending_text: Option<PendingText>,
    gesture: Option<Gesture>,
    image_path: Option<PathBuf>,
    redraw: Option<RedrawHandler>,
}

impl<C: ClipboardSlot> std::fmt::Debug for EditorSession<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorSession")
            .field("tool", &self.tools.active())
            .field("size", &self.editor.size())
            .field("gesture", &self.gesture.as_ref().map(Gesture::name))
            .field("image_path", &self.image_path)
            .finish_non_exhaustive()
    }
}

impl EditorSession<InMemoryClipboard> {
    /// Default 800×600 white canvas with fonts and tool options from `config`.
    pub fn from_config(config: &AppConfig) -> SessionResult<Self> {
        let editor = ImageEditor::with_default_canvas()?;
        let mut session = Self::new(
            editor,
            InMemoryClipboard::new(),
            FontBook::from_paths(&config.fonts),
        );
        session.brush = config.brush_options();
        session.text = config.text_options();
        Ok(session)
    }
}

impl<C: ClipboardSlot> EditorSession<C> {
    pub fn new(editor: ImageEditor, clipboard: C, fonts: FontBook) -> Self {
        Self {
            editor,
            tools: ToolState::new(),
            mapper: CoordinateMapper::new(),
            viewport: DisplaySize::default(),
            clipboard,
            fonts,
            brush: BrushOptions::default(),
            text: TextOptions::default(),
            crop_rect: None,
            pending_text: None,
            gesture: None,
            image_path: None,
            redraw: None,
        }
    }

    pub fn editor(&self) -> &ImageEditor {
        &self.editor
    }

    pub fn tool(&self) -> ToolKind {
        self.tools.active()
    }

    pub fn mapper(&self) -> &CoordinateMapper {
        &self.mapper
    }

    pub fn clipboard(&self) -> &C {
        &self.clipboard
    }

    pub fn fonts(&self) -> &FontBook {
        &self.fonts
    }

    pub fn fonts_mut(&mut self) -> &mut FontBook {
        &mut self.fonts
    }

    pub fn brush_options(&self) -> &BrushOptions {
        &self.brush
    }

    pub fn brush_options_mut(&mut self) -> &mut BrushOptions {
        &mut self.brush
    }

    pub fn text_options(&self) -> &TextOptions {
        &self.text
    }

    pub fn text_options_mut(&mut self) -> &mut TextOptions {
        &mut self.text
    }

    /// Crop box awaiting [`SessionAction::ApplyCrop`].
    pub fn crop_rect(&self) -> Option<ImageRect> {
        self.crop_rect
    }

    pub fn pending_text(&self) -> Option<&PendingText> {
        self.pending_text.as_ref()
    }

    pub fn image_path(&self) -> Option<&Path> {
        self.image_path.as_deref()
    }

    pub fn is_dragging(&self) -> bool {
        self.gesture.is_some()
    }

    pub fn set_redraw_handler(&mut self, handler: impl FnMut() + Send + 'static) {
        self.redraw = Some(Box::new(handler));
    }

    fn notify(&mut self) {
        if let Some(redraw) = self.redraw.as_mut() {
            redraw();
        }
    }

    fn notify_if(&mut self, changed: bool) {
        if changed {
            self.notify();
        }
    }

    // Viewport

    pub fn set_viewport_size(&mut self, size: DisplaySize) {
        if self.viewport == size {
            return;
        }
        self.viewport = size;
        self.refresh_geometry();
        self.notify();
    }

    fn refresh_geometry(&mut self) -> Option<DisplayGeometry> {
        self.mapper.geometry_for(self.viewport, self.editor.size())
    }

    pub fn geometry(&mut self) -> Option<DisplayGeometry> {
        self.refresh_geometry()
    }

    pub fn zoom_at(&mut self, zoom: f64, anchor: DisplayPoint) {
        self.refresh_geometry();
        self.mapper.zoom_at(zoom, anchor);
        self.notify();
    }

    pub fn scroll_zoom(&mut self, direction: ScrollDirection, anchor: DisplayPoint) {
        self.refresh_geometry();
        self.mapper.scroll_zoom(direction, anchor);
        self.notify();
    }

    pub fn pan_by(&mut self, delta_x: f64, delta_y: f64) {
        self.mapper.pan_by(delta_x, delta_y);
        self.refresh_geometry();
        self.notify();
    }

    pub fn reset_view(&mut self) {
        self.mapper.reset();
        self.notify();
    }

    /// Display rectangle of the selection (floating bounds or active rect) as
    /// `(origin, size)`, for drawing its outline.
    pub fn selection_outline(&mut self) -> Option<(DisplayPoint, DisplaySize)> {
        self.refresh_geometry()?;
        let selection = self.editor.selection();
        let rect = match selection.floating() {
            Some(floating) => floating.bounds(),
            None => selection.active_rect()?,
        };
        self.mapper.image_rect_to_display(rect)
    }

    // Tools

    /// Switches tools, first settling what the old tool left pending: floating
    /// content is committed, a crop box dropped, non-blank text stamped. If
    /// stamping the text fails the switch is abandoned.
    pub fn set_tool(&mut self, tool: ToolKind) -> SessionResult<ToolSwitch> {
        let plan = self.tools.plan_switch(tool);
        if !plan.changed() {
            return Ok(plan);
        }
        if plan.leaves(ToolKind::Text) {
            self.finish_text()?;
        }
        self.cancel_gesture();
        if plan.leaves_selection() {
            self.editor.commit_paste();
        }
        if plan.leaves(ToolKind::Crop) {
            self.crop_rect = None;
        }
        let switch = self.tools.set_tool(tool);
        self.notify();
        Ok(switch)
    }

    pub fn set_tool_by_name(&mut self, name: &str) -> SessionResult<ToolSwitch> {
        let tool = name.parse::<ToolKind>().inspect_err(|_| {
            tracing::warn!(name, "rejected unknown tool name");
        })?;
        self.set_tool(tool)
    }

    // Text

    pub fn begin_text(&mut self, anchor: ImagePoint) {
        self.pending_text = Some(PendingText::new(anchor, None));
        self.notify();
    }

    /// Appends to the pending text; ignored when no text box is open.
    pub fn insert_text(&mut self, text: &str) -> bool {
        let Some(pending) = self.pending_text.as_mut() else {
            return false;
        };
        pending.content.push_str(text);
        self.notify();
        true
    }

    pub fn backspace(&mut self) -> bool {
        let Some(pending) = self.pending_text.as_mut() else {
            return false;
        };
        if pending.content.pop().is_none() {
            return false;
        }
        self.notify();
        true
    }

    /// Stamps the pending text. Blank text is dropped without an edit. On
    /// failure the text stays pending.
    pub fn commit_text(&mut self) -> SessionResult<EditOutcome> {
        let outcome = self.finish_text()?;
        self.notify();
        Ok(outcome)
    }

    fn finish_text(&mut self) -> SessionResult<EditOutcome> {
        let Some(pending) = self.pending_text.take() else {
            return Ok(EditOutcome::Unchanged);
        };
        match self.editor.add_text(
            &pending.content,
            pending.anchor,
            &self.fonts,
            &self.text.font,
            self.text.color,
        ) {
            Ok(outcome) => Ok(outcome),
            Err(err) => {
                self.pending_text = Some(pending);
                Err(err.into())
            }
        }
    }

    pub fn cancel_text(&mut self) -> bool {
        let had_text = self.pending_text.take().is_some();
        self.notify_if(had_text);
        had_text
    }

    // Discrete actions

    pub fn perform(&mut self, action: SessionAction) -> SessionResult<ActionOutcome> {
        tracing::debug!(action = action.name(), "performing session action");
        let outcome = match action {
            SessionAction::Undo => self.step_history(ImageEditor::undo),
            SessionAction::Redo => self.step_history(ImageEditor::redo),
            SessionAction::Copy => self.copy_to_clipboard()?,
            SessionAction::Cut => self.cut_to_clipboard()?,
            SessionAction::Paste => self.paste_from_clipboard()?,
            SessionAction::Delete => self.editor.delete_selection()?.into(),
            SessionAction::ApplyCrop => self.apply_crop()?,
            SessionAction::CommitSelection => self.editor.commit_paste().into(),
            SessionAction::ClearSelection => {
                let had_selection = !self.editor.selection().is_empty();
                self.editor.clear_selection();
                EditOutcome::from_changed(had_selection).into()
            }
            SessionAction::SelectTool(tool) => {
                let switch = self.set_tool(tool)?;
                return Ok(EditOutcome::from_changed(switch.changed()).into());
            }
            SessionAction::CommitText => return Ok(self.commit_text()?.into()),
            SessionAction::CancelText => {
                return Ok(EditOutcome::from_changed(self.cancel_text()).into())
            }
            SessionAction::ResizeCanvas {
                width,
                height,
                anchor,
            } => {
                self.cancel_gesture();
                let outcome = self.editor.resize_canvas(width, height, anchor)?;
                if outcome.is_changed() {
                    self.crop_rect = None;
                }
                outcome.into()
            }
            SessionAction::Load(bytes) => {
                self.editor.load(&bytes)?;
                self.reset_document();
                ActionOutcome::Changed
            }
            SessionAction::Save => ActionOutcome::Saved(self.editor.save()?),
            SessionAction::CreateBlank {
                width,
                height,
                color,
            } => {
                self.editor.create_blank(width, height, color)?;
                self.reset_document();
                self.image_path = None;
                ActionOutcome::Changed
            }
        };
        self.notify_if(outcome.is_changed());
        Ok(outcome)
    }

    fn reset_document(&mut self) {
        self.gesture = None;
        self.crop_rect = None;
        self.pending_text = None;
        self.mapper.reset();
    }

    fn step_history(&mut self, step: fn(&mut ImageEditor) -> bool) -> ActionOutcome {
        self.cancel_gesture();
        if !step(&mut self.editor) {
            return ActionOutcome::Unchanged;
        }
        self.crop_rect = None;
        self.pending_text = None;
        ActionOutcome::Changed
    }

    fn copy_to_clipboard(&mut self) -> SessionResult<ActionOutcome> {
        let payload = match self.editor.selection().floating() {
            Some(floating) => Some(ClipboardPayload::from_surface(floating.payload().clone())),
            None => match self.editor.selection().active_rect() {
                Some(rect) => self.editor.copy_selection(rect)?,
                None => None,
            },
        };
        if let Some(payload) = payload {
            self.clipboard.store(payload)?;
        }
        Ok(ActionOutcome::Unchanged)
    }

    fn cut_to_clipboard(&mut self) -> SessionResult<ActionOutcome> {
        if !self.editor.selection().is_floating() {
            let Some(rect) = self.editor.selection().active_rect() else {
                return Ok(ActionOutcome::Unchanged);
            };
            if !self.editor.cut_selection(rect)?.is_changed() {
                return Ok(ActionOutcome::Unchanged);
            }
        }
        if let Some(floating) = self.editor.selection().floating() {
            let payload = ClipboardPayload::from_surface(floating.payload().clone());
            self.clipboard.store(payload)?;
        }
        self.editor.clear_selection();
        Ok(ActionOutcome::Changed)
    }

    fn paste_from_clipboard(&mut self) -> SessionResult<ActionOutcome> {
        let Some(payload) = self.clipboard.load()? else {
            return Ok(ActionOutcome::Unchanged);
        };
        self.set_tool(ToolKind::Select)?;
        self.cancel_gesture();
        Ok(self
            .editor
            .paste_clipboard(payload, ImagePoint::new(0, 0))
            .into())
    }

    fn apply_crop(&mut self) -> SessionResult<ActionOutcome> {
        let Some(rect) = self
            .crop_rect
            .take()
            .or_else(|| self.editor.selection().active_rect())
        else {
            return Ok(ActionOutcome::Unchanged);
        };
        Ok(self.editor.apply_crop(rect)?.into())
    }

    // Image-space operations, for callers that already hold image coordinates.

    pub fn select(&mut self, rect: ImageRect) {
        self.cancel_gesture();
        self.crop_rect = None;
        self.editor.select(rect);
        self.notify();
    }

    /// Marks `rect` for [`SessionAction::ApplyCrop`]; an empty rectangle clears it.
    pub fn set_crop_rect(&mut self, rect: ImageRect) {
        let clamped = rect.clamp_to(self.editor.size());
        self.crop_rect = (!clamped.is_empty()).then_some(clamped);
        self.notify();
    }

    pub fn move_floating(&mut self, delta_x: i32, delta_y: i32) -> bool {
        let moved = self.editor.move_floating(delta_x, delta_y);
        self.notify_if(moved);
        moved
    }

    /// Brush stroke with the current brush options.
    pub fn stroke(&mut self, points: &[ImagePoint]) -> SessionResult<EditOutcome> {
        let outcome = self
            .editor
            .draw_brush_stroke(points, self.brush.size, self.brush.color)?;
        self.notify_if(outcome.is_changed());
        Ok(outcome)
    }

    /// Stamps `text` at `anchor` with the current text options, bypassing the
    /// pending text box.
    pub fn stamp_text(&mut self, text: &str, anchor: ImagePoint) -> SessionResult<EditOutcome> {
        let outcome = self.editor.add_text(
            text,
            anchor,
            &self.fonts,
            &self.text.font,
            self.text.color,
        )?;
        self.notify_if(outcome.is_changed());
        Ok(outcome)
    }

    // Files

    pub fn open_path(&mut self, path: &Path) -> SessionResult<()> {
        self.open_from(&FileStorage, path)
    }

    pub fn open_from(&mut self, storage: &impl ImageStorage, path: &Path) -> SessionResult<()> {
        let bytes = storage.read_image(path)?;
        self.perform(SessionAction::Load(bytes))?;
        self.image_path = Some(path.to_path_buf());
        tracing::info!(path = %path.display(), "opened image");
        Ok(())
    }

    pub fn save_to_path(&mut self, path: &Path) -> SessionResult<()> {
        self.save_to(&FileStorage, path)
    }

    pub fn save_to(&mut self, storage: &impl ImageStorage, path: &Path) -> SessionResult<()> {
        let bytes = self.editor.save()?;
        storage.write_image(path, &bytes)?;
        self.image_path = Some(path.to_path_buf());
        tracing::info!(path = %path.display(), "saved image");
        Ok(())
    }

    /// Saves back to the file the image came from.
    pub fn save(&mut self) -> SessionResult<PathBuf> {
        let path = self.image_path.clone().ok_or(SessionError::MissingPath)?;
        self.save_to_path(&path)?;
        Ok(path)
    }

    pub fn suggested_file_name(&self) -> String {
        storage::suggested_file_name(self.image_path.as_deref())
    }

    // Pointer input

    /// Single click. Clicking off an active selection drops it; clicking off
    /// the image commits floating content. With the text tool a click stamps
    /// pending text or opens a new text anchor; with the brush it paints a dab.
    pub fn press(&mut self, point: DisplayPoint) -> SessionResult<EditOutcome> {
        if self.refresh_geometry().is_none() {
            return Ok(EditOutcome::Unchanged);
        }
        let tool = self.tools.active();
        let pixel = self.mapper.to_image_pixel(point);
        let mut changed = false;

        if tool != ToolKind::Crop {
            if let Some(rect) = self.editor.selection().active_rect() {
                if !pixel.is_some_and(|pixel| rect.contains(pixel)) {
                    self.editor.clear_selection();
                    changed = true;
                }
            }
        }

        let Some(pixel) = pixel else {
            changed |= self.editor.commit_paste().is_changed();
            self.notify_if(changed);
            return Ok(EditOutcome::from_changed(changed));
        };

        match tool {
            ToolKind::Text => {
                if self.pending_text.is_some() {
                    self.finish_text()?;
                } else {
                    self.pending_text = Some(PendingText::new(pixel, None));
                }
                changed = true;
            }
            ToolKind::Brush => {
                changed |= self
                    .editor
                    .draw_brush_stroke(&[pixel], self.brush.size, self.brush.color)?
                    .is_changed();
            }
            ToolKind::Select | ToolKind::Crop | ToolKind::Move => {}
        }
        self.notify_if(changed);
        Ok(EditOutcome::from_changed(changed))
    }

    /// Starts a drag. Returns `false` when nothing is drawn yet (no viewport).
    pub fn begin_drag(&mut self, point: DisplayPoint) -> bool {
        self.cancel_gesture();
        let Some(geometry) = self.refresh_geometry() else {
            return false;
        };

        if let Some(handle) = self.mapper.hit_test_resize_handle(point) {
            let start_size = self.editor.size();
            self.gesture = Some(Gesture::ResizeCanvas {
                handle,
                start: point,
                start_size,
                scale: geometry.scale,
                preview: start_size,
            });
        } else {
            let gesture = match self.tools.active() {
                ToolKind::Text => Gesture::Rectangle {
                    purpose: RectPurpose::TextBox,
                    start: point,
                    current: point,
                },
                ToolKind::Crop => Gesture::Rectangle {
                    purpose: RectPurpose::Crop,
                    start: point,
                    current: point,
                },
                ToolKind::Brush => Gesture::Brush {
                    points: self.mapper.to_image_pixel(point).into_iter().collect(),
                },
                ToolKind::Select | ToolKind::Move => self.selection_gesture(point),
            };
            self.gesture = Some(gesture);
        }
        if let Some(gesture) = &self.gesture {
            tracing::debug!(gesture = gesture.name(), "drag started");
        }
        self.notify();
        true
    }

    fn selection_gesture(&self, point: DisplayPoint) -> Gesture {
        let fallback = Gesture::Rectangle {
            purpose: RectPurpose::Select,
            start: point,
            current: point,
        };
        let Some(position) = self.mapper.to_image_space(point) else {
            return fallback;
        };
        let pixel = position.to_pixel();
        let selection = self.editor.selection();
        if let Some(floating) = selection.floating() {
            if floating.contains(pixel) {
                let offset = floating.offset();
                return Gesture::MoveFloating {
                    grab: ImagePosition::new(
                        position.x - f64::from(offset.x),
                        position.y - f64::from(offset.y),
                    ),
                    start_offset: offset,
                };
            }
        } else if let Some(rect) = selection.active_rect() {
            if rect.contains(pixel) {
                return Gesture::MoveSelection {
                    rect,
                    start: position,
                    current: position,
                };
            }
        }
        fallback
    }

    pub fn update_drag(&mut self, point: DisplayPoint) {
        if self.track_drag(point) {
            self.notify();
        }
    }

    fn track_drag(&mut self, point: DisplayPoint) -> bool {
        let Some(gesture) = self.gesture.as_mut() else {
            return false;
        };
        match gesture {
            Gesture::ResizeCanvas {
                handle,
                start,
                start_size,
                scale,
                preview,
            } => {
                *preview =
                    handle.resized_canvas_size(*start_size, point.x - start.x, point.y - start.y, *scale);
            }
            Gesture::Rectangle { current, .. } => *current = point,
            Gesture::MoveFloating { grab, .. } => {
                if let Some(position) = self.mapper.to_image_space(point) {
                    let offset = ImagePosition::new(
                        (position.x - grab.x).round(),
                        (position.y - grab.y).round(),
                    )
                    .to_pixel();
                    self.editor.move_floating_to(offset);
                }
            }
            Gesture::MoveSelection { current, .. } => {
                if let Some(position) = self.mapper.to_image_space(point) {
                    *current = position;
                }
            }
            Gesture::Brush { points } => {
                // A stroke that started on the image follows the pointer along the edge.
                let pixel = if points.is_empty() {
                    self.mapper.to_image_pixel(point)
                } else {
                    self.mapper.to_clamped_image_pixel(point)
                };
                if let Some(pixel) = pixel {
                    if points.last() != Some(&pixel) {
                        points.push(pixel);
                    }
                }
            }
        }
        true
    }

    /// Finishes the drag at `point` and applies it to the editor.
    pub fn end_drag(&mut self, point: DisplayPoint) -> SessionResult<EditOutcome> {
        self.track_drag(point);
        let Some(gesture) = self.gesture.take() else {
            return Ok(EditOutcome::Unchanged);
        };
        tracing::debug!(gesture = gesture.name(), "drag finished");
        let result = self.apply_gesture(gesture);
        self.notify();
        result
    }

    fn apply_gesture(&mut self, gesture: Gesture) -> SessionResult<EditOutcome> {
        let outcome = match gesture {
            Gesture::ResizeCanvas {
                handle, preview, ..
            } => {
                let outcome =
                    self.editor
                        .resize_canvas(preview.width, preview.height, handle.anchor())?;
                if outcome.is_changed() {
                    self.crop_rect = None;
                }
                outcome
            }
            Gesture::Rectangle {
                purpose,
                start,
                current,
            } => {
                let rect = self
                    .mapper
                    .display_rect_to_image_rect(start, current)
                    .unwrap_or_default();
                match purpose {
                    RectPurpose::Select => {
                        self.crop_rect = None;
                        self.editor.select(rect);
                    }
                    RectPurpose::Crop => {
                        self.crop_rect = (!rect.is_empty()).then_some(rect);
                    }
                    RectPurpose::TextBox => {
                        self.finish_text()?;
                        let area = (!rect.is_empty()).then_some(rect);
                        self.pending_text = Some(PendingText::new(rect.origin(), area));
                    }
                }
                EditOutcome::Changed
            }
            Gesture::MoveFloating { .. } => EditOutcome::Changed,
            Gesture::MoveSelection {
                rect,
                start,
                current,
            } => {
                let (delta_x, delta_y) = pixel_delta(start, current);
                if (delta_x, delta_y) == (0, 0) {
                    EditOutcome::Unchanged
                } else {
                    let outcome = self.editor.cut_selection(rect)?;
                    self.editor.move_floating(delta_x, delta_y);
                    outcome
                }
            }
            Gesture::Brush { points } => {
                self.editor
                    .draw_brush_stroke(&points, self.brush.size, self.brush.color)?
            }
        };
        Ok(outcome)
    }

    /// Aborts the drag. The surface and history are exactly as before it began.
    pub fn cancel_drag(&mut self) {
        if self.cancel_gesture() {
            self.notify();
        }
    }

    fn cancel_gesture(&mut self) -> bool {
        let Some(gesture) = self.gesture.take() else {
            return false;
        };
        if let Gesture::MoveFloating { start_offset, .. } = gesture {
            self.editor.move_floating_to(start_offset);
        }
        tracing::debug!(gesture = gesture.name(), "drag cancelled");
        true
    }

    /// Overlay for the drag in progress, in image space.
    pub fn preview(&self) -> Option<GesturePreview> {
        match self.gesture.as_ref()? {
            Gesture::ResizeCanvas {
                handle, preview, ..
            } => Some(GesturePreview::CanvasSize {
                handle: *handle,
                size: *preview,
            }),
            Gesture::Rectangle {
                purpose,
                start,
                current,
            } => {
                let rect = self.mapper.display_rect_to_image_rect(*start, *current)?;
                Some(match purpose {
                    RectPurpose::Select => GesturePreview::SelectionRect(rect),
                    RectPurpose::Crop => GesturePreview::CropRect(rect),
                    RectPurpose::TextBox => GesturePreview::TextBox(rect),
                })
            }
            Gesture::MoveFloating { .. } => None,
            Gesture::MoveSelection {
                rect,
                start,
                current,
            } => {
                let (delta_x, delta_y) = pixel_delta(*start, *current);
                Some(GesturePreview::MovedSelection(rect.translated(delta_x, delta_y)))
            }
            Gesture::Brush { points } => Some(GesturePreview::Stroke {
                points: points.clone(),
                size: self.brush.size,
                color: self.brush.color,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;
    use crate::geometry::ImageSize;
    use crate::surface::PixelSurface;

    /// 100×100 white image shown 1:1 in a 100×100 viewport.
    fn session() -> EditorSession {
        let surface = PixelSurface::filled(100, 100, Color::WHITE).expect("surface");
        let mut session = EditorSession::new(
            ImageEditor::new(surface),
            InMemoryClipboard::new(),
            FontBook::new(),
        );
        session.set_viewport_size(DisplaySize::new(100.0, 100.0));
        session
    }

    fn drag(session: &mut EditorSession, from: (f64, f64), to: (f64, f64)) -> EditOutcome {
        assert!(session.begin_drag(DisplayPoint::new(from.0, from.1)));
        session.update_drag(DisplayPoint::new(
            (from.0 + to.0) / 2.0,
            (from.1 + to.1) / 2.0,
        ));
        session
            .end_drag(DisplayPoint::new(to.0, to.1))
            .expect("drag should apply")
    }

    fn redraw_counter(session: &mut EditorSession) -> Arc<AtomicUsize> {
        let counter = Arc::new(AtomicUsize::new(0));
        let handle = Arc::clone(&counter);
        session.set_redraw_handler(move || {
            handle.fetch_add(1, Ordering::SeqCst);
        });
        counter
    }

    #[test]
    fn select_drag_creates_normalized_selection() {
        let mut session = session();
        drag(&mut session, (60.0, 50.0), (20.0, 10.0));
        assert_eq!(
            session.editor().selection().active_rect(),
            Some(ImageRect::new(20, 10, 40, 40))
        );
        assert!(!session.editor().can_undo());
    }

    #[test]
    fn dragging_active_selection_cuts_on_release_only() {
        let mut session = session();
        session.editor.draw_brush_stroke(&[ImagePoint::new(30, 30)], 4, Color::BLACK).expect("dab");
        drag(&mut session, (20.0, 20.0), (40.0, 40.0));
        let before = session.editor().surface().clone();

        assert!(session.begin_drag(DisplayPoint::new(30.0, 30.0)));
        session.update_drag(DisplayPoint::new(60.0, 45.0));
        assert_eq!(session.editor().surface(), &before);
        assert_eq!(
            session.preview(),
            Some(GesturePreview::MovedSelection(ImageRect::new(50, 35, 20, 20)))
        );

        session.end_drag(DisplayPoint::new(60.0, 45.0)).expect("move");
        let floating = session.editor().selection().floating().expect("floating");
        assert_eq!(floating.offset(), ImagePoint::new(50, 35));
        assert_eq!(session.editor().surface().pixel(30, 30), Some([0, 0, 0, 0]));
    }

    #[test]
    fn cancelled_drag_leaves_state_untouched() {
        let mut session = session();
        session.set_tool(ToolKind::Brush).expect("tool");
        assert!(session.begin_drag(DisplayPoint::new(10.0, 10.0)));
        session.update_drag(DisplayPoint::new(50.0, 50.0));
        session.cancel_drag();
        assert!(!session.is_dragging());
        assert!(!session.editor().can_undo());
        assert_eq!(session.editor().surface().pixel(30, 30), Some([255, 255, 255, 255]));
    }

    #[test]
    fn cancelling_floating_move_restores_offset() {
        let mut session = session();
        drag(&mut session, (10.0, 10.0), (20.0, 20.0));
        session.perform(SessionAction::Copy).expect("copy");
        session.perform(SessionAction::Paste).expect("paste");

        assert!(session.begin_drag(DisplayPoint::new(9.0, 9.0)));
        session.update_drag(DisplayPoint::new(49.0, 29.0));
        assert_eq!(
            session.editor().selection().floating().expect("floating").offset(),
            ImagePoint::new(40, 20)
        );
        session.cancel_drag();
        assert_eq!(
            session.editor().selection().floating().expect("floating").offset(),
            ImagePoint::new(0, 0)
        );
    }

    #[test]
    fn brush_drag_paints_one_history_entry() {
        let mut session = session();
        session.set_tool(ToolKind::Brush).expect("tool");
        session.brush_options_mut().set_size(3);
        let outcome = drag(&mut session, (10.0, 50.0), (90.0, 50.0));
        assert_eq!(outcome, EditOutcome::Changed);
        assert_eq!(session.editor().history().undo_len(), 1);
        assert_eq!(session.editor().surface().pixel(50, 50), Some([0, 0, 0, 255]));
    }

    #[test]
    fn crop_drag_then_apply_crops_to_box() {
        let mut session = session();
        session.set_tool(ToolKind::Crop).expect("tool");
        drag(&mut session, (10.0, 10.0), (60.0, 40.0));
        assert_eq!(session.crop_rect(), Some(ImageRect::new(10, 10, 50, 30)));
        session.perform(SessionAction::ApplyCrop).expect("crop");
        assert_eq!(session.editor().size(), ImageSize::new(50, 30));
        assert_eq!(session.crop_rect(), None);
    }

    #[test]
    fn switching_away_from_crop_drops_crop_box() {
        let mut session = session();
        session.set_tool(ToolKind::Crop).expect("tool");
        drag(&mut session, (10.0, 10.0), (60.0, 40.0));
        session.set_tool(ToolKind::Brush).expect("tool");
        assert_eq!(session.crop_rect(), None);
        assert_eq!(
            session.perform(SessionAction::ApplyCrop).expect("crop"),
            ActionOutcome::Unchanged
        );
    }

    #[test]
    fn resize_handle_drag_changes_canvas_size() {
        let mut session = session();
        session.set_viewport_size(DisplaySize::new(200.0, 200.0));
        // 100x100 image shown at scale 2 filling the viewport.
        assert!(session.begin_drag(DisplayPoint::new(199.0, 100.0)));
        session.update_drag(DisplayPoint::new(219.0, 100.0));
        assert_eq!(
            session.preview(),
            Some(GesturePreview::CanvasSize {
                handle: crate::viewport::ResizeHandle::Right,
                size: ImageSize::new(110, 100),
            })
        );
        session.end_drag(DisplayPoint::new(219.0, 100.0)).expect("resize");
        assert_eq!(session.editor().size(), ImageSize::new(110, 100));
        assert_eq!(session.editor().surface().pixel(105, 50), Some([0, 0, 0, 0]));
    }

    #[test]
    fn cut_action_fills_clipboard_and_leaves_hole() {
        let mut session = session();
        drag(&mut session, (10.0, 10.0), (30.0, 30.0));
        session.perform(SessionAction::Cut).expect("cut");
        assert!(session.editor().selection().is_empty());
        assert_eq!(session.editor().surface().pixel(15, 15), Some([0, 0, 0, 0]));
        let payload = session.clipboard().load().expect("load").expect("payload");
        assert_eq!((payload.width(), payload.height()), (20, 20));
    }

    #[test]
    fn paste_switches_to_select_and_floats_at_origin() {
        let mut session = session();
        drag(&mut session, (10.0, 10.0), (30.0, 30.0));
        session.perform(SessionAction::Copy).expect("copy");
        session.set_tool(ToolKind::Brush).expect("tool");
        session.perform(SessionAction::Paste).expect("paste");
        assert_eq!(session.tool(), ToolKind::Select);
        let floating = session.editor().selection().floating().expect("floating");
        assert_eq!(floating.offset(), ImagePoint::new(0, 0));
    }

    #[test]
    fn paste_with_empty_clipboard_is_unchanged() {
        let mut session = session();
        assert_eq!(
            session.perform(SessionAction::Paste).expect("paste"),
            ActionOutcome::Unchanged
        );
        assert!(!session.editor().can_undo());
    }

    #[test]
    fn switching_to_brush_commits_floating_selection() {
        let mut session = session();
        let patch = PixelSurface::filled(5, 5, Color::RED).expect("patch");
        session.clipboard.store(patch.into()).expect("store");
        session.perform(SessionAction::Paste).expect("paste");
        session.set_tool(ToolKind::Brush).expect("tool");
        assert!(session.editor().selection().is_empty());
        assert_eq!(session.editor().surface().pixel(2, 2), Some([255, 0, 0, 255]));
    }

    #[test]
    fn unknown_tool_name_keeps_current_tool() {
        let mut session = session();
        session.set_tool(ToolKind::Crop).expect("tool");
        let err = session.set_tool_by_name("bogus").unwrap_err();
        assert!(matches!(err, SessionError::Tool(ToolError::InvalidTool { .. })));
        assert_eq!(session.tool(), ToolKind::Crop);
    }

    #[test]
    fn press_outside_image_commits_floating_content() {
        let mut session = session();
        session.set_viewport_size(DisplaySize::new(200.0, 100.0));
        let patch = PixelSurface::filled(2, 2, Color::BLACK).expect("patch");
        session.clipboard.store(patch.into()).expect("store");
        session.perform(SessionAction::Paste).expect("paste");
        // Image occupies x in [50, 150); x = 10 is off the image.
        let outcome = session.press(DisplayPoint::new(10.0, 10.0)).expect("press");
        assert_eq!(outcome, EditOutcome::Changed);
        assert!(session.editor().selection().is_empty());
        assert_eq!(session.editor().surface().pixel(0, 0), Some([0, 0, 0, 255]));
    }

    #[test]
    fn press_outside_active_selection_drops_it() {
        let mut session = session();
        drag(&mut session, (10.0, 10.0), (30.0, 30.0));
        session.press(DisplayPoint::new(80.0, 80.0)).expect("press");
        assert!(session.editor().selection().is_empty());
    }

    #[test]
    fn brush_press_paints_a_dab() {
        let mut session = session();
        session.set_tool(ToolKind::Brush).expect("tool");
        session.brush_options_mut().set_size(6);
        session.press(DisplayPoint::new(40.5, 40.5)).expect("press");
        assert_eq!(session.editor().surface().pixel(40, 40), Some([0, 0, 0, 255]));
        assert!(session.editor().can_undo());
    }

    #[test]
    fn blank_pending_text_is_discarded_on_tool_switch() {
        let mut session = session();
        session.set_tool(ToolKind::Text).expect("tool");
        drag(&mut session, (10.0, 10.0), (60.0, 30.0));
        let pending = session.pending_text().expect("pending text");
        assert_eq!(pending.anchor(), ImagePoint::new(10, 10));
        session.insert_text("   ");
        session.set_tool(ToolKind::Select).expect("tool");
        assert!(session.pending_text().is_none());
        assert!(!session.editor().can_undo());
    }

    #[test]
    fn failed_text_commit_keeps_tool_and_text() {
        let mut session = session();
        session.set_tool(ToolKind::Text).expect("tool");
        session.begin_text(ImagePoint::new(5, 5));
        session.insert_text("hello");
        let err = session.set_tool(ToolKind::Select).unwrap_err();
        assert!(matches!(err, SessionError::Editor(_)));
        assert_eq!(session.tool(), ToolKind::Text);
        assert_eq!(session.pending_text().map(PendingText::content), Some("hello"));
    }

    #[test]
    fn undo_redo_actions_walk_history() {
        let mut session = session();
        session.set_tool(ToolKind::Brush).expect("tool");
        session.press(DisplayPoint::new(10.0, 10.0)).expect("dab");
        let painted = session.editor().surface().clone();
        assert_eq!(session.perform(SessionAction::Undo).expect("undo"), ActionOutcome::Changed);
        assert_eq!(session.perform(SessionAction::Undo).expect("undo"), ActionOutcome::Unchanged);
        session.perform(SessionAction::Redo).expect("redo");
        assert_eq!(session.editor().surface(), &painted);
    }

    #[test]
    fn undo_drops_pending_text() {
        let mut session = session();
        session.set_tool(ToolKind::Brush).expect("tool");
        session.press(DisplayPoint::new(10.0, 10.0)).expect("dab");
        session.set_tool(ToolKind::Text).expect("tool");
        session.begin_text(ImagePoint::new(20, 20));
        session.insert_text("draft");

        session.perform(SessionAction::Undo).expect("undo");
        assert!(session.pending_text().is_none());
        assert_eq!(session.perform(SessionAction::CommitText).expect("commit"), ActionOutcome::Unchanged);
    }

    #[test]
    fn brush_drag_leaving_image_follows_the_edge() {
        let mut session = session();
        session.set_viewport_size(DisplaySize::new(200.0, 100.0));
        session.set_tool(ToolKind::Brush).expect("tool");
        session.brush_options_mut().set_size(3);
        // Image occupies x in [50, 150).
        assert!(session.begin_drag(DisplayPoint::new(100.0, 50.0)));
        session.update_drag(DisplayPoint::new(190.0, 50.0));
        assert_eq!(
            session.preview(),
            Some(GesturePreview::Stroke {
                points: vec![ImagePoint::new(50, 50), ImagePoint::new(99, 50)],
                size: 3,
                color: Color::BLACK,
            })
        );
        session.end_drag(DisplayPoint::new(190.0, 50.0)).expect("stroke");
        assert_eq!(session.editor().surface().pixel(98, 50), Some([0, 0, 0, 255]));
    }

    #[test]
    fn brush_drag_starting_off_image_ignores_outside_points() {
        let mut session = session();
        session.set_viewport_size(DisplaySize::new(200.0, 100.0));
        session.set_tool(ToolKind::Brush).expect("tool");
        assert!(session.begin_drag(DisplayPoint::new(20.0, 50.0)));
        session.update_drag(DisplayPoint::new(30.0, 50.0));
        let outcome = session.end_drag(DisplayPoint::new(40.0, 50.0)).expect("stroke");
        assert_eq!(outcome, EditOutcome::Unchanged);
        assert!(!session.editor().can_undo());
    }

    #[test]
    fn selection_outline_follows_zoom_and_pan() {
        let mut session = session();
        assert_eq!(session.selection_outline(), None);
        drag(&mut session, (10.0, 10.0), (30.0, 40.0));
        assert_eq!(
            session.selection_outline(),
            Some((DisplayPoint::new(10.0, 10.0), DisplaySize::new(20.0, 30.0)))
        );
        session.pan_by(5.0, -2.0);
        assert_eq!(
            session.selection_outline(),
            Some((DisplayPoint::new(15.0, 8.0), DisplaySize::new(20.0, 30.0)))
        );
    }

    #[test]
    fn redraw_fires_once_per_visible_change() {
        let mut session = session();
        let redraws = redraw_counter(&mut session);
        session.perform(SessionAction::Undo).expect("undo");
        assert_eq!(redraws.load(Ordering::SeqCst), 0);

        session.set_tool(ToolKind::Brush).expect("tool");
        assert_eq!(redraws.load(Ordering::SeqCst), 1);
        session.press(DisplayPoint::new(10.0, 10.0)).expect("dab");
        assert_eq!(redraws.load(Ordering::SeqCst), 2);
        session.end_drag(DisplayPoint::new(0.0, 0.0)).expect("no drag");
        assert_eq!(redraws.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn save_without_path_asks_for_one() {
        let mut session = session();
        assert!(matches!(session.save(), Err(SessionError::MissingPath)));
        assert_eq!(session.suggested_file_name(), "unknown.png");
    }

    #[test]
    fn open_and_save_round_trip_through_files() {
        let dir = std::env::temp_dir().join(format!("nanoedit-session-{}", std::process::id()));
        let source = dir.join("cat.png");
        let bytes = PixelSurface::filled(7, 3, Color::RED)
            .expect("surface")
            .encode_png()
            .expect("encode");
        crate::storage::write_atomic(&source, &bytes).expect("write");

        let mut session = session();
        session.open_path(&source).expect("open");
        assert_eq!(session.editor().size(), ImageSize::new(7, 3));
        assert_eq!(session.suggested_file_name(), "cat.png");

        let target = dir.join("copy.png");
        session.save_to_path(&target).expect("save");
        assert_eq!(session.image_path(), Some(target.as_path()));
        let saved = PixelSurface::decode_png(&std::fs::read(&target).expect("read")).expect("decode");
        assert_eq!(saved.size(), ImageSize::new(7, 3));
        let _ = std::fs::remove_dir_all(&dir);
    }
}
