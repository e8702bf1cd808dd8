//! JSON edit scripts for headless batch editing.
//!
//! A script is a list of steps applied in order to an [`EditorSession`]:
//!
//! ```json
//! { "steps": [
//!     { "op": "select", "x": 10, "y": 10, "width": 40, "height": 20 },
//!     { "op": "cut" },
//!     { "op": "paste" },
//!     { "op": "move", "dx": 60, "dy": 0 },
//!     { "op": "brush", "points": [[0, 0], [30, 30]], "size": 4, "color": { "r": 255, "g": 0, "b": 0 } },
//!     { "op": "resize", "width": 200, "height": 120, "anchor": "center" }
//! ] }
//! ```

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::clipboard::ClipboardSlot;
use crate::geometry::{Anchor, Color, ImagePoint, ImageRect};
use crate::session::{ActionOutcome, EditorSession, SessionAction, SessionError};

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("failed to read edit script {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid edit script: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("step {index} ({op}) failed: {source}")]
    Step {
        index: usize,
        op: &'static str,
        #[source]
        source: SessionError,
    },
}

pub type ScriptResult<T> = std::result::Result<T, ScriptError>;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "op", rename_all = "kebab-case")]
pub enum ScriptStep {
    Select {
        x: i32,
        y: i32,
        width: u32,
        height: u32,
    },
    ClearSelection,
    Copy,
    Cut,
    Paste,
    Delete,
    Commit,
    Move {
        dx: i32,
        dy: i32,
    },
    Crop {
        x: i32,
        y: i32,
        width: u32,
        height: u32,
    },
    Brush {
        points: Vec<[i32; 2]>,
        #[serde(default)]
        size: Option<u32>,
        #[serde(default)]
        color: Option<Color>,
    },
    Text {
        text: String,
        x: i32,
        y: i32,
        #[serde(default)]
        size: Option<u32>,
        #[serde(default)]
        family: Option<String>,
        #[serde(default)]
        color: Option<Color>,
    },
    Resize {
        width: u32,
        height: u32,
        #[serde(default)]
        anchor: Anchor,
    },
    Blank {
        width: u32,
        height: u32,
        #[serde(default = "default_blank_color")]
        color: Color,
    },
    Tool {
        name: String,
    },
    Undo,
    Redo,
}

fn default_blank_color() -> Color {
    Color::WHITE
}

impl ScriptStep {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Select { .. } => "select",
            Self::ClearSelection => "clear-selection",
            Self::Copy => "copy",
            Self::Cut => "cut",
            Self::Paste => "paste",
            Self::Delete => "delete",
            Self::Commit => "commit",
            Self::Move { .. } => "move",
            Self::Crop { .. } => "crop",
            Self::Brush { .. } => "brush",
            Self::Text { .. } => "text",
            Self::Resize { .. } => "resize",
            Self::Blank { .. } => "blank",
            Self::Tool { .. } => "tool",
            Self::Undo => "undo",
            Self::Redo => "redo",
        }
    }

    fn apply<C: ClipboardSlot>(&self, session: &mut EditorSession<C>) -> Result<bool, SessionError> {
        let changed = match self {
            Self::Select {
                x,
                y,
                width,
                height,
            } => {
                session.select(ImageRect::new(*x, *y, *width, *height));
                true
            }
            Self::ClearSelection => perform(session, SessionAction::ClearSelection)?,
            Self::Copy => perform(session, SessionAction::Copy)?,
            Self::Cut => perform(session, SessionAction::Cut)?,
            Self::Paste => perform(session, SessionAction::Paste)?,
            Self::Delete => perform(session, SessionAction::Delete)?,
            Self::Commit => perform(session, SessionAction::CommitSelection)?,
            Self::Move { dx, dy } => session.move_floating(*dx, *dy),
            Self::Crop {
                x,
                y,
                width,
                height,
            } => {
                session.set_crop_rect(ImageRect::new(*x, *y, *width, *height));
                perform(session, SessionAction::ApplyCrop)?
            }
            Self::Brush {
                points,
                size,
                color,
            } => {
                let brush = session.brush_options_mut();
                if let Some(size) = size {
                    brush.set_size(*size);
                }
                if let Some(color) = color {
                    brush.set_color(*color);
                }
                let points: Vec<ImagePoint> = points
                    .iter()
                    .map(|[x, y]| ImagePoint::new(*x, *y))
                    .collect();
                session.stroke(&points)?.is_changed()
            }
            Self::Text {
                text,
                x,
                y,
                size,
                family,
                color,
            } => {
                let options = session.text_options_mut();
                if let Some(size) = size {
                    options.set_size(*size);
                }
                if let Some(family) = family {
                    options.set_family(family.clone());
                }
                if let Some(color) = color {
                    options.set_color(*color);
                }
                session.stamp_text(text, ImagePoint::new(*x, *y))?.is_changed()
            }
            Self::Resize {
                width,
                height,
                anchor,
            } => perform(
                session,
                SessionAction::ResizeCanvas {
                    width: *width,
                    height: *height,
                    anchor: *anchor,
                },
            )?,
            Self::Blank {
                width,
                height,
                color,
            } => perform(
                session,
                SessionAction::CreateBlank {
                    width: *width,
                    height: *height,
                    color: *color,
                },
            )?,
            Self::Tool { name } => session.set_tool_by_name(name)?.changed(),
            Self::Undo => perform(session, SessionAction::Undo)?,
            Self::Redo => perform(session, SessionAction::Redo)?,
        };
        Ok(changed)
    }
}

fn perform<C: ClipboardSlot>(
    session: &mut EditorSession<C>,
    action: SessionAction,
) -> Result<bool, SessionError> {
    Ok(matches!(session.perform(action)?, ActionOutcome::Changed))
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EditScript {
    pub steps: Vec<ScriptStep>,
}

/// Tally of an applied script.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScriptReport {
    pub changed: usize,
    pub unchanged: usize,
}

impl EditScript {
    pub fn from_json(json: &str) -> ScriptResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: &Path) -> ScriptResult<Self> {
        let json = std::fs::read_to_string(path).map_err(|source| ScriptError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Applies every step in order, stopping at the first failure. Steps
    /// already applied stay applied.
    pub fn apply<C: ClipboardSlot>(
        &self,
        session: &mut EditorSession<C>,
    ) -> ScriptResult<ScriptReport> {
        let mut report = ScriptReport::default();
        for (index, step) in self.steps.iter().enumerate() {
            let changed = step.apply(session).map_err(|source| ScriptError::Step {
                index,
                op: step.name(),
                source,
            })?;
            tracing::debug!(index, op = step.name(), changed, "script step applied");
            if changed {
                report.changed += 1;
            } else {
                report.unchanged += 1;
            }
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_tagged_steps_with_defaults() {
        let script = EditScript::from_json(
            r#"{ "steps": [
                { "op": "select", "x": 1, "y": 2, "width": 3, "height": 4 },
                { "op": "resize", "width": 10, "height": 20 },
                { "op": "resize", "width": 10, "height": 20, "anchor": "bottom-right" },
                { "op": "blank", "width": 5, "height": 5 },
                { "op": "clear-selection" }
            ] }"#,
        )
        .expect("script should parse");

        assert_eq!(
            script.steps[0],
            ScriptStep::Select {
                x: 1,
                y: 2,
                width: 3,
                height: 4
            }
        );
        assert_eq!(
            script.steps[1],
            ScriptStep::Resize {
                width: 10,
                height: 20,
                anchor: Anchor::TopLeft
            }
        );
        assert!(matches!(
            script.steps[2],
            ScriptStep::Resize {
                anchor: Anchor::BottomRight,
                ..
            }
        ));
        assert!(matches!(
            script.steps[3],
            ScriptStep::Blank {
                color: Color::WHITE,
                ..
            }
        ));
        assert_eq!(script.steps[4], ScriptStep::ClearSelection);
    }

    #[test]
    fn unknown_operation_is_a_parse_error() {
        let err = EditScript::from_json(r#"{ "steps": [ { "op": "blur" } ] }"#).unwrap_err();
        assert!(matches!(err, ScriptError::Parse(_)));
    }

    #[test]
    fn bad_anchor_name_is_a_parse_error() {
        let err = EditScript::from_json(
            r#"{ "steps": [ { "op": "resize", "width": 1, "height": 1, "anchor": "middle" } ] }"#,
        )
        .unwrap_err();
        assert!(matches!(err, ScriptError::Parse(_)));
    }
}
