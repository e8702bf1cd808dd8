mod brush;
mod text;

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

pub use crate::geometry::Color;
pub use brush::{BrushOptions, BRUSH_SIZE_MAX, BRUSH_SIZE_MIN};
pub use text::{FontSpec, TextOptions, DEFAULT_FONT_FAMILY};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolOptionVisibility {
    pub has_color: bool,
    pub has_brush_size: bool,
    pub has_text_size: bool,
    pub has_font_family: bool,
}

impl ToolOptionVisibility {
    pub const fn has_any(&self) -> bool {
        let Self {
            has_color,
            has_brush_size,
            has_text_size,
            has_font_family,
        } = *self;
        has_color || has_brush_size || has_text_size || has_font_family
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolKind {
    Select,
    Crop,
    Text,
    Brush,
    /// Kept for shells that bind a separate "move" button; behaves as [`ToolKind::Select`].
    Move,
}

impl ToolKind {
    pub const ALL: [ToolKind; 5] = [
        Self::Select,
        Self::Crop,
        Self::Text,
        Self::Brush,
        Self::Move,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Select => "select",
            Self::Crop => "crop",
            Self::Text => "text",
            Self::Brush => "brush",
            Self::Move => "move",
        }
    }

    /// True for tools whose drags select, move and float regions.
    pub const fn uses_selection(self) -> bool {
        matches!(self, Self::Select | Self::Move)
    }

    /// True for tools whose drags outline a rectangle (selection or crop box).
    pub const fn draws_rectangle(self) -> bool {
        matches!(self, Self::Select | Self::Move | Self::Crop)
    }

    pub const fn option_visibility(self) -> ToolOptionVisibility {
        match self {
            Self::Brush => ToolOptionVisibility {
                has_color: true,
                has_brush_size: true,
                has_text_size: false,
                has_font_family: false,
            },
            Self::Text => ToolOptionVisibility {
                has_color: true,
                has_brush_size: false,
                has_text_size: true,
                has_font_family: true,
            },
            Self::Select | Self::Crop | Self::Move => ToolOptionVisibility {
                has_color: false,
                has_brush_size: false,
                has_text_size: false,
                has_font_family: false,
            },
        }
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ToolKind {
    type Err = ToolError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|tool| tool.name() == name)
            .ok_or_else(|| ToolError::InvalidTool {
                name: name.to_string(),
            })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ToolError {
    #[error("unknown tool '{name}'")]
    InvalidTool { name: String },
}

/// Result of a tool change, used by the session to settle pending state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolSwitch {
    pub previous: ToolKind,
    pub current: ToolKind,
}

impl ToolSwitch {
    pub const fn changed(&self) -> bool {
        self.previous as u8 != self.current as u8
    }

    /// Leaving select semantics, so a floating selection must be committed first.
    pub const fn leaves_selection(&self) -> bool {
        self.previous.uses_selection() && !self.current.uses_selection()
    }

    pub const fn leaves(&self, tool: ToolKind) -> bool {
        self.changed() && self.previous as u8 == tool as u8
    }
}

/// Exactly one active tool.
#[derive(Debug, Clone)]
pub struct ToolState {
    active: ToolKind,
}

impl Default for ToolState {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolState {
    pub const fn new() -> Self {
        Self {
            active: ToolKind::Select,
        }
    }

    pub const fn active(&self) -> ToolKind {
        self.active
    }

    /// Previews a switch without applying it.
    pub const fn plan_switch(&self, tool: ToolKind) -> ToolSwitch {
        ToolSwitch {
            previous: self.active,
            current: tool,
        }
    }

    pub fn set_tool(&mut self, tool: ToolKind) -> ToolSwitch {
        let switch = self.plan_switch(tool);
        self.active = tool;
        if switch.changed() {
            tracing::debug!(from = %switch.previous, to = %switch.current, "tool switched");
        }
        switch
    }

    /// Validates `name` first; on failure the active tool is left as it was.
    pub fn set_tool_by_name(&mut self, name: &str) -> Result<ToolSwitch, ToolError> {
        let tool = name.parse::<ToolKind>().inspect_err(|_| {
            tracing::warn!(name, "rejected unknown tool name");
        })?;
        Ok(self.set_tool(tool))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn brush_shows_color_and_size() {
        let vis = ToolKind::Brush.option_visibility();
        assert!(vis.has_color);
        assert!(vis.has_brush_size);
        assert!(!vis.has_text_size);
        assert!(!vis.has_font_family);
        assert!(vis.has_any());
    }

    #[test]
    fn text_shows_color_size_and_font() {
        let vis = ToolKind::Text.option_visibility();
        assert!(vis.has_color);
        assert!(!vis.has_brush_size);
        assert!(vis.has_text_size);
        assert!(vis.has_font_family);
    }

    #[test]
    fn select_crop_move_have_no_options() {
        for tool in [ToolKind::Select, ToolKind::Crop, ToolKind::Move] {
            assert!(!tool.option_visibility().has_any(), "{tool:?} should have no options");
        }
    }

    #[test]
    fn every_tool_name_parses_back() {
        for tool in ToolKind::ALL {
            assert_eq!(tool.name().parse::<ToolKind>(), Ok(tool));
        }
    }

    #[test]
    fn unknown_tool_name_is_rejected_and_tool_unchanged() {
        let mut state = ToolState::new();
        state.set_tool(ToolKind::Brush);
        let err = state.set_tool_by_name("bogus").unwrap_err();
        assert_eq!(
            err,
            ToolError::InvalidTool {
                name: "bogus".to_string()
            }
        );
        assert_eq!(state.active(), ToolKind::Brush);
    }

    #[test]
    fn tool_names_are_case_sensitive() {
        assert!("Select".parse::<ToolKind>().is_err());
    }

    #[test]
    fn move_aliases_select_semantics() {
        assert!(ToolKind::Move.uses_selection());
        assert!(ToolKind::Move.draws_rectangle());
        let switch = ToolState::new().plan_switch(ToolKind::Move);
        assert!(switch.changed());
        assert!(!switch.leaves_selection());
    }

    #[test]
    fn switching_from_select_to_brush_leaves_selection() {
        let mut state = ToolState::new();
        let switch = state.set_tool(ToolKind::Brush);
        assert!(switch.leaves_selection());
        assert!(switch.leaves(ToolKind::Select));
        assert!(!switch.leaves(ToolKind::Brush));
    }

    #[test]
    fn reselecting_same_tool_is_not_a_change() {
        let mut state = ToolState::new();
        let switch = state.set_tool(ToolKind::Select);
        assert!(!switch.changed());
        assert!(!switch.leaves_selection());
    }
}
