//! Bounded undo/redo of whole-surface snapshots.

use std::collections::VecDeque;

use crate::surface::PixelSurface;

pub const MAX_HISTORY_DEPTH: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryDirection {
    Undo,
    Redo,
}

impl HistoryDirection {
    pub const fn applied_message(self) -> &'static str {
        match self {
            Self::Undo => "undo applied",
            Self::Redo => "redo applied",
        }
    }

    pub const fn empty_message(self) -> &'static str {
        match self {
            Self::Undo => "undo stack empty",
            Self::Redo => "redo stack empty",
        }
    }
}

/// Undo and redo stacks of owned surface copies.
///
/// The undo stack evicts its oldest entry once it holds [`MAX_HISTORY_DEPTH`]
/// snapshots; recording a fresh snapshot always empties the redo stack.
#[derive(Debug, Clone)]
pub struct EditHistory {
    undo_stack: VecDeque<PixelSurface>,
    redo_stack: Vec<PixelSurface>,
    limit: usize,
}

impl Default for EditHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl EditHistory {
    pub fn new() -> Self {
        Self::with_limit(MAX_HISTORY_DEPTH)
    }

    pub fn with_limit(limit: usize) -> Self {
        let limit = limit.max(1);
        Self {
            undo_stack: VecDeque::with_capacity(limit),
            redo_stack: Vec::new(),
            limit,
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Records the state that existed before a new edit.
    pub fn record(&mut self, snapshot: PixelSurface) {
        self.push_undo(snapshot);
        self.redo_stack.clear();
    }

    fn push_undo(&mut self, snapshot: PixelSurface) {
        if self.undo_stack.len() >= self.limit {
            self.undo_stack.pop_front();
            tracing::debug!(limit = self.limit, "evicted oldest undo snapshot");
        }
        self.undo_stack.push_back(snapshot);
    }

    /// Steps back: `current` moves to the redo stack and the previous snapshot
    /// is returned. `None` leaves both stacks untouched.
    pub fn undo(&mut self, current: PixelSurface) -> Option<PixelSurface> {
        let previous = self.undo_stack.pop_back()?;
        self.redo_stack.push(current);
        Some(previous)
    }

    /// Steps forward: `current` moves back onto the undo stack.
    pub fn redo(&mut self, current: PixelSurface) -> Option<PixelSurface> {
        let next = self.redo_stack.pop()?;
        self.push_undo(current);
        Some(next)
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}
