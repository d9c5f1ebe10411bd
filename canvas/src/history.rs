//! Bounded snapshot history for undo/redo.
//!
//! Each entry is a full surface snapshot taken immediately before an
//! interaction first changed pixels. The undo stack holds at most
//! [`UNDO_LIMIT`] entries and drops the oldest on overflow; the redo stack is
//! emptied whenever a new interaction is recorded.

#[cfg(test)]
#[path = "history_test.rs"]
mod history_test;

use std::collections::VecDeque;

use crate::consts::UNDO_LIMIT;

/// Undo/redo stacks over snapshots of type `P`.
#[derive(Debug, Clone)]
pub struct History<P> {
    undo: VecDeque<P>,
    redo: Vec<P>,
    limit: usize,
}

impl<P> Default for History<P> {
    fn default() -> Self {
        Self::with_limit(UNDO_LIMIT)
    }
}

impl<P> History<P> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_limit(limit: usize) -> Self {
        Self {
            undo: VecDeque::with_capacity(limit),
            redo: Vec::new(),
            limit,
        }
    }

    /// Record the state before a new interaction. Invalidates redo.
    pub fn record(&mut self, before: P) {
        self.redo.clear();
        if self.limit == 0 {
            return;
        }
        while self.undo.len() >= self.limit {
            self.undo.pop_front();
        }
        self.undo.push_back(before);
    }

    /// Step back: `current` moves to redo and the previous state is returned.
    /// `None` (and `current` is dropped) when there is nothing to undo.
    pub fn undo(&mut self, current: P) -> Option<P> {
        let previous = self.undo.pop_back()?;
        self.redo.push(current);
        Some(previous)
    }

    /// Step forward: `current` moves to undo and the next state is returned.
    pub fn redo(&mut self, current: P) -> Option<P> {
        let next = self.redo.pop()?;
        if self.undo.len() >= self.limit {
            self.undo.pop_front();
        }
        self.undo.push_back(current);
        Some(next)
    }

    /// Drop both stacks.
    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    #[must_use]
    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    #[must_use]
    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }
}
