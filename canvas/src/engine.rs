//! Canvas state engine.
//!
//! `EngineCore` owns the drawing surface and everything that mutates it:
//! pointer interactions, undo/redo history, and the queue of remote events
//! waiting to be painted. It is generic over [`Surface`] so the same logic
//! runs against the browser canvas and the in-memory raster.
//!
//! DESIGN
//! ======
//! - Handlers return `Vec<Action>`; the host decides what to send and when to
//!   repaint. The engine never touches the network.
//! - A local stroke is painted before its `Action::Draw` is returned, so the
//!   local canvas never waits on the round trip.
//! - Remote events are queued by `apply_remote_*` and painted by
//!   `flush_remote`, which the host calls on its next animation frame.
//! - Each interaction records exactly one history snapshot, taken before the
//!   first pixel it changes.

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use std::collections::VecDeque;

use frames::StrokeSegment;

use crate::consts::CURSOR_EMIT_INTERVAL_MS;
use crate::history::History;
use crate::input::{Button, InputState, ToolConfig};
use crate::render::paint_segment;
use crate::surface::{Point, Surface};

/// Actions returned from handlers for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// A segment was drawn locally and should be broadcast.
    Draw(StrokeSegment),
    /// The local user cleared the board; broadcast the clear.
    ClearBoard,
    /// Local pointer position for presence; already throttled.
    Cursor(Point),
    /// Something visible changed outside the normal stroke path, or remote
    /// work is queued for `flush_remote`.
    RenderNeeded,
    /// Undo/redo availability changed.
    HistoryChanged { can_undo: bool, can_redo: bool },
}

/// A remote event waiting for the next paint opportunity.
#[derive(Debug, Clone, PartialEq)]
enum RemoteOp {
    Draw(StrokeSegment),
    Clear,
}

/// Core engine state: all logic that doesn't depend on the canvas element.
///
/// Separated from `Engine` so it can be tested without WASM/browser dependencies.
pub struct EngineCore<S: Surface> {
    surface: S,
    pub tool: ToolConfig,
    input: InputState<S::Snapshot>,
    history: History<S::Snapshot>,
    pending: VecDeque<RemoteOp>,
    last_cursor_ms: Option<i64>,
}

impl<S: Surface> EngineCore<S> {
    #[must_use]
    pub fn new(surface: S) -> Self {
        Self {
            surface,
            tool: ToolConfig::default(),
            input: InputState::Idle,
            history: History::new(),
            pending: VecDeque::new(),
            last_cursor_ms: None,
        }
    }

    // --- Queries ---

    #[must_use]
    pub fn surface(&self) -> &S {
        &self.surface
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    #[must_use]
    pub fn undo_depth(&self) -> usize {
        self.history.undo_len()
    }

    #[must_use]
    pub fn redo_depth(&self) -> usize {
        self.history.redo_len()
    }

    /// Whether a pointer interaction is in progress.
    #[must_use]
    pub fn is_interacting(&self) -> bool {
        !self.input.is_idle()
    }

    /// Remote events queued for the next flush.
    #[must_use]
    pub fn pending_remote(&self) -> usize {
        self.pending.len()
    }

    // --- Tool ---

    pub fn set_tool(&mut self, tool: ToolConfig) {
        self.tool = tool;
    }

    // --- Pointer input ---

    /// Begin an interaction. Only the primary button draws.
    pub fn on_pointer_down(&mut self, pt: Point, button: Button) -> Vec<Action> {
        if button != Button::Primary || !pt.is_finite() {
            return Vec::new();
        }
        let actions = self.abandon();

        self.input = if self.tool.tool.is_shape() {
            InputState::Shape {
                anchor: pt,
                current: None,
                base: self.surface.snapshot(),
            }
        } else {
            InputState::Freehand {
                last: pt,
                recorded: false,
            }
        };
        actions
    }

    /// Continue the interaction and report the cursor position.
    ///
    /// Freehand tools draw and emit one segment per move. Shape tools restore
    /// the preview base and repaint the preview without emitting anything.
    pub fn on_pointer_move(&mut self, pt: Point, now_ms: i64) -> Vec<Action> {
        let mut actions = Vec::new();
        if !pt.is_finite() {
            return actions;
        }

        match &mut self.input {
            InputState::Idle => {}
            InputState::Freehand { last, recorded } => {
                let segment = self.tool.segment(*last, pt);
                *last = pt;
                let first = !*recorded;
                *recorded = true;
                if first {
                    self.history.record(self.surface.snapshot());
                    actions.push(self.history_changed());
                }
                paint_segment(&mut self.surface, &segment);
                actions.push(Action::Draw(segment));
            }
            InputState::Shape {
                anchor,
                current,
                base,
            } => {
                *current = Some(pt);
                self.surface.restore(base);
                paint_segment(&mut self.surface, &self.tool.segment(*anchor, pt));
                actions.push(Action::RenderNeeded);
            }
        }

        if let Some(cursor) = self.cursor_action(pt, now_ms) {
            actions.push(cursor);
        }
        actions
    }

    /// Finish the interaction. A shape commits exactly one segment here.
    pub fn on_pointer_up(&mut self, pt: Point) -> Vec<Action> {
        match std::mem::replace(&mut self.input, InputState::Idle) {
            InputState::Idle | InputState::Freehand { .. } => Vec::new(),
            InputState::Shape {
                anchor,
                current,
                base,
            } => {
                let end = if pt.is_finite() {
                    pt
                } else {
                    current.unwrap_or(anchor)
                };
                self.surface.restore(&base);
                if end == anchor {
                    return vec![Action::RenderNeeded];
                }
                let segment = self.tool.segment(anchor, end);
                self.history.record(base);
                paint_segment(&mut self.surface, &segment);
                vec![
                    Action::Draw(segment),
                    Action::RenderNeeded,
                    self.history_changed(),
                ]
            }
        }
    }

    /// The pointer was cancelled (touch interrupted, capture lost).
    pub fn on_pointer_cancel(&mut self) -> Vec<Action> {
        self.abandon()
    }

    /// The pointer left the canvas.
    pub fn on_pointer_leave(&mut self) -> Vec<Action> {
        self.abandon()
    }

    // --- History ---

    pub fn undo(&mut self) -> Vec<Action> {
        let mut actions = self.abandon();
        let current = self.surface.snapshot();
        if let Some(previous) = self.history.undo(current) {
            self.surface.restore(&previous);
            push_unique(&mut actions, Action::RenderNeeded);
            actions.push(self.history_changed());
        }
        actions
    }

    pub fn redo(&mut self) -> Vec<Action> {
        let mut actions = self.abandon();
        let current = self.surface.snapshot();
        if let Some(next) = self.history.redo(current) {
            self.surface.restore(&next);
            push_unique(&mut actions, Action::RenderNeeded);
            actions.push(self.history_changed());
        }
        actions
    }

    /// Wipe the board locally and ask the host to broadcast the clear.
    pub fn clear(&mut self) -> Vec<Action> {
        self.input = InputState::Idle;
        self.pending.clear();
        self.surface.clear();
        self.history.clear();
        vec![
            Action::ClearBoard,
            Action::RenderNeeded,
            self.history_changed(),
        ]
    }

    // --- Remote events ---

    /// Queue a remote segment for the next flush.
    pub fn apply_remote_draw(&mut self, segment: StrokeSegment) -> Action {
        self.pending.push_back(RemoteOp::Draw(segment));
        Action::RenderNeeded
    }

    /// Queue a remote clear for the next flush.
    pub fn apply_remote_clear(&mut self) -> Action {
        self.pending.push_back(RemoteOp::Clear);
        Action::RenderNeeded
    }

    /// Paint every queued remote event in arrival order.
    ///
    /// During a shape preview the preview base is rebased: restored, painted,
    /// re-captured, then the preview is drawn again on top.
    pub fn flush_remote(&mut self) -> Vec<Action> {
        if self.pending.is_empty() {
            return Vec::new();
        }

        if let InputState::Shape { base, .. } = &self.input {
            self.surface.restore(base);
        }

        let mut cleared = false;
        while let Some(op) = self.pending.pop_front() {
            match op {
                RemoteOp::Draw(segment) => paint_segment(&mut self.surface, &segment),
                RemoteOp::Clear => {
                    self.surface.clear();
                    self.history.clear();
                    cleared = true;
                }
            }
        }

        if let InputState::Shape {
            anchor,
            current,
            base,
        } = &mut self.input
        {
            *base = self.surface.snapshot();
            if let Some(end) = *current {
                paint_segment(&mut self.surface, &self.tool.segment(*anchor, end));
            }
        }

        let mut actions = vec![Action::RenderNeeded];
        if cleared {
            actions.push(self.history_changed());
        }
        actions
    }

    // --- Internals ---

    /// Drop any interaction in progress without committing it. A shape
    /// preview is erased; freehand segments already sent stay.
    fn abandon(&mut self) -> Vec<Action> {
        match std::mem::replace(&mut self.input, InputState::Idle) {
            InputState::Shape { base, .. } => {
                self.surface.restore(&base);
                vec![Action::RenderNeeded]
            }
            InputState::Idle | InputState::Freehand { .. } => Vec::new(),
        }
    }

    fn cursor_action(&mut self, pt: Point, now_ms: i64) -> Option<Action> {
        if let Some(last) = self.last_cursor_ms {
            if now_ms - last < CURSOR_EMIT_INTERVAL_MS {
                return None;
            }
        }
        self.last_cursor_ms = Some(now_ms);
        Some(Action::Cursor(pt))
    }

    fn history_changed(&self) -> Action {
        Action::HistoryChanged {
            can_undo: self.history.can_undo(),
            can_redo: self.history.can_redo(),
        }
    }
}

fn push_unique(actions: &mut Vec<Action>, action: Action) {
    if !actions.contains(&action) {
        actions.push(action);
    }
}
