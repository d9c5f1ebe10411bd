//! Input model: tool settings, mouse buttons, and the interaction state machine.
//!
//! `ToolConfig` captures the user's drawing settings at the time of a pointer
//! event. `InputState` is the interaction being tracked between pointer-down
//! and pointer-up, carrying what the engine needs to emit segments on move
//! (freehand) or a single segment on release (shapes).

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use frames::{DashStyle, StrokeSegment, Tool};

use crate::surface::Point;

/// Stroke color a fresh client starts with.
pub const DEFAULT_COLOR: &str = "#3b82f6";

/// Stroke width a fresh client starts with.
pub const DEFAULT_WIDTH: f64 = 2.0;

/// Current drawing settings, as chosen in the toolbar.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolConfig {
    pub tool: Tool,
    pub color: String,
    pub width: f64,
    pub opacity: f64,
    pub dash: DashStyle,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            tool: Tool::Pencil,
            color: DEFAULT_COLOR.to_owned(),
            width: DEFAULT_WIDTH,
            opacity: 1.0,
            dash: DashStyle::Solid,
        }
    }
}

impl ToolConfig {
    /// A segment from `from` to `to` with the current settings.
    #[must_use]
    pub fn segment(&self, from: Point, to: Point) -> StrokeSegment {
        StrokeSegment {
            from,
            to,
            color: self.color.clone(),
            width: self.width,
            tool: self.tool,
            opacity: Some(self.opacity),
            dash: Some(self.dash),
        }
    }
}

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    /// Left mouse button, pen contact, or single-finger touch.
    Primary,
    /// Middle mouse button (scroll wheel click).
    Middle,
    /// Right mouse button.
    Secondary,
}

impl Button {
    /// Map a DOM `PointerEvent.button` code; other buttons are ignored.
    #[must_use]
    pub fn from_dom(code: i16) -> Option<Self> {
        match code {
            0 => Some(Self::Primary),
            1 => Some(Self::Middle),
            2 => Some(Self::Secondary),
            _ => None,
        }
    }
}

/// The interaction currently in progress.
///
/// `P` is the surface snapshot type; a shape interaction holds the preview
/// base (the pixels from before the shape was started).
#[derive(Debug, Clone, Default)]
pub enum InputState<P> {
    /// No interaction in progress.
    #[default]
    Idle,
    /// Freehand stroke; one segment per move from `last` to the new point.
    Freehand {
        last: Point,
        /// History snapshot already taken for this stroke.
        recorded: bool,
    },
    /// Shape drag; previews locally and commits once on release.
    Shape {
        anchor: Point,
        /// Latest pointer position, `None` until the first move.
        current: Option<Point>,
        base: P,
    },
}

impl<P> InputState<P> {
    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    #[must_use]
    pub fn is_shape(&self) -> bool {
        matches!(self, Self::Shape { .. })
    }
}
