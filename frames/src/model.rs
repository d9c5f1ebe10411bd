//! Shared data model: participants, stroke segments, chat messages.
//!
//! Sanitizers live next to the types they clean so the server relay and the
//! client session apply identical rules. Nothing here rejects input outright
//! unless it is unrecoverable; out-of-range values are clamped.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// LIMITS
// =============================================================================

/// Maximum display-name length, in characters.
pub const MAX_NAME_CHARS: usize = 50;

/// Maximum chat message length, in characters.
pub const MAX_CHAT_CHARS: usize = 500;

/// Display name used before a participant picks one.
pub const DEFAULT_NAME: &str = "Anonymous";

/// Stroke color used when a segment arrives without one.
pub const DEFAULT_COLOR: &str = "#000000";

/// Stroke width used when a segment arrives with a non-finite width.
pub const DEFAULT_WIDTH: f64 = 2.0;

/// Smallest accepted stroke width.
pub const MIN_WIDTH: f64 = 0.5;

/// Largest accepted stroke width.
pub const MAX_WIDTH: f64 = 200.0;

/// Maximum color string length, in bytes.
pub const MAX_COLOR_BYTES: usize = 32;

// =============================================================================
// PARTICIPANTS
// =============================================================================

/// Opaque participant identifier, unique while the connection is open.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(pub Uuid);

impl ParticipantId {
    /// Fresh random id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse the string form carried in a frame's `from` field.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        Uuid::parse_str(raw).ok().map(Self)
    }
}

impl Default for ParticipantId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A connected participant as the registry knows it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: ParticipantId,
    pub display_name: String,
    /// Assigned once at connect; never changes.
    pub color: String,
}

/// Trim, clamp to [`MAX_NAME_CHARS`], and fall back to [`DEFAULT_NAME`].
#[must_use]
pub fn sanitize_display_name(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return DEFAULT_NAME.to_owned();
    }
    trimmed.chars().take(MAX_NAME_CHARS).collect()
}

/// Trim and clamp to [`MAX_CHAT_CHARS`]. `None` when nothing is left.
#[must_use]
pub fn sanitize_chat_text(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.chars().take(MAX_CHAT_CHARS).collect())
}

// =============================================================================
// GEOMETRY
// =============================================================================

/// A point in canvas pixel coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Euclidean distance to `other`.
    #[must_use]
    pub fn distance(self, other: Point) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

// =============================================================================
// STROKES
// =============================================================================

/// Drawing tool that produced a segment.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    #[default]
    Pencil,
    Eraser,
    Highlighter,
    Rectangle,
    Circle,
    Line,
    Arrow,
}

impl Tool {
    /// Tools that emit one segment per pointer move.
    #[must_use]
    pub fn is_freehand(self) -> bool {
        matches!(self, Self::Pencil | Self::Eraser | Self::Highlighter)
    }

    /// Tools that preview locally and commit one segment on release.
    #[must_use]
    pub fn is_shape(self) -> bool {
        matches!(self, Self::Rectangle | Self::Circle | Self::Line | Self::Arrow)
    }

    /// Parse the wire name (`"pencil"`, `"rectangle"`, ...), ignoring case
    /// and surrounding whitespace.
    #[must_use]
    pub fn from_name(raw: &str) -> Option<Self> {
        let tool = match raw.trim().to_ascii_lowercase().as_str() {
            "pencil" => Self::Pencil,
            "eraser" => Self::Eraser,
            "highlighter" => Self::Highlighter,
            "rectangle" => Self::Rectangle,
            "circle" => Self::Circle,
            "line" => Self::Line,
            "arrow" => Self::Arrow,
            _ => return None,
        };
        Some(tool)
    }
}

/// Stroke dash pattern.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DashStyle {
    #[default]
    Solid,
    Dashed,
}

/// One drawing event: a single rendering primitive between two points.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StrokeSegment {
    pub from: Point,
    pub to: Point,
    pub color: String,
    pub width: f64,
    pub tool: Tool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dash: Option<DashStyle>,
}

impl StrokeSegment {
    /// Clamp every field into its accepted range.
    ///
    /// Returns `None` when the geometry is unusable (non-finite coordinates).
    #[must_use]
    pub fn sanitized(mut self) -> Option<Self> {
        if !self.from.is_finite() || !self.to.is_finite() {
            return None;
        }

        self.width = if self.width.is_finite() {
            self.width.clamp(MIN_WIDTH, MAX_WIDTH)
        } else {
            DEFAULT_WIDTH
        };

        self.opacity = self
            .opacity
            .filter(|o| o.is_finite())
            .map(|o| o.clamp(0.0, 1.0));

        let color = self.color.trim();
        self.color = if color.is_empty() {
            DEFAULT_COLOR.to_owned()
        } else {
            clamp_bytes(color, MAX_COLOR_BYTES).to_owned()
        };

        Some(self)
    }

    #[must_use]
    pub fn is_dashed(&self) -> bool {
        self.dash == Some(DashStyle::Dashed)
    }
}

/// Longest prefix of `s` that fits in `max` bytes without splitting a char.
fn clamp_bytes(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

// =============================================================================
// CHAT
// =============================================================================

/// A canonical chat message as stamped by the server.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub participant_id: ParticipantId,
    pub display_name: String,
    pub color: String,
    pub text: String,
    /// Server receive time, milliseconds since the Unix epoch.
    pub timestamp: i64,
}

#[cfg(test)]
#[path = "model_test.rs"]
mod tests;
