//! Shared numeric constants for the canvas crate.

// ── History ─────────────────────────────────────────────────────

/// Maximum undo snapshots retained; the oldest is evicted first.
pub const UNDO_LIMIT: usize = 30;

// ── Presence ────────────────────────────────────────────────────

/// A remote cursor older than this is hidden, in milliseconds.
pub const CURSOR_TTL_MS: i64 = 1500;

/// Minimum spacing between outbound cursor updates, in milliseconds.
pub const CURSOR_EMIT_INTERVAL_MS: i64 = 16;

/// Radius of the dot drawn at a remote cursor, in pixels.
pub const CURSOR_DOT_RADIUS: f64 = 4.0;

/// Offset of a cursor's name label from its dot, in pixels.
pub const CURSOR_LABEL_OFFSET: (f64, f64) = (8.0, -8.0);

/// Chat messages retained per client.
pub const CHAT_HISTORY_LIMIT: usize = 200;

// ── Strokes ─────────────────────────────────────────────────────

/// Eraser strokes are never thinner than this.
pub const ERASER_MIN_WIDTH: f64 = 10.0;

/// Highlighter strokes are never thinner than this.
pub const HIGHLIGHTER_MIN_WIDTH: f64 = 8.0;

/// Highlighter opacity ceiling, also its default.
pub const HIGHLIGHTER_MAX_OPACITY: f64 = 0.5;

/// Dash pattern for dashed strokes: on length, off length.
pub const DASH_PATTERN: [f64; 2] = [8.0, 6.0];

/// Half-angle between the shaft and each arrowhead stroke (30°).
pub const ARROW_HEAD_ANGLE: f64 = std::f64::consts::FRAC_PI_6;

/// Arrowhead length as a multiple of stroke width.
pub const ARROW_HEAD_WIDTH_RATIO: f64 = 4.0;

/// Arrowhead length ceiling in pixels.
pub const ARROW_HEAD_MAX_LEN: f64 = 24.0;

// ── Surface ─────────────────────────────────────────────────────

/// Canvas background in light mode.
pub const BACKGROUND_LIGHT: &str = "#f9fafb";

/// Canvas background in dark mode.
pub const BACKGROUND_DARK: &str = "#171717";
