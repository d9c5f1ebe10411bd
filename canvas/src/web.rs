//! Browser binding: a [`Surface`] over `CanvasRenderingContext2d`, the
//! remote cursor overlay, and the `Engine` exported to the host page.
//!
//! This module is the only place that touches `web_sys`. Canvas calls that
//! can fail are reported to the console and otherwise ignored; the surface
//! contract is infallible and a dropped stroke is not worth tearing the page
//! down for.
//!
//! HOST CONTRACT
//! =============
//! The page owns the socket and two stacked canvases: the board and a
//! transparent overlay above it. It forwards pointer events and inbound text
//! frames to `Engine`, sends every string the engine returns as a text frame,
//! and calls `animation_frame` from `requestAnimationFrame`.

use frames::{ClientMessage, DashStyle, ServerMessage, Tool, decode_frame_json, encode_frame_json};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, ImageData, console};

use crate::consts::{BACKGROUND_DARK, BACKGROUND_LIGHT, DASH_PATTERN};
use crate::cursors::CursorMark;
use crate::engine::Action;
use crate::input::{Button, ToolConfig};
use crate::session::ClientSession;
use crate::surface::{Pen, Point, Surface};

/// Font for cursor name labels.
const CURSOR_LABEL_FONT: &str = "12px sans-serif";

fn report(result: Result<(), JsValue>) {
    if let Err(err) = result {
        console::warn_1(&err);
    }
}

fn context_2d(canvas: &HtmlCanvasElement) -> Result<CanvasRenderingContext2d, JsValue> {
    canvas
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("canvas has no 2d context"))?
        .dyn_into::<CanvasRenderingContext2d>()
        .map_err(JsValue::from)
}

// =============================================================
// Surface
// =============================================================

/// A 2D canvas context wrapped as a [`Surface`].
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    background: String,
}

impl CanvasSurface {
    /// Acquire the 2D context and paint the background.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the canvas has no 2D context.
    pub fn new(canvas: HtmlCanvasElement, background: &str) -> Result<Self, JsValue> {
        let ctx = context_2d(&canvas)?;
        let mut surface = Self {
            canvas,
            ctx,
            background: background.to_owned(),
        };
        surface.clear();
        Ok(surface)
    }

    fn apply_pen(&self, pen: &Pen) {
        self.ctx.set_stroke_style_str(&pen.color);
        self.ctx.set_line_width(pen.width);
        self.ctx.set_line_cap("round");
        self.ctx.set_line_join("round");
        self.ctx.set_global_alpha(pen.opacity);
        let dash = js_sys::Array::new();
        if pen.dashed {
            for len in DASH_PATTERN {
                dash.push(&JsValue::from_f64(len));
            }
        }
        report(self.ctx.set_line_dash(&dash));
    }

    fn reset_pen(&self) {
        self.ctx.set_global_alpha(1.0);
        report(self.ctx.set_line_dash(&js_sys::Array::new()));
    }
}

impl Surface for CanvasSurface {
    type Snapshot = Option<ImageData>;

    fn width(&self) -> u32 {
        self.canvas.width()
    }

    fn height(&self) -> u32 {
        self.canvas.height()
    }

    fn background(&self) -> &str {
        &self.background
    }

    fn stroke_polyline(&mut self, points: &[Point], pen: &Pen) {
        let Some((first, rest)) = points.split_first() else {
            return;
        };
        self.apply_pen(pen);
        self.ctx.begin_path();
        self.ctx.move_to(first.x, first.y);
        if rest.is_empty() {
            self.ctx.line_to(first.x, first.y);
        }
        for p in rest {
            self.ctx.line_to(p.x, p.y);
        }
        self.ctx.stroke();
        self.reset_pen();
    }

    fn stroke_rect(&mut self, a: Point, b: Point, pen: &Pen) {
        self.apply_pen(pen);
        self.ctx.stroke_rect(a.x, a.y, b.x - a.x, b.y - a.y);
        self.reset_pen();
    }

    fn stroke_ellipse(&mut self, center: Point, rx: f64, ry: f64, pen: &Pen) {
        self.apply_pen(pen);
        self.ctx.begin_path();
        report(self.ctx.ellipse(
            center.x,
            center.y,
            rx.abs(),
            ry.abs(),
            0.0,
            0.0,
            std::f64::consts::TAU,
        ));
        self.ctx.stroke();
        self.reset_pen();
    }

    fn clear(&mut self) {
        let (w, h) = (f64::from(self.width()), f64::from(self.height()));
        self.ctx.set_fill_style_str(&self.background);
        self.ctx.fill_rect(0.0, 0.0, w, h);
    }

    fn snapshot(&self) -> Self::Snapshot {
        let (w, h) = (f64::from(self.width()), f64::from(self.height()));
        match self.ctx.get_image_data(0.0, 0.0, w, h) {
            Ok(data) => Some(data),
            Err(err) => {
                console::warn_1(&err);
                None
            }
        }
    }

    fn restore(&mut self, snapshot: &Self::Snapshot) {
        if let Some(data) = snapshot {
            report(self.ctx.put_image_data(data, 0.0, 0.0));
        }
    }
}

// =============================================================
// Cursor overlay
// =============================================================

/// Remote cursors, repainted from scratch on a transparent canvas above the
/// board so they never end up in board snapshots.
pub struct CursorOverlay {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl CursorOverlay {
    /// # Errors
    ///
    /// Returns `Err` if the canvas has no 2D context.
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, JsValue> {
        let ctx = context_2d(&canvas)?;
        Ok(Self { canvas, ctx })
    }

    pub fn paint(&self, marks: &[CursorMark<'_>]) {
        let (w, h) = (f64::from(self.canvas.width()), f64::from(self.canvas.height()));
        self.ctx.clear_rect(0.0, 0.0, w, h);
        self.ctx.set_font(CURSOR_LABEL_FONT);
        for mark in marks {
            self.ctx.set_fill_style_str(mark.color);
            self.ctx.begin_path();
            report(self.ctx.arc(
                mark.center.x,
                mark.center.y,
                mark.radius,
                0.0,
                std::f64::consts::TAU,
            ));
            self.ctx.fill();
            report(self.ctx.fill_text(mark.label, mark.label_at.x, mark.label_at.y));
        }
    }
}

// =============================================================
// Engine
// =============================================================

/// The full client engine bound to a board canvas and a cursor overlay.
///
/// Frames travel as JSON text. Every method that can produce traffic returns
/// the frames to send, already encoded.
#[wasm_bindgen]
pub struct Engine {
    session: ClientSession<CanvasSurface>,
    overlay: CursorOverlay,
}

#[wasm_bindgen]
impl Engine {
    /// Bind to `board` and `overlay` with the light or dark background.
    ///
    /// # Errors
    ///
    /// Returns `Err` if either canvas has no 2D context.
    #[wasm_bindgen(constructor)]
    pub fn new(
        board: HtmlCanvasElement,
        overlay: HtmlCanvasElement,
        dark: bool,
        display_name: &str,
    ) -> Result<Engine, JsValue> {
        let background = if dark { BACKGROUND_DARK } else { BACKGROUND_LIGHT };
        let surface = CanvasSurface::new(board, background)?;
        Ok(Self {
            session: ClientSession::new(surface, display_name),
            overlay: CursorOverlay::new(overlay)?,
        })
    }

    // --- Toolbar ---

    /// # Errors
    ///
    /// Returns `Err` for a tool name the wire protocol does not know.
    pub fn set_tool(
        &mut self,
        tool: &str,
        color: &str,
        width: f64,
        opacity: f64,
        dashed: bool,
    ) -> Result<(), JsValue> {
        let tool = Tool::from_name(tool).ok_or_else(|| JsValue::from_str(&format!("unknown tool `{tool}`")))?;
        self.session.engine.set_tool(ToolConfig {
            tool,
            color: color.to_owned(),
            width,
            opacity,
            dash: if dashed { DashStyle::Dashed } else { DashStyle::Solid },
        });
        Ok(())
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.session.engine.can_undo()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.session.engine.can_redo()
    }

    pub fn undo(&mut self) {
        self.session.engine.undo();
    }

    pub fn redo(&mut self) {
        self.session.engine.redo();
    }

    pub fn clear(&mut self) -> Vec<String> {
        let actions = self.session.engine.clear();
        self.encode(&actions)
    }

    // --- Pointer ---

    /// `button` is the DOM `PointerEvent.button` code.
    pub fn pointer_down(&mut self, x: f64, y: f64, button: i16) -> Vec<String> {
        let Some(button) = Button::from_dom(button) else {
            return Vec::new();
        };
        let actions = self.session.engine.on_pointer_down(Point::new(x, y), button);
        self.encode(&actions)
    }

    pub fn pointer_move(&mut self, x: f64, y: f64) -> Vec<String> {
        let actions = self.session.engine.on_pointer_move(Point::new(x, y), frames::now_ms());
        self.encode(&actions)
    }

    pub fn pointer_up(&mut self, x: f64, y: f64) -> Vec<String> {
        let actions = self.session.engine.on_pointer_up(Point::new(x, y));
        self.encode(&actions)
    }

    pub fn pointer_cancel(&mut self) {
        self.session.engine.on_pointer_cancel();
    }

    pub fn pointer_leave(&mut self) {
        self.session.engine.on_pointer_leave();
    }

    /// Paint queued remote events and redraw the cursor overlay.
    pub fn animation_frame(&mut self) {
        let now = frames::now_ms();
        self.session.cursors.prune(now);
        self.session.engine.flush_remote();
        self.overlay.paint(&self.session.cursors.marks(now));
    }

    // --- Transport ---

    pub fn connecting(&mut self) {
        self.session.on_connecting();
    }

    /// Frames to send once the socket opens.
    pub fn connected(&mut self) -> Vec<String> {
        encode_all(self.session.on_connected())
    }

    pub fn disconnected(&mut self) {
        self.session.on_disconnected();
    }

    /// Apply one inbound JSON text frame. Malformed frames are logged and
    /// dropped.
    pub fn receive(&mut self, text: &str) {
        match parse_server_frame(text) {
            Ok(message) => {
                self.session.handle(message, frames::now_ms());
            }
            Err(err) => console::warn_1(&JsValue::from_str(&format!("dropping frame: {err}"))),
        }
    }

    pub fn send_chat(&self, text: &str) -> Option<String> {
        self.session.send_chat(text).and_then(encode_one)
    }

    pub fn set_display_name(&mut self, name: &str) -> Option<String> {
        self.session.set_display_name(name).and_then(encode_one)
    }

    // --- Panels ---

    /// Participant labels for the presence list, own entry marked.
    #[must_use]
    pub fn participants(&self) -> Vec<String> {
        let presence = &self.session.presence;
        presence
            .participants()
            .into_iter()
            .filter_map(|p| presence.label(p.id))
            .collect()
    }

    /// Chat history as `name: text` lines, oldest first.
    #[must_use]
    pub fn chat_lines(&self) -> Vec<String> {
        self.session
            .chat
            .messages()
            .map(|m| format!("{}: {}", m.display_name, m.text))
            .collect()
    }
}

impl Engine {
    fn encode(&self, actions: &[Action]) -> Vec<String> {
        encode_all(self.session.outbound(actions))
    }
}

fn encode_one(message: ClientMessage) -> Option<String> {
    match encode_frame_json(&message.into_frame()) {
        Ok(text) => Some(text),
        Err(err) => {
            console::warn_1(&JsValue::from_str(&err.to_string()));
            None
        }
    }
}

fn encode_all(messages: Vec<ClientMessage>) -> Vec<String> {
    messages.into_iter().filter_map(encode_one).collect()
}

/// Decode a JSON text frame into a typed server message.
///
/// # Errors
///
/// Returns the codec or protocol error as a string.
pub fn parse_server_frame(text: &str) -> Result<ServerMessage, String> {
    let frame = decode_frame_json(text).map_err(|e| e.to_string())?;
    ServerMessage::from_frame(&frame).map_err(|e| e.to_string())
}
