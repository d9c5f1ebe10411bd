//! Client engine for the shared whiteboard.
//!
//! This crate is compiled to WebAssembly for the browser and natively for the
//! headless CLI participant and tests. It owns the drawing surface and all
//! client-side state: translating pointer input into stroke segments,
//! keeping local undo/redo history, replaying remote strokes, and mirroring
//! presence, cursors, and chat. The host is responsible only for wiring input
//! and the socket to the engine and sending the resulting messages.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | [`engine::EngineCore`]: interaction state machine, history, remote replay |
//! | [`session`] | [`session::ClientSession`]: routes server messages, produces client messages |
//! | [`surface`] | The [`surface::Surface`] trait the engine paints through |
//! | [`raster`] | In-memory RGBA surface |
//! | [`render`] | Segment → surface calls, shared by local and remote strokes |
//! | [`history`] | Bounded undo/redo snapshot stacks |
//! | [`input`] | Tool settings, buttons, and interaction state |
//! | [`cursors`] | Remote cursor overlay with TTL |
//! | [`presence`] | Mirror of the server's participant registry |
//! | [`chat`] | Bounded chat log |
//! | [`color`] | CSS color parsing |
//! | [`web`] | Browser canvas surface, cursor overlay, and the exported `Engine` |
//! | [`consts`] | Shared limits and rendering constants |

pub mod chat;
pub mod color;
pub mod consts;
pub mod cursors;
pub mod engine;
pub mod history;
pub mod input;
pub mod presence;
pub mod raster;
pub mod render;
pub mod session;
pub mod surface;
pub mod web;
