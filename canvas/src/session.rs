//! Client session: the view model between the transport and the engine.
//!
//! `ClientSession` routes decoded [`ServerMessage`]s to the engine, the
//! presence view, the cursor overlay, and the chat log, and turns engine
//! [`Action`]s into outbound [`ClientMessage`]s. It owns no socket; the host
//! (browser glue or the CLI) moves messages in and out.
//!
//! CONNECTION MODEL
//! ================
//! - `on_connected` returns the display name to (re)send; every reconnect is a
//!   fresh join on the server.
//! - While disconnected, local drawing keeps working but nothing is queued for
//!   later. Presence and cursors are dropped on disconnect because the server
//!   will send a fresh snapshot on rejoin.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use frames::model::{sanitize_chat_text, sanitize_display_name};
use frames::{ClientMessage, ServerMessage};

use crate::chat::ChatLog;
use crate::cursors::RemoteCursors;
use crate::engine::{Action, EngineCore};
use crate::presence::PresenceView;
use crate::surface::Surface;

/// WebSocket connection status.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ConnectionStatus {
    /// Not connected; socket is closed or not yet opened.
    #[default]
    Disconnected,
    /// Handshake or reconnect backoff in progress.
    Connecting,
    /// Socket is open.
    Connected,
}

pub struct ClientSession<S: Surface> {
    pub engine: EngineCore<S>,
    pub presence: PresenceView,
    pub cursors: RemoteCursors,
    pub chat: ChatLog,
    status: ConnectionStatus,
    display_name: String,
}

impl<S: Surface> ClientSession<S> {
    #[must_use]
    pub fn new(surface: S, display_name: &str) -> Self {
        Self {
            engine: EngineCore::new(surface),
            presence: PresenceView::new(),
            cursors: RemoteCursors::new(),
            chat: ChatLog::new(),
            status: ConnectionStatus::Disconnected,
            display_name: sanitize_display_name(display_name),
        }
    }

    // --- Connection lifecycle ---

    #[must_use]
    pub fn status(&self) -> ConnectionStatus {
        self.status
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.status == ConnectionStatus::Connected
    }

    pub fn on_connecting(&mut self) {
        self.status = ConnectionStatus::Connecting;
    }

    /// The socket opened. Returns the messages to send first.
    pub fn on_connected(&mut self) -> Vec<ClientMessage> {
        self.status = ConnectionStatus::Connected;
        vec![ClientMessage::SetDisplayName {
            name: self.display_name.clone(),
        }]
    }

    pub fn on_disconnected(&mut self) {
        self.status = ConnectionStatus::Disconnected;
        self.presence.clear();
        self.cursors.clear();
    }

    // --- Local intents ---

    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Rename locally; returns the message to send when connected.
    pub fn set_display_name(&mut self, raw: &str) -> Option<ClientMessage> {
        self.display_name = sanitize_display_name(raw);
        self.presence.rename_self(&self.display_name);
        self.is_connected().then(|| ClientMessage::SetDisplayName {
            name: self.display_name.clone(),
        })
    }

    /// Validate a chat line. Nothing is appended locally; the server's
    /// canonical copy comes back to us like everyone else.
    pub fn send_chat(&self, raw: &str) -> Option<ClientMessage> {
        if !self.is_connected() {
            return None;
        }
        sanitize_chat_text(raw).map(|text| ClientMessage::Chat { text })
    }

    /// Outbound messages for engine actions. Empty while disconnected.
    #[must_use]
    pub fn outbound(&self, actions: &[Action]) -> Vec<ClientMessage> {
        if !self.is_connected() {
            return Vec::new();
        }
        actions
            .iter()
            .filter_map(|action| match action {
                Action::Draw(segment) => Some(ClientMessage::Draw(segment.clone())),
                Action::ClearBoard => Some(ClientMessage::ClearBoard),
                Action::Cursor(pt) => Some(ClientMessage::Cursor(*pt)),
                Action::RenderNeeded | Action::HistoryChanged { .. } => None,
            })
            .collect()
    }

    // --- Inbound ---

    /// Apply one server message.
    pub fn handle(&mut self, message: ServerMessage, now_ms: i64) -> Vec<Action> {
        match message {
            ServerMessage::Welcome { id, color } => {
                self.presence.set_self(id, color);
                Vec::new()
            }
            ServerMessage::PresenceSnapshot(participants) => {
                self.presence.apply_snapshot(participants);
                // The snapshot can predate our own rename reaching the server.
                self.presence.rename_self(&self.display_name);
                Vec::new()
            }
            ServerMessage::ParticipantUpdated(participant) => {
                self.presence.apply_updated(participant);
                Vec::new()
            }
            ServerMessage::ParticipantLeft(id) => {
                self.presence.apply_left(id);
                if self.cursors.remove(id) {
                    vec![Action::RenderNeeded]
                } else {
                    Vec::new()
                }
            }
            ServerMessage::Draw { origin, segment } => {
                if self.presence.is_self(origin) {
                    return Vec::new();
                }
                vec![self.engine.apply_remote_draw(segment)]
            }
            ServerMessage::Cursor {
                origin,
                position,
                color,
                display_name,
            } => {
                if self.presence.is_self(origin) {
                    return Vec::new();
                }
                self.cursors
                    .upsert(origin, position, color, display_name, now_ms);
                vec![Action::RenderNeeded]
            }
            ServerMessage::CursorRemoved(id) => {
                if self.cursors.remove(id) {
                    vec![Action::RenderNeeded]
                } else {
                    Vec::new()
                }
            }
            ServerMessage::ClearBoard { origin } => {
                if self.presence.is_self(origin) {
                    return Vec::new();
                }
                vec![self.engine.apply_remote_clear()]
            }
            ServerMessage::Chat(message) => {
                self.chat.push(message);
                Vec::new()
            }
        }
    }
}
