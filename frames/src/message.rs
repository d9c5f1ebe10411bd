//! Typed message unions for both socket directions.
//!
//! Frames are decoded into [`ClientMessage`] / [`ServerMessage`] at the
//! boundary; anything that does not match a known syscall and payload shape is
//! a [`ProtocolError`] and never reaches session logic.
//!
//! Relayed server messages carry their origin participant in the frame's
//! `from` field rather than in the payload.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::Frame;
use crate::model::{ChatMessage, Participant, ParticipantId, Point, StrokeSegment};

// =============================================================================
// SYSCALLS
// =============================================================================

pub const SYSCALL_SET_NAME: &str = "presence:name";
pub const SYSCALL_DRAW: &str = "draw:segment";
pub const SYSCALL_CURSOR: &str = "cursor:move";
pub const SYSCALL_CLEAR: &str = "board:clear";
pub const SYSCALL_CHAT_SEND: &str = "chat:send";

pub const SYSCALL_WELCOME: &str = "session:welcome";
pub const SYSCALL_SNAPSHOT: &str = "presence:snapshot";
pub const SYSCALL_UPDATED: &str = "presence:updated";
pub const SYSCALL_LEFT: &str = "presence:left";
pub const SYSCALL_CURSOR_REMOVED: &str = "cursor:removed";
pub const SYSCALL_CHAT_MESSAGE: &str = "chat:message";

// =============================================================================
// ERRORS
// =============================================================================

/// Why a frame could not be turned into a typed message.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("unknown syscall: {0}")]
    UnknownSyscall(String),
    #[error("invalid payload for {syscall}: {source}")]
    InvalidPayload {
        syscall: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("missing or malformed origin on {0}")]
    MissingOrigin(String),
}

// =============================================================================
// PAYLOADS
// =============================================================================

#[derive(Serialize, Deserialize)]
struct NamePayload {
    name: String,
}

#[derive(Serialize, Deserialize)]
struct TextPayload {
    text: String,
}

#[derive(Serialize, Deserialize)]
struct IdPayload {
    id: ParticipantId,
}

#[derive(Serialize, Deserialize)]
struct WelcomePayload {
    id: ParticipantId,
    color: String,
}

#[derive(Serialize, Deserialize)]
struct SnapshotPayload {
    participants: Vec<Participant>,
}

#[derive(Serialize, Deserialize)]
struct CursorPayload {
    x: f64,
    y: f64,
    color: String,
    display_name: String,
}

fn payload<T: DeserializeOwned>(frame: &Frame) -> Result<T, ProtocolError> {
    serde_json::from_value(frame.data.clone()).map_err(|source| ProtocolError::InvalidPayload {
        syscall: frame.syscall.clone(),
        source,
    })
}

fn origin(frame: &Frame) -> Result<ParticipantId, ProtocolError> {
    frame
        .from
        .as_deref()
        .and_then(ParticipantId::parse)
        .ok_or_else(|| ProtocolError::MissingOrigin(frame.syscall.clone()))
}

/// Serialize a payload struct. These are plain data; failure is not expected.
fn to_data<T: Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}

// =============================================================================
// CLIENT → SERVER
// =============================================================================

/// Messages a client may send.
#[derive(Clone, Debug, PartialEq)]
pub enum ClientMessage {
    SetDisplayName { name: String },
    Draw(StrokeSegment),
    Cursor(Point),
    ClearBoard,
    Chat { text: String },
}

impl ClientMessage {
    #[must_use]
    pub fn syscall(&self) -> &'static str {
        match self {
            Self::SetDisplayName { .. } => SYSCALL_SET_NAME,
            Self::Draw(_) => SYSCALL_DRAW,
            Self::Cursor(_) => SYSCALL_CURSOR,
            Self::ClearBoard => SYSCALL_CLEAR,
            Self::Chat { .. } => SYSCALL_CHAT_SEND,
        }
    }

    #[must_use]
    pub fn into_frame(self) -> Frame {
        let syscall = self.syscall();
        let data = match self {
            Self::SetDisplayName { name } => to_data(&NamePayload { name }),
            Self::Draw(segment) => to_data(&segment),
            Self::Cursor(position) => to_data(&position),
            Self::ClearBoard => json!({}),
            Self::Chat { text } => to_data(&TextPayload { text }),
        };
        Frame::new(syscall, data)
    }

    /// Decode a client frame. The `from` field is ignored; the server knows
    /// who sent it.
    ///
    /// # Errors
    ///
    /// [`ProtocolError::UnknownSyscall`] or [`ProtocolError::InvalidPayload`].
    pub fn from_frame(frame: &Frame) -> Result<Self, ProtocolError> {
        match frame.syscall.as_str() {
            SYSCALL_SET_NAME => {
                let p: NamePayload = payload(frame)?;
                Ok(Self::SetDisplayName { name: p.name })
            }
            SYSCALL_DRAW => Ok(Self::Draw(payload(frame)?)),
            SYSCALL_CURSOR => Ok(Self::Cursor(payload(frame)?)),
            SYSCALL_CLEAR => Ok(Self::ClearBoard),
            SYSCALL_CHAT_SEND => {
                let p: TextPayload = payload(frame)?;
                Ok(Self::Chat { text: p.text })
            }
            other => Err(ProtocolError::UnknownSyscall(other.to_owned())),
        }
    }
}

// =============================================================================
// SERVER → CLIENT
// =============================================================================

/// Messages the server sends.
#[derive(Clone, Debug, PartialEq)]
pub enum ServerMessage {
    /// Unicast to a joining connection: its own id and assigned color.
    Welcome { id: ParticipantId, color: String },
    /// Unicast to a joining connection: everyone currently connected.
    PresenceSnapshot(Vec<Participant>),
    ParticipantUpdated(Participant),
    ParticipantLeft(ParticipantId),
    Draw {
        origin: ParticipantId,
        segment: StrokeSegment,
    },
    Cursor {
        origin: ParticipantId,
        position: Point,
        color: String,
        display_name: String,
    },
    CursorRemoved(ParticipantId),
    ClearBoard { origin: ParticipantId },
    Chat(ChatMessage),
}

impl ServerMessage {
    #[must_use]
    pub fn syscall(&self) -> &'static str {
        match self {
            Self::Welcome { .. } => SYSCALL_WELCOME,
            Self::PresenceSnapshot(_) => SYSCALL_SNAPSHOT,
            Self::ParticipantUpdated(_) => SYSCALL_UPDATED,
            Self::ParticipantLeft(_) => SYSCALL_LEFT,
            Self::Draw { .. } => SYSCALL_DRAW,
            Self::Cursor { .. } => SYSCALL_CURSOR,
            Self::CursorRemoved(_) => SYSCALL_CURSOR_REMOVED,
            Self::ClearBoard { .. } => SYSCALL_CLEAR,
            Self::Chat(_) => SYSCALL_CHAT_MESSAGE,
        }
    }

    #[must_use]
    pub fn into_frame(self) -> Frame {
        let syscall = self.syscall();
        match self {
            Self::Welcome { id, color } => Frame::new(syscall, to_data(&WelcomePayload { id, color })),
            Self::PresenceSnapshot(participants) => {
                Frame::new(syscall, to_data(&SnapshotPayload { participants }))
            }
            Self::ParticipantUpdated(participant) => Frame::new(syscall, to_data(&participant)),
            Self::ParticipantLeft(id) | Self::CursorRemoved(id) => {
                Frame::new(syscall, to_data(&IdPayload { id }))
            }
            Self::Draw { origin, segment } => {
                Frame::new(syscall, to_data(&segment)).with_from(origin.to_string())
            }
            Self::Cursor {
                origin,
                position,
                color,
                display_name,
            } => Frame::new(
                syscall,
                to_data(&CursorPayload {
                    x: position.x,
                    y: position.y,
                    color,
                    display_name,
                }),
            )
            .with_from(origin.to_string()),
            Self::ClearBoard { origin } => Frame::new(syscall, json!({})).with_from(origin.to_string()),
            Self::Chat(message) => Frame::new(syscall, to_data(&message)),
        }
    }

    /// Decode a server frame.
    ///
    /// # Errors
    ///
    /// [`ProtocolError::UnknownSyscall`], [`ProtocolError::InvalidPayload`],
    /// or [`ProtocolError::MissingOrigin`] for relayed frames without a
    /// parseable `from`.
    pub fn from_frame(frame: &Frame) -> Result<Self, ProtocolError> {
        match frame.syscall.as_str() {
            SYSCALL_WELCOME => {
                let p: WelcomePayload = payload(frame)?;
                Ok(Self::Welcome {
                    id: p.id,
                    color: p.color,
                })
            }
            SYSCALL_SNAPSHOT => {
                let p: SnapshotPayload = payload(frame)?;
                Ok(Self::PresenceSnapshot(p.participants))
            }
            SYSCALL_UPDATED => Ok(Self::ParticipantUpdated(payload(frame)?)),
            SYSCALL_LEFT => {
                let p: IdPayload = payload(frame)?;
                Ok(Self::ParticipantLeft(p.id))
            }
            SYSCALL_DRAW => Ok(Self::Draw {
                origin: origin(frame)?,
                segment: payload(frame)?,
            }),
            SYSCALL_CURSOR => {
                let origin = origin(frame)?;
                let p: CursorPayload = payload(frame)?;
                Ok(Self::Cursor {
                    origin,
                    position: Point::new(p.x, p.y),
                    color: p.color,
                    display_name: p.display_name,
                })
            }
            SYSCALL_CURSOR_REMOVED => {
                let p: IdPayload = payload(frame)?;
                Ok(Self::CursorRemoved(p.id))
            }
            SYSCALL_CLEAR => Ok(Self::ClearBoard {
                origin: origin(frame)?,
            }),
            SYSCALL_CHAT_MESSAGE => Ok(Self::Chat(payload(frame)?)),
            other => Err(ProtocolError::UnknownSyscall(other.to_owned())),
        }
    }
}

#[cfg(test)]
#[path = "message_test.rs"]
mod tests;
