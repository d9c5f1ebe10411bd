//! Shared wire model for the whiteboard realtime transport.
//!
//! This crate owns everything that crosses the socket: the [`Frame`]
//! envelope, its JSON and protobuf encodings, the typed message unions
//! ([`ClientMessage`] / [`ServerMessage`]) and the shared data model with its
//! field sanitizers. Both the `server` and the `canvas` client depend on it so
//! the two ends can never disagree on a syscall name or payload shape.
//!
//! DESIGN
//! ======
//! - The envelope keeps its payload as flexible JSON (`serde_json::Value`);
//!   typing happens one layer up in [`message`], at the boundary.
//! - Text sockets carry the envelope as JSON, binary sockets as protobuf.
//! - `from` carries the origin participant on relayed frames. Clients never
//!   set it; the server stamps it.

pub mod message;
pub mod model;

use prost::Message;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub use message::{ClientMessage, ProtocolError, ServerMessage};
pub use model::{ChatMessage, DashStyle, Participant, ParticipantId, Point, StrokeSegment, Tool};

/// Error returned by the frame decoders.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The raw bytes could not be decoded as a protobuf `WireFrame`.
    #[error("failed to decode protobuf frame: {0}")]
    Decode(#[from] prost::DecodeError),
    /// The text could not be parsed as a JSON frame.
    #[error("failed to decode json frame: {0}")]
    Json(#[from] serde_json::Error),
}

/// A single message on the realtime wire protocol.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// Unique identifier for this frame (UUID string).
    pub id: String,
    /// Milliseconds since the Unix epoch when the frame was created.
    pub ts: i64,
    /// Origin participant on relayed frames, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    /// Namespaced operation name, e.g. `"draw:segment"`.
    pub syscall: String,
    /// Arbitrary JSON payload.
    #[serde(default)]
    pub data: Value,
}

impl Frame {
    /// Create a frame with a fresh id and the current timestamp.
    #[must_use]
    pub fn new(syscall: impl Into<String>, data: Value) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            ts: now_ms(),
            from: None,
            syscall: syscall.into(),
            data,
        }
    }

    /// Set the origin participant.
    #[must_use]
    pub fn with_from(mut self, from: impl Into<String>) -> Self {
        self.from = Some(from.into());
        self
    }

    /// Syscall namespace: the text before the first `:`.
    #[must_use]
    pub fn prefix(&self) -> &str {
        self.syscall.split(':').next().unwrap_or(&self.syscall)
    }
}

/// How a connection encodes frames on the socket.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WireFormat {
    /// UTF-8 JSON text messages.
    #[default]
    Json,
    /// Binary protobuf messages.
    Protobuf,
}

/// Current time as milliseconds since the Unix epoch.
#[cfg(not(target_arch = "wasm32"))]
#[must_use]
pub fn now_ms() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};

    let Ok(dur) = SystemTime::now().duration_since(UNIX_EPOCH) else {
        return 0;
    };
    i64::try_from(dur.as_millis()).unwrap_or(0)
}

/// Current time as milliseconds since the Unix epoch.
#[cfg(target_arch = "wasm32")]
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn now_ms() -> i64 {
    js_sys::Date::now() as i64
}

/// Encode a frame as JSON text.
///
/// # Errors
///
/// Returns [`CodecError::Json`] if the payload cannot be serialized.
pub fn encode_frame_json(frame: &Frame) -> Result<String, CodecError> {
    Ok(serde_json::to_string(frame)?)
}

/// Decode a frame from JSON text.
///
/// # Errors
///
/// Returns [`CodecError::Json`] for malformed or mistyped text.
pub fn decode_frame_json(text: &str) -> Result<Frame, CodecError> {
    Ok(serde_json::from_str(text)?)
}

/// Encode a frame into protobuf bytes.
#[must_use]
pub fn encode_frame(frame: &Frame) -> Vec<u8> {
    let wire = frame_to_wire(frame);

    let mut out = Vec::with_capacity(wire.encoded_len());
    // Encoding into a growable Vec cannot hit `BufferTooSmall`.
    wire.encode(&mut out).unwrap_or_default();
    out
}

/// Decode protobuf bytes into a frame.
///
/// # Errors
///
/// Returns [`CodecError::Decode`] for malformed bytes.
pub fn decode_frame(bytes: &[u8]) -> Result<Frame, CodecError> {
    let wire = WireFrame::decode(bytes)?;
    Ok(wire_to_frame(wire))
}

fn frame_to_wire(frame: &Frame) -> WireFrame {
    WireFrame {
        id: frame.id.clone(),
        ts: frame.ts,
        from: frame.from.clone(),
        syscall: frame.syscall.clone(),
        data: Some(json_to_proto_value(&frame.data)),
    }
}

fn wire_to_frame(wire: WireFrame) -> Frame {
    Frame {
        id: wire.id,
        ts: wire.ts,
        from: wire.from,
        syscall: wire.syscall,
        data: wire
            .data
            .map_or(Value::Object(Map::new()), |v| proto_to_json_value(&v)),
    }
}

fn json_to_proto_value(value: &Value) -> prost_types::Value {
    let kind = match value {
        Value::Null => {
            prost_types::value::Kind::NullValue(prost_types::NullValue::NullValue as i32)
        }
        Value::Bool(v) => prost_types::value::Kind::BoolValue(*v),
        Value::Number(v) => prost_types::value::Kind::NumberValue(v.as_f64().unwrap_or(0.0)),
        Value::String(v) => prost_types::value::Kind::StringValue(v.clone()),
        Value::Array(v) => prost_types::value::Kind::ListValue(prost_types::ListValue {
            values: v.iter().map(json_to_proto_value).collect(),
        }),
        Value::Object(v) => prost_types::value::Kind::StructValue(prost_types::Struct {
            fields: v
                .iter()
                .map(|(k, v)| (k.clone(), json_to_proto_value(v)))
                .collect(),
        }),
    };

    prost_types::Value { kind: Some(kind) }
}

/// Largest magnitude at which every integer is exactly representable in f64.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

fn proto_to_json_value(value: &prost_types::Value) -> Value {
    let Some(kind) = &value.kind else {
        return Value::Null;
    };

    match kind {
        prost_types::value::Kind::NullValue(_) => Value::Null,
        prost_types::value::Kind::NumberValue(v) => number_to_json(*v),
        prost_types::value::Kind::StringValue(v) => Value::String(v.clone()),
        prost_types::value::Kind::BoolValue(v) => Value::Bool(*v),
        prost_types::value::Kind::StructValue(v) => Value::Object(
            v.fields
                .iter()
                .map(|(k, v)| (k.clone(), proto_to_json_value(v)))
                .collect(),
        ),
        prost_types::value::Kind::ListValue(v) => {
            Value::Array(v.values.iter().map(proto_to_json_value).collect())
        }
    }
}

/// Protobuf only has doubles; integral values come back as JSON integers so
/// integer payload fields (timestamps) still deserialize.
#[allow(clippy::cast_possible_truncation)]
fn number_to_json(v: f64) -> Value {
    if v.is_finite() && v.fract() == 0.0 && v.abs() <= MAX_SAFE_INTEGER {
        return Value::from(v as i64);
    }
    serde_json::Number::from_f64(v).map_or(Value::Null, Value::Number)
}

#[derive(Clone, PartialEq, Message)]
struct WireFrame {
    #[prost(string, tag = "1")]
    id: String,
    #[prost(int64, tag = "2")]
    ts: i64,
    #[prost(string, optional, tag = "3")]
    from: Option<String>,
    #[prost(string, tag = "4")]
    syscall: String,
    #[prost(message, optional, tag = "5")]
    data: Option<prost_types::Value>,
}

impl WireFormat {
    /// Decode a text socket message.
    ///
    /// # Errors
    ///
    /// See [`decode_frame_json`].
    pub fn decode_text(text: &str) -> Result<(Frame, Self), CodecError> {
        decode_frame_json(text).map(|frame| (frame, Self::Json))
    }

    /// Decode a binary socket message.
    ///
    /// # Errors
    ///
    /// See [`decode_frame`].
    pub fn decode_binary(bytes: &[u8]) -> Result<(Frame, Self), CodecError> {
        decode_frame(bytes).map(|frame| (frame, Self::Protobuf))
    }
}

#[cfg(test)]
#[path = "lib_test.rs"]
mod tests;
