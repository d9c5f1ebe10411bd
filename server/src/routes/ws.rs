//! WebSocket handler: bidirectional frame relay.
//!
//! DESIGN
//! ======
//! On upgrade, generates a participant ID, registers it with the hub, and
//! enters a `select!` loop:
//! - Incoming client frames → decode → typed `ClientMessage` → hub
//! - Messages queued for this connection by the hub → encode → socket
//!
//! The handler never answers a bad frame. Undecodable or unknown frames are
//! logged and dropped; the sender just sees nothing happen.
//!
//! WIRE FORMAT
//! ===========
//! Text frames are JSON, binary frames are protobuf. Outbound frames use the
//! format of the most recent inbound frame, JSON until the client speaks.
//!
//! LIFECYCLE
//! =========
//! 1. Origin check → upgrade (403 when the origin is not allowed)
//! 2. Hub `connect` queues `session:welcome` + `presence:snapshot`
//! 3. Client frames → hub `handle` → fan-out to peers
//! 4. Close or error → hub `disconnect` → `presence:left` + `cursor:removed`

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::http::{HeaderMap, StatusCode, header::ORIGIN};
use axum::response::{IntoResponse, Response};
use frames::{ClientMessage, CodecError, Frame, ParticipantId, ServerMessage, WireFormat};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::state::AppState;

// =============================================================================
// UPGRADE
// =============================================================================

pub async fn handle_ws(State(state): State<AppState>, headers: HeaderMap, ws: WebSocketUpgrade) -> Response {
    // A header that is not valid UTF-8 cannot match any allowed origin.
    let origin = headers.get(ORIGIN).map(|value| value.to_str().unwrap_or_default());
    if !state.config.origin_allowed(origin) {
        warn!(origin = origin.unwrap_or_default(), "ws: origin rejected");
        return (StatusCode::FORBIDDEN, "origin not allowed").into_response();
    }

    ws.on_upgrade(move |socket| run_ws(socket, state))
}

// =============================================================================
// CONNECTION
// =============================================================================

async fn run_ws(mut socket: WebSocket, state: AppState) {
    let id = ParticipantId::new();

    // Per-connection channel the hub delivers into.
    let (tx, mut rx) = mpsc::channel::<ServerMessage>(state.config.peer_buffer);
    state.hub.connect(id, tx).await;
    info!(%id, "ws: client connected");

    let mut format = WireFormat::default();

    loop {
        tokio::select! {
            msg = socket.recv() => {
                let Some(Ok(msg)) = msg else { break };
                match msg {
                    Message::Text(text) => {
                        dispatch(&state, id, &mut format, WireFormat::decode_text(text.as_str())).await;
                    }
                    Message::Binary(bytes) => {
                        dispatch(&state, id, &mut format, WireFormat::decode_binary(&bytes)).await;
                    }
                    Message::Close(_) => break,
                    Message::Ping(_) | Message::Pong(_) => {}
                }
            }
            Some(message) = rx.recv() => {
                if let Err(e) = send_message(&mut socket, format, message).await {
                    debug!(%id, error = %e, "ws: send failed");
                    break;
                }
            }
        }
    }

    state.hub.disconnect(id).await;
    info!(%id, "ws: client disconnected");
}

// =============================================================================
// FRAME DISPATCH
// =============================================================================

async fn dispatch(
    state: &AppState,
    id: ParticipantId,
    format: &mut WireFormat,
    decoded: Result<(Frame, WireFormat), CodecError>,
) {
    let (frame, wire) = match decoded {
        Ok(pair) => pair,
        Err(e) => {
            warn!(%id, error = %e, "ws: invalid inbound frame");
            return;
        }
    };
    *format = wire;

    let message = match ClientMessage::from_frame(&frame) {
        Ok(message) => message,
        Err(e) => {
            warn!(%id, syscall = %frame.syscall, error = %e, "ws: rejected inbound frame");
            return;
        }
    };

    // Cursor traffic is too chatty to log per frame.
    if frame.prefix() != "cursor" {
        debug!(%id, frame_id = %frame.id, syscall = %frame.syscall, "ws: recv frame");
    }
    state.hub.handle(id, message).await;
}

async fn send_message(socket: &mut WebSocket, format: WireFormat, message: ServerMessage) -> Result<(), axum::Error> {
    let frame = message.into_frame();
    let outbound = match format {
        WireFormat::Json => match frames::encode_frame_json(&frame) {
            Ok(text) => Message::Text(text.into()),
            Err(e) => {
                warn!(syscall = %frame.syscall, error = %e, "ws: failed to serialize frame");
                return Ok(());
            }
        },
        WireFormat::Protobuf => Message::Binary(frames::encode_frame(&frame).into()),
    };
    socket.send(outbound).await
}

#[cfg(test)]
#[path = "ws_test.rs"]
mod tests;
