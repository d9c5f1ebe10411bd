//! Relay service: presence and event fan-out decisions.
//!
//! DESIGN
//! ======
//! Every function here is pure business logic: it validates input, reads or
//! mutates the registry, and returns an [`Outcome`] describing who should
//! receive what. Nothing in this module touches a socket or a channel; the
//! hub applies the outcome.
//!
//! Events from an origin the registry does not know are dropped. Malformed
//! input is clamped where it can be and dropped where it cannot; no error is
//! ever sent back to the sender.

use frames::model::{sanitize_chat_text, sanitize_display_name};
use frames::{ChatMessage, Participant, ParticipantId, Point, ServerMessage, StrokeSegment};
use tracing::debug;
use uuid::Uuid;

use crate::registry::Registry;

// =============================================================================
// OUTCOME
// =============================================================================

/// Who receives the result of a handler.
#[derive(Debug, PartialEq)]
pub enum Outcome {
    /// Nothing to deliver.
    Silent,
    /// Send to the originating connection only, in order.
    Reply(Vec<ServerMessage>),
    /// Send to every connection except the origin, in order.
    BroadcastExcludeSender(Vec<ServerMessage>),
    /// Send to every connection including the origin.
    Broadcast(ServerMessage),
}

// =============================================================================
// PRESENCE
// =============================================================================

/// Register a new connection as `"Anonymous"` with `color`. The newcomer
/// alone receives its welcome and the full participant list.
pub fn on_connect(registry: &mut dyn Registry, id: ParticipantId, color: String) -> Outcome {
    let participant = Participant {
        id,
        display_name: frames::model::DEFAULT_NAME.to_owned(),
        color: color.clone(),
    };
    registry.add(participant);
    Outcome::Reply(vec![
        ServerMessage::Welcome { id, color },
        ServerMessage::PresenceSnapshot(registry.list()),
    ])
}

pub fn set_display_name(registry: &mut dyn Registry, id: ParticipantId, raw: &str) -> Outcome {
    let Some(current) = registry.get(id) else {
        debug!(%id, "relay: rename from unknown participant");
        return Outcome::Silent;
    };
    let updated = Participant {
        display_name: sanitize_display_name(raw),
        ..current.clone()
    };
    registry.update(updated.clone());
    Outcome::BroadcastExcludeSender(vec![ServerMessage::ParticipantUpdated(updated)])
}

/// Forget `id` and tell everyone left that its presence and cursor are gone.
pub fn on_disconnect(registry: &mut dyn Registry, id: ParticipantId) -> Outcome {
    if registry.remove(id).is_none() {
        return Outcome::Silent;
    }
    Outcome::BroadcastExcludeSender(vec![
        ServerMessage::ParticipantLeft(id),
        ServerMessage::CursorRemoved(id),
    ])
}

// =============================================================================
// EVENTS
// =============================================================================

pub fn relay_draw(registry: &dyn Registry, origin: ParticipantId, segment: StrokeSegment) -> Outcome {
    if registry.get(origin).is_none() {
        debug!(%origin, "relay: draw from unknown participant");
        return Outcome::Silent;
    }
    let Some(segment) = segment.sanitized() else {
        debug!(%origin, "relay: dropping unusable segment");
        return Outcome::Silent;
    };
    Outcome::BroadcastExcludeSender(vec![ServerMessage::Draw { origin, segment }])
}

/// Cursor moves are stamped with the origin's current color and name so
/// receivers never need a presence lookup to draw the label.
pub fn relay_cursor(registry: &dyn Registry, origin: ParticipantId, position: Point) -> Outcome {
    if !position.is_finite() {
        return Outcome::Silent;
    }
    let Some(participant) = registry.get(origin) else {
        debug!(%origin, "relay: cursor from unknown participant");
        return Outcome::Silent;
    };
    Outcome::BroadcastExcludeSender(vec![ServerMessage::Cursor {
        origin,
        position,
        color: participant.color.clone(),
        display_name: participant.display_name.clone(),
    }])
}

pub fn relay_clear(registry: &dyn Registry, origin: ParticipantId) -> Outcome {
    if registry.get(origin).is_none() {
        debug!(%origin, "relay: clear from unknown participant");
        return Outcome::Silent;
    }
    Outcome::BroadcastExcludeSender(vec![ServerMessage::ClearBoard { origin }])
}

/// Stamp a chat line with a fresh id and the server clock. The sender gets
/// the canonical copy too.
pub fn relay_chat(registry: &dyn Registry, origin: ParticipantId, raw: &str, now_ms: i64) -> Outcome {
    let Some(participant) = registry.get(origin) else {
        debug!(%origin, "relay: chat from unknown participant");
        return Outcome::Silent;
    };
    let Some(text) = sanitize_chat_text(raw) else {
        return Outcome::Silent;
    };
    Outcome::Broadcast(ServerMessage::Chat(ChatMessage {
        id: Uuid::new_v4(),
        participant_id: origin,
        display_name: participant.display_name.clone(),
        color: participant.color.clone(),
        text,
        timestamp: now_ms,
    }))
}

#[cfg(test)]
#[path = "relay_test.rs"]
mod tests;
