use frames::{Tool, model::DEFAULT_NAME};

use super::*;
use crate::registry::InMemoryRegistry;

const RED: &str = "hsl(0, 70%, 50%)";

fn joined() -> (InMemoryRegistry, ParticipantId) {
    let mut registry = InMemoryRegistry::new();
    let id = ParticipantId::new();
    on_connect(&mut registry, id, RED.into());
    (registry, id)
}

fn segment() -> StrokeSegment {
    StrokeSegment {
        from: Point::new(1.0, 2.0),
        to: Point::new(3.0, 4.0),
        color: "#ff0000".into(),
        width: 4.0,
        tool: Tool::Pencil,
        opacity: None,
        dash: None,
    }
}

// =============================================================================
// PRESENCE
// =============================================================================

#[test]
fn connect_replies_with_welcome_then_snapshot() {
    let mut registry = InMemoryRegistry::new();
    let existing = ParticipantId::new();
    on_connect(&mut registry, existing, "hsl(1, 70%, 50%)".into());

    let id = ParticipantId::new();
    let Outcome::Reply(messages) = on_connect(&mut registry, id, RED.into()) else {
        panic!("connect must reply to the newcomer only");
    };
    assert_eq!(messages[0], ServerMessage::Welcome { id, color: RED.into() });
    let ServerMessage::PresenceSnapshot(participants) = &messages[1] else {
        panic!("second message must be a snapshot");
    };
    assert_eq!(participants.len(), 2);
    let me = participants.iter().find(|p| p.id == id).unwrap();
    assert_eq!(me.display_name, DEFAULT_NAME);
    assert_eq!(me.color, RED);
}

#[test]
fn rename_is_sanitized_and_broadcast_to_others() {
    let (mut registry, id) = joined();
    let long = "x".repeat(60);
    let outcome = set_display_name(&mut registry, id, &format!("  {long} "));
    let expected = Participant {
        id,
        display_name: "x".repeat(50),
        color: RED.into(),
    };
    assert_eq!(
        outcome,
        Outcome::BroadcastExcludeSender(vec![ServerMessage::ParticipantUpdated(expected.clone())])
    );
    assert_eq!(registry.get(id), Some(&expected));
}

#[test]
fn blank_rename_falls_back_to_anonymous() {
    let (mut registry, id) = joined();
    set_display_name(&mut registry, id, "Alice");
    set_display_name(&mut registry, id, "   ");
    assert_eq!(registry.get(id).map(|p| p.display_name.as_str()), Some(DEFAULT_NAME));
}

#[test]
fn rename_of_unknown_participant_is_silent() {
    let (mut registry, _) = joined();
    assert_eq!(set_display_name(&mut registry, ParticipantId::new(), "Bob"), Outcome::Silent);
    assert_eq!(registry.len(), 1);
}

#[test]
fn disconnect_announces_left_and_cursor_removed() {
    let (mut registry, id) = joined();
    assert_eq!(
        on_disconnect(&mut registry, id),
        Outcome::BroadcastExcludeSender(vec![
            ServerMessage::ParticipantLeft(id),
            ServerMessage::CursorRemoved(id),
        ])
    );
    assert!(registry.is_empty());
    assert_eq!(on_disconnect(&mut registry, id), Outcome::Silent);
}

// =============================================================================
// EVENTS
// =============================================================================

#[test]
fn draw_is_sanitized_and_tagged_with_origin() {
    let (registry, id) = joined();
    let mut wide = segment();
    wide.width = 900.0;
    let Outcome::BroadcastExcludeSender(messages) = relay_draw(&registry, id, wide) else {
        panic!("draw must exclude the sender");
    };
    let [ServerMessage::Draw { origin, segment }] = messages.as_slice() else {
        panic!("expected one draw message");
    };
    assert_eq!(*origin, id);
    assert!((segment.width - frames::model::MAX_WIDTH).abs() < f64::EPSILON);
}

#[test]
fn unusable_draws_are_dropped() {
    let (registry, id) = joined();
    let mut bad = segment();
    bad.to = Point::new(f64::NAN, 0.0);
    assert_eq!(relay_draw(&registry, id, bad), Outcome::Silent);
    assert_eq!(relay_draw(&registry, ParticipantId::new(), segment()), Outcome::Silent);
}

#[test]
fn cursor_carries_current_color_and_name() {
    let (mut registry, id) = joined();
    set_display_name(&mut registry, id, "Alice");
    assert_eq!(
        relay_cursor(&registry, id, Point::new(5.0, 6.0)),
        Outcome::BroadcastExcludeSender(vec![ServerMessage::Cursor {
            origin: id,
            position: Point::new(5.0, 6.0),
            color: RED.into(),
            display_name: "Alice".into(),
        }])
    );
}

#[test]
fn bad_cursors_are_dropped() {
    let (registry, id) = joined();
    assert_eq!(relay_cursor(&registry, id, Point::new(f64::INFINITY, 0.0)), Outcome::Silent);
    assert_eq!(relay_cursor(&registry, ParticipantId::new(), Point::new(1.0, 1.0)), Outcome::Silent);
}

#[test]
fn clear_goes_to_others() {
    let (registry, id) = joined();
    assert_eq!(
        relay_clear(&registry, id),
        Outcome::BroadcastExcludeSender(vec![ServerMessage::ClearBoard { origin: id }])
    );
    assert_eq!(relay_clear(&registry, ParticipantId::new()), Outcome::Silent);
}

#[test]
fn chat_is_stamped_and_broadcast_to_everyone() {
    let (mut registry, id) = joined();
    set_display_name(&mut registry, id, "Alice");
    let Outcome::Broadcast(ServerMessage::Chat(message)) = relay_chat(&registry, id, "  hello  ", 1234) else {
        panic!("chat must broadcast to all");
    };
    assert_eq!(message.text, "hello");
    assert_eq!(message.participant_id, id);
    assert_eq!(message.display_name, "Alice");
    assert_eq!(message.color, RED);
    assert_eq!(message.timestamp, 1234);
}

#[test]
fn chat_ids_are_unique() {
    let (registry, id) = joined();
    let ids: Vec<_> = (0..2)
        .filter_map(|_| match relay_chat(&registry, id, "hi", 0) {
            Outcome::Broadcast(ServerMessage::Chat(m)) => Some(m.id),
            _ => None,
        })
        .collect();
    assert_eq!(ids.len(), 2);
    assert_ne!(ids[0], ids[1]);
}

#[test]
fn chat_is_clamped_or_dropped() {
    let (registry, id) = joined();
    assert_eq!(relay_chat(&registry, id, " \n\t ", 0), Outcome::Silent);
    assert_eq!(relay_chat(&registry, ParticipantId::new(), "hi", 0), Outcome::Silent);

    let Outcome::Broadcast(ServerMessage::Chat(message)) = relay_chat(&registry, id, &"y".repeat(501), 0) else {
        panic!("long chat is clamped, not dropped");
    };
    assert_eq!(message.text.chars().count(), 500);
}
