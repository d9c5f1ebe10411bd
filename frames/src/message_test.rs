use super::*;
use crate::model::{DashStyle, Tool};
use crate::{decode_frame, encode_frame};

fn rect() -> StrokeSegment {
    StrokeSegment {
        from: Point::new(10.0, 10.0),
        to: Point::new(50.0, 50.0),
        color: "#ff0000".to_owned(),
        width: 4.0,
        tool: Tool::Rectangle,
        opacity: None,
        dash: Some(DashStyle::Dashed),
    }
}

fn client_round_trip(msg: ClientMessage) -> ClientMessage {
    ClientMessage::from_frame(&msg.into_frame()).expect("decode")
}

fn server_round_trip(msg: ServerMessage) -> ServerMessage {
    ServerMessage::from_frame(&msg.into_frame()).expect("decode")
}

#[test]
fn client_draw_survives_frame_conversion() {
    let msg = ClientMessage::Draw(rect());
    assert_eq!(client_round_trip(msg.clone()), msg);
}

#[test]
fn client_frames_carry_no_origin() {
    let frame = ClientMessage::Chat { text: "hi".into() }.into_frame();
    assert_eq!(frame.syscall, "chat:send");
    assert_eq!(frame.from, None);
    assert_eq!(frame.data, json!({"text": "hi"}));
}

#[test]
fn client_clear_ignores_payload() {
    let frame = Frame::new(SYSCALL_CLEAR, Value::Null);
    assert_eq!(ClientMessage::from_frame(&frame).expect("decode"), ClientMessage::ClearBoard);
}

#[test]
fn client_cursor_payload_is_bare_point() {
    let frame = ClientMessage::Cursor(Point::new(1.5, 2.0)).into_frame();
    assert_eq!(frame.data, json!({"x": 1.5, "y": 2.0}));
}

#[test]
fn unknown_syscall_is_rejected() {
    let frame = Frame::new("object:create", json!({}));
    let err = ClientMessage::from_frame(&frame).expect_err("should fail");
    assert!(matches!(err, ProtocolError::UnknownSyscall(s) if s == "object:create"));
}

#[test]
fn mistyped_payload_is_rejected() {
    let frame = Frame::new(SYSCALL_SET_NAME, json!({"name": 7}));
    let err = ClientMessage::from_frame(&frame).expect_err("should fail");
    assert!(matches!(err, ProtocolError::InvalidPayload { .. }));

    let frame = Frame::new(SYSCALL_DRAW, json!({"from": {"x": 0}}));
    assert!(ClientMessage::from_frame(&frame).is_err());
}

#[test]
fn relayed_draw_stamps_origin_in_from() {
    let origin = ParticipantId::new();
    let frame = ServerMessage::Draw {
        origin,
        segment: rect(),
    }
    .into_frame();
    assert_eq!(frame.from, Some(origin.to_string()));
    assert_eq!(frame.data["color"], "#ff0000");
}

#[test]
fn relayed_draw_without_origin_is_rejected() {
    let frame = Frame::new(SYSCALL_DRAW, serde_json::to_value(rect()).expect("value"));
    let err = ServerMessage::from_frame(&frame).expect_err("should fail");
    assert!(matches!(err, ProtocolError::MissingOrigin(_)));
}

#[test]
fn server_messages_survive_frame_conversion() {
    let id = ParticipantId::new();
    let participant = Participant {
        id,
        display_name: "Alice".into(),
        color: "hsl(12, 70%, 50%)".into(),
    };
    let messages = vec![
        ServerMessage::Welcome {
            id,
            color: participant.color.clone(),
        },
        ServerMessage::PresenceSnapshot(vec![participant.clone()]),
        ServerMessage::ParticipantUpdated(participant.clone()),
        ServerMessage::ParticipantLeft(id),
        ServerMessage::Draw {
            origin: id,
            segment: rect(),
        },
        ServerMessage::Cursor {
            origin: id,
            position: Point::new(3.0, 4.5),
            color: participant.color.clone(),
            display_name: "Alice".into(),
        },
        ServerMessage::CursorRemoved(id),
        ServerMessage::ClearBoard { origin: id },
        ServerMessage::Chat(ChatMessage {
            id: uuid::Uuid::new_v4(),
            participant_id: id,
            display_name: "Alice".into(),
            color: participant.color,
            text: "hello".into(),
            timestamp: 1_700_000_000_000,
        }),
    ];

    for msg in messages {
        assert_eq!(server_round_trip(msg.clone()), msg);
    }
}

#[test]
fn chat_message_survives_protobuf_transport() {
    let msg = ServerMessage::Chat(ChatMessage {
        id: uuid::Uuid::new_v4(),
        participant_id: ParticipantId::new(),
        display_name: "Bob".into(),
        color: "hsl(200, 70%, 50%)".into(),
        text: "over the wire".into(),
        timestamp: 1_700_000_000_123,
    });
    let bytes = encode_frame(&msg.clone().into_frame());
    let frame = decode_frame(&bytes).expect("decode");
    assert_eq!(ServerMessage::from_frame(&frame).expect("typed"), msg);
}

#[test]
fn same_syscall_decodes_by_direction() {
    let frame = ClientMessage::Draw(rect()).into_frame();
    assert!(ServerMessage::from_frame(&frame).is_err());
    assert!(ClientMessage::from_frame(&frame).is_ok());
}
