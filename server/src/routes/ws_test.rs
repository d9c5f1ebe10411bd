use canvas::input::{Button, ToolConfig};
use canvas::raster::Raster;
use canvas::session::ClientSession;
use frames::{DashStyle, Point, Tool, decode_frame_json, encode_frame_json};
use futures_util::{SinkExt, StreamExt};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::{Duration, timeout};
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::{self, Message as WsMessage};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use super::*;
use crate::config::ServerConfig;
use crate::routes;

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

// =============================================================================
// HARNESS
// =============================================================================

async fn spawn_server() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    let app = routes::app(AppState::new(ServerConfig::default()));
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });
    format!("{addr}")
}

async fn connect(addr: &str) -> Client {
    let (stream, _) = connect_async(format!("ws://{addr}/ws")).await.expect("ws connect");
    stream
}

async fn recv_message(client: &mut Client) -> ServerMessage {
    let fut = async {
        loop {
            let message = client.next().await.expect("stream open").expect("ws message");
            let frame = match message {
                WsMessage::Text(text) => decode_frame_json(text.as_str()).expect("json frame"),
                WsMessage::Binary(bytes) => frames::decode_frame(&bytes).expect("protobuf frame"),
                _ => continue,
            };
            return ServerMessage::from_frame(&frame).expect("server message");
        }
    };
    timeout(Duration::from_secs(2), fut).await.expect("receive timed out")
}

/// Skip messages until one with `syscall` arrives.
async fn recv_syscall(client: &mut Client, syscall: &str) -> ServerMessage {
    loop {
        let message = recv_message(client).await;
        if message.syscall() == syscall {
            return message;
        }
    }
}

/// Everything that arrives within `window`.
async fn collect_for(client: &mut Client, window: Duration) -> Vec<ServerMessage> {
    let mut out = Vec::new();
    while let Ok(Some(Ok(message))) = timeout(window, client.next()).await {
        if let WsMessage::Text(text) = message {
            let frame = decode_frame_json(text.as_str()).expect("json frame");
            out.push(ServerMessage::from_frame(&frame).expect("server message"));
        }
    }
    out
}

async fn send(client: &mut Client, message: ClientMessage) {
    let text = encode_frame_json(&message.into_frame()).expect("encode");
    client.send(WsMessage::text(text)).await.expect("ws send");
}

/// Connect, read the welcome and snapshot, and announce `name`.
async fn join(addr: &str, name: &str) -> (Client, ParticipantId) {
    let mut client = connect(addr).await;
    let ServerMessage::Welcome { id, .. } = recv_message(&mut client).await else {
        panic!("first message must be the welcome");
    };
    assert_eq!(recv_message(&mut client).await.syscall(), frames::message::SYSCALL_SNAPSHOT);
    send(&mut client, ClientMessage::SetDisplayName { name: name.into() }).await;
    (client, id)
}

// =============================================================================
// TESTS
// =============================================================================

#[tokio::test]
async fn healthz_returns_ok() {
    let addr = spawn_server().await;
    let mut stream = TcpStream::connect(&addr).await.expect("tcp connect");
    stream
        .write_all(b"GET /healthz HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
        .await
        .expect("write request");
    let mut response = String::new();
    stream.read_to_string(&mut response).await.expect("read response");
    assert!(response.starts_with("HTTP/1.1 200"), "{response}");
}

#[tokio::test]
async fn foreign_origin_is_forbidden() {
    let addr = spawn_server().await;
    let mut request = format!("ws://{addr}/ws").into_client_request().expect("request");
    request
        .headers_mut()
        .insert("Origin", "http://evil.example".parse().expect("header value"));
    match connect_async(request).await {
        Err(tungstenite::Error::Http(response)) => assert_eq!(response.status(), 403),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("foreign origin must not upgrade"),
    }
}

#[tokio::test]
async fn allowed_origin_is_accepted() {
    let addr = spawn_server().await;
    let mut request = format!("ws://{addr}/ws").into_client_request().expect("request");
    request
        .headers_mut()
        .insert("Origin", "http://localhost:3000".parse().expect("header value"));
    let (mut client, _) = connect_async(request).await.expect("allowed origin upgrades");
    assert_eq!(recv_message(&mut client).await.syscall(), frames::message::SYSCALL_WELCOME);
}

#[tokio::test]
async fn peers_see_names_and_departures() {
    let addr = spawn_server().await;
    let (mut a, _) = join(&addr, "Alice").await;
    let (b, bob) = join(&addr, "Bob").await;

    let ServerMessage::ParticipantUpdated(p) = recv_syscall(&mut a, frames::message::SYSCALL_UPDATED).await else {
        panic!("expected presence update");
    };
    assert_eq!((p.id, p.display_name.as_str()), (bob, "Bob"));

    drop(b);
    assert_eq!(
        recv_syscall(&mut a, frames::message::SYSCALL_LEFT).await,
        ServerMessage::ParticipantLeft(bob)
    );
    assert_eq!(recv_message(&mut a).await, ServerMessage::CursorRemoved(bob));
}

#[tokio::test]
async fn rectangle_stroke_converges_without_echo() {
    let addr = spawn_server().await;
    let (mut a, alice) = join(&addr, "Alice").await;
    let (mut b, _) = join(&addr, "Bob").await;

    let mut alice_session = ClientSession::new(Raster::new(64, 64, "#f9fafb"), "Alice");
    let mut bob_session = ClientSession::new(Raster::new(64, 64, "#f9fafb"), "Bob");
    alice_session.on_connected();
    bob_session.on_connected();

    alice_session.engine.set_tool(ToolConfig {
        tool: Tool::Rectangle,
        color: "#ff0000".into(),
        width: 4.0,
        opacity: 1.0,
        dash: DashStyle::Solid,
    });
    let mut actions = alice_session.engine.on_pointer_down(Point::new(10.0, 10.0), Button::Primary);
    actions.extend(alice_session.engine.on_pointer_move(Point::new(50.0, 50.0), 0));
    actions.extend(alice_session.engine.on_pointer_up(Point::new(50.0, 50.0)));
    let outbound = alice_session.outbound(&actions);
    assert_eq!(outbound.len(), 2, "one cursor move and one committed rectangle");
    for message in outbound {
        send(&mut a, message).await;
    }

    let draw = recv_syscall(&mut b, frames::message::SYSCALL_DRAW).await;
    assert!(matches!(&draw, ServerMessage::Draw { origin, .. } if *origin == alice));
    bob_session.handle(draw, 0);
    bob_session.engine.flush_remote();

    assert!(alice_session.engine.surface().painted_pixels() > 0);
    assert_eq!(
        alice_session.engine.surface().pixels(),
        bob_session.engine.surface().pixels()
    );

    let echoes = collect_for(&mut a, Duration::from_millis(150)).await;
    assert!(
        echoes.iter().all(|m| !matches!(m, ServerMessage::Draw { .. } | ServerMessage::Cursor { .. })),
        "origin received its own event: {echoes:?}"
    );
}

#[tokio::test]
async fn chat_reaches_everyone_with_the_same_id() {
    let addr = spawn_server().await;
    let (mut a, alice) = join(&addr, "Alice").await;
    let (mut b, _) = join(&addr, "Bob").await;

    send(&mut a, ClientMessage::Chat { text: "  hello  ".into() }).await;

    let ServerMessage::Chat(to_a) = recv_syscall(&mut a, frames::message::SYSCALL_CHAT_MESSAGE).await else {
        panic!("sender gets the canonical copy");
    };
    let ServerMessage::Chat(to_b) = recv_syscall(&mut b, frames::message::SYSCALL_CHAT_MESSAGE).await else {
        panic!("peer gets the message");
    };
    assert_eq!(to_a, to_b);
    assert_eq!(to_a.text, "hello");
    assert_eq!(to_a.participant_id, alice);
    assert_eq!(to_a.display_name, "Alice");
}

#[tokio::test]
async fn garbage_frames_are_dropped_and_the_socket_survives() {
    let addr = spawn_server().await;
    let (mut a, _) = join(&addr, "Alice").await;

    a.send(WsMessage::text("{not json")).await.expect("send garbage");
    a.send(WsMessage::text(r#"{"id":"1","ts":0,"syscall":"board:explode","data":{}}"#))
        .await
        .expect("send unknown syscall");
    send(&mut a, ClientMessage::Chat { text: "still here".into() }).await;

    let ServerMessage::Chat(message) = recv_syscall(&mut a, frames::message::SYSCALL_CHAT_MESSAGE).await else {
        panic!("expected chat");
    };
    assert_eq!(message.text, "still here");
}

#[tokio::test]
async fn binary_clients_get_binary_replies() {
    let addr = spawn_server().await;
    let (mut a, _) = join(&addr, "Alice").await;

    let frame = ClientMessage::Chat { text: "over protobuf".into() }.into_frame();
    a.send(WsMessage::binary(frames::encode_frame(&frame))).await.expect("send binary");

    let reply = timeout(Duration::from_secs(2), async {
        loop {
            if let Some(Ok(WsMessage::Binary(bytes))) = a.next().await {
                return frames::decode_frame(&bytes).expect("protobuf frame");
            }
        }
    })
    .await
    .expect("binary reply timed out");
    let ServerMessage::Chat(message) = ServerMessage::from_frame(&reply).expect("server message") else {
        panic!("expected chat");
    };
    assert_eq!(message.text, "over protobuf");
}
