//! Websocket plumbing for the headless participant.
//!
//! `Connector::connect` retries forever with a fixed backoff; callers decide
//! what a dropped connection means for them. Frames go out as JSON text and
//! come back as whatever the server sends.

use std::time::Duration;

use frames::{ClientMessage, ServerMessage};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{info, warn};

use crate::CliError;

pub type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

pub struct Connector {
    url: String,
    backoff: Duration,
}

impl Connector {
    #[must_use]
    pub fn new(url: impl Into<String>, backoff: Duration) -> Self {
        Self { url: url.into(), backoff }
    }

    /// Open a socket, retrying until the server accepts.
    pub async fn connect(&self) -> Client {
        let mut attempt: u32 = 0;
        loop {
            attempt = attempt.saturating_add(1);
            match connect_async(self.url.as_str()).await {
                Ok((client, _)) => {
                    info!(url = %self.url, attempt, "connected");
                    return client;
                }
                Err(e) => {
                    warn!(
                        url = %self.url,
                        attempt,
                        backoff_ms = %self.backoff.as_millis(),
                        error = %e,
                        "connect failed; retrying"
                    );
                    tokio::time::sleep(self.backoff).await;
                }
            }
        }
    }

    #[must_use]
    pub fn backoff(&self) -> Duration {
        self.backoff
    }
}

pub async fn send(client: &mut Client, message: ClientMessage) -> Result<(), CliError> {
    let text = frames::encode_frame_json(&message.into_frame())?;
    client
        .send(Message::text(text))
        .await
        .map_err(|error| CliError::Ws(Box::new(error)))
}

pub async fn send_all(client: &mut Client, messages: Vec<ClientMessage>) -> Result<(), CliError> {
    for message in messages {
        send(client, message).await?;
    }
    Ok(())
}

/// Next server message. `Ok(None)` when the server closed the socket.
///
/// Frames that do not decode are logged and skipped.
pub async fn recv(client: &mut Client) -> Result<Option<ServerMessage>, CliError> {
    loop {
        let Some(message) = client.next().await else {
            return Ok(None);
        };
        let decoded = match message.map_err(|error| CliError::Ws(Box::new(error)))? {
            Message::Text(text) => frames::decode_frame_json(text.as_str()),
            Message::Binary(bytes) => frames::decode_frame(&bytes),
            Message::Close(_) => return Ok(None),
            _ => continue,
        };
        let parsed = decoded
            .map_err(|e| e.to_string())
            .and_then(|frame| ServerMessage::from_frame(&frame).map_err(|e| e.to_string()));
        match parsed {
            Ok(message) => return Ok(Some(message)),
            Err(error) => warn!(%error, "dropping undecodable frame"),
        }
    }
}

/// Like [`recv`], but gives up after `limit`.
pub async fn recv_within(client: &mut Client, limit: Duration, waiting_for: &'static str) -> Result<Option<ServerMessage>, CliError> {
    tokio::time::timeout(limit, recv(client))
        .await
        .map_err(|_| CliError::Timeout(waiting_for))?
}

/// Politely close; errors here only mean the peer is already gone.
pub async fn close(client: &mut Client) {
    if let Err(e) = client.close(None).await {
        warn!(error = %e, "close failed");
    }
}
