//! Hub: owns the registry and every connection's outbound channel.
//!
//! DESIGN
//! ======
//! Each `connect` / `handle` / `disconnect` call takes the hub lock, runs a
//! relay handler, and applies the resulting [`Outcome`] before releasing it.
//! That makes every connection event atomic with respect to every other: a
//! participant is never half-registered when someone else's broadcast goes
//! out.
//!
//! Delivery is best-effort `try_send`. A peer whose channel is full or closed
//! is skipped for that message; the hub never waits on a slow socket. Each
//! peer channel is FIFO and each connection feeds the hub sequentially, so
//! per-origin order is preserved at every receiver.

use std::collections::HashMap;

use frames::{ClientMessage, ParticipantId, ServerMessage};
use tokio::sync::Mutex;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, info, warn};

use super::relay::{self, Outcome};
use crate::registry::{Registry, random_color};

pub type PeerSender = mpsc::Sender<ServerMessage>;

struct HubInner {
    registry: Box<dyn Registry>,
    peers: HashMap<ParticipantId, PeerSender>,
}

pub struct Hub {
    inner: Mutex<HubInner>,
}

impl Hub {
    #[must_use]
    pub fn new(registry: Box<dyn Registry>) -> Self {
        Self {
            inner: Mutex::new(HubInner { registry, peers: HashMap::new() }),
        }
    }

    /// Register a connection and queue its welcome and snapshot on `tx`.
    pub async fn connect(&self, id: ParticipantId, tx: PeerSender) {
        let mut inner = self.inner.lock().await;
        inner.peers.insert(id, tx);
        let outcome = relay::on_connect(inner.registry.as_mut(), id, random_color());
        inner.deliver(id, outcome);
        info!(%id, participants = inner.registry.len(), "hub: participant joined");
    }

    pub async fn handle(&self, id: ParticipantId, message: ClientMessage) {
        let mut inner = self.inner.lock().await;
        let now = frames::now_ms();
        let registry = inner.registry.as_mut();
        let outcome = match message {
            ClientMessage::SetDisplayName { name } => relay::set_display_name(registry, id, &name),
            ClientMessage::Draw(segment) => relay::relay_draw(registry, id, segment),
            ClientMessage::Cursor(position) => relay::relay_cursor(registry, id, position),
            ClientMessage::ClearBoard => relay::relay_clear(registry, id),
            ClientMessage::Chat { text } => relay::relay_chat(registry, id, &text, now),
        };
        inner.deliver(id, outcome);
    }

    /// Drop the connection's channel, then tell the remaining peers.
    pub async fn disconnect(&self, id: ParticipantId) {
        let mut inner = self.inner.lock().await;
        inner.peers.remove(&id);
        let outcome = relay::on_disconnect(inner.registry.as_mut(), id);
        inner.deliver(id, outcome);
        info!(%id, participants = inner.registry.len(), "hub: participant left");
    }

    pub async fn participant_count(&self) -> usize {
        self.inner.lock().await.registry.len()
    }
}

impl HubInner {
    fn deliver(&self, origin: ParticipantId, outcome: Outcome) {
        match outcome {
            Outcome::Silent => {}
            Outcome::Reply(messages) => {
                if let Some(tx) = self.peers.get(&origin) {
                    for message in messages {
                        send(origin, tx, message);
                    }
                }
            }
            Outcome::BroadcastExcludeSender(messages) => {
                for message in messages {
                    for (peer, tx) in &self.peers {
                        if *peer != origin {
                            send(*peer, tx, message.clone());
                        }
                    }
                }
            }
            Outcome::Broadcast(message) => {
                for (peer, tx) in &self.peers {
                    send(*peer, tx, message.clone());
                }
            }
        }
    }
}

fn send(peer: ParticipantId, tx: &PeerSender, message: ServerMessage) {
    match tx.try_send(message) {
        Ok(()) => {}
        Err(TrySendError::Full(message)) => {
            warn!(%peer, syscall = message.syscall(), "hub: peer channel full, dropping message");
        }
        Err(TrySendError::Closed(_)) => {
            debug!(%peer, "hub: peer channel closed");
        }
    }
}

#[cfg(test)]
#[path = "hub_test.rs"]
mod tests;
