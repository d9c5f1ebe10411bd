//! Session registry: who is connected right now.
//!
//! DESIGN
//! ======
//! The registry is a trait so the hub can be built over any store; the only
//! production implementation is in-memory. There is no persistence: a server
//! restart forgets everyone and every reconnect is a fresh join.

use std::collections::BTreeMap;

use frames::{Participant, ParticipantId};
use rand::Rng;

pub trait Registry: Send {
    /// Insert or replace a participant.
    fn add(&mut self, participant: Participant);
    fn remove(&mut self, id: ParticipantId) -> Option<Participant>;
    /// Replace an existing participant. Returns `false` if `id` is unknown.
    fn update(&mut self, participant: Participant) -> bool;
    fn get(&self, id: ParticipantId) -> Option<&Participant>;
    /// All participants, ordered by id.
    fn list(&self) -> Vec<Participant>;
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Default)]
pub struct InMemoryRegistry {
    participants: BTreeMap<ParticipantId, Participant>,
}

impl InMemoryRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Registry for InMemoryRegistry {
    fn add(&mut self, participant: Participant) {
        self.participants.insert(participant.id, participant);
    }

    fn remove(&mut self, id: ParticipantId) -> Option<Participant> {
        self.participants.remove(&id)
    }

    fn update(&mut self, participant: Participant) -> bool {
        match self.participants.get_mut(&participant.id) {
            Some(slot) => {
                *slot = participant;
                true
            }
            None => false,
        }
    }

    fn get(&self, id: ParticipantId) -> Option<&Participant> {
        self.participants.get(&id)
    }

    fn list(&self) -> Vec<Participant> {
        self.participants.values().cloned().collect()
    }

    fn len(&self) -> usize {
        self.participants.len()
    }
}

/// A random saturated color, `hsl(<0..360>, 70%, 50%)`.
#[must_use]
pub fn random_color() -> String {
    let hue: u16 = rand::rng().random_range(0..360);
    format!("hsl({hue}, 70%, 50%)")
}

#[cfg(test)]
#[path = "registry_test.rs"]
mod tests;
