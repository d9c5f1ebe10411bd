//! Presence view model: the client's mirror of the server registry.
//!
//! The server is authoritative. This view replaces its contents on every
//! snapshot and applies incremental updates in between. The server does not
//! echo a rename back to its origin, so the local user's own rename is applied
//! here directly.

#[cfg(test)]
#[path = "presence_test.rs"]
mod presence_test;

use std::collections::HashMap;

use frames::{Participant, ParticipantId};

/// Suffix appended to the local participant's label.
pub const SELF_SUFFIX: &str = " (you)";

#[derive(Clone, Debug, Default)]
pub struct PresenceView {
    participants: HashMap<ParticipantId, Participant>,
    self_id: Option<ParticipantId>,
    self_color: Option<String>,
}

impl PresenceView {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record who we are, from the server's welcome.
    pub fn set_self(&mut self, id: ParticipantId, color: String) {
        self.self_id = Some(id);
        self.self_color = Some(color);
    }

    #[must_use]
    pub fn self_id(&self) -> Option<ParticipantId> {
        self.self_id
    }

    #[must_use]
    pub fn self_color(&self) -> Option<&str> {
        self.self_color.as_deref()
    }

    #[must_use]
    pub fn is_self(&self, id: ParticipantId) -> bool {
        self.self_id == Some(id)
    }

    /// Replace everything with a full registry snapshot.
    pub fn apply_snapshot(&mut self, participants: Vec<Participant>) {
        self.participants = participants.into_iter().map(|p| (p.id, p)).collect();
    }

    /// Insert or replace one participant.
    pub fn apply_updated(&mut self, participant: Participant) {
        self.participants.insert(participant.id, participant);
    }

    pub fn apply_left(&mut self, id: ParticipantId) -> Option<Participant> {
        self.participants.remove(&id)
    }

    /// Apply the local user's own rename, which the server won't echo.
    pub fn rename_self(&mut self, display_name: &str) {
        let Some(id) = self.self_id else {
            return;
        };
        if let Some(me) = self.participants.get_mut(&id) {
            me.display_name = display_name.to_owned();
        }
    }

    #[must_use]
    pub fn get(&self, id: ParticipantId) -> Option<&Participant> {
        self.participants.get(&id)
    }

    /// Everyone, the local participant first, then by name and id.
    #[must_use]
    pub fn participants(&self) -> Vec<&Participant> {
        let mut out: Vec<_> = self.participants.values().collect();
        out.sort_by(|a, b| {
            self.is_self(b.id)
                .cmp(&self.is_self(a.id))
                .then_with(|| a.display_name.cmp(&b.display_name))
                .then_with(|| a.id.cmp(&b.id))
        });
        out
    }

    /// Display label, with [`SELF_SUFFIX`] for the local participant.
    #[must_use]
    pub fn label(&self, id: ParticipantId) -> Option<String> {
        let p = self.participants.get(&id)?;
        if self.is_self(id) {
            Some(format!("{}{SELF_SUFFIX}", p.display_name))
        } else {
            Some(p.display_name.clone())
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.participants.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    /// Forget everything, including who we are. Used on disconnect.
    pub fn clear(&mut self) {
        self.participants.clear();
        self.self_id = None;
        self.self_color = None;
    }
}
