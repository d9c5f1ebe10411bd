//! Client-side chat log: the most recent [`CHAT_HISTORY_LIMIT`] messages.

#[cfg(test)]
#[path = "chat_test.rs"]
mod chat_test;

use std::collections::VecDeque;

use frames::{ChatMessage, ParticipantId};

use crate::consts::CHAT_HISTORY_LIMIT;

#[derive(Clone, Debug)]
pub struct ChatLog {
    messages: VecDeque<ChatMessage>,
    limit: usize,
}

impl Default for ChatLog {
    fn default() -> Self {
        Self::with_limit(CHAT_HISTORY_LIMIT)
    }
}

impl ChatLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_limit(limit: usize) -> Self {
        Self {
            messages: VecDeque::with_capacity(limit.min(CHAT_HISTORY_LIMIT)),
            limit,
        }
    }

    /// Append, evicting the oldest once full. Duplicate ids are ignored.
    pub fn push(&mut self, message: ChatMessage) {
        if self.limit == 0 || self.messages.iter().any(|m| m.id == message.id) {
            return;
        }
        while self.messages.len() >= self.limit {
            self.messages.pop_front();
        }
        self.messages.push_back(message);
    }

    /// Oldest first.
    pub fn messages(&self) -> impl Iterator<Item = &ChatMessage> {
        self.messages.iter()
    }

    #[must_use]
    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.back()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Whether `message` was sent by `me`.
    #[must_use]
    pub fn is_own(message: &ChatMessage, me: Option<ParticipantId>) -> bool {
        me == Some(message.participant_id)
    }
}
