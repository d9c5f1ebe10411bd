//! Remote cursor overlay state.
//!
//! Cursors are upserted on every relayed cursor event and aged lazily: a
//! cursor whose last update is more than [`CURSOR_TTL_MS`] old is simply not
//! returned by [`RemoteCursors::visible`]. An explicit leave removes it at
//! once.
//!
//! [`RemoteCursors::marks`] lays the visible cursors out for the overlay: a
//! dot at the pointer and the participant's name beside it.

#[cfg(test)]
#[path = "cursors_test.rs"]
mod cursors_test;

use std::collections::HashMap;

use frames::ParticipantId;

use crate::consts::{CURSOR_DOT_RADIUS, CURSOR_LABEL_OFFSET, CURSOR_TTL_MS};
use crate::surface::Point;

/// Last known pointer of another participant.
#[derive(Clone, Debug, PartialEq)]
pub struct RemoteCursor {
    pub participant_id: ParticipantId,
    pub position: Point,
    pub color: String,
    pub display_name: String,
    pub last_seen_ms: i64,
}

impl RemoteCursor {
    /// Still inside the TTL window at `now_ms`.
    #[must_use]
    pub fn is_fresh(&self, now_ms: i64) -> bool {
        now_ms - self.last_seen_ms <= CURSOR_TTL_MS
    }
}

/// One cursor as the overlay paints it.
#[derive(Clone, Debug, PartialEq)]
pub struct CursorMark<'a> {
    pub center: Point,
    pub radius: f64,
    pub label: &'a str,
    /// Baseline origin of the label.
    pub label_at: Point,
    pub color: &'a str,
}

/// Remote cursors keyed by participant.
#[derive(Clone, Debug, Default)]
pub struct RemoteCursors {
    cursors: HashMap<ParticipantId, RemoteCursor>,
}

impl RemoteCursors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or refresh a cursor.
    pub fn upsert(
        &mut self,
        participant_id: ParticipantId,
        position: Point,
        color: String,
        display_name: String,
        now_ms: i64,
    ) {
        self.cursors.insert(
            participant_id,
            RemoteCursor {
                participant_id,
                position,
                color,
                display_name,
                last_seen_ms: now_ms,
            },
        );
    }

    /// Drop a cursor regardless of age.
    pub fn remove(&mut self, participant_id: ParticipantId) -> bool {
        self.cursors.remove(&participant_id).is_some()
    }

    /// Cursors to draw at `now_ms`, ordered by participant id for stable
    /// paint order.
    #[must_use]
    pub fn visible(&self, now_ms: i64) -> Vec<&RemoteCursor> {
        let mut out: Vec<_> = self
            .cursors
            .values()
            .filter(|c| c.is_fresh(now_ms))
            .collect();
        out.sort_by_key(|c| c.participant_id);
        out
    }

    /// Overlay layout for [`RemoteCursors::visible`], in the same order.
    #[must_use]
    pub fn marks(&self, now_ms: i64) -> Vec<CursorMark<'_>> {
        let (dx, dy) = CURSOR_LABEL_OFFSET;
        self.visible(now_ms)
            .into_iter()
            .map(|c| CursorMark {
                center: c.position,
                radius: CURSOR_DOT_RADIUS,
                label: &c.display_name,
                label_at: Point::new(c.position.x + dx, c.position.y + dy),
                color: &c.color,
            })
            .collect()
    }

    /// Forget stale cursors. Visibility does not depend on this; it only
    /// bounds memory.
    pub fn prune(&mut self, now_ms: i64) {
        self.cursors.retain(|_, c| c.is_fresh(now_ms));
    }

    pub fn clear(&mut self) {
        self.cursors.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cursors.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cursors.is_empty()
    }
}
