//! Human-readable lines for `watch` output.

use canvas::presence::PresenceView;
use frames::{ParticipantId, ServerMessage};

/// Describe `message` for the terminal, or `None` for traffic not worth a
/// line (cursor moves). Call before the session applies the message so a
/// departing participant's name is still known.
#[must_use]
pub fn describe(message: &ServerMessage, presence: &PresenceView) -> Option<String> {
    match message {
        ServerMessage::Welcome { id, color } => Some(format!("connected as {id} ({color})")),
        ServerMessage::PresenceSnapshot(participants) => {
            let names: Vec<&str> = participants.iter().map(|p| p.display_name.as_str()).collect();
            Some(format!("{} online: {}", participants.len(), names.join(", ")))
        }
        ServerMessage::ParticipantUpdated(participant) => match presence.get(participant.id) {
            Some(known) if known.display_name != participant.display_name => Some(format!(
                "{} is now {}",
                known.display_name, participant.display_name
            )),
            Some(_) => None,
            None => Some(format!("{} joined", participant.display_name)),
        },
        ServerMessage::ParticipantLeft(id) => Some(format!("{} left", name(presence, *id))),
        ServerMessage::Draw { origin, segment } => Some(format!(
            "{} drew {:?} ({:.0}, {:.0}) to ({:.0}, {:.0}) in {}",
            name(presence, *origin),
            segment.tool,
            segment.from.x,
            segment.from.y,
            segment.to.x,
            segment.to.y,
            segment.color
        )),
        ServerMessage::ClearBoard { origin } => Some(format!("{} cleared the board", name(presence, *origin))),
        ServerMessage::Chat(chat) => Some(format!("<{}> {}", chat.display_name, chat.text)),
        ServerMessage::Cursor { .. } | ServerMessage::CursorRemoved(_) => None,
    }
}

fn name(presence: &PresenceView, id: ParticipantId) -> String {
    presence.label(id).unwrap_or_else(|| id.to_string())
}

#[cfg(test)]
#[path = "report_test.rs"]
mod tests;
