//! Room events broadcast after store mutations.
//!
//! All variants are Clone + Send + Sync for use with tokio broadcast channels.

use serde::{Deserialize, Serialize};

use crate::message::RoomId;

/// Events emitted by the conversation controller.
///
/// Subscribers (the interactive chat view, REST watchers) use these to
/// refresh their rendering of a room's log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RoomEvent {
    /// A new row was appended to the room's history.
    MessageAppended { room_id: RoomId, message_id: i64 },
}

impl RoomEvent {
    /// The room this event belongs to.
    pub fn room_id(&self) -> &RoomId {
        match self {
            RoomEvent::MessageAppended { room_id, .. } => room_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_event_serde_tag() {
        let event = RoomEvent::MessageAppended {
            room_id: RoomId::from("Room-1"),
            message_id: 7,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "message_appended");
        assert_eq!(json["room_id"], "Room-1");
        assert_eq!(json["message_id"], 7);
        assert_eq!(event.room_id().as_str(), "Room-1");
    }
}
