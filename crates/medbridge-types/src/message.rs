//! Conversation message types for MedBridge.
//!
//! A `Message` is one persisted conversation turn inside a room. Rows are
//! written once and never updated; the store assigns `id` and `timestamp`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

/// Placeholder stored as the original text of an audio-only turn.
///
/// The translation oracle passes it through unchanged.
pub const AUDIO_PLACEHOLDER: &str = "[Audio Message Attached]";

/// Who is speaking in a conversation turn.
///
/// Stored in the `role` column as `"Doctor"` / `"Patient"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpeakerRole {
    #[serde(alias = "doctor")]
    Doctor,
    #[serde(alias = "patient")]
    Patient,
}

impl SpeakerRole {
    /// The other participant of the two-party conversation.
    pub fn counterpart(self) -> Self {
        match self {
            SpeakerRole::Doctor => SpeakerRole::Patient,
            SpeakerRole::Patient => SpeakerRole::Doctor,
        }
    }
}

impl Default for SpeakerRole {
    fn default() -> Self {
        SpeakerRole::Doctor
    }
}

impl fmt::Display for SpeakerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpeakerRole::Doctor => write!(f, "Doctor"),
            SpeakerRole::Patient => write!(f, "Patient"),
        }
    }
}

impl FromStr for SpeakerRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "doctor" => Ok(SpeakerRole::Doctor),
            "patient" => Ok(SpeakerRole::Patient),
            other => Err(format!("invalid speaker role: '{other}'")),
        }
    }
}

/// Opaque partition key for one isolated conversation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(pub String);

impl RoomId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RoomId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for RoomId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A persisted conversation turn.
///
/// Ordered within a room by `timestamp` ascending, ties broken by `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Store-assigned, strictly increasing, never reused.
    pub id: i64,
    pub room_id: RoomId,
    pub role: SpeakerRole,
    pub original_text: String,
    /// Oracle output, or the oracle's error text when translation failed.
    pub translated_text: String,
    /// Target language in effect when this row was written.
    pub target_language: String,
    pub has_audio: bool,
    /// Raw bytes of the single recorded clip (only when `has_audio`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_bytes: Option<Vec<u8>>,
    /// Insert time assigned by the store.
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Whether this turn carries a playable audio clip.
    pub fn has_playable_audio(&self) -> bool {
        self.has_audio && self.audio_bytes.as_ref().is_some_and(|b| !b.is_empty())
    }

    /// Whether the original text is the audio-only placeholder.
    pub fn is_audio_only(&self) -> bool {
        self.original_text == AUDIO_PLACEHOLDER
    }
}

/// The caller-supplied fields of a single insert.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMessage {
    pub room_id: RoomId,
    pub role: SpeakerRole,
    pub original_text: String,
    pub translated_text: String,
    pub target_language: String,
    pub has_audio: bool,
    pub audio_bytes: Option<Vec<u8>>,
}

/// One line of a transcript handed to the summary oracle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptLine {
    pub role: SpeakerRole,
    pub text: String,
}

impl From<&Message> for TranscriptLine {
    fn from(message: &Message) -> Self {
        Self {
            role: message.role,
            text: message.original_text.clone(),
        }
    }
}

/// Summary of one room for listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomSummary {
    pub room_id: RoomId,
    pub message_count: u64,
    pub last_activity: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speaker_role_roundtrip() {
        for role in [SpeakerRole::Doctor, SpeakerRole::Patient] {
            let parsed: SpeakerRole = role.to_string().parse().unwrap();
            assert_eq!(role, parsed);
        }
    }

    #[test]
    fn test_speaker_role_parse_is_case_insensitive() {
        assert_eq!("PATIENT".parse::<SpeakerRole>().unwrap(), SpeakerRole::Patient);
        assert_eq!(" doctor ".parse::<SpeakerRole>().unwrap(), SpeakerRole::Doctor);
        assert!("nurse".parse::<SpeakerRole>().is_err());
    }

    #[test]
    fn test_speaker_role_serde_matches_stored_text() {
        let json = serde_json::to_string(&SpeakerRole::Doctor).unwrap();
        assert_eq!(json, "\"Doctor\"");
        let parsed: SpeakerRole = serde_json::from_str("\"patient\"").unwrap();
        assert_eq!(parsed, SpeakerRole::Patient);
    }

    #[test]
    fn test_counterpart() {
        assert_eq!(SpeakerRole::Doctor.counterpart(), SpeakerRole::Patient);
        assert_eq!(SpeakerRole::Patient.counterpart(), SpeakerRole::Doctor);
    }

    #[test]
    fn test_room_id_serializes_transparently() {
        let room = RoomId::from("Room-1");
        assert_eq!(serde_json::to_string(&room).unwrap(), "\"Room-1\"");
        assert_eq!(room.to_string(), "Room-1");
    }

    #[test]
    fn test_message_audio_helpers() {
        let message = Message {
            id: 1,
            room_id: RoomId::from("Room-1"),
            role: SpeakerRole::Patient,
            original_text: AUDIO_PLACEHOLDER.to_string(),
            translated_text: AUDIO_PLACEHOLDER.to_string(),
            target_language: "English".to_string(),
            has_audio: true,
            audio_bytes: Some(vec![1, 2]),
            timestamp: Utc::now(),
        };
        assert!(message.is_audio_only());
        assert!(message.has_playable_audio());

        let silent = Message {
            has_audio: false,
            audio_bytes: None,
            ..message
        };
        assert!(!silent.has_playable_audio());
    }
}
