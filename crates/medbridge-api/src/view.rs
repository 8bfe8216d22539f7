//! Serializable views shared by `--json` output and the REST API.
//!
//! Audio bytes travel as base64; the raw `Vec<u8>` never reaches JSON.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::{DateTime, Utc};
use serde::Serialize;

use medbridge_core::conversation::search::{self, HighlightStyle};
use medbridge_core::conversation::{IntakeOutcome, SummaryOutcome};
use medbridge_types::message::{Message, RoomId, SpeakerRole};

#[derive(Debug, Serialize)]
pub struct MessageView {
    pub id: i64,
    pub room_id: RoomId,
    pub role: SpeakerRole,
    pub original_text: String,
    pub translated_text: String,
    pub target_language: String,
    pub has_audio: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_base64: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl MessageView {
    /// Build a view, optionally embedding the audio clip.
    pub fn new(message: Message, include_audio: bool) -> Self {
        let audio_base64 = if include_audio {
            message
                .audio_bytes
                .as_deref()
                .filter(|bytes| !bytes.is_empty())
                .map(|bytes| BASE64.encode(bytes))
        } else {
            None
        };

        Self {
            id: message.id,
            room_id: message.room_id,
            role: message.role,
            original_text: message.original_text,
            translated_text: message.translated_text,
            target_language: message.target_language,
            has_audio: message.has_audio,
            audio_base64,
            timestamp: message.timestamp,
        }
    }

    /// Wrap query matches in both text fields.
    pub fn highlighted(mut self, query: &str, style: HighlightStyle<'_>) -> Self {
        self.original_text = search::highlight(&self.original_text, query, style).into_owned();
        self.translated_text = search::highlight(&self.translated_text, query, style).into_owned();
        self
    }
}

/// Result of one intake.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum IntakeView {
    Persisted { message: MessageView },
    Ignored { reason: &'static str },
}

impl IntakeView {
    pub fn new(outcome: IntakeOutcome, include_audio: bool) -> Self {
        match outcome {
            IntakeOutcome::Persisted(message) => IntakeView::Persisted {
                message: MessageView::new(message, include_audio),
            },
            IntakeOutcome::Ignored(reason) => IntakeView::Ignored {
                reason: reason.as_str(),
            },
        }
    }
}

/// Result of a summary request.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SummaryView {
    Summary { summary: String },
    NoHistory,
}

impl From<SummaryOutcome> for SummaryView {
    fn from(outcome: SummaryOutcome) -> Self {
        match outcome {
            SummaryOutcome::Summary(summary) => SummaryView::Summary { summary },
            SummaryOutcome::NoHistory => SummaryView::NoHistory,
        }
    }
}
