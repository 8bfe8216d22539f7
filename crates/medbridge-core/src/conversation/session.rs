//! Explicit per-session state and the intake/outcome types of the controller.

use medbridge_types::message::{Message, RoomId, SpeakerRole};

/// State owned by one interaction loop and passed into every controller call.
///
/// `last_processed_audio` is the raw-byte fingerprint of the most recent clip
/// that was handled; only the controller updates it.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionContext {
    pub room: RoomId,
    pub role: SpeakerRole,
    pub target_language: String,
    last_processed_audio: Option<Vec<u8>>,
}

impl SessionContext {
    pub fn new(room: RoomId, role: SpeakerRole, target_language: impl Into<String>) -> Self {
        Self {
            room,
            role,
            target_language: target_language.into(),
            last_processed_audio: None,
        }
    }

    pub fn last_processed_audio(&self) -> Option<&[u8]> {
        self.last_processed_audio.as_deref()
    }

    /// Record `audio` as the current fingerprint.
    ///
    /// Returns the bytes back when they differ from the previous fingerprint,
    /// `None` when they are a byte-identical redelivery.
    pub(crate) fn observe_audio(&mut self, audio: Vec<u8>) -> Option<Vec<u8>> {
        if self.last_processed_audio.as_deref() == Some(audio.as_slice()) {
            return None;
        }
        self.last_processed_audio = Some(audio.clone());
        Some(audio)
    }
}

/// One candidate input: optional typed text and an optional recorded clip.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Intake {
    pub typed_text: Option<String>,
    pub audio: Option<Vec<u8>>,
}

impl Intake {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            typed_text: Some(text.into()),
            audio: None,
        }
    }

    pub fn audio(bytes: Vec<u8>) -> Self {
        Self {
            typed_text: None,
            audio: Some(bytes),
        }
    }

    pub fn with_audio(mut self, bytes: Vec<u8>) -> Self {
        self.audio = Some(bytes);
        self
    }

    /// Typed text exactly as entered; whitespace-only counts as absent.
    pub(crate) fn take_text(&mut self) -> Option<String> {
        self.typed_text.take().filter(|t| !t.trim().is_empty())
    }

    /// Recorded bytes; a zero-length clip counts as absent.
    pub(crate) fn take_audio(&mut self) -> Option<Vec<u8>> {
        self.audio.take().filter(|a| !a.is_empty())
    }
}

/// Why an intake produced no row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Neither text nor audio was offered.
    NoInput,
    /// Only audio was offered and it matched the last processed clip.
    DuplicateAudio,
}

impl IgnoreReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            IgnoreReason::NoInput => "no_input",
            IgnoreReason::DuplicateAudio => "duplicate_audio",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum IntakeOutcome {
    Persisted(Message),
    Ignored(IgnoreReason),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummaryOutcome {
    /// The room has no rows; the oracle was not called.
    NoHistory,
    Summary(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_observe_audio_dedups_identical_bytes() {
        let mut ctx = SessionContext::new(RoomId::from("Room-1"), SpeakerRole::Patient, "English");
        assert_eq!(ctx.observe_audio(vec![1, 2]), Some(vec![1, 2]));
        assert_eq!(ctx.observe_audio(vec![1, 2]), None);
        assert_eq!(ctx.observe_audio(vec![3]), Some(vec![3]));
        assert_eq!(ctx.last_processed_audio(), Some(&[3u8][..]));
    }

    #[test]
    fn test_typed_text_kept_verbatim() {
        assert_eq!(Intake::text("  hi \n").take_text().as_deref(), Some("  hi \n"));
        assert_eq!(Intake::text(" \n\t ").take_text(), None);
        assert_eq!(Intake::default().take_text(), None);
    }

    #[test]
    fn test_empty_audio_counts_as_absent() {
        let mut intake = Intake::audio(Vec::new());
        assert_eq!(intake.take_audio(), None);
    }
}
