//! Conversation controller.
//!
//! Turns candidate inputs into persisted, translated rows. Each intake is
//! processed fully (credential check, audio dedup, translation, append,
//! event) before the call returns; the caller serializes intakes per session.

use std::sync::{Arc, OnceLock};

use medbridge_types::error::RepositoryError;
use medbridge_types::event::RoomEvent;
use medbridge_types::llm::LlmError;
use medbridge_types::message::{
    AUDIO_PLACEHOLDER, Message, NewMessage, RoomId, RoomSummary, TranscriptLine,
};
use thiserror::Error;
use tracing::{debug, info};

use super::search;
use super::session::{IgnoreReason, Intake, IntakeOutcome, SessionContext, SummaryOutcome};
use crate::event::RoomEventBus;
use crate::llm::fallback::TransportFactory;
use crate::oracle::{OracleSettings, SummaryOracle, TranslationOracle};
use crate::repository::message::MessageRepository;
use crate::service::credential::{Credential, CredentialSource};

#[derive(Debug, Error)]
pub enum ControllerError {
    /// No credential is attached; nothing was persisted.
    #[error("no API credential configured")]
    MissingCredential,

    #[error("storage error: {0}")]
    Storage(#[from] RepositoryError),

    /// The transports could not be built from the supplied credential.
    #[error("failed to initialize text-generation client: {0}")]
    TransportSetup(#[source] LlmError),
}

/// Oracles bound to one credential for the lifetime of the controller.
struct Oracles {
    translation: TranslationOracle,
    summary: SummaryOracle,
    source: CredentialSource,
}

/// Orchestrates intake, translation, persistence, and summaries.
///
/// Generic over `MessageRepository` so medbridge-core never depends on
/// medbridge-infra. Created without a credential; one can be attached later,
/// after which it is fixed for the controller's lifetime.
pub struct ConversationController<R: MessageRepository> {
    repo: R,
    factory: Box<dyn TransportFactory>,
    settings: OracleSettings,
    events: RoomEventBus,
    oracles: OnceLock<Oracles>,
}

impl<R: MessageRepository> ConversationController<R> {
    pub fn new(
        repo: R,
        factory: impl TransportFactory + 'static,
        settings: OracleSettings,
        events: RoomEventBus,
    ) -> Self {
        Self {
            repo,
            factory: Box::new(factory),
            settings,
            events,
            oracles: OnceLock::new(),
        }
    }

    /// Access the message repository.
    pub fn repo(&self) -> &R {
        &self.repo
    }

    pub fn events(&self) -> &RoomEventBus {
        &self.events
    }

    pub fn has_credential(&self) -> bool {
        self.oracles.get().is_some()
    }

    pub fn credential_source(&self) -> Option<&CredentialSource> {
        self.oracles.get().map(|o| &o.source)
    }

    /// Bind the oracles to `credential`.
    ///
    /// Returns `Ok(false)` if a credential was already attached; the first one
    /// stays in effect.
    pub fn attach_credential(&self, credential: &Credential) -> Result<bool, ControllerError> {
        if self.has_credential() {
            return Ok(false);
        }

        let chain = self
            .factory
            .build(credential.secret())
            .map_err(ControllerError::TransportSetup)?;
        let transports = chain.transport_names().join(" -> ");
        let chain = Arc::new(chain);
        let oracles = Oracles {
            translation: TranslationOracle::new(chain.clone(), self.settings.clone()),
            summary: SummaryOracle::new(chain, self.settings.clone()),
            source: credential.source().clone(),
        };

        let attached = self.oracles.set(oracles).is_ok();
        if attached {
            info!(source = %credential.source(), %transports, "credential attached");
        }
        Ok(attached)
    }

    fn oracles(&self) -> Result<&Oracles, ControllerError> {
        self.oracles.get().ok_or(ControllerError::MissingCredential)
    }

    /// Process one candidate input for the session.
    ///
    /// | typed text | new audio | persisted text       | has_audio |
    /// |------------|-----------|----------------------|-----------|
    /// | yes        | yes       | typed text           | true      |
    /// | yes        | no/dup    | typed text           | false     |
    /// | no         | yes       | `AUDIO_PLACEHOLDER`  | true      |
    /// | no         | no/dup    | nothing              |           |
    ///
    /// Without a credential the intake is rejected before the audio
    /// fingerprint is touched.
    #[tracing::instrument(
        name = "submit",
        skip(self, ctx, intake),
        fields(room = %ctx.room, role = %ctx.role)
    )]
    pub async fn submit(
        &self,
        ctx: &mut SessionContext,
        mut intake: Intake,
    ) -> Result<IntakeOutcome, ControllerError> {
        let text = intake.take_text();
        let audio = intake.take_audio();

        if text.is_none() && audio.is_none() {
            return Ok(IntakeOutcome::Ignored(IgnoreReason::NoInput));
        }

        let oracles = self.oracles()?;

        let new_audio = audio.and_then(|bytes| ctx.observe_audio(bytes));

        let (original_text, audio_bytes) = match (text, new_audio) {
            (Some(text), audio) => (text, audio),
            (None, Some(audio)) => (AUDIO_PLACEHOLDER.to_string(), Some(audio)),
            (None, None) => {
                debug!("audio already processed, ignoring");
                return Ok(IntakeOutcome::Ignored(IgnoreReason::DuplicateAudio));
            }
        };

        let translated_text = oracles
            .translation
            .translate(&original_text, ctx.role, &ctx.target_language)
            .await;

        let new_message = NewMessage {
            room_id: ctx.room.clone(),
            role: ctx.role,
            original_text,
            translated_text,
            target_language: ctx.target_language.clone(),
            has_audio: audio_bytes.is_some(),
            audio_bytes,
        };

        let message = self.repo.append(&new_message).await?;
        info!(
            message_id = message.id,
            has_audio = message.has_audio,
            "message persisted"
        );

        self.events.publish(RoomEvent::MessageAppended {
            room_id: message.room_id.clone(),
            message_id: message.id,
        });

        Ok(IntakeOutcome::Persisted(message))
    }

    /// Summarize a room's history.
    ///
    /// An empty room short-circuits to `NoHistory` without calling the oracle.
    #[tracing::instrument(name = "summarize_room", skip(self), fields(room = %room))]
    pub async fn summarize(&self, room: &RoomId) -> Result<SummaryOutcome, ControllerError> {
        let oracles = self.oracles()?;

        let messages = self.repo.list_by_room(room).await?;
        if messages.is_empty() {
            return Ok(SummaryOutcome::NoHistory);
        }

        let transcript: Vec<TranscriptLine> = messages.iter().map(TranscriptLine::from).collect();
        let summary = oracles.summary.summarize(&transcript).await;
        Ok(SummaryOutcome::Summary(summary))
    }

    /// The room's ordered history, optionally filtered by a search query.
    pub async fn history(
        &self,
        room: &RoomId,
        query: Option<&str>,
    ) -> Result<Vec<Message>, ControllerError> {
        let messages = self.repo.list_by_room(room).await?;
        Ok(search::filter(messages, query))
    }

    /// Every room with stored history.
    pub async fn rooms(&self) -> Result<Vec<RoomSummary>, ControllerError> {
        Ok(self.repo.list_rooms().await?)
    }
}
