//! Translation oracle.
//!
//! Turns one utterance into the target language, speaking as a medical
//! interpreter. The audio-only placeholder passes through untouched.

use std::sync::Arc;

use medbridge_types::message::{AUDIO_PLACEHOLDER, SpeakerRole};

use super::{OracleSettings, complete_text, describe_failure};
use crate::llm::fallback::TransportChain;

fn system_prompt(role: SpeakerRole, target_language: &str) -> String {
    format!(
        "You are a professional medical interpreter. Translate the {role}'s input into \
         {target_language}. Use natural, spoken language that an ordinary person would use. \
         Avoid poetic, formal, or financial vocabulary (for example, do not use 'giravat' \
         for an upset stomach). Output ONLY the translation."
    )
}

/// Credential-bound translator.
#[derive(Debug, Clone)]
pub struct TranslationOracle {
    transports: Arc<TransportChain>,
    settings: OracleSettings,
}

impl TranslationOracle {
    pub fn new(transports: Arc<TransportChain>, settings: OracleSettings) -> Self {
        Self {
            transports,
            settings,
        }
    }

    /// Translate `text` spoken by `role` into `target_language`.
    ///
    /// Never fails: a transport error comes back as its rendered description.
    #[tracing::instrument(
        name = "translate",
        skip(self, text),
        fields(role = %role, target_language = %target_language, chars = text.len())
    )]
    pub async fn translate(&self, text: &str, role: SpeakerRole, target_language: &str) -> String {
        if text == AUDIO_PLACEHOLDER {
            return text.to_string();
        }

        match complete_text(
            &self.transports,
            &self.settings,
            "translate",
            system_prompt(role, target_language),
            text.to_string(),
        )
        .await
        {
            Ok(translation) => translation,
            Err(err) => {
                tracing::warn!(error = %err, "translation failed, storing error text");
                describe_failure(&err)
            }
        }
    }
}
