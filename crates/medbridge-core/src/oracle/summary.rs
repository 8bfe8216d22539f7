//! Summary oracle.
//!
//! Condenses a room transcript into a four-section clinical synthesis.

use std::sync::Arc;

use medbridge_types::message::TranscriptLine;

use super::{OracleSettings, complete_text, describe_failure};
use crate::llm::fallback::TransportChain;

const SUMMARY_SYSTEM_PROMPT: &str = "Summarize the following Doctor-Patient conversation. \
Format output with headers: 1. Symptoms, 2. Diagnoses, 3. Medications, 4. Follow-up Actions.";

/// Render transcript lines as the `"{role}: {text}"` document sent to the model.
pub fn render_transcript(lines: &[TranscriptLine]) -> String {
    lines
        .iter()
        .map(|line| format!("{}: {}", line.role, line.text))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Credential-bound summarizer.
#[derive(Debug, Clone)]
pub struct SummaryOracle {
    transports: Arc<TransportChain>,
    settings: OracleSettings,
}

impl SummaryOracle {
    pub fn new(transports: Arc<TransportChain>, settings: OracleSettings) -> Self {
        Self {
            transports,
            settings,
        }
    }

    /// Summarize a non-empty transcript.
    ///
    /// Never fails: a transport error comes back as its rendered description.
    #[tracing::instrument(name = "summarize", skip(self, lines), fields(lines = lines.len()))]
    pub async fn summarize(&self, lines: &[TranscriptLine]) -> String {
        match complete_text(
            &self.transports,
            &self.settings,
            "summarize",
            SUMMARY_SYSTEM_PROMPT.to_string(),
            render_transcript(lines),
        )
        .await
        {
            Ok(summary) => summary,
            Err(err) => {
                tracing::warn!(error = %err, "summary failed");
                describe_failure(&err)
            }
        }
    }
}
