//! LLM request/response types for MedBridge.
//!
//! These types model the data shapes exchanged with the text-generation
//! service: chat-completion requests, responses, usage, and classified errors.

use serde::{Deserialize, Serialize};

/// Request to the text-generation service for a single completion.
///
/// Every call is one exchange: an optional system instruction followed by a
/// single user turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    /// Content of the user turn.
    pub prompt: String,
    pub max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
}

/// Response from the text-generation service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    pub id: String,
    pub content: String,
    pub model: String,
    pub usage: Usage,
}

/// Token usage for a completion request/response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// Errors from text-generation transports.
///
/// The oracles never propagate these; they are rendered into displayable
/// text instead.
#[derive(Debug, Clone, thiserror::Error)]
pub enum LlmError {
    #[error("provider error: {message}")]
    Provider { message: String },

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("quota exhausted: {detail}")]
    QuotaExceeded { detail: String },

    #[error("rate limited (retry after {retry_after_ms:?}ms)")]
    RateLimited { retry_after_ms: Option<u64> },

    #[error("provider overloaded: {0}")]
    Overloaded(String),

    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("transport error: {0}")]
    Transport(String),

    #[error("deserialization error: {0}")]
    Deserialization(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl LlmError {
    /// Whether a failure of the preferred transport should be retried on the
    /// lower-level transport.
    ///
    /// Only locally rejected requests are excluded: the same request would be
    /// rejected again.
    pub fn warrants_fallback(&self) -> bool {
        !matches!(self, LlmError::InvalidRequest(_))
    }
}
