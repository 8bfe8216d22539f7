//! LlmProvider trait definition.
//!
//! This is the core abstraction that every text-generation transport
//! implements. Uses RPITIT for `complete`.

use medbridge_types::llm::{CompletionRequest, CompletionResponse, LlmError};

/// Trait for text-generation transports (client library, raw HTTP).
///
/// Uses native async fn in traits (RPITIT, Rust 2024 edition).
///
/// Implementations live in medbridge-infra (e.g., `OpenAiCompatibleProvider`).
pub trait LlmProvider: Send + Sync {
    /// Human-readable transport name (e.g., "openai_compatible", "raw_http").
    fn name(&self) -> &str;

    /// Send a completion request and receive the full response.
    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl std::future::Future<Output = Result<CompletionResponse, LlmError>> + Send;
}
