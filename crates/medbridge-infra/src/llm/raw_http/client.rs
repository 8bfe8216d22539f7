//! RawHttpProvider -- concrete [`LlmProvider`] over a bare HTTP POST.
//!
//! Sends the chat-completions payload straight to a full endpoint URL with
//! bearer authentication. The API key is wrapped in [`SecretString`] and is
//! only exposed when building the `Authorization` header.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

use medbridge_core::llm::provider::LlmProvider;
use medbridge_types::llm::{CompletionRequest, CompletionResponse, LlmError, Usage};

use super::types::{ChatMessage, ChatRequest, ChatResponse};

/// Raw HTTP fallback transport.
///
/// Does NOT derive Debug; the API key must never reach log output.
pub struct RawHttpProvider {
    client: reqwest::Client,
    api_key: SecretString,
    endpoint: String,
    model: String,
}

impl RawHttpProvider {
    /// Create a transport posting to `endpoint` (a complete URL, not a base).
    pub fn new(
        api_key: SecretString,
        endpoint: String,
        model: String,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlmError::Transport(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key,
            endpoint,
            model,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Flatten a [`CompletionRequest`] into the wire payload, system prompt first.
    fn to_chat_request(&self, request: &CompletionRequest) -> ChatRequest {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = &request.system {
            messages.push(ChatMessage {
                role: "system".to_string(),
                content: system.clone(),
            });
        }
        messages.push(ChatMessage {
            role: "user".to_string(),
            content: request.prompt.clone(),
        });

        ChatRequest {
            model: if request.model.is_empty() {
                self.model.clone()
            } else {
                request.model.clone()
            },
            messages,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        }
    }
}

impl LlmProvider for RawHttpProvider {
    fn name(&self) -> &str {
        "raw_http"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let body = self.to_chat_request(request);

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(self.api_key.expose_secret())
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Transport(format!("HTTP request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .map(str::to_owned);
            let error_body = response.text().await.unwrap_or_default();
            return Err(classify_status(
                status.as_u16(),
                retry_after.as_deref(),
                error_body,
            ));
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Deserialization(format!("failed to parse response: {e}")))?;

        let content = chat
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| {
                LlmError::Deserialization("response contained no message content".to_string())
            })?;

        let usage = chat
            .usage
            .map(|u| Usage {
                input_tokens: u.prompt_tokens,
                output_tokens: u.completion_tokens,
            })
            .unwrap_or_default();

        Ok(CompletionResponse {
            id: chat.id,
            content,
            model: if chat.model.is_empty() {
                body.model
            } else {
                chat.model
            },
            usage,
        })
    }
}

/// Classify a non-success HTTP status into an [`LlmError`].
fn classify_status(status: u16, retry_after: Option<&str>, body: String) -> LlmError {
    match status {
        401 | 403 => LlmError::AuthenticationFailed,
        402 => LlmError::QuotaExceeded { detail: body },
        429 => LlmError::RateLimited {
            retry_after_ms: retry_after
                .and_then(|v| v.trim().parse::<u64>().ok())
                .map(|secs| secs * 1000),
        },
        503 | 529 => LlmError::Overloaded(body),
        _ => LlmError::Http { status, body },
    }
}
