//! Text-generation oracles.
//!
//! Both oracles share one credential-bound `TransportChain` and the same
//! failure policy: transport errors are never propagated, they are rendered
//! into displayable text and returned in place of the generated output.

pub mod summary;
pub mod translation;

use medbridge_types::config::GlobalConfig;
use medbridge_types::llm::{CompletionRequest, LlmError};
use tracing::{Instrument, info_span};

use crate::llm::fallback::TransportChain;

pub use summary::SummaryOracle;
pub use translation::TranslationOracle;

/// Request parameters shared by every oracle call.
#[derive(Debug, Clone, PartialEq)]
pub struct OracleSettings {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f64,
}

impl Default for OracleSettings {
    fn default() -> Self {
        Self::from(&GlobalConfig::default())
    }
}

impl From<&GlobalConfig> for OracleSettings {
    fn from(config: &GlobalConfig) -> Self {
        Self {
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        }
    }
}

/// Render a transport failure as the text stored or shown in place of output.
pub fn describe_failure(err: &LlmError) -> String {
    match err {
        LlmError::QuotaExceeded { .. } => {
            "Error: Free Tier Limit Reached (402). Try a new API token.".to_string()
        }
        LlmError::RateLimited { .. } => {
            "Error: Rate limit exceeded (429). Please wait and try again.".to_string()
        }
        LlmError::Http { status, body } => format!("API Error {status}: {body}"),
        LlmError::AuthenticationFailed => {
            "API Error 401: authentication failed, check the API token".to_string()
        }
        LlmError::Overloaded(detail) => format!("API Error 503: {detail}"),
        LlmError::Provider { message } => format!("API Error: {message}"),
        LlmError::Transport(detail)
        | LlmError::Deserialization(detail)
        | LlmError::InvalidRequest(detail) => format!("Critical Error: {detail}"),
    }
}

/// Send one system + user exchange through the chain inside a GenAI span.
async fn complete_text(
    transports: &TransportChain,
    settings: &OracleSettings,
    operation: &'static str,
    system: String,
    user: String,
) -> Result<String, LlmError> {
    let request = CompletionRequest {
        model: settings.model.clone(),
        system: Some(system),
        prompt: user,
        max_tokens: settings.max_tokens,
        temperature: Some(settings.temperature),
    };

    let span = info_span!(
        "gen_ai.complete",
        gen_ai.operation.name = operation,
        gen_ai.request.model = %request.model,
        gen_ai.request.max_tokens = request.max_tokens,
        gen_ai.request.temperature = ?request.temperature,
        gen_ai.response.id = tracing::field::Empty,
        gen_ai.usage.input_tokens = tracing::field::Empty,
        gen_ai.usage.output_tokens = tracing::field::Empty,
    );

    let response = transports
        .complete(&request)
        .instrument(span.clone())
        .await?;
    span.record("gen_ai.response.id", response.id.as_str());
    span.record("gen_ai.usage.input_tokens", response.usage.input_tokens);
    span.record("gen_ai.usage.output_tokens", response.usage.output_tokens);
    Ok(response.content.trim().to_string())
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted transport shared by oracle and controller tests.

    use std::collections::VecDeque;
    use std::future::Future;
    use std::sync::{Arc, Mutex};

    use medbridge_types::llm::{CompletionRequest, CompletionResponse, LlmError, Usage};

    use crate::llm::box_provider::BoxLlmProvider;
    use crate::llm::fallback::TransportChain;
    use crate::llm::provider::LlmProvider;

    /// Replays queued results and records every request it receives.
    /// An empty queue answers with `"translated: {prompt}"`.
    #[derive(Clone, Default)]
    pub struct ScriptedTransport {
        pub requests: Arc<Mutex<Vec<CompletionRequest>>>,
        script: Arc<Mutex<VecDeque<Result<String, LlmError>>>>,
    }

    impl ScriptedTransport {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn push(&self, result: Result<String, LlmError>) {
            self.script.lock().unwrap().push_back(result);
        }

        pub fn request_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }

        pub fn chain(&self) -> TransportChain {
            TransportChain::new(BoxLlmProvider::new(self.clone()))
        }
    }

    impl LlmProvider for ScriptedTransport {
        fn name(&self) -> &str {
            "scripted"
        }

        fn complete(
            &self,
            request: &CompletionRequest,
        ) -> impl Future<Output = Result<CompletionResponse, LlmError>> + Send {
            self.requests.lock().unwrap().push(request.clone());
            let next = self.script.lock().unwrap().pop_front();
            let prompt = request.prompt.clone();
            async move {
                let content = match next {
                    Some(result) => result?,
                    None => format!("translated: {prompt}"),
                };
                Ok(CompletionResponse {
                    id: "resp-scripted".to_string(),
                    content,
                    model: "scripted-model".to_string(),
                    usage: Usage::default(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_quota() {
        let text = describe_failure(&LlmError::QuotaExceeded {
            detail: "payment required".into(),
        });
        assert!(text.contains("402"));
        assert!(text.starts_with("Error: Free Tier Limit Reached"));
    }

    #[test]
    fn test_describe_rate_limited() {
        let text = describe_failure(&LlmError::RateLimited {
            retry_after_ms: Some(1000),
        });
        assert!(text.contains("429"));
    }

    #[test]
    fn test_describe_service_error() {
        let text = describe_failure(&LlmError::Http {
            status: 500,
            body: "boom".into(),
        });
        assert_eq!(text, "API Error 500: boom");
    }

    #[test]
    fn test_describe_client_failure() {
        let text = describe_failure(&LlmError::Transport("dns failure".into()));
        assert_eq!(text, "Critical Error: dns failure");
    }

    #[test]
    fn test_settings_from_config() {
        let settings = OracleSettings::default();
        assert_eq!(settings.model, "Qwen/Qwen2.5-7B-Instruct");
        assert_eq!(settings.max_tokens, 500);
        assert!((settings.temperature - 0.3).abs() < f64::EPSILON);
    }
}
