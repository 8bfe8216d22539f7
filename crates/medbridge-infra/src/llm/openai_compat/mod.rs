//! OpenAI-compatible chat-completions transport.
//!
//! The preferred transport of the chain. Uses [`async_openai`] for
//! type-safe request/response handling against any endpoint that speaks
//! the OpenAI chat completions protocol (the hosted inference router by
//! default).

pub mod config;

use async_openai::Client;
use async_openai::config::OpenAIConfig;
use async_openai::types::chat::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessage,
    ChatCompletionRequestSystemMessageContent, ChatCompletionRequestUserMessage,
    ChatCompletionRequestUserMessageContent, CreateChatCompletionRequest,
};
use secrecy::ExposeSecret;

use medbridge_core::llm::provider::LlmProvider;
use medbridge_types::llm::{CompletionRequest, CompletionResponse, LlmError, Usage};

use self::config::OpenAiCompatConfig;

/// Transport for any OpenAI-compatible API.
///
/// # API Key Security
///
/// Does NOT derive Debug to prevent accidental exposure of the API key
/// stored inside the `async_openai::Client`.
pub struct OpenAiCompatibleProvider {
    client: Client<OpenAIConfig>,
    provider_name: String,
    model: String,
}

impl OpenAiCompatibleProvider {
    /// Create a new transport from a configuration.
    ///
    /// Fails only if the underlying HTTP client cannot be constructed.
    pub fn new(config: OpenAiCompatConfig) -> Result<Self, LlmError> {
        let openai_config = OpenAIConfig::new()
            .with_api_key(config.api_key.expose_secret())
            .with_api_base(&config.base_url);

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LlmError::Transport(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client: Client::with_config(openai_config).with_http_client(http),
            provider_name: config.provider_name,
            model: config.model,
        })
    }

    /// Build a [`CreateChatCompletionRequest`] from a generic [`CompletionRequest`].
    fn build_request(
        &self,
        request: &CompletionRequest,
    ) -> Result<CreateChatCompletionRequest, LlmError> {
        if request.prompt.is_empty() {
            return Err(LlmError::InvalidRequest("request has an empty prompt".to_string()));
        }

        let mut messages: Vec<ChatCompletionRequestMessage> = Vec::with_capacity(2);
        if let Some(ref system) = request.system {
            messages.push(ChatCompletionRequestMessage::System(
                ChatCompletionRequestSystemMessage {
                    content: ChatCompletionRequestSystemMessageContent::Text(system.clone()),
                    name: None,
                },
            ));
        }
        messages.push(ChatCompletionRequestMessage::User(
            ChatCompletionRequestUserMessage {
                content: ChatCompletionRequestUserMessageContent::Text(request.prompt.clone()),
                name: None,
            },
        ));

        // Use the model from the request if set, otherwise fall back to config default
        let model = if request.model.is_empty() {
            self.model.clone()
        } else {
            request.model.clone()
        };

        let req = CreateChatCompletionRequest {
            model,
            messages,
            max_completion_tokens: Some(request.max_tokens),
            temperature: request.temperature.map(|t| t as f32),
            ..Default::default()
        };

        Ok(req)
    }
}

impl LlmProvider for OpenAiCompatibleProvider {
    fn name(&self) -> &str {
        &self.provider_name
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let oai_request = self.build_request(request)?;

        let response = self
            .client
            .chat()
            .create(oai_request)
            .await
            .map_err(map_openai_error)?;

        let content = response
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .ok_or_else(|| {
                LlmError::Deserialization("response contained no message content".to_string())
            })?;

        let usage = response
            .usage
            .map(|u| Usage {
                input_tokens: u.prompt_tokens,
                output_tokens: u.completion_tokens,
            })
            .unwrap_or_default();

        Ok(CompletionResponse {
            id: response.id,
            content,
            model: response.model,
            usage,
        })
    }
}

/// Map an `async_openai::error::OpenAIError` to an [`LlmError`].
fn map_openai_error(err: async_openai::error::OpenAIError) -> LlmError {
    use async_openai::error::OpenAIError;

    match &err {
        OpenAIError::ApiError(api_err) => {
            let code = api_err.code.as_deref().unwrap_or("");
            let error_type = api_err.r#type.as_deref().unwrap_or("");
            let message = api_err.message.to_lowercase();

            if code == "authentication_error"
                || error_type == "authentication_error"
                || message.contains("invalid api key")
                || message.contains("invalid credentials")
            {
                LlmError::AuthenticationFailed
            } else if code == "insufficient_quota"
                || message.contains("payment required")
                || message.contains("exceeded your monthly included credits")
            {
                LlmError::QuotaExceeded {
                    detail: api_err.message.clone(),
                }
            } else if code == "rate_limit_exceeded" || error_type == "rate_limit_error" {
                LlmError::RateLimited {
                    retry_after_ms: None,
                }
            } else if code == "server_error" || error_type == "overloaded_error" {
                LlmError::Overloaded(api_err.message.clone())
            } else {
                LlmError::Provider {
                    message: api_err.message.clone(),
                }
            }
        }
        OpenAIError::Reqwest(reqwest_err) => match reqwest_err.status() {
            Some(status) => match status.as_u16() {
                401 => LlmError::AuthenticationFailed,
                402 => LlmError::QuotaExceeded {
                    detail: err.to_string(),
                },
                429 => LlmError::RateLimited {
                    retry_after_ms: None,
                },
                503 | 529 => LlmError::Overloaded(err.to_string()),
                code => LlmError::Http {
                    status: code,
                    body: err.to_string(),
                },
            },
            None => LlmError::Transport(err.to_string()),
        },
        OpenAIError::JSONDeserialize(_, content) => {
            LlmError::Deserialization(format!("failed to parse response: {content}"))
        }
        OpenAIError::InvalidArgument(msg) => LlmError::InvalidRequest(msg.clone()),
        _ => LlmError::Provider {
            message: err.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use medbridge_types::config::GlobalConfig;
    use secrecy::SecretString;

    fn provider() -> OpenAiCompatibleProvider {
        OpenAiCompatibleProvider::new(config::from_global(
            &GlobalConfig::default(),
            SecretString::from("hf_test"),
        ))
        .unwrap()
    }

    fn request(model: &str) -> CompletionRequest {
        CompletionRequest {
            model: model.to_string(),
            system: Some("Translate into Spanish".to_string()),
            prompt: "My head hurts".to_string(),
            max_tokens: 500,
            temperature: Some(0.3),
        }
    }

    #[test]
    fn test_provider_name() {
        assert_eq!(provider().name(), "openai_compatible");
    }

    #[test]
    fn test_build_request_messages() {
        let oai_req = provider()
            .build_request(&request("Qwen/Qwen2.5-7B-Instruct"))
            .unwrap();
        assert_eq!(oai_req.model, "Qwen/Qwen2.5-7B-Instruct");
        // 1 system + 1 user
        assert_eq!(oai_req.messages.len(), 2);
        assert!(matches!(
            oai_req.messages[0],
            ChatCompletionRequestMessage::System(_)
        ));
        assert!(matches!(
            oai_req.messages[1],
            ChatCompletionRequestMessage::User(_)
        ));
        assert_eq!(oai_req.max_completion_tokens, Some(500));
        assert_eq!(oai_req.temperature, Some(0.3));
        assert!(oai_req.stream.is_none());
    }

    #[test]
    fn test_build_request_empty_model_uses_default() {
        let oai_req = provider().build_request(&request("")).unwrap();
        assert_eq!(oai_req.model, "Qwen/Qwen2.5-7B-Instruct");
    }

    #[test]
    fn test_build_request_with_empty_prompt_is_invalid() {
        let empty = CompletionRequest {
            model: "m".to_string(),
            system: None,
            prompt: String::new(),
            max_tokens: 10,
            temperature: None,
        };
        let result = provider().build_request(&empty);
        assert!(matches!(result, Err(LlmError::InvalidRequest(_))));
    }

    #[test]
    fn test_map_openai_error_api_auth() {
        use async_openai::error::{ApiError, OpenAIError};
        let api_err = ApiError {
            message: "Invalid credentials in Authorization header".to_string(),
            r#type: None,
            param: None,
            code: None,
        };
        let err = map_openai_error(OpenAIError::ApiError(api_err));
        assert!(matches!(err, LlmError::AuthenticationFailed));
    }

    #[test]
    fn test_map_openai_error_quota() {
        use async_openai::error::{ApiError, OpenAIError};
        let api_err = ApiError {
            message: "You have exceeded your monthly included credits".to_string(),
            r#type: None,
            param: None,
            code: None,
        };
        let err = map_openai_error(OpenAIError::ApiError(api_err));
        assert!(matches!(err, LlmError::QuotaExceeded { .. }));
    }

    #[test]
    fn test_map_openai_error_rate_limit() {
        use async_openai::error::{ApiError, OpenAIError};
        let api_err = ApiError {
            message: "Rate limit exceeded".to_string(),
            r#type: Some("rate_limit_error".to_string()),
            param: None,
            code: None,
        };
        let err = map_openai_error(OpenAIError::ApiError(api_err));
        assert!(matches!(err, LlmError::RateLimited { .. }));
    }

    #[test]
    fn test_map_openai_error_invalid_argument() {
        use async_openai::error::OpenAIError;
        let err = map_openai_error(OpenAIError::InvalidArgument("bad arg".to_string()));
        assert!(matches!(err, LlmError::InvalidRequest(_)));
    }
}
