//! Configuration for the OpenAI-compatible chat-completions transport.

use std::time::Duration;

use medbridge_types::config::GlobalConfig;
use secrecy::SecretString;

/// Configuration for an [`super::OpenAiCompatibleProvider`].
pub struct OpenAiCompatConfig {
    /// Transport name reported in logs (e.g., "openai_compatible").
    pub provider_name: String,
    /// Base URL for the API (e.g., "https://router.huggingface.co/v1").
    pub base_url: String,
    pub api_key: SecretString,
    /// Model used when a request leaves `model` empty.
    pub model: String,
    pub timeout: Duration,
}

/// Primary transport settings derived from `config.toml`.
pub fn from_global(config: &GlobalConfig, api_key: SecretString) -> OpenAiCompatConfig {
    OpenAiCompatConfig {
        provider_name: "openai_compatible".into(),
        base_url: config.base_url.trim_end_matches('/').to_string(),
        api_key,
        model: config.model.clone(),
        timeout: Duration::from_secs(config.request_timeout_secs),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_global_defaults() {
        let config = from_global(&GlobalConfig::default(), SecretString::from("hf_x"));
        assert_eq!(config.provider_name, "openai_compatible");
        assert_eq!(config.base_url, "https://router.huggingface.co/v1");
        assert_eq!(config.model, "Qwen/Qwen2.5-7B-Instruct");
        assert_eq!(config.timeout, Duration::from_secs(120));
    }

    #[test]
    fn test_from_global_trims_trailing_slash() {
        let global = GlobalConfig {
            base_url: "http://localhost:8080/v1/".to_string(),
            ..GlobalConfig::default()
        };
        let config = from_global(&global, SecretString::from("hf_x"));
        assert_eq!(config.base_url, "http://localhost:8080/v1");
    }
}
