//! Global configuration types for MedBridge.
//!
//! `GlobalConfig` represents the top-level `config.toml` that controls the
//! text-generation endpoint, request parameters, and session defaults.

use serde::{Deserialize, Serialize};

/// Top-level configuration for MedBridge.
///
/// Loaded from `~/.medbridge/config.toml`. All fields have sensible defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Model identifier sent with every completion request.
    #[serde(default = "default_model")]
    pub model: String,

    /// Base URL of the OpenAI-compatible chat-completions endpoint.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Full URL of the raw fallback endpoint. Derived from `model` when absent.
    #[serde(default)]
    pub fallback_url: Option<String>,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_temperature")]
    pub temperature: f64,

    /// Outbound HTTP timeout for both transports.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_room")]
    pub default_room: String,

    #[serde(default = "default_language")]
    pub default_language: String,

    /// Target languages offered by the interactive surfaces.
    #[serde(default = "default_languages")]
    pub languages: Vec<String>,
}

fn default_model() -> String {
    "Qwen/Qwen2.5-7B-Instruct".to_string()
}

fn default_base_url() -> String {
    "https://router.huggingface.co/v1".to_string()
}

fn default_max_tokens() -> u32 {
    500
}

fn default_temperature() -> f64 {
    0.3
}

fn default_request_timeout_secs() -> u64 {
    120
}

fn default_room() -> String {
    "Room-1".to_string()
}

fn default_language() -> String {
    "English".to_string()
}

fn default_languages() -> Vec<String> {
    ["English", "Spanish", "French", "Hindi", "Mandarin"]
        .into_iter()
        .map(String::from)
        .collect()
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            base_url: default_base_url(),
            fallback_url: None,
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            request_timeout_secs: default_request_timeout_secs(),
            default_room: default_room(),
            default_language: default_language(),
            languages: default_languages(),
        }
    }
}

impl GlobalConfig {
    /// URL used by the raw fallback transport.
    pub fn resolved_fallback_url(&self) -> String {
        match &self.fallback_url {
            Some(url) => url.clone(),
            None => format!(
                "https://api-inference.huggingface.co/models/{}/v1/chat/completions",
                self.model
            ),
        }
    }

    /// Match a user-typed language against the configured list, ignoring case.
    ///
    /// Returns the configured spelling, or `None` if the language is not offered.
    pub fn canonical_language(&self, input: &str) -> Option<&str> {
        let wanted = input.trim();
        self.languages
            .iter()
            .find(|lang| lang.eq_ignore_ascii_case(wanted))
            .map(String::as_str)
    }
}
