//! Text-generation transports.
//!
//! Contains the concrete [`LlmProvider`](medbridge_core::llm::provider::LlmProvider)
//! implementations and [`HostedTransportFactory`], which assembles them into
//! the two-tier [`TransportChain`] the oracles use.

pub mod openai_compat;
pub mod raw_http;

use std::time::Duration;

use secrecy::SecretString;

use medbridge_core::llm::box_provider::BoxLlmProvider;
use medbridge_core::llm::fallback::{TransportChain, TransportFactory};
use medbridge_types::config::GlobalConfig;
use medbridge_types::llm::LlmError;

use self::openai_compat::OpenAiCompatibleProvider;
use self::raw_http::RawHttpProvider;

/// Builds the hosted-inference chain: OpenAI-compatible client first,
/// raw HTTP POST to the per-model endpoint second.
#[derive(Debug, Clone)]
pub struct HostedTransportFactory {
    config: GlobalConfig,
}

impl HostedTransportFactory {
    pub fn new(config: GlobalConfig) -> Self {
        Self { config }
    }
}

impl TransportFactory for HostedTransportFactory {
    fn build(&self, api_key: &SecretString) -> Result<TransportChain, LlmError> {
        let primary = OpenAiCompatibleProvider::new(openai_compat::config::from_global(
            &self.config,
            api_key.clone(),
        ))?;

        let secondary = RawHttpProvider::new(
            api_key.clone(),
            self.config.resolved_fallback_url(),
            self.config.model.clone(),
            Duration::from_secs(self.config.request_timeout_secs),
        )?;

        tracing::debug!(
            model = %self.config.model,
            base_url = %self.config.base_url,
            fallback_url = %secondary.endpoint(),
            "transport chain built"
        );

        Ok(TransportChain::new(BoxLlmProvider::new(primary))
            .with_secondary(BoxLlmProvider::new(secondary)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_builds_primary_then_raw_fallback() {
        let factory = HostedTransportFactory::new(GlobalConfig::default());
        let chain = factory.build(&SecretString::from("hf_test")).unwrap();
        assert_eq!(chain.transport_names(), vec!["openai_compatible", "raw_http"]);
    }

    #[tokio::test]
    async fn test_chain_falls_back_and_surfaces_transport_error() {
        use medbridge_types::llm::CompletionRequest;

        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let config = GlobalConfig {
            base_url: format!("http://127.0.0.1:{port}/v1"),
            fallback_url: Some(format!("http://127.0.0.1:{port}/v1/chat/completions")),
            request_timeout_secs: 5,
            ..GlobalConfig::default()
        };
        let chain = HostedTransportFactory::new(config)
            .build(&SecretString::from("hf_test"))
            .unwrap();

        let result = chain
            .complete(&CompletionRequest {
                model: String::new(),
                system: None,
                prompt: "hello".to_string(),
                max_tokens: 16,
                temperature: None,
            })
            .await;

        // Both transports are unreachable; the error reported is the fallback's.
        assert!(matches!(result, Err(LlmError::Transport(_))));
    }
}
