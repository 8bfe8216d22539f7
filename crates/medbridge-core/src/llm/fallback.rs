//! Two-tier transport fallback.
//!
//! Routes a completion request through the preferred client-library
//! transport and, when that fails at the client level, retries once on a
//! lower-level raw HTTP transport against the same logical endpoint.

use std::time::Instant;

use medbridge_types::llm::{CompletionRequest, CompletionResponse, LlmError};
use secrecy::SecretString;

use super::box_provider::BoxLlmProvider;

/// Primary transport with an optional secondary fallback.
#[derive(Debug)]
pub struct TransportChain {
    primary: BoxLlmProvider,
    secondary: Option<BoxLlmProvider>,
}

impl TransportChain {
    /// A chain with only a primary transport.
    pub fn new(primary: BoxLlmProvider) -> Self {
        Self {
            primary,
            secondary: None,
        }
    }

    /// Attach the transport used when the primary fails.
    pub fn with_secondary(mut self, secondary: BoxLlmProvider) -> Self {
        self.secondary = Some(secondary);
        self
    }

    /// Names of the configured transports, primary first.
    pub fn transport_names(&self) -> Vec<&str> {
        let mut names = vec![self.primary.name()];
        if let Some(secondary) = &self.secondary {
            names.push(secondary.name());
        }
        names
    }

    /// Send a completion request through the chain.
    ///
    /// Returns the primary's response, or the secondary's result when the
    /// primary failed with an error that warrants fallback. Errors that do
    /// not warrant fallback, and primary errors in a chain without a
    /// secondary, are returned unchanged.
    pub async fn complete(
        &self,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse, LlmError> {
        let start = Instant::now();
        let err = match self.primary.complete(request).await {
            Ok(response) => {
                tracing::debug!(
                    transport = self.primary.name(),
                    latency_ms = start.elapsed().as_millis() as u64,
                    "completion succeeded"
                );
                return Ok(response);
            }
            Err(err) => err,
        };

        let Some(secondary) = &self.secondary else {
            return Err(err);
        };

        if !err.warrants_fallback() {
            tracing::error!(
                transport = self.primary.name(),
                error = %err,
                "non-fallback error, returning immediately"
            );
            return Err(err);
        }

        tracing::warn!(
            transport = self.primary.name(),
            fallback = secondary.name(),
            error = %err,
            "primary transport failed, retrying on fallback"
        );

        let result = secondary.complete(request).await;
        if let Err(ref fallback_err) = result {
            tracing::warn!(
                transport = secondary.name(),
                error = %fallback_err,
                "fallback transport failed"
            );
        }
        result
    }
}

/// Builds a transport chain bound to a credential.
///
/// Implemented in medbridge-infra, where the concrete clients live. The
/// controller calls it once, when a credential becomes available.
pub trait TransportFactory: Send + Sync {
    fn build(&self, api_key: &SecretString) -> Result<TransportChain, LlmError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::provider::LlmProvider;
    use medbridge_types::llm::Usage;
    use std::future::Future;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    // --- Mock transports ---

    struct MockTransport {
        name: String,
        result: Result<String, LlmError>,
        calls: Arc<AtomicUsize>,
    }

    impl MockTransport {
        fn ok(name: &str) -> (Self, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            let transport = Self {
                name: name.to_string(),
                result: Ok(format!("Hello from {name}")),
                calls: calls.clone(),
            };
            (transport, calls)
        }

        fn failing(name: &str, error: LlmError) -> (Self, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            let transport = Self {
                name: name.to_string(),
                result: Err(error),
                calls: calls.clone(),
            };
            (transport, calls)
        }
    }

    impl LlmProvider for MockTransport {
        fn name(&self) -> &str {
            &self.name
        }

        fn complete(
            &self,
            _request: &CompletionRequest,
        ) -> impl Future<Output = Result<CompletionResponse, LlmError>> + Send {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let result = self.result.clone();
            let name = self.name.clone();
            async move {
                result.map(|content| CompletionResponse {
                    id: format!("resp-{name}"),
                    content,
                    model: "test-model".to_string(),
                    usage: Usage::default(),
                })
            }
        }
    }

    fn test_request() -> CompletionRequest {
        CompletionRequest {
            model: "test-model".to_string(),
            system: Some("translate".to_string()),
            prompt: "hola".to_string(),
            max_tokens: 500,
            temperature: Some(0.3),
        }
    }

    // --- Tests ---

    #[tokio::test]
    async fn test_primary_succeeds_secondary_untouched() {
        let (primary, _) = MockTransport::ok("primary");
        let (secondary, secondary_calls) = MockTransport::ok("secondary");
        let chain = TransportChain::new(BoxLlmProvider::new(primary))
            .with_secondary(BoxLlmProvider::new(secondary));

        let response = chain.complete(&test_request()).await.unwrap();

        assert_eq!(response.content, "Hello from primary");
        assert_eq!(secondary_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_client_failure_falls_back() {
        let (primary, _) =
            MockTransport::failing("primary", LlmError::Transport("connection reset".into()));
        let (secondary, secondary_calls) = MockTransport::ok("secondary");
        let chain = TransportChain::new(BoxLlmProvider::new(primary))
            .with_secondary(BoxLlmProvider::new(secondary));

        let response = chain.complete(&test_request()).await.unwrap();

        assert_eq!(response.content, "Hello from secondary");
        assert_eq!(secondary_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_invalid_request_does_not_fall_back() {
        let (primary, _) =
            MockTransport::failing("primary", LlmError::InvalidRequest("empty model".into()));
        let (secondary, secondary_calls) = MockTransport::ok("secondary");
        let chain = TransportChain::new(BoxLlmProvider::new(primary))
            .with_secondary(BoxLlmProvider::new(secondary));

        let result = chain.complete(&test_request()).await;

        assert!(matches!(result, Err(LlmError::InvalidRequest(_))));
        assert_eq!(secondary_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_both_fail_returns_secondary_error() {
        let (primary, _) = MockTransport::failing("primary", LlmError::AuthenticationFailed);
        let (secondary, _) = MockTransport::failing(
            "secondary",
            LlmError::QuotaExceeded {
                detail: "payment required".into(),
            },
        );
        let chain = TransportChain::new(BoxLlmProvider::new(primary))
            .with_secondary(BoxLlmProvider::new(secondary));

        let result = chain.complete(&test_request()).await;

        assert!(matches!(result, Err(LlmError::QuotaExceeded { .. })));
    }

    #[tokio::test]
    async fn test_without_secondary_returns_primary_error() {
        let (primary, primary_calls) =
            MockTransport::failing("primary", LlmError::Overloaded("busy".into()));
        let chain = TransportChain::new(BoxLlmProvider::new(primary));

        let result = chain.complete(&test_request()).await;

        assert!(matches!(result, Err(LlmError::Overloaded(_))));
        assert_eq!(primary_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_transport_names() {
        let (primary, _) = MockTransport::ok("openai_compatible");
        let (secondary, _) = MockTransport::ok("raw_http");
        let chain = TransportChain::new(BoxLlmProvider::new(primary))
            .with_secondary(BoxLlmProvider::new(secondary));
        assert_eq!(chain.transport_names(), vec!["openai_compatible", "raw_http"]);
    }
}
