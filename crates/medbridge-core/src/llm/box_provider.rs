//! Type-erased transport.
//!
//! `LlmProvider::complete` returns `impl Future`, so the trait is not
//! dyn-compatible. `BoxLlmProvider` hides the concrete transport behind a
//! private trait whose futures are boxed, letting `TransportChain` hold two
//! different transports chosen at runtime.

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use medbridge_types::llm::{CompletionRequest, CompletionResponse, LlmError};

use super::provider::LlmProvider;

type CompletionFuture<'a> =
    Pin<Box<dyn Future<Output = Result<CompletionResponse, LlmError>> + Send + 'a>>;

trait ErasedTransport: Send + Sync {
    fn transport_name(&self) -> &str;

    fn complete_erased<'a>(&'a self, request: &'a CompletionRequest) -> CompletionFuture<'a>;
}

impl<T: LlmProvider> ErasedTransport for T {
    fn transport_name(&self) -> &str {
        self.name()
    }

    fn complete_erased<'a>(&'a self, request: &'a CompletionRequest) -> CompletionFuture<'a> {
        Box::pin(self.complete(request))
    }
}

/// Any `LlmProvider`, boxed.
pub struct BoxLlmProvider(Box<dyn ErasedTransport>);

impl BoxLlmProvider {
    pub fn new<T: LlmProvider + 'static>(transport: T) -> Self {
        Self(Box::new(transport))
    }

    pub fn name(&self) -> &str {
        self.0.transport_name()
    }

    pub async fn complete(
        &self,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse, LlmError> {
        self.0.complete_erased(request).await
    }
}

impl fmt::Debug for BoxLlmProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("BoxLlmProvider").field(&self.name()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use medbridge_types::llm::Usage;

    struct Echo;

    impl LlmProvider for Echo {
        fn name(&self) -> &str {
            "echo"
        }

        async fn complete(
            &self,
            request: &CompletionRequest,
        ) -> Result<CompletionResponse, LlmError> {
            Ok(CompletionResponse {
                id: "echo-1".to_string(),
                content: request.prompt.clone(),
                model: request.model.clone(),
                usage: Usage::default(),
            })
        }
    }

    #[tokio::test]
    async fn test_boxed_transport_delegates() {
        let boxed = BoxLlmProvider::new(Echo);
        assert_eq!(boxed.name(), "echo");
        assert_eq!(format!("{boxed:?}"), "BoxLlmProvider(\"echo\")");

        let request = CompletionRequest {
            model: "m".to_string(),
            system: None,
            prompt: "Hola".to_string(),
            max_tokens: 10,
            temperature: None,
        };
        let response = boxed.complete(&request).await.unwrap();
        assert_eq!(response.content, "Hola");
    }
}
