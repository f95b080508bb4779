//! Primary/fallback failover over completion providers

use std::sync::Arc;
use tracing::warn;

use super::types::{CompletionProvider, CompletionRequest};
use crate::error::AssistError;

/// Issues each completion against the primary provider and retries exactly
/// once against the fallback when the primary fails, for any reason. Holds
/// no state between calls.
pub struct ModelGateway {
    primary: Arc<dyn CompletionProvider>,
    fallback: Option<Arc<dyn CompletionProvider>>,
}

impl ModelGateway {
    /// Compose a primary and a fallback provider. A fallback configured with
    /// the same model as the primary would only repeat the identical call,
    /// so it is dropped and a single attempt is made.
    pub fn new(
        primary: Arc<dyn CompletionProvider>,
        fallback: Arc<dyn CompletionProvider>,
    ) -> Self {
        let fallback = if fallback.model() == primary.model() {
            None
        } else {
            Some(fallback)
        };
        Self { primary, fallback }
    }

    /// Gateway with no fallback; failures surface after one attempt
    pub fn single(primary: Arc<dyn CompletionProvider>) -> Self {
        Self { primary, fallback: None }
    }

    pub fn primary_model(&self) -> &str {
        self.primary.model()
    }

    pub fn fallback_model(&self) -> Option<&str> {
        self.fallback.as_deref().map(|f| f.model())
    }

    /// Complete the request, failing over once. `ModelUnavailable` carries
    /// the error from the last attempt.
    pub async fn complete(&self, request: &CompletionRequest) -> Result<String, AssistError> {
        let primary_err = match self.primary.complete(request).await {
            Ok(text) => return Ok(text),
            Err(e) => e,
        };

        let Some(fallback) = &self.fallback else {
            return Err(AssistError::ModelUnavailable(format!("{primary_err:#}")));
        };

        warn!(
            "Primary model {} failed ({:#}), retrying with {}",
            self.primary.model(),
            primary_err,
            fallback.model()
        );

        fallback
            .complete(request)
            .await
            .map_err(|fallback_err| AssistError::ModelUnavailable(format!("{fallback_err:#}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::scripted::ScriptedProvider;

    fn request() -> CompletionRequest {
        CompletionRequest {
            system: None,
            prompt: "classify this".to_string(),
            max_tokens: 10,
            temperature: 0.0,
        }
    }

    #[tokio::test]
    async fn test_primary_success_skips_fallback() {
        let primary = Arc::new(ScriptedProvider::replying("primary-model", "HIGH"));
        let fallback = Arc::new(ScriptedProvider::replying("fallback-model", "LOW"));
        let gateway = ModelGateway::new(primary.clone(), fallback.clone());

        let reply = gateway.complete(&request()).await.unwrap();
        assert_eq!(reply, "HIGH");
        assert_eq!(primary.calls(), 1);
        assert_eq!(fallback.calls(), 0);
    }

    #[tokio::test]
    async fn test_primary_failure_uses_fallback_once() {
        let primary = Arc::new(ScriptedProvider::failing("primary-model"));
        let fallback = Arc::new(ScriptedProvider::replying("fallback-model", "LOW"));
        let gateway = ModelGateway::new(primary.clone(), fallback.clone());

        let reply = gateway.complete(&request()).await.unwrap();
        assert_eq!(reply, "LOW");
        assert_eq!(primary.calls(), 1);
        assert_eq!(fallback.calls(), 1);
    }

    #[tokio::test]
    async fn test_both_failures_surface_model_unavailable() {
        let primary = Arc::new(ScriptedProvider::failing("primary-model"));
        let fallback = Arc::new(ScriptedProvider::failing("fallback-model"));
        let gateway = ModelGateway::new(primary.clone(), fallback.clone());

        let err = gateway.complete(&request()).await.unwrap_err();
        assert!(matches!(err, AssistError::ModelUnavailable(_)));
        assert!(err.to_string().contains("fallback-model"));
        assert_eq!(primary.calls(), 1);
        assert_eq!(fallback.calls(), 1);
    }

    #[tokio::test]
    async fn test_identical_fallback_model_means_single_attempt() {
        let primary = Arc::new(ScriptedProvider::failing("llama3.1:8b"));
        let fallback = Arc::new(ScriptedProvider::replying("llama3.1:8b", "unused"));
        let gateway = ModelGateway::new(primary.clone(), fallback.clone());

        assert!(gateway.fallback_model().is_none());
        let err = gateway.complete(&request()).await.unwrap_err();
        assert!(matches!(err, AssistError::ModelUnavailable(_)));
        assert_eq!(primary.calls(), 1);
        assert_eq!(fallback.calls(), 0);
    }

    #[tokio::test]
    async fn test_single_gateway_has_no_fallback() {
        let primary = Arc::new(ScriptedProvider::replying("only-model", "ok"));
        let gateway = ModelGateway::single(primary.clone());

        assert_eq!(gateway.primary_model(), "only-model");
        assert!(gateway.fallback_model().is_none());
        assert_eq!(gateway.complete(&request()).await.unwrap(), "ok");
    }
}
