//! Provider-agnostic completion types

use anyhow::Result;
use async_trait::async_trait;

/// Single prompt-completion request. Each analysis task builds one with its
/// own prompt template and sampling parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system: Option<String>,
    pub prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// Trait that all completion providers implement
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Human-readable provider name (e.g. "ollama")
    fn provider_name(&self) -> &str;

    /// Model identifier this provider calls
    fn model(&self) -> &str;

    /// Send one completion request and return the generated text.
    /// An empty completion is an error, never an empty `Ok`.
    async fn complete(&self, request: &CompletionRequest) -> Result<String>;
}
