//! Ollama chat API client

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use super::types::{CompletionProvider, CompletionRequest};

pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";
pub const FALLBACK_MODEL: &str = "llama3.1:8b";

/// Client for a locally hosted Ollama chat endpoint
#[derive(Debug, Clone)]
pub struct OllamaProvider {
    client: Client,
    base_url: String,
    model: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    options: ChatOptions,
    stream: bool,
}

#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatOptions {
    temperature: f32,
    num_predict: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    message: Option<WireReply>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireReply {
    #[serde(default)]
    content: String,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<ModelTag>,
}

#[derive(Debug, Deserialize)]
struct ModelTag {
    name: String,
}

impl OllamaProvider {
    /// Create a provider for one model. Hosted ("cloud") models get a longer
    /// request timeout than local ones.
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        let model = model.into();
        let timeout = if model.to_lowercase().contains("cloud") {
            Duration::from_secs(120)
        } else {
            Duration::from_secs(60)
        };
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to build HTTP client");
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Self { client, base_url, model }
    }

    /// Names of the models installed on the endpoint
    pub async fn list_models(&self) -> Result<Vec<String>> {
        let response = self
            .client
            .get(format!("{}/api/tags", self.base_url))
            .send()
            .await
            .context("Failed to reach the model endpoint")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Model listing failed with status {status}: {body}");
        }

        let tags: TagsResponse = response
            .json()
            .await
            .context("Failed to parse the model listing")?;

        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl CompletionProvider for OllamaProvider {
    fn provider_name(&self) -> &str {
        "ollama"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = &request.system {
            messages.push(WireMessage { role: "system", content: system });
        }
        messages.push(WireMessage { role: "user", content: &request.prompt });

        let body = ChatRequest {
            model: &self.model,
            messages,
            options: ChatOptions {
                temperature: request.temperature,
                num_predict: request.max_tokens,
            },
            stream: false,
        };

        debug!(
            model = %self.model,
            prompt_chars = request.prompt.chars().count(),
            "Ollama chat request"
        );

        let response = self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .json(&body)
            .send()
            .await
            .context("Failed to send chat request to Ollama")?;

        let status = response.status();
        if status == StatusCode::PAYMENT_REQUIRED {
            anyhow::bail!("Model {} requires payment (status 402)", self.model);
        }
        if status == StatusCode::NOT_FOUND {
            anyhow::bail!("Model {} is not installed on the endpoint (status 404)", self.model);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Ollama chat failed with status {status}: {body}");
        }

        let chat: ChatResponse = response
            .json()
            .await
            .context("Failed to parse Ollama chat response")?;

        let content = chat.message.map(|m| m.content).unwrap_or_default();
        let content = content.trim();
        if content.is_empty() {
            if let Some(error) = chat.error {
                anyhow::bail!("Ollama reported an error: {error}");
            }
            anyhow::bail!("Ollama returned an empty completion");
        }

        debug!(model = %self.model, reply_chars = content.len(), "Ollama chat response");
        Ok(content.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_request_wire_shape() {
        let body = ChatRequest {
            model: "llama3.1:8b",
            messages: vec![
                WireMessage { role: "system", content: "be brief" },
                WireMessage { role: "user", content: "hello" },
            ],
            options: ChatOptions { temperature: 0.2, num_predict: 200 },
            stream: false,
        };

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["model"], "llama3.1:8b");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "hello");
        assert_eq!(json["options"]["num_predict"], 200);
        assert_eq!(json["stream"], false);
    }

    #[test]
    fn test_chat_response_deserialization() {
        let json = serde_json::json!({
            "message": {"role": "assistant", "content": "HIGH"},
            "done": true
        });
        let response: ChatResponse = serde_json::from_value(json).unwrap();
        assert_eq!(response.message.unwrap().content, "HIGH");
        assert!(response.error.is_none());
    }

    #[test]
    fn test_chat_response_error_field() {
        let json = serde_json::json!({"error": "model not loaded"});
        let response: ChatResponse = serde_json::from_value(json).unwrap();
        assert!(response.message.is_none());
        assert_eq!(response.error.as_deref(), Some("model not loaded"));
    }

    #[test]
    fn test_tags_response_deserialization() {
        let json = serde_json::json!({
            "models": [
                {"name": "llama3.1:8b", "size": 4661224676_u64},
                {"name": "qwen2.5:7b", "size": 4431729152_u64}
            ]
        });
        let tags: TagsResponse = serde_json::from_value(json).unwrap();
        let names: Vec<_> = tags.models.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["llama3.1:8b", "qwen2.5:7b"]);
    }

    #[test]
    fn test_new_trims_trailing_slash() {
        let provider = OllamaProvider::new("http://localhost:11434/", "llama3.1:8b");
        assert_eq!(provider.base_url(), "http://localhost:11434");
        assert_eq!(provider.model(), "llama3.1:8b");
        assert_eq!(provider.provider_name(), "ollama");
    }
}
