//! Scripted provider used across the crate's tests

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Mutex;

use super::types::{CompletionProvider, CompletionRequest};

/// Replies with a fixed string (or fails every call) and records every
/// request, so tests can assert how many completions a flow issued and
/// what it sent.
pub struct ScriptedProvider {
    model: String,
    reply: Option<String>,
    seen: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedProvider {
    pub fn replying(model: &str, reply: &str) -> Self {
        Self {
            model: model.to_string(),
            reply: Some(reply.to_string()),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(model: &str) -> Self {
        Self {
            model: model.to_string(),
            reply: None,
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.seen.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionProvider for ScriptedProvider {
    fn provider_name(&self) -> &str {
        "scripted"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        self.seen.lock().unwrap().push(request.clone());
        match &self.reply {
            Some(reply) => Ok(reply.clone()),
            None => anyhow::bail!("scripted failure from {}", self.model),
        }
    }
}
