//! Request and response bodies of the JSON API

use serde::{Deserialize, Serialize};

pub const DEFAULT_INBOX_LIMIT: usize = 25;

/// Query string of `GET /api/inbox`
#[derive(Debug, Clone, Deserialize)]
pub struct InboxQuery {
    #[serde(default = "default_inbox_limit")]
    pub limit: usize,
}

fn default_inbox_limit() -> usize {
    DEFAULT_INBOX_LIMIT
}

/// Body of `POST /api/message/{id}/reply`; both fields optional
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReplyRequest {
    #[serde(default)]
    pub tone: Option<String>,
    #[serde(default)]
    pub instructions: Option<String>,
}

/// Body of `POST /api/message/{id}/reply` responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplyResponse {
    pub reply: String,
}

/// Body of `POST /api/message/{id}/send`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SendRequest {
    #[serde(default)]
    pub reply_text: String,
}

/// Body of `POST /api/message/{id}/send` responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendResponse {
    pub sent: bool,
    pub receipt_id: String,
}

/// Body of `POST /api/prioritize`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PrioritizeRequest {
    #[serde(default)]
    pub ids: Vec<String>,
}

/// Error body every non-2xx response carries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
}

impl ApiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { error: message.into() }
    }
}
