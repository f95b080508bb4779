//! Reply drafting
//!
//! Drafts are regenerated on every request and never cached; persistence of
//! an unsent draft is the client's concern.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::providers::{CompletionRequest, ModelGateway};

/// Draft returned when the gateway cannot produce one, so the caller always
/// has something to display
pub const FALLBACK_REPLY: &str = "Thank you for your email.\n\n\
    I have reviewed your message and will respond accordingly.\n\n\
    Best regards";

/// Draft returned for a message with no body text
pub const EMPTY_BODY_REPLY: &str = "No email content available to generate a reply.";

/// Voice the drafted reply is written in
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplyTone {
    #[default]
    Professional,
    Friendly,
    Formal,
    Casual,
}

impl ReplyTone {
    pub const ALL: [ReplyTone; 4] = [
        ReplyTone::Professional,
        ReplyTone::Friendly,
        ReplyTone::Formal,
        ReplyTone::Casual,
    ];

    /// Label used in prompts and on the wire (e.g. "professional")
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Professional => "professional",
            Self::Friendly => "friendly",
            Self::Formal => "formal",
            Self::Casual => "casual",
        }
    }

    /// Parse a label, case-insensitively
    pub fn from_label(label: &str) -> Option<Self> {
        let lowered = label.trim().to_lowercase();
        Self::ALL.into_iter().find(|t| t.as_str() == lowered)
    }
}

impl std::fmt::Display for ReplyTone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn clip(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Draft a reply to `body` in the given tone, honoring an optional free-text
/// instruction. Never errors: gateway failure or a blank draft yields the
/// fixed fallback template.
pub async fn compose_reply(
    gateway: &ModelGateway,
    body: &str,
    tone: ReplyTone,
    instruction: Option<&str>,
) -> String {
    if body.trim().is_empty() {
        return EMPTY_BODY_REPLY.to_string();
    }

    let instruction_text = match instruction.map(str::trim).filter(|i| !i.is_empty()) {
        Some(instruction) => format!("\n\nAdditional instructions: {}", instruction),
        None => String::new(),
    };

    let request = CompletionRequest {
        system: Some(format!(
            "You are an assistant that drafts email replies in a {} tone. Do not include \
             signatures. If the email asks questions, answer succinctly. Include 2-3 short \
             paragraphs when needed. Always generate a complete reply.",
            tone
        )),
        prompt: format!(
            "Original email:\n{}{}\n\nDraft a reply:",
            clip(body, 1500),
            instruction_text
        ),
        max_tokens: 400,
        temperature: 0.3,
    };

    match gateway.complete(&request).await {
        Ok(draft) if !draft.trim().is_empty() => draft,
        Ok(_) => FALLBACK_REPLY.to_string(),
        Err(e) => {
            warn!("Reply draft fell back to the template: {}", e);
            FALLBACK_REPLY.to_string()
        }
    }
}
