//! Message types shared across mailbox adapters

use serde::{Deserialize, Serialize};

/// Lightweight listing entry for the inbox view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageSummary {
    pub id: String,
    pub subject: String,
    pub sender: String,
    pub date: String,
    pub snippet: String,
}

/// Full message as fetched from the mailbox. Immutable once fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailMessage {
    pub id: String,
    pub subject: String,
    pub sender: String,
    pub date: String,
    pub snippet: String,
    pub body: String,
    /// RFC 5322 Message-ID header value, kept for reply threading
    #[serde(default)]
    pub message_id_header: Option<String>,
}

impl EmailMessage {
    pub fn summary(&self) -> MessageSummary {
        MessageSummary {
            id: self.id.clone(),
            subject: self.subject.clone(),
            sender: self.sender.clone(),
            date: self.date.clone(),
            snippet: self.snippet.clone(),
        }
    }

    /// Bare address pulled out of the From header, e.g.
    /// "Dana Smith <dana@example.com>" yields "dana@example.com"
    pub fn reply_address(&self) -> Option<String> {
        extract_address(&self.sender)
    }
}

/// Reply ready to hand to a mailbox adapter, threading headers resolved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutgoingReply {
    pub to: String,
    pub subject: String,
    pub body: String,
    #[serde(default)]
    pub in_reply_to: Option<String>,
    #[serde(default)]
    pub references: Option<String>,
}

impl OutgoingReply {
    /// Build a threaded reply to `original`. Falls back to the raw From
    /// header when no bare address can be extracted; both In-Reply-To and
    /// References carry the original Message-ID.
    pub fn for_message(original: &EmailMessage, body: impl Into<String>) -> Self {
        Self {
            to: original
                .reply_address()
                .unwrap_or_else(|| original.sender.clone()),
            subject: reply_subject(&original.subject),
            body: body.into(),
            in_reply_to: original.message_id_header.clone(),
            references: original.message_id_header.clone(),
        }
    }
}

/// Confirmation returned by a successful send
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SendReceipt {
    pub receipt_id: String,
    pub to: String,
}

/// First bare address found in a header, if any
pub fn extract_address(header: &str) -> Option<String> {
    let re = regex::Regex::new(r"[\w.-]+@[\w.-]+\.\w+").ok()?;
    re.find(header).map(|m| m.as_str().to_string())
}

/// Prefix the subject with a single "Re: " unless one is already there
pub fn reply_subject(subject: &str) -> String {
    if subject.starts_with("Re:") {
        subject.to_string()
    } else {
        format!("Re: {}", subject)
    }
}
