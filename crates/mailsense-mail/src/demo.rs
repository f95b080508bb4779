//! Built-in demo inbox, no external account required

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

use crate::mailbox::Mailbox;
use crate::message::{EmailMessage, MessageSummary, OutgoingReply, SendReceipt};

const DEMO_INBOX: &str = include_str!("../fixtures/demo_inbox.json");

/// Fixture-backed mailbox compiled into the binary. Listing order is
/// fixture order (newest first); sends are recorded in memory.
pub struct DemoMailbox {
    messages: Vec<EmailMessage>,
    outbox: Mutex<Vec<OutgoingReply>>,
}

impl DemoMailbox {
    pub fn new() -> Result<Self> {
        let messages: Vec<EmailMessage> =
            serde_json::from_str(DEMO_INBOX).context("Failed to parse built-in demo inbox")?;
        debug!("Loaded {} demo messages", messages.len());
        Ok(Self { messages, outbox: Mutex::new(Vec::new()) })
    }

    /// Replies recorded by `send`, oldest first
    pub async fn sent(&self) -> Vec<OutgoingReply> {
        self.outbox.lock().await.clone()
    }
}

#[async_trait]
impl Mailbox for DemoMailbox {
    async fn list_recent(&self, limit: usize) -> Result<Vec<MessageSummary>> {
        Ok(self.messages.iter().take(limit).map(|m| m.summary()).collect())
    }

    async fn get(&self, id: &str) -> Result<Option<EmailMessage>> {
        Ok(self.messages.iter().find(|m| m.id == id).cloned())
    }

    async fn send(&self, reply: OutgoingReply) -> Result<SendReceipt> {
        if reply.to.trim().is_empty() {
            bail!("Refusing to send a reply with an empty recipient");
        }
        let receipt = SendReceipt {
            receipt_id: Uuid::new_v4().to_string(),
            to: reply.to.clone(),
        };
        info!("Demo send to {} recorded as {}", reply.to, receipt.receipt_id);
        self.outbox.lock().await.push(reply);
        Ok(receipt)
    }
}
