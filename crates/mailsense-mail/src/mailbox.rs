//! Mailbox contract the assistant reads from and replies through

use anyhow::Result;
use async_trait::async_trait;

use crate::message::{EmailMessage, MessageSummary, OutgoingReply, SendReceipt};

/// A source of messages and a sink for replies. Implementations must be
/// safe to share behind an `Arc` across request handlers.
#[async_trait]
pub trait Mailbox: Send + Sync {
    /// Most recent messages first, at most `limit` of them
    async fn list_recent(&self, limit: usize) -> Result<Vec<MessageSummary>>;

    /// Full message by provider-assigned id; `None` when the id is unknown
    async fn get(&self, id: &str) -> Result<Option<EmailMessage>>;

    /// Deliver a composed reply. An error here means the draft was not
    /// accepted and the caller should keep it for retry.
    async fn send(&self, reply: OutgoingReply) -> Result<SendReceipt>;
}
