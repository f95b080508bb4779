//! mailsense-mail — mailbox adapters and message types
//!
//! Defines the `Mailbox` contract the assistant reads from and replies
//! through, plus a built-in demo inbox so the whole system runs without an
//! external mail account.

pub mod demo;
pub mod mailbox;
pub mod message;

pub use demo::DemoMailbox;
pub use mailbox::Mailbox;
pub use message::{EmailMessage, MessageSummary, OutgoingReply, SendReceipt};
