//! mailsense-core — analysis pipeline and reply drafting
//!
//! The assistant fans each uncached message out to five analysis tasks
//! (summary, priority, sentiment, category, fact extraction) running
//! concurrently against a local LLM endpoint, persists the merged record,
//! and drafts replies on request. Model access goes through [`ModelGateway`],
//! which retries exactly once against a fallback model.

pub mod analysis;
pub mod assistant;
pub mod composer;
pub mod error;
pub mod providers;

pub use assistant::Assistant;
pub use composer::{ReplyTone, FALLBACK_REPLY};
pub use error::AssistError;
pub use providers::{CompletionProvider, CompletionRequest, ModelGateway, OllamaProvider};
