//! Completion provider abstraction
//!
//! Providers implement the [`CompletionProvider`] trait and are composed via
//! [`ModelGateway`] for single-retry failover onto a fallback model.

pub mod ollama;
pub mod router;
pub mod types;

#[cfg(test)]
pub mod scripted;

pub use ollama::OllamaProvider;
pub use router::ModelGateway;
pub use types::{CompletionProvider, CompletionRequest};
