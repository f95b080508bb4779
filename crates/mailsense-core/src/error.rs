//! Typed errors at the assistant boundary

use thiserror::Error;

/// Errors the assistant surfaces to callers. Analysis tasks degrade to
/// documented defaults instead of erroring, so `ModelUnavailable` is
/// consumed inside the task set and the analyze caller only ever sees
/// `AnalysisFailed`.
#[derive(Debug, Error)]
pub enum AssistError {
    /// Both the primary and the fallback completion calls failed
    #[error("model unavailable: {0}")]
    ModelUnavailable(String),

    /// The analysis result could not be persisted; nothing was stored
    #[error("analysis failed: {0}")]
    AnalysisFailed(String),

    /// The mailbox rejected an outgoing reply; the draft is intact
    #[error("send failed: {0}")]
    SendFailure(String),
}
