//! mailsense-gateway — JSON HTTP API over the assistant
//!
//! A small axum router exposing the inbox, per-message analysis, reply
//! drafting and sending, batch prioritization, and the analytics dashboard
//! as JSON endpoints.

pub mod protocol;
pub mod server;

pub use server::{router, serve, AppState};
