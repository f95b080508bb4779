//! The assistant: cache-aware orchestration of the analysis tasks
//!
//! One `Assistant` value owns the model gateway and the analysis store and
//! is shared across request handlers. There is no process-global state.

use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, warn};

use mailsense_mail::EmailMessage;
use mailsense_store::{AggregateStats, AnalysisDb, AnalysisRecord, Priority};

use crate::analysis;
use crate::composer::{self, ReplyTone};
use crate::error::AssistError;
use crate::providers::ModelGateway;

pub struct Assistant {
    gateway: ModelGateway,
    db: Arc<AnalysisDb>,
}

impl Assistant {
    pub fn new(gateway: ModelGateway, db: Arc<AnalysisDb>) -> Self {
        Self { gateway, db }
    }

    /// Analyze a message, serving from the cache when a record exists.
    ///
    /// On a miss the five analysis tasks run concurrently against the same
    /// text; each task degrades to its documented default on failure, so the
    /// fan-in always produces a complete record. The record is persisted in
    /// one atomic write before being returned; if that write fails, nothing
    /// is stored and the caller gets `AnalysisFailed`.
    pub async fn analyze(&self, message: &EmailMessage) -> Result<AnalysisRecord, AssistError> {
        match self.db.get(&message.id).await {
            Ok(Some(record)) => {
                debug!("Analysis cache hit for message {}", message.id);
                return Ok(record);
            }
            Ok(None) => {}
            // A failed read is treated as a miss; the re-derived record is
            // the same either way.
            Err(e) => warn!("Analysis cache read failed, recomputing: {:#}", e),
        }

        let text = if message.body.trim().is_empty() {
            &message.snippet
        } else {
            &message.body
        };

        info!("Analyzing message {} ({} chars)", message.id, text.chars().count());
        let (summary, priority, (sentiment, sentiment_score), category, facts) = tokio::join!(
            analysis::summarize(&self.gateway, text),
            analysis::classify_priority(&self.gateway, text),
            analysis::analyze_sentiment(&self.gateway, text),
            analysis::categorize(&self.gateway, text, &message.subject),
            analysis::extract_facts(&self.gateway, text),
        );

        let record = AnalysisRecord {
            message_id: message.id.clone(),
            subject: message.subject.clone(),
            sender: message.sender.clone(),
            date: message.date.clone(),
            snippet: message.snippet.clone(),
            summary,
            priority,
            sentiment,
            sentiment_score,
            category,
            facts,
            analyzed_at: Utc::now(),
        };

        self.db
            .put(&record)
            .await
            .map_err(|e| AssistError::AnalysisFailed(format!("{e:#}")))?;

        Ok(record)
    }

    /// Draft a reply to a message. Never errors; see [`composer::compose_reply`].
    pub async fn compose_reply(
        &self,
        message: &EmailMessage,
        tone: ReplyTone,
        instruction: Option<&str>,
    ) -> String {
        composer::compose_reply(&self.gateway, &message.body, tone, instruction).await
    }

    /// Priority for one message, served from the cache when a record exists.
    /// A miss runs only the priority classifier and persists nothing, so the
    /// all-or-nothing record invariant holds.
    pub async fn prioritize(&self, message: &EmailMessage) -> Priority {
        match self.db.get(&message.id).await {
            Ok(Some(record)) => return record.priority,
            Ok(None) => {}
            Err(e) => warn!("Analysis cache read failed during prioritize: {:#}", e),
        }

        let text = if message.body.trim().is_empty() {
            &message.snippet
        } else {
            &message.body
        };
        analysis::classify_priority(&self.gateway, text).await
    }

    /// Dashboard aggregates over every stored analysis
    pub async fn stats(&self) -> anyhow::Result<AggregateStats> {
        self.db.aggregate().await
    }

    /// Drop every cached analysis
    pub async fn reset_cache(&self) -> anyhow::Result<()> {
        self.db.reset().await
    }
}
