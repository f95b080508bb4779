//! mailsense-store — durable analysis cache
//!
//! Holds the typed analysis results (priority, sentiment, category, summary,
//! extracted facts) for each inbox message, backed by a local SQLite file.

pub mod record;
pub mod sqlite;

pub use record::{
    AggregateStats, AnalysisRecord, Category, ExtractedFacts, Priority, PriorityCounts,
    RecentAnalysis, Sentiment, SentimentCounts,
};
pub use sqlite::AnalysisDb;
