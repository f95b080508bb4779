//! SQLite layer backing the analysis cache

use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

use crate::record::{
    AggregateStats, AnalysisRecord, Category, ExtractedFacts, Priority, RecentAnalysis, Sentiment,
};

/// SQLite database wrapper (thread-safe via Arc<Mutex>)
pub struct AnalysisDb {
    conn: Arc<Mutex<Connection>>,
}

impl AnalysisDb {
    /// Initialize database with schema
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn =
            Connection::open(path.as_ref()).context("Failed to open SQLite database")?;

        info!("Initializing analysis cache at {:?}", path.as_ref());

        conn.execute("PRAGMA foreign_keys = ON", [])?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS messages (
                message_id TEXT PRIMARY KEY,
                subject TEXT NOT NULL,
                sender TEXT NOT NULL,
                date TEXT NOT NULL,
                snippet TEXT NOT NULL,
                summary TEXT NOT NULL,
                priority TEXT NOT NULL,
                sentiment TEXT NOT NULL,
                sentiment_score REAL NOT NULL,
                category TEXT NOT NULL,
                analyzed_at TEXT NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS extracted_facts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                message_id TEXT NOT NULL,
                fact_type TEXT NOT NULL,
                fact_value TEXT NOT NULL,
                FOREIGN KEY(message_id) REFERENCES messages(message_id) ON DELETE CASCADE
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_messages_analyzed ON messages(analyzed_at)",
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_messages_priority ON messages(priority)",
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_messages_sentiment ON messages(sentiment)",
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_messages_category ON messages(category)",
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_facts_message ON extracted_facts(message_id)",
            [],
        )?;

        debug!("Database schema initialized successfully");

        Ok(Self { conn: Arc::new(Mutex::new(conn)) })
    }

    /// Store a complete analysis, replacing any earlier one for the same
    /// message. The row and its fact rows land in one transaction, so a
    /// failed write leaves the previous state untouched.
    pub async fn put(&self, record: &AnalysisRecord) -> Result<()> {
        let conn = Arc::clone(&self.conn);
        let record = record.clone();

        tokio::task::spawn_blocking(move || {
            let summary_json = serde_json::to_string(&record.summary)?;
            let mut conn = conn.lock().unwrap_or_else(|poisoned| {
                warn!("Database mutex was poisoned, recovering");
                poisoned.into_inner()
            });
            let tx = conn.transaction()?;

            tx.execute(
                "INSERT OR REPLACE INTO messages
                     (message_id, subject, sender, date, snippet, summary,
                      priority, sentiment, sentiment_score, category, analyzed_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                params![
                    &record.message_id,
                    &record.subject,
                    &record.sender,
                    &record.date,
                    &record.snippet,
                    summary_json,
                    record.priority.as_str(),
                    record.sentiment.as_str(),
                    record.sentiment_score,
                    record.category.as_str(),
                    record.analyzed_at.to_rfc3339(),
                ],
            )?;

            tx.execute(
                "DELETE FROM extracted_facts WHERE message_id = ?1",
                params![&record.message_id],
            )?;

            let facts = [
                ("email", &record.facts.emails),
                ("phone", &record.facts.phones),
                ("date", &record.facts.dates),
                ("action_item", &record.facts.action_items),
            ];
            for (fact_type, values) in facts {
                for value in values {
                    tx.execute(
                        "INSERT INTO extracted_facts (message_id, fact_type, fact_value)
                         VALUES (?1, ?2, ?3)",
                        params![&record.message_id, fact_type, value],
                    )?;
                }
            }

            tx.commit()?;
            debug!("Stored analysis for message {}", record.message_id);
            Ok(())
        })
        .await
        .context("spawn_blocking task panicked")?
    }

    /// Get the cached analysis for a message, if one exists
    pub async fn get(&self, message_id: &str) -> Result<Option<AnalysisRecord>> {
        let conn = Arc::clone(&self.conn);
        let message_id = message_id.to_owned();

        tokio::task::spawn_blocking(move || {
            let conn = conn.lock().unwrap_or_else(|poisoned| {
                warn!("Database mutex was poisoned, recovering");
                poisoned.into_inner()
            });
            let row = conn
                .query_row(
                    "SELECT message_id, subject, sender, date, snippet, summary,
                            priority, sentiment, sentiment_score, category, analyzed_at
                     FROM messages WHERE message_id = ?1",
                    params![&message_id],
                    Self::row_to_record,
                )
                .optional()?;

            let Some(mut record) = row else {
                return Ok(None);
            };

            let mut stmt = conn.prepare(
                "SELECT fact_type, fact_value FROM extracted_facts
                 WHERE message_id = ?1
                 ORDER BY id",
            )?;
            let rows = stmt.query_map(params![&message_id], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })?;
            for row in rows {
                let (fact_type, value) = row?;
                match fact_type.as_str() {
                    "email" => record.facts.emails.push(value),
                    "phone" => record.facts.phones.push(value),
                    "date" => record.facts.dates.push(value),
                    "action_item" => record.facts.action_items.push(value),
                    other => debug!("Skipping unknown fact type: {}", other),
                }
            }

            Ok(Some(record))
        })
        .await
        .context("spawn_blocking task panicked")?
    }

    /// Recompute dashboard aggregates over every stored analysis
    pub async fn aggregate(&self) -> Result<AggregateStats> {
        let conn = Arc::clone(&self.conn);

        tokio::task::spawn_blocking(move || {
            let conn = conn.lock().unwrap_or_else(|poisoned| {
                warn!("Database mutex was poisoned, recovering");
                poisoned.into_inner()
            });
            let mut stats = AggregateStats::empty();

            stats.total = conn
                .query_row("SELECT COUNT(*) FROM messages", [], |row| row.get::<_, i64>(0))?
                as u64;

            let mut stmt =
                conn.prepare("SELECT priority, COUNT(*) FROM messages GROUP BY priority")?;
            let rows = stmt.query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
            })?;
            for row in rows {
                let (label, count) = row?;
                if let Some(priority) = Priority::from_label(&label) {
                    stats.priorities.bump(priority, count as u64);
                }
            }

            let mut stmt =
                conn.prepare("SELECT sentiment, COUNT(*) FROM messages GROUP BY sentiment")?;
            let rows = stmt.query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
            })?;
            for row in rows {
                let (label, count) = row?;
                if let Some(sentiment) = Sentiment::from_label(&label) {
                    stats.sentiments.bump(sentiment, count as u64);
                }
            }

            let mut stmt =
                conn.prepare("SELECT category, COUNT(*) FROM messages GROUP BY category")?;
            let rows = stmt.query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
            })?;
            for row in rows {
                let (label, count) = row?;
                *stats.categories.entry(label).or_insert(0) += count as u64;
            }

            let mut stmt = conn.prepare(
                "SELECT message_id, subject, sender, priority, sentiment, category, analyzed_at
                 FROM messages
                 ORDER BY analyzed_at DESC
                 LIMIT 10",
            )?;
            stats.recent = stmt
                .query_map([], |row| {
                    let priority: String = row.get(3)?;
                    let sentiment: String = row.get(4)?;
                    let category: String = row.get(5)?;
                    Ok(RecentAnalysis {
                        message_id: row.get(0)?,
                        subject: row.get(1)?,
                        sender: row.get(2)?,
                        priority: Priority::from_label(&priority).unwrap_or_default(),
                        sentiment: Sentiment::from_label(&sentiment).unwrap_or_default(),
                        category: Category::from_label(&category).unwrap_or_default(),
                        analyzed_at: row
                            .get::<_, String>(6)?
                            .parse()
                            .unwrap_or_else(|_| Utc::now()),
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;

            Ok(stats)
        })
        .await
        .context("spawn_blocking task panicked")?
    }

    /// Drop every cached analysis
    pub async fn reset(&self) -> Result<()> {
        let conn = Arc::clone(&self.conn);

        tokio::task::spawn_blocking(move || {
            let conn = conn.lock().unwrap_or_else(|poisoned| {
                warn!("Database mutex was poisoned, recovering");
                poisoned.into_inner()
            });
            let facts = conn.execute("DELETE FROM extracted_facts", [])?;
            let messages = conn.execute("DELETE FROM messages", [])?;
            info!("Cleared analysis cache: {} messages, {} facts", messages, facts);
            Ok(())
        })
        .await
        .context("spawn_blocking task panicked")?
    }

    /// Helper to convert a messages row (facts filled in separately)
    fn row_to_record(row: &rusqlite::Row) -> rusqlite::Result<AnalysisRecord> {
        let summary_str: String = row.get(5)?;
        let summary = serde_json::from_str(&summary_str).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(5, rusqlite::types::Type::Text, Box::new(e))
        })?;
        let priority: String = row.get(6)?;
        let sentiment: String = row.get(7)?;
        let category: String = row.get(9)?;

        Ok(AnalysisRecord {
            message_id: row.get(0)?,
            subject: row.get(1)?,
            sender: row.get(2)?,
            date: row.get(3)?,
            snippet: row.get(4)?,
            summary,
            priority: Priority::from_label(&priority).unwrap_or_default(),
            sentiment: Sentiment::from_label(&sentiment).unwrap_or_default(),
            sentiment_score: row.get(8)?,
            category: Category::from_label(&category).unwrap_or_default(),
            facts: ExtractedFacts::default(),
            analyzed_at: row.get::<_, String>(10)?.parse().unwrap_or_else(|_| Utc::now()),
        })
    }
}
