//! Typed analysis results stored per message

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Message priority assigned by the classifier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::High, Priority::Medium, Priority::Low];

    /// Stored/wire label (e.g. "HIGH")
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "HIGH",
            Self::Medium => "MEDIUM",
            Self::Low => "LOW",
        }
    }

    /// Parse an exact stored label
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "HIGH" => Some(Self::High),
            "MEDIUM" => Some(Self::Medium),
            "LOW" => Some(Self::Low),
            _ => None,
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sentiment label assigned by the classifier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    #[default]
    Neutral,
}

impl Sentiment {
    pub const ALL: [Sentiment; 3] = [Sentiment::Positive, Sentiment::Negative, Sentiment::Neutral];

    /// Stored/wire label (e.g. "positive")
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Negative => "negative",
            Self::Neutral => "neutral",
        }
    }

    /// Parse an exact stored label
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "positive" => Some(Self::Positive),
            "negative" => Some(Self::Negative),
            "neutral" => Some(Self::Neutral),
            _ => None,
        }
    }
}

impl std::fmt::Display for Sentiment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fixed category set every message is filed under
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Urgent Support")]
    UrgentSupport,
    #[serde(rename = "Work/Business")]
    WorkBusiness,
    Personal,
    Newsletter,
    #[serde(rename = "Spam/Promotional")]
    SpamPromotional,
    #[default]
    General,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::UrgentSupport,
        Category::WorkBusiness,
        Category::Personal,
        Category::Newsletter,
        Category::SpamPromotional,
        Category::General,
    ];

    /// Stored/wire label (e.g. "Urgent Support")
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UrgentSupport => "Urgent Support",
            Self::WorkBusiness => "Work/Business",
            Self::Personal => "Personal",
            Self::Newsletter => "Newsletter",
            Self::SpamPromotional => "Spam/Promotional",
            Self::General => "General",
        }
    }

    /// Parse an exact stored label
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == label)
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured facts pulled out of a message body
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedFacts {
    #[serde(default)]
    pub emails: Vec<String>,
    #[serde(default)]
    pub phones: Vec<String>,
    #[serde(default)]
    pub dates: Vec<String>,
    #[serde(default)]
    pub action_items: Vec<String>,
}

impl ExtractedFacts {
    pub fn is_empty(&self) -> bool {
        self.emails.is_empty()
            && self.phones.is_empty()
            && self.dates.is_empty()
            && self.action_items.is_empty()
    }
}

/// Complete cached analysis of one message. Either entirely absent from the
/// store or entirely populated; never partially written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub message_id: String,
    pub subject: String,
    pub sender: String,
    pub date: String,
    pub snippet: String,
    pub summary: Vec<String>,
    pub priority: Priority,
    pub sentiment: Sentiment,
    pub sentiment_score: f64,
    pub category: Category,
    pub facts: ExtractedFacts,
    pub analyzed_at: DateTime<Utc>,
}

/// Per-priority tallies for the dashboard
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorityCounts {
    #[serde(rename = "HIGH")]
    pub high: u64,
    #[serde(rename = "MEDIUM")]
    pub medium: u64,
    #[serde(rename = "LOW")]
    pub low: u64,
}

impl PriorityCounts {
    pub fn get(&self, priority: Priority) -> u64 {
        match priority {
            Priority::High => self.high,
            Priority::Medium => self.medium,
            Priority::Low => self.low,
        }
    }

    pub fn bump(&mut self, priority: Priority, count: u64) {
        match priority {
            Priority::High => self.high += count,
            Priority::Medium => self.medium += count,
            Priority::Low => self.low += count,
        }
    }
}

/// Per-sentiment tallies for the dashboard
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentCounts {
    pub positive: u64,
    pub negative: u64,
    pub neutral: u64,
}

impl SentimentCounts {
    pub fn get(&self, sentiment: Sentiment) -> u64 {
        match sentiment {
            Sentiment::Positive => self.positive,
            Sentiment::Negative => self.negative,
            Sentiment::Neutral => self.neutral,
        }
    }

    pub fn bump(&mut self, sentiment: Sentiment, count: u64) {
        match sentiment {
            Sentiment::Positive => self.positive += count,
            Sentiment::Negative => self.negative += count,
            Sentiment::Neutral => self.neutral += count,
        }
    }
}

/// One row of the recently-analyzed list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentAnalysis {
    pub message_id: String,
    pub subject: String,
    pub sender: String,
    pub priority: Priority,
    pub sentiment: Sentiment,
    pub category: Category,
    pub analyzed_at: DateTime<Utc>,
}

/// Dashboard aggregates, recomputed from the full record set on demand
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregateStats {
    pub total: u64,
    pub priorities: PriorityCounts,
    pub sentiments: SentimentCounts,
    /// Keyed by category label; every known category is present, zero or not
    pub categories: BTreeMap<String, u64>,
    pub recent: Vec<RecentAnalysis>,
}

impl AggregateStats {
    /// Empty stats with all known category labels zeroed
    pub fn empty() -> Self {
        let categories = Category::ALL
            .into_iter()
            .map(|c| (c.as_str().to_string(), 0))
            .collect();
        Self {
            categories,
            ..Default::default()
        }
    }

    pub fn category_count(&self, category: Category) -> u64 {
        self.categories.get(category.as_str()).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_labels() {
        assert_eq!(Priority::High.as_str(), "HIGH");
        assert_eq!(Priority::Medium.as_str(), "MEDIUM");
        assert_eq!(Priority::Low.as_str(), "LOW");
        for p in Priority::ALL {
            assert_eq!(Priority::from_label(p.as_str()), Some(p));
        }
        assert_eq!(Priority::from_label("urgent"), None);
    }

    #[test]
    fn test_priority_serde_spelling() {
        assert_eq!(serde_json::to_string(&Priority::High).unwrap(), "\"HIGH\"");
        let parsed: Priority = serde_json::from_str("\"LOW\"").unwrap();
        assert_eq!(parsed, Priority::Low);
    }

    #[test]
    fn test_priority_default_is_medium() {
        assert_eq!(Priority::default(), Priority::Medium);
    }

    #[test]
    fn test_sentiment_labels() {
        assert_eq!(Sentiment::Positive.as_str(), "positive");
        assert_eq!(Sentiment::Negative.as_str(), "negative");
        assert_eq!(Sentiment::Neutral.as_str(), "neutral");
        for s in Sentiment::ALL {
            assert_eq!(Sentiment::from_label(s.as_str()), Some(s));
        }
        assert_eq!(Sentiment::from_label("POSITIVE"), None);
    }

    #[test]
    fn test_sentiment_serde_spelling() {
        assert_eq!(
            serde_json::to_string(&Sentiment::Neutral).unwrap(),
            "\"neutral\""
        );
        let parsed: Sentiment = serde_json::from_str("\"negative\"").unwrap();
        assert_eq!(parsed, Sentiment::Negative);
    }

    #[test]
    fn test_category_labels_roundtrip() {
        for c in Category::ALL {
            assert_eq!(Category::from_label(c.as_str()), Some(c));
            let json = serde_json::to_string(&c).unwrap();
            let parsed: Category = serde_json::from_str(&json).unwrap();
            assert_eq!(parsed, c);
        }
        assert_eq!(Category::from_label("Misc"), None);
    }

    #[test]
    fn test_category_serde_spelling() {
        assert_eq!(
            serde_json::to_string(&Category::UrgentSupport).unwrap(),
            "\"Urgent Support\""
        );
        assert_eq!(
            serde_json::to_string(&Category::SpamPromotional).unwrap(),
            "\"Spam/Promotional\""
        );
    }

    #[test]
    fn test_category_default_is_general() {
        assert_eq!(Category::default(), Category::General);
    }

    #[test]
    fn test_facts_is_empty() {
        let mut facts = ExtractedFacts::default();
        assert!(facts.is_empty());
        facts.phones.push("555-123-4567".to_string());
        assert!(!facts.is_empty());
    }

    #[test]
    fn test_priority_counts_bump_and_get() {
        let mut counts = PriorityCounts::default();
        counts.bump(Priority::High, 2);
        counts.bump(Priority::Low, 1);
        assert_eq!(counts.get(Priority::High), 2);
        assert_eq!(counts.get(Priority::Medium), 0);
        assert_eq!(counts.get(Priority::Low), 1);
    }

    #[test]
    fn test_priority_counts_serde_keys() {
        let counts = PriorityCounts {
            high: 3,
            medium: 1,
            low: 0,
        };
        let json = serde_json::to_value(&counts).unwrap();
        assert_eq!(json["HIGH"], 3);
        assert_eq!(json["MEDIUM"], 1);
        assert_eq!(json["LOW"], 0);
    }

    #[test]
    fn test_empty_stats_has_all_categories() {
        let stats = AggregateStats::empty();
        assert_eq!(stats.total, 0);
        assert_eq!(stats.categories.len(), Category::ALL.len());
        for c in Category::ALL {
            assert_eq!(stats.category_count(c), 0);
        }
        assert!(stats.recent.is_empty());
    }

    #[test]
    fn test_record_serde_roundtrip() {
        let record = AnalysisRecord {
            message_id: "m1".to_string(),
            subject: "Quarterly review".to_string(),
            sender: "Dana <dana@example.com>".to_string(),
            date: "Mon, 12 Aug 2024 09:00:00 +0000".to_string(),
            snippet: "Please review the attached".to_string(),
            summary: vec!["Review requested".to_string()],
            priority: Priority::High,
            sentiment: Sentiment::Neutral,
            sentiment_score: 0.5,
            category: Category::WorkBusiness,
            facts: ExtractedFacts {
                emails: vec!["dana@example.com".to_string()],
                ..Default::default()
            },
            analyzed_at: Utc::now(),
        };
        let json = serde_json::to_string(&record).unwrap();
        let parsed: AnalysisRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, record);
    }
}
