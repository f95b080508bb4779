//! The five analysis tasks run against every uncached message
//!
//! Each task renders its own prompt, calls the [`ModelGateway`], and parses
//! the reply into a typed result. Every task is total: gateway failure or
//! unparseable output degrades to the task's documented default instead of
//! surfacing an error, so an analysis always completes.

pub mod extract;
pub mod parse;

use tracing::warn;

use mailsense_store::{Category, ExtractedFacts, Priority, Sentiment};

use crate::providers::{CompletionRequest, ModelGateway};

/// Summary shown when the gateway fails outright
pub const SUMMARY_UNAVAILABLE: &str = "Summary unavailable.";

/// Summary shown for a message with no body text
pub const SUMMARY_EMPTY_INPUT: &str = "No email content available to summarize.";

const URGENT_KEYWORDS: &[&str] = &[
    "urgent", "asap", "immediately", "critical", "emergency", "deadline", "important",
];

const POSITIVE_WORDS: &[&str] = &[
    "thank", "appreciate", "great", "excellent", "good", "pleased", "happy", "excited",
];

const NEGATIVE_WORDS: &[&str] = &[
    "disappointed", "problem", "issue", "error", "failed", "urgent", "concern", "sorry",
];

/// Keyword groups checked before spending a model call on categorization,
/// in precedence order
const CATEGORY_KEYWORDS: &[(Category, &[&str])] = &[
    (
        Category::UrgentSupport,
        &["urgent", "support", "help", "issue", "problem", "critical"],
    ),
    (
        Category::Newsletter,
        &["newsletter", "subscribe", "unsubscribe", "promo", "discount"],
    ),
    (
        Category::SpamPromotional,
        &["spam", "promotional", "offer", "deal", "sale"],
    ),
    (
        Category::WorkBusiness,
        &["meeting", "project", "deadline", "work", "business", "team"],
    ),
    (
        Category::Personal,
        &["family", "friend", "personal", "birthday", "wedding"],
    ),
];

/// Prefix of `text` at most `max_chars` characters long
fn clip(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Summarize a message into a few short lines.
/// Default on failure: a single placeholder line.
pub async fn summarize(gateway: &ModelGateway, text: &str) -> Vec<String> {
    if text.trim().is_empty() {
        return vec![SUMMARY_EMPTY_INPUT.to_string()];
    }

    let request = CompletionRequest {
        system: Some(
            "You are an assistant that summarizes emails concisely. Always provide a summary."
                .to_string(),
        ),
        prompt: format!(
            "Summarize the following email in 2-4 concise bullet points and give \
             an actionable next-step.\n\nEMAIL:\n{}",
            clip(text, 2000)
        ),
        max_tokens: 200,
        temperature: 0.2,
    };

    match gateway.complete(&request).await {
        Ok(reply) => parse::summary_lines(&reply),
        Err(e) => {
            warn!("Summary degraded to placeholder: {}", e);
            vec![SUMMARY_UNAVAILABLE.to_string()]
        }
    }
}

/// Classify message priority. Texts carrying urgent keywords go HIGH without
/// a model call; anything unclassifiable defaults to MEDIUM.
pub async fn classify_priority(gateway: &ModelGateway, text: &str) -> Priority {
    let trimmed = text.trim();
    if trimmed.chars().count() < 10 {
        return Priority::Medium;
    }

    let lowered = trimmed.to_lowercase();
    if URGENT_KEYWORDS.iter().any(|kw| lowered.contains(kw)) {
        return Priority::High;
    }

    let request = CompletionRequest {
        system: Some(
            "You are an assistant that classifies email priority. Respond with ONLY one \
             word: HIGH, MEDIUM, or LOW. Do not include any other text."
                .to_string(),
        ),
        prompt: format!("Classify the priority of this email:\n\n{}", clip(text, 1000)),
        max_tokens: 10,
        temperature: 0.0,
    };

    match gateway.complete(&request).await {
        Ok(reply) => parse::priority_label(&reply),
        Err(e) => {
            warn!("Priority degraded to MEDIUM: {}", e);
            Priority::Medium
        }
    }
}

/// Classify sentiment with a confidence score in [0, 1]. Gateway failure
/// falls back to keyword counting over the input; the overall default is
/// neutral at 0.5.
pub async fn analyze_sentiment(gateway: &ModelGateway, text: &str) -> (Sentiment, f64) {
    if text.trim().is_empty() {
        return (Sentiment::Neutral, 0.5);
    }

    let request = CompletionRequest {
        system: Some(
            "Analyze the sentiment of the email. Respond ONLY with valid JSON in this \
             exact format: {\"sentiment\": \"positive\" or \"negative\" or \"neutral\", \
             \"score\": number between 0 and 1}. No other text."
                .to_string(),
        ),
        prompt: format!("Email text:\n{}", clip(text, 1000)),
        max_tokens: 50,
        temperature: 0.0,
    };

    match gateway.complete(&request).await {
        Ok(reply) => parse::sentiment_reply(&reply).unwrap_or_else(|| keyword_sentiment(text)),
        Err(e) => {
            warn!("Sentiment degraded to keyword counting: {}", e);
            keyword_sentiment(text)
        }
    }
}

fn keyword_sentiment(text: &str) -> (Sentiment, f64) {
    let lowered = text.to_lowercase();
    let positive = POSITIVE_WORDS.iter().filter(|w| lowered.contains(*w)).count();
    let negative = NEGATIVE_WORDS.iter().filter(|w| lowered.contains(*w)).count();

    if positive > negative {
        (Sentiment::Positive, 0.6)
    } else if negative > positive {
        (Sentiment::Negative, 0.4)
    } else {
        (Sentiment::Neutral, 0.5)
    }
}

/// File a message under one of the fixed categories. Keyword pre-checks
/// over subject and body short-circuit the model call; the default is
/// General.
pub async fn categorize(gateway: &ModelGateway, text: &str, subject: &str) -> Category {
    if text.trim().is_empty() && subject.trim().is_empty() {
        return Category::General;
    }

    let combined = format!("{} {}", subject, text).to_lowercase();
    for (category, keywords) in CATEGORY_KEYWORDS {
        if keywords.iter().any(|kw| combined.contains(kw)) {
            return *category;
        }
    }

    let labels: Vec<&str> = Category::ALL.iter().map(|c| c.as_str()).collect();
    let request = CompletionRequest {
        system: Some(format!(
            "Categorize this email into ONE of these categories: {}. Respond with ONLY \
             the category name. No other text.",
            labels.join(", ")
        )),
        prompt: format!(
            "Subject: {}\n\nBody: {}",
            clip(subject, 200),
            clip(text, 800)
        ),
        max_tokens: 20,
        temperature: 0.0,
    };

    match gateway.complete(&request).await {
        Ok(reply) => parse::category_label(&reply),
        Err(e) => {
            warn!("Category degraded to General: {}", e);
            Category::General
        }
    }
}

/// Pull structured facts out of a message. Emails and phone numbers come
/// from deterministic pattern matching and are returned regardless of model
/// behavior; dates and action items come from the model and stay empty when
/// it is unavailable.
pub async fn extract_facts(gateway: &ModelGateway, text: &str) -> ExtractedFacts {
    let mut facts = ExtractedFacts {
        emails: extract::extract_emails(text),
        phones: extract::extract_phones(text),
        ..Default::default()
    };

    if text.trim().is_empty() {
        return facts;
    }

    let request = CompletionRequest {
        system: Some(
            "Extract action items and important dates from the email. Respond ONLY with \
             valid JSON: {\"action_items\": [\"item1\", \"item2\"], \"dates\": [\"date1\", \
             \"date2\"]}. If none found, use empty arrays."
                .to_string(),
        ),
        prompt: clip(text, 2000).to_string(),
        max_tokens: 200,
        temperature: 0.0,
    };

    match gateway.complete(&request).await {
        Ok(reply) => {
            let (dates, action_items) = parse::facts_reply(&reply);
            facts.dates = dates;
            facts.action_items = action_items;
        }
        Err(e) => warn!("Fact extraction kept pattern matches only: {}", e),
    }

    facts
}
