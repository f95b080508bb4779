//! Parsing of model replies into typed analysis results
//!
//! Every parser here is total: malformed output maps to the task's
//! documented default instead of an error.

use serde::Deserialize;

use mailsense_store::{Category, Priority, Sentiment};

/// Payload of the first fenced code block if the reply carries one,
/// otherwise the trimmed reply
pub fn strip_code_fences(reply: &str) -> &str {
    let trimmed = reply.trim();
    if let Some(start) = trimmed.find("```json") {
        return fence_inner(&trimmed[start + 7..]).trim();
    }
    if let Some(start) = trimmed.find("```") {
        return fence_inner(&trimmed[start + 3..]).trim();
    }
    trimmed
}

fn fence_inner(rest: &str) -> &str {
    match rest.find("```") {
        Some(end) => &rest[..end],
        None => rest,
    }
}

/// Split a summary reply into clean lines with bullet markers dropped.
/// If nothing survives, the raw reply becomes the single entry.
pub fn summary_lines(reply: &str) -> Vec<String> {
    let lines: Vec<String> = reply
        .lines()
        .map(strip_marker)
        .filter(|line| !line.is_empty())
        .map(|line| line.to_string())
        .collect();
    if lines.is_empty() {
        vec![reply.trim().to_string()]
    } else {
        lines
    }
}

fn strip_marker(line: &str) -> &str {
    let stripped = line.trim().trim_start_matches(['-', '*', '•']).trim_start();
    let digits = stripped.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits > 0 {
        let rest = &stripped[digits..];
        if let Some(rest) = rest.strip_prefix('.').or_else(|| rest.strip_prefix(')')) {
            return rest.trim_start();
        }
    }
    stripped
}

/// Scan the uppercased reply for HIGH, then MEDIUM, then LOW
pub fn priority_label(reply: &str) -> Priority {
    let label = reply.to_uppercase();
    if label.contains("HIGH") {
        Priority::High
    } else if label.contains("MEDIUM") {
        Priority::Medium
    } else if label.contains("LOW") {
        Priority::Low
    } else {
        Priority::Medium
    }
}

#[derive(Deserialize)]
struct SentimentJson {
    sentiment: String,
    #[serde(default = "default_score")]
    score: f64,
}

fn default_score() -> f64 {
    0.5
}

/// Sentiment from a model reply. Well-formed JSON with a known label wins;
/// a non-JSON reply is scanned for the label words. `None` means the reply
/// was valid JSON with an unrecognized label, and the caller falls back to
/// keyword counting over the input text.
pub fn sentiment_reply(reply: &str) -> Option<(Sentiment, f64)> {
    let cleaned = strip_code_fences(reply);
    match serde_json::from_str::<SentimentJson>(cleaned) {
        Ok(parsed) => Sentiment::from_label(&parsed.sentiment)
            .map(|sentiment| (sentiment, parsed.score.clamp(0.0, 1.0))),
        Err(_) => {
            let lowered = reply.to_lowercase();
            if lowered.contains("positive") {
                Some((Sentiment::Positive, 0.7))
            } else if lowered.contains("negative") {
                Some((Sentiment::Negative, 0.3))
            } else {
                Some((Sentiment::Neutral, 0.5))
            }
        }
    }
}

/// Category from a model reply, accepted when the reply and a known label
/// contain each other case-insensitively
pub fn category_label(reply: &str) -> Category {
    let cleaned = reply.trim().to_lowercase();
    if cleaned.is_empty() {
        return Category::General;
    }
    for category in Category::ALL {
        let label = category.as_str().to_lowercase();
        if cleaned.contains(&label) || label.contains(&cleaned) {
            return category;
        }
    }
    Category::General
}

#[derive(Deserialize)]
struct FactsJson {
    #[serde(default)]
    action_items: Vec<String>,
    #[serde(default)]
    dates: Vec<String>,
}

/// (dates, action items) from a fact-extraction reply. When the JSON does
/// not parse, action items are salvaged from reply lines that look like
/// list entries; dates stay empty.
pub fn facts_reply(reply: &str) -> (Vec<String>, Vec<String>) {
    let cleaned = strip_code_fences(reply);
    if let Ok(parsed) = serde_json::from_str::<FactsJson>(cleaned) {
        return (parsed.dates, parsed.action_items);
    }

    let mut action_items = Vec::new();
    for line in reply.lines() {
        let line = line.trim();
        let listed = line.starts_with(['-', '*'])
            || line.chars().next().is_some_and(|c| c.is_ascii_digit());
        if listed {
            let item = line.trim_start_matches(['-', '*', ' ']).trim().to_string();
            if !item.is_empty() {
                action_items.push(item);
            }
        }
    }
    (Vec::new(), action_items)
}
