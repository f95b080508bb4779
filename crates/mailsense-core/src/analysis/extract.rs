//! Deterministic fact extraction from message text
//!
//! Email addresses and phone numbers come from pattern matching, never the
//! model, so they survive any model outage.

use regex::Regex;
use std::sync::OnceLock;

fn email_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b")
            .unwrap()
    })
}

fn phone_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\b\d{3}[-.]?\d{3}[-.]?\d{4}\b|\(\d{3}\)\s*\d{3}[-.]?\d{4}")
            .unwrap()
    })
}

/// All email addresses in `text`, deduplicated in first-seen order
pub fn extract_emails(text: &str) -> Vec<String> {
    dedup_matches(email_pattern(), text)
}

/// All phone numbers in `text`, deduplicated in first-seen order
pub fn extract_phones(text: &str) -> Vec<String> {
    dedup_matches(phone_pattern(), text)
}

fn dedup_matches(pattern: &Regex, text: &str) -> Vec<String> {
    let mut seen = Vec::new();
    for m in pattern.find_iter(text) {
        let value = m.as_str().to_string();
        if !seen.contains(&value) {
            seen.push(value);
        }
    }
    seen
}
