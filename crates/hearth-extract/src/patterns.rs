//! Contact-pattern extraction from free text.
//!
//! A secondary pass over raw document text with fixed patterns: email
//! addresses, loose phone numbers, URLs, and slash-delimited dates. These
//! add to the structured entities, never replace them.

use regex::Regex;

use hearth_core::types::{Entity, EntityCategory};

/// Extracts contact-like entities from text using pre-compiled patterns.
pub struct ContactExtractor {
    email_regex: Regex,
    phone_regex: Regex,
    url_regex: Regex,
    date_slash_regex: Regex,
}

impl ContactExtractor {
    /// Create a new extractor with pre-compiled regex patterns.
    pub fn new() -> Self {
        Self {
            email_regex: Regex::new(r#"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}"#).unwrap(),
            phone_regex: Regex::new(
                r#"(?:\+?\d{1,2}[\s.-]?)?\(?\d{3}\)?[\s.-]?\d{3}[\s.-]?\d{4}\b"#,
            )
            .unwrap(),
            url_regex: Regex::new(r#"https?://[^\s<>")\]]+"#).unwrap(),
            date_slash_regex: Regex::new(r#"\b\d{1,2}/\d{1,2}/\d{2,4}\b"#).unwrap(),
        }
    }

    /// Extract all recognized contact entities from the given text.
    pub fn extract(&self, text: &str) -> Vec<Entity> {
        let mut entities = Vec::new();

        // Emails (confidence 1.0)
        for m in self.email_regex.find_iter(text) {
            entities.push(Entity::new(
                "email",
                m.as_str(),
                EntityCategory::Contact,
                1.0,
            ));
        }

        // URLs (confidence 1.0)
        for m in self.url_regex.find_iter(text) {
            entities.push(Entity::new("url", m.as_str(), EntityCategory::Web, 1.0));
        }

        // Phone numbers (confidence 0.85) -- loose regional format.
        for m in self.phone_regex.find_iter(text) {
            entities.push(Entity::new(
                "phone",
                m.as_str().trim(),
                EntityCategory::Contact,
                0.85,
            ));
        }

        // Slash-delimited dates (confidence 0.9)
        for m in self.date_slash_regex.find_iter(text) {
            entities.push(Entity::new(
                "date",
                m.as_str(),
                EntityCategory::Temporal,
                0.9,
            ));
        }

        entities
    }
}

impl Default for ContactExtractor {
    fn default() -> Self {
        Self::new()
    }
}
