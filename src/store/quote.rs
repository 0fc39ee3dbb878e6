//! Quote record model.
#![allow(dead_code)]

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// A saved quote. Records are immutable once stored.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Quote {
    /// Unique ID (ULID).
    pub id: String,

    /// Platform user id of the quoted author. May be empty when the
    /// platform did not reveal it.
    pub author_id: String,

    /// Author nickname at capture time.
    pub author_name: String,

    /// Avatar reference resolved at capture time: a URL or a path
    /// relative to the data root. Empty means "derive from author_id".
    #[serde(default)]
    pub author_avatar: String,

    /// Quote text, mentions already stripped.
    #[serde(default)]
    pub text: Option<String>,

    /// Saved image paths relative to the data root.
    #[serde(default)]
    pub images: Vec<String>,

    /// User id of whoever saved the quote.
    pub created_by: String,

    /// Unix timestamp in milliseconds.
    pub created_at: i64,
}

impl Quote {
    /// Create a new quote record with a fresh ULID and current timestamp.
    pub fn new(
        author_id: &str,
        author_name: &str,
        text: Option<String>,
        images: Vec<String>,
        created_by: &str,
    ) -> Self {
        Self {
            id: ulid::Ulid::new().to_string(),
            author_id: author_id.to_string(),
            author_name: author_name.to_string(),
            author_avatar: String::new(),
            text,
            images,
            created_by: created_by.to_string(),
            created_at: now_millis(),
        }
    }

    pub fn with_avatar(mut self, avatar: &str) -> Self {
        self.author_avatar = avatar.to_string();
        self
    }

    /// A record must carry text or at least one image.
    pub fn has_content(&self) -> bool {
        self.text.as_deref().is_some_and(|t| !t.trim().is_empty()) || !self.images.is_empty()
    }

    pub fn has_images(&self) -> bool {
        !self.images.is_empty()
    }

    /// Short one-line preview for listings.
    pub fn preview(&self) -> String {
        match self.text.as_deref() {
            Some(t) if !t.trim().is_empty() => {
                let mut s: String = t.chars().take(60).collect();
                if t.chars().count() > 60 {
                    s.push_str("...");
                }
                s
            }
            _ => format!("[{} photo(s)]", self.images.len()),
        }
    }
}

/// Current unix time in milliseconds.
pub fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_millis() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_record() {
        let q = Quote::new("12345", "Alice", Some("hello".to_string()), vec![], "67890");

        assert!(!q.id.is_empty());
        assert_eq!(q.author_name, "Alice");
        assert!(q.has_content());
        assert!(!q.has_images());
        assert!(q.created_at > 0);
    }

    #[test]
    fn empty_text_and_images_has_no_content() {
        let q = Quote::new("1", "Bob", Some("   ".to_string()), vec![], "2");
        assert!(!q.has_content());

        let q = Quote::new("1", "Bob", None, vec!["quotes/images/a.jpg".to_string()], "2");
        assert!(q.has_content());
        assert!(q.has_images());
    }

    #[test]
    fn preview_truncates_long_text() {
        let text = "x".repeat(100);
        let q = Quote::new("1", "Bob", Some(text), vec![], "2");
        assert_eq!(q.preview().chars().count(), 63);
        assert!(q.preview().ends_with("..."));
    }

    #[test]
    fn preview_shows_photo_placeholder() {
        let q = Quote::new("1", "Bob", None, vec!["quotes/images/a.jpg".to_string()], "2");
        assert_eq!(q.preview(), "[1 photo(s)]");
    }
}
