// src/feed/types.rs
use anyhow::Result;
use chrono::{DateTime, Utc};

/// One configured upstream feed: where to fetch it and what to call it.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct FeedSource {
    pub feed_url: String,
    pub label: String,
    /// Optional substring filter: an item is kept only if one of its
    /// lower-cased categories contains one of these (case-insensitive).
    #[serde(default)]
    pub required_categories: Option<Vec<String>>,
}

impl FeedSource {
    pub fn new(feed_url: &str, label: &str) -> Self {
        Self {
            feed_url: feed_url.to_string(),
            label: label.to_string(),
            required_categories: None,
        }
    }

    pub fn with_required_categories(mut self, categories: &[&str]) -> Self {
        self.required_categories = Some(categories.iter().map(|s| s.to_string()).collect());
        self
    }
}

/// A normalized feed item ready for output. Immutable after creation;
/// lives only for the duration of one aggregation call.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct Post {
    pub title: String,
    pub link: String,
    pub description: String,
    #[serde(rename = "publishedAt")]
    pub published_at: DateTime<Utc>,
    pub source: String,
}

/// Transport seam for feed retrieval. Production uses reqwest; tests
/// substitute in-memory documents.
#[async_trait::async_trait]
pub trait FeedTransport: Send + Sync {
    async fn fetch_text(&self, url: &str) -> Result<String>;
}
