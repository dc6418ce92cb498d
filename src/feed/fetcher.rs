// src/feed/fetcher.rs
use std::time::Duration;

use anyhow::{Context, Result};

use crate::feed::types::FeedTransport;

/// HTTP transport for feed documents. One shared client, bounded timeouts so
/// a stalled upstream cannot pin the whole aggregation.
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .user_agent("blogpulse/0.1 (+github.com/blogpulse/blogpulse)")
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(10))
            .build()
            .expect("reqwest client");
        Self { client }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl FeedTransport for HttpTransport {
    async fn fetch_text(&self, url: &str) -> Result<String> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("GET {url}"))?;

        let status = resp.status();
        if !status.is_success() {
            anyhow::bail!("GET {url} returned HTTP {status}");
        }

        resp.text().await.with_context(|| format!("{url} body"))
    }
}
