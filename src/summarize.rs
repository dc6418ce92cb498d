//! Article summarization: content extraction + chat completions + reply repair.
//!
//! Two chained upstream calls: the reader service turns a URL into plain
//! text, the chat-completions API turns that text into takeaways. The model
//! reply is untrusted output and is always repaired into exactly
//! [`TAKEAWAY_COUNT`] strings before it reaches the caller.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A summary is always exactly this many takeaways.
pub const TAKEAWAY_COUNT: usize = 5;

/// Article text is capped before prompting; anything longer buys no better
/// takeaways.
const CONTENT_MAX_CHARS: usize = 15_000;

const FILLER_TAKEAWAY: &str = "Key insight extracted from the content.";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SummarizeError {
    #[error("Failed to fetch the website content")]
    ContentFetch,
    #[error("Could not extract content from the website")]
    NoContent,
    #[error("AI service not configured")]
    NotConfigured,
    #[error("Rate limit exceeded. Please try again later.")]
    RateLimited,
    #[error("AI credits exhausted. Please add more credits.")]
    CreditsExhausted,
    #[error("Failed to generate summary")]
    SummaryFailed,
}

/// Trait object used by the API layer; tests substitute a mock.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn takeaways(&self, url: &str) -> Result<Vec<String>, SummarizeError>;
    /// Provider name for diagnostics.
    fn provider_name(&self) -> &'static str;
}

/// Production summarizer: reader service for extraction, OpenAI chat
/// completions for the takeaways. Requires `OPENAI_API_KEY`.
pub struct BlogSummarizer {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

impl BlogSummarizer {
    pub fn from_env() -> Self {
        let api_key = std::env::var("OPENAI_API_KEY").unwrap_or_default();
        let model =
            std::env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());
        let http = reqwest::Client::builder()
            .user_agent("blogpulse/0.1 (+github.com/blogpulse/blogpulse)")
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(30))
            .build()
            .expect("reqwest client");
        Self {
            http,
            api_key,
            model,
        }
    }

    async fn extract_content(&self, url: &str) -> Result<String, SummarizeError> {
        let resp = self
            .http
            .get(format!("https://r.jina.ai/{url}"))
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(error = ?e, "reader request failed");
                SummarizeError::ContentFetch
            })?;

        if !resp.status().is_success() {
            tracing::warn!(status = %resp.status(), "reader returned non-success");
            return Err(SummarizeError::ContentFetch);
        }

        let body: serde_json::Value = resp
            .json()
            .await
            .map_err(|_| SummarizeError::ContentFetch)?;
        let content = body
            .pointer("/data/content")
            .and_then(|v| v.as_str())
            .or_else(|| body.get("content").and_then(|v| v.as_str()))
            .unwrap_or_default()
            .to_string();

        if content.is_empty() {
            return Err(SummarizeError::NoContent);
        }
        Ok(content)
    }

    async fn complete(&self, content: &str) -> Result<String, SummarizeError> {
        #[derive(Serialize)]
        struct Msg<'a> {
            role: &'a str,
            content: &'a str,
        }
        #[derive(Serialize)]
        struct Req<'a> {
            model: &'a str,
            messages: Vec<Msg<'a>>,
        }
        #[derive(Deserialize)]
        struct Resp {
            choices: Vec<Choice>,
        }
        #[derive(Deserialize)]
        struct Choice {
            message: ChoiceMsg,
        }
        #[derive(Deserialize)]
        struct ChoiceMsg {
            content: String,
        }

        let sys = "You are an expert content summarizer. Extract exactly 5 key takeaways \
                   from blog posts. Each takeaway should be concise, actionable, and capture \
                   the essence of the content. Return ONLY a JSON array of 5 strings, nothing else.";
        let user = format!("Summarize this blog post into exactly 5 key takeaways:\n\n{content}");
        let req = Req {
            model: &self.model,
            messages: vec![
                Msg {
                    role: "system",
                    content: sys,
                },
                Msg {
                    role: "user",
                    content: &user,
                },
            ],
        };

        let resp = self
            .http
            .post("https://api.openai.com/v1/chat/completions")
            .bearer_auth(&self.api_key)
            .json(&req)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(error = ?e, "chat completions request failed");
                SummarizeError::SummaryFailed
            })?;

        let status = resp.status();
        if status.as_u16() == 429 {
            return Err(SummarizeError::RateLimited);
        }
        if status.as_u16() == 402 {
            return Err(SummarizeError::CreditsExhausted);
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            tracing::warn!(status = %status, body = %body, "chat completions error");
            return Err(SummarizeError::SummaryFailed);
        }

        let body: Resp = resp
            .json()
            .await
            .map_err(|_| SummarizeError::SummaryFailed)?;
        Ok(body
            .choices
            .first()
            .map(|c| c.message.content.clone())
            .unwrap_or_default())
    }
}

#[async_trait]
impl Summarizer for BlogSummarizer {
    async fn takeaways(&self, url: &str) -> Result<Vec<String>, SummarizeError> {
        let content = self.extract_content(url).await?;

        if self.api_key.is_empty() {
            return Err(SummarizeError::NotConfigured);
        }

        let capped: String = content.chars().take(CONTENT_MAX_CHARS).collect();
        let reply = self.complete(&capped).await?;
        Ok(repair_takeaways(&reply))
    }

    fn provider_name(&self) -> &'static str {
        "openai"
    }
}

/// Fixed-output summarizer for tests and local runs.
pub struct MockSummarizer {
    pub fixed: Vec<String>,
}

#[async_trait]
impl Summarizer for MockSummarizer {
    async fn takeaways(&self, _url: &str) -> Result<Vec<String>, SummarizeError> {
        Ok(repair_takeaways(
            &serde_json::to_string(&self.fixed).unwrap_or_default(),
        ))
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// Coerce a model reply into exactly [`TAKEAWAY_COUNT`] strings.
///
/// Preference order: the first JSON array in the text; otherwise a
/// line-split with list markers stripped and short fragments dropped.
/// A JSON array that fails to parse yields the canned fallback set. The
/// result is padded/truncated so callers can rely on the count.
pub fn repair_takeaways(raw: &str) -> Vec<String> {
    static RE_ARRAY: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    let re_array = RE_ARRAY.get_or_init(|| regex::Regex::new(r"(?s)\[.*\]").unwrap());
    static RE_MARKER: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    let re_marker = RE_MARKER.get_or_init(|| regex::Regex::new(r"^[\d\-*.]\s*").unwrap());

    let mut takeaways: Vec<String> = if let Some(m) = re_array.find(raw) {
        match serde_json::from_str::<Vec<String>>(m.as_str()) {
            Ok(v) => v,
            Err(_) => return parse_failure_takeaways(),
        }
    } else {
        raw.lines()
            .map(|line| re_marker.replace(line.trim(), "").trim().to_string())
            .filter(|line| line.chars().count() > 10)
            .take(TAKEAWAY_COUNT)
            .collect()
    };

    while takeaways.len() < TAKEAWAY_COUNT {
        takeaways.push(FILLER_TAKEAWAY.to_string());
    }
    takeaways.truncate(TAKEAWAY_COUNT);
    takeaways
}

fn parse_failure_takeaways() -> Vec<String> {
    [
        "Unable to extract key takeaways.",
        "Please try with a different blog URL.",
        "The content may not be accessible.",
        "Try again with a different article.",
        "Check if the URL is correct.",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_json_array_is_used_as_is() {
        let raw = r#"["First takeaway", "Second", "Third", "Fourth", "Fifth"]"#;
        let out = repair_takeaways(raw);
        assert_eq!(out.len(), TAKEAWAY_COUNT);
        assert_eq!(out[0], "First takeaway");
        assert_eq!(out[4], "Fifth");
    }

    #[test]
    fn json_array_inside_prose_is_extracted() {
        let raw = "Here are your takeaways:\n[\"One thing\", \"Two thing\"]\nEnjoy!";
        let out = repair_takeaways(raw);
        assert_eq!(out.len(), TAKEAWAY_COUNT);
        assert_eq!(out[0], "One thing");
        assert_eq!(out[2], FILLER_TAKEAWAY);
    }

    #[test]
    fn numbered_lines_are_repaired_when_no_array_present() {
        let raw = "1. Containers isolate dependencies cleanly\n\
                   2. Multi-stage builds shrink images\n\
                   short\n\
                   - Healthchecks catch silent failures";
        let out = repair_takeaways(raw);
        assert_eq!(out.len(), TAKEAWAY_COUNT);
        assert_eq!(out[0], "Containers isolate dependencies cleanly");
        assert_eq!(out[1], "Multi-stage builds shrink images");
        assert_eq!(out[2], "Healthchecks catch silent failures");
        assert_eq!(out[3], FILLER_TAKEAWAY);
    }

    #[test]
    fn unparseable_array_falls_back_to_canned_set() {
        let raw = "[one, two, not json]";
        let out = repair_takeaways(raw);
        assert_eq!(out.len(), TAKEAWAY_COUNT);
        assert_eq!(out[0], "Unable to extract key takeaways.");
    }

    #[test]
    fn oversized_array_is_truncated() {
        let raw = r#"["a1","a2","a3","a4","a5","a6","a7"]"#;
        let out = repair_takeaways(raw);
        assert_eq!(out.len(), TAKEAWAY_COUNT);
        assert_eq!(out[4], "a5");
    }
}
