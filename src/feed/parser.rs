// src/feed/parser.rs
//
// Lenient RSS extraction. The tolerance rules are the contract here:
// CDATA and plain text are equivalent, an item must carry a title AND a
// link to survive, a missing description becomes an empty string, and a
// missing or unparseable pubDate falls back to the caller's "now".
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use metrics::{counter, histogram};
use quick_xml::de::from_str;
use serde::Deserialize;
use time::format_description::well_known::{Rfc2822, Rfc3339};
use time::OffsetDateTime;

use crate::feed::types::{FeedSource, Post};

/// Hard cap on the cleaned description, in characters.
pub const DESCRIPTION_MAX_CHARS: usize = 150;

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    item: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    description: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    #[serde(default)]
    category: Vec<String>,
}

/// Parse one feed document into normalized posts for `source`, applying its
/// optional category filter. `now` is the fallback publication time and is
/// sampled once per aggregation call so results stay reproducible.
pub fn parse_feed(xml: &str, source: &FeedSource, now: DateTime<Utc>) -> Result<Vec<Post>> {
    let t0 = std::time::Instant::now();

    let xml_clean = scrub_html_entities_for_xml(xml);
    let rss: Rss =
        from_str(&xml_clean).with_context(|| format!("parsing {} feed xml", source.label))?;

    counter!("feed_items_total").increment(rss.channel.item.len() as u64);

    let mut out = Vec::with_capacity(rss.channel.item.len());
    for it in rss.channel.item {
        let title = it.title.as_deref().unwrap_or_default().trim();
        let link = it.link.as_deref().unwrap_or_default().trim();
        // Malformed item, not an error: skip silently.
        if title.is_empty() || link.is_empty() {
            continue;
        }

        let categories: Vec<String> = it
            .category
            .iter()
            .map(|c| c.trim().to_lowercase())
            .filter(|c| !c.is_empty())
            .collect();
        if let Some(required) = &source.required_categories {
            if !has_required_category(&categories, required) {
                continue;
            }
        }

        out.push(Post {
            title: title.to_string(),
            link: link.to_string(),
            description: clean_description(it.description.as_deref().unwrap_or_default()),
            published_at: parse_pub_date(it.pub_date.as_deref(), now),
            source: source.label.clone(),
        });
    }

    let ms = t0.elapsed().as_secs_f64() * 1_000.0;
    histogram!("feed_parse_ms").record(ms);

    Ok(out)
}

/// True if any (already lower-cased) category contains one of the required
/// substrings, compared case-insensitively.
pub fn has_required_category(categories: &[String], required: &[String]) -> bool {
    categories
        .iter()
        .any(|cat| required.iter().any(|req| cat.contains(&req.to_lowercase())))
}

/// Decode entities, strip `<...>` markup, cap at 150 characters, trim.
pub fn clean_description(raw: &str) -> String {
    let decoded = html_escape::decode_html_entities(raw);

    static RE_TAGS: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]*>").unwrap());
    let stripped = re_tags.replace_all(&decoded, "");

    let capped: String = stripped.chars().take(DESCRIPTION_MAX_CHARS).collect();
    capped.trim().to_string()
}

/// RFC 2822 is what RSS promises; RFC 3339 shows up in the wild anyway.
/// Anything else (or nothing) resolves to `now` — a post is never dropped
/// for a bad date.
pub fn parse_pub_date(raw: Option<&str>, now: DateTime<Utc>) -> DateTime<Utc> {
    let Some(raw) = raw else { return now };
    let raw = raw.trim();

    OffsetDateTime::parse(raw, &Rfc2822)
        .or_else(|_| OffsetDateTime::parse(raw, &Rfc3339))
        .ok()
        .and_then(|dt| DateTime::from_timestamp(dt.unix_timestamp(), 0))
        .unwrap_or(now)
}

fn scrub_html_entities_for_xml(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
        .replace("&lsquo;", "'")
        .replace("&rsquo;", "'")
}
