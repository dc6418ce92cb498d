// src/feed/mod.rs
pub mod config;
pub mod fetcher;
pub mod parser;
pub mod types;

use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Utc};
use metrics::{
    counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram,
};
use once_cell::sync::OnceCell;
use tokio::task::JoinSet;

use crate::feed::types::{FeedSource, FeedTransport, Post};

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("feed_items_total", "Raw items parsed from feed documents.");
        describe_counter!(
            "feed_posts_kept_total",
            "Posts surviving normalization + filtering, pre-truncation."
        );
        describe_counter!("feed_source_errors_total", "Source fetch/parse errors.");
        describe_histogram!("feed_fetch_ms", "Per-source fetch+parse time in milliseconds.");
        describe_histogram!("feed_parse_ms", "Feed document parse time in milliseconds.");
        describe_gauge!("feed_last_run_ts", "Unix ts when aggregation last ran.");
    });
}

/// Aggregate all sources with the fallback clock pinned to `now`.
///
/// Sources are fetched concurrently; each source is an independent unit of
/// work whose failure contributes an empty result set and a diagnostic,
/// never an error. Results are merged in source order, sorted by
/// publication time descending (stable), and truncated to `max_results`.
pub async fn aggregate_at(
    transport: Arc<dyn FeedTransport>,
    sources: &[FeedSource],
    max_results: usize,
    now: DateTime<Utc>,
) -> Vec<Post> {
    ensure_metrics_described();

    let mut set: JoinSet<(usize, String, Result<Vec<Post>>)> = JoinSet::new();
    for (idx, source) in sources.iter().cloned().enumerate() {
        let transport = Arc::clone(&transport);
        set.spawn(async move {
            let t0 = std::time::Instant::now();
            let res = fetch_and_parse(transport.as_ref(), &source, now).await;
            let ms = t0.elapsed().as_secs_f64() * 1_000.0;
            histogram!("feed_fetch_ms").record(ms);
            (idx, source.label, res)
        });
    }

    // Collect per source slot, then flatten in source order so ties in the
    // sort below resolve the same way on every run.
    let mut per_source: Vec<Vec<Post>> = vec![Vec::new(); sources.len()];
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok((idx, _label, Ok(posts))) => per_source[idx] = posts,
            Ok((_idx, label, Err(e))) => {
                tracing::warn!(error = ?e, source = %label, "feed source error");
                counter!("feed_source_errors_total").increment(1);
            }
            Err(e) => {
                tracing::warn!(error = ?e, "feed task join error");
                counter!("feed_source_errors_total").increment(1);
            }
        }
    }

    let mut all: Vec<Post> = per_source.into_iter().flatten().collect();
    counter!("feed_posts_kept_total").increment(all.len() as u64);
    gauge!("feed_last_run_ts").set(now.timestamp() as f64);

    all.sort_by(|a, b| b.published_at.cmp(&a.published_at));
    all.truncate(max_results);

    tracing::info!(posts = all.len(), sources = sources.len(), "aggregation finished");
    all
}

/// Aggregate against the real wall clock.
pub async fn aggregate(
    transport: Arc<dyn FeedTransport>,
    sources: &[FeedSource],
    max_results: usize,
) -> Vec<Post> {
    aggregate_at(transport, sources, max_results, Utc::now()).await
}

async fn fetch_and_parse(
    transport: &dyn FeedTransport,
    source: &FeedSource,
    now: DateTime<Utc>,
) -> Result<Vec<Post>> {
    let body = transport.fetch_text(&source.feed_url).await?;
    parser::parse_feed(&body, source, now)
}
