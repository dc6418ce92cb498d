//! Share-text builders for LinkedIn, Twitter, and Bluesky.
//!
//! Pure string formatting. Each platform gets the same takeaway list shaped
//! to its own length budget; the Twitter text must never exceed 128
//! characters including the article URL.

const SHARE_KEYWORDS: [&str; 8] = [
    "docker",
    "container",
    "kubernetes",
    "devops",
    "cloud",
    "deployment",
    "security",
    "performance",
];

/// Summary budget leaves room for the URL and a separating newline.
const SUMMARY_MAX_CHARS: usize = 95;
const TWEET_MAX_CHARS: usize = 128;

/// Numbered takeaway list, one blank line between entries.
pub fn format_takeaways(takeaways: &[String]) -> String {
    takeaways
        .iter()
        .enumerate()
        .map(|(i, t)| format!("{}. {}", i + 1, t))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// One-line teaser built from the takeaways: the first two recognized topic
/// keywords, or the opening words of the first takeaway when none match.
pub fn compelling_summary(takeaways: &[String]) -> String {
    let combined = takeaways.join(" ").to_lowercase();
    let found: Vec<&str> = SHARE_KEYWORDS
        .iter()
        .copied()
        .filter(|kw| combined.contains(kw))
        .collect();

    let mut summary = String::from("\u{1F511} Key insights: ");
    if !found.is_empty() {
        summary.push_str(&found[..found.len().min(2)].join(" & "));
    } else {
        let first_words = takeaways
            .first()
            .map(|t| t.split_whitespace().take(4).collect::<Vec<_>>().join(" "))
            .unwrap_or_default();
        summary.push_str(&first_words);
    }

    if summary.chars().count() > SUMMARY_MAX_CHARS {
        summary = truncate_with_ellipsis(&summary, SUMMARY_MAX_CHARS);
    }
    summary
}

pub fn linkedin_share_url(blog_url: &str, takeaways: &[String]) -> String {
    let text = format!(
        "Key Takeaways from {blog_url}\n\n{}\n\n#BlogSummary #KeyTakeaways",
        format_takeaways(takeaways)
    );
    format!(
        "https://www.linkedin.com/sharing/share-offsite/?url={}&summary={}",
        urlencoding::encode(blog_url),
        urlencoding::encode(&text)
    )
}

/// The tweet body: teaser plus URL, hard-capped at 128 characters.
pub fn twitter_share_text(blog_url: &str, takeaways: &[String]) -> String {
    let text = format!("{}\n{}", compelling_summary(takeaways), blog_url);
    if text.chars().count() > TWEET_MAX_CHARS {
        truncate_with_ellipsis(&text, TWEET_MAX_CHARS)
    } else {
        text
    }
}

pub fn twitter_share_url(blog_url: &str, takeaways: &[String]) -> String {
    format!(
        "https://twitter.com/intent/tweet?text={}",
        urlencoding::encode(&twitter_share_text(blog_url, takeaways))
    )
}

pub fn bluesky_share_url(blog_url: &str, takeaways: &[String]) -> String {
    let text = format!(
        "{}\n{}\n\n{}",
        compelling_summary(takeaways),
        blog_url,
        format_takeaways(takeaways)
    );
    format!(
        "https://bsky.app/intent/compose?text={}",
        urlencoding::encode(&text)
    )
}

fn truncate_with_ellipsis(s: &str, max_chars: usize) -> String {
    let head: String = s.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{head}...")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn takeaways(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn takeaways_are_numbered_and_separated() {
        let out = format_takeaways(&takeaways(&["First", "Second"]));
        assert_eq!(out, "1. First\n\n2. Second");
    }

    #[test]
    fn summary_prefers_topic_keywords() {
        let out = compelling_summary(&takeaways(&[
            "Docker images should stay small",
            "Kubernetes probes need tuning",
        ]));
        assert!(out.contains("docker & kubernetes"), "got: {out}");
        assert!(out.chars().count() <= SUMMARY_MAX_CHARS);
    }

    #[test]
    fn summary_falls_back_to_first_words() {
        let out = compelling_summary(&takeaways(&[
            "Write tests before refactoring anything big",
        ]));
        assert!(out.ends_with("Write tests before refactoring"), "got: {out}");
    }

    #[test]
    fn tweet_text_respects_cap() {
        let long = "a very long takeaway about nothing in particular ".repeat(5);
        let out = twitter_share_text("https://example.test/some/quite/long/article-path", &takeaways(&[&long]));
        assert!(out.chars().count() <= 128);
    }

    #[test]
    fn share_urls_are_percent_encoded() {
        let t = takeaways(&["Docker rules"]);
        let url = twitter_share_url("https://example.test/a b", &t);
        assert!(!url["https://twitter.com/intent/tweet?text=".len()..].contains(' '));
        let li = linkedin_share_url("https://example.test/post", &t);
        assert!(li.starts_with("https://www.linkedin.com/sharing/share-offsite/?url=https%3A%2F%2F"));
    }
}
