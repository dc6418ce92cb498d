// tests/feed_parser.rs
//
// Field-presence and fallback policy against fixture documents:
// CDATA/plain equivalence, title+link requirement, description cap,
// date fallback, category filtering.

use blogpulse::feed::parser::{parse_feed, DESCRIPTION_MAX_CHARS};
use blogpulse::feed::types::FeedSource;
use chrono::{DateTime, TimeZone, Utc};

const DOCKER_XML: &str = include_str!("fixtures/docker_blog.xml");
const COLLABNIX_XML: &str = include_str!("fixtures/collabnix.xml");
const RAGGED_XML: &str = include_str!("fixtures/ragged_items.xml");

fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

#[test]
fn cdata_and_plain_fields_parse_alike() {
    let source = FeedSource::new("https://www.docker.com/blog/feed/", "Docker Blog");
    let posts = parse_feed(DOCKER_XML, &source, fixed_now()).expect("docker fixture parses");

    assert_eq!(posts.len(), 3);
    assert_eq!(posts[0].title, "Docker Desktop 4.30 Released");
    assert_eq!(posts[1].title, "Build Cache Deep Dive");
    assert!(posts.iter().all(|p| p.source == "Docker Blog"));
}

#[test]
fn descriptions_are_stripped_and_capped() {
    let source = FeedSource::new("https://www.docker.com/blog/feed/", "Docker Blog");
    let posts = parse_feed(DOCKER_XML, &source, fixed_now()).unwrap();
    assert_eq!(
        posts[0].description,
        "Docker Desktop 4.30 ships with faster startup and improved volume management for large projects."
    );

    let source = FeedSource::new("https://example.test/feed/", "Ragged");
    let posts = parse_feed(RAGGED_XML, &source, fixed_now()).unwrap();
    for p in &posts {
        assert!(p.description.chars().count() <= DESCRIPTION_MAX_CHARS);
        assert!(!p.description.contains('<') && !p.description.contains('>'));
    }
}

#[test]
fn items_missing_title_or_link_are_dropped() {
    let source = FeedSource::new("https://example.test/feed/", "Ragged");
    let posts = parse_feed(RAGGED_XML, &source, fixed_now()).unwrap();

    let titles: Vec<&str> = posts.iter().map(|p| p.title.as_str()).collect();
    assert_eq!(titles, vec!["Padded Survivor", "Dateless But Kept"]);
    assert_eq!(posts[0].link, "https://example.test/padded-survivor");
    assert!(posts.iter().all(|p| !p.title.is_empty() && !p.link.is_empty()));
}

#[test]
fn missing_date_falls_back_to_now() {
    let now = fixed_now();
    let source = FeedSource::new("https://example.test/feed/", "Ragged");
    let posts = parse_feed(RAGGED_XML, &source, now).unwrap();

    let dateless = posts.iter().find(|p| p.title == "Dateless But Kept").unwrap();
    assert_eq!(dateless.published_at, now);

    let dated = posts.iter().find(|p| p.title == "Padded Survivor").unwrap();
    assert_eq!(dated.published_at.to_rfc3339(), "2024-05-09T08:00:00+00:00");
}

#[test]
fn missing_description_becomes_empty_string() {
    let source = FeedSource::new("https://example.test/feed/", "Ragged");
    let posts = parse_feed(RAGGED_XML, &source, fixed_now()).unwrap();
    let dateless = posts.iter().find(|p| p.title == "Dateless But Kept").unwrap();
    assert_eq!(dateless.description, "");
}

#[test]
fn category_filter_is_case_insensitive_substring() {
    let filtered = FeedSource::new("https://collabnix.com/feed/", "Collabnix")
        .with_required_categories(&["docker", "container", "kubernetes"]);
    let posts = parse_feed(COLLABNIX_XML, &filtered, fixed_now()).unwrap();

    let titles: Vec<&str> = posts.iter().map(|p| p.title.as_str()).collect();
    // "Docker Tips" matches despite the case, "KUBERNETES" matches, "Lifestyle" does not.
    assert_eq!(
        titles,
        vec![
            "Getting Started with Docker Compose Watch",
            "Scaling Workloads on Kubernetes 1.30"
        ]
    );
}

#[test]
fn source_without_filter_keeps_everything_well_formed() {
    let unfiltered = FeedSource::new("https://collabnix.com/feed/", "Collabnix");
    let posts = parse_feed(COLLABNIX_XML, &unfiltered, fixed_now()).unwrap();
    assert_eq!(posts.len(), 3);
}

#[test]
fn garbage_document_is_an_error_not_a_panic() {
    let source = FeedSource::new("https://example.test/feed/", "Broken");
    assert!(parse_feed("this is not xml at all", &source, fixed_now()).is_err());
    assert!(parse_feed("<html><body>404</body></html>", &source, fixed_now()).is_err());
}
