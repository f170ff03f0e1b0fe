// tests/providers_alljobs_rss.rs
use std::sync::Arc;

use job_hunt::ingest::fetch::StaticFetcher;
use job_hunt::ingest::providers::{search_url, AllJobsRssProvider};
use job_hunt::{SourceError, SourceProvider};

const FEED: &str = include_str!("fixtures/alljobs_rss.xml");
const FEED_MULTI: &str = include_str!("fixtures/alljobs_rss_multi.xml");
const FEED_RELATIVE: &str = include_str!("fixtures/alljobs_rss_relative.xml");
const TEMPLATE: &str = "https://feeds.test/rss?q={keyword}";

fn provider(body: &str) -> AllJobsRssProvider {
    let fetcher = StaticFetcher::new().with_page(search_url(TEMPLATE, "pm"), body);
    AllJobsRssProvider::new(Arc::new(fetcher)).with_url_template(TEMPLATE)
}

#[tokio::test]
async fn single_item_feed_yields_location_and_link() {
    let jobs = provider(FEED).fetch("pm").await.expect("rss parse ok");
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].title, "Product Manager");
    assert_eq!(jobs[0].location, "Tel Aviv, Israel");
    assert_eq!(jobs[0].link, "http://example.com/rss1");
    assert_eq!(jobs[0].posted_date, "");
}

#[tokio::test]
async fn multi_item_feed_parses_fields_and_skips_untitled() {
    let jobs = provider(FEED_MULTI).fetch("pm").await.expect("rss parse ok");
    assert_eq!(jobs.len(), 2);

    assert_eq!(jobs[0].title, "Senior Product Manager - Payments");
    assert_eq!(jobs[0].company, "Fintech Ltd");
    assert_eq!(jobs[0].location, "Haifa, Israel");
    assert_eq!(jobs[0].posted_date, "2025-01-06");
    assert_eq!(
        jobs[0].link,
        "https://www.alljobs.co.il/Search/UploadSingle.aspx?JobID=101"
    );

    assert_eq!(jobs[1].title, "QA Engineer");
    assert_eq!(jobs[1].company, "");
}

#[tokio::test]
async fn http_failure_is_an_error_not_an_empty_result() {
    let p = AllJobsRssProvider::new(Arc::new(StaticFetcher::new())).with_url_template(TEMPLATE);
    assert!(matches!(p.fetch("pm").await, Err(SourceError::Fetch(_))));
}

#[tokio::test]
async fn garbage_body_is_a_parse_error() {
    let r = provider("<html><body>Access denied").fetch("pm").await;
    assert!(matches!(r, Err(SourceError::Parse { .. })), "{r:?}");
}

#[tokio::test]
async fn relative_item_link_is_resolved_against_site() {
    let jobs = provider(FEED_RELATIVE).fetch("pm").await.expect("rss parse ok");
    assert_eq!(jobs.len(), 1);
    assert_eq!(
        jobs[0].link,
        "https://www.alljobs.co.il/Search/UploadSingle.aspx?JobID=42"
    );
    assert_eq!(
        jobs[0].canonical_link().as_str(),
        "https://www.alljobs.co.il/Search/UploadSingle.aspx"
    );
}
