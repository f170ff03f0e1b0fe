// tests/providers_html.rs
use std::sync::Arc;

use job_hunt::ingest::fetch::StaticFetcher;
use job_hunt::ingest::providers::HtmlBoardProvider;
use job_hunt::{SourceError, SourceProvider};

const LINKEDIN: &str = include_str!("fixtures/linkedin_cards.html");
const GLASSDOOR: &str = include_str!("fixtures/glassdoor_cards.html");

#[test]
fn linkedin_cards_parse_with_dates_and_absolute_links() {
    let p = HtmlBoardProvider::linkedin(Arc::new(StaticFetcher::new()));
    let jobs = p.parse_page(LINKEDIN).unwrap();
    assert_eq!(jobs.len(), 2);

    assert_eq!(jobs[0].title, "Staff Product Manager");
    assert_eq!(jobs[0].company, "Acme");
    assert_eq!(jobs[0].location, "Amsterdam, North Holland, Netherlands");
    assert_eq!(jobs[0].posted_date, "2025-02-10");
    assert!(jobs[0]
        .link
        .starts_with("https://www.linkedin.com/jobs/view/staff-product-manager-at-acme-3901?"));

    assert_eq!(
        jobs[1].link,
        "https://www.linkedin.com/jobs/view/product-owner-at-globex-3902"
    );
    assert_eq!(jobs[1].posted_date, "");
}

#[test]
fn glassdoor_cards_without_href_are_skipped() {
    let p = HtmlBoardProvider::glassdoor(Arc::new(StaticFetcher::new()));
    let jobs = p.parse_page(GLASSDOOR).unwrap();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].title, "Group Product Manager");
    assert_eq!(jobs[0].company, "Initech");
    assert_eq!(jobs[0].location, "Lisbon, Portugal");
    assert_eq!(
        jobs[0].link,
        "https://www.glassdoor.com/job-listing/group-product-manager-initech-JV_IC123.htm?jl=1009"
    );
}

#[test]
fn page_without_cards_is_empty_not_error() {
    let p = HtmlBoardProvider::indeed(Arc::new(StaticFetcher::new()));
    assert!(p.parse_page("<html><body>No jobs</body></html>").unwrap().is_empty());
}

#[tokio::test]
async fn fetch_uses_encoded_keyword_in_url() {
    let fetcher = StaticFetcher::new().with_page(
        "https://www.indeed.com/jobs?q=product+manager",
        r#"<a class="tapItem" href="/viewjob?jk=1"><h2>Product Manager</h2></a>"#,
    );
    let p = HtmlBoardProvider::indeed(Arc::new(fetcher));
    let jobs = p.fetch("product manager").await.unwrap();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].link, "https://www.indeed.com/viewjob?jk=1");

    // unknown keyword -> 404 from the fetcher -> source failure
    assert!(matches!(p.fetch("other").await, Err(SourceError::Fetch(_))));
}
