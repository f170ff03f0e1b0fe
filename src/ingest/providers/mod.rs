// src/ingest/providers/mod.rs
pub mod alljobs_rss;
pub mod arbeitnow;
pub mod html_board;

use chrono::{DateTime, NaiveDate};
use std::sync::Arc;

use crate::config::SearchConfig;
use crate::ingest::fetch::PageFetcher;
use crate::ingest::types::SourceProvider;

pub use alljobs_rss::AllJobsRssProvider;
pub use arbeitnow::ArbeitnowProvider;
pub use html_board::{CardSelectors, HtmlBoardProvider};

/// Fill `{keyword}` with the form-encoded keyword (spaces become `+`).
pub fn search_url(template: &str, keyword: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(keyword.as_bytes()).collect();
    template.replace("{keyword}", &encoded)
}

/// Best-effort `YYYY-MM-DD`; empty when the input is not a recognizable date.
pub fn iso_date(raw: &str) -> String {
    let raw = raw.trim();
    if let Some(prefix) = raw.get(..10) {
        if let Ok(d) = NaiveDate::parse_from_str(prefix, "%Y-%m-%d") {
            return d.format("%Y-%m-%d").to_string();
        }
    }
    DateTime::parse_from_rfc2822(raw)
        .map(|dt| dt.date_naive().format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

/// Enabled adapters in fixed order: Indeed, LinkedIn, Glassdoor, Arbeitnow, AllJobs.
pub fn default_sources(
    cfg: &SearchConfig,
    fetcher: Arc<dyn PageFetcher>,
) -> Vec<Box<dyn SourceProvider>> {
    let all: Vec<Box<dyn SourceProvider>> = vec![
        Box::new(HtmlBoardProvider::indeed(fetcher.clone())),
        Box::new(HtmlBoardProvider::linkedin(fetcher.clone())),
        Box::new(HtmlBoardProvider::glassdoor(fetcher.clone())),
        Box::new(ArbeitnowProvider::new(fetcher.clone(), cfg.max_pages)),
        Box::new(AllJobsRssProvider::new(fetcher)),
    ];
    all.into_iter()
        .filter(|p| cfg.source_enabled(p.name()))
        .collect()
}
