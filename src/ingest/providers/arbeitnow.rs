// src/ingest/providers/arbeitnow.rs
use async_trait::async_trait;
use chrono::DateTime;
use metrics::counter;
use serde::Deserialize;
use std::sync::Arc;
use url::Url;

use super::search_url;
use crate::ingest::fetch::PageFetcher;
use crate::ingest::normalize_text;
use crate::ingest::types::{JobPosting, SourceError, SourceProvider};

const NAME: &str = "Arbeitnow";
const SEARCH_URL: &str = "https://www.arbeitnow.com/api/job-board-api?search={keyword}";
const BASE_URL: &str = "https://www.arbeitnow.com/";

#[derive(Debug, Deserialize)]
struct Page {
    #[serde(default)]
    data: Vec<Item>,
    #[serde(default)]
    links: Links,
}

#[derive(Debug, Default, Deserialize)]
struct Links {
    next: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    company_name: Option<String>,
    location: Option<String>,
    url: Option<String>,
    created_at: Option<i64>, // unix seconds
}

/// JSON REST board; follows `links.next` until it is absent (or the page cap is hit).
pub struct ArbeitnowProvider {
    fetcher: Arc<dyn PageFetcher>,
    url_template: String,
    base_url: Url,
    max_pages: usize,
}

impl ArbeitnowProvider {
    pub fn new(fetcher: Arc<dyn PageFetcher>, max_pages: usize) -> Self {
        Self {
            fetcher,
            url_template: SEARCH_URL.to_string(),
            base_url: Url::parse(BASE_URL).expect("static url"),
            max_pages: max_pages.max(1),
        }
    }

    pub fn with_url_template(mut self, template: impl Into<String>) -> Self {
        self.url_template = template.into();
        self
    }

    fn resolve(&self, raw: Option<String>) -> Option<String> {
        let raw = raw?;
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        self.base_url.join(raw).ok().map(String::from)
    }

    fn parse_page(&self, body: &str) -> Result<(Vec<JobPosting>, Option<String>), SourceError> {
        let page: Page = serde_json::from_str(body).map_err(|e| SourceError::parse(NAME, e))?;
        let jobs = page
            .data
            .into_iter()
            .filter_map(|it| {
                let title = normalize_text(it.title.as_deref()?);
                let link = self.resolve(it.url)?;
                if title.is_empty() {
                    return None;
                }
                Some(JobPosting {
                    title,
                    company: normalize_text(it.company_name.as_deref().unwrap_or_default()),
                    location: normalize_text(it.location.as_deref().unwrap_or_default()),
                    link,
                    posted_date: it
                        .created_at
                        .and_then(|ts| DateTime::from_timestamp(ts, 0))
                        .map(|dt| dt.date_naive().format("%Y-%m-%d").to_string())
                        .unwrap_or_default(),
                })
            })
            .collect();
        let next = self.resolve(page.links.next);
        Ok((jobs, next))
    }
}

#[async_trait]
impl SourceProvider for ArbeitnowProvider {
    async fn fetch(&self, keyword: &str) -> Result<Vec<JobPosting>, SourceError> {
        let mut out = Vec::new();
        let mut next = Some(search_url(&self.url_template, keyword));
        let mut pages = 0usize;

        while let Some(url) = next.take() {
            if pages == self.max_pages {
                tracing::debug!(source = NAME, pages, "page cap reached");
                break;
            }
            let body = self.fetcher.get_text(&url).await?;
            let (mut jobs, following) = self.parse_page(&body)?;
            out.append(&mut jobs);
            pages += 1;
            next = following;
        }

        counter!("jobs_fetched_total", "source" => NAME).increment(out.len() as u64);
        Ok(out)
    }

    fn name(&self) -> &str {
        NAME
    }
}
