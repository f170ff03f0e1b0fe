// src/ingest/providers/alljobs_rss.rs
use async_trait::async_trait;
use metrics::{counter, histogram};
use once_cell::sync::Lazy;
use quick_xml::de::from_str;
use regex::Regex;
use serde::Deserialize;
use std::sync::Arc;
use url::Url;
use time::{format_description::well_known::Rfc2822, OffsetDateTime, UtcOffset};

use super::search_url;
use crate::ingest::fetch::PageFetcher;
use crate::ingest::normalize_text;
use crate::ingest::types::{JobPosting, SourceError, SourceProvider};

const NAME: &str = "AllJobs";
const FEED_URL: &str = "https://www.alljobs.co.il/RSS/SearchResultsRss.aspx?freetxt={keyword}";
const BASE_URL: &str = "https://www.alljobs.co.il/";

static RE_LOCATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?im)\blocation\s*:\s*([^\n\r<|]+)").expect("location regex"));
static RE_COMPANY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?im)\bcompany\s*:\s*([^\n\r<|]+)").expect("company regex"));

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
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    description: Option<String>,
}

fn parse_rfc2822_to_iso(ts: &str) -> String {
    OffsetDateTime::parse(ts.trim(), &Rfc2822)
        .ok()
        .map(|dt| dt.to_offset(UtcOffset::UTC).date())
        .map(|d| format!("{:04}-{:02}-{:02}", d.year(), u8::from(d.month()), d.day()))
        .unwrap_or_default()
}

fn labelled(re: &Regex, text: &str) -> String {
    re.captures(text)
        .and_then(|c| c.get(1))
        .map(|m| normalize_text(m.as_str()))
        .unwrap_or_default()
}

/// RSS feed, one posting per `<item>`; location lives in the free-text description.
pub struct AllJobsRssProvider {
    fetcher: Arc<dyn PageFetcher>,
    url_template: String,
    base_url: Url,
}

impl AllJobsRssProvider {
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self {
            fetcher,
            url_template: FEED_URL.to_string(),
            base_url: Url::parse(BASE_URL).expect("static url"),
        }
    }

    pub fn with_url_template(mut self, template: impl Into<String>) -> Self {
        self.url_template = template.into();
        self
    }

    pub fn parse_feed(&self, xml: &str) -> Result<Vec<JobPosting>, SourceError> {
        let t0 = std::time::Instant::now();
        let xml_clean = scrub_html_entities_for_xml(xml.trim());
        let rss: Rss = from_str(&xml_clean).map_err(|e| SourceError::parse(NAME, e))?;

        let mut out = Vec::with_capacity(rss.channel.item.len());
        for it in rss.channel.item {
            let title = normalize_text(it.title.as_deref().unwrap_or_default());
            let raw_link = it.link.as_deref().map(str::trim).unwrap_or_default();
            if title.is_empty() || raw_link.is_empty() {
                continue;
            }
            let Ok(link) = self.base_url.join(raw_link) else {
                tracing::debug!(source = NAME, %title, link = raw_link, "unresolvable link");
                continue;
            };
            // Keep line breaks so labelled fields stay separate.
            let desc = html_escape::decode_html_entities(it.description.as_deref().unwrap_or_default())
                .replace("<br>", "\n")
                .replace("<br/>", "\n")
                .replace("<br />", "\n");

            out.push(JobPosting {
                title,
                company: labelled(&RE_COMPANY, &desc),
                location: labelled(&RE_LOCATION, &desc),
                link: link.to_string(),
                posted_date: it
                    .pub_date
                    .as_deref()
                    .map(parse_rfc2822_to_iso)
                    .unwrap_or_default(),
            });
        }

        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("feed_parse_ms").record(ms);
        counter!("jobs_fetched_total", "source" => NAME).increment(out.len() as u64);
        Ok(out)
    }
}

#[async_trait]
impl SourceProvider for AllJobsRssProvider {
    async fn fetch(&self, keyword: &str) -> Result<Vec<JobPosting>, SourceError> {
        let url = search_url(&self.url_template, keyword);
        let body = self.fetcher.get_text(&url).await?;
        self.parse_feed(&body)
    }

    fn name(&self) -> &str {
        NAME
    }
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
