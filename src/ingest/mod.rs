// src/ingest/mod.rs
pub mod fetch;
pub mod providers;
pub mod types;

use crate::config::SearchConfig;
use crate::filter::JobFilter;
use crate::ingest::types::{JobPosting, SeenSet, SourceProvider};
use crate::notify::{BlockedSourceSet, Notifier};
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge};
use once_cell::sync::{Lazy, OnceCell};
use regex::Regex;
use std::time::Duration;

static RE_TAGS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)</?[^>]+>").expect("tag regex"));
static RE_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("whitespace regex"));

/// One-time metrics registration.
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("jobs_fetched_total", "Postings parsed from sources.");
        describe_counter!("jobs_accepted_total", "Postings accepted by the filter.");
        describe_counter!(
            "jobs_duplicate_total",
            "Postings dropped because their canonical link was already seen."
        );
        describe_counter!("jobs_rejected_total", "Postings rejected by the filter.");
        describe_counter!("source_errors_total", "Source fetch/parse failures.");
        describe_histogram!("feed_parse_ms", "RSS parse time in milliseconds.");
        describe_gauge!("search_last_run_ts", "Unix ts when a search run last finished.");
    });
}

/// Normalize scraped text: decode entities, strip tags, collapse whitespace, trim.
pub fn normalize_text(s: &str) -> String {
    let mut out = html_escape::decode_html_entities(s).to_string();
    out = RE_TAGS.replace_all(&out, "").to_string();

    // “ ” ‘ ’ to ASCII quotes
    out = out
        .replace(['\u{201C}', '\u{201D}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");

    out = RE_WS.replace_all(&out, " ").to_string();
    out = out.trim().to_string();

    if out.chars().count() > 1500 {
        out = out.chars().take(1500).collect();
    }
    out
}

/// Outcome of one aggregation run.
#[derive(Debug, Clone, Default)]
pub struct SearchReport {
    /// Accepted postings in discovery order.
    pub jobs: Vec<JobPosting>,
    /// Sources that failed during the run, in first-failure order.
    pub blocked: Vec<String>,
}

/// Drives every source over every keyword, sequentially.
pub struct Aggregator {
    keywords: Vec<String>,
    sources: Vec<Box<dyn SourceProvider>>,
    filter: JobFilter,
    politeness_delay: Duration,
}

impl Aggregator {
    pub fn new(
        keywords: Vec<String>,
        sources: Vec<Box<dyn SourceProvider>>,
        filter: JobFilter,
    ) -> Self {
        Self {
            keywords,
            sources,
            filter,
            politeness_delay: Duration::from_secs(2),
        }
    }

    pub fn from_config(
        cfg: &SearchConfig,
        sources: Vec<Box<dyn SourceProvider>>,
        filter: JobFilter,
    ) -> Self {
        Self::new(cfg.keywords.clone(), sources, filter)
            .with_politeness_delay(Duration::from_millis(cfg.politeness_delay_ms))
    }

    pub fn with_politeness_delay(mut self, delay: Duration) -> Self {
        self.politeness_delay = delay;
        self
    }

    /// Dedup + filter for one posting. Inserts its canonical link only when accepted.
    pub async fn keep(&self, job: &JobPosting, seen: &mut SeenSet) -> bool {
        let key = job.canonical_link();
        if seen.contains(&key) {
            counter!("jobs_duplicate_total").increment(1);
            return false;
        }
        if !self.filter.accepts(job).await {
            counter!("jobs_rejected_total").increment(1);
            return false;
        }
        seen.insert(key);
        counter!("jobs_accepted_total").increment(1);
        true
    }

    pub async fn search_jobs(&self, notifier: &dyn Notifier) -> SearchReport {
        self.search_jobs_from(SeenSet::new(), notifier).await
    }

    /// Keyword-major, then source order. A failing source never aborts the run;
    /// its first failure is reported once through `notifier`.
    pub async fn search_jobs_from(&self, mut seen: SeenSet, notifier: &dyn Notifier) -> SearchReport {
        ensure_metrics_described();

        let mut jobs = Vec::new();
        let mut blocked = BlockedSourceSet::new();
        let mut first_call = true;

        for keyword in &self.keywords {
            for source in &self.sources {
                if !first_call && !self.politeness_delay.is_zero() {
                    tokio::time::sleep(self.politeness_delay).await;
                }
                first_call = false;

                let batch = match source.fetch(keyword).await {
                    Ok(batch) => batch,
                    Err(e) => {
                        tracing::warn!(error = %e, source = source.name(), %keyword, "source error");
                        counter!("source_errors_total", "source" => source.name().to_string())
                            .increment(1);
                        if blocked.record(source.name()) {
                            notify_blocked(notifier, source.name()).await;
                        }
                        continue;
                    }
                };

                let fetched = batch.len();
                let mut kept = 0usize;
                for job in batch {
                    if self.keep(&job, &mut seen).await {
                        kept += 1;
                        jobs.push(job);
                    }
                }
                tracing::info!(
                    target: "ingest",
                    source = source.name(),
                    %keyword,
                    fetched,
                    kept,
                    "source searched"
                );
            }
        }

        gauge!("search_last_run_ts").set(chrono::Utc::now().timestamp().max(0) as f64);

        SearchReport {
            jobs,
            blocked: blocked.into_sources(),
        }
    }
}

pub fn blocked_message(source: &str) -> String {
    format!("⚠️ {source} appears to be blocking requests; skipping it for this run")
}

async fn notify_blocked(notifier: &dyn Notifier, source: &str) {
    if let Err(e) = notifier.send_message(&blocked_message(source)).await {
        tracing::warn!(error = ?e, %source, "failed to send blocked-source notice");
    }
}
