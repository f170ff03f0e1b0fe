// src/lib.rs
// Public library surface for the CLI, the demo binary and integration tests.

pub mod config;
pub mod engine;
pub mod filter;
pub mod history;
pub mod ingest;
pub mod notify;
pub mod tailor;

// ---- Re-exports for stable public API ----
pub use crate::config::SearchConfig;
pub use crate::filter::{AcceptancePolicy, JobFilter, SimilarityMetric, TitleMatcher};
pub use crate::ingest::types::{CanonicalLink, JobPosting, SeenSet, SourceError, SourceProvider};
pub use crate::ingest::{Aggregator, SearchReport};
pub use crate::notify::{Notifier, ReplySource};

use std::sync::Arc;

use crate::ingest::fetch::{HttpFetcher, PageFetcher};

/// Build the aggregator the CLI uses: live HTTP fetcher, enabled sources, configured filter.
pub fn build_aggregator(cfg: &SearchConfig) -> anyhow::Result<Aggregator> {
    let fetcher: Arc<dyn PageFetcher> = Arc::new(HttpFetcher::new(&cfg.http)?);
    let sources = ingest::providers::default_sources(cfg, fetcher.clone());
    let filter = JobFilter::from_config(cfg, fetcher);
    Ok(Aggregator::from_config(cfg, sources, filter))
}
