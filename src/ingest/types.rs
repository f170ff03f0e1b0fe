// src/ingest/types.rs
use std::collections::HashSet;
use std::fmt;

use crate::ingest::fetch::FetchError;

/// One scraped listing, in the shape every adapter emits.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct JobPosting {
    pub title: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub location: String,
    pub link: String, // absolute, may carry a tracking query
    #[serde(rename = "date", default)]
    pub posted_date: String, // YYYY-MM-DD or empty
}

impl JobPosting {
    pub fn canonical_link(&self) -> CanonicalLink {
        CanonicalLink::from(self.link.as_str())
    }
}

/// Dedup key: the link with any `?query` suffix removed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CanonicalLink(String);

impl CanonicalLink {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl From<&str> for CanonicalLink {
    fn from(link: &str) -> Self {
        let base = link.split_once('?').map(|(b, _)| b).unwrap_or(link);
        Self(base.to_string())
    }
}

impl fmt::Display for CanonicalLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Canonical links already handled. Only grows.
#[derive(Debug, Clone, Default)]
pub struct SeenSet {
    links: HashSet<CanonicalLink>,
}

impl SeenSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, link: &CanonicalLink) -> bool {
        self.links.contains(link)
    }

    /// Returns false when the link was already present.
    pub fn insert(&mut self, link: CanonicalLink) -> bool {
        self.links.insert(link)
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

impl<S: AsRef<str>> FromIterator<S> for SeenSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            links: iter
                .into_iter()
                .map(|s| CanonicalLink::from(s.as_ref()))
                .collect(),
        }
    }
}

/// Why an adapter could not produce results. "No results" is `Ok(vec![])`, never an error.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("{source_name}: unparsable response: {detail}")]
    Parse { source_name: String, detail: String },
}

impl SourceError {
    pub fn parse(source_name: &str, detail: impl fmt::Display) -> Self {
        Self::Parse {
            source_name: source_name.to_string(),
            detail: detail.to_string(),
        }
    }
}

#[async_trait::async_trait]
pub trait SourceProvider: Send + Sync {
    /// One search against the source for `keyword`. No retries.
    async fn fetch(&self, keyword: &str) -> Result<Vec<JobPosting>, SourceError>;
    fn name(&self) -> &str;
}
