// src/filter.rs
//! Relevance predicates for scraped postings: fuzzy title allow-list with a hard
//! block-list, relocation phrases on detail pages, and the policy combining them.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Html;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use crate::config::SearchConfig;
use crate::ingest::fetch::PageFetcher;
use crate::ingest::types::JobPosting;

static RE_RELOCATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:relocation|visa\s+sponsorship|work\s+permit|moving\s+(?:costs?|assistance)|work[-\s]visa)\b",
    )
    .expect("relocation regex")
});

/// How a candidate title is scored against the allow-list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SimilarityMetric {
    /// Longest-matching-block ratio, `2*M / (len_a + len_b)`.
    #[default]
    Sequence,
    JaroWinkler,
    Levenshtein,
}

impl SimilarityMetric {
    pub fn ratio(self, a: &str, b: &str) -> f64 {
        match self {
            Self::Sequence => sequence_ratio(a, b),
            Self::JaroWinkler => strsim::jaro_winkler(a, b),
            Self::Levenshtein => strsim::normalized_levenshtein(a, b),
        }
    }
}

/// Which signals must agree before a posting is accepted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AcceptancePolicy {
    TitleOnly,
    #[default]
    TitleOrRelocation,
    TitleAndLocation,
}

/// Similarity of two strings in [0, 1] built from recursively matched longest common blocks.
pub fn sequence_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * matching_chars(&a, &b) as f64 / total as f64
}

fn matching_chars(a: &[char], b: &[char]) -> usize {
    let (i, j, size) = longest_block(a, b);
    if size == 0 {
        return 0;
    }
    size + matching_chars(&a[..i], &b[..j]) + matching_chars(&a[i + size..], &b[j + size..])
}

// Earliest longest common substring: lowest i, then lowest j.
fn longest_block(a: &[char], b: &[char]) -> (usize, usize, usize) {
    let mut best = (0, 0, 0);
    let mut prev = vec![0usize; b.len() + 1];
    for (i, ca) in a.iter().enumerate() {
        let mut cur = vec![0usize; b.len() + 1];
        for (j, cb) in b.iter().enumerate() {
            if ca == cb {
                let k = prev[j] + 1;
                cur[j + 1] = k;
                if k > best.2 {
                    best = (i + 1 - k, j + 1 - k, k);
                }
            }
        }
        prev = cur;
    }
    best
}

#[derive(Debug, Clone)]
pub struct TitleMatcher {
    allow: Vec<String>,
    block: Vec<String>,
    threshold: f64,
    metric: SimilarityMetric,
}

impl TitleMatcher {
    pub fn new(
        allow: Vec<String>,
        block: Vec<String>,
        threshold: f64,
        metric: SimilarityMetric,
    ) -> Self {
        Self {
            allow: allow.into_iter().map(|s| s.to_lowercase()).collect(),
            block: block.into_iter().map(|s| s.to_lowercase()).collect(),
            threshold,
            metric,
        }
    }

    pub fn from_config(cfg: &SearchConfig) -> Self {
        Self::new(
            cfg.allow_titles.clone(),
            cfg.block_keywords.clone(),
            cfg.threshold,
            cfg.metric,
        )
    }

    pub fn is_blocked(&self, title: &str) -> bool {
        let t = title.to_lowercase();
        self.block.iter().any(|kw| t.contains(kw.as_str()))
    }

    /// Best score across the whole allow-list (not the first hit).
    pub fn best_ratio(&self, title: &str) -> f64 {
        let t = title.to_lowercase();
        self.allow
            .iter()
            .map(|a| self.metric.ratio(&t, a))
            .fold(0.0, f64::max)
    }

    pub fn title_is_allowed(&self, title: &str) -> bool {
        if self.is_blocked(title) {
            return false;
        }
        self.best_ratio(title) >= self.threshold
    }
}

pub fn text_mentions_relocation(text: &str) -> bool {
    RE_RELOCATION.is_match(text)
}

/// Looks for relocation phrases on a posting's detail page.
#[derive(Clone)]
pub struct RelocationDetector {
    fetcher: Arc<dyn PageFetcher>,
}

impl RelocationDetector {
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self { fetcher }
    }

    /// Fail-closed: any fetch error counts as "not mentioned".
    pub async fn page_mentions_relocation(&self, url: &str) -> bool {
        match self.fetcher.get_text(url).await {
            Ok(body) => text_mentions_relocation(&page_text(&body)),
            Err(e) => {
                debug!(error = %e, %url, "detail page unavailable; treating as no relocation");
                false
            }
        }
    }
}

// Visible text only: nothing from <head>, scripts, styles or templates.
fn page_text(html: &str) -> String {
    let doc = Html::parse_document(html);
    let mut parts = Vec::new();
    for node in doc.root_element().descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node.ancestors().any(|a| {
            a.value().as_element().is_some_and(|el| {
                matches!(el.name(), "head" | "script" | "style" | "noscript" | "template")
            })
        });
        if !hidden {
            parts.push(&**text);
        }
    }
    parts.join(" ")
}

/// Title/relocation filter combined under one acceptance policy.
#[derive(Clone)]
pub struct JobFilter {
    titles: TitleMatcher,
    relocation: RelocationDetector,
    policy: AcceptancePolicy,
    target_locations: Vec<String>,
}

impl JobFilter {
    pub fn new(
        titles: TitleMatcher,
        relocation: RelocationDetector,
        policy: AcceptancePolicy,
        target_locations: Vec<String>,
    ) -> Self {
        Self {
            titles,
            relocation,
            policy,
            target_locations: target_locations
                .into_iter()
                .map(|s| s.to_lowercase())
                .collect(),
        }
    }

    pub fn from_config(cfg: &SearchConfig, fetcher: Arc<dyn PageFetcher>) -> Self {
        Self::new(
            TitleMatcher::from_config(cfg),
            RelocationDetector::new(fetcher),
            cfg.policy,
            cfg.target_locations.clone(),
        )
    }

    pub fn titles(&self) -> &TitleMatcher {
        &self.titles
    }

    fn location_matches(&self, location: &str) -> bool {
        let loc = location.to_lowercase();
        self.target_locations
            .iter()
            .any(|t| loc.contains(t.as_str()))
    }

    /// Block-listed titles are rejected under every policy, without fetching anything.
    pub async fn accepts(&self, job: &JobPosting) -> bool {
        if self.titles.is_blocked(&job.title) {
            return false;
        }
        let title_ok = self.titles.title_is_allowed(&job.title);
        match self.policy {
            AcceptancePolicy::TitleOnly => title_ok,
            AcceptancePolicy::TitleAndLocation => title_ok && self.location_matches(&job.location),
            AcceptancePolicy::TitleOrRelocation => {
                title_ok || self.relocation.page_mentions_relocation(&job.link).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_ratio_known_values() {
        assert_eq!(sequence_ratio("product manager", "product manager"), 1.0);
        assert_eq!(sequence_ratio("", ""), 1.0);
        assert_eq!(sequence_ratio("abc", ""), 0.0);
        // "abcd" vs "bcde": one block "bcd" -> 2*3/8
        assert!((sequence_ratio("abcd", "bcde") - 0.75).abs() < 1e-9);
    }

    #[test]
    fn sequence_ratio_recurses_both_sides() {
        // blocks "ab" then "cd": 2*4/9
        let r = sequence_ratio("abcd", "abxcd");
        assert!((r - 8.0 / 9.0).abs() < 1e-9, "got {r}");
    }

    #[test]
    fn best_ratio_uses_maximum_not_first() {
        let m = TitleMatcher::new(
            vec!["head of product".into(), "product manager".into()],
            vec![],
            0.7,
            SimilarityMetric::Sequence,
        );
        assert_eq!(m.best_ratio("Product Manager"), 1.0);
    }

    #[test]
    fn relocation_phrases() {
        assert!(text_mentions_relocation("We offer Visa Sponsorship"));
        assert!(text_mentions_relocation("relocation package"));
        assert!(text_mentions_relocation("help with moving costs"));
        assert!(text_mentions_relocation("work-visa support"));
        assert!(text_mentions_relocation("a valid WORK PERMIT"));
        assert!(!text_mentions_relocation("remote only, no travel"));
    }

    #[test]
    fn page_text_ignores_scripts_and_styles() {
        let html = r#"<html><head><title>Relocation jobs</title>
            <script type="application/ld+json">{"jobBenefits":"relocation"}</script></head>
            <body><style>.relocation { color: red }</style>
            <p>Hybrid role in Lisbon.</p>
            <script>track("visa sponsorship")</script></body></html>"#;
        let text = page_text(html);
        assert!(text.contains("Hybrid role in Lisbon."));
        assert!(!text_mentions_relocation(&text), "{text}");
    }

    #[test]
    fn policy_parses_kebab_case() {
        let p: AcceptancePolicy = serde_json::from_str("\"title-or-relocation\"").unwrap();
        assert_eq!(p, AcceptancePolicy::TitleOrRelocation);
        let m: SimilarityMetric = serde_json::from_str("\"jaro-winkler\"").unwrap();
        assert_eq!(m, SimilarityMetric::JaroWinkler);
    }
}
