// src/config/search.rs
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::filter::{AcceptancePolicy, SimilarityMetric};

pub const ENV_CONFIG_PATH: &str = "JOB_HUNT_CONFIG";
pub const ENV_THRESHOLD: &str = "JOB_HUNT_THRESHOLD";
pub const DEFAULT_TOML_PATH: &str = "config/job_hunt.toml";
pub const DEFAULT_JSON_PATH: &str = "config/job_hunt.json";

pub const DEFAULT_THRESHOLD: f64 = 0.7;

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub user_agent: String,
    pub accept_language: String,
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
                         AppleWebKit/537.36 (KHTML, like Gecko) Chrome/125.0 Safari/537.36"
                .to_string(),
            accept_language: "en-US,en;q=0.9".to_string(),
            timeout_secs: 20,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CvConfig {
    pub template_path: PathBuf,
    pub output_dir: PathBuf,
}

impl Default for CvConfig {
    fn default() -> Self {
        Self {
            template_path: PathBuf::from("templates/base_cv.md"),
            output_dir: PathBuf::from("."),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MailConfig {
    pub smtp_host: String,
    pub default_recipient: String,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            smtp_host: "smtp.gmail.com".to_string(),
            default_recipient: "hiring@example.com".to_string(),
        }
    }
}

/// Everything a search run needs. Built once, passed down explicitly.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub keywords: Vec<String>,
    /// Enabled sources, by adapter name (case-insensitive).
    pub sources: Vec<String>,
    pub allow_titles: Vec<String>,
    pub block_keywords: Vec<String>,
    pub threshold: f64,
    pub metric: SimilarityMetric,
    pub policy: AcceptancePolicy,
    pub target_locations: Vec<String>,
    pub politeness_delay_ms: u64,
    pub max_pages: usize,
    pub top_n: usize,
    pub history_path: PathBuf,
    pub reply_timeout_secs: u64,
    pub http: HttpConfig,
    pub cv: CvConfig,
    pub mail: MailConfig,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            keywords: strings(&[
                "product manager relocation",
                "product manager visa sponsorship",
            ]),
            sources: strings(&["Indeed", "LinkedIn", "Glassdoor", "Arbeitnow", "AllJobs"]),
            allow_titles: strings(&[
                "product manager",
                "senior product manager",
                "staff product manager",
                "principal product manager",
                "group product manager",
                "lead product manager",
                "product lead",
                "head of product",
                "director of product",
                "product owner",
            ]),
            block_keywords: strings(&[
                "engineer",
                "designer",
                "developer",
                "marketing",
                "sales",
                "scientist",
                "recruiter",
                "intern",
            ]),
            threshold: DEFAULT_THRESHOLD,
            metric: SimilarityMetric::default(),
            policy: AcceptancePolicy::default(),
            target_locations: strings(&["Israel"]),
            politeness_delay_ms: 2_000,
            max_pages: 5,
            top_n: 10,
            history_path: PathBuf::from("history.json"),
            reply_timeout_secs: 1_800,
            http: HttpConfig::default(),
            cv: CvConfig::default(),
            mail: MailConfig::default(),
        }
    }
}

impl SearchConfig {
    /// Load from an explicit path. TOML or JSON, chosen by extension (TOML when unknown).
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading search config from {}", path.display()))?;
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let cfg: SearchConfig = match ext.as_str() {
            "json" => serde_json::from_str(&content)
                .with_context(|| format!("parsing {}", path.display()))?,
            _ => toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))?,
        };
        Ok(cfg.sanitized())
    }

    /// Resolution order:
    /// 1) $JOB_HUNT_CONFIG
    /// 2) config/job_hunt.toml
    /// 3) config/job_hunt.json
    /// 4) built-in defaults
    ///
    /// $JOB_HUNT_THRESHOLD, when parsable, overrides the threshold afterwards.
    pub fn load_default() -> Result<Self> {
        Ok(Self::locate()?.with_env_overrides())
    }

    /// `explicit` (the CLI's `--config`) skips the lookup chain; env overrides apply either way.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(p) => Ok(Self::load_from(p)?.with_env_overrides()),
            None => Self::load_default(),
        }
    }

    pub fn with_env_overrides(mut self) -> Self {
        if let Some(t) = parse_threshold_env(std::env::var(ENV_THRESHOLD).ok()) {
            self.threshold = t;
        }
        self
    }

    fn locate() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if pb.exists() {
                return Self::load_from(&pb);
            }
            return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
        }
        for p in [DEFAULT_TOML_PATH, DEFAULT_JSON_PATH] {
            let pb = PathBuf::from(p);
            if pb.exists() {
                return Self::load_from(&pb);
            }
        }
        Ok(Self::default().sanitized())
    }

    /// Trim and drop empty list entries, lower-case the title lists, clamp the threshold.
    pub fn sanitized(mut self) -> Self {
        self.keywords = clean_list(self.keywords, false);
        self.sources = clean_list(self.sources, false);
        self.allow_titles = clean_list(self.allow_titles, true);
        self.block_keywords = clean_list(self.block_keywords, true);
        self.target_locations = clean_list(self.target_locations, false);
        if !self.threshold.is_finite() {
            self.threshold = DEFAULT_THRESHOLD;
        }
        self.threshold = self.threshold.clamp(0.0, 1.0);
        self
    }

    pub fn source_enabled(&self, name: &str) -> bool {
        self.sources.iter().any(|s| s.eq_ignore_ascii_case(name))
    }
}

// parse optional float env and clamp to <0.0..=1.0>
fn parse_threshold_env(raw: Option<String>) -> Option<f64> {
    raw.and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .map(|v| v.clamp(0.0, 1.0))
}

/// Order-preserving: the first occurrence of each entry wins.
fn clean_list(items: Vec<String>, lowercase: bool) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(items.len());
    for it in items {
        let t = it.trim();
        if t.is_empty() {
            continue;
        }
        let t = if lowercase {
            t.to_lowercase()
        } else {
            t.to_string()
        };
        if !out.contains(&t) {
            out.push(t);
        }
    }
    out
}
