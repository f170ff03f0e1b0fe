//! history.rs: canonical links already offered to or applied for by the user, persisted as JSON.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::ingest::types::{CanonicalLink, SeenSet};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct History {
    #[serde(default)]
    pub seen_links: Vec<String>,
    #[serde(default)]
    pub applied_links: Vec<String>,
}

impl History {
    pub fn seen_set(&self) -> SeenSet {
        self.seen_links.iter().collect()
    }

    /// Appends links not already present, keeping order. Returns how many were added.
    pub fn record_seen<I: IntoIterator<Item = CanonicalLink>>(&mut self, links: I) -> usize {
        push_new(&mut self.seen_links, links)
    }

    pub fn record_applied<I: IntoIterator<Item = CanonicalLink>>(&mut self, links: I) -> usize {
        push_new(&mut self.applied_links, links)
    }
}

fn push_new<I: IntoIterator<Item = CanonicalLink>>(into: &mut Vec<String>, links: I) -> usize {
    let mut added = 0;
    for l in links {
        if !into.iter().any(|x| x == l.as_str()) {
            into.push(l.into_string());
            added += 1;
        }
    }
    added
}

#[derive(Debug, Clone)]
pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// A missing file is an empty history; an unreadable one is an error.
    pub fn load(&self) -> Result<History> {
        if !self.path.exists() {
            return Ok(History::default());
        }
        let data = fs::read_to_string(&self.path)
            .with_context(|| format!("reading history from {}", self.path.display()))?;
        serde_json::from_str(&data)
            .with_context(|| format!("parsing history {}", self.path.display()))
    }

    /// Write to a sibling temp file, then rename over the target.
    pub fn save(&self, history: &History) -> Result<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .with_context(|| format!("creating {}", dir.display()))?;
        }
        let json = serde_json::to_string_pretty(history).context("serializing history")?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).with_context(|| format!("writing {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("replacing {}", self.path.display()))?;
        Ok(())
    }
}
