// src/notify/blocked.rs
use std::collections::HashSet;

/// Per-run gate: at most one "source blocked" notice per source.
/// - First failure of a source passes.
/// - Later failures of the same source are suppressed until the next run.
#[derive(Debug, Clone, Default)]
pub struct BlockedSourceSet {
    notified: HashSet<String>,
    order: Vec<String>,
}

impl BlockedSourceSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true the first time a source is recorded.
    pub fn record(&mut self, source: &str) -> bool {
        if self.notified.insert(source.to_string()) {
            self.order.push(source.to_string());
            true
        } else {
            false
        }
    }

    /// Sources in first-failure order.
    pub fn into_sources(self) -> Vec<String> {
        self.order
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeat_failure_suppressed() {
        let mut b = BlockedSourceSet::new();
        assert!(b.record("Indeed"));
        assert!(!b.record("Indeed"));
        assert!(b.record("LinkedIn"));
    }

    #[test]
    fn keeps_first_failure_order() {
        let mut b = BlockedSourceSet::new();
        b.record("Glassdoor");
        b.record("Indeed");
        b.record("Glassdoor");
        assert_eq!(b.into_sources(), vec!["Glassdoor".to_string(), "Indeed".to_string()]);
    }
}
