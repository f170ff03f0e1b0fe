// src/engine.rs
//! Daily run: search, offer new postings to the user, act on the numbered reply.

use anyhow::Result;
use chrono::NaiveDate;
use std::collections::BTreeSet;
use std::time::Duration;
use tracing::{info, warn};

use crate::config::SearchConfig;
use crate::history::HistoryStore;
use crate::ingest::types::JobPosting;
use crate::ingest::Aggregator;
use crate::notify::{ApplicationMailer, Notifier, ReplySource};
use crate::tailor::tailor_cv;

pub const NOTHING_NEW_MESSAGE: &str = "🏖 No new jobs today, have fun at the beach!";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOutcome {
    /// Postings offered to the user.
    pub offered: usize,
    /// Postings whose CV was tailored and delivered.
    pub applied: usize,
    /// False when the job list could not be sent; history is left untouched then.
    pub delivered: bool,
    pub blocked: Vec<String>,
}

/// Parse a reply like `"1, 3 4"` into valid 1-based indices (ascending, no repeats).
pub fn parse_selection(reply: &str, len: usize) -> Vec<usize> {
    reply
        .replace(',', " ")
        .split_whitespace()
        .filter(|tok| tok.chars().all(|c| c.is_ascii_digit()))
        .filter_map(|tok| tok.parse::<usize>().ok())
        .filter(|idx| (1..=len).contains(idx))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

pub fn format_job_list(jobs: &[JobPosting], today: NaiveDate) -> String {
    let mut lines = vec![format!("🌍 New roles for {}", today.format("%Y-%m-%d"))];
    for (idx, job) in jobs.iter().enumerate() {
        lines.push(format!(
            "{}. {} | {} | {}",
            idx + 1,
            job.title,
            job.company,
            job.location
        ));
        lines.push(job.link.clone());
    }
    lines.join("\n")
}

pub struct DailyRun<'a> {
    cfg: &'a SearchConfig,
    aggregator: &'a Aggregator,
    notifier: &'a dyn Notifier,
    replies: &'a dyn ReplySource,
    history: HistoryStore,
    mailer: Option<&'a ApplicationMailer>,
}

impl<'a> DailyRun<'a> {
    pub fn new(
        cfg: &'a SearchConfig,
        aggregator: &'a Aggregator,
        notifier: &'a dyn Notifier,
        replies: &'a dyn ReplySource,
    ) -> Self {
        Self {
            cfg,
            aggregator,
            notifier,
            replies,
            history: HistoryStore::new(cfg.history_path.clone()),
            mailer: None,
        }
    }

    pub fn with_mailer(mut self, mailer: Option<&'a ApplicationMailer>) -> Self {
        self.mailer = mailer;
        self
    }

    pub async fn run(&self, today: NaiveDate) -> Result<RunOutcome> {
        let mut hist = self.history.load()?;
        let report = self
            .aggregator
            .search_jobs_from(hist.seen_set(), self.notifier)
            .await;
        let new_jobs = report.jobs;
        let mut outcome = RunOutcome {
            offered: new_jobs.len(),
            blocked: report.blocked,
            ..RunOutcome::default()
        };

        if new_jobs.is_empty() {
            if let Err(e) = self.notifier.send_message(NOTHING_NEW_MESSAGE).await {
                warn!(error = ?e, "failed to send nothing-new message");
            } else {
                info!("sent nothing-new message");
            }
            outcome.delivered = true;
            return Ok(outcome);
        }

        if let Err(e) = self.replies.discard_pending().await {
            warn!(error = ?e, "could not clear earlier replies");
        }
        if let Err(e) = self
            .notifier
            .send_message(&format_job_list(&new_jobs, today))
            .await
        {
            warn!(error = ?e, offered = new_jobs.len(), "failed to send job list; will retry next run");
            return Ok(outcome);
        }
        outcome.delivered = true;

        let reply = match self
            .replies
            .await_reply(Duration::from_secs(self.cfg.reply_timeout_secs))
            .await
        {
            Ok(r) => r,
            Err(e) => {
                warn!(error = ?e, "reply polling failed; treating as no selection");
                String::new()
            }
        };

        for idx in parse_selection(&reply, new_jobs.len()) {
            let job = &new_jobs[idx - 1];
            match self.apply(job).await {
                Ok(()) => {
                    hist.record_applied([job.canonical_link()]);
                    outcome.applied += 1;
                }
                Err(e) => warn!(error = ?e, title = %job.title, company = %job.company, "application failed"),
            }
        }

        hist.record_seen(new_jobs.iter().map(JobPosting::canonical_link));
        self.history.save(&hist)?;
        info!(offered = outcome.offered, applied = outcome.applied, "daily run finished");
        Ok(outcome)
    }

    async fn apply(&self, job: &JobPosting) -> Result<()> {
        let cv_path = tailor_cv(job, &self.cfg.cv.template_path, &self.cfg.cv.output_dir)?;
        self.notifier
            .send_document(&cv_path, &format!("CV for {}", job.company))
            .await?;
        if let Some(mailer) = self.mailer {
            mailer.send_application(job, &cv_path).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_parsing() {
        assert_eq!(parse_selection("1, 3 4", 5), vec![1, 3, 4]);
        assert_eq!(parse_selection("3,3,1", 5), vec![1, 3]);
        assert_eq!(parse_selection("0 6 2", 5), vec![2]);
        assert_eq!(parse_selection("two 2x -1", 5), Vec::<usize>::new());
        assert!(parse_selection("", 5).is_empty());
    }

    #[test]
    fn job_list_is_numbered_with_links() {
        let jobs = vec![JobPosting {
            title: "Product Manager".into(),
            company: "Acme".into(),
            location: "Haifa, Israel".into(),
            link: "https://acme.test/1".into(),
            posted_date: String::new(),
        }];
        let today = NaiveDate::from_ymd_opt(2025, 5, 1).unwrap();
        let msg = format_job_list(&jobs, today);
        assert_eq!(
            msg,
            "🌍 New roles for 2025-05-01\n1. Product Manager | Acme | Haifa, Israel\nhttps://acme.test/1"
        );
    }
}
