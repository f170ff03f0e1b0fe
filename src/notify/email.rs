// src/notify/email.rs
use anyhow::{Context, Result};
use lettre::message::{header::ContentType, Attachment, Mailbox, Message, MultiPart, SinglePart};
use lettre::transport::smtp::{authentication::Credentials, AsyncSmtpTransport};
use lettre::{AsyncTransport, Tokio1Executor};
use std::path::Path;

use crate::config::MailConfig;
use crate::ingest::types::JobPosting;

/// Sends applications with the tailored CV attached, over an SMTPS relay.
pub struct ApplicationMailer {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
}

impl ApplicationMailer {
    /// `Ok(None)` when GMAIL_USER / GMAIL_APP_PASSWORD are not both set.
    pub fn from_env(cfg: &MailConfig) -> Result<Option<Self>> {
        let user = std::env::var("GMAIL_USER").ok().filter(|s| !s.is_empty());
        let pass = std::env::var("GMAIL_APP_PASSWORD").ok().filter(|s| !s.is_empty());
        let (Some(user), Some(pass)) = (user, pass) else {
            return Ok(None);
        };
        Self::new(cfg, user, pass).map(Some)
    }

    pub fn new(cfg: &MailConfig, user: String, pass: String) -> Result<Self> {
        let from: Mailbox = user
            .parse()
            .with_context(|| format!("invalid sender address {user}"))?;
        let to: Mailbox = cfg
            .default_recipient
            .parse()
            .with_context(|| format!("invalid recipient {}", cfg.default_recipient))?;

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::relay(&cfg.smtp_host)
            .with_context(|| format!("invalid smtp host {}", cfg.smtp_host))?
            .credentials(Credentials::new(user, pass))
            .build();

        Ok(Self { mailer, from, to })
    }

    pub async fn send_application(&self, job: &JobPosting, cv_path: &Path) -> Result<()> {
        let msg = build_application(&self.from, &self.to, job, cv_path).await?;
        self.mailer.send(msg).await.context("send application email")?;
        tracing::info!(title = %job.title, company = %job.company, "application emailed");
        Ok(())
    }
}

async fn build_application(
    from: &Mailbox,
    to: &Mailbox,
    job: &JobPosting,
    cv_path: &Path,
) -> Result<Message> {
    let bytes = tokio::fs::read(cv_path)
        .await
        .with_context(|| format!("reading {}", cv_path.display()))?;
    let file_name = cv_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "cv".to_string());

    let body = format!(
        "Hi,\n\nPlease find my CV attached for {} at {}.\n\nBest regards",
        job.title, job.company
    );
    let octet = ContentType::parse("application/octet-stream").context("content type")?;

    Message::builder()
        .from(from.clone())
        .to(to.clone())
        .subject(format!("{} - application", job.title))
        .multipart(
            MultiPart::mixed()
                .singlepart(SinglePart::plain(body))
                .singlepart(Attachment::new(file_name).body(bytes, octet)),
        )
        .context("build email")
}
