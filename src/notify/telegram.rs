// src/notify/telegram.rs
use anyhow::{anyhow, Context, Result};
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{Duration, Instant};

use super::{Notifier, ReplySource};

const API_BASE: &str = "https://api.telegram.org";
const POLL_SECS: u64 = 5;
const MAX_ATTEMPTS: u8 = 3;

pub struct TelegramNotifier {
    api_base: String,
    token: String,
    chat_id: String,
    client: Client,
    timeout: Duration,
    // Next getUpdates offset; 0 until the first update has been acknowledged.
    next_offset: AtomicI64,
}

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
}

#[derive(Deserialize)]
struct Updates {
    #[serde(default)]
    result: Vec<Update>,
}

#[derive(Deserialize)]
struct Update {
    update_id: i64,
    message: Option<Message>,
}

#[derive(Deserialize)]
struct Message {
    text: Option<String>,
}

/// Replies are accepted only when they look like a selection: digits, spaces and commas.
pub fn is_selection_reply(text: &str) -> bool {
    !text.is_empty()
        && text
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_whitespace() || c == ',')
}

impl TelegramNotifier {
    pub fn new(token: &str, chat_id: impl Into<String>) -> Self {
        Self {
            api_base: API_BASE.to_string(),
            token: token.to_string(),
            chat_id: chat_id.into(),
            client: Client::new(),
            timeout: Duration::from_secs(10),
            next_offset: AtomicI64::new(0),
        }
    }

    pub fn from_env() -> Option<Self> {
        let token = std::env::var("TELEGRAM_TOKEN").ok().filter(|s| !s.is_empty())?;
        let chat = std::env::var("TELEGRAM_CHAT_ID").ok().filter(|s| !s.is_empty())?;
        Some(Self::new(&token, chat))
    }

    /// Per-request timeout for sends; long polls get this on top of the poll window.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into().trim_end_matches('/').to_string();
        self
    }

    fn endpoint(&self, method: &str) -> String {
        format!("{}/bot{}/{method}", self.api_base, self.token)
    }

    fn stored_offset(&self) -> Option<i64> {
        match self.next_offset.load(Ordering::SeqCst) {
            0 => None,
            o => Some(o),
        }
    }

    async fn fetch_updates(&self, offset: Option<i64>, poll_secs: u64) -> Result<Vec<Update>> {
        let mut query = vec![("timeout", poll_secs.to_string())];
        if let Some(o) = offset {
            query.push(("offset", o.to_string()));
        }
        let updates: Updates = self
            .client
            .get(self.endpoint("getUpdates"))
            .timeout(Duration::from_secs(poll_secs) + self.timeout)
            .query(&query)
            .send()
            .await
            .context("telegram getUpdates")?
            .error_for_status()
            .context("telegram getUpdates non-2xx")?
            .json()
            .await
            .context("telegram getUpdates body")?;
        Ok(updates.result)
    }
}

#[async_trait::async_trait]
impl Notifier for TelegramNotifier {
    async fn send_message(&self, text: &str) -> Result<()> {
        let payload = SendMessage {
            chat_id: &self.chat_id,
            text,
        };

        let mut attempt: u8 = 0;
        loop {
            attempt += 1;
            let res = self
                .client
                .post(self.endpoint("sendMessage"))
                .timeout(self.timeout)
                .json(&payload)
                .send()
                .await;

            let err = match res {
                Ok(rsp) => match rsp.error_for_status_ref() {
                    Ok(_) => return Ok(()),
                    Err(e) => anyhow!("Telegram sendMessage HTTP error: {e}"),
                },
                Err(e) => anyhow!("Telegram sendMessage request failed: {e}"),
            };
            if attempt >= MAX_ATTEMPTS {
                return Err(err);
            }
            tracing::debug!(attempt, error = %err, "retrying sendMessage");
            tokio::time::sleep(Duration::from_millis(500u64 << (attempt - 1))).await;
        }
    }

    async fn send_document(&self, path: &Path, caption: &str) -> Result<()> {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("reading {}", path.display()))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".to_string());
        let form = Form::new()
            .text("chat_id", self.chat_id.clone())
            .text("caption", caption.to_string())
            .part("document", Part::bytes(bytes).file_name(file_name));

        self.client
            .post(self.endpoint("sendDocument"))
            .timeout(self.timeout * 3)
            .multipart(form)
            .send()
            .await
            .context("telegram sendDocument")?
            .error_for_status()
            .context("telegram sendDocument non-2xx")?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl ReplySource for TelegramNotifier {
    /// `offset=-1` returns only the newest update and drops the older ones;
    /// polling from past it afterwards acknowledges that one too.
    async fn discard_pending(&self) -> Result<()> {
        let updates = self.fetch_updates(Some(-1), 0).await?;
        if let Some(last) = updates.last() {
            self.next_offset.store(last.update_id + 1, Ordering::SeqCst);
        }
        Ok(())
    }

    async fn await_reply(&self, timeout: Duration) -> Result<String> {
        let start = Instant::now();
        while start.elapsed() < timeout {
            let updates = self.fetch_updates(self.stored_offset(), POLL_SECS).await?;
            let Some(last) = updates.last() else {
                continue;
            };
            self.next_offset.store(last.update_id + 1, Ordering::SeqCst);
            let text = last
                .message
                .as_ref()
                .and_then(|m| m.text.as_deref())
                .unwrap_or_default()
                .trim();
            if is_selection_reply(text) {
                return Ok(text.to_string());
            }
            tracing::debug!("ignoring non-selection reply");
        }
        Ok(String::new())
    }
}
