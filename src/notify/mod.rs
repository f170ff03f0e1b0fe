// src/notify/mod.rs
pub mod blocked;
pub mod email;
pub mod telegram;

use anyhow::Result;
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::config::HttpConfig;

pub use blocked::BlockedSourceSet;
pub use email::ApplicationMailer;
pub use telegram::TelegramNotifier;

/// Outbound side of the messaging channel.
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn send_message(&self, text: &str) -> Result<()>;
    async fn send_document(&self, path: &Path, caption: &str) -> Result<()>;
}

/// Inbound side: the user's free-text reply, or an empty string on timeout.
#[async_trait::async_trait]
pub trait ReplySource: Send + Sync {
    /// Drop replies received so far, so only answers to the next list count.
    async fn discard_pending(&self) -> Result<()> {
        Ok(())
    }

    async fn await_reply(&self, timeout: Duration) -> Result<String>;
}

/// Used when no messaging channel is configured: everything goes to the log.
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

#[async_trait::async_trait]
impl Notifier for LogNotifier {
    async fn send_message(&self, text: &str) -> Result<()> {
        info!(target: "notify", "{text}");
        Ok(())
    }

    async fn send_document(&self, path: &Path, caption: &str) -> Result<()> {
        info!(target: "notify", path = %path.display(), %caption, "document ready");
        Ok(())
    }
}

#[async_trait::async_trait]
impl ReplySource for LogNotifier {
    async fn await_reply(&self, _timeout: Duration) -> Result<String> {
        tracing::debug!("no reply channel configured");
        Ok(String::new())
    }
}

/// Either a configured Telegram bot or the log fallback.
pub enum Channel {
    Telegram(TelegramNotifier),
    Log(LogNotifier),
}

impl Channel {
    pub fn as_notifier(&self) -> &dyn Notifier {
        match self {
            Channel::Telegram(t) => t,
            Channel::Log(l) => l,
        }
    }

    pub fn as_replies(&self) -> &dyn ReplySource {
        match self {
            Channel::Telegram(t) => t,
            Channel::Log(l) => l,
        }
    }
}

/// Telegram when TELEGRAM_TOKEN and TELEGRAM_CHAT_ID are both set, else the log.
pub fn channel_from_env(http: &HttpConfig) -> Channel {
    match TelegramNotifier::from_env() {
        Some(t) => Channel::Telegram(t.with_timeout(Duration::from_secs(http.timeout_secs))),
        None => {
            tracing::debug!("Telegram disabled (no TELEGRAM_TOKEN / TELEGRAM_CHAT_ID)");
            Channel::Log(LogNotifier)
        }
    }
}
