// src/ingest/fetch.rs
//! Outbound page fetching shared by the site adapters and the relocation detector.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE};
use reqwest::Client;

use crate::config::HttpConfig;

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("{url} answered HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("invalid http configuration: {0}")]
    Config(String),
}

#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// GET `url` and return the body. Non-2xx is an error.
    async fn get_text(&self, url: &str) -> Result<String, FetchError>;
}

/// reqwest-backed fetcher with browser-like headers.
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(cfg: &HttpConfig) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        let lang = HeaderValue::from_str(&cfg.accept_language)
            .map_err(|e| FetchError::Config(format!("accept_language: {e}")))?;
        headers.insert(ACCEPT_LANGUAGE, lang);

        let client = Client::builder()
            .user_agent(cfg.user_agent.clone())
            .default_headers(headers)
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn get_text(&self, url: &str) -> Result<String, FetchError> {
        let rsp = self.client.get(url).send().await?;
        let status = rsp.status();
        if !status.is_success() {
            tracing::debug!(%url, status = status.as_u16(), "non-success status");
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(rsp.text().await?)
    }
}

/// Offline fetcher serving canned bodies by exact URL. Unknown URLs answer 404.
#[derive(Debug, Clone, Default)]
pub struct StaticFetcher {
    pages: HashMap<String, String>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.pages.insert(url.into(), body.into());
        self
    }
}

#[async_trait]
impl PageFetcher for StaticFetcher {
    async fn get_text(&self, url: &str) -> Result<String, FetchError> {
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| FetchError::Status {
                url: url.to_string(),
                status: 404,
            })
    }
}
