//! HTTP page source
//!
//! Fetches a page with reqwest and, optionally, the documents it embeds via
//! `<iframe src>`. Pages rendered client-side are not executed; the source sees
//! whatever HTML the server returns.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::LazyLock;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use scraper::{Html, Selector};
use thiserror::Error;
use url::Url;

use super::source::{Frame, PageSnapshot, PageSource};
use crate::config::FetchConfig;

static IFRAME_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("iframe[src]").expect("valid selector"));

/// Errors that can occur while loading a page
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("HTTP status {0}")]
    Status(u16),
    #[error("Invalid content type: {0}")]
    InvalidContentType(String),
    #[error("Content too large: {0} bytes")]
    ContentTooLarge(usize),
    #[error("Failed to parse URL: {0}")]
    InvalidUrl(String),
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Page source backed by plain HTTP requests
pub struct HttpSource {
    client: reqwest::Client,
    config: FetchConfig,
}

impl HttpSource {
    pub fn new(config: FetchConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .pool_idle_timeout(Duration::from_secs(90))
            .timeout(config.timeout())
            .connect_timeout(config.connect_timeout())
            .redirect(reqwest::redirect::Policy::limited(10))
            .user_agent(&config.user_agent)
            .gzip(true)
            .brotli(true)
            .build()?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// GET one document, returning its final URL and body
    async fn fetch_html(&self, url: &Url) -> Result<(Url, String), FetchError> {
        let start = Instant::now();
        let response = self.client.get(url.as_str()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        let final_url = response.url().clone();

        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("text/html")
            .to_string();
        if !content_type.contains("text/html")
            && !content_type.contains("application/xhtml")
            && !content_type.contains("text/plain")
        {
            return Err(FetchError::InvalidContentType(content_type));
        }

        if let Some(len) = response.content_length() {
            if len as usize > self.config.max_content_size {
                return Err(FetchError::ContentTooLarge(len as usize));
            }
        }

        let body = response.text().await?;
        if body.len() > self.config.max_content_size {
            return Err(FetchError::ContentTooLarge(body.len()));
        }

        tracing::debug!(
            url = %final_url,
            bytes = body.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Fetched document"
        );

        Ok((final_url, body))
    }
}

#[async_trait]
impl PageSource for HttpSource {
    async fn load(&self, url: &Url) -> Result<PageSnapshot, FetchError> {
        let (final_url, body) = self.fetch_html(url).await?;

        let frame_urls = if self.config.follow_frames {
            frame_urls(&body, &final_url, self.config.max_frames)
        } else {
            Vec::new()
        };

        let mut frames = vec![Frame::new(Some(final_url.clone()), body)];
        for frame_url in frame_urls {
            match self.fetch_html(&frame_url).await {
                Ok((resolved, html)) => frames.push(Frame::new(Some(resolved), html)),
                Err(e) => {
                    tracing::warn!(frame = %frame_url, error = %e, "Skipping embedded frame");
                }
            }
        }

        Ok(PageSnapshot {
            url: final_url,
            frames,
        })
    }
}

/// Resolve `iframe[src]` targets against `base`, keeping http(s) URLs only.
pub fn frame_urls(html: &str, base: &Url, limit: usize) -> Vec<Url> {
    let document = Html::parse_document(html);
    let mut seen = HashSet::new();
    let mut urls = Vec::new();

    for element in document.select(&IFRAME_SELECTOR) {
        if urls.len() >= limit {
            break;
        }
        let Some(src) = element.value().attr("src") else {
            continue;
        };
        if let Ok(url) = base.join(src.trim()) {
            if (url.scheme() == "http" || url.scheme() == "https")
                && url != *base
                && seen.insert(url.as_str().to_string())
            {
                urls.push(url);
            }
        }
    }

    urls
}
