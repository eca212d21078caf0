//! Harvest orchestration
//!
//! Loads pages through a [`PageSource`], retries failed or bot-walled loads with
//! exponential backoff, runs the extractor over every frame and merges the
//! results into a single deduplicated [`PollReport`].

mod block_detection;
mod fetcher;
mod report;
mod source;

pub use block_detection::{detect_block, BlockReason, SHORT_PAGE_CHARS};
pub use fetcher::{frame_urls, FetchError, HttpSource};
pub use report::PollReport;
pub use source::{FileSource, Frame, PageSnapshot, PageSource};

use thiserror::Error;
use url::Url;

use crate::config::{Config, FetchConfig, HarvestConfig};
use crate::extraction::{dedup_records, CandidateRecord, PollExtractor, RecordDeduplicator};

/// Errors that end a harvest run
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Failed to load {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: FetchError,
    },
    #[error("Blocked at {url}: {reason}")]
    Blocked { url: String, reason: BlockReason },
    #[error("Only {found} poll records found, at least {required} required")]
    TooFewRecords { found: usize, required: usize },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Runs extraction over a set of pages
pub struct Harvester<S> {
    source: S,
    extractor: PollExtractor,
    fetch: FetchConfig,
    harvest: HarvestConfig,
}

impl<S: PageSource> Harvester<S> {
    pub fn new(
        source: S,
        extractor: PollExtractor,
        fetch: FetchConfig,
        harvest: HarvestConfig,
    ) -> Self {
        Self {
            source,
            extractor,
            fetch,
            harvest,
        }
    }

    /// Build a harvester from a full configuration
    pub fn from_config(source: S, config: &Config) -> Self {
        Self::new(
            source,
            PollExtractor::new(config.extraction.clone()),
            config.fetch.clone(),
            config.harvest.clone(),
        )
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Load `url`, retrying fetch failures and bot walls.
    ///
    /// Makes at most `max_attempts` attempts. The error from the final attempt
    /// is returned.
    pub async fn load_with_retry(&self, url: &Url) -> Result<PageSnapshot, HarvestError> {
        let attempts = self.fetch.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            let error = match self.source.load(url).await {
                Ok(snapshot) => {
                    match snapshot.main_frame().and_then(|frame| detect_block(&frame.html)) {
                        None => return Ok(snapshot),
                        Some(reason) => HarvestError::Blocked {
                            url: url.to_string(),
                            reason,
                        },
                    }
                }
                Err(source) => HarvestError::Fetch {
                    url: url.to_string(),
                    source,
                },
            };

            if attempt >= attempts {
                return Err(error);
            }

            let delay = self.fetch.backoff(attempt);
            tracing::warn!(
                url = %url,
                attempt,
                max_attempts = attempts,
                delay_ms = delay.as_millis() as u64,
                error = %error,
                "Page load failed, retrying"
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }

    /// Extract records from every frame of a snapshot.
    ///
    /// A frame that fails extraction is logged and skipped.
    pub fn extract_snapshot(&self, snapshot: &PageSnapshot) -> Vec<CandidateRecord> {
        let mut records = Vec::new();

        for (index, frame) in snapshot.frames.iter().enumerate() {
            let page_url = frame.url.as_ref().or(Some(&snapshot.url));
            match self.extractor.extract(&frame.html, page_url) {
                Ok(found) => records.extend(found),
                Err(e) => {
                    tracing::warn!(page = %snapshot.url, frame = index, error = %e, "Frame extraction failed");
                }
            }
        }

        dedup_records(records)
    }

    /// Harvest `pages` in order and build a report.
    ///
    /// Pages that cannot be loaded are skipped unless none could be loaded.
    pub async fn run(&self, pages: &[Url]) -> Result<PollReport, HarvestError> {
        let mut dedup = RecordDeduplicator::new();
        let mut polls = Vec::new();
        let mut loaded = 0usize;
        let mut last_error = None;

        for url in pages {
            match self.load_with_retry(url).await {
                Ok(snapshot) => {
                    loaded += 1;
                    let fresh = dedup.retain_new(self.extract_snapshot(&snapshot));
                    tracing::info!(
                        page = %url,
                        frames = snapshot.frames.len(),
                        records = fresh.len(),
                        "Harvested page"
                    );
                    polls.extend(fresh);
                }
                Err(e) => {
                    tracing::warn!(page = %url, error = %e, "Skipping page");
                    last_error = Some(e);
                }
            }
        }

        if loaded == 0 {
            if let Some(e) = last_error {
                return Err(e);
            }
        }

        polls.truncate(self.extractor.config().max_records);

        if polls.len() < self.harvest.min_records {
            return Err(HarvestError::TooFewRecords {
                found: polls.len(),
                required: self.harvest.min_records,
            });
        }

        let source_pages = pages.iter().map(Url::to_string).collect();
        Ok(PollReport::new(self.harvest.source.clone(), source_pages, polls))
    }
}
