//! Poll record extraction from rendered HTML
//!
//! Polling pages rendered client-side rarely label their data, so extraction is
//! heuristic throughout:
//! - Finds candidate poll blocks by walking up from content links, with a
//!   container scan as fallback
//! - Classifies each block's text into typed fields
//! - Drops blocks without numeric results and collapses duplicates

pub mod assemble;
pub mod classify;
pub mod dedup;
pub mod discovery;
pub mod text;
mod types;

pub use assemble::RecordAssembler;
pub use dedup::{dedup_records, Fingerprint, RecordDeduplicator};
pub use discovery::{BlockDiscoverer, BlockPredicate, DiscoveredBlock, PollLikeness};
pub use text::normalize_text;
pub use types::*;

use scraper::Html;
use url::Url;

/// Poll extractor for one rendered frame at a time
#[derive(Debug, Clone, Default)]
pub struct PollExtractor {
    pub(crate) config: ExtractorConfig,
}

impl PollExtractor {
    /// Create a new poll extractor
    pub fn new(config: ExtractorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Extract deduplicated poll records from one frame's HTML.
    ///
    /// `page_url` resolves relative links and decides which links are off-site.
    /// Output is in discovery order and holds at most `max_records` records.
    pub fn extract(
        &self,
        html: &str,
        page_url: Option<&Url>,
    ) -> Result<Vec<CandidateRecord>, ExtractError> {
        self.extract_with(html, page_url, PollLikeness::from_config(&self.config))
    }

    /// Same as [`extract`](Self::extract) with a custom poll-likeness rule.
    pub fn extract_with<P: BlockPredicate>(
        &self,
        html: &str,
        page_url: Option<&Url>,
        predicate: P,
    ) -> Result<Vec<CandidateRecord>, ExtractError> {
        if html.trim().is_empty() {
            return Err(ExtractError::EmptyDocument);
        }

        let document = Html::parse_document(html);
        let blocks = BlockDiscoverer::new(&self.config, predicate).discover(&document);

        let assembler = RecordAssembler::new(page_url);
        let candidates: Vec<CandidateRecord> = blocks
            .iter()
            .filter_map(|block| assembler.assemble(block))
            .collect();
        let candidate_count = candidates.len();

        let mut records = dedup_records(candidates);
        records.truncate(self.config.max_records);

        tracing::debug!(
            blocks = blocks.len(),
            candidates = candidate_count,
            records = records.len(),
            "Extracted poll records"
        );

        Ok(records)
    }
}
