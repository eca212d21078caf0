//! pollscrape: poll record extraction from rendered polling pages
//!
//! Polling aggregators render their tables client-side with little semantic
//! markup. This crate recovers structured poll records from that HTML:
//! - Heuristic poll-block discovery over the DOM
//! - Field classifiers for pollster, race, dates, sample and results
//! - Fingerprint deduplication across blocks, frames and pages
//! - An async harvester with retry, backoff and bot-wall detection that
//!   writes a JSON report

pub mod config;
pub mod extraction;
pub mod harvest;
pub mod util;

pub use config::Config;
pub use extraction::{CandidateRecord, ExtractError, ExtractorConfig, PollCategory, PollExtractor, PollResult};
pub use harvest::{Harvester, HarvestError, PollReport};
