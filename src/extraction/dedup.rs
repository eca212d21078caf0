//! Candidate record deduplication
//!
//! The same poll is often captured more than once: by the link pass and the
//! container scan, by nested blocks, or by two frames of one page. Records are
//! keyed by a fingerprint of (url, leading block text, date text); the first
//! occurrence wins and discovery order is preserved.

use std::collections::HashSet;

use super::text::truncate_chars;
use super::types::CandidateRecord;

/// Characters of `results_text` that take part in the fingerprint
pub const FINGERPRINT_TEXT_CHARS: usize = 160;

/// Composite key identifying duplicate records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint(pub u64);

impl Fingerprint {
    pub fn of(record: &CandidateRecord) -> Self {
        let key = format!(
            "{}|{}|{}",
            record.url,
            truncate_chars(&record.results_text, FINGERPRINT_TEXT_CHARS),
            record.date_text
        );
        Fingerprint(crate::util::fast_hash(&key))
    }
}

/// First-occurrence-wins record deduplicator
#[derive(Debug, Default)]
pub struct RecordDeduplicator {
    /// Fingerprints seen in this run
    seen: HashSet<Fingerprint>,
}

impl RecordDeduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if a record is new, remembering it if so
    pub fn is_new(&mut self, record: &CandidateRecord) -> bool {
        self.seen.insert(Fingerprint::of(record))
    }

    /// Keep the first record of every fingerprint, in order
    pub fn retain_new(&mut self, records: Vec<CandidateRecord>) -> Vec<CandidateRecord> {
        records
            .into_iter()
            .filter(|record| self.is_new(record))
            .collect()
    }

    /// Number of distinct fingerprints seen
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

/// Deduplicate a single batch of records
pub fn dedup_records(records: Vec<CandidateRecord>) -> Vec<CandidateRecord> {
    RecordDeduplicator::new().retain_new(records)
}
