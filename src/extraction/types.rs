//! Poll extraction types

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors during poll extraction
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Document is empty")]
    EmptyDocument,
}

/// Coarse topic of a poll
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PollCategory {
    GenericBallot,
    Approval,
    Senate,
    Governor,
    House,
    DemPrimary,
    GopPrimary,
    PresGeneral,
    President,
    #[default]
    Other,
}

impl PollCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GenericBallot => "generic_ballot",
            Self::Approval => "approval",
            Self::Senate => "senate",
            Self::Governor => "governor",
            Self::House => "house",
            Self::DemPrimary => "dem_primary",
            Self::GopPrimary => "gop_primary",
            Self::PresGeneral => "pres_general",
            Self::President => "president",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for PollCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One numeric result line of a poll
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PollResult {
    /// Candidate or answer label
    pub choice: String,
    /// Share in percent, always finite and within 0..=100
    pub pct: f64,
}

impl PollResult {
    /// Build a result, rejecting values that are not a usable percentage
    pub fn new(choice: impl Into<String>, pct: f64) -> Option<Self> {
        if pct.is_finite() && (0.0..=100.0).contains(&pct) {
            Some(Self {
                choice: choice.into(),
                pct,
            })
        } else {
            None
        }
    }
}

/// Structured extraction attempt derived from one poll block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateRecord {
    /// Best-guess canonical source link (may be empty)
    pub url: String,
    /// Coarse topic classification
    pub category: PollCategory,
    /// Contest label
    pub race: String,
    /// Polling firm
    pub pollster: String,
    /// Raw substring believed to hold the field dates
    pub date_text: String,
    /// Raw sample-size substring
    pub sample: String,
    /// Reserved, always empty
    pub population: String,
    /// Normalized text of the block every field was derived from
    pub results_text: String,
    /// Extracted numeric results, never empty in engine output
    pub results: Vec<PollResult>,
}

/// Configuration for poll extraction
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Maximum records returned per frame
    pub max_records: usize,
    /// Maximum blocks discovered per pass
    pub max_blocks: usize,
    /// Elements examined per link, counting the link itself as the first
    pub ancestor_depth: usize,
    /// Minimum normalized block length in characters
    pub min_block_chars: usize,
    /// Maximum normalized block length in characters
    pub max_block_chars: usize,
    /// Link-driven blocks below this count trigger the container scan
    pub fallback_threshold: usize,
    /// Maximum containers examined by the fallback scan
    pub fallback_scan_limit: usize,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            max_records: 600,
            max_blocks: 600,
            ancestor_depth: 10,
            min_block_chars: 20,
            max_block_chars: 2200,
            fallback_threshold: 5,
            fallback_scan_limit: 2500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poll_result_rejects_out_of_range() {
        assert!(PollResult::new("Smith", 47.0).is_some());
        assert!(PollResult::new("Smith", 0.0).is_some());
        assert!(PollResult::new("Smith", 100.0).is_some());
        assert!(PollResult::new("Smith", 100.5).is_none());
        assert!(PollResult::new("Smith", -1.0).is_none());
        assert!(PollResult::new("Smith", f64::NAN).is_none());
        assert!(PollResult::new("Smith", f64::INFINITY).is_none());
    }

    #[test]
    fn test_record_serializes_camel_case() {
        let record = CandidateRecord {
            url: "https://pollster.example/poll".to_string(),
            category: PollCategory::GenericBallot,
            race: "Generic Ballot".to_string(),
            pollster: "Acme Research".to_string(),
            date_text: "Jan 3-5, 2026".to_string(),
            sample: "n=812".to_string(),
            population: String::new(),
            results_text: "Acme Research Dem 47% Rep 43%".to_string(),
            results: vec![PollResult::new("Dem", 47.0).unwrap()],
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["category"], "generic_ballot");
        assert_eq!(json["dateText"], "Jan 3-5, 2026");
        assert_eq!(json["resultsText"], "Acme Research Dem 47% Rep 43%");
        assert_eq!(json["results"][0]["choice"], "Dem");
        assert_eq!(json["results"][0]["pct"], 47.0);
    }

    #[test]
    fn test_category_display_matches_serde() {
        for category in [PollCategory::DemPrimary, PollCategory::PresGeneral, PollCategory::Other] {
            let json = serde_json::to_value(category).unwrap();
            assert_eq!(json, category.as_str());
        }
    }
}
