//! Harvest report persisted as JSON

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::HarvestError;
use crate::extraction::CandidateRecord;

/// Records from one harvest run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollReport {
    pub updated_at: DateTime<Utc>,
    pub source: String,
    pub source_pages: Vec<String>,
    pub polls: Vec<CandidateRecord>,
}

impl PollReport {
    /// Build a report stamped with the current time
    pub fn new(
        source: impl Into<String>,
        source_pages: Vec<String>,
        polls: Vec<CandidateRecord>,
    ) -> Self {
        Self {
            updated_at: Utc::now(),
            source: source.into(),
            source_pages,
            polls,
        }
    }

    pub fn poll_count(&self) -> usize {
        self.polls.len()
    }

    /// Write pretty-printed JSON to `path`.
    ///
    /// The report is written to a sibling temp file first and then renamed, so
    /// readers never see a partial file.
    pub fn write(&self, path: &Path) -> Result<(), HarvestError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self)?;
        let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
        tmp_name.push(".tmp");
        let tmp_path = path.with_file_name(tmp_name);

        std::fs::write(&tmp_path, json)?;
        std::fs::rename(&tmp_path, path)?;

        tracing::info!(path = %path.display(), polls = self.poll_count(), "Wrote poll report");
        Ok(())
    }

    /// Read a report written by [`write`](Self::write)
    pub fn read(path: &Path) -> Result<Self, HarvestError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}
