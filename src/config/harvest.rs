//! Harvest run configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// What to harvest and where the report goes
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HarvestConfig {
    /// Identifier written to the report's `source` field
    pub source: String,
    /// Page URLs to harvest
    pub pages: Vec<String>,
    /// Report output path
    pub output: PathBuf,
    /// Runs yielding fewer records than this are failures
    pub min_records: usize,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            source: "pollscrape".to_string(),
            pages: Vec::new(),
            output: PathBuf::from("polls.json"),
            min_records: 10,
        }
    }
}
