//! Configuration for pollscrape

mod fetch;
mod harvest;
mod logging;

pub use crate::extraction::ExtractorConfig;
pub use fetch::FetchConfig;
pub use harvest::HarvestConfig;
pub use logging::{LogFormat, LogLevel, LoggingConfig};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use url::Url;

/// Default user agent for page fetches
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) pollscrape/0.1";

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Poll extraction configuration
    #[serde(default)]
    pub extraction: ExtractorConfig,
    /// Page fetch configuration
    #[serde(default)]
    pub fetch: FetchConfig,
    /// Harvest run configuration
    #[serde(default)]
    pub harvest: HarvestConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file and validate it.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file '{}'", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Serialize as TOML, e.g. for `pollscrape init`.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }

    /// Validate all configuration fields.
    ///
    /// Collects every error and reports them together.
    pub fn validate(&self) -> Result<()> {
        let mut errors: Vec<String> = Vec::new();

        // Extraction validation
        let ex = &self.extraction;
        if ex.max_records == 0 {
            errors.push("max_records must be positive".to_string());
        }
        if ex.max_blocks == 0 {
            errors.push("max_blocks must be positive".to_string());
        }
        if ex.ancestor_depth == 0 {
            errors.push("ancestor_depth must be positive".to_string());
        }
        if ex.min_block_chars >= ex.max_block_chars {
            errors.push(format!(
                "min_block_chars ({}) must be less than max_block_chars ({})",
                ex.min_block_chars, ex.max_block_chars
            ));
        }

        // Fetch validation
        if self.fetch.max_attempts == 0 {
            errors.push("max_attempts must be positive".to_string());
        }
        if self.fetch.timeout_secs == 0 {
            errors.push("timeout_secs must be positive".to_string());
        }
        if self.fetch.initial_backoff_ms > self.fetch.max_backoff_ms {
            errors.push("initial_backoff_ms must not exceed max_backoff_ms".to_string());
        }
        if self.fetch.user_agent.trim().is_empty() {
            errors.push("user_agent must not be empty".to_string());
        }

        // Harvest validation
        if self.harvest.source.trim().is_empty() {
            errors.push("source must not be empty".to_string());
        }
        for page in &self.harvest.pages {
            if Url::parse(page).is_err() {
                errors.push(format!("invalid page URL '{}'", page));
            }
        }
        if self.harvest.output.as_os_str().is_empty() {
            errors.push("output must not be empty".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            anyhow::bail!(
                "Configuration validation failed:\n  - {}",
                errors.join("\n  - ")
            );
        }
    }
}
