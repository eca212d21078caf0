//! Page fetching and retry configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::DEFAULT_USER_AGENT;

/// HTTP fetch configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// User agent string
    pub user_agent: String,
    /// Request timeout (seconds)
    pub timeout_secs: u64,
    /// Connection timeout (seconds)
    pub connect_timeout_secs: u64,
    /// Maximum response size (bytes)
    pub max_content_size: usize,
    /// Attempts per page before giving up
    pub max_attempts: u32,
    /// Delay before the first retry (milliseconds)
    pub initial_backoff_ms: u64,
    /// Upper bound on the retry delay (milliseconds)
    pub max_backoff_ms: u64,
    /// Also fetch documents embedded with `<iframe src>`
    pub follow_frames: bool,
    /// Maximum embedded frames fetched per page
    pub max_frames: usize,
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Delay before retry number `attempt` (1-based): doubles each time, capped
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u64.saturating_pow(attempt.saturating_sub(1));
        let ms = self.initial_backoff_ms.saturating_mul(factor);
        Duration::from_millis(ms.min(self.max_backoff_ms))
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: 30,
            connect_timeout_secs: 10,
            max_content_size: 10 * 1024 * 1024, // 10 MB
            max_attempts: 3,
            initial_backoff_ms: 2_000,
            max_backoff_ms: 30_000,
            follow_frames: true,
            max_frames: 8,
        }
    }
}
