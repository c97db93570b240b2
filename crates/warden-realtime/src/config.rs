//! Reconnect policy configuration.

use std::time::Duration;

use backon::ExponentialBuilder;
use serde::{Deserialize, Serialize};

/// Settings for the shared push connection.
///
/// Loaded from the `[realtime]` table of the Warden config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RealtimeConfig {
    /// Push endpoint, e.g. `/hubs/notifications`.
    pub endpoint: String,
    /// First reconnect delay in milliseconds.
    pub min_delay_ms: u64,
    /// Reconnect delay ceiling in milliseconds.
    pub max_delay_ms: u64,
    /// Retries allowed after the first failed attempt before giving up, so
    /// `Some(2)` makes three attempts in total. `None` retries forever.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_attempts: Option<usize>,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            endpoint: "/hubs/notifications".to_string(),
            min_delay_ms: 500,
            max_delay_ms: 30_000,
            max_attempts: None,
        }
    }
}

impl RealtimeConfig {
    /// Build the exponential backoff for one reconnect cycle.
    pub fn backoff(&self) -> ExponentialBuilder {
        let builder = ExponentialBuilder::default()
            .with_min_delay(Duration::from_millis(self.min_delay_ms))
            .with_max_delay(Duration::from_millis(self.max_delay_ms.max(self.min_delay_ms)))
            .with_jitter();
        builder.with_max_times(self.max_attempts.unwrap_or(usize::MAX))
    }
}
