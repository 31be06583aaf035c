//! Acceptor configuration with validation.

use acceptor_bus::DEFAULT_QUEUE_CAPACITY;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// Default ceiling on how long a caller waits for a verdict.
pub const DEFAULT_ACCEPT_TIMEOUT: Duration = Duration::from_secs(5);

/// Default number of recent identifier mismatches kept for diagnostics.
pub const DEFAULT_MISMATCH_HISTORY: usize = 16;

/// Main acceptor configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AcceptorConfig {
    /// Per-call deadline for the decision channel to answer
    #[serde(with = "humantime_serde")]
    pub accept_timeout: Duration,
    /// Entries buffered on the request queue before callers suspend
    pub queue_capacity: usize,
    /// Recent identifier mismatches retained for inspection (0 disables)
    pub mismatch_history: usize,
}

impl Default for AcceptorConfig {
    fn default() -> Self {
        Self {
            accept_timeout: DEFAULT_ACCEPT_TIMEOUT,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            mismatch_history: DEFAULT_MISMATCH_HISTORY,
        }
    }
}

impl AcceptorConfig {
    /// Configuration with a custom timeout and defaults elsewhere.
    pub fn with_timeout(accept_timeout: Duration) -> Self {
        Self {
            accept_timeout,
            ..Self::default()
        }
    }

    /// Defaults overlaid with environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `ACCEPTOR_TIMEOUT_MS`: Per-call timeout in milliseconds (default: 5000)
    /// - `ACCEPTOR_QUEUE_CAPACITY`: Request queue capacity (default: 64)
    ///
    /// Unparseable values fall back to the default.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            accept_timeout: env::var("ACCEPTOR_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.accept_timeout),

            queue_capacity: env::var("ACCEPTOR_QUEUE_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.queue_capacity),

            mismatch_history: defaults.mismatch_history,
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.accept_timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout(
                "accept_timeout cannot be 0".into(),
            ));
        }

        if self.queue_capacity == 0 {
            return Err(ConfigError::InvalidLimit(
                "queue_capacity cannot be 0".into(),
            ));
        }

        Ok(())
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Invalid size or count limit
    #[error("invalid limit: {0}")]
    InvalidLimit(String),
    /// Invalid timeout value
    #[error("invalid timeout: {0}")]
    InvalidTimeout(String),
}
