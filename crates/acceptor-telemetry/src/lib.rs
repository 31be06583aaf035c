//! # Acceptor Telemetry
//!
//! Structured logging for the channel acceptor workspace.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use acceptor_telemetry::{init_logging, TelemetryConfig};
//!
//! let config = TelemetryConfig::from_env();
//! init_logging(&config).expect("Failed to init logging");
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `ACCEPTOR_SERVICE_NAME` | `chan-acceptor` | Service name in logs |
//! | `ACCEPTOR_LOG_LEVEL` | `info` | Log level filter (falls back to `RUST_LOG`) |
//! | `ACCEPTOR_JSON_LOGS` | `false` | JSON output (`true` inside containers) |

mod config;
mod logging;

pub use config::TelemetryConfig;
pub use logging::{env_filter, init_logging, init_test_logging};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to initialize tracing subscriber: {0}")]
    SubscriberInit(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Convenience macro for creating a span around one decision.
///
/// # Example
///
/// ```rust,ignore
/// use acceptor_telemetry::decision_span;
///
/// let _span = decision_span!("accept", pending_chan_id = %id).entered();
/// ```
#[macro_export]
macro_rules! decision_span {
    ($name:expr, $($field:tt)*) => {
        tracing::info_span!($name, $($field)*)
    };
}
