//! Domain types for the acceptor.
//!
//! Configuration, the per-call error taxonomy and outcome statistics.
//! The async machinery lives in `service` and `adapters`.

pub mod config;
pub mod error;
pub mod stats;

// Re-exports for convenience
pub use config::{AcceptorConfig, ConfigError, DEFAULT_ACCEPT_TIMEOUT};
pub use error::{AcceptorError, AcceptorResult};
pub use stats::{AcceptorStats, MismatchRecord, StatsSnapshot};
