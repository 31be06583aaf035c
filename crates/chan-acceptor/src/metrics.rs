//! # Acceptor Metrics
//!
//! Prometheus metrics for accept-call outcomes.
//!
//! ## Usage
//!
//! Enable with the `metrics` feature:
//! ```toml
//! chan-acceptor = { path = "...", features = ["metrics"] }
//! ```
//!
//! ## Metrics Exported
//!
//! - `acceptor_decisions_total` - Counter of finished accept calls, labelled by outcome
//!   (`cancelled` when the caller stopped waiting first)
//! - `acceptor_identifier_mismatches_total` - Counter of protocol violations by the decision channel
//! - `acceptor_decision_duration_seconds` - Histogram of time from call to outcome

use crate::domain::error::AcceptorError;
use std::time::Duration;

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
use prometheus::{
    register_histogram, register_int_counter, register_int_counter_vec, Histogram, IntCounter,
    IntCounterVec,
};

#[cfg(feature = "metrics")]
lazy_static! {
    /// Finished accept calls, labelled by outcome
    pub static ref DECISIONS: IntCounterVec = register_int_counter_vec!(
        "acceptor_decisions_total",
        "Total number of finished accept calls",
        &["outcome"]
    )
    .expect("Failed to create DECISIONS metric");

    /// Identifier mismatches reported by callers
    pub static ref IDENTIFIER_MISMATCHES: IntCounter = register_int_counter!(
        "acceptor_identifier_mismatches_total",
        "Total number of responses carrying a foreign pending channel id"
    )
    .expect("Failed to create IDENTIFIER_MISMATCHES metric");

    /// Time from call to outcome
    pub static ref DECISION_DURATION: Histogram = register_histogram!(
        "acceptor_decision_duration_seconds",
        "Time spent waiting for a verdict",
        vec![0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 2.5, 5.0, 10.0]
    )
    .expect("Failed to create DECISION_DURATION metric");
}

/// Outcome label for a finished call.
pub fn outcome_label(outcome: &Result<(), AcceptorError>) -> &'static str {
    match outcome {
        Ok(()) => "accepted",
        Err(e) => e.kind(),
    }
}

/// Record a finished accept call
#[cfg(feature = "metrics")]
pub fn record_outcome(outcome: &Result<(), AcceptorError>, elapsed: Duration) {
    DECISIONS.with_label_values(&[outcome_label(outcome)]).inc();
    if matches!(outcome, Err(AcceptorError::IdentifierMismatch { .. })) {
        IDENTIFIER_MISMATCHES.inc();
    }
    DECISION_DURATION.observe(elapsed.as_secs_f64());
}

/// Record a call whose caller stopped waiting before any outcome
#[cfg(feature = "metrics")]
pub fn record_cancelled(elapsed: Duration) {
    DECISIONS.with_label_values(&["cancelled"]).inc();
    DECISION_DURATION.observe(elapsed.as_secs_f64());
}

// =============================================================================
// NO-OP IMPLEMENTATIONS (when metrics feature disabled)
// =============================================================================

#[cfg(not(feature = "metrics"))]
pub fn record_outcome(_outcome: &Result<(), AcceptorError>, _elapsed: Duration) {}

#[cfg(not(feature = "metrics"))]
pub fn record_cancelled(_elapsed: Duration) {}
