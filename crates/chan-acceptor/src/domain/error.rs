//! Error types for a single accept call.
//!
//! Every outcome other than acceptance is resolved inside the call that
//! produced it and returned to that call's caller. Nothing is retried here.

use acceptor_types::PendingChannelId;
use std::time::Duration;
use thiserror::Error;

/// Why an accept call did not succeed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AcceptorError {
    /// No verdict arrived before the deadline. The caller may retry with a
    /// fresh identifier.
    #[error("acceptor timed out after {}ms", .timeout.as_millis())]
    Timeout { timeout: Duration },

    /// The acceptor is shutting down.
    #[error("acceptor shutting down")]
    ShuttingDown,

    /// The decision channel answered with someone else's identifier.
    ///
    /// This is a protocol bug in the decision channel, not a verdict.
    #[error("pending channel id mismatch: expected {expected}, got {actual}")]
    IdentifierMismatch {
        expected: PendingChannelId,
        /// Hex of the identifier bytes actually received.
        actual: String,
    },

    /// The decision channel refused the channel.
    #[error("channel rejected: {reason}")]
    Rejected { reason: String },

    /// The decision channel stopped consuming requests.
    #[error("decision channel unavailable: request queue closed")]
    QueueClosed,

    /// The decision channel discarded the request without answering.
    #[error("decision channel dropped the request without a verdict")]
    ReplyDropped,
}

impl AcceptorError {
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self::Rejected {
            reason: reason.into(),
        }
    }

    /// Whether a caller may reasonably try again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Whether this signals a broken decision channel rather than a verdict.
    pub fn is_protocol_violation(&self) -> bool {
        matches!(self, Self::IdentifierMismatch { .. })
    }

    /// Rejection reason, if this is a legitimate negative verdict.
    pub fn rejection_reason(&self) -> Option<&str> {
        match self {
            Self::Rejected { reason } => Some(reason),
            _ => None,
        }
    }

    /// Short stable label, used for log fields and metric labels.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Timeout { .. } => "timeout",
            Self::ShuttingDown => "shutdown",
            Self::IdentifierMismatch { .. } => "mismatch",
            Self::Rejected { .. } => "rejected",
            Self::QueueClosed => "queue_closed",
            Self::ReplyDropped => "reply_dropped",
        }
    }
}

/// Result type for acceptor operations
pub type AcceptorResult<T> = Result<T, AcceptorError>;
