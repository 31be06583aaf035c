//! # Decision Messages
//!
//! The request handed to the external decision channel and the tagged
//! response it produces, exactly once per request.

use crate::entities::{NodeId, OpenChannel, PendingChannelId};
use serde::{Deserialize, Serialize};

/// A channel-open proposal awaiting a verdict.
///
/// Immutable once created. The correlation identifier lives inside the
/// proposal (`open_channel.pending_channel_id`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelAcceptRequest {
    /// Peer proposing the channel.
    pub node: NodeId,
    /// The proposal itself.
    pub open_channel: OpenChannel,
}

impl ChannelAcceptRequest {
    pub fn new(node: NodeId, open_channel: OpenChannel) -> Self {
        Self { node, open_channel }
    }

    /// Correlation identifier of this request.
    pub fn pending_channel_id(&self) -> PendingChannelId {
        self.open_channel.pending_channel_id
    }
}

/// Outcome of a decision, detached from its identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    /// Open the channel.
    Accept,
    /// Refuse the channel, with a human-readable reason.
    Reject(String),
}

impl Verdict {
    pub fn reject(reason: impl Into<String>) -> Self {
        Self::Reject(reason.into())
    }

    pub fn is_accept(&self) -> bool {
        matches!(self, Self::Accept)
    }
}

/// Response from the external decision channel.
///
/// `pending_chan_id` is kept as raw bytes as received, so that a malformed
/// identifier (wrong length) is still representable and surfaces as a
/// mismatch rather than a decoding failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelAcceptResponse {
    /// Whether the channel should be opened.
    pub accept: bool,
    /// Identifier of the request this answers.
    pub pending_chan_id: Vec<u8>,
    /// Why the channel was refused. Empty on accept.
    #[serde(default)]
    pub rejection_reason: String,
}

impl ChannelAcceptResponse {
    /// Accepting response for `id`.
    pub fn accept(id: PendingChannelId) -> Self {
        Self {
            accept: true,
            pending_chan_id: id.0.to_vec(),
            rejection_reason: String::new(),
        }
    }

    /// Rejecting response for `id`.
    pub fn reject(id: PendingChannelId, reason: impl Into<String>) -> Self {
        Self {
            accept: false,
            pending_chan_id: id.0.to_vec(),
            rejection_reason: reason.into(),
        }
    }

    /// Build a response for `id` from a verdict.
    pub fn from_verdict(id: PendingChannelId, verdict: Verdict) -> Self {
        match verdict {
            Verdict::Accept => Self::accept(id),
            Verdict::Reject(reason) => Self::reject(id, reason),
        }
    }

    /// Whether this response answers `id` (exact byte equality).
    pub fn answers(&self, id: &PendingChannelId) -> bool {
        id.matches(&self.pending_chan_id)
    }

    /// The verdict carried by this response.
    pub fn verdict(&self) -> Verdict {
        if self.accept {
            Verdict::Accept
        } else {
            Verdict::Reject(self.rejection_reason.clone())
        }
    }

    /// Identifier as a typed value, if it has the right length.
    pub fn pending_channel_id(&self) -> Option<PendingChannelId> {
        PendingChannelId::from_slice(&self.pending_chan_id).ok()
    }

    /// Hex rendering of the raw identifier, for logs and error messages.
    pub fn pending_chan_id_hex(&self) -> String {
        hex::encode(&self.pending_chan_id)
    }
}
