//! # Core Entities
//!
//! Identifiers and the channel-open proposal carried by every request.
//!
//! ## Clusters
//!
//! - **Identity**: `NodeId`, `PendingChannelId`
//! - **Proposal**: `OpenChannel`

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, Bytes};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A 32-byte chain hash (genesis block hash of the target chain).
pub type ChainHash = [u8; 32];

/// Errors produced when parsing identifiers from text or raw bytes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdParseError {
    /// Input was not valid hex.
    #[error("invalid hex: {0}")]
    InvalidHex(String),

    /// Input decoded to the wrong number of bytes.
    #[error("invalid length: expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
}

// =============================================================================
// IDENTITY
// =============================================================================

/// Compressed secp256k1 public key of the peer proposing the channel.
#[serde_as]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(#[serde_as(as = "Bytes")] pub [u8; 33]);

impl NodeId {
    /// Length of a compressed public key.
    pub const LEN: usize = 33;

    /// Get the raw key bytes.
    pub fn as_bytes(&self) -> &[u8; 33] {
        &self.0
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self([0u8; 33])
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

/// Identifier of a proposed channel, chosen by the proposing peer.
///
/// This is the correlation key between a request and its verdict. The
/// correlator never generates these; it only compares them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PendingChannelId(pub [u8; 32]);

impl PendingChannelId {
    /// Length of a pending channel identifier.
    pub const LEN: usize = 32;

    /// Build an identifier whose first byte is `tag` and the rest zero.
    ///
    /// Handy for tests and fixtures (`{0}`, `{1}`, ...).
    pub fn from_tag(tag: u8) -> Self {
        let mut bytes = [0u8; 32];
        bytes[0] = tag;
        Self(bytes)
    }

    /// Parse from a raw byte slice, as found in a decision response.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, IdParseError> {
        let arr: [u8; 32] = bytes.try_into().map_err(|_| IdParseError::InvalidLength {
            expected: Self::LEN,
            actual: bytes.len(),
        })?;
        Ok(Self(arr))
    }

    /// Get the raw identifier bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Exact byte comparison against an identifier received on the wire.
    pub fn matches(&self, other: &[u8]) -> bool {
        self.0.as_slice() == other
    }
}

impl fmt::Display for PendingChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl FromStr for PendingChannelId {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s).map_err(|e| IdParseError::InvalidHex(e.to_string()))?;
        Self::from_slice(&bytes)
    }
}

impl From<[u8; 32]> for PendingChannelId {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for PendingChannelId {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

// =============================================================================
// PROPOSAL
// =============================================================================

/// Parameters of an inbound channel-open proposal.
///
/// Amounts suffixed `_sat` are in satoshis, `_msat` in millisatoshis.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenChannel {
    /// Genesis hash of the chain the channel will live on.
    pub chain_hash: ChainHash,
    /// Correlation identifier chosen by the proposer.
    pub pending_channel_id: PendingChannelId,
    /// Total channel capacity funded by the proposer.
    pub funding_sat: u64,
    /// Amount pushed to us at channel open.
    pub push_msat: u64,
    /// Outputs below this value are not created.
    pub dust_limit_sat: u64,
    /// Cap on outstanding HTLC value towards the proposer.
    pub max_value_in_flight_msat: u64,
    /// Reserve the proposer requires us to keep.
    pub channel_reserve_sat: u64,
    /// Smallest HTLC the proposer will accept.
    pub htlc_minimum_msat: u64,
    /// Initial commitment fee rate.
    pub fee_per_kw: u32,
    /// Relative delay on our to-self outputs.
    pub csv_delay: u16,
    /// Maximum number of HTLCs the proposer will accept.
    pub max_accepted_htlcs: u16,
    /// Announcement flags (bit 0: public channel).
    pub channel_flags: u8,
}

impl OpenChannel {
    /// Bit in `channel_flags` marking the channel for public announcement.
    pub const FLAG_ANNOUNCE: u8 = 0x01;

    /// Minimal proposal carrying only an identifier.
    pub fn with_id(pending_channel_id: PendingChannelId) -> Self {
        Self {
            pending_channel_id,
            ..Self::default()
        }
    }

    /// Whether the proposer wants the channel announced.
    pub fn is_public(&self) -> bool {
        self.channel_flags & Self::FLAG_ANNOUNCE != 0
    }
}
