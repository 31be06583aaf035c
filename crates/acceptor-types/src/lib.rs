//! # Acceptor Types Crate
//!
//! Data model shared by the decision correlator and the external decision
//! channel.
//!
//! ## Design Principles
//!
//! - **Caller-chosen identity**: the correlation identifier
//!   (`PendingChannelId`) is picked by the proposing peer, never generated
//!   here.
//! - **Raw response identifiers**: responses keep the identifier as bytes so
//!   a corrupted reply is still routable to the caller that must reject it.

pub mod entities;
pub mod messages;

pub use entities::*;
pub use messages::*;
