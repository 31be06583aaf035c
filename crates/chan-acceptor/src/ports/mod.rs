//! Ports module for the acceptor.
//!
//! - `inbound`: what callers drive (`ChannelAcceptor`)
//! - `outbound`: what an in-process decision channel plugs in (`DecisionPolicy`)

pub mod inbound;
pub mod outbound;

pub use inbound::ChannelAcceptor;
pub use outbound::{DecisionPolicy, FnPolicy};
