//! Driven Ports (SPI - Outbound Dependencies)
//!
//! The acceptor itself only needs the request queue and reply sinks from
//! `acceptor-bus`. `DecisionPolicy` is the seam for an in-process decision
//! channel driven by `adapters::PolicyResponder`.

use acceptor_types::{ChannelAcceptRequest, Verdict};
use async_trait::async_trait;

/// Produces a verdict for one request.
///
/// May take arbitrarily long; the caller's deadline is enforced on the
/// acceptor side, not here.
#[async_trait]
pub trait DecisionPolicy: Send + Sync {
    async fn decide(&self, request: &ChannelAcceptRequest) -> Verdict;
}

/// Synchronous closure adapter for `DecisionPolicy`.
pub struct FnPolicy<F>(pub F);

#[async_trait]
impl<F> DecisionPolicy for FnPolicy<F>
where
    F: Fn(&ChannelAcceptRequest) -> Verdict + Send + Sync,
{
    async fn decide(&self, request: &ChannelAcceptRequest) -> Verdict {
        (self.0)(request)
    }
}
