//! Driving Ports (API - Inbound)

use crate::domain::AcceptorResult;
use acceptor_types::ChannelAcceptRequest;
use async_trait::async_trait;

/// Decide whether an inbound channel-open proposal should be accepted.
///
/// Implementations must be safe to call from any number of tasks at once.
/// `Ok(())` means accept; every other outcome is an `AcceptorError`.
#[async_trait]
pub trait ChannelAcceptor: Send + Sync {
    /// Block until a verdict for `request` is known.
    async fn accept(&self, request: ChannelAcceptRequest) -> AcceptorResult<()>;
}
