//! RPC Acceptor - blocking accept calls over an asynchronous decision channel.
//!
//! Flow per call:
//! 1. Allocate a private single-slot reply conduit (`PendingEntry::new`)
//! 2. Publish the entry onto the shared request queue, unless shutting down
//! 3. Wait for whichever comes first: the reply, the deadline, or shutdown
//! 4. Check the reply carries this call's identifier, then map the verdict
//!
//! There is no shared identifier-to-waiter table. A reply can only reach the
//! call that created the conduit, and an abandoned conduit is simply dropped.

use crate::domain::{
    AcceptorConfig, AcceptorError, AcceptorResult, AcceptorStats, ConfigError,
};
use crate::ports::inbound::ChannelAcceptor;
use acceptor_bus::{
    PendingEntry, RequestPublisher, RequestQueue, RequestReceiver, ShutdownSignal,
};
use acceptor_types::{ChannelAcceptRequest, ChannelAcceptResponse, PendingChannelId};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// The decision correlator.
///
/// Cheap to clone; clones share the queue, the shutdown signal and the
/// statistics.
#[derive(Clone)]
pub struct RpcAcceptor {
    config: AcceptorConfig,
    publisher: Arc<dyn RequestPublisher>,
    shutdown: ShutdownSignal,
    stats: Arc<AcceptorStats>,
}

impl RpcAcceptor {
    /// Create an acceptor publishing onto `publisher`.
    ///
    /// # Errors
    ///
    /// `ConfigError` if the configuration does not validate.
    pub fn new(
        config: AcceptorConfig,
        publisher: Arc<dyn RequestPublisher>,
        shutdown: ShutdownSignal,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let stats = Arc::new(AcceptorStats::new(config.mismatch_history));

        Ok(Self {
            config,
            publisher,
            shutdown,
            stats,
        })
    }

    /// Create an acceptor with its own in-memory request queue.
    ///
    /// Returns the receiver the decision channel must consume.
    pub fn with_queue(config: AcceptorConfig) -> Result<(Self, RequestReceiver), ConfigError> {
        config.validate()?;
        let (queue, receiver) = RequestQueue::with_capacity(config.queue_capacity);
        let acceptor = Self::new(config, Arc::new(queue), ShutdownSignal::new())?;
        Ok((acceptor, receiver))
    }

    /// Raise the shutdown signal, failing every pending and future call.
    ///
    /// Idempotent: returns `true` only for the call that raised it.
    pub fn shutdown(&self) -> bool {
        self.shutdown.trigger()
    }

    /// Whether shutdown has been raised.
    pub fn is_shutting_down(&self) -> bool {
        self.shutdown.is_triggered()
    }

    /// The shutdown signal, for collaborators that should stop alongside.
    pub fn shutdown_signal(&self) -> &ShutdownSignal {
        &self.shutdown
    }

    /// Outcome statistics.
    pub fn stats(&self) -> &AcceptorStats {
        &self.stats
    }

    /// Active configuration.
    pub fn config(&self) -> &AcceptorConfig {
        &self.config
    }

    async fn decide(&self, request: ChannelAcceptRequest) -> AcceptorResult<()> {
        let expected = request.pending_channel_id();
        let mut shutdown = self.shutdown.listener();
        let (entry, reply) = PendingEntry::new(request);

        // Publishing may suspend on a full queue; shutdown must still win.
        tokio::select! {
            biased;
            _ = shutdown.recv() => return Err(AcceptorError::ShuttingDown),
            published = self.publisher.publish(entry) => {
                published.map_err(|_| AcceptorError::QueueClosed)?;
            }
        }

        let timeout = self.config.accept_timeout;
        let deadline = tokio::time::sleep(timeout);

        tokio::select! {
            biased;
            _ = shutdown.recv() => Err(AcceptorError::ShuttingDown),
            response = reply => match response {
                Ok(response) => check_response(expected, response),
                Err(_) => Err(AcceptorError::ReplyDropped),
            },
            _ = deadline => Err(AcceptorError::Timeout { timeout }),
        }
    }
}

/// Map a response to the outcome of the call that is waiting for it.
fn check_response(
    expected: PendingChannelId,
    response: ChannelAcceptResponse,
) -> AcceptorResult<()> {
    if !response.answers(&expected) {
        return Err(AcceptorError::IdentifierMismatch {
            expected,
            actual: response.pending_chan_id_hex(),
        });
    }

    if !response.accept {
        return Err(AcceptorError::Rejected {
            reason: response.rejection_reason,
        });
    }

    Ok(())
}

#[async_trait]
impl ChannelAcceptor for RpcAcceptor {
    async fn accept(&self, request: ChannelAcceptRequest) -> AcceptorResult<()> {
        let pending_chan_id = request.pending_channel_id();
        let node = request.node;

        // Counted as cancelled if this future is dropped before an outcome.
        let tracker = self.stats.track();
        let outcome = self.decide(request).await;
        let elapsed = tracker.finish(&outcome);

        match &outcome {
            Ok(()) => debug!(
                pending_chan_id = %pending_chan_id,
                node = %node,
                elapsed_ms = elapsed.as_millis(),
                "Channel accepted"
            ),
            Err(AcceptorError::Rejected { reason }) => info!(
                pending_chan_id = %pending_chan_id,
                node = %node,
                reason = %reason,
                "Channel rejected"
            ),
            Err(AcceptorError::IdentifierMismatch { actual, .. }) => warn!(
                pending_chan_id = %pending_chan_id,
                actual = %actual,
                "Decision channel answered with a foreign pending channel id"
            ),
            Err(AcceptorError::ShuttingDown) => debug!(
                pending_chan_id = %pending_chan_id,
                "Accept call cancelled by shutdown"
            ),
            Err(e) => warn!(
                pending_chan_id = %pending_chan_id,
                error = %e,
                elapsed_ms = elapsed.as_millis(),
                "Accept call failed"
            ),
        }

        outcome
    }
}
