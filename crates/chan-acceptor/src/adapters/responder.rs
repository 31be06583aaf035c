//! In-process decision channel driven by a `DecisionPolicy`.

use crate::ports::outbound::DecisionPolicy;
use acceptor_bus::{PendingEntry, RequestReceiver, ShutdownListener};
use acceptor_types::ChannelAcceptResponse;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Consumes the request queue and answers each entry with the policy's verdict.
///
/// Every entry is decided on its own task, so a slow decision never holds up
/// the ones queued behind it and verdicts may arrive in any order.
pub struct PolicyResponder<P> {
    policy: Arc<P>,
    receiver: RequestReceiver,
    shutdown: ShutdownListener,
}

impl<P> PolicyResponder<P>
where
    P: DecisionPolicy + 'static,
{
    /// Answer entries from `receiver` with `policy` until `shutdown` is raised.
    pub fn new(policy: Arc<P>, receiver: RequestReceiver, shutdown: ShutdownListener) -> Self {
        Self {
            policy,
            receiver,
            shutdown,
        }
    }

    /// Run until shutdown or until every publisher is gone.
    ///
    /// Returns the number of entries dispatched.
    pub async fn run(mut self) -> u64 {
        let mut dispatched = 0u64;

        loop {
            tokio::select! {
                biased;
                _ = self.shutdown.recv() => {
                    info!(dispatched, "Policy responder stopping: shutdown");
                    break;
                }
                entry = self.receiver.recv() => match entry {
                    Some(entry) => {
                        dispatched += 1;
                        tokio::spawn(answer(Arc::clone(&self.policy), entry));
                    }
                    None => {
                        info!(dispatched, "Policy responder stopping: request queue closed");
                        break;
                    }
                },
            }
        }

        dispatched
    }

    /// Run on a new task.
    pub fn spawn(self) -> JoinHandle<u64> {
        tokio::spawn(self.run())
    }
}

async fn answer<P: DecisionPolicy>(policy: Arc<P>, entry: PendingEntry) {
    let (request, mut reply) = entry.into_parts();
    let id = request.pending_channel_id();

    // Stop deciding as soon as the caller gives up.
    let verdict = tokio::select! {
        _ = reply.abandoned() => None,
        verdict = policy.decide(&request) => Some(verdict),
    };

    match verdict {
        Some(verdict) => {
            if !reply.respond(ChannelAcceptResponse::from_verdict(id, verdict)) {
                debug!(pending_chan_id = %id, "Verdict arrived after caller left");
            }
        }
        None => debug!(pending_chan_id = %id, "Caller left before policy decided"),
    }
}
