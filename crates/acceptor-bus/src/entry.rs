//! # Pending Entries
//!
//! Pairs a request with the private, single-slot conduit its verdict must
//! travel back through.
//!
//! The conduit is a `tokio::sync::oneshot` channel: exactly one writer (the
//! decision channel) and one reader (the blocked caller). `ReplySink::respond`
//! consumes the sink, so a second write cannot be expressed, and the send
//! never waits on the reader.

use acceptor_types::{ChannelAcceptRequest, ChannelAcceptResponse, PendingChannelId, Verdict};
use std::time::Instant;
use tokio::sync::oneshot;
use tracing::debug;

/// Reading half of a pending entry's reply conduit, held by the caller.
pub type ReplyReceiver = oneshot::Receiver<ChannelAcceptResponse>;

/// Writing half of a pending entry's reply conduit.
#[derive(Debug)]
pub struct ReplySink {
    sender: oneshot::Sender<ChannelAcceptResponse>,
}

impl ReplySink {
    /// Deliver the response.
    ///
    /// Returns `false` if the caller stopped waiting (timeout, shutdown). The
    /// response is discarded in that case; nothing blocks.
    pub fn respond(self, response: ChannelAcceptResponse) -> bool {
        self.sender.send(response).is_ok()
    }

    /// Whether the caller on the other end has already given up.
    pub fn is_abandoned(&self) -> bool {
        self.sender.is_closed()
    }

    /// Resolves once the caller on the other end has given up.
    pub async fn abandoned(&mut self) {
        self.sender.closed().await;
    }
}

/// One in-flight request and its reply conduit.
///
/// Created per decision call; never shared across calls.
#[derive(Debug)]
pub struct PendingEntry {
    /// The request to decide.
    pub request: ChannelAcceptRequest,
    /// Where the verdict goes.
    pub reply: ReplySink,
    created_at: Instant,
}

impl PendingEntry {
    /// Create an entry and the receiver the caller will wait on.
    pub fn new(request: ChannelAcceptRequest) -> (Self, ReplyReceiver) {
        let (sender, receiver) = oneshot::channel();
        let entry = Self {
            request,
            reply: ReplySink { sender },
            created_at: Instant::now(),
        };
        (entry, receiver)
    }

    /// Correlation identifier of the wrapped request.
    pub fn pending_channel_id(&self) -> PendingChannelId {
        self.request.pending_channel_id()
    }

    /// When the entry was created.
    pub fn created_at(&self) -> Instant {
        self.created_at
    }

    /// Answer with a verdict tagged with this entry's own identifier.
    pub fn resolve(self, verdict: Verdict) -> bool {
        let id = self.pending_channel_id();
        let delivered = self
            .reply
            .respond(ChannelAcceptResponse::from_verdict(id, verdict));
        if !delivered {
            debug!(pending_chan_id = %id, "Caller gone before verdict arrived");
        }
        delivered
    }

    /// Split into the request and its sink.
    pub fn into_parts(self) -> (ChannelAcceptRequest, ReplySink) {
        (self.request, self.reply)
    }
}
