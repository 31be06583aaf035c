//! Bridge from the request queue to a remote decider speaking a duplex stream.
//!
//! Requests go out as bare `ChannelAcceptRequest`s; responses come back as
//! `ChannelAcceptResponse`s in any order and are routed to the waiting entry
//! by pending channel id. The id-to-sink table lives inside the bridge task.

use acceptor_bus::{ReplySink, RequestReceiver, ShutdownListener};
use acceptor_types::{ChannelAcceptRequest, ChannelAcceptResponse, PendingChannelId};
use std::collections::HashMap;
use tokio::sync::mpsc::{self, OwnedPermit};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Reason given when a second request arrives for an id already in flight.
pub const DUPLICATE_ID_REASON: &str = "duplicate pending channel id";

/// Default buffer for each direction of the stream.
pub const DEFAULT_STREAM_BUFFER: usize = 16;

/// Why the bridge stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeExit {
    /// The shutdown signal was raised.
    Shutdown,
    /// Every publisher is gone.
    QueueClosed,
    /// The remote decider hung up.
    RemoteClosed,
}

/// The remote decider's end of the stream.
pub struct DeciderStream {
    pub requests: mpsc::Receiver<ChannelAcceptRequest>,
    pub responses: mpsc::Sender<ChannelAcceptResponse>,
}

impl DeciderStream {
    /// Next request to decide, or `None` once the bridge has stopped.
    pub async fn next_request(&mut self) -> Option<ChannelAcceptRequest> {
        self.requests.recv().await
    }

    /// Send a response back. Returns `false` once the bridge has stopped.
    pub async fn respond(&self, response: ChannelAcceptResponse) -> bool {
        self.responses.send(response).await.is_ok()
    }
}

/// Forwards queued entries to a remote decider and routes its answers back.
pub struct StreamBridge {
    receiver: RequestReceiver,
    shutdown: ShutdownListener,
    outbound: mpsc::Sender<ChannelAcceptRequest>,
    inbound: mpsc::Receiver<ChannelAcceptResponse>,
    pending: HashMap<PendingChannelId, ReplySink>,
}

impl StreamBridge {
    /// Create a bridge and the remote end it talks to.
    pub fn new(
        receiver: RequestReceiver,
        shutdown: ShutdownListener,
        buffer: usize,
    ) -> (Self, DeciderStream) {
        let buffer = buffer.max(1);
        let (outbound, requests) = mpsc::channel(buffer);
        let (responses, inbound) = mpsc::channel(buffer);

        let bridge = Self {
            receiver,
            shutdown,
            outbound,
            inbound,
            pending: HashMap::new(),
        };
        (bridge, DeciderStream { requests, responses })
    }

    /// Run until shutdown, queue closure or remote hangup.
    ///
    /// On exit every unanswered sink is dropped, which unblocks its caller.
    ///
    /// Outbound space is reserved inside the loop's `select!`, so a remote
    /// that stops reading requests never stalls shutdown or response routing.
    pub async fn run(mut self) -> BridgeExit {
        let mut permit: Option<OwnedPermit<ChannelAcceptRequest>> = None;

        let exit = loop {
            tokio::select! {
                biased;
                _ = self.shutdown.recv() => break BridgeExit::Shutdown,
                response = self.inbound.recv() => match response {
                    Some(response) => self.route(response),
                    None => break BridgeExit::RemoteClosed,
                },
                reserved = self.outbound.clone().reserve_owned(), if permit.is_none() => {
                    match reserved {
                        Ok(reserved) => permit = Some(reserved),
                        Err(_) => break BridgeExit::RemoteClosed,
                    }
                }
                entry = self.receiver.recv(), if permit.is_some() => match (entry, permit.take()) {
                    (Some(entry), Some(reserved)) => {
                        let (request, sink) = entry.into_parts();
                        permit = self.forward(request, sink, reserved);
                    }
                    _ => break BridgeExit::QueueClosed,
                },
            }
        };

        if !self.pending.is_empty() {
            warn!(
                pending = self.pending.len(),
                reason = ?exit,
                "Stream bridge stopping with unanswered requests"
            );
        } else {
            info!(reason = ?exit, "Stream bridge stopped");
        }
        exit
    }

    /// Run on a new task.
    pub fn spawn(self) -> JoinHandle<BridgeExit> {
        tokio::spawn(self.run())
    }

    /// Send `request` on the reserved slot. Hands the permit back if the
    /// request was answered locally instead.
    fn forward(
        &mut self,
        request: ChannelAcceptRequest,
        sink: ReplySink,
        permit: OwnedPermit<ChannelAcceptRequest>,
    ) -> Option<OwnedPermit<ChannelAcceptRequest>> {
        let id = request.pending_channel_id();
        self.pending.retain(|_, waiting| !waiting.is_abandoned());

        if self.pending.contains_key(&id) {
            warn!(pending_chan_id = %id, "Rejecting request for an id already in flight");
            sink.respond(ChannelAcceptResponse::reject(id, DUPLICATE_ID_REASON));
            return Some(permit);
        }

        permit.send(request);
        debug!(pending_chan_id = %id, "Request forwarded to remote decider");
        self.pending.insert(id, sink);
        None
    }

    fn route(&mut self, response: ChannelAcceptResponse) {
        let sink = response
            .pending_channel_id()
            .and_then(|id| self.pending.remove(&id));

        match sink {
            Some(sink) => {
                if !sink.respond(response) {
                    debug!("Remote verdict arrived after caller left");
                }
            }
            None => warn!(
                pending_chan_id = %response.pending_chan_id_hex(),
                "Dropping response for unknown pending channel id"
            ),
        }
    }
}
