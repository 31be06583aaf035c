//! # Request Queue
//!
//! The shared conduit from many concurrent callers to the single external
//! decision channel. Publishing is safe from any number of tasks without
//! extra locking; the consuming side owns the `RequestReceiver`.

use crate::entry::PendingEntry;
use crate::DEFAULT_QUEUE_CAPACITY;
use async_trait::async_trait;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_stream::Stream;
use tracing::{debug, warn};

/// Errors from queue operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QueueError {
    /// The consuming side was dropped.
    #[error("Request queue closed")]
    Closed,

    /// The queue is at capacity (non-blocking publish only).
    #[error("Request queue full")]
    Full,
}

/// Trait for publishing pending entries to the decision channel.
///
/// This is the only shared surface between callers and the collaborator.
#[async_trait]
pub trait RequestPublisher: Send + Sync {
    /// Publish an entry, suspending while the queue is full.
    ///
    /// # Errors
    ///
    /// `QueueError::Closed` if nothing will ever consume the entry.
    async fn publish(&self, entry: PendingEntry) -> Result<(), QueueError>;

    /// Get the total number of entries accepted onto the queue.
    fn published(&self) -> u64;
}

/// In-memory request queue.
///
/// Uses a bounded `tokio::sync::mpsc` channel for multi-producer,
/// single-consumer semantics. Cheap to clone; clones share the channel and
/// the counter.
#[derive(Clone)]
pub struct RequestQueue {
    sender: mpsc::Sender<PendingEntry>,
    published: Arc<AtomicU64>,
    capacity: usize,
}

impl RequestQueue {
    /// Create a queue with default capacity.
    #[must_use]
    pub fn new() -> (Self, RequestReceiver) {
        Self::with_capacity(DEFAULT_QUEUE_CAPACITY)
    }

    /// Create a queue with the given capacity (at least 1).
    #[must_use]
    pub fn with_capacity(capacity: usize) -> (Self, RequestReceiver) {
        let capacity = capacity.max(1);
        let (sender, receiver) = mpsc::channel(capacity);
        let queue = Self {
            sender,
            published: Arc::new(AtomicU64::new(0)),
            capacity,
        };
        (queue, RequestReceiver { receiver })
    }

    /// Publish without waiting for space.
    pub fn try_publish(&self, entry: PendingEntry) -> Result<(), QueueError> {
        let id = entry.pending_channel_id();
        match self.sender.try_send(entry) {
            Ok(()) => {
                self.published.fetch_add(1, Ordering::Relaxed);
                debug!(pending_chan_id = %id, "Request queued");
                Ok(())
            }
            Err(mpsc::error::TrySendError::Full(_)) => Err(QueueError::Full),
            Err(mpsc::error::TrySendError::Closed(_)) => {
                warn!(pending_chan_id = %id, "Request dropped (queue closed)");
                Err(QueueError::Closed)
            }
        }
    }

    /// Whether the consuming side is gone.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Number of entries currently buffered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.capacity - self.sender.capacity()
    }

    /// Whether no entries are buffered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get the channel capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[async_trait]
impl RequestPublisher for RequestQueue {
    async fn publish(&self, entry: PendingEntry) -> Result<(), QueueError> {
        let id = entry.pending_channel_id();

        match self.sender.send(entry).await {
            Ok(()) => {
                self.published.fetch_add(1, Ordering::Relaxed);
                debug!(pending_chan_id = %id, "Request queued");
                Ok(())
            }
            Err(_) => {
                warn!(pending_chan_id = %id, "Request dropped (queue closed)");
                Err(QueueError::Closed)
            }
        }
    }

    fn published(&self) -> u64 {
        self.published.load(Ordering::Relaxed)
    }
}

/// Consuming side of the request queue, owned by the decision channel.
///
/// Dropping it closes the queue; later publishes fail with `Closed` and
/// buffered entries are dropped, which their callers observe.
pub struct RequestReceiver {
    receiver: mpsc::Receiver<PendingEntry>,
}

impl RequestReceiver {
    /// Receive the next entry.
    ///
    /// # Returns
    ///
    /// - `Some(entry)` - The next published entry
    /// - `None` - Every publisher is gone
    pub async fn recv(&mut self) -> Option<PendingEntry> {
        self.receiver.recv().await
    }

    /// Try to receive the next entry without blocking.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(entry))` - An entry was available
    /// - `Ok(None)` - Nothing queued right now
    /// - `Err(QueueError::Closed)` - Every publisher is gone
    pub fn try_recv(&mut self) -> Result<Option<PendingEntry>, QueueError> {
        match self.receiver.try_recv() {
            Ok(entry) => Ok(Some(entry)),
            Err(mpsc::error::TryRecvError::Empty) => Ok(None),
            Err(mpsc::error::TryRecvError::Disconnected) => Err(QueueError::Closed),
        }
    }

    /// Stop accepting new entries while still draining buffered ones.
    pub fn close(&mut self) {
        self.receiver.close();
    }

    /// Adapt into a `Stream` of entries.
    #[must_use]
    pub fn into_stream(self) -> RequestStream {
        RequestStream { inner: self }
    }
}

/// A stream wrapper for the request receiver.
///
/// Implements `tokio_stream::Stream` for use with stream combinators.
pub struct RequestStream {
    inner: RequestReceiver,
}

impl RequestStream {
    /// Recover the underlying receiver.
    #[must_use]
    pub fn into_inner(self) -> RequestReceiver {
        self.inner
    }
}

impl Stream for RequestStream {
    type Item = PendingEntry;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.receiver.poll_recv(cx)
    }
}
