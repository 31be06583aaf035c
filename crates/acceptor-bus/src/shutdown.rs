//! # Shutdown Signal
//!
//! One-shot broadcast over `tokio::sync::watch`. Once raised it stays raised:
//! every waiter wakes, and every listener created afterwards observes it
//! immediately.

use std::sync::Arc;
use tokio::sync::watch;
use tracing::info;

/// Process-wide shutdown signal. Cheap to clone; clones share state.
#[derive(Clone, Debug)]
pub struct ShutdownSignal {
    sender: Arc<watch::Sender<bool>>,
}

impl ShutdownSignal {
    /// Create a signal in the lowered state.
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = watch::channel(false);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Raise the signal.
    ///
    /// Idempotent: returns `true` only for the call that raised it.
    pub fn trigger(&self) -> bool {
        let raised = self.sender.send_if_modified(|state| {
            if *state {
                false
            } else {
                *state = true;
                true
            }
        });
        if raised {
            info!(waiters = self.sender.receiver_count(), "Shutdown signal raised");
        }
        raised
    }

    /// Whether the signal has been raised.
    #[must_use]
    pub fn is_triggered(&self) -> bool {
        *self.sender.borrow()
    }

    /// Create a listener that can be awaited.
    #[must_use]
    pub fn listener(&self) -> ShutdownListener {
        ShutdownListener {
            receiver: self.sender.subscribe(),
        }
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// Waiting side of a `ShutdownSignal`.
#[derive(Clone, Debug)]
pub struct ShutdownListener {
    receiver: watch::Receiver<bool>,
}

impl ShutdownListener {
    /// Resolve once the signal is raised.
    ///
    /// Returns immediately if it already was. Also resolves if every
    /// `ShutdownSignal` handle has been dropped, since nothing could lower
    /// or raise it any more.
    pub async fn recv(&mut self) {
        let _ = self.receiver.wait_for(|raised| *raised).await;
    }

    /// Whether the signal has been raised.
    #[must_use]
    pub fn is_triggered(&self) -> bool {
        *self.receiver.borrow()
    }
}
