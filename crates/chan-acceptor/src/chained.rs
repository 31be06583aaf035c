//! Chained acceptor - every registered acceptor must agree.
//!
//! Acceptors are consulted in registration order. The first failure is
//! returned as-is and later acceptors are not consulted. An empty chain
//! accepts everything.

use crate::domain::AcceptorResult;
use crate::ports::inbound::ChannelAcceptor;
use acceptor_types::ChannelAcceptRequest;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Composite acceptor.
#[derive(Default)]
pub struct ChainedAcceptor {
    acceptors: RwLock<BTreeMap<u64, Arc<dyn ChannelAcceptor>>>,
    next_id: AtomicU64,
}

impl ChainedAcceptor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an acceptor. Returns the handle for `remove_acceptor`.
    pub fn add_acceptor(&self, acceptor: Arc<dyn ChannelAcceptor>) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.acceptors.write().insert(id, acceptor);
        debug!(acceptor_id = id, "Acceptor added to chain");
        id
    }

    /// Unregister an acceptor. Returns `false` for an unknown handle.
    pub fn remove_acceptor(&self, id: u64) -> bool {
        let removed = self.acceptors.write().remove(&id).is_some();
        if removed {
            debug!(acceptor_id = id, "Acceptor removed from chain");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.acceptors.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.acceptors.read().is_empty()
    }

    fn snapshot(&self) -> Vec<Arc<dyn ChannelAcceptor>> {
        self.acceptors.read().values().cloned().collect()
    }
}

#[async_trait]
impl ChannelAcceptor for ChainedAcceptor {
    async fn accept(&self, request: ChannelAcceptRequest) -> AcceptorResult<()> {
        // Lock is not held across awaits; membership changes apply to the next call.
        for acceptor in self.snapshot() {
            acceptor.accept(request.clone()).await?;
        }
        Ok(())
    }
}
