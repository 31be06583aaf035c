//! Outcome counters and mismatch diagnostics for the acceptor.

use acceptor_types::PendingChannelId;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant, SystemTime};

use crate::domain::error::AcceptorError;

/// One observed identifier mismatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MismatchRecord {
    /// Identifier the caller sent.
    pub expected: PendingChannelId,
    /// Hex of the identifier the decision channel answered with.
    pub actual: String,
    /// When the mismatch was observed.
    pub observed_at: SystemTime,
}

/// Plain copy of the counters at one instant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub requested: u64,
    pub accepted: u64,
    pub rejected: u64,
    pub timeouts: u64,
    pub mismatches: u64,
    pub shutdowns: u64,
    pub dropped: u64,
    pub cancelled: u64,
    pub in_flight: u64,
}

impl StatsSnapshot {
    /// Calls that have returned, whatever the outcome.
    pub fn resolved(&self) -> u64 {
        self.accepted
            + self.rejected
            + self.timeouts
            + self.mismatches
            + self.shutdowns
            + self.dropped
            + self.cancelled
    }
}

/// Statistics for the acceptor
#[derive(Debug)]
pub struct AcceptorStats {
    /// Total accept calls started
    pub total_requested: AtomicU64,
    /// Calls that ended in acceptance
    pub total_accepted: AtomicU64,
    /// Calls that ended in a legitimate rejection
    pub total_rejected: AtomicU64,
    /// Calls that hit the deadline
    pub total_timeouts: AtomicU64,
    /// Calls answered with a foreign identifier
    pub total_mismatches: AtomicU64,
    /// Calls cut short by shutdown
    pub total_shutdowns: AtomicU64,
    /// Calls whose request was lost by the decision channel
    pub total_dropped: AtomicU64,
    /// Calls whose caller stopped polling before an outcome
    pub total_cancelled: AtomicU64,
    /// Calls currently waiting
    pub in_flight: AtomicU64,
    /// Bounded history of recent mismatches
    recent_mismatches: Mutex<VecDeque<MismatchRecord>>,
    mismatch_history: usize,
}

impl AcceptorStats {
    pub fn new(mismatch_history: usize) -> Self {
        Self {
            total_requested: AtomicU64::new(0),
            total_accepted: AtomicU64::new(0),
            total_rejected: AtomicU64::new(0),
            total_timeouts: AtomicU64::new(0),
            total_mismatches: AtomicU64::new(0),
            total_shutdowns: AtomicU64::new(0),
            total_dropped: AtomicU64::new(0),
            total_cancelled: AtomicU64::new(0),
            in_flight: AtomicU64::new(0),
            recent_mismatches: Mutex::new(VecDeque::with_capacity(mismatch_history)),
            mismatch_history,
        }
    }

    /// Record the start of a call.
    pub(crate) fn record_start(&self) {
        self.total_requested.fetch_add(1, Ordering::Relaxed);
        self.in_flight.fetch_add(1, Ordering::Relaxed);
    }

    /// Start tracking a call. Dropping the tracker without `finish` records
    /// the call as cancelled.
    pub(crate) fn track(&self) -> CallTracker<'_> {
        self.record_start();
        CallTracker {
            stats: self,
            started: Instant::now(),
            finished: false,
        }
    }

    fn record_cancelled(&self, elapsed: Duration) {
        self.in_flight.fetch_sub(1, Ordering::Relaxed);
        self.total_cancelled.fetch_add(1, Ordering::Relaxed);
        crate::metrics::record_cancelled(elapsed);
    }

    /// Record how a call ended.
    pub(crate) fn record_outcome(&self, outcome: &Result<(), AcceptorError>, elapsed: Duration) {
        self.in_flight.fetch_sub(1, Ordering::Relaxed);

        let counter = match outcome {
            Ok(()) => &self.total_accepted,
            Err(AcceptorError::Rejected { .. }) => &self.total_rejected,
            Err(AcceptorError::Timeout { .. }) => &self.total_timeouts,
            Err(AcceptorError::IdentifierMismatch { expected, actual }) => {
                self.push_mismatch(*expected, actual.clone());
                &self.total_mismatches
            }
            Err(AcceptorError::ShuttingDown) => &self.total_shutdowns,
            Err(AcceptorError::QueueClosed | AcceptorError::ReplyDropped) => &self.total_dropped,
        };
        counter.fetch_add(1, Ordering::Relaxed);

        crate::metrics::record_outcome(outcome, elapsed);
    }

    fn push_mismatch(&self, expected: PendingChannelId, actual: String) {
        if self.mismatch_history == 0 {
            return;
        }
        let mut recent = self.recent_mismatches.lock();
        if recent.len() == self.mismatch_history {
            recent.pop_front();
        }
        recent.push_back(MismatchRecord {
            expected,
            actual,
            observed_at: SystemTime::now(),
        });
    }

    /// Most recent mismatches, oldest first.
    pub fn recent_mismatches(&self) -> Vec<MismatchRecord> {
        self.recent_mismatches.lock().iter().cloned().collect()
    }

    /// Copy all counters.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            requested: self.total_requested.load(Ordering::Relaxed),
            accepted: self.total_accepted.load(Ordering::Relaxed),
            rejected: self.total_rejected.load(Ordering::Relaxed),
            timeouts: self.total_timeouts.load(Ordering::Relaxed),
            mismatches: self.total_mismatches.load(Ordering::Relaxed),
            shutdowns: self.total_shutdowns.load(Ordering::Relaxed),
            dropped: self.total_dropped.load(Ordering::Relaxed),
            cancelled: self.total_cancelled.load(Ordering::Relaxed),
            in_flight: self.in_flight.load(Ordering::Relaxed),
        }
    }
}

/// One call between `AcceptorStats::track` and its outcome.
pub(crate) struct CallTracker<'a> {
    stats: &'a AcceptorStats,
    started: Instant,
    finished: bool,
}

impl CallTracker<'_> {
    /// Record the outcome. Returns the time the call took.
    pub(crate) fn finish(mut self, outcome: &Result<(), AcceptorError>) -> Duration {
        self.finished = true;
        let elapsed = self.started.elapsed();
        self.stats.record_outcome(outcome, elapsed);
        elapsed
    }
}

impl Drop for CallTracker<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.stats.record_cancelled(self.started.elapsed());
        }
    }
}

impl Default for AcceptorStats {
    fn default() -> Self {
        Self::new(crate::domain::config::DEFAULT_MISMATCH_HISTORY)
    }
}
