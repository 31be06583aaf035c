//! # Acceptor Bus - Conduits Between Callers and the Decision Channel
//!
//! ## Shape
//!
//! ```text
//! ┌──────────┐  publish(PendingEntry)  ┌───────────────┐  recv()  ┌──────────────────┐
//! │ caller 1 │ ──────┐                 │               │ ───────→ │ external decision│
//! │ caller 2 │ ──────┼───────────────→ │ RequestQueue  │          │ channel          │
//! │ caller N │ ──────┘                 │ (mpsc, bound) │          │                  │
//! └──────────┘                         └───────────────┘          └──────────────────┘
//!      ↑                                                                   │
//!      └──────────── ReplySink (oneshot, one per entry) ───────────────────┘
//! ```
//!
//! - The request queue is the only shared resource.
//! - Each `PendingEntry` owns a private single-slot reply conduit, so a
//!   verdict can only reach the caller that created the entry.
//! - `ShutdownSignal` is a broadcast-once flag every waiter selects on.

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod entry;
pub mod queue;
pub mod shutdown;

// Re-export main types
pub use entry::{PendingEntry, ReplyReceiver, ReplySink};
pub use queue::{QueueError, RequestPublisher, RequestQueue, RequestReceiver, RequestStream};
pub use shutdown::{ShutdownListener, ShutdownSignal};

/// Maximum entries buffered before publishers suspend.
pub const DEFAULT_QUEUE_CAPACITY: usize = 64;
