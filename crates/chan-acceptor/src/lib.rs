// Allow missing docs for internal items in development
#![allow(missing_docs)]

//! Chan Acceptor - blocking channel-accept calls answered by an asynchronous
//! decision channel.
//!
//! Many concurrent callers each ask "accept this channel?" and block until a
//! verdict arrives. Verdicts come from one external decision channel that
//! answers in whatever order it likes, tagging each answer with the pending
//! channel id of the request it belongs to.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                        RpcAcceptor                                │
//! │                                                                   │
//! │  accept(req) ──→ PendingEntry::new ──→ publish ──→ select {       │
//! │                   (oneshot reply)       (queue)     reply,        │
//! │                                                     deadline,     │
//! │                                                     shutdown }    │
//! └──────────────────────────────┬────────────────────────────────────┘
//!                                │ RequestQueue (mpsc)
//!                ┌───────────────┴────────────────┐
//!                ▼                                ▼
//!        PolicyResponder                    StreamBridge
//!     (in-process policy)           (remote decider, duplex stream)
//! ```
//!
//! # Outcomes
//!
//! - `Ok(())` - accepted
//! - `Rejected { reason }` - the decision channel said no
//! - `Timeout` - no verdict before `accept_timeout`
//! - `ShuttingDown` - shutdown was raised first
//! - `IdentifierMismatch` - the reply carried another request's id
//!
//! # Usage
//!
//! ```ignore
//! use chan_acceptor::{AcceptorConfig, ChannelAcceptor, FnPolicy, PolicyResponder, RpcAcceptor};
//!
//! let (acceptor, rx) = RpcAcceptor::with_queue(AcceptorConfig::default())?;
//! let policy = Arc::new(FnPolicy(|_req: &ChannelAcceptRequest| Verdict::Accept));
//! PolicyResponder::new(policy, rx, acceptor.shutdown_signal().listener()).spawn();
//!
//! acceptor.accept(request).await?;
//! ```

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod adapters;
pub mod chained;
pub mod domain;
pub mod metrics;
pub mod ports;
pub mod service;

// Re-exports for public API
pub use adapters::{BridgeExit, DeciderStream, PolicyResponder, StreamBridge};
pub use chained::ChainedAcceptor;
pub use domain::config::{AcceptorConfig, ConfigError, DEFAULT_ACCEPT_TIMEOUT};
pub use domain::error::{AcceptorError, AcceptorResult};
pub use domain::stats::{AcceptorStats, MismatchRecord, StatsSnapshot};
pub use ports::{ChannelAcceptor, DecisionPolicy, FnPolicy};
pub use service::RpcAcceptor;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
