//! Decision channel adapters.
//!
//! Consumers of the request queue that produce verdicts: an in-process
//! policy and a bridge to a remote decider over a duplex stream.

pub mod responder;
pub mod stream;

pub use responder::PolicyResponder;
pub use stream::{BridgeExit, DeciderStream, StreamBridge, DEFAULT_STREAM_BUFFER, DUPLICATE_ID_REASON};
