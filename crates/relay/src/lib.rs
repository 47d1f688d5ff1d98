//! The status relay: publisher and consumer halves.
//!
//! [`StatusPublisher`] turns one upstream run subscription into a framed
//! SSE byte stream for one client connection. [`StatusConsumer`] decodes
//! such a stream incrementally and drives a [`RunState`] — one atomic
//! update per event, terminal states applied exactly once.

pub mod consumer;
pub mod publisher;
pub mod state;

pub use consumer::StatusConsumer;
pub use publisher::{RelayStream, StatusPublisher};
pub use state::{RunPhase, RunState};
