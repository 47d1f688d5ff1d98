//! Shared building blocks for the runbeam relay.
//!
//! This crate holds everything both sides of the wire agree on:
//!
//! - [`JobHandle`] — the opaque identifier addressing one run.
//! - [`RunStatus`] — the run lifecycle vocabulary.
//! - [`StatusEvent`] — one relayed lifecycle update.
//! - [`wire`] — the SSE frame codec (encode on the publisher side,
//!   incremental decode on the consumer side).
//! - [`CoreError`] — the error taxonomy shared across the workspace.

pub mod error;
pub mod event;
pub mod status;
pub mod types;
pub mod wire;

pub use error::CoreError;
pub use event::StatusEvent;
pub use status::RunStatus;
pub use types::{JobHandle, Timestamp};
