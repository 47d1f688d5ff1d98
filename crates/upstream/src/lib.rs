//! Upstream job system port and implementations.
//!
//! The relay talks to the external job-execution system through the
//! [`JobBackend`] trait: trigger a job, get a [`JobHandle`]; subscribe to a
//! handle, get a lazy stream of [`RunUpdate`]s. Two implementations ship:
//!
//! - [`HttpBackend`] — a remote job service speaking JSON over HTTP with an
//!   SSE realtime feed.
//! - [`LocalBackend`] — an in-process hello-world player so the server runs
//!   with no remote service configured.
//!
//! [`testing::ScriptedBackend`] provides a channel-driven double for tests.
//!
//! [`JobHandle`]: runbeam_core::JobHandle

pub mod backend;
pub mod http;
pub mod memory;
pub mod record;
pub mod testing;

pub use backend::{JobBackend, UpdateStream, UpstreamError};
pub use http::HttpBackend;
pub use memory::LocalBackend;
pub use record::{RunError, RunUpdate};
