//! Request handlers for the relay's HTTP surface.
//!
//! Handlers are thin glue: they delegate triggering to the configured
//! [`JobBackend`](runbeam_upstream::JobBackend) and streaming to the
//! [`StatusPublisher`](runbeam_relay::StatusPublisher), mapping errors via
//! [`AppError`](crate::error::AppError).

pub mod runs;
pub mod webhook;
