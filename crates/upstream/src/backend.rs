use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;
use runbeam_core::JobHandle;

use crate::record::RunUpdate;

/// A lazy, potentially-unbounded sequence of upstream status records.
///
/// Push-driven from the upstream — the stream may suspend indefinitely
/// between records. It ends when the upstream closes the run feed or an
/// item-level error is yielded.
pub type UpdateStream = Pin<Box<dyn Stream<Item = Result<RunUpdate, UpstreamError>> + Send>>;

/// Port to the external job-execution system.
///
/// Implementations must not share subscription state between calls: every
/// `subscribe` opens an independent feed for the given handle.
#[async_trait]
pub trait JobBackend: Send + Sync {
    /// Trigger a new run of `task` with the given payload, returning the
    /// handle that addresses its status feed.
    async fn trigger(
        &self,
        task: &str,
        payload: serde_json::Value,
    ) -> Result<JobHandle, UpstreamError>;

    /// Open a status subscription for a previously triggered run.
    async fn subscribe(&self, handle: &JobHandle) -> Result<UpdateStream, UpstreamError>;
}

/// Errors from the upstream job system.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    /// The job system rejected the trigger call.
    #[error("Trigger rejected: {0}")]
    Trigger(String),

    /// Failed to reach the job system or the connection dropped.
    #[error("Connection error: {0}")]
    Connection(String),

    /// The job system sent something we could not interpret.
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// No subscription can be opened for the given handle.
    #[error("Unknown subscription: {0}")]
    Subscription(String),
}
