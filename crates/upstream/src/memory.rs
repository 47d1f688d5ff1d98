//! In-process backend for running without a remote job service.
//!
//! [`LocalBackend`] executes the hello-world task itself: a triggered run
//! reports `TRIGGERED`, then `EXECUTING`, then — after a configurable delay
//! — `COMPLETED` with `{ "message": "Hello, <payload>!" }`. Useful for
//! local development and as the default when no upstream credentials are
//! configured.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use runbeam_core::{JobHandle, RunStatus};
use tokio::sync::{mpsc, Mutex};
use tokio_stream::wrappers::ReceiverStream;

use crate::backend::{JobBackend, UpdateStream, UpstreamError};
use crate::record::RunUpdate;

/// Default time a local run spends in `EXECUTING`.
const DEFAULT_RUN_DELAY: Duration = Duration::from_secs(5);

/// In-process hello-world job runner.
pub struct LocalBackend {
    run_delay: Duration,
    /// Payloads of triggered runs, keyed by run id.
    runs: Mutex<HashMap<String, serde_json::Value>>,
}

impl LocalBackend {
    pub fn new() -> Self {
        Self::with_delay(DEFAULT_RUN_DELAY)
    }

    /// A backend whose runs complete after `run_delay`. Tests use a zero
    /// delay.
    pub fn with_delay(run_delay: Duration) -> Self {
        Self {
            run_delay,
            runs: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for LocalBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl JobBackend for LocalBackend {
    async fn trigger(
        &self,
        task: &str,
        payload: serde_json::Value,
    ) -> Result<JobHandle, UpstreamError> {
        let run_id = format!("run_{}", uuid::Uuid::new_v4().simple());
        self.runs.lock().await.insert(run_id.clone(), payload);

        tracing::info!(task, run_id = %run_id, "Local run triggered");

        JobHandle::parse(run_id).map_err(|e| UpstreamError::Protocol(e.to_string()))
    }

    async fn subscribe(&self, handle: &JobHandle) -> Result<UpdateStream, UpstreamError> {
        let payload = self
            .runs
            .lock()
            .await
            .get(handle.as_str())
            .cloned()
            .ok_or_else(|| UpstreamError::Subscription(format!("unknown run id: {handle}")))?;

        let run_delay = self.run_delay;
        let (tx, rx) = mpsc::channel(4);

        tokio::spawn(async move {
            for status in [RunStatus::Triggered, RunStatus::Executing] {
                if tx.send(Ok(RunUpdate::new(status))).await.is_err() {
                    return;
                }
            }

            tokio::time::sleep(run_delay).await;

            let completed = RunUpdate::new(RunStatus::Completed)
                .with_output(serde_json::json!({ "message": greeting_for(&payload) }));
            let _ = tx.send(Ok(completed)).await;
        });

        Ok(Box::pin(ReceiverStream::new(rx)))
    }
}

/// The hello-world task output for a payload.
///
/// String payloads greet the string itself; anything else greets its JSON
/// rendering.
fn greeting_for(payload: &serde_json::Value) -> String {
    match payload.as_str() {
        Some(name) => format!("Hello, {name}!"),
        None => format!("Hello, {payload}!"),
    }
}
