//! Test support: a backend whose update feed is driven by the test.
//!
//! [`ScriptedBackend`] lets a test inject an exact upstream sequence —
//! including item-level errors, a feed that never terminates (keep the
//! sender alive), or end-of-feed without a terminal status (drop the
//! sender).

use async_trait::async_trait;
use runbeam_core::JobHandle;
use tokio::sync::{mpsc, Mutex};
use tokio_stream::wrappers::UnboundedReceiverStream;

use crate::backend::{JobBackend, UpdateStream, UpstreamError};
use crate::record::RunUpdate;

/// Run id every scripted run is triggered as.
pub const SCRIPTED_RUN_ID: &str = "run_scripted";

/// Sender half handed to the test for driving the update feed.
pub type ScriptSender = mpsc::UnboundedSender<Result<RunUpdate, UpstreamError>>;

/// Channel-driven [`JobBackend`] double.
pub struct ScriptedBackend {
    fail_trigger: bool,
    updates: Mutex<Option<mpsc::UnboundedReceiver<Result<RunUpdate, UpstreamError>>>>,
}

impl ScriptedBackend {
    /// A backend whose single run's feed is fed through the returned sender.
    pub fn new() -> (Self, ScriptSender) {
        let (tx, rx) = mpsc::unbounded_channel();
        let backend = Self {
            fail_trigger: false,
            updates: Mutex::new(Some(rx)),
        };
        (backend, tx)
    }

    /// A backend that rejects every trigger call.
    pub fn failing_trigger() -> Self {
        let (_, rx) = mpsc::unbounded_channel();
        Self {
            fail_trigger: true,
            updates: Mutex::new(Some(rx)),
        }
    }
}

#[async_trait]
impl JobBackend for ScriptedBackend {
    async fn trigger(
        &self,
        _task: &str,
        _payload: serde_json::Value,
    ) -> Result<JobHandle, UpstreamError> {
        if self.fail_trigger {
            return Err(UpstreamError::Trigger("injected trigger failure".into()));
        }
        JobHandle::parse(SCRIPTED_RUN_ID).map_err(|e| UpstreamError::Protocol(e.to_string()))
    }

    async fn subscribe(&self, handle: &JobHandle) -> Result<UpdateStream, UpstreamError> {
        if handle.as_str() != SCRIPTED_RUN_ID {
            return Err(UpstreamError::Subscription(format!(
                "unknown run id: {handle}"
            )));
        }

        let rx = self
            .updates
            .lock()
            .await
            .take()
            .ok_or_else(|| UpstreamError::Subscription("scripted feed already consumed".into()))?;

        Ok(Box::pin(UnboundedReceiverStream::new(rx)))
    }
}
