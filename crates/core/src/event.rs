//! The relayed status event.
//!
//! One [`StatusEvent`] is created per upstream record, serialized once,
//! transmitted once, and has no existence beyond the wire — there is no
//! server-side retention.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::status::RunStatus;
use crate::types::Timestamp;

/// One lifecycle update as delivered to the consumer.
///
/// `message` is only meaningfully present on `COMPLETED`; `error` only on
/// `FAILED` and the synthetic `ERROR`. Absent options serialize as explicit
/// `null`, matching the reference wire frames.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusEvent {
    pub status: RunStatus,
    pub message: Option<String>,
    pub error: Option<String>,
    /// Relay-assigned wall-clock time of forwarding, not upstream event
    /// time (the upstream does not guarantee one).
    pub timestamp: Timestamp,
}

impl StatusEvent {
    /// Create a new event with the given status and the current time.
    pub fn new(status: RunStatus) -> Self {
        Self {
            status,
            message: None,
            error: None,
            timestamp: Utc::now(),
        }
    }

    /// Attach a completion message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Attach an error description.
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    /// The synthetic terminal event emitted when the upstream subscription
    /// breaks. Always carries a non-empty error message.
    pub fn synthetic_error(error: impl Into<String>) -> Self {
        let mut error = error.into();
        if error.is_empty() {
            error = "unknown upstream failure".to_string();
        }
        Self::new(RunStatus::Error).with_error(error)
    }

    /// Whether this event ends the stream.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}
