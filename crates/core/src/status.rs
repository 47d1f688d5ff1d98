//! Run lifecycle status vocabulary.
//!
//! The relay recognises the four lifecycle statuses plus the reserved
//! synthetic `ERROR` it emits itself. Anything else the upstream reports is
//! carried through verbatim as [`RunStatus::Other`] — an unrecognised value
//! is never a decode failure.

use std::fmt;

use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

/// Status of one run as carried on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunStatus {
    /// The job was accepted by the upstream system.
    Triggered,
    /// The job is currently executing.
    Executing,
    /// The job finished successfully. Terminal.
    Completed,
    /// The job finished with an error. Terminal.
    Failed,
    /// Synthetic status emitted by the relay itself when the upstream
    /// subscription breaks. Terminal. Never reported by the upstream.
    Error,
    /// Any status string the relay does not recognise, preserved verbatim.
    Other(String),
}

impl RunStatus {
    /// Wire representation of this status.
    pub fn as_str(&self) -> &str {
        match self {
            RunStatus::Triggered => "TRIGGERED",
            RunStatus::Executing => "EXECUTING",
            RunStatus::Completed => "COMPLETED",
            RunStatus::Failed => "FAILED",
            RunStatus::Error => "ERROR",
            RunStatus::Other(raw) => raw,
        }
    }

    /// Whether no further status can follow this one.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RunStatus::Completed | RunStatus::Failed | RunStatus::Error
        )
    }
}

impl From<&str> for RunStatus {
    fn from(raw: &str) -> Self {
        match raw {
            "TRIGGERED" => RunStatus::Triggered,
            "EXECUTING" => RunStatus::Executing,
            "COMPLETED" => RunStatus::Completed,
            "FAILED" => RunStatus::Failed,
            "ERROR" => RunStatus::Error,
            other => RunStatus::Other(other.to_string()),
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for RunStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for RunStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(RunStatus::from(raw.as_str()))
    }
}
