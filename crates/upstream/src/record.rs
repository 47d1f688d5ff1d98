use runbeam_core::RunStatus;
use serde::{Deserialize, Serialize};

/// One lifecycle update about a running job, as produced by the upstream
/// job-execution system.
///
/// `output` is a free-form JSON document; for the hello-world task it is
/// `{ "message": "Hello, <name>!" }`. `error` is only present on failed
/// runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunUpdate {
    pub status: RunStatus,
    #[serde(default)]
    pub output: Option<serde_json::Value>,
    #[serde(default)]
    pub error: Option<RunError>,
}

/// Error detail attached to a failed run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunError {
    pub message: String,
}

impl RunUpdate {
    pub fn new(status: RunStatus) -> Self {
        Self {
            status,
            output: None,
            error: None,
        }
    }

    pub fn with_output(mut self, output: serde_json::Value) -> Self {
        self.output = Some(output);
        self
    }

    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.error = Some(RunError {
            message: message.into(),
        });
        self
    }

    /// The `message` string inside `output`, if any.
    pub fn output_message(&self) -> Option<&str> {
        self.output.as_ref()?.get("message")?.as_str()
    }
}
