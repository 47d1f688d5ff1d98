//! Consumer-observed run state.
//!
//! [`RunState`] is the explicit state struct the consumer drives — one
//! reducer call per decoded event, applied atomically (status, message and
//! error together). Terminal phases are absorbing.

use runbeam_core::{RunStatus, StatusEvent};

/// Phase of the consumer state machine.
///
/// `Errored` marks a broken relay (transport failure, incomplete stream or
/// a synthetic `ERROR` frame) and is always distinct from `Failed`, which
/// is a real job outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    /// Nothing triggered yet.
    Initial,
    /// The trigger call succeeded, or a `TRIGGERED` event arrived.
    Triggered,
    /// An `EXECUTING` event arrived.
    Executing,
    /// Terminal: the job completed.
    Completed,
    /// Terminal: the job failed.
    Failed,
    /// Terminal: the relay broke before a job outcome was known.
    Errored,
}

impl RunPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RunPhase::Completed | RunPhase::Failed | RunPhase::Errored
        )
    }
}

/// Application-side view of one run, updated by the consumer.
#[derive(Debug, Clone, PartialEq)]
pub struct RunState {
    pub phase: RunPhase,
    /// Last status received on the wire, including pass-through values the
    /// phase machine does not model.
    pub status: Option<RunStatus>,
    pub message: Option<String>,
    pub error: Option<String>,
}

impl RunState {
    pub fn new() -> Self {
        Self {
            phase: RunPhase::Initial,
            status: None,
            message: None,
            error: None,
        }
    }

    /// Record a successful trigger call (the `INITIAL → TRIGGERED` edge).
    pub fn mark_triggered(&mut self) {
        if self.phase == RunPhase::Initial {
            self.phase = RunPhase::Triggered;
        }
    }

    /// Apply one decoded event.
    ///
    /// No-op once terminal. The lifecycle never regresses: a `TRIGGERED`
    /// event observed while already `Executing` leaves the phase alone.
    /// Unrecognised statuses update `status` without moving the phase.
    pub fn apply(&mut self, event: &StatusEvent) {
        if self.phase.is_terminal() {
            return;
        }

        match &event.status {
            RunStatus::Triggered => {
                if self.phase == RunPhase::Initial {
                    self.phase = RunPhase::Triggered;
                }
            }
            RunStatus::Executing => self.phase = RunPhase::Executing,
            RunStatus::Completed => self.phase = RunPhase::Completed,
            RunStatus::Failed => self.phase = RunPhase::Failed,
            RunStatus::Error => self.phase = RunPhase::Errored,
            RunStatus::Other(_) => {}
        }

        self.status = Some(event.status.clone());
        if let Some(message) = &event.message {
            self.message = Some(message.clone());
        }
        if let Some(error) = &event.error {
            self.error = Some(error.clone());
        }
    }

    /// Enter `Errored` because of a transport-level or incomplete-stream
    /// condition. No-op once terminal.
    pub fn fail(&mut self, error: impl Into<String>) {
        if self.phase.is_terminal() {
            return;
        }
        self.phase = RunPhase::Errored;
        self.error = Some(error.into());
    }

    pub fn is_terminal(&self) -> bool {
        self.phase.is_terminal()
    }
}

impl Default for RunState {
    fn default() -> Self {
        Self::new()
    }
}
