//! Finite State Machine for one deploy attempt

use serde::{Deserialize, Serialize};

/// Attempt state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttemptState {
    /// Nothing submitted yet, or the last attempt was cleared
    Idle,

    /// Deploy request in flight
    Submitting,

    /// Accepted; waiting on the background build
    Polling,

    /// Result received
    Complete,

    /// Submission failed
    Error,
}

impl AttemptState {
    /// Complete and Error end an attempt
    pub fn is_terminal(&self) -> bool {
        matches!(self, AttemptState::Complete | AttemptState::Error)
    }

    /// Submitting and Polling still have work outstanding
    pub fn is_in_flight(&self) -> bool {
        matches!(self, AttemptState::Submitting | AttemptState::Polling)
    }
}

/// Attempt event
#[derive(Debug, Clone)]
pub enum AttemptEvent {
    /// A fresh submission starts
    Submit,

    /// Service accepted the request for background processing
    Accepted,

    /// A terminal result arrived
    Completed,

    /// Submission failed
    Failed(String),

    /// User cleared the form
    Reset,
}

/// Attempt FSM
#[derive(Debug, Clone)]
pub struct AttemptFsm {
    state: AttemptState,
    error: Option<String>,
}

impl AttemptFsm {
    /// Create a new FSM in idle state
    pub fn new() -> Self {
        Self {
            state: AttemptState::Idle,
            error: None,
        }
    }

    /// Get current state
    pub fn state(&self) -> &AttemptState {
        &self.state
    }

    /// Get error message if any
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Process an event and transition state
    pub fn process(&mut self, event: AttemptEvent) -> Result<(), String> {
        let new_state = match (&self.state, &event) {
            // A new submission supersedes whatever came before
            (_, AttemptEvent::Submit) => {
                self.error = None;
                AttemptState::Submitting
            }

            // From Submitting
            (AttemptState::Submitting, AttemptEvent::Accepted) => AttemptState::Polling,
            (AttemptState::Submitting, AttemptEvent::Completed) => AttemptState::Complete,
            (AttemptState::Submitting, AttemptEvent::Failed(err)) => {
                self.error = Some(err.clone());
                AttemptState::Error
            }

            // From Polling
            (AttemptState::Polling, AttemptEvent::Completed) => AttemptState::Complete,

            // Reset clears finished attempts only
            (AttemptState::Idle | AttemptState::Complete | AttemptState::Error, AttemptEvent::Reset) => {
                self.error = None;
                AttemptState::Idle
            }
            (state @ (AttemptState::Submitting | AttemptState::Polling), AttemptEvent::Reset) => {
                state.clone()
            }

            // Invalid transitions
            (state, event) => {
                return Err(format!("Invalid transition: {:?} -> {:?}", state, event));
            }
        };

        self.state = new_state;
        Ok(())
    }
}

impl Default for AttemptFsm {
    fn default() -> Self {
        Self::new()
    }
}
