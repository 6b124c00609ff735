//! Synchronization phase tracking
//!
//! A small state machine that only allows the transitions a clone-or-update
//! run can legitimately make, and logs each one.

use std::fmt::Debug;

use crate::error::{Error, Result};

/// Steps of a synchronization run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    /// Nothing done yet
    Start,
    /// Fresh clone created
    Cloned,
    /// Existing working copy cleaned up (possibly a no-op)
    Cleaned,
    /// Remote history pulled
    Pulled,
    /// Working copy updated to the pulled history
    Updated,
    /// Working copy switched to the requested revision
    Switched,
    /// Finished successfully
    Done,
    /// Aborted by a failing step
    Failed,
}

impl SyncPhase {
    /// Whether no further transitions are possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, SyncPhase::Done | SyncPhase::Failed)
    }

    /// State machine with every transition a run may take
    pub fn machine() -> StateMachine<SyncPhase> {
        use SyncPhase::*;

        StateMachine::new(Start).add_transitions(vec![
            (Start, Cloned),
            (Start, Cleaned),
            // Nothing to clone, or update disabled
            (Start, Done),
            (Cloned, Switched),
            (Cloned, Done),
            (Cleaned, Pulled),
            // Already at the requested changeset
            (Cleaned, Switched),
            (Pulled, Updated),
            (Updated, Switched),
            (Switched, Done),
        ])
    }
}

/// A basic transition-validated state machine
#[derive(Debug, Clone)]
pub struct StateMachine<P: Clone + PartialEq + Debug> {
    current_phase: P,
    valid_transitions: Vec<(P, P)>,
}

impl<P: Clone + PartialEq + Debug> StateMachine<P> {
    /// Create a new state machine with the given initial phase
    pub fn new(initial_phase: P) -> Self {
        Self {
            current_phase: initial_phase,
            valid_transitions: Vec::new(),
        }
    }

    /// Add multiple valid transitions
    pub fn add_transitions(mut self, transitions: Vec<(P, P)>) -> Self {
        self.valid_transitions.extend(transitions);
        self
    }

    /// Get the current phase
    pub fn current_phase(&self) -> &P {
        &self.current_phase
    }

    /// Check if a transition to the given phase is valid
    pub fn can_transition_to(&self, phase: &P) -> bool {
        self.valid_transitions
            .iter()
            .any(|(f, t)| f == &self.current_phase && t == phase)
    }

    /// Attempt to transition to a new phase
    pub fn transition_to(&mut self, phase: P) -> Result<()> {
        if !self.can_transition_to(&phase) {
            return Err(Error::Other(format!(
                "Invalid transition from {:?} to {:?}",
                self.current_phase, phase
            )));
        }

        tracing::debug!(
            from = ?self.current_phase,
            to = ?phase,
            "Sync phase transition"
        );

        self.current_phase = phase;
        Ok(())
    }

    /// Move to `phase` unconditionally, used for aborts
    pub fn force_phase(&mut self, phase: P) {
        tracing::debug!(from = ?self.current_phase, to = ?phase, "Sync phase forced");
        self.current_phase = phase;
    }
}
