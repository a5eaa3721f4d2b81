// Flow state module
//
// Per-cycle state for the confirm/configure flow. Each cycle owns its own
// FlowState, so the selected directory never lives in shared mutable state.

use camino::{Utf8Path, Utf8PathBuf};
use thiserror::Error;

/// Phases of one confirm/configure cycle
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlowPhase {
    /// Default request confirmation is about to fire
    Idle,

    /// Default issuance suppressed, directory picker open
    AwaitingPick,

    /// Picker settled, with a directory or a cancellation
    PickedOrCancelled,

    /// Parameters injected, pre-render result embedded
    RequestConfigured,

    /// Handed to the request bridge; terminal for this cycle
    RequestSent,
}

impl FlowPhase {
    /// The only phase this one may advance to
    pub fn next(self) -> Option<FlowPhase> {
        match self {
            FlowPhase::Idle => Some(FlowPhase::AwaitingPick),
            FlowPhase::AwaitingPick => Some(FlowPhase::PickedOrCancelled),
            FlowPhase::PickedOrCancelled => Some(FlowPhase::RequestConfigured),
            FlowPhase::RequestConfigured => Some(FlowPhase::RequestSent),
            FlowPhase::RequestSent => None,
        }
    }
}

/// Rejected phase change
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid flow transition from {from:?} to {to:?}")]
pub struct InvalidTransition {
    pub from: FlowPhase,
    pub to: FlowPhase,
}

/// A phase change that was applied
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PhaseChange {
    pub from: FlowPhase,
    pub to: FlowPhase,
}

/// State of a single confirm/configure cycle
///
/// Transitions are strictly linear; see [`FlowPhase::next`]. The selected
/// path is only settable while leaving [`FlowPhase::AwaitingPick`].
#[derive(Clone, Debug)]
pub struct FlowState {
    phase: FlowPhase,
    selected_path: Option<Utf8PathBuf>,
    history: Vec<PhaseChange>,
}

impl FlowState {
    pub fn new() -> Self {
        Self {
            phase: FlowPhase::Idle,
            selected_path: None,
            history: Vec::new(),
        }
    }

    pub fn phase(&self) -> FlowPhase {
        self.phase
    }

    /// Directory picked in this cycle, if any
    pub fn selected_path(&self) -> Option<&Utf8Path> {
        self.selected_path.as_deref()
    }

    /// Applied transitions, oldest first
    pub fn history(&self) -> &[PhaseChange] {
        &self.history
    }

    /// Move to `to` if it directly follows the current phase
    pub fn advance(&mut self, to: FlowPhase) -> Result<PhaseChange, InvalidTransition> {
        let from = self.phase;
        if from.next() != Some(to) {
            return Err(InvalidTransition { from, to });
        }

        self.phase = to;
        let change = PhaseChange { from, to };
        self.history.push(change);
        tracing::debug!("Flow phase {:?} -> {:?}", from, to);
        Ok(change)
    }

    /// Record the picker's result and enter [`FlowPhase::PickedOrCancelled`]
    pub fn settle_pick(
        &mut self,
        picked: Option<Utf8PathBuf>,
    ) -> Result<PhaseChange, InvalidTransition> {
        let change = self.advance(FlowPhase::PickedOrCancelled)?;
        self.selected_path = picked;
        Ok(change)
    }
}

impl Default for FlowState {
    fn default() -> Self {
        Self::new()
    }
}
