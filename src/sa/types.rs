//! Core trait for annealing engines driven by the control loop.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::random::AnnealRng;

/// Lifecycle of an annealing run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnnealingStatus {
    /// Created, no evaluations performed yet.
    Uninitialized,
    /// Initialized and iterating.
    Initialized,
    /// Finished; further steps are rejected.
    Terminated,
}

/// Snapshot handed to external termination conditions once per outer step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    /// Temperature of the level about to run.
    pub temperature: f64,
    /// Temperature levels completed so far.
    pub steps: usize,
    /// Objective evaluations performed so far.
    pub evaluations: usize,
}

/// The move logic plugged into [`Annealer`](super::Annealer).
///
/// The control loop owns the temperature, the random stream and the
/// lifecycle; the engine owns the search state and decides, at a given
/// temperature, how the current point moves.
///
/// All calls are strictly sequential: `iterate` for one temperature level
/// completes before the loop cools and calls it again.
pub trait AnnealingEngine {
    /// What the engine publishes as its result.
    type Point: Clone;

    /// Serializable engine state captured in checkpoints.
    type State: Serialize + DeserializeOwned;

    /// Builds the initial search state.
    ///
    /// On error the engine must be left as it was before the call.
    fn initialize(&mut self, rng: &mut AnnealRng) -> Result<()>;

    /// Runs all moves of one temperature level.
    fn iterate(&mut self, temperature: f64, rng: &mut AnnealRng) -> Result<()>;

    /// Called once when the run terminates.
    fn terminate(&mut self) {}

    /// The current search point, if initialized.
    fn current(&self) -> Option<&Self::Point>;

    /// The published result. By default the singleton set holding the
    /// current point.
    fn result(&self) -> Vec<Self::Point> {
        self.current().cloned().into_iter().collect()
    }

    /// Objective evaluations performed so far.
    fn evaluations(&self) -> usize;

    /// Captures the engine state. Fails before initialization.
    fn save_state(&self) -> Result<Self::State>;

    /// Replaces the engine state with `state`.
    ///
    /// On error the engine must be left as it was before the call.
    fn restore_state(&mut self, state: Self::State) -> Result<()>;
}
