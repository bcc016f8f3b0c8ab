//! Checkpoints of the annealing control loop.
//!
//! A checkpoint is taken between temperature levels only. It records the
//! lifecycle status, the temperature, the random stream position and the
//! engine state, which is enough to continue a run with exactly the draws
//! and outcomes an uninterrupted run would have produced.

use std::io::{Read, Write};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::types::AnnealingStatus;
use crate::error::Result;
use crate::random::RngState;

/// Saved state of an [`Annealer`](super::Annealer).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint<S> {
    pub status: AnnealingStatus,
    pub temperature: f64,
    pub steps: usize,
    pub rng: RngState,
    pub engine: S,
}

impl<S: Serialize> Checkpoint<S> {
    /// Encodes the checkpoint as JSON.
    pub fn write_to<W: Write>(&self, writer: W) -> Result<()> {
        serde_json::to_writer(writer, self)?;
        Ok(())
    }
}

impl<S: DeserializeOwned> Checkpoint<S> {
    /// Decodes a checkpoint written by [`write_to`](Self::write_to).
    pub fn read_from<R: Read>(reader: R) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }
}
