//! Simulated annealing control loop.
//!
//! A generic scaffold that owns the temperature, the cooling schedule, the
//! random stream and the run lifecycle, and delegates the moves made at
//! each temperature level to an [`AnnealingEngine`]. The multi-objective
//! engine in [`crate::amosa`] is one such engine.
//!
//! # References
//!
//! - Kirkpatrick, Gelatt & Vecchi (1983), "Optimization by Simulated Annealing"
//! - Cerny (1985), "Thermodynamical Approach to the Travelling Salesman Problem"
//! - Lundy & Mees (1986), "Convergence of an Annealing Algorithm"

mod checkpoint;
mod config;
mod runner;
mod types;

pub use checkpoint::Checkpoint;
pub use config::{CoolingSchedule, SaConfig};
pub use runner::Annealer;
pub use types::{AnnealingEngine, AnnealingStatus, Progress};
