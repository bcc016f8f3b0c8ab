//! Archived Multi-Objective Simulated Annealing (AMOSA).
//!
//! Optimizes several objectives at once by annealing a single current point
//! while maintaining an archive of mutually non-dominated solutions. The
//! acceptance probability of a move is driven by the *amount of
//! domination* between the candidate, the current point and the archive,
//! so no objective weighting is needed.
//!
//! # Key Types
//!
//! - [`MoProblem`]: user-defined problem (random decision + evaluation)
//! - [`Mutation`]: user-defined neighbor operator
//! - [`AmosaConfig`]: archive limits, temperatures and iteration counts
//! - [`Amosa`]: the algorithm, steppable and checkpointable
//! - [`AmosaRunner`]: runs the algorithm to completion
//!
//! # References
//!
//! - Bandyopadhyay, Saha, Maulik & Deb (2008), "A Simulated Annealing-Based
//!   Multiobjective Optimization Algorithm: AMOSA", IEEE Transactions on
//!   Evolutionary Computation 12(3)

mod config;
mod engine;
mod runner;
mod types;

pub use config::AmosaConfig;
pub use engine::{delta_dominance, AmosaEngine, AmosaState};
pub use runner::{Amosa, AmosaResult, AmosaRunner};
pub use types::{MoProblem, MoveCase, MoveStats, Mutation};
