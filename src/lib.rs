//! Archived multi-objective simulated annealing.
//!
//! - **Simulated Annealing ([`sa`])**: generic control loop owning the
//!   temperature, cooling schedule, random stream, lifecycle and
//!   checkpoints. Engines plug in through [`sa::AnnealingEngine`].
//! - **AMOSA ([`amosa`])**: the multi-objective engine. Keeps an archive of
//!   non-dominated solutions and accepts moves according to their amount of
//!   domination.
//! - **Pareto ([`pareto`])**: candidates, dominance comparators, the
//!   non-dominated archive and single-linkage clustering.
//!
//! # Quick Start
//!
//! ```ignore
//! use u_amosa::amosa::{AmosaConfig, AmosaRunner};
//!
//! let config = AmosaConfig::default().with_limits(50, 20).with_seed(42);
//! let result = AmosaRunner::run(&MyProblem, my_mutation, &config)?;
//! for solution in &result.archive {
//!     println!("{:?}", solution.objectives());
//! }
//! ```
//!
//! # Features
//!
//! - `parallel`: evaluate the initial population with rayon

pub mod amosa;
pub mod error;
pub mod pareto;
pub mod random;
pub mod sa;

pub use error::{AmosaError, EvaluationError, Result};
