//! Pareto machinery shared by the multi-objective engine.
//!
//! # Key Types
//!
//! - [`Candidate`]: decision vector plus its [`Evaluation`]
//! - [`DominanceComparator`]: dominance relation, default [`ParetoDominance`]
//! - [`Archive`]: container of mutually non-dominated candidates
//!
//! # Submodules
//!
//! - [`clustering`]: single-linkage reduction used to truncate the archive

mod archive;
mod candidate;
pub mod clustering;
mod dominance;

pub use archive::{Archive, DUPLICATE_EPSILON};
pub use candidate::{Candidate, Evaluation};
pub use dominance::{dominance_cmp, Dominance, DominanceComparator, ParetoDominance};
