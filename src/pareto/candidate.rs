//! Evaluated candidate solutions.

use serde::{Deserialize, Serialize};

/// Objective and constraint values produced by evaluating a decision vector.
///
/// Objectives are **minimized**. A constraint value `<= 0.0` is satisfied;
/// positive values measure the amount of violation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub objectives: Vec<f64>,
    pub constraints: Vec<f64>,
}

impl Evaluation {
    /// Unconstrained evaluation.
    pub fn new(objectives: Vec<f64>) -> Self {
        Self {
            objectives,
            constraints: Vec::new(),
        }
    }

    pub fn with_constraints(objectives: Vec<f64>, constraints: Vec<f64>) -> Self {
        Self {
            objectives,
            constraints,
        }
    }

    /// Sum of positive constraint values. Zero for feasible evaluations.
    pub fn constraint_violation(&self) -> f64 {
        self.constraints.iter().map(|c| c.max(0.0)).sum()
    }

    pub fn is_feasible(&self) -> bool {
        self.constraints.iter().all(|&c| c <= 0.0)
    }
}

/// A decision vector together with its evaluation.
///
/// Objective ranges and distances are always computed on the raw
/// objective values, regardless of feasibility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate<D> {
    pub decision: D,
    pub evaluation: Evaluation,
}

impl<D> Candidate<D> {
    pub fn new(decision: D, evaluation: Evaluation) -> Self {
        Self {
            decision,
            evaluation,
        }
    }

    pub fn objectives(&self) -> &[f64] {
        &self.evaluation.objectives
    }

    pub fn objective(&self, index: usize) -> f64 {
        self.evaluation.objectives[index]
    }

    pub fn num_objectives(&self) -> usize {
        self.evaluation.objectives.len()
    }

    pub fn is_feasible(&self) -> bool {
        self.evaluation.is_feasible()
    }

    /// Euclidean distance between the objective vectors of two candidates.
    pub fn objective_distance(&self, other: &Candidate<D>) -> f64 {
        euclidean(self.objectives(), other.objectives())
    }
}

pub(crate) fn euclidean(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}
