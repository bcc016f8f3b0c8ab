//! Problem and operator traits for AMOSA, plus move bookkeeping.

use rand::Rng;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::EvaluationError;
use crate::pareto::Evaluation;
use crate::random::AnnealRng;

/// Defines a multi-objective problem.
///
/// The user supplies random initialization and evaluation; AMOSA handles
/// the archive, acceptance and cooling. All objectives are **minimized**.
///
/// # Examples
///
/// ```ignore
/// struct Schaffer;
///
/// impl MoProblem for Schaffer {
///     type Decision = f64;
///
///     fn num_objectives(&self) -> usize { 2 }
///
///     fn random_decision<R: Rng>(&self, rng: &mut R) -> f64 {
///         rng.random_range(-10.0..10.0)
///     }
///
///     fn evaluate(&self, x: &f64) -> Result<Evaluation, EvaluationError> {
///         Ok(Evaluation::new(vec![x * x, (x - 2.0) * (x - 2.0)]))
///     }
/// }
/// ```
///
/// # Thread Safety
///
/// `MoProblem` must be `Send + Sync` because initial solutions may be
/// evaluated in parallel using rayon.
pub trait MoProblem: Send + Sync {
    /// The decision vector. Serializable so checkpoints can carry it.
    type Decision: Clone + Send + Sync + Serialize + DeserializeOwned;

    /// Number of objectives every evaluation returns.
    fn num_objectives(&self) -> usize;

    /// Creates a random decision vector.
    fn random_decision<R: Rng>(&self, rng: &mut R) -> Self::Decision;

    /// Evaluates a decision vector. Typically the expensive part.
    fn evaluate(&self, decision: &Self::Decision) -> Result<Evaluation, EvaluationError>;
}

impl<P: MoProblem + ?Sized> MoProblem for &P {
    type Decision = P::Decision;

    fn num_objectives(&self) -> usize {
        (**self).num_objectives()
    }

    fn random_decision<R: Rng>(&self, rng: &mut R) -> Self::Decision {
        (**self).random_decision(rng)
    }

    fn evaluate(&self, decision: &Self::Decision) -> Result<Evaluation, EvaluationError> {
        (**self).evaluate(decision)
    }
}

/// Mutation operator: one parent in, one offspring out.
///
/// Implemented for closures:
///
/// ```
/// use rand::Rng;
/// use u_amosa::amosa::Mutation;
/// use u_amosa::random::AnnealRng;
///
/// let gaussian_ish = |x: &Vec<f64>, rng: &mut AnnealRng| -> Vec<f64> {
///     x.iter().map(|v| v + rng.random_range(-0.1..0.1)).collect()
/// };
/// fn takes<M: Mutation<Vec<f64>>>(_: &M) {}
/// takes(&gaussian_ish);
/// ```
pub trait Mutation<D>: Send + Sync {
    fn mutate(&self, parent: &D, rng: &mut AnnealRng) -> D;
}

impl<D, F> Mutation<D> for F
where
    F: Fn(&D, &mut AnnealRng) -> D + Send + Sync,
{
    fn mutate(&self, parent: &D, rng: &mut AnnealRng) -> D {
        self(parent, rng)
    }
}

/// The six-way (plus one) classification of a candidate move.
///
/// "Current" is the annealer's current point, "new" the mutated candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveCase {
    /// 1: current dominates new.
    Dominated,
    /// 2a: mutually non-dominating, new dominated by archive members.
    TradeOffDominated,
    /// 2b: mutually non-dominating, new unrelated to every archive member.
    TradeOffIsolated,
    /// 2c: mutually non-dominating, new dominates archive members.
    TradeOffDominating,
    /// 3a: new dominates current but is dominated by archive members.
    ImprovedDominated,
    /// 3b: new dominates current and is unrelated to every archive member.
    ImprovedIsolated,
    /// 3c: new dominates current and archive members.
    ImprovedDominating,
}

impl MoveCase {
    pub const ALL: [MoveCase; 7] = [
        MoveCase::Dominated,
        MoveCase::TradeOffDominated,
        MoveCase::TradeOffIsolated,
        MoveCase::TradeOffDominating,
        MoveCase::ImprovedDominated,
        MoveCase::ImprovedIsolated,
        MoveCase::ImprovedDominating,
    ];

    fn index(self) -> usize {
        match self {
            MoveCase::Dominated => 0,
            MoveCase::TradeOffDominated => 1,
            MoveCase::TradeOffIsolated => 2,
            MoveCase::TradeOffDominating => 3,
            MoveCase::ImprovedDominated => 4,
            MoveCase::ImprovedIsolated => 5,
            MoveCase::ImprovedDominating => 6,
        }
    }
}

/// Counters describing what the engine did with its moves.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveStats {
    case_counts: [usize; 7],
    /// Probabilistic moves (cases 1, 2a, 3a) whose draw succeeded.
    pub probabilistic_accepted: usize,
    /// Probabilistic moves whose draw failed.
    pub probabilistic_rejected: usize,
    /// Archive reductions performed, including initialization and termination.
    pub reductions: usize,
}

impl MoveStats {
    pub fn record(&mut self, case: MoveCase) {
        self.case_counts[case.index()] += 1;
    }

    pub fn count(&self, case: MoveCase) -> usize {
        self.case_counts[case.index()]
    }

    /// Total moves classified.
    pub fn moves(&self) -> usize {
        self.case_counts.iter().sum()
    }
}
