//! Pareto dominance comparison.
//!
//! All objectives are **minimized**. Constraint handling follows the usual
//! constrained-dominance rule: lower aggregate violation wins outright, and
//! objectives are compared only when the violations tie.

use super::candidate::Evaluation;

/// Dominance relation of a left operand with respect to a right operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dominance {
    /// Left dominates right.
    Dominates,
    /// Right dominates left.
    DominatedBy,
    /// Neither dominates the other (this includes identical vectors).
    NonDominated,
}

impl Dominance {
    /// The relation seen from the other operand.
    pub fn flip(self) -> Self {
        match self {
            Dominance::Dominates => Dominance::DominatedBy,
            Dominance::DominatedBy => Dominance::Dominates,
            Dominance::NonDominated => Dominance::NonDominated,
        }
    }
}

/// Compares two evaluations for dominance.
///
/// Implementations must be antisymmetric: `compare(a, b)` is the
/// [`flip`](Dominance::flip) of `compare(b, a)`.
pub trait DominanceComparator: Send + Sync + std::fmt::Debug {
    fn compare(&self, a: &Evaluation, b: &Evaluation) -> Dominance;

    fn dominates(&self, a: &Evaluation, b: &Evaluation) -> bool {
        self.compare(a, b) == Dominance::Dominates
    }
}

/// Constraint-aware Pareto dominance.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParetoDominance;

impl DominanceComparator for ParetoDominance {
    fn compare(&self, a: &Evaluation, b: &Evaluation) -> Dominance {
        let va = a.constraint_violation();
        let vb = b.constraint_violation();

        if va < vb {
            Dominance::Dominates
        } else if vb < va {
            Dominance::DominatedBy
        } else {
            dominance_cmp(&a.objectives, &b.objectives)
        }
    }
}

/// Plain Pareto comparison of two objective vectors (minimization).
pub fn dominance_cmp(a: &[f64], b: &[f64]) -> Dominance {
    debug_assert_eq!(a.len(), b.len(), "objective vectors must have equal length");

    let mut a_better_in_some = false;
    let mut b_better_in_some = false;

    for (&va, &vb) in a.iter().zip(b.iter()) {
        if va < vb {
            a_better_in_some = true;
        } else if vb < va {
            b_better_in_some = true;
        }
    }

    match (a_better_in_some, b_better_in_some) {
        (true, false) => Dominance::Dominates,
        (false, true) => Dominance::DominatedBy,
        _ => Dominance::NonDominated,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(objs: &[f64]) -> Evaluation {
        Evaluation::new(objs.to_vec())
    }

    #[test]
    fn test_clear_dominance() {
        assert_eq!(dominance_cmp(&[1.0, 1.0], &[2.0, 2.0]), Dominance::Dominates);
        assert_eq!(dominance_cmp(&[2.0, 2.0], &[1.0, 1.0]), Dominance::DominatedBy);
    }

    #[test]
    fn test_weak_dominance_counts() {
        // equal in one objective, better in the other
        assert_eq!(dominance_cmp(&[1.0, 2.0], &[1.0, 3.0]), Dominance::Dominates);
    }

    #[test]
    fn test_trade_off_and_equal() {
        assert_eq!(dominance_cmp(&[1.0, 3.0], &[3.0, 1.0]), Dominance::NonDominated);
        assert_eq!(dominance_cmp(&[2.0, 2.0], &[2.0, 2.0]), Dominance::NonDominated);
    }

    #[test]
    fn test_feasible_beats_infeasible() {
        let feasible = Evaluation::with_constraints(vec![10.0, 10.0], vec![-1.0]);
        let infeasible = Evaluation::with_constraints(vec![0.0, 0.0], vec![0.5]);
        let cmp = ParetoDominance;
        assert_eq!(cmp.compare(&feasible, &infeasible), Dominance::Dominates);
        assert_eq!(cmp.compare(&infeasible, &feasible), Dominance::DominatedBy);
    }

    #[test]
    fn test_lower_violation_wins() {
        let a = Evaluation::with_constraints(vec![5.0], vec![0.2]);
        let b = Evaluation::with_constraints(vec![1.0], vec![0.7]);
        assert!(ParetoDominance.dominates(&a, &b));
    }

    #[test]
    fn test_compare_is_antisymmetric() {
        let cmp = ParetoDominance;
        let pairs = [
            (eval(&[1.0, 2.0]), eval(&[2.0, 1.0])),
            (eval(&[1.0, 1.0]), eval(&[1.0, 2.0])),
            (eval(&[3.0, 3.0]), eval(&[3.0, 3.0])),
        ];
        for (a, b) in &pairs {
            assert_eq!(cmp.compare(a, b), cmp.compare(b, a).flip());
        }
    }
}
