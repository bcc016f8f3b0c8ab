//! AMOSA execution.
//!
//! [`Amosa`] is the annealing control loop specialized with the AMOSA
//! engine; step it manually, checkpoint it between steps, or let
//! [`AmosaRunner`] drive it to completion.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::config::AmosaConfig;
use super::engine::AmosaEngine;
use super::types::{MoProblem, MoveStats, Mutation};
use crate::error::{AmosaError, Result};
use crate::pareto::{Archive, Candidate, DominanceComparator};
use crate::sa::{AnnealingStatus, Annealer};

/// The AMOSA algorithm: an [`Annealer`] driving an [`AmosaEngine`].
///
/// # Usage
///
/// ```ignore
/// let mut amosa = Amosa::for_problem(MyProblem, AmosaConfig::default().with_seed(42))?
///     .with_mutation(|x: &Vec<f64>, rng: &mut AnnealRng| perturb(x, rng));
/// amosa.run()?;
/// for solution in amosa.archive() {
///     println!("{:?}", solution.objectives());
/// }
/// ```
pub type Amosa<P> = Annealer<AmosaEngine<P>>;

impl<P: MoProblem> Annealer<AmosaEngine<P>> {
    /// Creates an uninitialized AMOSA run.
    ///
    /// # Errors
    ///
    /// [`AmosaError::InvalidConfig`] when `config` fails validation.
    pub fn for_problem(problem: P, config: AmosaConfig) -> Result<Self> {
        config.validate().map_err(AmosaError::InvalidConfig)?;
        let annealing = config.annealing();
        Annealer::new(AmosaEngine::new(problem, config), annealing)
    }

    /// Sets the mutation operator. Required before the first step.
    pub fn with_mutation<M>(mut self, mutation: M) -> Self
    where
        M: Mutation<P::Decision> + 'static,
    {
        self.engine.set_mutation(Arc::new(mutation));
        self
    }

    /// Replaces the mutation operator; takes effect at the next step.
    pub fn set_mutation<M>(&mut self, mutation: M)
    where
        M: Mutation<P::Decision> + 'static,
    {
        self.engine.set_mutation(Arc::new(mutation));
    }

    /// Replaces the default Pareto dominance comparator.
    pub fn with_comparator<C>(mut self, comparator: C) -> Self
    where
        C: DominanceComparator + 'static,
    {
        self.engine.set_comparator(Arc::new(comparator));
        self
    }

    /// Changes the number of hill-climbing rounds applied at initialization.
    ///
    /// # Errors
    ///
    /// [`AmosaError::AlreadyInitialized`] once the run has been initialized.
    pub fn set_hill_climb_iterations(&mut self, n: usize) -> Result<()> {
        if self.status() != AnnealingStatus::Uninitialized {
            return Err(AmosaError::AlreadyInitialized("hill_climb_iterations"));
        }
        self.engine.set_hill_climb_iterations(n);
        Ok(())
    }

    pub fn archive(&self) -> &Archive<P::Decision> {
        self.engine.archive()
    }

    pub fn stats(&self) -> &MoveStats {
        self.engine.stats()
    }

    pub fn amosa_config(&self) -> &AmosaConfig {
        self.engine.config()
    }
}

/// Result of an AMOSA run.
#[derive(Debug, Clone)]
pub struct AmosaResult<D> {
    /// Final archive: mutually non-dominated, at most `hard_limit` members.
    pub archive: Vec<Candidate<D>>,

    /// Current point when the run stopped.
    pub current: Candidate<D>,

    /// Temperature when the run stopped.
    pub final_temperature: f64,

    /// Temperature levels executed.
    pub temperature_steps: usize,

    /// Total objective evaluations, initialization included.
    pub evaluations: usize,

    /// Per-case move counters.
    pub stats: MoveStats,

    /// Whether cancelled externally.
    pub cancelled: bool,
}

/// Executes AMOSA to completion.
pub struct AmosaRunner;

impl AmosaRunner {
    /// Runs AMOSA optimization.
    pub fn run<P, M>(
        problem: &P,
        mutation: M,
        config: &AmosaConfig,
    ) -> Result<AmosaResult<P::Decision>>
    where
        P: MoProblem,
        M: Mutation<P::Decision> + 'static,
    {
        Self::run_with_cancel(problem, mutation, config, None)
    }

    /// Runs AMOSA with an optional cancellation token.
    ///
    /// The flag is checked once per temperature level. A cancelled run
    /// still truncates its archive to the hard limit.
    pub fn run_with_cancel<P, M>(
        problem: &P,
        mutation: M,
        config: &AmosaConfig,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Result<AmosaResult<P::Decision>>
    where
        P: MoProblem,
        M: Mutation<P::Decision> + 'static,
    {
        let mut amosa = Amosa::for_problem(problem, config.clone())?.with_mutation(mutation);
        if let Some(flag) = cancel {
            amosa = amosa.with_termination(move |_| flag.load(Ordering::Relaxed));
        }

        amosa.run()?;

        let progress = amosa.progress();
        let cancelled = amosa.stopped_early();
        let engine = amosa.into_engine();
        let stats = engine.stats().clone();
        let (archive, current) = engine.into_parts();

        Ok(AmosaResult {
            archive: archive.into_members(),
            current: current.ok_or(AmosaError::NotInitialized)?,
            final_temperature: progress.temperature,
            temperature_steps: progress.steps,
            evaluations: progress.evaluations,
            stats,
            cancelled,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amosa::MoveCase;
    use crate::error::EvaluationError;
    use crate::pareto::{Dominance, DominanceComparator, Evaluation, ParetoDominance};
    use crate::random::AnnealRng;
    use crate::sa::CoolingSchedule;
    use rand::Rng;

    // ---- Schaffer N.1: f1 = x^2, f2 = (x - 2)^2, front for x in [0, 2] ----

    struct Schaffer;

    impl MoProblem for Schaffer {
        type Decision = f64;

        fn num_objectives(&self) -> usize {
            2
        }

        fn random_decision<R: Rng>(&self, rng: &mut R) -> f64 {
            rng.random_range(-10.0..10.0)
        }

        fn evaluate(&self, x: &f64) -> std::result::Result<Evaluation, EvaluationError> {
            Ok(Evaluation::new(vec![x * x, (x - 2.0) * (x - 2.0)]))
        }
    }

    fn step_mutation(x: &f64, rng: &mut AnnealRng) -> f64 {
        x + rng.random_range(-0.5..0.5)
    }

    fn small_config() -> AmosaConfig {
        AmosaConfig::default()
            .with_limits(20, 8)
            .with_initial_temperature(10.0)
            .with_stopping_temperature(0.01)
            .with_cooling(CoolingSchedule::Geometric { alpha: 0.8 })
            .with_iterations_per_temperature(30)
            .with_hill_climb_iterations(5)
            .with_seed(42)
    }

    fn assert_mutually_non_dominated(archive: &[Candidate<f64>]) {
        let cmp = ParetoDominance;
        for (i, a) in archive.iter().enumerate() {
            for b in archive.iter().skip(i + 1) {
                assert_eq!(
                    cmp.compare(&a.evaluation, &b.evaluation),
                    Dominance::NonDominated,
                    "{:?} vs {:?}",
                    a.objectives(),
                    b.objectives()
                );
            }
        }
    }

    #[test]
    fn test_schaffer_front() {
        let result = AmosaRunner::run(&Schaffer, step_mutation, &small_config()).unwrap();

        assert!(!result.archive.is_empty());
        assert!(result.archive.len() <= 8);
        assert_mutually_non_dominated(&result.archive);
        assert!(!result.cancelled);
        assert!(result.final_temperature <= 0.01);
        assert!(result.stats.moves() > 0);

        // 10 * 0.8^k <= 0.01 first at k = 31
        assert_eq!(result.temperature_steps, 31);
        assert_eq!(result.stats.moves(), 31 * 30);
        assert_eq!(result.evaluations, 40 + 40 * 5 + 31 * 30);
    }

    #[test]
    fn test_schaffer_archive_converges_near_front() {
        let config = small_config().with_iterations_per_temperature(100);
        let result = AmosaRunner::run(&Schaffer, step_mutation, &config).unwrap();
        let near_front = result
            .archive
            .iter()
            .filter(|c| (-0.5..=2.5).contains(&c.decision))
            .count();
        assert!(
            near_front * 2 >= result.archive.len(),
            "expected most archive members near x in [0, 2], got {:?}",
            result.archive.iter().map(|c| c.decision).collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_reproducible_with_seed() {
        let a = AmosaRunner::run(&Schaffer, step_mutation, &small_config()).unwrap();
        let b = AmosaRunner::run(&Schaffer, step_mutation, &small_config()).unwrap();

        assert_eq!(a.stats, b.stats);
        assert_eq!(a.archive, b.archive);
        assert_eq!(a.current, b.current);
        assert_eq!(a.evaluations, b.evaluations);
    }

    #[test]
    fn test_different_seeds_diverge() {
        let a = AmosaRunner::run(&Schaffer, step_mutation, &small_config()).unwrap();
        let b = AmosaRunner::run(&Schaffer, step_mutation, &small_config().with_seed(7)).unwrap();
        assert_ne!(a.archive, b.archive);
    }

    #[test]
    fn test_archive_invariants_hold_after_every_step() {
        let mut amosa = Amosa::for_problem(Schaffer, small_config().with_limits(6, 3))
            .unwrap()
            .with_mutation(step_mutation);
        amosa.step().unwrap();
        assert!(amosa.archive().len() <= 3);

        while !amosa.is_terminated() {
            amosa.step().unwrap();
            assert_mutually_non_dominated(amosa.archive().members());
            // between reductions the archive may grow up to the soft limit
            assert!(amosa.archive().len() <= 6);
        }
        assert!(amosa.archive().len() <= 3);
        assert_eq!(amosa.result().len(), amosa.archive().len());
    }

    #[test]
    fn test_cancel_before_start() {
        let cancel = Arc::new(AtomicBool::new(true));
        let result =
            AmosaRunner::run_with_cancel(&Schaffer, step_mutation, &small_config(), Some(cancel))
                .unwrap();
        assert!(result.cancelled);
        assert_eq!(result.temperature_steps, 0);
        assert!(result.archive.len() <= 8);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let result = Amosa::for_problem(Schaffer, small_config().with_gamma(0.5));
        assert!(matches!(result, Err(AmosaError::InvalidConfig(_))));
    }

    #[test]
    fn test_missing_mutation_is_fatal_and_leaves_run_uninitialized() {
        let mut amosa = Amosa::for_problem(Schaffer, small_config()).unwrap();
        let err = amosa.step().unwrap_err();
        assert!(matches!(err, AmosaError::MissingMutation));
        assert!(err.is_fatal());
        assert_eq!(amosa.status(), AnnealingStatus::Uninitialized);
        assert!(amosa.archive().is_empty());

        amosa.set_mutation(step_mutation);
        amosa.step().unwrap();
        assert_eq!(amosa.status(), AnnealingStatus::Initialized);
    }

    #[test]
    fn test_hill_climb_iterations_only_before_initialization() {
        let mut amosa = Amosa::for_problem(Schaffer, small_config())
            .unwrap()
            .with_mutation(step_mutation);
        amosa.set_hill_climb_iterations(0).unwrap();
        amosa.step().unwrap();
        assert_eq!(amosa.progress().evaluations, 40);

        let err = amosa.set_hill_climb_iterations(3).unwrap_err();
        assert!(matches!(err, AmosaError::AlreadyInitialized("hill_climb_iterations")));
        assert_eq!(amosa.amosa_config().hill_climb_iterations, 0);
    }

    #[test]
    fn test_step_after_termination() {
        let mut amosa = Amosa::for_problem(Schaffer, small_config())
            .unwrap()
            .with_mutation(step_mutation);
        amosa.run().unwrap();
        assert!(matches!(amosa.step(), Err(AmosaError::Terminated)));
    }

    #[test]
    fn test_checkpoint_resume_is_indistinguishable() {
        let mut uninterrupted = Amosa::for_problem(Schaffer, small_config())
            .unwrap()
            .with_mutation(step_mutation);
        uninterrupted.run().unwrap();

        let mut first = Amosa::for_problem(Schaffer, small_config())
            .unwrap()
            .with_mutation(step_mutation);
        for _ in 0..8 {
            first.step().unwrap();
        }
        let mut saved = Vec::new();
        first.write_checkpoint(&mut saved).unwrap();
        drop(first);

        let mut resumed = Amosa::for_problem(Schaffer, small_config().with_seed(1234))
            .unwrap()
            .with_mutation(step_mutation);
        resumed.read_checkpoint(saved.as_slice()).unwrap();
        resumed.run().unwrap();

        assert_eq!(resumed.stats(), uninterrupted.stats());
        assert_eq!(resumed.archive().members(), uninterrupted.archive().members());
        assert_eq!(resumed.current(), uninterrupted.current());
        assert_eq!(resumed.temperature().to_bits(), uninterrupted.temperature().to_bits());
        assert_eq!(resumed.progress().evaluations, uninterrupted.progress().evaluations);
    }

    #[test]
    fn test_checkpoint_round_trip_preserves_state() {
        let mut amosa = Amosa::for_problem(Schaffer, small_config())
            .unwrap()
            .with_mutation(step_mutation);
        for _ in 0..4 {
            amosa.step().unwrap();
        }
        let checkpoint = amosa.checkpoint().unwrap();

        let mut restored = Amosa::for_problem(Schaffer, small_config())
            .unwrap()
            .with_mutation(step_mutation);
        restored.restore(checkpoint.clone()).unwrap();

        assert_eq!(restored.checkpoint().unwrap(), checkpoint);
        assert_eq!(restored.temperature(), amosa.temperature());
        assert_eq!(restored.status(), AnnealingStatus::Initialized);
    }

    #[test]
    fn test_corrupt_checkpoint_keeps_pre_load_state() {
        let mut amosa = Amosa::for_problem(Schaffer, small_config())
            .unwrap()
            .with_mutation(step_mutation);
        amosa.step().unwrap();
        amosa.step().unwrap();
        let before = amosa.checkpoint().unwrap();

        let err = amosa.read_checkpoint(&b"{\"status\":\"Initialized\""[..]).unwrap_err();
        assert!(!err.is_fatal());
        assert_eq!(amosa.checkpoint().unwrap(), before);

        // the run is still usable
        amosa.step().unwrap();
        assert_eq!(amosa.steps(), before.steps + 1);
    }

    #[test]
    fn test_termination_reduces_archive_above_hard_limit() {
        // a generous soft limit lets the archive grow past hard_limit
        // between reductions
        let config = small_config()
            .with_limits(40, 2)
            .with_hill_climb_iterations(0)
            .with_initial_temperature(1.0)
            .with_stopping_temperature(0.5)
            .with_iterations_per_temperature(200);
        let result = AmosaRunner::run(&Schaffer, step_mutation, &config).unwrap();
        assert!(result.archive.len() <= 2);
        assert!(result.stats.reductions >= 1);
    }

    #[test]
    fn test_case_counts_cover_all_moves() {
        let result = AmosaRunner::run(&Schaffer, step_mutation, &small_config()).unwrap();
        let total: usize = MoveCase::ALL.iter().map(|&c| result.stats.count(c)).sum();
        assert_eq!(total, result.stats.moves());
        assert!(
            result.stats.probabilistic_accepted + result.stats.probabilistic_rejected
                == result.stats.count(MoveCase::Dominated)
                    + result.stats.count(MoveCase::TradeOffDominated)
                    + result.stats.count(MoveCase::ImprovedDominated)
        );
    }

    // ---- Constrained problem: feasible region x >= 1 ----

    struct Constrained;

    impl MoProblem for Constrained {
        type Decision = f64;

        fn num_objectives(&self) -> usize {
            2
        }

        fn random_decision<R: Rng>(&self, rng: &mut R) -> f64 {
            rng.random_range(-5.0..5.0)
        }

        fn evaluate(&self, x: &f64) -> std::result::Result<Evaluation, EvaluationError> {
            Ok(Evaluation::with_constraints(
                vec![x * x, (x - 2.0) * (x - 2.0)],
                vec![1.0 - x],
            ))
        }
    }

    #[test]
    fn test_constrained_archive_prefers_feasible() {
        let result = AmosaRunner::run(&Constrained, step_mutation, &small_config()).unwrap();
        assert!(result.archive.iter().all(|c| c.is_feasible()));
    }

    #[test]
    fn test_comparator_is_pluggable() {
        #[derive(Debug)]
        struct FirstOnly;
        impl DominanceComparator for FirstOnly {
            fn compare(&self, a: &Evaluation, b: &Evaluation) -> Dominance {
                crate::pareto::dominance_cmp(&a.objectives[..1], &b.objectives[..1])
            }
        }

        let mut amosa = Amosa::for_problem(Schaffer, small_config())
            .unwrap()
            .with_mutation(step_mutation)
            .with_comparator(FirstOnly);
        amosa.run().unwrap();
        // a single objective leaves a single non-dominated value
        assert_eq!(amosa.archive().len(), 1);
    }
}
