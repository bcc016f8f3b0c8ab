//! AMOSA acceptance engine.
//!
//! # Algorithm (Bandyopadhyay et al., 2008)
//!
//! Initialization:
//! 1. Draw `gamma * soft_limit` random solutions and evaluate them
//! 2. Refine each with `hill_climb_iterations` rounds of mutation, keeping
//!    the mutant whenever the incumbent does not dominate it
//! 3. Offer every refined solution to the archive; cluster down to the
//!    hard limit if the archive is larger
//! 4. Pick the current point uniformly from the archive
//!
//! Each temperature level then performs `iterations_per_temperature` moves:
//! mutate the current point, classify the mutant against the current point
//! and the archive ([`MoveCase`]), and accept it deterministically or with
//! a probability scaled by its amount of domination.
//!
//! # Amount of domination
//!
//! `Δdom(a, b) = Π |a_i - b_i| / R_i` over the objectives where `a` and `b`
//! differ, `R_i` being the range of objective `i` over the archive and the
//! new point. Objectives with zero range are skipped.

use std::sync::Arc;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::config::AmosaConfig;
use super::types::{MoProblem, MoveCase, MoveStats, Mutation};
use crate::error::{AmosaError, Result};
use crate::pareto::clustering;
use crate::pareto::{Archive, Candidate, Dominance, DominanceComparator, ParetoDominance};
use crate::random::AnnealRng;
use crate::sa::AnnealingEngine;

/// Saved state of an [`AmosaEngine`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmosaState<D> {
    pub current: Candidate<D>,
    pub archive: Vec<Candidate<D>>,
    pub evaluations: usize,
    pub stats: MoveStats,
}

/// Classified move with the data its acceptance rule needs.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Move {
    Dominated { average_delta: f64 },
    TradeOffDominated { average_delta: f64 },
    TradeOffIsolated,
    TradeOffDominating,
    ImprovedDominated { nearest: usize, min_delta: f64 },
    ImprovedIsolated,
    ImprovedDominating,
}

impl Move {
    fn case(&self) -> MoveCase {
        match self {
            Move::Dominated { .. } => MoveCase::Dominated,
            Move::TradeOffDominated { .. } => MoveCase::TradeOffDominated,
            Move::TradeOffIsolated => MoveCase::TradeOffIsolated,
            Move::TradeOffDominating => MoveCase::TradeOffDominating,
            Move::ImprovedDominated { .. } => MoveCase::ImprovedDominated,
            Move::ImprovedIsolated => MoveCase::ImprovedIsolated,
            Move::ImprovedDominating => MoveCase::ImprovedDominating,
        }
    }
}

/// How a candidate relates to the archive.
#[derive(Debug, Default)]
struct ArchiveRelation {
    /// Members the candidate dominates.
    dominates: usize,
    /// Members dominating the candidate, with their Δdom to it.
    dominators: Vec<(usize, f64)>,
}

impl ArchiveRelation {
    /// Mean Δdom over the dominating members, plus `extra` when the current
    /// point also dominates the candidate.
    fn average_delta(&self, extra: Option<f64>) -> f64 {
        let members: f64 = self.dominators.iter().map(|&(_, d)| d).sum();
        let total = members + extra.unwrap_or(0.0);
        let k = self.dominators.len() + usize::from(extra.is_some());
        if k == 0 {
            0.0
        } else {
            total / k as f64
        }
    }

    /// Dominating member with the smallest Δdom; the earliest wins ties.
    fn nearest(&self) -> Option<(usize, f64)> {
        self.dominators
            .iter()
            .copied()
            .reduce(|best, next| if next.1 < best.1 { next } else { best })
    }
}

/// Archive-based multi-objective annealing engine.
///
/// Owns the problem, the archive and the current point. Driven by
/// [`Annealer`](crate::sa::Annealer); see [`Amosa`](super::Amosa).
pub struct AmosaEngine<P: MoProblem> {
    problem: P,
    config: AmosaConfig,
    mutation: Option<Arc<dyn Mutation<P::Decision>>>,
    comparator: Arc<dyn DominanceComparator>,
    archive: Archive<P::Decision>,
    current: Option<Candidate<P::Decision>>,
    evaluations: usize,
    stats: MoveStats,
}

impl<P: MoProblem> AmosaEngine<P> {
    /// Creates an engine with Pareto dominance and no mutation operator.
    ///
    /// The configuration is validated by [`Amosa::for_problem`](super::Amosa);
    /// the engine itself only reads it.
    pub fn new(problem: P, config: AmosaConfig) -> Self {
        let comparator: Arc<dyn DominanceComparator> = Arc::new(ParetoDominance);
        Self {
            problem,
            config,
            mutation: None,
            archive: Archive::new(Arc::clone(&comparator)),
            comparator,
            current: None,
            evaluations: 0,
            stats: MoveStats::default(),
        }
    }

    pub fn set_mutation(&mut self, mutation: Arc<dyn Mutation<P::Decision>>) {
        self.mutation = Some(mutation);
    }

    /// Replaces the dominance comparator. The archive is rebuilt under the
    /// new relation, so members the new comparator ranks as dominated are
    /// dropped.
    pub fn set_comparator(&mut self, comparator: Arc<dyn DominanceComparator>) {
        let members = self.archive.take_members();
        self.archive = Archive::new(Arc::clone(&comparator));
        for member in members {
            self.archive.add(member);
        }
        self.comparator = comparator;
    }

    pub(crate) fn set_hill_climb_iterations(&mut self, n: usize) {
        self.config.hill_climb_iterations = n;
    }

    pub fn problem(&self) -> &P {
        &self.problem
    }

    pub fn config(&self) -> &AmosaConfig {
        &self.config
    }

    pub fn archive(&self) -> &Archive<P::Decision> {
        &self.archive
    }

    pub fn stats(&self) -> &MoveStats {
        &self.stats
    }

    pub fn current_point(&self) -> Option<&Candidate<P::Decision>> {
        self.current.as_ref()
    }

    pub fn into_parts(self) -> (Archive<P::Decision>, Option<Candidate<P::Decision>>) {
        (self.archive, self.current)
    }

    fn mutation(&self) -> Result<Arc<dyn Mutation<P::Decision>>> {
        self.mutation.clone().ok_or(AmosaError::MissingMutation)
    }

    fn evaluate(&mut self, decision: P::Decision) -> Result<Candidate<P::Decision>> {
        let candidate = evaluate_candidate(&self.problem, decision)?;
        self.evaluations += 1;
        Ok(candidate)
    }

    /// Clusters the archive down to the hard limit.
    fn reduce_archive(&mut self) {
        let before = self.archive.len();
        let members = self.archive.take_members();
        let reduced = clustering::reduce(members, self.config.hard_limit);
        self.archive.set_members_unchecked(reduced);
        self.stats.reductions += 1;
        debug!(before, after = self.archive.len(), "archive reduced");
    }

    /// Relation of `new` to every archive member, from a single pass of
    /// the comparator.
    fn relate(&self, new: &Candidate<P::Decision>, ranges: &[f64]) -> ArchiveRelation {
        let mut relation = ArchiveRelation::default();
        for (index, member) in self.archive.iter().enumerate() {
            match self.comparator.compare(&new.evaluation, &member.evaluation) {
                Dominance::Dominates => relation.dominates += 1,
                Dominance::DominatedBy => {
                    let delta = delta_dominance(new.objectives(), member.objectives(), ranges);
                    relation.dominators.push((index, delta));
                }
                Dominance::NonDominated => {}
            }
        }
        relation
    }

    fn classify(
        &self,
        current: &Candidate<P::Decision>,
        new: &Candidate<P::Decision>,
        ranges: &[f64],
    ) -> Move {
        let relation = self.relate(new, ranges);
        match self.comparator.compare(&current.evaluation, &new.evaluation) {
            Dominance::Dominates => {
                let to_current = delta_dominance(new.objectives(), current.objectives(), ranges);
                Move::Dominated {
                    average_delta: relation.average_delta(Some(to_current)),
                }
            }
            Dominance::NonDominated => {
                if !relation.dominators.is_empty() {
                    Move::TradeOffDominated {
                        average_delta: relation.average_delta(None),
                    }
                } else if relation.dominates == 0 {
                    Move::TradeOffIsolated
                } else {
                    Move::TradeOffDominating
                }
            }
            Dominance::DominatedBy => match relation.nearest() {
                Some((nearest, min_delta)) => Move::ImprovedDominated { nearest, min_delta },
                None if relation.dominates == 0 => Move::ImprovedIsolated,
                None => Move::ImprovedDominating,
            },
        }
    }

    /// Applies a classified move, returning the new current point.
    fn apply(
        &mut self,
        movement: Move,
        current: Candidate<P::Decision>,
        new: Candidate<P::Decision>,
        temperature: f64,
        rng: &mut AnnealRng,
    ) -> Candidate<P::Decision> {
        match movement {
            Move::Dominated { average_delta } | Move::TradeOffDominated { average_delta } => {
                let probability = 1.0 / (1.0 + (average_delta * temperature).exp());
                if self.draw(probability, rng) {
                    new
                } else {
                    current
                }
            }
            Move::TradeOffIsolated => {
                self.archive.add(new.clone());
                if self.archive.len() > self.config.soft_limit {
                    self.reduce_archive();
                }
                new
            }
            Move::TradeOffDominating | Move::ImprovedDominating => {
                self.archive.add(new.clone());
                new
            }
            Move::ImprovedDominated { nearest, min_delta } => {
                let probability = 1.0 / (1.0 + (-min_delta).exp());
                if self.draw(probability, rng) {
                    match self.archive.get(nearest) {
                        Some(member) => member.clone(),
                        None => new,
                    }
                } else {
                    new
                }
            }
            Move::ImprovedIsolated => {
                if !self.archive.add(new.clone()) {
                    trace!("improved point rejected by archive as duplicate");
                } else if self.archive.len() > self.config.soft_limit {
                    self.reduce_archive();
                }
                new
            }
        }
    }

    fn draw(&mut self, probability: f64, rng: &mut AnnealRng) -> bool {
        let accepted = rng.random_range(0.0..1.0) < probability;
        if accepted {
            self.stats.probabilistic_accepted += 1;
        } else {
            self.stats.probabilistic_rejected += 1;
        }
        accepted
    }

    fn check_objectives(&self, candidate: &Candidate<P::Decision>) -> Result<()> {
        let expected = self.problem.num_objectives();
        let actual = candidate.num_objectives();
        if expected != actual {
            return Err(AmosaError::Checkpoint(format!(
                "candidate has {actual} objectives, problem has {expected}"
            )));
        }
        check_finite("objective", candidate.objectives())?;
        check_finite("constraint", &candidate.evaluation.constraints)
    }
}

impl<P: MoProblem> AnnealingEngine for AmosaEngine<P> {
    type Point = Candidate<P::Decision>;
    type State = AmosaState<P::Decision>;

    fn initialize(&mut self, rng: &mut AnnealRng) -> Result<()> {
        let mutation = self.mutation()?;
        let mut evaluations = 0usize;

        let decisions: Vec<P::Decision> = (0..self.config.initial_size())
            .map(|_| self.problem.random_decision(rng))
            .collect();
        let initial = evaluate_all(&self.problem, decisions, self.config.parallel)?;
        evaluations += initial.len();

        let mut archive = Archive::new(Arc::clone(&self.comparator));
        for mut solution in initial {
            for _ in 0..self.config.hill_climb_iterations {
                let child = mutation.mutate(&solution.decision, rng);
                let child = evaluate_candidate(&self.problem, child)?;
                evaluations += 1;
                if !self.comparator.dominates(&solution.evaluation, &child.evaluation) {
                    solution = child;
                }
            }
            archive.add(solution);
        }

        let refined = archive.len();
        let mut reductions = 0;
        if archive.len() > self.config.hard_limit {
            let members = archive.take_members();
            archive.set_members_unchecked(clustering::reduce(members, self.config.hard_limit));
            reductions += 1;
        }

        let Some(current) = archive.get(rng.random_range(0..archive.len().max(1))).cloned() else {
            return Err(AmosaError::InvalidConfig("initial archive is empty".into()));
        };

        debug!(
            evaluations,
            refined,
            archive = archive.len(),
            "amosa archive initialized"
        );

        self.archive = archive;
        self.current = Some(current);
        self.evaluations += evaluations;
        self.stats.reductions += reductions;
        Ok(())
    }

    fn iterate(&mut self, temperature: f64, rng: &mut AnnealRng) -> Result<()> {
        let mutation = self.mutation()?;

        for _ in 0..self.config.iterations_per_temperature {
            let current = self.current.take().ok_or(AmosaError::NotInitialized)?;
            let child = mutation.mutate(&current.decision, rng);
            let new = match self.evaluate(child) {
                Ok(new) => new,
                Err(err) => {
                    self.current = Some(current);
                    return Err(err);
                }
            };

            let ranges = self.archive.ranges_with(&new);
            let movement = self.classify(&current, &new, &ranges);
            self.stats.record(movement.case());
            trace!(?movement, temperature, "amosa move");

            let next = self.apply(movement, current, new, temperature, rng);
            self.current = Some(next);
        }
        Ok(())
    }

    fn terminate(&mut self) {
        if self.archive.len() > self.config.hard_limit {
            self.reduce_archive();
        }
    }

    fn current(&self) -> Option<&Self::Point> {
        self.current.as_ref()
    }

    /// The archive, not just the current point.
    fn result(&self) -> Vec<Self::Point> {
        self.archive.members().to_vec()
    }

    fn evaluations(&self) -> usize {
        self.evaluations
    }

    fn save_state(&self) -> Result<Self::State> {
        let current = self.current.clone().ok_or(AmosaError::NotInitialized)?;
        Ok(AmosaState {
            current,
            archive: self.archive.members().to_vec(),
            evaluations: self.evaluations,
            stats: self.stats.clone(),
        })
    }

    fn restore_state(&mut self, state: Self::State) -> Result<()> {
        self.check_objectives(&state.current)?;
        for member in &state.archive {
            self.check_objectives(member)?;
        }

        let expected = state.archive.len();
        let mut archive = Archive::new(Arc::clone(&self.comparator));
        for member in state.archive {
            archive.add(member);
        }
        if archive.len() != expected {
            return Err(AmosaError::Checkpoint(format!(
                "archive members are not mutually non-dominated ({} of {expected} kept)",
                archive.len()
            )));
        }

        self.archive = archive;
        self.current = Some(state.current);
        self.evaluations = state.evaluations;
        self.stats = state.stats;
        Ok(())
    }
}

/// Amount of domination between two objective vectors.
///
/// Product of `|a_i - b_i| / r_i` over the objectives where the vectors
/// differ and the range `r_i` is positive. Identical vectors give 1.0, the
/// empty product.
pub fn delta_dominance(a: &[f64], b: &[f64], ranges: &[f64]) -> f64 {
    let mut delta = 1.0;
    for ((&x, &y), &r) in a.iter().zip(b.iter()).zip(ranges.iter()) {
        if x != y && r > 0.0 {
            delta *= (x - y).abs() / r;
        }
    }
    delta
}

fn evaluate_candidate<P: MoProblem>(
    problem: &P,
    decision: P::Decision,
) -> Result<Candidate<P::Decision>> {
    let evaluation = problem.evaluate(&decision)?;
    let expected = problem.num_objectives();
    if evaluation.objectives.len() != expected {
        return Err(AmosaError::ObjectiveCount {
            expected,
            actual: evaluation.objectives.len(),
        });
    }
    check_finite("objective", &evaluation.objectives)?;
    check_finite("constraint", &evaluation.constraints)?;
    Ok(Candidate::new(decision, evaluation))
}

/// Non-finite values cannot enter the archive: they break the objective
/// ranges and do not survive a JSON checkpoint.
fn check_finite(kind: &'static str, values: &[f64]) -> Result<()> {
    match values.iter().position(|v| !v.is_finite()) {
        Some(index) => Err(AmosaError::NonFinite {
            kind,
            index,
            value: values[index],
        }),
        None => Ok(()),
    }
}

#[cfg(feature = "parallel")]
fn evaluate_all<P: MoProblem>(
    problem: &P,
    decisions: Vec<P::Decision>,
    parallel: bool,
) -> Result<Vec<Candidate<P::Decision>>> {
    use rayon::prelude::*;

    if parallel {
        decisions
            .into_par_iter()
            .map(|d| evaluate_candidate(problem, d))
            .collect()
    } else {
        decisions
            .into_iter()
            .map(|d| evaluate_candidate(problem, d))
            .collect()
    }
}

#[cfg(not(feature = "parallel"))]
fn evaluate_all<P: MoProblem>(
    problem: &P,
    decisions: Vec<P::Decision>,
    _parallel: bool,
) -> Result<Vec<Candidate<P::Decision>>> {
    decisions
        .into_iter()
        .map(|d| evaluate_candidate(problem, d))
        .collect()
}

// ============================================================================
// Tests
// ============================================================================
