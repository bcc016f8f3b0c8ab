//! Non-dominated archive.

use std::sync::Arc;

use super::candidate::{euclidean, Candidate};
use super::dominance::{Dominance, DominanceComparator, ParetoDominance};

/// Objective-space distance below which two candidates count as duplicates.
pub const DUPLICATE_EPSILON: f64 = 1e-10;

/// A set of mutually non-dominated candidates.
///
/// No member dominates another under the archive's comparator, and no two
/// members have objective vectors closer than [`DUPLICATE_EPSILON`].
/// Members keep their insertion order; indices are stable until the next
/// mutation.
#[derive(Debug, Clone)]
pub struct Archive<D> {
    members: Vec<Candidate<D>>,
    comparator: Arc<dyn DominanceComparator>,
}

impl<D> Default for Archive<D> {
    fn default() -> Self {
        Self::new(Arc::new(ParetoDominance))
    }
}

impl<D> Archive<D> {
    pub fn new(comparator: Arc<dyn DominanceComparator>) -> Self {
        Self {
            members: Vec::new(),
            comparator,
        }
    }

    pub fn comparator(&self) -> &Arc<dyn DominanceComparator> {
        &self.comparator
    }

    /// Offers a candidate to the archive.
    ///
    /// Returns `false` and leaves the archive untouched when a member
    /// dominates the candidate or duplicates its objectives. Otherwise every
    /// member the candidate dominates is dropped, the candidate is appended
    /// and `true` is returned.
    pub fn add(&mut self, candidate: Candidate<D>) -> bool {
        let rejected = self.members.iter().any(|member| {
            match self.comparator.compare(&candidate.evaluation, &member.evaluation) {
                Dominance::DominatedBy => true,
                Dominance::NonDominated => {
                    euclidean(candidate.objectives(), member.objectives()) < DUPLICATE_EPSILON
                }
                Dominance::Dominates => false,
            }
        });
        if rejected {
            return false;
        }

        let comparator = &self.comparator;
        self.members
            .retain(|member| !comparator.dominates(&candidate.evaluation, &member.evaluation));
        self.members.push(candidate);
        true
    }

    /// Removes and returns the member at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    pub fn remove(&mut self, index: usize) -> Candidate<D> {
        self.members.remove(index)
    }

    pub fn get(&self, index: usize) -> Option<&Candidate<D>> {
        self.members.get(index)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Candidate<D>> {
        self.members.iter()
    }

    pub fn members(&self) -> &[Candidate<D>] {
        &self.members
    }

    pub fn into_members(self) -> Vec<Candidate<D>> {
        self.members
    }

    pub fn clear(&mut self) {
        self.members.clear();
    }

    /// Takes all members out, leaving the archive empty.
    pub(crate) fn take_members(&mut self) -> Vec<Candidate<D>> {
        std::mem::take(&mut self.members)
    }

    /// Installs members without dominance checks.
    ///
    /// Only for sets already known to be mutually non-dominated, such as
    /// the output of a reduction over a previous archive.
    pub(crate) fn set_members_unchecked(&mut self, members: Vec<Candidate<D>>) {
        self.members = members;
    }

    /// Per-objective range (max - min) spanned by the archive together with
    /// `extra`.
    pub fn ranges_with(&self, extra: &Candidate<D>) -> Vec<f64> {
        let mut bests = extra.objectives().to_vec();
        let mut worsts = extra.objectives().to_vec();

        for member in &self.members {
            for (i, &value) in member.objectives().iter().enumerate() {
                if value < bests[i] {
                    bests[i] = value;
                }
                if value > worsts[i] {
                    worsts[i] = value;
                }
            }
        }

        worsts.iter().zip(bests.iter()).map(|(w, b)| w - b).collect()
    }
}

impl<'a, D> IntoIterator for &'a Archive<D> {
    type Item = &'a Candidate<D>;
    type IntoIter = std::slice::Iter<'a, Candidate<D>>;

    fn into_iter(self) -> Self::IntoIter {
        self.members.iter()
    }
}
