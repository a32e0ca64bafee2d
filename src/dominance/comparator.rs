//! Solution comparators.
//!
//! Every comparator returns [`Ordering::Less`] when the first solution is
//! preferred, [`Ordering::Greater`] when the second one is, and
//! [`Ordering::Equal`] when it has no preference.

use crate::core::Solution;
use crate::error::{Error, Result};
use std::cmp::Ordering;
use std::sync::Arc;

/// Orders two solutions by preference.
pub trait SolutionComparator<V>: Send + Sync {
    /// Compares `a` against `b`; `Less` means `a` is better.
    fn compare(&self, a: &Solution<V>, b: &Solution<V>) -> Ordering;
}

impl<V, C: SolutionComparator<V> + ?Sized> SolutionComparator<V> for Arc<C> {
    fn compare(&self, a: &Solution<V>, b: &Solution<V>) -> Ordering {
        (**self).compare(a, b)
    }
}

/// Prefers the solution with the smaller constraint violation.
///
/// Both infeasible: the violation closer to zero wins. A feasible solution
/// beats an infeasible one. When neither solution carries a violation value
/// the comparator has no opinion.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConstraintViolationComparator;

impl<V> SolutionComparator<V> for ConstraintViolationComparator {
    fn compare(&self, a: &Solution<V>, b: &Solution<V>) -> Ordering {
        let va = a.attributes().overall_constraint_violation;
        let vb = b.attributes().overall_constraint_violation;
        if va.is_none() && vb.is_none() {
            return Ordering::Equal;
        }
        let va = va.unwrap_or(0.0);
        let vb = vb.unwrap_or(0.0);
        match (va < 0.0, vb < 0.0) {
            (true, true) => vb.partial_cmp(&va).unwrap_or(Ordering::Equal),
            (false, true) => Ordering::Less,
            (true, false) => Ordering::Greater,
            (false, false) => Ordering::Equal,
        }
    }
}

/// Constraint-aware Pareto dominance (minimization).
///
/// Constraint violation is consulted first; if it has no preference the
/// objectives decide: `Less` when only `a` is strictly better somewhere,
/// `Greater` when only `b` is, `Equal` when neither or both are.
#[derive(Debug, Clone, Copy, Default)]
pub struct DominanceComparator {
    constraints: ConstraintViolationComparator,
}

impl DominanceComparator {
    /// Creates the comparator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Like [`compare`](SolutionComparator::compare) but reports an
    /// objective count mismatch as an error instead of panicking.
    pub fn try_compare<V>(&self, a: &Solution<V>, b: &Solution<V>) -> Result<Ordering> {
        if a.number_of_objectives() != b.number_of_objectives() {
            return Err(Error::ObjectiveCountMismatch {
                left: a.number_of_objectives(),
                right: b.number_of_objectives(),
            });
        }
        let by_constraints = self.constraints.compare(a, b);
        if by_constraints != Ordering::Equal {
            return Ok(by_constraints);
        }
        Ok(pareto_dominance(a.objectives(), b.objectives()))
    }
}

impl<V> SolutionComparator<V> for DominanceComparator {
    /// # Panics
    /// Panics if the solutions have different objective counts.
    fn compare(&self, a: &Solution<V>, b: &Solution<V>) -> Ordering {
        assert_eq!(
            a.number_of_objectives(),
            b.number_of_objectives(),
            "cannot compare solutions with different objective counts"
        );
        let by_constraints = self.constraints.compare(a, b);
        if by_constraints != Ordering::Equal {
            return by_constraints;
        }
        pareto_dominance(a.objectives(), b.objectives())
    }
}

/// Plain Pareto dominance over two objective vectors (minimization).
pub fn pareto_dominance(a: &[f64], b: &[f64]) -> Ordering {
    let mut best_is_one = false;
    let mut best_is_two = false;

    for (&va, &vb) in a.iter().zip(b.iter()) {
        if va < vb {
            best_is_one = true;
        } else if vb < va {
            best_is_two = true;
        }
    }

    match (best_is_one, best_is_two) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        _ => Ordering::Equal,
    }
}

/// Orders by a single objective.
#[derive(Debug, Clone, Copy)]
pub struct ObjectiveComparator {
    index: usize,
    descending: bool,
}

impl ObjectiveComparator {
    /// Ascending order on objective `index` (lower is better).
    pub fn new(index: usize) -> Self {
        Self {
            index,
            descending: false,
        }
    }

    /// Descending order on objective `index`.
    pub fn descending(index: usize) -> Self {
        Self {
            index,
            descending: true,
        }
    }
}

impl<V> SolutionComparator<V> for ObjectiveComparator {
    fn compare(&self, a: &Solution<V>, b: &Solution<V>) -> Ordering {
        let ord = a.objectives()[self.index]
            .partial_cmp(&b.objectives()[self.index])
            .unwrap_or(Ordering::Equal);
        if self.descending {
            ord.reverse()
        } else {
            ord
        }
    }
}

/// Prefers the larger crowding distance. Missing distances count as `0.0`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CrowdingDistanceComparator;

impl<V> SolutionComparator<V> for CrowdingDistanceComparator {
    fn compare(&self, a: &Solution<V>, b: &Solution<V>) -> Ordering {
        let da = a.attributes().crowding_distance.unwrap_or(0.0);
        let db = b.attributes().crowding_distance.unwrap_or(0.0);
        db.partial_cmp(&da).unwrap_or(Ordering::Equal)
    }
}

/// Prefers the lower front rank. Unranked solutions sort last.
#[derive(Debug, Clone, Copy, Default)]
pub struct RankingComparator;

impl<V> SolutionComparator<V> for RankingComparator {
    fn compare(&self, a: &Solution<V>, b: &Solution<V>) -> Ordering {
        let ra = a.attributes().rank.unwrap_or(usize::MAX);
        let rb = b.attributes().rank.unwrap_or(usize::MAX);
        ra.cmp(&rb)
    }
}

/// NSGA-II crowded comparison: lower rank first, then larger crowding
/// distance.
#[derive(Debug, Clone, Copy, Default)]
pub struct RankingAndCrowdingComparator;

impl<V> SolutionComparator<V> for RankingAndCrowdingComparator {
    fn compare(&self, a: &Solution<V>, b: &Solution<V>) -> Ordering {
        RankingComparator
            .compare(a, b)
            .then_with(|| CrowdingDistanceComparator.compare(a, b))
    }
}

/// Prefers the lower SPEA2 strength raw fitness. Missing values sort last.
#[derive(Debug, Clone, Copy, Default)]
pub struct StrengthFitnessComparator;

impl<V> SolutionComparator<V> for StrengthFitnessComparator {
    fn compare(&self, a: &Solution<V>, b: &Solution<V>) -> Ordering {
        let fa = a.attributes().strength_raw_fitness.unwrap_or(f64::INFINITY);
        let fb = b.attributes().strength_raw_fitness.unwrap_or(f64::INFINITY);
        fa.partial_cmp(&fb).unwrap_or(Ordering::Equal)
    }
}
