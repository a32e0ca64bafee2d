//! Non-dominated solution archives.
//!
//! - [`NonDominatedArchive`]: unbounded, keeps a mutually non-dominated set
//! - [`BoundedArchive`]: capacity-limited; evicts the least diverse member
//!   according to a pluggable [`DensityEstimator`]
//!
//! SMPSO keeps its leaders in a [`BoundedArchive`] with
//! [`CrowdingDistance`].

use crate::core::Solution;
use crate::dominance::{
    CrowdingDistance, DensityEstimator, DominanceComparator, SolutionComparator,
};
use std::cmp::Ordering;

/// Unbounded archive of mutually non-dominated solutions.
///
/// A candidate is rejected when a member dominates it or when a member has
/// exactly the same objective vector. On insertion, every member the
/// candidate dominates is removed.
#[derive(Debug, Clone)]
pub struct NonDominatedArchive<V> {
    solutions: Vec<Solution<V>>,
    comparator: DominanceComparator,
}

impl<V> Default for NonDominatedArchive<V> {
    fn default() -> Self {
        Self {
            solutions: Vec::new(),
            comparator: DominanceComparator::new(),
        }
    }
}

impl<V> NonDominatedArchive<V> {
    /// Creates an empty archive.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an archive holding the non-dominated subset of `solutions`.
    pub fn from_solutions(solutions: impl IntoIterator<Item = Solution<V>>) -> Self {
        let mut archive = Self::new();
        for s in solutions {
            archive.add(s);
        }
        archive
    }

    /// Offers `solution` to the archive; returns whether it was inserted.
    pub fn add(&mut self, solution: Solution<V>) -> bool {
        let mut i = 0;
        while i < self.solutions.len() {
            match self.comparator.compare(&solution, &self.solutions[i]) {
                Ordering::Less => {
                    self.solutions.remove(i);
                }
                Ordering::Greater => return false,
                Ordering::Equal => {
                    if solution.objectives() == self.solutions[i].objectives() {
                        return false;
                    }
                    i += 1;
                }
            }
        }
        self.solutions.push(solution);
        true
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.solutions.len()
    }

    /// Whether the archive is empty.
    pub fn is_empty(&self) -> bool {
        self.solutions.is_empty()
    }

    /// Members, in insertion order.
    pub fn solutions(&self) -> &[Solution<V>] {
        &self.solutions
    }

    /// Mutable members, for recomputing density attributes in place.
    pub(crate) fn solutions_mut(&mut self) -> &mut [Solution<V>] {
        &mut self.solutions
    }

    pub(crate) fn remove(&mut self, index: usize) -> Solution<V> {
        self.solutions.remove(index)
    }

    /// Consumes the archive, returning its members.
    pub fn into_solutions(self) -> Vec<Solution<V>> {
        self.solutions
    }
}

/// Capacity-limited non-dominated archive.
///
/// Behaves like [`NonDominatedArchive`]; when an insertion pushes the size
/// above `capacity`, densities are recomputed and the member the estimator
/// ranks last is evicted (possibly the newcomer itself).
#[derive(Debug, Clone)]
pub struct BoundedArchive<V, D = CrowdingDistance> {
    archive: NonDominatedArchive<V>,
    capacity: usize,
    density: D,
}

impl<V> BoundedArchive<V, CrowdingDistance> {
    /// Creates a crowding-distance archive with the given capacity.
    pub fn with_crowding_distance(capacity: usize) -> Self {
        Self::new(capacity, CrowdingDistance)
    }
}

impl<V, D: DensityEstimator<V>> BoundedArchive<V, D> {
    /// Creates an empty archive.
    ///
    /// # Panics
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize, density: D) -> Self {
        assert!(capacity > 0, "archive capacity must be positive");
        Self {
            archive: NonDominatedArchive::new(),
            capacity,
            density,
        }
    }

    /// Offers `solution`; returns whether it remains in the archive.
    pub fn add(&mut self, solution: Solution<V>) -> bool {
        if !self.archive.add(solution) {
            return false;
        }
        if self.archive.len() > self.capacity {
            let evicted = self.prune();
            return evicted != self.archive.len();
        }
        true
    }

    /// Evicts the worst member; returns the index it occupied. Among equally
    /// ranked members the oldest goes.
    fn prune(&mut self) -> usize {
        self.compute_density_estimator();
        let solutions = self.archive.solutions();
        let mut worst = 0;
        for (i, s) in solutions.iter().enumerate().skip(1) {
            if self.density.compare(s, &solutions[worst]) == Ordering::Greater {
                worst = i;
            }
        }
        self.archive.remove(worst);
        worst
    }

    /// Recomputes the density attribute of every member.
    pub fn compute_density_estimator(&mut self) {
        self.density.compute(self.archive.solutions_mut());
    }

    /// Maximum number of members.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.archive.len()
    }

    /// Whether the archive is empty.
    pub fn is_empty(&self) -> bool {
        self.archive.is_empty()
    }

    /// Members, in insertion order.
    pub fn solutions(&self) -> &[Solution<V>] {
        self.archive.solutions()
    }

    /// Consumes the archive, returning its members.
    pub fn into_solutions(self) -> Vec<Solution<V>> {
        self.archive.into_solutions()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Bounds;
    use proptest::prelude::*;
    use std::sync::Arc;

    fn solution(objectives: &[f64]) -> Solution<f64> {
        let bounds: Arc<[Bounds<f64>]> = vec![Bounds::new(0.0, 1.0)].into();
        let mut s = Solution::new(vec![0.0], bounds, objectives.len());
        for (i, &v) in objectives.iter().enumerate() {
            s.set_objective(i, v);
        }
        s
    }

    #[test]
    fn test_rejects_dominated() {
        let mut archive = NonDominatedArchive::new();
        assert!(archive.add(solution(&[1.0, 1.0])));
        assert!(!archive.add(solution(&[2.0, 2.0])));
        assert_eq!(archive.len(), 1);
    }

    #[test]
    fn test_removes_newly_dominated() {
        let mut archive = NonDominatedArchive::new();
        archive.add(solution(&[2.0, 5.0]));
        archive.add(solution(&[5.0, 2.0]));
        archive.add(solution(&[3.0, 3.0]));
        assert_eq!(archive.len(), 3);
        assert!(archive.add(solution(&[1.0, 1.0])));
        assert_eq!(archive.len(), 1);
        assert_eq!(archive.solutions()[0].objectives(), &[1.0, 1.0]);
    }

    #[test]
    fn test_rejects_duplicates() {
        let mut archive = NonDominatedArchive::new();
        assert!(archive.add(solution(&[1.0, 2.0])));
        assert!(!archive.add(solution(&[1.0, 2.0])));
        assert_eq!(archive.len(), 1);
    }

    #[test]
    fn test_bounded_evicts_most_crowded() {
        let mut archive = BoundedArchive::with_crowding_distance(3);
        archive.add(solution(&[0.0, 10.0]));
        archive.add(solution(&[10.0, 0.0]));
        archive.add(solution(&[5.0, 5.0]));
        archive.add(solution(&[5.1, 4.9]));
        assert_eq!(archive.len(), 3);
        let firsts: Vec<f64> = archive.solutions().iter().map(|s| s.objective(0)).collect();
        assert!(firsts.contains(&0.0));
        assert!(firsts.contains(&10.0));
    }

    #[test]
    fn test_bounded_reports_evicted_newcomer() {
        let mut archive = BoundedArchive::with_crowding_distance(2);
        assert!(archive.add(solution(&[0.0, 10.0])));
        assert!(archive.add(solution(&[10.0, 0.0])));
        // A front of three: both extremes are infinite, the middle one goes.
        assert!(!archive.add(solution(&[5.0, 5.0])));
        assert_eq!(archive.len(), 2);
    }

    #[test]
    fn test_bounded_tie_evicts_oldest() {
        // Fronts of one or two members are all infinitely distant, so every
        // member ties and the oldest is evicted.
        let mut archive = BoundedArchive::with_crowding_distance(1);
        assert!(archive.add(solution(&[0.0, 10.0])));
        assert!(archive.add(solution(&[10.0, 0.0])));
        assert!(archive.add(solution(&[5.0, 5.0])));
        assert_eq!(archive.len(), 1);
        assert_eq!(archive.solutions()[0].objectives(), &[5.0, 5.0]);
    }

    #[test]
    #[should_panic(expected = "archive capacity must be positive")]
    fn test_zero_capacity_panics() {
        let _ = BoundedArchive::<f64>::with_crowding_distance(0);
    }

    proptest! {
        #[test]
        fn prop_bounded_archive_invariants(
            objectives in prop::collection::vec(prop::collection::vec(0.0f64..10.0, 2), 1..80),
            capacity in 1usize..15,
        ) {
            let mut archive = BoundedArchive::with_crowding_distance(capacity);
            for o in &objectives {
                archive.add(solution(o));
                prop_assert!(archive.len() <= capacity);
            }
            let c = DominanceComparator::new();
            for a in archive.solutions() {
                for b in archive.solutions() {
                    prop_assert_ne!(c.compare(a, b), Ordering::Less);
                }
            }
        }
    }
}
