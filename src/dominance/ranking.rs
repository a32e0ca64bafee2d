//! Fast non-dominated sorting.
//!
//! # References
//!
//! - Deb et al. (2002), "A Fast and Elitist Multiobjective Genetic Algorithm: NSGA-II"
//! - IEEE Transactions on Evolutionary Computation, 6(2), 182-197

use super::comparator::{DominanceComparator, SolutionComparator};
use crate::core::Solution;
use crate::error::{Error, Result};
use std::cmp::Ordering;

/// Result of index-based non-dominated sorting.
///
/// Each element of `ranks` corresponds to the Pareto rank of the solution
/// at the same index. Rank 0 is the Pareto front (non-dominated solutions).
#[derive(Debug, Clone)]
pub struct NondominatedSortResult {
    /// Pareto rank for each solution (0 = front).
    pub ranks: Vec<usize>,

    /// Indices grouped by front: `fronts[0]` contains rank-0 indices, etc.
    pub fronts: Vec<Vec<usize>>,
}

/// Fast non-dominated sorting over `n` items.
///
/// `dominance(i, j)` must return `Less` when item `i` dominates item `j`,
/// `Greater` when `j` dominates `i`, and `Equal` otherwise.
///
/// # Algorithm (Deb et al., 2002)
///
/// 1. For each pair, record who dominates whom and count how many times
///    each item is dominated
/// 2. Items dominated by no other belong to front 0
/// 3. Walk the current front, decrementing the counts of everything it
///    dominates; counts reaching zero form the next front
///
/// # Complexity
///
/// O(m * n²) where m = number of objectives, n = number of items
pub fn fast_non_dominated_sort<F>(n: usize, mut dominance: F) -> NondominatedSortResult
where
    F: FnMut(usize, usize) -> Ordering,
{
    if n == 0 {
        return NondominatedSortResult {
            ranks: Vec::new(),
            fronts: Vec::new(),
        };
    }

    let mut domination_count = vec![0usize; n];
    let mut dominates: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut ranks = vec![0usize; n];

    for p in 0..n {
        for q in (p + 1)..n {
            match dominance(p, q) {
                Ordering::Less => {
                    dominates[p].push(q);
                    domination_count[q] += 1;
                }
                Ordering::Greater => {
                    dominates[q].push(p);
                    domination_count[p] += 1;
                }
                Ordering::Equal => {}
            }
        }
    }

    let front_0: Vec<usize> = (0..n).filter(|&i| domination_count[i] == 0).collect();

    let mut fronts = Vec::new();
    let mut current = front_0;
    while !current.is_empty() {
        let mut next_front = Vec::new();

        for &p in &current {
            for &q in &dominates[p] {
                domination_count[q] -= 1;
                if domination_count[q] == 0 {
                    ranks[q] = fronts.len() + 1;
                    next_front.push(q);
                }
            }
        }

        fronts.push(current);
        current = next_front;
    }

    NondominatedSortResult { ranks, fronts }
}

/// Partitions a population into non-dominated fronts using the
/// constraint-aware [`DominanceComparator`].
///
/// Every solution gets its `rank` attribute stamped with its front index.
///
/// # Example
///
/// ```
/// use u_moea::core::{Bounds, Solution};
/// use u_moea::dominance::DominanceRanking;
///
/// let bounds: std::sync::Arc<[Bounds<f64>]> = vec![Bounds::new(0.0, 1.0)].into();
/// let make = |a: f64, b: f64| {
///     let mut s = Solution::new(vec![0.0], bounds.clone(), 2);
///     s.set_objective(0, a);
///     s.set_objective(1, b);
///     s
/// };
/// let ranking = DominanceRanking::compute(vec![
///     make(1.0, 5.0),
///     make(3.0, 3.0),
///     make(4.0, 4.0), // dominated by (3, 3)
/// ]);
/// assert_eq!(ranking.number_of_fronts(), 2);
/// assert_eq!(ranking.front(0).unwrap().len(), 2);
/// assert_eq!(ranking.front(1).unwrap()[0].attributes().rank, Some(1));
/// ```
#[derive(Debug, Clone)]
pub struct DominanceRanking<V> {
    fronts: Vec<Vec<Solution<V>>>,
}

impl<V> DominanceRanking<V> {
    /// Ranks `population`, consuming it.
    pub fn compute(population: Vec<Solution<V>>) -> Self {
        let comparator = DominanceComparator::new();
        let sorted = fast_non_dominated_sort(population.len(), |i, j| {
            comparator.compare(&population[i], &population[j])
        });

        let mut slots: Vec<Option<Solution<V>>> = population.into_iter().map(Some).collect();
        let fronts = sorted
            .fronts
            .iter()
            .enumerate()
            .map(|(rank, indices)| {
                indices
                    .iter()
                    .filter_map(|&i| slots[i].take())
                    .map(|mut s| {
                        s.attributes_mut().rank = Some(rank);
                        s
                    })
                    .collect()
            })
            .collect();

        Self { fronts }
    }

    /// Number of computed fronts.
    pub fn number_of_fronts(&self) -> usize {
        self.fronts.len()
    }

    /// The front at `index` (0 = non-dominated).
    ///
    /// # Errors
    /// Returns [`Error::FrontOutOfRange`] if `index` is not below
    /// [`number_of_fronts`](Self::number_of_fronts).
    pub fn front(&self, index: usize) -> Result<&[Solution<V>]> {
        self.fronts
            .get(index)
            .map(Vec::as_slice)
            .ok_or(Error::FrontOutOfRange {
                index,
                count: self.fronts.len(),
            })
    }

    /// Consumes the ranking, returning the fronts in rank order.
    pub fn into_fronts(self) -> Vec<Vec<Solution<V>>> {
        self.fronts
    }
}
