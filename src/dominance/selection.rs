//! Ranking-and-crowding environmental selection (NSGA-II replacement).

use super::comparator::{CrowdingDistanceComparator, SolutionComparator};
use super::crowding::CrowdingDistance;
use super::ranking::DominanceRanking;
use crate::core::Solution;
use crate::error::{Error, Result};

/// Reduces a combined population to exactly `size` solutions.
///
/// Whole fronts are taken in rank order while they fit; the first front that
/// does not fit is sorted by descending crowding distance and truncated.
#[derive(Debug, Clone, Copy)]
pub struct RankingAndCrowdingSelection {
    size: usize,
}

impl RankingAndCrowdingSelection {
    /// Creates a selection that keeps `size` solutions.
    pub fn new(size: usize) -> Self {
        Self { size }
    }

    /// Number of solutions kept.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Selects `size` solutions from `population`.
    ///
    /// Every returned solution carries its `rank`; members of the fronts
    /// that were fully taken and of the truncated front also carry their
    /// `crowding_distance`.
    ///
    /// # Errors
    /// Returns [`Error::InsufficientPool`] when `population` holds fewer than
    /// `size` solutions.
    pub fn execute<V>(&self, population: Vec<Solution<V>>) -> Result<Vec<Solution<V>>> {
        if population.len() < self.size {
            return Err(Error::InsufficientPool {
                requested: self.size,
                available: population.len(),
            });
        }

        let ranking = DominanceRanking::compute(population);
        let mut selected = Vec::with_capacity(self.size);

        for mut front in ranking.into_fronts() {
            let remaining = self.size - selected.len();
            if remaining == 0 {
                break;
            }
            CrowdingDistance::assign(&mut front);
            if front.len() <= remaining {
                selected.extend(front);
            } else {
                front.sort_by(|a, b| CrowdingDistanceComparator.compare(a, b));
                front.truncate(remaining);
                selected.extend(front);
            }
        }

        Ok(selected)
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
    fn test_takes_whole_fronts() {
        let pop = vec![
            solution(&[1.0, 5.0]),
            solution(&[5.0, 1.0]),
            solution(&[6.0, 6.0]),
            solution(&[3.0, 3.0]),
        ];
        let selected = RankingAndCrowdingSelection::new(3).execute(pop).unwrap();
        assert_eq!(selected.len(), 3);
        assert!(selected.iter().all(|s| s.attributes().rank == Some(0)));
    }

    #[test]
    fn test_truncates_by_crowding() {
        let pop = vec![
            solution(&[0.0, 10.0]),
            solution(&[4.9, 5.1]),
            solution(&[5.0, 5.0]),
            solution(&[10.0, 0.0]),
        ];
        let selected = RankingAndCrowdingSelection::new(3).execute(pop).unwrap();
        assert_eq!(selected.len(), 3);
        // Both extremes survive; one of the two crowded middle points goes.
        assert!(selected.iter().any(|s| s.objective(0) == 0.0));
        assert!(selected.iter().any(|s| s.objective(0) == 10.0));
    }

    #[test]
    fn test_insufficient_pool() {
        let pop = vec![solution(&[1.0, 1.0])];
        assert!(matches!(
            RankingAndCrowdingSelection::new(2).execute(pop),
            Err(Error::InsufficientPool { requested: 2, available: 1 })
        ));
    }

    #[test]
    fn test_zero_size_selects_nothing() {
        let pop = vec![solution(&[1.0, 1.0])];
        let selected = RankingAndCrowdingSelection::new(0).execute(pop).unwrap();
        assert!(selected.is_empty());
    }

    proptest! {
        #[test]
        fn prop_exact_size_and_no_rank_inversion(
            objectives in prop::collection::vec(prop::collection::vec(0.0f64..10.0, 2), 1..50),
            k_frac in 0.0f64..1.0,
        ) {
            let m = objectives.len();
            let k = ((m as f64) * k_frac) as usize;
            let pop: Vec<_> = objectives.iter().map(|o| solution(o)).collect();

            let all_ranks: Vec<usize> = DominanceRanking::compute(pop.clone())
                .into_fronts()
                .into_iter()
                .enumerate()
                .flat_map(|(r, f)| std::iter::repeat(r).take(f.len()))
                .collect();

            let selected = RankingAndCrowdingSelection::new(k).execute(pop).unwrap();
            prop_assert_eq!(selected.len(), k);

            // Selected ranks are exactly the k smallest ranks of the pool.
            let mut ranks = all_ranks;
            ranks.sort_unstable();
            let mut selected_ranks: Vec<usize> = selected
                .iter()
                .map(|s| s.attributes().rank.unwrap())
                .collect();
            selected_ranks.sort_unstable();
            prop_assert_eq!(selected_ranks, ranks[..k].to_vec());
        }
    }
}
