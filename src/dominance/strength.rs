//! SPEA2 fitness assignment and environmental selection.
//!
//! # References
//!
//! - Zitzler, Laumanns & Thiele (2001), "SPEA2: Improving the Strength
//!   Pareto Evolutionary Algorithm", TIK-Report 103, ETH Zürich

use super::comparator::{DominanceComparator, SolutionComparator, StrengthFitnessComparator};
use crate::core::Solution;
use crate::error::{Error, Result};
use std::cmp::Ordering;

/// SPEA2 fitness: raw fitness from dominance strengths plus a k-th nearest
/// neighbour density term.
///
/// - `strength(i)`: how many members `i` dominates
/// - `raw(i)`: sum of `strength(j)` over every `j` that dominates `i`
/// - `density(i) = 1 / (d_k(i) + 2)`, where `d_k` is the Euclidean distance
///   in objective space to the k-th nearest neighbour
///
/// The result is stamped into `strength_raw_fitness`; lower is better and
/// non-dominated members always score below `1.0`.
#[derive(Debug, Clone, Copy)]
pub struct StrengthRawFitness {
    k: usize,
}

impl Default for StrengthRawFitness {
    fn default() -> Self {
        Self { k: 1 }
    }
}

impl StrengthRawFitness {
    /// Uses the `k`-th nearest neighbour for the density term.
    ///
    /// # Errors
    /// Returns [`Error::InvalidConfig`] if `k` is zero, which would measure
    /// each solution's distance to itself.
    pub fn new(k: usize) -> Result<Self> {
        if k == 0 {
            return Err(Error::config("k must be at least 1"));
        }
        Ok(Self { k })
    }

    /// The neighbour index used for density.
    pub fn k(&self) -> usize {
        self.k
    }

    /// Computes and stamps the fitness of every member of `population`.
    ///
    /// # Errors
    /// Returns [`Error::InsufficientPool`] if a non-empty population has no
    /// `k`-th neighbour, i.e. holds `k` solutions or fewer.
    pub fn compute<V>(&self, population: &mut [Solution<V>]) -> Result<()> {
        let n = population.len();
        if n == 0 {
            return Ok(());
        }
        if self.k >= n {
            return Err(Error::InsufficientPool {
                requested: self.k + 1,
                available: n,
            });
        }

        let comparator = DominanceComparator::new();
        let mut strength = vec![0.0f64; n];
        let mut dominated_by: Vec<Vec<usize>> = vec![Vec::new(); n];

        for i in 0..n {
            for j in 0..n {
                if i != j && comparator.compare(&population[i], &population[j]) == Ordering::Less {
                    strength[i] += 1.0;
                    dominated_by[j].push(i);
                }
            }
        }

        let raw: Vec<f64> = dominated_by
            .iter()
            .map(|dominators| dominators.iter().map(|&j| strength[j]).sum())
            .collect();

        let distance = distance_matrix(population);
        for i in 0..n {
            let mut row = distance[i].clone();
            row.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
            // row[0] is the distance to itself.
            let density = 1.0 / (row[self.k] + 2.0);
            population[i].attributes_mut().strength_raw_fitness = Some(raw[i] + density);
        }
        Ok(())
    }
}

/// Pairwise Euclidean distances between objective vectors.
pub fn distance_matrix<V>(population: &[Solution<V>]) -> Vec<Vec<f64>> {
    let n = population.len();
    let mut distance = vec![vec![0.0; n]; n];
    for i in 0..n {
        for j in (i + 1)..n {
            let d = population[i].objective_distance(&population[j]);
            distance[i][j] = d;
            distance[j][i] = d;
        }
    }
    distance
}

/// SPEA2 archive truncation.
///
/// Solutions with fitness below `1.0` (non-dominated) are kept first. A
/// deficit is filled with the best remaining solutions by fitness; a surplus
/// is removed one at a time, always dropping the solution closest to its
/// nearest neighbour. Ties on that distance are broken by comparing the
/// second-nearest distances, then the third, and so on; on a complete tie
/// the earlier candidate is removed.
///
/// Requires [`StrengthRawFitness::compute`] to have run on the input.
#[derive(Debug, Clone, Copy)]
pub struct EnvironmentalSelection {
    size: usize,
}

impl EnvironmentalSelection {
    /// Creates a selection that keeps at most `size` solutions.
    pub fn new(size: usize) -> Self {
        Self { size }
    }

    /// Number of solutions kept.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Reduces `population` to `min(size, population.len())` solutions.
    pub fn execute<V>(&self, population: Vec<Solution<V>>) -> Vec<Solution<V>> {
        let size = self.size.min(population.len());
        if size == 0 {
            return Vec::new();
        }

        let fitness = |s: &Solution<V>| {
            s.attributes()
                .strength_raw_fitness
                .unwrap_or(f64::INFINITY)
        };
        let (mut candidates, mut rest): (Vec<_>, Vec<_>) =
            population.into_iter().partition(|s| fitness(s) < 1.0);

        if candidates.len() < size {
            rest.sort_by(|a, b| StrengthFitnessComparator.compare(a, b));
            let deficit = size - candidates.len();
            candidates.extend(rest.into_iter().take(deficit));
            return candidates;
        }
        if candidates.len() == size {
            return candidates;
        }

        truncate(candidates, size)
    }
}

/// Removes the most crowded candidates until `size` remain.
fn truncate<V>(candidates: Vec<Solution<V>>, size: usize) -> Vec<Solution<V>> {
    let distance = distance_matrix(&candidates);

    // For every candidate, its neighbours as (original index, distance),
    // nearest first.
    let mut neighbours: Vec<Vec<(usize, f64)>> = (0..candidates.len())
        .map(|pos| {
            let mut row: Vec<(usize, f64)> = (0..candidates.len())
                .filter(|&other| other != pos)
                .map(|other| (other, distance[pos][other]))
                .collect();
            row.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));
            row
        })
        .collect();
    let mut origin: Vec<usize> = (0..candidates.len()).collect();
    let mut slots: Vec<Option<Solution<V>>> = candidates.into_iter().map(Some).collect();

    while origin.len() > size {
        let mut to_remove = 0;
        let mut min_distance = f64::MAX;

        for (i, list) in neighbours.iter().enumerate() {
            let nearest = list[0].1;
            if nearest < min_distance {
                to_remove = i;
                min_distance = nearest;
            } else if nearest == min_distance {
                let current = &neighbours[to_remove];
                let mut k = 0;
                while k < list.len() - 1 && list[k].1 == current[k].1 {
                    k += 1;
                }
                if list[k].1 < current[k].1 {
                    to_remove = i;
                }
            }
        }

        let removed = origin.remove(to_remove);
        neighbours.remove(to_remove);
        slots[removed] = None;
        for list in &mut neighbours {
            list.retain(|&(other, _)| other != removed);
        }
    }

    origin
        .into_iter()
        .filter_map(|i| slots[i].take())
        .collect()
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

    fn fitness(s: &Solution<f64>) -> f64 {
        s.attributes().strength_raw_fitness.unwrap()
    }

    #[test]
    fn test_raw_fitness_values() {
        // a dominates b and c; b dominates c.
        let mut pop = vec![
            solution(&[0.0, 0.0]),
            solution(&[1.0, 1.0]),
            solution(&[2.0, 2.0]),
        ];
        StrengthRawFitness::default().compute(&mut pop).unwrap();
        // strengths: a=2, b=1, c=0 → raw: a=0, b=2, c=2+1=3
        let d_a = 1.0 / (2.0f64.sqrt() + 2.0);
        assert!((fitness(&pop[0]) - d_a).abs() < 1e-12);
        assert!((fitness(&pop[1]) - (2.0 + d_a)).abs() < 1e-12);
        assert!((fitness(&pop[2]) - (3.0 + d_a)).abs() < 1e-12);
    }

    #[test]
    fn test_non_dominated_below_one() {
        let mut pop = vec![
            solution(&[0.0, 3.0]),
            solution(&[1.0, 1.0]),
            solution(&[3.0, 0.0]),
            solution(&[4.0, 4.0]),
        ];
        StrengthRawFitness::default().compute(&mut pop).unwrap();
        assert!(fitness(&pop[0]) < 1.0);
        assert!(fitness(&pop[1]) < 1.0);
        assert!(fitness(&pop[2]) < 1.0);
        assert!(fitness(&pop[3]) >= 1.0);
    }

    #[test]
    fn test_zero_k_rejected() {
        assert!(matches!(
            StrengthRawFitness::new(0),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_k_beyond_population_rejected() {
        let mut pop = vec![
            solution(&[0.0, 2.0]),
            solution(&[1.0, 1.0]),
            solution(&[2.0, 0.0]),
        ];
        let result = StrengthRawFitness::new(50).unwrap().compute(&mut pop);
        assert!(matches!(
            result,
            Err(Error::InsufficientPool {
                requested: 51,
                available: 3
            })
        ));
        assert!(pop.iter().all(|s| s.attributes().strength_raw_fitness.is_none()));

        // The largest usable k is the last neighbour.
        StrengthRawFitness::new(2).unwrap().compute(&mut pop).unwrap();
        let far = 1.0 / (8.0f64.sqrt() + 2.0);
        assert!((fitness(&pop[0]) - far).abs() < 1e-12);
    }

    #[test]
    fn test_empty_population_is_noop() {
        let mut pop: Vec<Solution<f64>> = Vec::new();
        assert!(StrengthRawFitness::new(4).unwrap().compute(&mut pop).is_ok());
    }

    #[test]
    fn test_fills_deficit_by_fitness() {
        let mut pop = vec![
            solution(&[0.0, 0.0]),
            solution(&[3.0, 3.0]),
            solution(&[1.0, 1.0]),
            solution(&[2.0, 2.0]),
        ];
        StrengthRawFitness::default().compute(&mut pop).unwrap();
        let selected = EnvironmentalSelection::new(3).execute(pop);
        let firsts: Vec<f64> = selected.iter().map(|s| s.objective(0)).collect();
        assert_eq!(firsts, vec![0.0, 1.0, 2.0]);
    }

    #[test]
    fn test_truncation_removes_crowded() {
        let mut pop = vec![
            solution(&[0.0, 10.0]),
            solution(&[5.0, 5.0]),
            solution(&[5.1, 4.9]),
            solution(&[10.0, 0.0]),
        ];
        StrengthRawFitness::default().compute(&mut pop).unwrap();
        let selected = EnvironmentalSelection::new(3).execute(pop);
        assert_eq!(selected.len(), 3);
        assert!(selected.iter().any(|s| s.objective(0) == 0.0));
        assert!(selected.iter().any(|s| s.objective(0) == 10.0));
    }

    #[test]
    fn test_truncation_tie_break_uses_second_neighbour() {
        // Points 1 and 2 are the closest pair; point 2 has a closer second
        // neighbour (3), so it is the one removed.
        let mut pop = vec![
            solution(&[0.0, 10.0]),
            solution(&[4.0, 6.0]),
            solution(&[5.0, 5.0]),
            solution(&[7.0, 3.0]),
            solution(&[10.0, 0.0]),
        ];
        StrengthRawFitness::default().compute(&mut pop).unwrap();
        let selected = EnvironmentalSelection::new(4).execute(pop);
        let firsts: Vec<f64> = selected.iter().map(|s| s.objective(0)).collect();
        assert_eq!(firsts, vec![0.0, 4.0, 7.0, 10.0]);
    }

    #[test]
    fn test_smaller_population_returned_whole() {
        let mut pop = vec![solution(&[1.0, 2.0]), solution(&[2.0, 1.0])];
        StrengthRawFitness::default().compute(&mut pop).unwrap();
        assert_eq!(EnvironmentalSelection::new(10).execute(pop).len(), 2);
    }

    proptest! {
        #[test]
        fn prop_truncation_bounded_and_non_dominated(
            objectives in prop::collection::vec(prop::collection::vec(0.0f64..10.0, 2), 2..40),
            size in 1usize..20,
        ) {
            let mut pop: Vec<_> = objectives.iter().map(|o| solution(o)).collect();
            StrengthRawFitness::default().compute(&mut pop).unwrap();
            let candidates_were_non_dominated =
                pop.iter().filter(|s| fitness(s) < 1.0).count() >= size;

            let selected = EnvironmentalSelection::new(size).execute(pop);
            prop_assert!(selected.len() <= size);

            if candidates_were_non_dominated {
                let c = DominanceComparator::new();
                for a in &selected {
                    for b in &selected {
                        prop_assert_ne!(c.compare(a, b), Ordering::Less);
                    }
                }
            }
        }
    }
}
