//! Crowding distance density estimation.

use super::comparator::{CrowdingDistanceComparator, SolutionComparator};
use crate::core::Solution;
use std::cmp::Ordering;

/// A density measure computed over a set of solutions.
///
/// Used by the bounded archive to decide which member to evict: after
/// [`compute`](Self::compute), [`compare`](Self::compare) must order
/// solutions from most to least worth keeping.
pub trait DensityEstimator<V>: Send + Sync {
    /// Recomputes the density attribute of every solution in `solutions`.
    fn compute(&self, solutions: &mut [Solution<V>]);

    /// `Less` when `a` is more worth keeping than `b`.
    fn compare(&self, a: &Solution<V>, b: &Solution<V>) -> Ordering;
}

/// Crowding distance assignment for diversity preservation.
///
/// Measures how isolated each solution of a front is in objective space.
/// Higher distance means more diverse, hence preferred.
///
/// # Algorithm (Deb et al., 2002)
///
/// For each objective:
/// 1. Sort the front by objective value
/// 2. Assign infinity to the two boundary solutions
/// 3. For interior solutions, add `(next - prev) / (max - min)`
///
/// Distances accumulate over objectives. An objective with zero range adds
/// nothing. Fronts with one or two members get infinity everywhere.
///
/// # Complexity
///
/// O(m * n * log n) where m = number of objectives, n = front size
#[derive(Debug, Clone, Copy, Default)]
pub struct CrowdingDistance;

impl CrowdingDistance {
    /// Stamps the `crowding_distance` attribute of every member of `front`.
    pub fn assign<V>(front: &mut [Solution<V>]) {
        let n = front.len();
        if n == 0 {
            return;
        }
        if n <= 2 {
            for s in front.iter_mut() {
                s.attributes_mut().crowding_distance = Some(f64::INFINITY);
            }
            return;
        }

        let distances = crowding_distances(front);
        for (s, d) in front.iter_mut().zip(distances) {
            s.attributes_mut().crowding_distance = Some(d);
        }
    }
}

impl<V> DensityEstimator<V> for CrowdingDistance {
    fn compute(&self, solutions: &mut [Solution<V>]) {
        Self::assign(solutions);
    }

    fn compare(&self, a: &Solution<V>, b: &Solution<V>) -> Ordering {
        CrowdingDistanceComparator.compare(a, b)
    }
}

/// Crowding distance of every solution, in input order.
pub fn crowding_distances<V>(front: &[Solution<V>]) -> Vec<f64> {
    let n = front.len();
    if n <= 2 {
        return vec![f64::INFINITY; n];
    }

    let m = front[0].number_of_objectives();
    let mut distances = vec![0.0f64; n];

    for obj_idx in 0..m {
        let mut indices: Vec<usize> = (0..n).collect();
        indices.sort_by(|&a, &b| {
            front[a]
                .objective(obj_idx)
                .partial_cmp(&front[b].objective(obj_idx))
                .unwrap_or(Ordering::Equal)
        });

        distances[indices[0]] = f64::INFINITY;
        distances[indices[n - 1]] = f64::INFINITY;

        let min_val = front[indices[0]].objective(obj_idx);
        let max_val = front[indices[n - 1]].objective(obj_idx);
        let range = max_val - min_val;

        if range > 0.0 {
            for i in 1..(n - 1) {
                let prev = front[indices[i - 1]].objective(obj_idx);
                let next = front[indices[i + 1]].objective(obj_idx);
                distances[indices[i]] += (next - prev) / range;
            }
        }
    }

    distances
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Bounds;
    use proptest::prelude::*;
    use std::sync::Arc;

    fn front(objectives: &[Vec<f64>]) -> Vec<Solution<f64>> {
        let bounds: Arc<[Bounds<f64>]> = vec![Bounds::new(0.0, 1.0)].into();
        objectives
            .iter()
            .map(|o| {
                let mut s = Solution::new(vec![0.0], bounds.clone(), o.len());
                for (i, &v) in o.iter().enumerate() {
                    s.set_objective(i, v);
                }
                s
            })
            .collect()
    }

    fn distance(s: &Solution<f64>) -> f64 {
        s.attributes().crowding_distance.unwrap()
    }

    #[test]
    fn test_empty_front_is_noop() {
        let mut f: Vec<Solution<f64>> = Vec::new();
        CrowdingDistance::assign(&mut f);
        assert!(f.is_empty());
    }

    #[test]
    fn test_small_fronts_are_infinite() {
        let mut one = front(&[vec![1.0, 2.0]]);
        CrowdingDistance::assign(&mut one);
        assert!(distance(&one[0]).is_infinite());

        let mut two = front(&[vec![1.0, 3.0], vec![3.0, 1.0]]);
        CrowdingDistance::assign(&mut two);
        assert!(two.iter().all(|s| distance(s).is_infinite()));
    }

    #[test]
    fn test_evenly_spaced() {
        let mut f = front(&[
            vec![0.0, 4.0],
            vec![1.0, 3.0],
            vec![2.0, 2.0],
            vec![3.0, 1.0],
            vec![4.0, 0.0],
        ]);
        CrowdingDistance::assign(&mut f);
        assert!(distance(&f[0]).is_infinite());
        assert!(distance(&f[4]).is_infinite());
        // Each interior point: 2/4 per objective, summed over two objectives.
        for s in &f[1..4] {
            assert!((distance(s) - 1.0).abs() < 1e-12, "got {}", distance(s));
        }
    }

    #[test]
    fn test_zero_range_objective() {
        let mut f = front(&[vec![1.0, 5.0], vec![2.0, 5.0], vec![3.0, 5.0]]);
        CrowdingDistance::assign(&mut f);
        assert!(distance(&f[0]).is_infinite());
        assert!(distance(&f[2]).is_infinite());
        // Only the first objective contributes; the second is degenerate.
        // With identical values on the degenerate axis the sort is stable,
        // so its boundaries are again f[0] and f[2].
        assert!((distance(&f[1]) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_density_estimator_prefers_isolated() {
        let mut f = front(&[vec![0.0, 10.0], vec![1.0, 9.0], vec![1.2, 8.8], vec![10.0, 0.0]]);
        DensityEstimator::compute(&CrowdingDistance, &mut f);
        assert_eq!(
            DensityEstimator::compare(&CrowdingDistance, &f[0], &f[1]),
            Ordering::Less
        );
    }

    proptest! {
        #[test]
        fn prop_extremes_are_infinite(
            objectives in prop::collection::vec(prop::collection::vec(-50.0f64..50.0, 3), 3..30)
        ) {
            let mut f = front(&objectives);
            CrowdingDistance::assign(&mut f);
            for k in 0..3 {
                let min = objectives.iter().map(|o| o[k]).fold(f64::INFINITY, f64::min);
                let max = objectives.iter().map(|o| o[k]).fold(f64::NEG_INFINITY, f64::max);
                // At least one solution holding each extreme value is a boundary.
                prop_assert!(f.iter().any(|s| s.objective(k) == min && distance(s).is_infinite()));
                prop_assert!(f.iter().any(|s| s.objective(k) == max && distance(s).is_infinite()));
            }
            prop_assert!(f.iter().all(|s| distance(s) >= 0.0));
        }
    }
}
