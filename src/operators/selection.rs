//! Selection operators.
//!
//! Selection determines which solutions are chosen as parents. Every
//! operator returns an **index** into the population so callers can borrow
//! parents without copying them.
//!
//! # References
//!
//! - Blickle & Thiele (1996), "A Comparison of Selection Schemes used in
//!   Evolutionary Algorithms"
//! - Storn & Price (1997), "Differential Evolution: A Simple and Efficient
//!   Heuristic for Global Optimization over Continuous Spaces"

use crate::core::Solution;
use crate::dominance::{DominanceComparator, SolutionComparator};
use crate::error::{Error, Result};
use rand::seq::index;
use rand::{Rng, RngCore};
use std::cmp::Ordering;

/// Picks one solution from a population.
pub trait SelectionOperator<V>: Send + Sync {
    /// Returns the index of the selected solution.
    ///
    /// # Errors
    /// Returns [`Error::EmptyPopulation`] if `population` is empty.
    fn select(&self, population: &[Solution<V>], rng: &mut dyn RngCore) -> Result<usize>;
}

/// Tournament selection driven by a [`SolutionComparator`].
///
/// `size` distinct candidates are drawn at random (with replacement only
/// when the population is smaller than `size`) and the best one under the
/// comparator wins. When the comparator has no preference
/// between the incumbent and a challenger, one of the two is kept at
/// random.
///
/// Higher `size` = stronger selection pressure; `size == 2` is the classic
/// binary tournament.
///
/// # Complexity
/// O(size) per selection
pub struct TournamentSelection<V> {
    size: usize,
    comparator: Box<dyn SolutionComparator<V>>,
}

impl<V> std::fmt::Debug for TournamentSelection<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TournamentSelection")
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}

impl<V: 'static> TournamentSelection<V> {
    /// Creates an n-ary tournament.
    ///
    /// # Errors
    /// Returns [`Error::InvalidConfig`] if `size` is zero.
    pub fn new(size: usize, comparator: impl SolutionComparator<V> + 'static) -> Result<Self> {
        if size == 0 {
            return Err(Error::config("tournament size must be at least 1"));
        }
        Ok(Self {
            size,
            comparator: Box::new(comparator),
        })
    }

    /// Binary tournament with the given comparator.
    pub fn binary(comparator: impl SolutionComparator<V> + 'static) -> Self {
        Self {
            size: 2,
            comparator: Box::new(comparator),
        }
    }

    /// Binary tournament on constraint-aware Pareto dominance.
    pub fn binary_dominance() -> Self {
        Self::binary(DominanceComparator::new())
    }

    /// Number of candidates per tournament.
    pub fn size(&self) -> usize {
        self.size
    }
}

impl<V> SelectionOperator<V> for TournamentSelection<V> {
    fn select(&self, population: &[Solution<V>], rng: &mut dyn RngCore) -> Result<usize> {
        let n = population.len();
        if n == 0 {
            return Err(Error::EmptyPopulation);
        }
        if n == 1 {
            return Ok(0);
        }

        let candidates: Vec<usize> = if self.size <= n {
            index::sample(rng, n, self.size).into_vec()
        } else {
            (0..self.size).map(|_| rng.random_range(0..n)).collect()
        };

        let mut best = candidates[0];
        for &candidate in &candidates[1..] {
            match self.comparator.compare(&population[candidate], &population[best]) {
                Ordering::Less => best = candidate,
                Ordering::Equal => {
                    if rng.random_bool(0.5) {
                        best = candidate;
                    }
                }
                Ordering::Greater => {}
            }
        }
        Ok(best)
    }
}

/// Uniform random selection.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomSelection;

impl<V> SelectionOperator<V> for RandomSelection {
    fn select(&self, population: &[Solution<V>], rng: &mut dyn RngCore) -> Result<usize> {
        if population.is_empty() {
            return Err(Error::EmptyPopulation);
        }
        Ok(rng.random_range(0..population.len()))
    }
}

/// Donor selection for differential evolution.
///
/// For target index `i`, draws `count` distinct indices from the current
/// population, none of them equal to `i` unless `allow_target` is set.
#[derive(Debug, Clone, Copy, Default)]
pub struct DifferentialEvolutionSelection {
    allow_target: bool,
}

impl DifferentialEvolutionSelection {
    /// Donors never include the target.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allows the target itself to be drawn as a donor.
    pub fn with_target_allowed(mut self, allow: bool) -> Self {
        self.allow_target = allow;
        self
    }

    /// Draws `count` distinct donor indices for `target` out of a population
    /// of `population_size`.
    ///
    /// # Errors
    /// Returns [`Error::InsufficientPool`] if the population cannot supply
    /// that many distinct donors, or [`Error::InvalidState`] if `target` is
    /// out of range.
    pub fn select(
        &self,
        target: usize,
        population_size: usize,
        count: usize,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<usize>> {
        if target >= population_size {
            return Err(Error::state(format!(
                "target index {target} outside a population of {population_size}"
            )));
        }
        let available = if self.allow_target {
            population_size
        } else {
            population_size - 1
        };
        if count > available {
            return Err(Error::InsufficientPool {
                requested: count,
                available,
            });
        }

        if self.allow_target {
            return Ok(index::sample(rng, population_size, count).into_vec());
        }
        // Sample from the pool without the target, then shift indices past it.
        Ok(index::sample(rng, available, count)
            .into_iter()
            .map(|i| if i >= target { i + 1 } else { i })
            .collect())
    }
}
