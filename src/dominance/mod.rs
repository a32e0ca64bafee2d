//! Pareto dominance and density machinery.
//!
//! Domain-agnostic building blocks shared by the multi-objective families.
//! All objectives are **minimized**.
//!
//! # Algorithms
//!
//! - [`DominanceComparator`]: constraint-aware Pareto dominance
//! - [`DominanceRanking`]: fast non-dominated sorting into fronts
//! - [`CrowdingDistance`]: crowding distance density estimation
//! - [`RankingAndCrowdingSelection`]: NSGA-II environmental selection
//! - [`StrengthRawFitness`] / [`EnvironmentalSelection`]: SPEA2 fitness and
//!   archive truncation

mod comparator;
mod crowding;
mod ranking;
mod selection;
mod strength;

pub use comparator::{
    pareto_dominance, ConstraintViolationComparator, CrowdingDistanceComparator,
    DominanceComparator, ObjectiveComparator, RankingAndCrowdingComparator, RankingComparator,
    SolutionComparator, StrengthFitnessComparator,
};
pub use crowding::{crowding_distances, CrowdingDistance, DensityEstimator};
pub use ranking::{fast_non_dominated_sort, DominanceRanking, NondominatedSortResult};
pub use selection::RankingAndCrowdingSelection;
pub use strength::{distance_matrix, EnvironmentalSelection, StrengthRawFitness};
