//! Genetic Algorithm for single-objective problems.
//!
//! Runs on the same [`Problem`](crate::core::Problem) and operator
//! contracts as the multi-objective families and ranks solutions by
//! objective 0 unless another comparator is supplied.
//!
//! # Key Types
//!
//! - [`GaConfig`]: Algorithm parameters (population size, budget, operators)
//! - [`GaVariant`]: generational or steady-state replacement
//! - [`GeneticAlgorithm`]: the stepwise [`Algorithm`](crate::algorithm::Algorithm)
//!
//! # References
//!
//! - Holland (1975), *Adaptation in Natural and Artificial Systems*
//! - Goldberg (1989), *Genetic Algorithms in Search, Optimization, and Machine Learning*
//! - De Jong (2006), *Evolutionary Computation: A Unified Approach*

mod config;
mod runner;

pub use config::{GaConfig, GaVariant};
pub use runner::GeneticAlgorithm;
