//! NSGA-II: elitist non-dominated sorting genetic algorithm.
//!
//! # Key Types
//!
//! - [`Nsga2Config`]: population sizes, evaluation budget, operator
//!   parameters
//! - [`Nsga2`]: the stepwise [`Algorithm`](crate::algorithm::Algorithm)
//!
//! # References
//!
//! - Deb, Pratap, Agarwal & Meyarivan (2002), "A Fast and Elitist
//!   Multiobjective Genetic Algorithm: NSGA-II", IEEE TEC 6(2), 182-197

mod config;
mod runner;

pub use config::Nsga2Config;
pub use runner::Nsga2;
