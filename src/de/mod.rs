//! Differential evolution for single-objective problems.
//!
//! Use [`DeVariant`](crate::operators::DeVariant) to pick the scheme
//! (`rand/1/bin` by default).
//!
//! # References
//!
//! - Storn & Price (1997), "Differential Evolution: A Simple and Efficient
//!   Heuristic for Global Optimization over Continuous Spaces", J. Global
//!   Optimization 11, 341-359

mod config;
mod runner;

pub use config::DeConfig;
pub use runner::DifferentialEvolution;
