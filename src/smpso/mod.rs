//! SMPSO: speed-constrained multi-objective particle swarm optimization.
//!
//! # Key Types
//!
//! - [`SmpsoConfig`]: swarm and leaders sizes, coefficient ranges,
//!   velocity factors
//! - [`Smpso`]: the stepwise [`Algorithm`](crate::algorithm::Algorithm)
//!
//! # References
//!
//! - Nebro, Durillo, Garcia-Nieto, Coello Coello, Luna & Alba (2009),
//!   "SMPSO: A New PSO-based Metaheuristic for Multi-objective
//!   Optimization", IEEE MCDM, 66-73

mod config;
mod runner;

pub use config::SmpsoConfig;
pub use runner::Smpso;
