//! Stepwise multi/single-objective evolutionary optimization engine.
//!
//! Provides population-based metaheuristics that share one life-cycle,
//! pluggable variation operators and Pareto-dominance machinery:
//!
//! - **NSGA-II**: elitist non-dominated sorting with crowding-distance
//!   diversity preservation.
//! - **SPEA2**: strength Pareto fitness with a k-th nearest neighbor
//!   truncated archive.
//! - **SMPSO**: speed-constrained multi-objective particle swarm with a
//!   bounded leaders archive.
//! - **Differential Evolution (DE)**: single-objective DE with the classic
//!   rand/best/current-to variants.
//! - **Genetic Algorithm (GA)**: single-objective GA, generational or
//!   steady-state.
//!
//! All objectives are minimized. Every algorithm implements
//! [`Algorithm`](algorithm::Algorithm), which can be driven one generation
//! at a time (`init_progress`, `step`, `is_stopping_condition_reached`,
//! `result`) or run to completion. The [`experiment`] module runs an
//! algorithm on a worker thread with cancellation and progress reporting.
//!
//! # Architecture
//!
//! Problems implement [`Problem`](crate::core::Problem) and are evaluated through
//! [`Solution`](crate::core::Solution)s carrying typed attributes (rank, crowding
//! distance, constraint violation, strength fitness). Randomness is always
//! passed explicitly from a seedable generator, so equal seeds give equal
//! runs.
//!
//! # Features
//!
//! - `parallel`: rayon-parallel population evaluation (`config.parallel`)
//! - `serde`: `Serialize`/`Deserialize` for configs and solutions

pub mod algorithm;
pub mod archive;
pub mod core;
pub mod de;
pub mod dominance;
pub mod error;
pub mod experiment;
pub mod ga;
pub mod nsga2;
pub mod operators;
pub mod problems;
pub mod random;
pub mod smpso;
pub mod spea2;

pub use error::{Error, EvaluationError, Result};
