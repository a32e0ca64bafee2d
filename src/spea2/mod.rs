//! SPEA2: strength Pareto evolutionary algorithm 2.
//!
//! # Key Types
//!
//! - [`Spea2Config`]: population and archive sizes, iteration budget,
//!   density neighbour `k`
//! - [`Spea2`]: the stepwise [`Algorithm`](crate::algorithm::Algorithm)
//!
//! # References
//!
//! - Zitzler, Laumanns & Thiele (2001), "SPEA2: Improving the Strength
//!   Pareto Evolutionary Algorithm", TIK-Report 103, ETH Zurich

mod config;
mod runner;

pub use config::Spea2Config;
pub use runner::Spea2;
