//! Stepwise execution harness.
//!
//! Runs one [`Algorithm`](crate::algorithm::Algorithm) on a worker thread,
//! one generation at a time, so that a caller can cancel between
//! generations and observe progress without blocking the worker.
//!
//! # Key Types
//!
//! - [`Experiment`]: owns the algorithm; [`run_blocking`](Experiment::run_blocking)
//!   or [`spawn`](Experiment::spawn)
//! - [`ExperimentHandle`]: `cancel`, `monitor`, `join`
//! - [`ExperimentMonitor`]: single-slot [`ProgressSlot`] (latest update
//!   wins) and append-only [`ExecutionLog`]
//! - [`SolutionListOutput`]: FUN/VAR rendering of a result

mod monitor;
mod output;
mod runner;

pub use monitor::{ExecutionLog, ExperimentMonitor, Progress, ProgressSlot};
pub use output::SolutionListOutput;
pub use runner::{Experiment, ExperimentHandle, ExperimentOutcome};
