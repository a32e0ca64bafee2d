//! The stepwise algorithm contract shared by every family.
//!
//! An [`Algorithm`] is a state machine driven from outside:
//!
//! ```text
//! Created --init_progress--> Initialized --step--> Stepping --step--> ... --> Terminated
//!                                  \____________________\______ error ______> Failed
//! ```
//!
//! One [`step`](Algorithm::step) is one generation. The caller checks
//! [`is_stopping_condition_reached`](Algorithm::is_stopping_condition_reached)
//! between steps, which is where cancellation can be observed;
//! [`run`](Algorithm::run) is the same loop without interruption, so both
//! paths produce identical results for the same seed.

use crate::core::{Solution, Variable};
use crate::error::{Error, Result};
use std::fmt;

/// Life-cycle state of an [`Algorithm`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlgorithmState {
    /// Constructed; `init_progress` has not run.
    Created,
    /// Initial population evaluated; no generation stepped yet.
    Initialized,
    /// At least one generation completed; budget not exhausted.
    Stepping,
    /// Budget exhausted.
    Terminated,
    /// An evaluation failed; the run cannot continue.
    Failed,
}

impl fmt::Display for AlgorithmState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AlgorithmState::Created => "created",
            AlgorithmState::Initialized => "initialized",
            AlgorithmState::Stepping => "stepping",
            AlgorithmState::Terminated => "terminated",
            AlgorithmState::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// A population-based optimizer that can be driven one generation at a time.
///
/// # Failure
///
/// If evaluation fails inside [`init_progress`](Self::init_progress) or
/// [`step`](Self::step) the error is returned, the algorithm moves to
/// [`AlgorithmState::Failed`], and [`result`](Self::result) refuses to
/// expose the half-built generation. [`close`](Self::close) is still
/// required and safe.
pub trait Algorithm: Send {
    /// Decision variable encoding of the solved problem.
    type Variable: Variable;

    /// Algorithm name, e.g. `"NSGA-II"`.
    fn name(&self) -> &str;

    /// Current life-cycle state.
    fn state(&self) -> AlgorithmState;

    /// Creates and evaluates the initial population and resets counters.
    ///
    /// # Errors
    /// [`Error::InvalidState`] unless the algorithm is in
    /// [`AlgorithmState::Created`]; [`Error::Evaluation`] if the problem
    /// fails.
    fn init_progress(&mut self) -> Result<()>;

    /// Runs one generation: selection, reproduction, evaluation,
    /// replacement and counter update.
    ///
    /// # Errors
    /// [`Error::InvalidState`] before initialization, after termination or
    /// after a failure; [`Error::Evaluation`] if the problem fails.
    fn step(&mut self) -> Result<()>;

    /// Whether the evaluation/iteration budget is exhausted (or the run
    /// failed).
    fn is_stopping_condition_reached(&self) -> bool;

    /// Family-specific result extraction.
    ///
    /// # Errors
    /// [`Error::InvalidState`] before initialization or after a failure.
    fn result(&self) -> Result<Vec<Solution<Self::Variable>>>;

    /// Human-readable progress, e.g. `"Number of evaluations: 120 / 25000"`.
    fn status(&self) -> String;

    /// Fraction of the budget consumed, in `[0, 1]`.
    fn progress(&self) -> f64;

    /// Releases the problem's resources. Only the first call has an effect.
    fn close(&mut self);

    /// Initializes if needed, steps until the stopping condition holds and
    /// returns the result.
    fn run(&mut self) -> Result<Vec<Solution<Self::Variable>>> {
        if self.state() == AlgorithmState::Created {
            self.init_progress()?;
        }
        while !self.is_stopping_condition_reached() {
            self.step()?;
        }
        self.result()
    }
}

/// Counter and state bookkeeping every family embeds.
#[derive(Debug, Clone)]
pub(crate) struct Lifecycle {
    name: &'static str,
    state: AlgorithmState,
    closed: bool,
}

impl Lifecycle {
    pub(crate) fn new(name: &'static str) -> Self {
        Self {
            name,
            state: AlgorithmState::Created,
            closed: false,
        }
    }

    pub(crate) fn name(&self) -> &'static str {
        self.name
    }

    pub(crate) fn state(&self) -> AlgorithmState {
        self.state
    }

    pub(crate) fn begin_init(&self) -> Result<()> {
        if self.state != AlgorithmState::Created {
            return Err(Error::state(format!(
                "{}: init_progress called while {}",
                self.name, self.state
            )));
        }
        Ok(())
    }

    pub(crate) fn begin_step(&self) -> Result<()> {
        match self.state {
            AlgorithmState::Initialized | AlgorithmState::Stepping => Ok(()),
            other => Err(Error::state(format!(
                "{}: step called while {other}",
                self.name
            ))),
        }
    }

    pub(crate) fn initialized(&mut self, done: bool) {
        self.state = if done {
            AlgorithmState::Terminated
        } else {
            AlgorithmState::Initialized
        };
    }

    pub(crate) fn stepped(&mut self, done: bool) {
        self.state = if done {
            AlgorithmState::Terminated
        } else {
            AlgorithmState::Stepping
        };
    }

    /// Passes `outcome` through, moving to `Failed` on error.
    pub(crate) fn guard<T>(&mut self, outcome: Result<T>) -> Result<T> {
        if let Err(e) = &outcome {
            tracing::warn!(algorithm = self.name, error = %e, "generation aborted");
            self.state = AlgorithmState::Failed;
        }
        outcome
    }

    pub(crate) fn check_result(&self) -> Result<()> {
        match self.state {
            AlgorithmState::Created => Err(Error::state(format!(
                "{}: result requested before init_progress",
                self.name
            ))),
            AlgorithmState::Failed => Err(Error::state(format!(
                "{}: result requested after a failed generation",
                self.name
            ))),
            _ => Ok(()),
        }
    }

    pub(crate) fn failed(&self) -> bool {
        self.state == AlgorithmState::Failed
    }

    /// Returns `true` on the first call only.
    pub(crate) fn close(&mut self) -> bool {
        if self.closed {
            return false;
        }
        self.closed = true;
        true
    }
}

pub(crate) fn check_probability(name: &str, p: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&p) {
        return Err(Error::config(format!("{name} must be in [0, 1], got {p}")));
    }
    Ok(())
}

pub(crate) fn check_non_negative(name: &str, value: f64) -> Result<()> {
    if !(value >= 0.0) {
        return Err(Error::config(format!("{name} must be non-negative, got {value}")));
    }
    Ok(())
}

/// `count / budget`, capped at 1.
pub(crate) fn fraction(count: usize, budget: usize) -> f64 {
    if budget == 0 {
        1.0
    } else {
        (count as f64 / budget as f64).min(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifecycle_happy_path() {
        let mut lc = Lifecycle::new("test");
        assert_eq!(lc.state(), AlgorithmState::Created);
        assert!(lc.begin_step().is_err());
        assert!(lc.check_result().is_err());

        lc.begin_init().unwrap();
        lc.initialized(false);
        assert_eq!(lc.state(), AlgorithmState::Initialized);
        assert!(lc.begin_init().is_err());

        lc.begin_step().unwrap();
        lc.stepped(false);
        assert_eq!(lc.state(), AlgorithmState::Stepping);
        lc.stepped(true);
        assert_eq!(lc.state(), AlgorithmState::Terminated);
        assert!(lc.begin_step().is_err());
        assert!(lc.check_result().is_ok());
    }

    #[test]
    fn test_lifecycle_failure() {
        let mut lc = Lifecycle::new("test");
        lc.initialized(false);
        let out: Result<()> = lc.guard(Err(Error::EmptyPopulation));
        assert!(out.is_err());
        assert!(lc.failed());
        assert!(lc.begin_step().is_err());
        assert!(matches!(lc.check_result(), Err(Error::InvalidState(_))));
    }

    #[test]
    fn test_close_once() {
        let mut lc = Lifecycle::new("test");
        assert!(lc.close());
        assert!(!lc.close());
    }

    #[test]
    fn test_parameter_checks() {
        assert!(check_probability("p", 0.0).is_ok());
        assert!(check_probability("p", 1.0).is_ok());
        assert!(check_probability("p", 1.01).is_err());
        assert!(check_probability("p", f64::NAN).is_err());
        assert!(check_non_negative("eta", 0.0).is_ok());
        assert!(check_non_negative("eta", -1.0).is_err());
    }

    #[test]
    fn test_fraction() {
        assert_eq!(fraction(0, 10), 0.0);
        assert_eq!(fraction(5, 10), 0.5);
        assert_eq!(fraction(12, 10), 1.0);
        assert_eq!(fraction(3, 0), 1.0);
    }
}
