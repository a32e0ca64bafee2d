//! The problem contract consumed by every algorithm.

use super::solution::Solution;
use super::variable::{Bounds, Variable};
use crate::error::EvaluationError;
use rand::RngCore;
use std::sync::Arc;

/// Defines an optimization problem.
///
/// A problem declares its dimensions and variable bounds, creates random
/// solutions, and evaluates them. All objectives are **minimized**.
///
/// # Thread Safety
///
/// `Problem` must be `Send + Sync`: an algorithm is driven from a worker
/// thread, and with the `parallel` feature a population may be evaluated
/// concurrently. Problems that wrap a stateful external simulator should keep
/// the handle behind a lock.
///
/// # Implementing
///
/// ```
/// use std::sync::Arc;
/// use u_moea::core::{Bounds, Problem, Solution};
/// use u_moea::EvaluationError;
///
/// struct Parabola {
///     bounds: Arc<[Bounds<f64>]>,
/// }
///
/// impl Problem for Parabola {
///     type Variable = f64;
///     fn name(&self) -> &str { "Parabola" }
///     fn number_of_objectives(&self) -> usize { 1 }
///     fn bounds(&self) -> &Arc<[Bounds<f64>]> { &self.bounds }
///     fn evaluate(&self, s: &mut Solution<f64>) -> Result<(), EvaluationError> {
///         let x = s.variable(0);
///         s.set_objective(0, x * x);
///         Ok(())
///     }
/// }
///
/// let p = Parabola { bounds: vec![Bounds::new(-1.0, 1.0)].into() };
/// assert_eq!(p.number_of_variables(), 1);
/// ```
pub trait Problem: Send + Sync {
    /// The decision variable encoding.
    type Variable: Variable;

    /// Human-readable problem name.
    fn name(&self) -> &str;

    /// Number of objectives to minimize.
    fn number_of_objectives(&self) -> usize;

    /// Number of constraints. Constrained problems must record an overall
    /// constraint violation in [`evaluate`](Self::evaluate).
    fn number_of_constraints(&self) -> usize {
        0
    }

    /// Bounds of all decision variables; `lower <= upper` for every entry.
    fn bounds(&self) -> &Arc<[Bounds<Self::Variable>]>;

    /// Number of decision variables.
    fn number_of_variables(&self) -> usize {
        self.bounds().len()
    }

    /// Lower bound of variable `index`.
    fn lower_bound(&self, index: usize) -> Self::Variable {
        self.bounds()[index].lower
    }

    /// Upper bound of variable `index`.
    fn upper_bound(&self, index: usize) -> Self::Variable {
        self.bounds()[index].upper
    }

    /// Creates a solution initialized uniformly at random inside the bounds.
    fn create_solution(&self, rng: &mut dyn RngCore) -> Solution<Self::Variable> {
        Solution::random(self.bounds().clone(), self.number_of_objectives(), rng)
    }

    /// Computes every objective of `solution` (and, when constrained, its
    /// constraint violation).
    ///
    /// This is typically the most expensive operation and may call into an
    /// external simulator.
    fn evaluate(&self, solution: &mut Solution<Self::Variable>) -> Result<(), EvaluationError>;

    /// Releases external resources. Must be safe to call more than once.
    fn close(&self) {}
}

/// Lets several algorithms share one problem instance.
impl<P: Problem + ?Sized> Problem for Arc<P> {
    type Variable = P::Variable;

    fn name(&self) -> &str {
        (**self).name()
    }

    fn number_of_objectives(&self) -> usize {
        (**self).number_of_objectives()
    }

    fn number_of_constraints(&self) -> usize {
        (**self).number_of_constraints()
    }

    fn bounds(&self) -> &Arc<[Bounds<Self::Variable>]> {
        (**self).bounds()
    }

    fn create_solution(&self, rng: &mut dyn RngCore) -> Solution<Self::Variable> {
        (**self).create_solution(rng)
    }

    fn evaluate(&self, solution: &mut Solution<Self::Variable>) -> Result<(), EvaluationError> {
        (**self).evaluate(solution)
    }

    fn close(&self) {
        (**self).close()
    }
}

/// Checks the `lower <= upper` invariant of a bounds table.
pub(crate) fn validate_bounds<V: Variable>(bounds: &[Bounds<V>]) -> crate::Result<()> {
    for (i, b) in bounds.iter().enumerate() {
        if !(b.lower <= b.upper) {
            return Err(crate::Error::config(format!(
                "variable {i}: lower bound {:?} exceeds upper bound {:?}",
                b.lower, b.upper
            )));
        }
    }
    Ok(())
}
