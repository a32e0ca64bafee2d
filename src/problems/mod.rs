//! Reference benchmark problems.
//!
//! Small, well-known test functions with known optima, used to exercise the
//! algorithms in tests and benches.
//!
//! - [`Zdt1`]: two objectives, convex front `f2 = 1 - sqrt(f1)`
//! - [`Schaffer`]: one variable, two objectives, front for `x` in `[0, 2]`
//! - [`Srinivas`]: two objectives, two inequality constraints
//! - [`Sphere`]: single objective `sum(x_i^2)`, optimum at the origin
//!
//! # References
//!
//! - Zitzler, Deb & Thiele (2000), "Comparison of Multiobjective
//!   Evolutionary Algorithms: Empirical Results"
//! - Srinivas & Deb (1994), "Multiobjective Optimization Using
//!   Nondominated Sorting in Genetic Algorithms"

use crate::core::{Bounds, Problem, Solution};
use crate::error::EvaluationError;
use std::sync::Arc;

fn uniform_bounds(n: usize, lower: f64, upper: f64) -> Arc<[Bounds<f64>]> {
    vec![Bounds::new(lower, upper); n].into()
}

/// ZDT1.
///
/// ```text
/// f1 = x0
/// g  = 1 + 9 * sum(x1..x(n-1)) / (n - 1)
/// f2 = g * (1 - sqrt(f1 / g))
/// ```
#[derive(Debug, Clone)]
pub struct Zdt1 {
    bounds: Arc<[Bounds<f64>]>,
}

impl Zdt1 {
    /// ZDT1 with `n` variables in `[0, 1]` (30 is the usual choice).
    ///
    /// # Panics
    /// Panics if `n < 2`.
    pub fn new(n: usize) -> Self {
        assert!(n >= 2, "ZDT1 needs at least two variables");
        Self {
            bounds: uniform_bounds(n, 0.0, 1.0),
        }
    }
}

impl Default for Zdt1 {
    fn default() -> Self {
        Self::new(30)
    }
}

impl Problem for Zdt1 {
    type Variable = f64;

    fn name(&self) -> &str {
        "ZDT1"
    }

    fn number_of_objectives(&self) -> usize {
        2
    }

    fn bounds(&self) -> &Arc<[Bounds<f64>]> {
        &self.bounds
    }

    fn evaluate(&self, solution: &mut Solution<f64>) -> Result<(), EvaluationError> {
        let x = solution.variables();
        let n = x.len();
        let f1 = x[0];
        let g = 1.0 + 9.0 * x[1..].iter().sum::<f64>() / (n - 1) as f64;
        let f2 = g * (1.0 - (f1 / g).sqrt());
        solution.set_objective(0, f1);
        solution.set_objective(1, f2);
        Ok(())
    }
}

/// Schaffer's single-variable bi-objective problem: `f1 = x^2`,
/// `f2 = (x - 2)^2`.
#[derive(Debug, Clone)]
pub struct Schaffer {
    bounds: Arc<[Bounds<f64>]>,
}

impl Schaffer {
    /// Schaffer with `x` in `[-100000, 100000]`.
    pub fn new() -> Self {
        Self::with_bounds(-100_000.0, 100_000.0)
    }

    /// Schaffer with custom bounds.
    pub fn with_bounds(lower: f64, upper: f64) -> Self {
        Self {
            bounds: uniform_bounds(1, lower, upper),
        }
    }
}

impl Default for Schaffer {
    fn default() -> Self {
        Self::new()
    }
}

impl Problem for Schaffer {
    type Variable = f64;

    fn name(&self) -> &str {
        "Schaffer"
    }

    fn number_of_objectives(&self) -> usize {
        2
    }

    fn bounds(&self) -> &Arc<[Bounds<f64>]> {
        &self.bounds
    }

    fn evaluate(&self, solution: &mut Solution<f64>) -> Result<(), EvaluationError> {
        let x = solution.variable(0);
        solution.set_objective(0, x * x);
        solution.set_objective(1, (x - 2.0) * (x - 2.0));
        Ok(())
    }
}

/// Srinivas' constrained problem.
///
/// ```text
/// f1 = 2 + (x - 2)^2 + (y - 1)^2
/// f2 = 9x - (y - 1)^2
/// g1 = 1 - (x^2 + y^2) / 225      >= 0
/// g2 = (3y - x) / 10 - 1          >= 0
/// ```
#[derive(Debug, Clone)]
pub struct Srinivas {
    bounds: Arc<[Bounds<f64>]>,
}

impl Srinivas {
    /// Srinivas with both variables in `[-20, 20]`.
    pub fn new() -> Self {
        Self {
            bounds: uniform_bounds(2, -20.0, 20.0),
        }
    }
}

impl Default for Srinivas {
    fn default() -> Self {
        Self::new()
    }
}

impl Problem for Srinivas {
    type Variable = f64;

    fn name(&self) -> &str {
        "Srinivas"
    }

    fn number_of_objectives(&self) -> usize {
        2
    }

    fn number_of_constraints(&self) -> usize {
        2
    }

    fn bounds(&self) -> &Arc<[Bounds<f64>]> {
        &self.bounds
    }

    fn evaluate(&self, solution: &mut Solution<f64>) -> Result<(), EvaluationError> {
        let x = solution.variable(0);
        let y = solution.variable(1);
        solution.set_objective(0, 2.0 + (x - 2.0).powi(2) + (y - 1.0).powi(2));
        solution.set_objective(1, 9.0 * x - (y - 1.0).powi(2));
        solution.set_constraint_violations(&[
            1.0 - (x * x + y * y) / 225.0,
            (3.0 * y - x) / 10.0 - 1.0,
        ]);
        Ok(())
    }
}

/// Single-objective sphere: `f = sum(x_i^2)`.
#[derive(Debug, Clone)]
pub struct Sphere {
    bounds: Arc<[Bounds<f64>]>,
}

impl Sphere {
    /// Sphere with `n` variables in `[-5.12, 5.12]`.
    pub fn new(n: usize) -> Self {
        Self::with_bounds(n, -5.12, 5.12)
    }

    /// Sphere with `n` variables in `[lower, upper]`.
    pub fn with_bounds(n: usize, lower: f64, upper: f64) -> Self {
        Self {
            bounds: uniform_bounds(n, lower, upper),
        }
    }
}

impl Problem for Sphere {
    type Variable = f64;

    fn name(&self) -> &str {
        "Sphere"
    }

    fn number_of_objectives(&self) -> usize {
        1
    }

    fn bounds(&self) -> &Arc<[Bounds<f64>]> {
        &self.bounds
    }

    fn evaluate(&self, solution: &mut Solution<f64>) -> Result<(), EvaluationError> {
        let f = solution.variables().iter().map(|x| x * x).sum();
        solution.set_objective(0, f);
        Ok(())
    }
}
