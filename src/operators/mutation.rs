//! Mutation operators.
//!
//! A mutation perturbs one solution in place. Every operator keeps the
//! variables inside their bounds.
//!
//! # References
//!
//! - Deb & Goyal (1996), "A Combined Genetic Adaptive Search (GeneAS) for
//!   Engineering Design", Computer Science and Informatics 26

use crate::algorithm::{check_non_negative, check_probability};
use crate::core::{Solution, Variable};
use crate::error::Result;
use rand::{Rng, RngCore};

/// Perturbs a solution in place.
pub trait MutationOperator<V>: Send + Sync {
    /// Mutates `solution`.
    fn execute(&self, solution: &mut Solution<V>, rng: &mut dyn RngCore);
}

/// Per-variable mutation probability `1 / n`, or `1.0` without variables.
pub fn per_variable_probability(number_of_variables: usize) -> f64 {
    if number_of_variables == 0 {
        1.0
    } else {
        1.0 / number_of_variables as f64
    }
}

/// Polynomial mutation.
///
/// Each variable mutates with probability `probability`. The perturbation
/// follows a polynomial distribution bounded by the variable's range, so
/// values never need clipping except for rounding; `distribution_index`
/// controls how local the step is (larger = smaller steps).
///
/// # Algorithm (Deb & Goyal, 1996)
///
/// With `d1 = (y - lb) / (ub - lb)`, `d2 = (ub - y) / (ub - lb)` and
/// `u ~ U(0, 1)`:
///
/// - `u <= 0.5`: `dq = (2u + (1 - 2u)(1 - d1)^(eta+1))^(1/(eta+1)) - 1`
/// - otherwise: `dq = 1 - (2(1 - u) + 2(u - 0.5)(1 - d2)^(eta+1))^(1/(eta+1))`
///
/// and `y' = y + dq * (ub - lb)`.
#[derive(Debug, Clone, Copy)]
pub struct PolynomialMutation {
    probability: f64,
    distribution_index: f64,
}

impl PolynomialMutation {
    /// Creates the operator.
    ///
    /// # Errors
    /// Returns [`Error::InvalidConfig`](crate::error::Error::InvalidConfig) for a
    /// probability outside `[0, 1]` or a negative distribution index.
    pub fn new(probability: f64, distribution_index: f64) -> Result<Self> {
        check_probability("mutation probability", probability)?;
        check_non_negative("distribution index", distribution_index)?;
        Ok(Self {
            probability,
            distribution_index,
        })
    }

    /// The usual setting: probability `1 / n`, distribution index 20.
    pub fn for_variables(number_of_variables: usize) -> Self {
        Self {
            probability: per_variable_probability(number_of_variables),
            distribution_index: 20.0,
        }
    }

    /// Per-variable mutation probability.
    pub fn probability(&self) -> f64 {
        self.probability
    }

    /// Distribution index (eta).
    pub fn distribution_index(&self) -> f64 {
        self.distribution_index
    }
}

impl<V: Variable> MutationOperator<V> for PolynomialMutation {
    fn execute(&self, solution: &mut Solution<V>, rng: &mut dyn RngCore) {
        let eta = self.distribution_index;
        let pow = 1.0 / (eta + 1.0);

        for i in 0..solution.number_of_variables() {
            if rng.random::<f64>() > self.probability {
                continue;
            }
            let bounds = solution.bounds(i);
            let lower = bounds.lower.to_f64();
            let upper = bounds.upper.to_f64();
            if lower == upper {
                solution.variables_mut()[i] = bounds.lower;
                continue;
            }

            let y = solution.variable(i).to_f64();
            let delta1 = (y - lower) / (upper - lower);
            let delta2 = (upper - y) / (upper - lower);
            let rnd = rng.random::<f64>();

            let deltaq = if rnd <= 0.5 {
                let xy = 1.0 - delta1;
                let val = 2.0 * rnd + (1.0 - 2.0 * rnd) * xy.powf(eta + 1.0);
                val.powf(pow) - 1.0
            } else {
                let xy = 1.0 - delta2;
                let val = 2.0 * (1.0 - rnd) + 2.0 * (rnd - 0.5) * xy.powf(eta + 1.0);
                1.0 - val.powf(pow)
            };

            solution.variables_mut()[i] = bounds.repair(y + deltaq * (upper - lower));
        }
    }
}

/// Uniform perturbation: a mutated variable moves by
/// `(u - 0.5) * perturbation` with `u ~ U(0, 1)` and is clamped into bounds.
#[derive(Debug, Clone, Copy)]
pub struct UniformMutation {
    probability: f64,
    perturbation: f64,
}

impl UniformMutation {
    /// Creates the operator.
    ///
    /// # Errors
    /// Returns [`Error::InvalidConfig`](crate::error::Error::InvalidConfig) for a
    /// probability outside `[0, 1]` or a negative perturbation.
    pub fn new(probability: f64, perturbation: f64) -> Result<Self> {
        check_probability("mutation probability", probability)?;
        check_non_negative("perturbation", perturbation)?;
        Ok(Self {
            probability,
            perturbation,
        })
    }
}

impl<V: Variable> MutationOperator<V> for UniformMutation {
    fn execute(&self, solution: &mut Solution<V>, rng: &mut dyn RngCore) {
        for i in 0..solution.number_of_variables() {
            if rng.random::<f64>() < self.probability {
                let step = (rng.random::<f64>() - 0.5) * self.perturbation;
                let value = solution.variable(i).to_f64() + step;
                solution.variables_mut()[i] = solution.bounds(i).repair(value);
            }
        }
    }
}

/// Replaces a mutated variable with a fresh uniform draw from its bounds.
#[derive(Debug, Clone, Copy)]
pub struct SimpleRandomMutation {
    probability: f64,
}

impl SimpleRandomMutation {
    /// Creates the operator.
    ///
    /// # Errors
    /// Returns [`Error::InvalidConfig`](crate::error::Error::InvalidConfig) for a
    /// probability outside `[0, 1]`.
    pub fn new(probability: f64) -> Result<Self> {
        check_probability("mutation probability", probability)?;
        Ok(Self { probability })
    }
}

impl<V: Variable> MutationOperator<V> for SimpleRandomMutation {
    fn execute(&self, solution: &mut Solution<V>, rng: &mut dyn RngCore) {
        for i in 0..solution.number_of_variables() {
            if rng.random::<f64>() <= self.probability {
                let b = solution.bounds(i);
                solution.variables_mut()[i] = V::sample(b.lower, b.upper, rng);
            }
        }
    }
}

/// Leaves solutions untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullMutation;

impl<V> MutationOperator<V> for NullMutation {
    fn execute(&self, _solution: &mut Solution<V>, _rng: &mut dyn RngCore) {}
}
