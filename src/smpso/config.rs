//! SMPSO configuration.

use crate::algorithm::{check_non_negative, check_probability};
use crate::error::{Error, Result};

/// Configuration for [`Smpso`](super::Smpso).
///
/// Coefficients `r1`, `r2`, `c1`, `c2` are drawn uniformly from their
/// `[min, max]` range once per particle and generation.
///
/// # Defaults
///
/// ```
/// use u_moea::smpso::SmpsoConfig;
///
/// let config = SmpsoConfig::default();
/// assert_eq!(config.swarm_size, 100);
/// assert_eq!(config.archive_size, 100);
/// assert_eq!(config.max_iterations, 250);
/// assert_eq!((config.c1_min, config.c1_max), (1.5, 2.5));
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SmpsoConfig {
    /// Number of particles.
    pub swarm_size: usize,

    /// Capacity of the leaders archive.
    pub archive_size: usize,

    /// Iteration budget; initialization counts as the first iteration.
    pub max_iterations: usize,

    /// Lower bound of `r1`.
    pub r1_min: f64,
    /// Upper bound of `r1`.
    pub r1_max: f64,
    /// Lower bound of `r2`.
    pub r2_min: f64,
    /// Upper bound of `r2`.
    pub r2_max: f64,
    /// Lower bound of the cognitive coefficient `c1`.
    pub c1_min: f64,
    /// Upper bound of the cognitive coefficient `c1`.
    pub c1_max: f64,
    /// Lower bound of the social coefficient `c2`.
    pub c2_min: f64,
    /// Upper bound of the social coefficient `c2`.
    pub c2_max: f64,

    /// Smallest inertia weight.
    pub weight_min: f64,
    /// Largest inertia weight; this is the weight applied every generation.
    pub weight_max: f64,

    /// Velocity factor applied when a particle is clamped at its lower
    /// bound (negative reverses direction).
    pub change_velocity1: f64,
    /// Velocity factor applied when a particle is clamped at its upper
    /// bound.
    pub change_velocity2: f64,

    /// Polynomial mutation probability per variable; `None` means `1 / n`.
    pub mutation_probability: Option<f64>,

    /// Polynomial mutation distribution index.
    pub mutation_distribution_index: f64,

    /// Whether to evaluate the swarm in parallel (requires the `parallel`
    /// feature).
    pub parallel: bool,

    /// Random seed for reproducibility. `None` uses a random seed.
    pub seed: Option<u64>,
}

impl Default for SmpsoConfig {
    fn default() -> Self {
        Self {
            swarm_size: 100,
            archive_size: 100,
            max_iterations: 250,
            r1_min: 0.0,
            r1_max: 1.0,
            r2_min: 0.0,
            r2_max: 1.0,
            c1_min: 1.5,
            c1_max: 2.5,
            c2_min: 1.5,
            c2_max: 2.5,
            weight_min: 0.1,
            weight_max: 0.1,
            change_velocity1: -1.0,
            change_velocity2: -1.0,
            mutation_probability: None,
            mutation_distribution_index: 20.0,
            parallel: false,
            seed: None,
        }
    }
}

impl SmpsoConfig {
    /// Sets the swarm size.
    pub fn with_swarm_size(mut self, n: usize) -> Self {
        self.swarm_size = n;
        self
    }

    /// Sets the leaders archive capacity.
    pub fn with_archive_size(mut self, n: usize) -> Self {
        self.archive_size = n;
        self
    }

    /// Sets the iteration budget.
    pub fn with_max_iterations(mut self, n: usize) -> Self {
        self.max_iterations = n;
        self
    }

    /// Sets the ranges of `c1` and `c2`.
    pub fn with_learning_factors(mut self, c1: (f64, f64), c2: (f64, f64)) -> Self {
        (self.c1_min, self.c1_max) = c1;
        (self.c2_min, self.c2_max) = c2;
        self
    }

    /// Sets the ranges of `r1` and `r2`.
    pub fn with_random_factors(mut self, r1: (f64, f64), r2: (f64, f64)) -> Self {
        (self.r1_min, self.r1_max) = r1;
        (self.r2_min, self.r2_max) = r2;
        self
    }

    /// Sets the inertia weight range.
    pub fn with_weights(mut self, min: f64, max: f64) -> Self {
        self.weight_min = min;
        self.weight_max = max;
        self
    }

    /// Sets the bound-hit velocity factors.
    pub fn with_change_velocity(mut self, lower: f64, upper: f64) -> Self {
        self.change_velocity1 = lower;
        self.change_velocity2 = upper;
        self
    }

    /// Sets the per-variable mutation probability.
    pub fn with_mutation_probability(mut self, p: f64) -> Self {
        self.mutation_probability = Some(p);
        self
    }

    /// Enables or disables parallel evaluation.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Sets the random seed for reproducibility.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.swarm_size == 0 {
            return Err(Error::config("swarm_size must be at least 1"));
        }
        if self.archive_size == 0 {
            return Err(Error::config("archive_size must be at least 1"));
        }
        if self.max_iterations == 0 {
            return Err(Error::config("max_iterations must be at least 1"));
        }
        for (name, min, max) in [
            ("r1", self.r1_min, self.r1_max),
            ("r2", self.r2_min, self.r2_max),
            ("c1", self.c1_min, self.c1_max),
            ("c2", self.c2_min, self.c2_max),
            ("weight", self.weight_min, self.weight_max),
        ] {
            if !(min <= max) {
                return Err(Error::config(format!(
                    "{name} range is empty: min {min} > max {max}"
                )));
            }
        }
        if !self.change_velocity1.is_finite() || !self.change_velocity2.is_finite() {
            return Err(Error::config("change velocity factors must be finite"));
        }
        if let Some(p) = self.mutation_probability {
            check_probability("mutation_probability", p)?;
        }
        check_non_negative("mutation_distribution_index", self.mutation_distribution_index)?;
        Ok(())
    }
}
