//! NSGA-II configuration.

use crate::algorithm::{check_non_negative, check_probability};
use crate::error::{Error, Result};

/// Configuration for [`Nsga2`](super::Nsga2).
///
/// # Defaults
///
/// ```
/// use u_moea::nsga2::Nsga2Config;
///
/// let config = Nsga2Config::default();
/// assert_eq!(config.population_size, 100);
/// assert_eq!(config.max_evaluations, 25_000);
/// ```
///
/// # Builder Pattern
///
/// ```
/// use u_moea::nsga2::Nsga2Config;
///
/// let config = Nsga2Config::default()
///     .with_population_size(20)
///     .with_offspring_population_size(20)
///     .with_max_evaluations(220)
///     .with_seed(42);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Nsga2Config {
    /// Number of solutions kept after each replacement.
    pub population_size: usize,

    /// Number of offspring produced per generation.
    pub offspring_population_size: usize,

    /// Evaluation budget, including the initial population.
    pub max_evaluations: usize,

    /// SBX probability per parent pair.
    pub crossover_probability: f64,

    /// SBX distribution index.
    pub crossover_distribution_index: f64,

    /// Polynomial mutation probability per variable; `None` means `1 / n`.
    pub mutation_probability: Option<f64>,

    /// Polynomial mutation distribution index.
    pub mutation_distribution_index: f64,

    /// Whether to evaluate offspring in parallel (requires the `parallel`
    /// feature).
    pub parallel: bool,

    /// Random seed for reproducibility. `None` uses a random seed.
    pub seed: Option<u64>,
}

impl Default for Nsga2Config {
    fn default() -> Self {
        Self {
            population_size: 100,
            offspring_population_size: 100,
            max_evaluations: 25_000,
            crossover_probability: 0.9,
            crossover_distribution_index: 20.0,
            mutation_probability: None,
            mutation_distribution_index: 20.0,
            parallel: false,
            seed: None,
        }
    }
}

impl Nsga2Config {
    /// Sets the population size.
    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    /// Sets the offspring population size.
    pub fn with_offspring_population_size(mut self, n: usize) -> Self {
        self.offspring_population_size = n;
        self
    }

    /// Sets the evaluation budget.
    pub fn with_max_evaluations(mut self, n: usize) -> Self {
        self.max_evaluations = n;
        self
    }

    /// Sets the SBX probability.
    pub fn with_crossover_probability(mut self, p: f64) -> Self {
        self.crossover_probability = p;
        self
    }

    /// Sets the SBX distribution index.
    pub fn with_crossover_distribution_index(mut self, eta: f64) -> Self {
        self.crossover_distribution_index = eta;
        self
    }

    /// Sets the per-variable mutation probability.
    pub fn with_mutation_probability(mut self, p: f64) -> Self {
        self.mutation_probability = Some(p);
        self
    }

    /// Sets the mutation distribution index.
    pub fn with_mutation_distribution_index(mut self, eta: f64) -> Self {
        self.mutation_distribution_index = eta;
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
        if self.population_size < 2 {
            return Err(Error::config("population_size must be at least 2"));
        }
        if self.offspring_population_size == 0 {
            return Err(Error::config("offspring_population_size must be at least 1"));
        }
        if self.max_evaluations == 0 {
            return Err(Error::config("max_evaluations must be at least 1"));
        }
        check_probability("crossover_probability", self.crossover_probability)?;
        check_non_negative("crossover_distribution_index", self.crossover_distribution_index)?;
        if let Some(p) = self.mutation_probability {
            check_probability("mutation_probability", p)?;
        }
        check_non_negative("mutation_distribution_index", self.mutation_distribution_index)?;
        Ok(())
    }
}
