//! SPEA2 configuration.

use crate::algorithm::{check_non_negative, check_probability};
use crate::error::{Error, Result};

/// Configuration for [`Spea2`](super::Spea2).
///
/// # Defaults
///
/// ```
/// use u_moea::spea2::Spea2Config;
///
/// let config = Spea2Config::default();
/// assert_eq!(config.population_size, 100);
/// assert_eq!(config.archive_size(), 100);
/// assert_eq!(config.max_iterations, 250);
/// assert_eq!(config.k, 1);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Spea2Config {
    /// Offspring produced per generation.
    pub population_size: usize,

    /// Archive capacity; `None` uses `population_size`.
    pub archive_size: Option<usize>,

    /// Iteration budget; initialization counts as the first iteration.
    pub max_iterations: usize,

    /// Neighbour index used by the density term.
    pub k: usize,

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

impl Default for Spea2Config {
    fn default() -> Self {
        Self {
            population_size: 100,
            archive_size: None,
            max_iterations: 250,
            k: 1,
            crossover_probability: 0.9,
            crossover_distribution_index: 20.0,
            mutation_probability: None,
            mutation_distribution_index: 20.0,
            parallel: false,
            seed: None,
        }
    }
}

impl Spea2Config {
    /// Effective archive capacity.
    pub fn archive_size(&self) -> usize {
        self.archive_size.unwrap_or(self.population_size)
    }

    /// Sets the population size.
    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    /// Sets the archive capacity.
    pub fn with_archive_size(mut self, n: usize) -> Self {
        self.archive_size = Some(n);
        self
    }

    /// Sets the iteration budget.
    pub fn with_max_iterations(mut self, n: usize) -> Self {
        self.max_iterations = n;
        self
    }

    /// Sets the density neighbour index.
    pub fn with_k(mut self, k: usize) -> Self {
        self.k = k;
        self
    }

    /// Sets the SBX probability.
    pub fn with_crossover_probability(mut self, p: f64) -> Self {
        self.crossover_probability = p;
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
        if self.population_size < 2 {
            return Err(Error::config("population_size must be at least 2"));
        }
        if self.archive_size() == 0 {
            return Err(Error::config("archive_size must be at least 1"));
        }
        if self.max_iterations == 0 {
            return Err(Error::config("max_iterations must be at least 1"));
        }
        // The merged archive and population always holds at least
        // `population_size` members.
        if self.k == 0 || self.k >= self.population_size {
            return Err(Error::config(format!(
                "k must be in [1, population_size), got {}",
                self.k
            )));
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
