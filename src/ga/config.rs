//! GA configuration.
//!
//! [`GaConfig`] holds all parameters that control the evolutionary loop.

use crate::algorithm::{check_non_negative, check_probability};
use crate::error::{Error, Result};

/// How a generation replaces the population.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GaVariant {
    /// A full offspring population per generation; the two best parents
    /// survive as elites.
    #[default]
    Generational,
    /// One child per generation, which replaces the worst member if it is
    /// better.
    SteadyState,
}

/// Configuration for the Genetic Algorithm.
///
/// Controls population size, replacement scheme, operator parameters,
/// the evaluation budget and parallelism.
///
/// # Defaults
///
/// ```
/// use u_moea::ga::{GaConfig, GaVariant};
///
/// let config = GaConfig::default();
/// assert_eq!(config.population_size, 100);
/// assert_eq!(config.max_evaluations, 25_000);
/// assert_eq!(config.variant, GaVariant::Generational);
/// ```
///
/// # Builder Pattern
///
/// ```
/// use u_moea::ga::{GaConfig, GaVariant};
///
/// let config = GaConfig::default()
///     .with_population_size(50)
///     .with_variant(GaVariant::SteadyState)
///     .with_tournament_size(3)
///     .with_mutation_probability(0.2);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GaConfig {
    /// Number of individuals in the population.
    ///
    /// Larger populations increase diversity but slow down each generation.
    pub population_size: usize,

    /// Evaluation budget, including the initial population.
    pub max_evaluations: usize,

    /// Replacement scheme.
    pub variant: GaVariant,

    /// Tournament size for parent selection.
    pub tournament_size: usize,

    /// SBX probability per parent pair (0.0-1.0).
    pub crossover_probability: f64,

    /// SBX distribution index.
    pub crossover_distribution_index: f64,

    /// Polynomial mutation probability per variable; `None` means `1 / n`.
    pub mutation_probability: Option<f64>,

    /// Polynomial mutation distribution index.
    pub mutation_distribution_index: f64,

    /// Whether to evaluate individuals in parallel using rayon (requires
    /// the `parallel` feature).
    pub parallel: bool,

    /// Random seed for reproducibility.
    ///
    /// `None` uses a random seed.
    pub seed: Option<u64>,
}

impl Default for GaConfig {
    fn default() -> Self {
        Self {
            population_size: 100,
            max_evaluations: 25_000,
            variant: GaVariant::Generational,
            tournament_size: 2,
            crossover_probability: 0.9,
            crossover_distribution_index: 20.0,
            mutation_probability: None,
            mutation_distribution_index: 20.0,
            parallel: false,
            seed: None,
        }
    }
}

impl GaConfig {
    /// Sets the population size.
    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    /// Sets the evaluation budget.
    pub fn with_max_evaluations(mut self, n: usize) -> Self {
        self.max_evaluations = n;
        self
    }

    /// Sets the replacement scheme.
    pub fn with_variant(mut self, variant: GaVariant) -> Self {
        self.variant = variant;
        self
    }

    /// Sets the tournament size.
    pub fn with_tournament_size(mut self, k: usize) -> Self {
        self.tournament_size = k;
        self
    }

    /// Sets the crossover probability.
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
    ///
    /// Returns `Err` with a description if any parameter is invalid.
    pub fn validate(&self) -> Result<()> {
        if self.population_size < 2 {
            return Err(Error::config("population_size must be at least 2"));
        }
        if self.max_evaluations == 0 {
            return Err(Error::config("max_evaluations must be at least 1"));
        }
        if self.tournament_size == 0 {
            return Err(Error::config("tournament_size must be at least 1"));
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GaConfig::default();
        assert_eq!(config.population_size, 100);
        assert_eq!(config.tournament_size, 2);
        assert!((config.crossover_probability - 0.9).abs() < 1e-10);
        assert!(config.mutation_probability.is_none());
        assert!(!config.parallel);
        assert!(config.seed.is_none());
    }

    #[test]
    fn test_builder_pattern() {
        let config = GaConfig::default()
            .with_population_size(200)
            .with_max_evaluations(1000)
            .with_variant(GaVariant::SteadyState)
            .with_crossover_probability(0.8)
            .with_mutation_probability(0.05)
            .with_parallel(true)
            .with_seed(42);

        assert_eq!(config.population_size, 200);
        assert_eq!(config.max_evaluations, 1000);
        assert_eq!(config.variant, GaVariant::SteadyState);
        assert!((config.crossover_probability - 0.8).abs() < 1e-10);
        assert_eq!(config.mutation_probability, Some(0.05));
        assert!(config.parallel);
        assert_eq!(config.seed, Some(42));
    }

    #[test]
    fn test_validate_population_too_small() {
        let config = GaConfig::default().with_population_size(1);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_builders_do_not_clamp() {
        let config = GaConfig::default().with_crossover_probability(-0.5);
        assert_eq!(config.crossover_probability, -0.5);
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_validate_zero_tournament() {
        let config = GaConfig::default().with_tournament_size(0);
        assert!(config.validate().is_err());
    }
}
