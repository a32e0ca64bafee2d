//! DE configuration.

use crate::algorithm::check_probability;
use crate::error::{Error, Result};
use crate::operators::DeVariant;

/// Configuration for [`DifferentialEvolution`](super::DifferentialEvolution).
///
/// # Defaults
///
/// ```
/// use u_moea::de::DeConfig;
/// use u_moea::operators::DeVariant;
///
/// let config = DeConfig::default();
/// assert_eq!(config.population_size, 100);
/// assert_eq!(config.max_evaluations, 25_000);
/// assert_eq!((config.cr, config.f), (0.5, 0.5));
/// assert_eq!(config.variant, DeVariant::Rand1Bin);
/// ```
///
/// # Builder Pattern
///
/// ```
/// use u_moea::de::DeConfig;
///
/// let config = DeConfig::default()
///     .with_population_size(30)
///     .with_variant("best/1/bin".parse().unwrap())
///     .with_f(0.8);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DeConfig {
    /// Number of target vectors. Must exceed the donor count of the variant,
    /// or match it when the target may be its own donor.
    pub population_size: usize,

    /// Evaluation budget, including the initial population.
    pub max_evaluations: usize,

    /// Crossover rate in `[0, 1]`.
    pub cr: f64,

    /// Scale factor applied to donor differences.
    pub f: f64,

    /// Mutation/recombination scheme.
    pub variant: DeVariant,

    /// Whether a target may be drawn as one of its own donors.
    pub allow_target_as_donor: bool,

    /// Whether to evaluate trial vectors in parallel (requires the
    /// `parallel` feature).
    pub parallel: bool,

    /// Random seed for reproducibility. `None` uses a random seed.
    pub seed: Option<u64>,
}

impl Default for DeConfig {
    fn default() -> Self {
        Self {
            population_size: 100,
            max_evaluations: 25_000,
            cr: 0.5,
            f: 0.5,
            variant: DeVariant::Rand1Bin,
            allow_target_as_donor: false,
            parallel: false,
            seed: None,
        }
    }
}

impl DeConfig {
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

    /// Sets the crossover rate.
    pub fn with_cr(mut self, cr: f64) -> Self {
        self.cr = cr;
        self
    }

    /// Sets the scale factor.
    pub fn with_f(mut self, f: f64) -> Self {
        self.f = f;
        self
    }

    /// Sets the scheme.
    pub fn with_variant(mut self, variant: DeVariant) -> Self {
        self.variant = variant;
        self
    }

    /// Lets a target be drawn as one of its own donors.
    pub fn with_target_allowed(mut self, allow: bool) -> Self {
        self.allow_target_as_donor = allow;
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
        self.check_donors(self.variant)?;
        if self.max_evaluations == 0 {
            return Err(Error::config("max_evaluations must be at least 1"));
        }
        check_probability("cr", self.cr)?;
        if !(self.f >= 0.0) {
            return Err(Error::config(format!("f must be non-negative, got {}", self.f)));
        }
        Ok(())
    }

    /// Checks that the population can supply the donors of `variant`.
    pub(crate) fn check_donors(&self, variant: DeVariant) -> Result<()> {
        let donors = variant.number_of_donors();
        let pool = if self.allow_target_as_donor {
            self.population_size
        } else {
            self.population_size.saturating_sub(1)
        };
        if self.population_size == 0 || pool < donors {
            return Err(Error::config(format!(
                "{variant} needs {donors} donors, population_size {} supplies {pool}",
                self.population_size
            )));
        }
        Ok(())
    }
}
