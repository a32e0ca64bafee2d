//! DE generation loop.

use super::config::DeConfig;
use crate::algorithm::{fraction, Algorithm, AlgorithmState, Lifecycle};
use crate::core::{evaluate_population, validate_bounds, Problem, Solution};
use crate::dominance::{ObjectiveComparator, SolutionComparator};
use crate::error::{Error, Result};
use crate::operators::{
    CrossoverOperator, DifferentialEvolutionCrossover, DifferentialEvolutionSelection,
};
use crate::random::rng_from_seed;
use rand::rngs::StdRng;
use std::cmp::Ordering;
use tracing::{debug, info};

/// Single-objective differential evolution (Storn & Price, 1997).
///
/// For every target `i` of the current population, distinct donors are
/// drawn (`i` itself only when
/// [`allow_target_as_donor`](DeConfig::allow_target_as_donor) is set) and
/// combined with the target into a trial
/// vector. After the trials are evaluated, trial `i` replaces target `i`
/// unless the target is strictly better. The new population is sorted by
/// the comparator, so the best solution comes first.
///
/// The budget is counted in evaluations; [`result`](Algorithm::result)
/// returns the single best solution.
///
/// # Usage
///
/// ```
/// use u_moea::algorithm::Algorithm;
/// use u_moea::de::{DeConfig, DifferentialEvolution};
/// use u_moea::problems::Sphere;
///
/// let config = DeConfig::default()
///     .with_population_size(20)
///     .with_max_evaluations(2_000)
///     .with_seed(42);
/// let mut de = DifferentialEvolution::new(Sphere::new(3), config).unwrap();
/// let best = de.run().unwrap();
/// assert_eq!(best.len(), 1);
/// assert!(best[0].objective(0) < 1.0);
/// ```
pub struct DifferentialEvolution<P: Problem> {
    problem: P,
    config: DeConfig,
    lifecycle: Lifecycle,
    rng: StdRng,
    population: Vec<Solution<P::Variable>>,
    evaluations: usize,
    selection: DifferentialEvolutionSelection,
    crossover: DifferentialEvolutionCrossover,
    comparator: Box<dyn SolutionComparator<P::Variable>>,
}

impl<P: Problem> DifferentialEvolution<P> {
    /// Creates the algorithm, comparing solutions on objective 0.
    ///
    /// # Errors
    /// Returns [`Error::InvalidConfig`] for an invalid configuration or
    /// inverted variable bounds.
    pub fn new(problem: P, config: DeConfig) -> Result<Self> {
        config.validate()?;
        validate_bounds(problem.bounds())?;
        let crossover = DifferentialEvolutionCrossover::new(config.cr, config.f, config.variant)?;
        let selection =
            DifferentialEvolutionSelection::new().with_target_allowed(config.allow_target_as_donor);

        Ok(Self {
            rng: rng_from_seed(config.seed),
            problem,
            config,
            lifecycle: Lifecycle::new("DE"),
            population: Vec::new(),
            evaluations: 0,
            selection,
            crossover,
            comparator: Box::new(ObjectiveComparator::new(0)),
        })
    }

    /// Replaces the trial-vector operator.
    ///
    /// # Errors
    /// Returns [`Error::InvalidConfig`] if the population cannot supply the
    /// donors the operator's variant needs.
    pub fn with_crossover(mut self, crossover: DifferentialEvolutionCrossover) -> Result<Self> {
        self.config.check_donors(crossover.variant())?;
        self.crossover = crossover;
        Ok(self)
    }

    /// Replaces the comparator used for replacement and ranking.
    pub fn with_comparator(
        mut self,
        comparator: impl SolutionComparator<P::Variable> + 'static,
    ) -> Self {
        self.comparator = Box::new(comparator);
        self
    }

    /// The configuration.
    pub fn config(&self) -> &DeConfig {
        &self.config
    }

    /// The current population, best first.
    pub fn population(&self) -> &[Solution<P::Variable>] {
        &self.population
    }

    /// Evaluations performed so far.
    pub fn evaluations(&self) -> usize {
        self.evaluations
    }

    fn sort(&self, population: &mut [Solution<P::Variable>]) {
        population.sort_by(|a, b| self.comparator.compare(a, b));
    }

    /// One trial vector per target.
    fn reproduction(&mut self) -> Result<Vec<Solution<P::Variable>>> {
        let variant = self.crossover.variant();
        let donors = variant.number_of_donors();
        let size = self.population.len();
        let best = self
            .population
            .iter()
            .min_by(|a, b| self.comparator.compare(a, b))
            .ok_or(Error::EmptyPopulation)?;

        let mut offspring = Vec::with_capacity(size);
        for (i, target) in self.population.iter().enumerate() {
            let picks = self.selection.select(i, size, donors, &mut self.rng)?;
            let mut parents: Vec<&Solution<P::Variable>> =
                picks.iter().map(|&d| &self.population[d]).collect();
            if variant.uses_best() {
                parents[2] = best;
            }
            parents.push(target);

            let mut children = self.crossover.execute(&parents, &mut self.rng)?;
            if children.is_empty() {
                return Err(Error::state("trial vector operator produced no child"));
            }
            offspring.push(children.swap_remove(0));
        }
        Ok(offspring)
    }

    fn replacement(&self, offspring: Vec<Solution<P::Variable>>) -> Vec<Solution<P::Variable>> {
        let mut next: Vec<_> = self
            .population
            .iter()
            .zip(offspring)
            .map(|(parent, trial)| {
                if self.comparator.compare(parent, &trial) == Ordering::Less {
                    parent.clone()
                } else {
                    trial
                }
            })
            .collect();
        self.sort(&mut next);
        next
    }

    fn generation(&mut self) -> Result<()> {
        let mut offspring = self.reproduction()?;
        evaluate_population(&self.problem, &mut offspring, self.config.parallel)?;
        let evaluated = offspring.len();
        let population = self.replacement(offspring);

        self.population = population;
        self.evaluations += evaluated;
        Ok(())
    }

    fn initialize(&mut self) -> Result<()> {
        let mut population: Vec<_> = (0..self.config.population_size)
            .map(|_| self.problem.create_solution(&mut self.rng))
            .collect();
        evaluate_population(&self.problem, &mut population, self.config.parallel)?;
        self.sort(&mut population);
        self.population = population;
        self.evaluations = self.config.population_size;
        Ok(())
    }
}

impl<P: Problem> Algorithm for DifferentialEvolution<P> {
    type Variable = P::Variable;

    fn name(&self) -> &str {
        self.lifecycle.name()
    }

    fn state(&self) -> AlgorithmState {
        self.lifecycle.state()
    }

    fn init_progress(&mut self) -> Result<()> {
        self.lifecycle.begin_init()?;
        let outcome = self.initialize();
        self.lifecycle.guard(outcome)?;

        info!(
            algorithm = self.lifecycle.name(),
            problem = self.problem.name(),
            population = self.population.len(),
            variant = %self.crossover.variant(),
            max_evaluations = self.config.max_evaluations,
            "initialized"
        );
        self.lifecycle
            .initialized(self.evaluations >= self.config.max_evaluations);
        Ok(())
    }

    fn step(&mut self) -> Result<()> {
        self.lifecycle.begin_step()?;
        let outcome = self.generation();
        self.lifecycle.guard(outcome)?;

        debug!(
            algorithm = self.lifecycle.name(),
            evaluations = self.evaluations,
            best = self.population.first().map(|s| s.objective(0)),
            "generation complete"
        );
        let done = self.evaluations >= self.config.max_evaluations;
        if done {
            info!(
                algorithm = self.lifecycle.name(),
                evaluations = self.evaluations,
                "terminated"
            );
        }
        self.lifecycle.stepped(done);
        Ok(())
    }

    fn is_stopping_condition_reached(&self) -> bool {
        self.lifecycle.failed() || self.evaluations >= self.config.max_evaluations
    }

    fn result(&self) -> Result<Vec<Solution<P::Variable>>> {
        self.lifecycle.check_result()?;
        Ok(self.population.first().cloned().into_iter().collect())
    }

    fn status(&self) -> String {
        format!(
            "Number of evaluations: {} / {}",
            self.evaluations, self.config.max_evaluations
        )
    }

    fn progress(&self) -> f64 {
        fraction(self.evaluations, self.config.max_evaluations)
    }

    fn close(&mut self) {
        if self.lifecycle.close() {
            self.problem.close();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operators::DeVariant;
    use crate::problems::Sphere;

    fn small_config() -> DeConfig {
        DeConfig::default()
            .with_population_size(20)
            .with_max_evaluations(20 * 40)
            .with_seed(42)
    }

    #[test]
    fn test_best_never_worsens() {
        let mut de = DifferentialEvolution::new(Sphere::new(4), small_config()).unwrap();
        de.init_progress().unwrap();
        let mut best = de.population()[0].objective(0);
        while !de.is_stopping_condition_reached() {
            de.step().unwrap();
            let now = de.population()[0].objective(0);
            assert!(now <= best);
            best = now;
        }
        assert_eq!(de.result().unwrap()[0].objective(0), best);
    }

    #[test]
    fn test_population_sorted_and_sized() {
        let mut de = DifferentialEvolution::new(Sphere::new(3), small_config()).unwrap();
        de.init_progress().unwrap();
        de.step().unwrap();
        let pop = de.population();
        assert_eq!(pop.len(), 20);
        assert!(pop.windows(2).all(|w| w[0].objective(0) <= w[1].objective(0)));
        assert!(pop.iter().all(|s| s.within_bounds()));
        assert_eq!(de.evaluations(), 40);
    }

    #[test]
    fn test_every_variant_runs() {
        for variant in [
            DeVariant::Rand1Bin,
            DeVariant::Rand1Exp,
            DeVariant::Rand2Bin,
            DeVariant::Best1Bin,
            DeVariant::Best1Exp,
            DeVariant::CurrentToRand1,
            DeVariant::CurrentToBest1Bin,
        ] {
            let config = small_config().with_variant(variant);
            let mut de = DifferentialEvolution::new(Sphere::new(3), config).unwrap();
            let result = de.run().unwrap();
            assert_eq!(result.len(), 1, "{variant}");
        }
    }

    #[test]
    fn test_status() {
        let mut de = DifferentialEvolution::new(Sphere::new(2), small_config()).unwrap();
        de.init_progress().unwrap();
        assert_eq!(de.status(), "Number of evaluations: 20 / 800");
    }

    #[test]
    fn test_crossover_needing_more_donors_rejected() {
        let de = DifferentialEvolution::new(Sphere::new(2), small_config().with_population_size(5))
            .unwrap();
        let rand2 = DifferentialEvolutionCrossover::new(0.5, 0.5, DeVariant::Rand2Bin).unwrap();
        assert!(matches!(de.with_crossover(rand2), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_target_as_donor_with_minimal_population() {
        // rand/1/bin needs three donors; a population of three only works
        // when each target may donate to itself.
        let config = small_config().with_population_size(3).with_max_evaluations(30);
        assert!(matches!(
            DifferentialEvolution::new(Sphere::new(2), config.clone()),
            Err(Error::InvalidConfig(_))
        ));

        let mut de =
            DifferentialEvolution::new(Sphere::new(2), config.with_target_allowed(true)).unwrap();
        de.init_progress().unwrap();
        let initial = de.population()[0].objective(0);
        while !de.is_stopping_condition_reached() {
            de.step().unwrap();
        }
        assert_eq!(de.evaluations(), 30);
        assert_eq!(de.population().len(), 3);
        assert!(de.result().unwrap()[0].objective(0) <= initial);
    }
}
