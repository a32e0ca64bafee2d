//! GA evolutionary loop execution.
//!
//! [`GeneticAlgorithm`] orchestrates the evolutionary process one
//! generation per [`step`](Algorithm::step):
//! selection → crossover → mutation → evaluation → replacement.

use super::config::{GaConfig, GaVariant};
use crate::algorithm::{fraction, Algorithm, AlgorithmState, Lifecycle};
use crate::core::{evaluate_population, validate_bounds, Problem, Solution};
use crate::dominance::{ObjectiveComparator, SolutionComparator};
use crate::error::{Error, Result};
use crate::operators::{
    per_variable_probability, CrossoverOperator, MutationOperator, PolynomialMutation,
    SbxCrossover, SelectionOperator, TournamentSelection,
};
use crate::random::rng_from_seed;
use rand::rngs::StdRng;
use std::sync::Arc;
use tracing::{debug, info};

/// Parents that survive a generational replacement unchanged.
const ELITES: usize = 2;

/// Single-objective genetic algorithm.
///
/// The population is kept sorted by the comparator (objective 0 by
/// default), best first.
///
/// - [`GaVariant::Generational`]: a whole offspring population is bred by
///   tournament, crossover and mutation; the two best parents join it and
///   the best `population_size` survive.
/// - [`GaVariant::SteadyState`]: each step breeds one child, which replaces
///   the worst member only when strictly better.
///
/// The budget is counted in evaluations; [`result`](Algorithm::result)
/// returns the single best solution.
///
/// # Usage
///
/// ```
/// use u_moea::algorithm::Algorithm;
/// use u_moea::ga::{GaConfig, GeneticAlgorithm};
/// use u_moea::problems::Sphere;
///
/// let config = GaConfig::default()
///     .with_population_size(30)
///     .with_max_evaluations(3_000)
///     .with_seed(42);
/// let mut ga = GeneticAlgorithm::new(Sphere::new(3), config).unwrap();
/// let best = ga.run().unwrap();
/// println!("Best fitness: {}", best[0].objective(0));
/// ```
pub struct GeneticAlgorithm<P: Problem> {
    problem: P,
    config: GaConfig,
    lifecycle: Lifecycle,
    rng: StdRng,
    population: Vec<Solution<P::Variable>>,
    evaluations: usize,
    comparator: Arc<dyn SolutionComparator<P::Variable>>,
    selection: Box<dyn SelectionOperator<P::Variable>>,
    crossover: Box<dyn CrossoverOperator<P::Variable>>,
    mutation: Box<dyn MutationOperator<P::Variable>>,
}

impl<P: Problem> GeneticAlgorithm<P> {
    /// Creates the algorithm with SBX, polynomial mutation and tournament
    /// selection on objective 0.
    ///
    /// # Errors
    /// Returns [`Error::InvalidConfig`] for an invalid configuration or
    /// inverted variable bounds.
    pub fn new(problem: P, config: GaConfig) -> Result<Self> {
        config.validate()?;
        validate_bounds(problem.bounds())?;

        let n = problem.number_of_variables();
        let crossover = SbxCrossover::new(
            config.crossover_probability,
            config.crossover_distribution_index,
        )?;
        let mutation = PolynomialMutation::new(
            config
                .mutation_probability
                .unwrap_or_else(|| per_variable_probability(n)),
            config.mutation_distribution_index,
        )?;
        let selection = TournamentSelection::<P::Variable>::new(
            config.tournament_size,
            ObjectiveComparator::new(0),
        )?;

        Ok(Self {
            rng: rng_from_seed(config.seed),
            problem,
            config,
            lifecycle: Lifecycle::new("GA"),
            population: Vec::new(),
            evaluations: 0,
            comparator: Arc::new(ObjectiveComparator::new(0)),
            selection: Box::new(selection),
            crossover: Box::new(crossover),
            mutation: Box::new(mutation),
        })
    }

    /// Replaces the crossover operator.
    ///
    /// # Errors
    /// Returns [`Error::InvalidConfig`] if the operator needs no parents or
    /// produces no children.
    pub fn with_crossover(
        mut self,
        crossover: impl CrossoverOperator<P::Variable> + 'static,
    ) -> Result<Self> {
        if crossover.number_of_required_parents() == 0
            || crossover.number_of_generated_children() == 0
        {
            return Err(Error::config(
                "crossover must consume and produce at least one solution",
            ));
        }
        self.crossover = Box::new(crossover);
        Ok(self)
    }

    /// Replaces the mutation operator.
    pub fn with_mutation(mut self, mutation: impl MutationOperator<P::Variable> + 'static) -> Self {
        self.mutation = Box::new(mutation);
        self
    }

    /// Replaces the parent selection operator.
    pub fn with_selection(
        mut self,
        selection: impl SelectionOperator<P::Variable> + 'static,
    ) -> Self {
        self.selection = Box::new(selection);
        self
    }

    /// Replaces the comparator that orders the population and rebuilds the
    /// tournament on it. Call [`with_selection`](Self::with_selection)
    /// afterwards to use another selection operator.
    ///
    /// # Errors
    /// Returns [`Error::InvalidConfig`] if the configured tournament size is
    /// zero.
    pub fn with_comparator(
        mut self,
        comparator: impl SolutionComparator<P::Variable> + 'static,
    ) -> Result<Self> {
        let comparator: Arc<dyn SolutionComparator<P::Variable>> = Arc::new(comparator);
        self.selection = Box::new(TournamentSelection::new(
            self.config.tournament_size,
            Arc::clone(&comparator),
        )?);
        self.comparator = comparator;
        Ok(self)
    }

    /// The configuration.
    pub fn config(&self) -> &GaConfig {
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

    fn select_parents(&mut self, count: usize) -> Result<Vec<usize>> {
        (0..count)
            .map(|_| self.selection.select(&self.population, &mut self.rng))
            .collect()
    }

    /// Breeds `target` children from parents taken in groups of the
    /// crossover arity.
    fn breed(&mut self, target: usize) -> Result<Vec<Solution<P::Variable>>> {
        let arity = self.crossover.number_of_required_parents();
        let children = self.crossover.number_of_generated_children();
        let mating_pool = self.select_parents(target.div_ceil(children) * arity)?;

        let mut offspring = Vec::with_capacity(target);
        for group in mating_pool.chunks_exact(arity) {
            let parents: Vec<&Solution<P::Variable>> =
                group.iter().map(|&i| &self.population[i]).collect();
            for mut child in self.crossover.execute(&parents, &mut self.rng)? {
                if offspring.len() >= target {
                    break;
                }
                self.mutation.execute(&mut child, &mut self.rng);
                offspring.push(child);
            }
            if offspring.len() >= target {
                break;
            }
        }
        Ok(offspring)
    }

    fn generational(&mut self) -> Result<()> {
        let mut offspring = self.breed(self.config.population_size)?;
        evaluate_population(&self.problem, &mut offspring, self.config.parallel)?;
        let evaluated = offspring.len();

        offspring.extend(self.population.iter().take(ELITES).cloned());
        self.sort(&mut offspring);
        offspring.truncate(self.config.population_size);

        self.population = offspring;
        self.evaluations += evaluated;
        Ok(())
    }

    fn steady_state(&mut self) -> Result<()> {
        let mut offspring = self.breed(1)?;
        evaluate_population(&self.problem, &mut offspring, self.config.parallel)?;
        let evaluated = offspring.len();

        // The child enters behind any equal member and is dropped first.
        let mut population = std::mem::take(&mut self.population);
        population.extend(offspring);
        self.sort(&mut population);
        population.truncate(self.config.population_size);

        self.population = population;
        self.evaluations += evaluated;
        Ok(())
    }

    fn generation(&mut self) -> Result<()> {
        match self.config.variant {
            GaVariant::Generational => self.generational(),
            GaVariant::SteadyState => self.steady_state(),
        }
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

impl<P: Problem> Algorithm for GeneticAlgorithm<P> {
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
            variant = ?self.config.variant,
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

// ============================================================================
// Tests
// ============================================================================
