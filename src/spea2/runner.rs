//! SPEA2 generation loop.

use super::config::Spea2Config;
use crate::algorithm::{fraction, Algorithm, AlgorithmState, Lifecycle};
use crate::core::{evaluate_population, validate_bounds, Problem, Solution};
use crate::dominance::{EnvironmentalSelection, StrengthFitnessComparator, StrengthRawFitness};
use crate::error::{Error, Result};
use crate::operators::{
    per_variable_probability, CrossoverOperator, MutationOperator, PolynomialMutation,
    SbxCrossover, SelectionOperator, TournamentSelection,
};
use crate::random::rng_from_seed;
use rand::rngs::StdRng;
use tracing::{debug, info};

/// SPEA2 (Zitzler, Laumanns & Thiele, 2001).
///
/// Each generation merges the archive with the current population, assigns
/// strength raw fitness to the union and truncates it back into the
/// archive. Offspring are then bred from the archive alone: parents come
/// from binary tournaments on fitness, and only the first child of each
/// crossover is mutated and kept. The offspring become the next population.
///
/// The budget is counted in iterations; [`result`](Algorithm::result)
/// returns the archive, which is empty until the first step.
pub struct Spea2<P: Problem> {
    problem: P,
    config: Spea2Config,
    lifecycle: Lifecycle,
    rng: StdRng,
    population: Vec<Solution<P::Variable>>,
    archive: Vec<Solution<P::Variable>>,
    iterations: usize,
    fitness: StrengthRawFitness,
    environmental_selection: EnvironmentalSelection,
    selection: Box<dyn SelectionOperator<P::Variable>>,
    crossover: Box<dyn CrossoverOperator<P::Variable>>,
    mutation: Box<dyn MutationOperator<P::Variable>>,
}

impl<P: Problem> Spea2<P> {
    /// Creates the algorithm with SBX, polynomial mutation and binary
    /// tournament on strength fitness.
    ///
    /// # Errors
    /// Returns [`Error::InvalidConfig`] for an invalid configuration or
    /// inverted variable bounds.
    pub fn new(problem: P, config: Spea2Config) -> Result<Self> {
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

        Ok(Self {
            rng: rng_from_seed(config.seed),
            fitness: StrengthRawFitness::new(config.k)?,
            environmental_selection: EnvironmentalSelection::new(config.archive_size()),
            problem,
            config,
            lifecycle: Lifecycle::new("SPEA2"),
            population: Vec::new(),
            archive: Vec::new(),
            iterations: 0,
            selection: Box::new(TournamentSelection::binary(StrengthFitnessComparator)),
            crossover: Box::new(crossover),
            mutation: Box::new(mutation),
        })
    }

    /// Replaces the crossover operator. Only the first child of each call
    /// is used.
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

    /// Replaces the mating selection operator (applied to the archive).
    pub fn with_selection(
        mut self,
        selection: impl SelectionOperator<P::Variable> + 'static,
    ) -> Self {
        self.selection = Box::new(selection);
        self
    }

    /// The configuration.
    pub fn config(&self) -> &Spea2Config {
        &self.config
    }

    /// The current population.
    pub fn population(&self) -> &[Solution<P::Variable>] {
        &self.population
    }

    /// The current archive.
    pub fn archive(&self) -> &[Solution<P::Variable>] {
        &self.archive
    }

    /// Iterations performed so far (initialization counts as one).
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Merges archive and population and truncates the union.
    fn update_archive(&self) -> Result<Vec<Solution<P::Variable>>> {
        let mut union = self.archive.clone();
        union.extend(self.population.iter().cloned());
        self.fitness.compute(&mut union)?;
        Ok(self.environmental_selection.execute(union))
    }

    fn reproduction(
        &mut self,
        mating_pool: &[Solution<P::Variable>],
    ) -> Result<Vec<Solution<P::Variable>>> {
        let arity = self.crossover.number_of_required_parents();
        let target = self.config.population_size;
        let mut offspring = Vec::with_capacity(target);

        while offspring.len() < target {
            let mut parents = Vec::with_capacity(arity);
            for _ in 0..arity {
                let i = self.selection.select(mating_pool, &mut self.rng)?;
                parents.push(&mating_pool[i]);
            }
            let mut children = self.crossover.execute(&parents, &mut self.rng)?;
            if children.is_empty() {
                return Err(Error::state("crossover produced no children"));
            }
            let mut child = children.swap_remove(0);
            self.mutation.execute(&mut child, &mut self.rng);
            offspring.push(child);
        }
        Ok(offspring)
    }

    fn generation(&mut self) -> Result<()> {
        let archive = self.update_archive()?;
        let mut offspring = self.reproduction(&archive)?;
        evaluate_population(&self.problem, &mut offspring, self.config.parallel)?;

        self.archive = archive;
        self.population = offspring;
        self.iterations += 1;
        Ok(())
    }

    fn initialize(&mut self) -> Result<()> {
        let mut population: Vec<_> = (0..self.config.population_size)
            .map(|_| self.problem.create_solution(&mut self.rng))
            .collect();
        evaluate_population(&self.problem, &mut population, self.config.parallel)?;
        self.population = population;
        self.archive.clear();
        self.iterations = 1;
        Ok(())
    }
}

impl<P: Problem> Algorithm for Spea2<P> {
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
            archive_size = self.config.archive_size(),
            max_iterations = self.config.max_iterations,
            "initialized"
        );
        self.lifecycle
            .initialized(self.iterations >= self.config.max_iterations);
        Ok(())
    }

    fn step(&mut self) -> Result<()> {
        self.lifecycle.begin_step()?;
        let outcome = self.generation();
        self.lifecycle.guard(outcome)?;

        debug!(
            algorithm = self.lifecycle.name(),
            iterations = self.iterations,
            archive = self.archive.len(),
            "generation complete"
        );
        let done = self.iterations >= self.config.max_iterations;
        if done {
            info!(
                algorithm = self.lifecycle.name(),
                iterations = self.iterations,
                archive = self.archive.len(),
                "terminated"
            );
        }
        self.lifecycle.stepped(done);
        Ok(())
    }

    fn is_stopping_condition_reached(&self) -> bool {
        self.lifecycle.failed() || self.iterations >= self.config.max_iterations
    }

    fn result(&self) -> Result<Vec<Solution<P::Variable>>> {
        self.lifecycle.check_result()?;
        Ok(self.archive.clone())
    }

    fn status(&self) -> String {
        format!(
            "Number of iterations: {} / {}",
            self.iterations, self.config.max_iterations
        )
    }

    fn progress(&self) -> f64 {
        fraction(self.iterations, self.config.max_iterations)
    }

    fn close(&mut self) {
        if self.lifecycle.close() {
            self.problem.close();
        }
    }
}
