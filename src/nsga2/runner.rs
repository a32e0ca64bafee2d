//! NSGA-II generation loop.

use super::config::Nsga2Config;
use crate::algorithm::{fraction, Algorithm, AlgorithmState, Lifecycle};
use crate::archive::NonDominatedArchive;
use crate::core::{evaluate_population, validate_bounds, Problem, Solution};
use crate::dominance::{RankingAndCrowdingComparator, RankingAndCrowdingSelection};
use crate::error::{Error, Result};
use crate::operators::{
    CrossoverOperator, MutationOperator, PolynomialMutation, SbxCrossover, SelectionOperator,
    TournamentSelection,
};
use crate::random::rng_from_seed;
use rand::rngs::StdRng;
use tracing::{debug, info};

/// NSGA-II (Deb et al., 2002).
///
/// Each generation draws a mating pool by tournament, recombines it with the
/// crossover operator (parents taken in groups of the operator's arity),
/// mutates every child, evaluates the offspring, and keeps the best
/// `population_size` solutions of parents and offspring by rank and
/// crowding distance.
///
/// The budget is counted in evaluations; [`result`](Algorithm::result)
/// returns the non-dominated subset of the final population.
///
/// # Usage
///
/// ```
/// use u_moea::algorithm::Algorithm;
/// use u_moea::nsga2::{Nsga2, Nsga2Config};
/// use u_moea::problems::Schaffer;
///
/// let config = Nsga2Config::default()
///     .with_population_size(20)
///     .with_offspring_population_size(20)
///     .with_max_evaluations(400)
///     .with_seed(42);
/// let mut nsga2 = Nsga2::new(Schaffer::with_bounds(-10.0, 10.0), config).unwrap();
/// let front = nsga2.run().unwrap();
/// nsga2.close();
/// assert!(!front.is_empty() && front.len() <= 20);
/// ```
pub struct Nsga2<P: Problem> {
    problem: P,
    config: Nsga2Config,
    lifecycle: Lifecycle,
    rng: StdRng,
    population: Vec<Solution<P::Variable>>,
    evaluations: usize,
    selection: Box<dyn SelectionOperator<P::Variable>>,
    crossover: Box<dyn CrossoverOperator<P::Variable>>,
    mutation: Box<dyn MutationOperator<P::Variable>>,
}

impl<P: Problem> Nsga2<P> {
    /// Creates the algorithm with SBX, polynomial mutation and binary
    /// tournament on rank and crowding distance.
    ///
    /// # Errors
    /// Returns [`Error::InvalidConfig`] for an invalid configuration or
    /// inverted variable bounds.
    pub fn new(problem: P, config: Nsga2Config) -> Result<Self> {
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
                .unwrap_or_else(|| crate::operators::per_variable_probability(n)),
            config.mutation_distribution_index,
        )?;

        Ok(Self {
            rng: rng_from_seed(config.seed),
            problem,
            config,
            lifecycle: Lifecycle::new("NSGA-II"),
            population: Vec::new(),
            evaluations: 0,
            selection: Box::new(TournamentSelection::binary(RankingAndCrowdingComparator)),
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

    /// Replaces the mating selection operator.
    pub fn with_selection(
        mut self,
        selection: impl SelectionOperator<P::Variable> + 'static,
    ) -> Self {
        self.selection = Box::new(selection);
        self
    }

    /// The configuration.
    pub fn config(&self) -> &Nsga2Config {
        &self.config
    }

    /// The problem being solved.
    pub fn problem(&self) -> &P {
        &self.problem
    }

    /// The current population.
    pub fn population(&self) -> &[Solution<P::Variable>] {
        &self.population
    }

    /// Evaluations performed so far.
    pub fn evaluations(&self) -> usize {
        self.evaluations
    }

    /// Mating pool size: enough parents for `offspring_population_size`
    /// children, in whole crossover groups.
    fn mating_pool_size(&self) -> usize {
        let parents = self.crossover.number_of_required_parents();
        let children = self.crossover.number_of_generated_children();
        let groups = self.config.offspring_population_size.div_ceil(children);
        groups * parents
    }

    fn selection(&mut self) -> Result<Vec<usize>> {
        (0..self.mating_pool_size())
            .map(|_| self.selection.select(&self.population, &mut self.rng))
            .collect()
    }

    fn reproduction(&mut self, mating_pool: &[usize]) -> Result<Vec<Solution<P::Variable>>> {
        let arity = self.crossover.number_of_required_parents();
        let target = self.config.offspring_population_size;
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

    fn replacement(
        &self,
        offspring: Vec<Solution<P::Variable>>,
    ) -> Result<Vec<Solution<P::Variable>>> {
        let mut joint = self.population.clone();
        joint.extend(offspring);
        RankingAndCrowdingSelection::new(self.config.population_size).execute(joint)
    }

    fn generation(&mut self) -> Result<()> {
        let mating_pool = self.selection()?;
        let mut offspring = self.reproduction(&mating_pool)?;
        evaluate_population(&self.problem, &mut offspring, self.config.parallel)?;
        let evaluated = offspring.len();
        let population = self.replacement(offspring)?;

        self.population = population;
        self.evaluations += evaluated;
        Ok(())
    }

    fn initialize(&mut self) -> Result<()> {
        let mut population: Vec<_> = (0..self.config.population_size)
            .map(|_| self.problem.create_solution(&mut self.rng))
            .collect();
        evaluate_population(&self.problem, &mut population, self.config.parallel)?;
        // Stamp rank and crowding so the first tournament is informed.
        self.population =
            RankingAndCrowdingSelection::new(self.config.population_size).execute(population)?;
        self.evaluations = self.config.population_size;
        Ok(())
    }
}

impl<P: Problem> Algorithm for Nsga2<P> {
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
            population = self.population.len(),
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
        Ok(NonDominatedArchive::from_solutions(self.population.iter().cloned()).into_solutions())
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
    use crate::core::Bounds;
    use crate::dominance::{DominanceComparator, SolutionComparator};
    use crate::error::EvaluationError;
    use crate::operators::{NullMutation, RandomSelection};
    use crate::problems::{Schaffer, Srinivas, Zdt1};
    use std::cmp::Ordering;
    use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
    use std::sync::Arc;

    fn small_config() -> Nsga2Config {
        Nsga2Config::default()
            .with_population_size(20)
            .with_offspring_population_size(20)
            .with_max_evaluations(220)
            .with_seed(42)
    }

    #[test]
    fn test_result_is_mutually_non_dominated() {
        let mut nsga2 = Nsga2::new(Zdt1::new(5), small_config()).unwrap();
        let front = nsga2.run().unwrap();
        assert!(!front.is_empty() && front.len() <= 20);
        let c = DominanceComparator::new();
        for a in &front {
            assert!(a.within_bounds());
            for b in &front {
                assert_ne!(c.compare(a, b), Ordering::Less);
            }
        }
        assert_eq!(nsga2.evaluations(), 220);
        assert_eq!(nsga2.state(), AlgorithmState::Terminated);
    }

    #[test]
    fn test_population_size_invariant() {
        let config = small_config().with_offspring_population_size(7);
        let mut nsga2 = Nsga2::new(Zdt1::new(4), config).unwrap();
        nsga2.init_progress().unwrap();
        assert_eq!(nsga2.population().len(), 20);
        for _ in 0..3 {
            nsga2.step().unwrap();
            assert_eq!(nsga2.population().len(), 20);
        }
        assert_eq!(nsga2.evaluations(), 20 + 3 * 7);
    }

    #[test]
    fn test_status_and_progress() {
        let mut nsga2 = Nsga2::new(Schaffer::new(), small_config()).unwrap();
        assert_eq!(nsga2.progress(), 0.0);
        nsga2.init_progress().unwrap();
        assert_eq!(nsga2.status(), "Number of evaluations: 20 / 220");
        nsga2.step().unwrap();
        assert_eq!(nsga2.status(), "Number of evaluations: 40 / 220");
        assert!((nsga2.progress() - 40.0 / 220.0).abs() < 1e-12);
    }

    #[test]
    fn test_stepwise_matches_batch() {
        let mut batch = Nsga2::new(Zdt1::new(6), small_config()).unwrap();
        let batch_result = batch.run().unwrap();

        let mut stepwise = Nsga2::new(Zdt1::new(6), small_config()).unwrap();
        stepwise.init_progress().unwrap();
        while !stepwise.is_stopping_condition_reached() {
            stepwise.step().unwrap();
        }
        let stepwise_result = stepwise.result().unwrap();

        let objectives = |r: &[Solution<f64>]| -> Vec<Vec<f64>> {
            r.iter().map(|s| s.objectives().to_vec()).collect()
        };
        assert_eq!(objectives(&batch_result), objectives(&stepwise_result));
    }

    #[test]
    fn test_constrained_problem_prefers_feasible() {
        let config = small_config().with_max_evaluations(1000);
        let mut nsga2 = Nsga2::new(Srinivas::new(), config).unwrap();
        let front = nsga2.run().unwrap();
        assert!(front.iter().all(|s| s.is_feasible()));
    }

    #[test]
    fn test_step_before_init_rejected() {
        let mut nsga2 = Nsga2::new(Schaffer::new(), small_config()).unwrap();
        assert!(matches!(nsga2.step(), Err(Error::InvalidState(_))));
        assert!(matches!(nsga2.result(), Err(Error::InvalidState(_))));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = small_config().with_crossover_probability(2.0);
        assert!(matches!(
            Nsga2::new(Schaffer::new(), config),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_custom_operators() {
        let mut nsga2 = Nsga2::new(Zdt1::new(3), small_config())
            .unwrap()
            .with_mutation(NullMutation)
            .with_selection(RandomSelection);
        assert!(nsga2.run().is_ok());
    }

    struct Flaky {
        bounds: Arc<[Bounds<f64>]>,
        calls: AtomicUsize,
        fail_after: usize,
        closed: AtomicUsize,
    }

    impl Problem for Flaky {
        type Variable = f64;
        fn name(&self) -> &str {
            "Flaky"
        }
        fn number_of_objectives(&self) -> usize {
            2
        }
        fn bounds(&self) -> &Arc<[Bounds<f64>]> {
            &self.bounds
        }
        fn evaluate(&self, s: &mut Solution<f64>) -> std::result::Result<(), EvaluationError> {
            if self.calls.fetch_add(1, AtomicOrdering::SeqCst) >= self.fail_after {
                return Err(EvaluationError::new("simulator fault"));
            }
            let x = s.variable(0);
            s.set_objective(0, x);
            s.set_objective(1, 1.0 - x);
            Ok(())
        }
        fn close(&self) {
            self.closed.fetch_add(1, AtomicOrdering::SeqCst);
        }
    }

    #[test]
    fn test_evaluation_failure_marks_failed() {
        let problem = Arc::new(Flaky {
            bounds: vec![Bounds::new(0.0, 1.0); 2].into(),
            calls: AtomicUsize::new(0),
            fail_after: 30,
            closed: AtomicUsize::new(0),
        });
        let mut nsga2 = Nsga2::new(problem.clone(), small_config()).unwrap();
        nsga2.init_progress().unwrap();
        let before: Vec<Solution<f64>> = nsga2.population().to_vec();

        assert!(matches!(nsga2.step(), Err(Error::Evaluation(_))));
        assert_eq!(nsga2.state(), AlgorithmState::Failed);
        assert!(nsga2.is_stopping_condition_reached());
        assert!(matches!(nsga2.result(), Err(Error::InvalidState(_))));
        assert!(nsga2.step().is_err());
        // The failed generation was not committed.
        assert_eq!(nsga2.population(), &before[..]);
        assert_eq!(nsga2.evaluations(), 20);

        nsga2.close();
        nsga2.close();
        assert_eq!(problem.closed.load(AtomicOrdering::SeqCst), 1);
    }
}
