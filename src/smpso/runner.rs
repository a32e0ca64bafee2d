//! SMPSO swarm loop.

use super::config::SmpsoConfig;
use crate::algorithm::{fraction, Algorithm, AlgorithmState, Lifecycle};
use crate::archive::BoundedArchive;
use crate::core::{evaluate_population, validate_bounds, Problem, Solution, Variable};
use crate::dominance::{CrowdingDistanceComparator, DominanceComparator, SolutionComparator};
use crate::error::{Error, Result};
use crate::operators::{per_variable_probability, MutationOperator, PolynomialMutation};
use crate::random::{rng_from_seed, uniform};
use rand::rngs::StdRng;
use rand::Rng;
use std::cmp::Ordering;
use tracing::{debug, info};

/// Every sixth particle (index 0, 6, 12, ...) is mutated after moving.
const PERTURBATION_STRIDE: usize = 6;

/// SMPSO (Nebro et al., 2009): speed-constrained multi-objective particle
/// swarm optimization.
///
/// Each particle keeps a velocity and a personal best. Leaders live in a
/// crowding-distance [`BoundedArchive`]; the global guide of a particle is
/// the less crowded of two random leaders. Velocities are scaled by the
/// constriction coefficient and clamped to half the variable range, and a
/// particle that leaves its bounds is clamped with its velocity reversed.
///
/// The budget is counted in iterations; [`result`](Algorithm::result)
/// returns the leaders.
///
/// # Usage
///
/// ```
/// use u_moea::algorithm::Algorithm;
/// use u_moea::problems::Zdt1;
/// use u_moea::smpso::{Smpso, SmpsoConfig};
///
/// let config = SmpsoConfig::default()
///     .with_swarm_size(20)
///     .with_archive_size(20)
///     .with_max_iterations(10)
///     .with_seed(42);
/// let mut smpso = Smpso::new(Zdt1::new(5), config).unwrap();
/// let leaders = smpso.run().unwrap();
/// assert!(!leaders.is_empty() && leaders.len() <= 20);
/// ```
pub struct Smpso<P: Problem> {
    problem: P,
    config: SmpsoConfig,
    lifecycle: Lifecycle,
    rng: StdRng,
    swarm: Vec<Solution<P::Variable>>,
    speed: Vec<Vec<f64>>,
    local_best: Vec<Solution<P::Variable>>,
    leaders: BoundedArchive<P::Variable>,
    iterations: usize,
    /// Half the width of each variable range.
    delta_max: Vec<f64>,
    dominance: DominanceComparator,
    mutation: Box<dyn MutationOperator<P::Variable>>,
}

impl<P: Problem> Smpso<P> {
    /// Creates the algorithm with polynomial mutation as the perturbation.
    ///
    /// # Errors
    /// Returns [`Error::InvalidConfig`] for an invalid configuration or
    /// inverted variable bounds.
    pub fn new(problem: P, config: SmpsoConfig) -> Result<Self> {
        config.validate()?;
        validate_bounds(problem.bounds())?;

        let n = problem.number_of_variables();
        let mutation = PolynomialMutation::new(
            config
                .mutation_probability
                .unwrap_or_else(|| per_variable_probability(n)),
            config.mutation_distribution_index,
        )?;
        let delta_max = problem.bounds().iter().map(|b| b.width() / 2.0).collect();

        Ok(Self {
            rng: rng_from_seed(config.seed),
            leaders: BoundedArchive::with_crowding_distance(config.archive_size),
            problem,
            config,
            lifecycle: Lifecycle::new("SMPSO"),
            swarm: Vec::new(),
            speed: Vec::new(),
            local_best: Vec::new(),
            iterations: 0,
            delta_max,
            dominance: DominanceComparator::new(),
            mutation: Box::new(mutation),
        })
    }

    /// Replaces the perturbation operator.
    pub fn with_mutation(mut self, mutation: impl MutationOperator<P::Variable> + 'static) -> Self {
        self.mutation = Box::new(mutation);
        self
    }

    /// The configuration.
    pub fn config(&self) -> &SmpsoConfig {
        &self.config
    }

    /// Current particle positions.
    pub fn swarm(&self) -> &[Solution<P::Variable>] {
        &self.swarm
    }

    /// Current particle velocities, one row per particle.
    pub fn speed(&self) -> &[Vec<f64>] {
        &self.speed
    }

    /// Personal best of each particle.
    pub fn local_best(&self) -> &[Solution<P::Variable>] {
        &self.local_best
    }

    /// The leaders archive.
    pub fn leaders(&self) -> &BoundedArchive<P::Variable> {
        &self.leaders
    }

    /// Iterations performed so far (initialization counts as one).
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Constriction coefficient for learning factors `c1`, `c2`.
    fn constriction_coefficient(c1: f64, c2: f64) -> f64 {
        let rho = c1 + c2;
        if rho <= 4.0 {
            1.0
        } else {
            2.0 / (2.0 - rho - (rho * rho - 4.0 * rho).sqrt())
        }
    }

    /// Inertia weight; constant at `weight_max`.
    fn inertia_weight(&self) -> f64 {
        self.config.weight_max
    }

    fn velocity_constriction(&self, v: f64, j: usize) -> f64 {
        let dmax = self.delta_max[j];
        v.clamp(-dmax, dmax)
    }

    /// New velocities for every particle.
    fn update_velocity(&mut self) -> Result<Vec<Vec<f64>>> {
        let leaders = self.leaders.solutions();
        if leaders.is_empty() {
            return Err(Error::state("leaders archive is empty"));
        }
        let c = &self.config;
        let wmax = self.inertia_weight();
        let mut speed = self.speed.clone();

        for (i, particle) in self.swarm.iter().enumerate() {
            let best_particle = &self.local_best[i];
            let best_global = select_global_best(leaders, &mut self.rng);

            let r1 = uniform(&mut self.rng, c.r1_min, c.r1_max);
            let r2 = uniform(&mut self.rng, c.r2_min, c.r2_max);
            let c1 = uniform(&mut self.rng, c.c1_min, c.c1_max);
            let c2 = uniform(&mut self.rng, c.c2_min, c.c2_max);
            let chi = Self::constriction_coefficient(c1, c2);

            for (j, v) in speed[i].iter_mut().enumerate() {
                let x = particle.variable(j).to_f64();
                let cognitive = c1 * r1 * (best_particle.variable(j).to_f64() - x);
                let social = c2 * r2 * (best_global.variable(j).to_f64() - x);
                *v = self.velocity_constriction(chi * (wmax * *v + cognitive + social), j);
            }
        }
        Ok(speed)
    }

    /// Moves every particle; a bound hit clamps the position and scales
    /// the velocity by the matching change factor.
    fn update_position(&self, speed: &mut [Vec<f64>]) -> Vec<Solution<P::Variable>> {
        let mut swarm = self.swarm.clone();
        for (particle, velocity) in swarm.iter_mut().zip(speed.iter_mut()) {
            for (j, v) in velocity.iter_mut().enumerate() {
                let bounds = particle.bounds(j);
                let x = particle.variable(j).to_f64() + *v;
                if x < bounds.lower.to_f64() {
                    *v *= self.config.change_velocity1;
                } else if x > bounds.upper.to_f64() {
                    *v *= self.config.change_velocity2;
                }
                particle.set_variable(j, bounds.repair(x));
            }
        }
        swarm
    }

    fn perturbation(&mut self, swarm: &mut [Solution<P::Variable>]) {
        for particle in swarm.iter_mut().step_by(PERTURBATION_STRIDE) {
            self.mutation.execute(particle, &mut self.rng);
        }
    }

    fn update_leaders(&mut self) {
        for particle in &self.swarm {
            self.leaders.add(particle.clone());
        }
    }

    /// A particle replaces its personal best unless the best dominates it.
    fn update_particles_memory(&mut self) {
        for (particle, best) in self.swarm.iter().zip(self.local_best.iter_mut()) {
            if self.dominance.compare(particle, best) != Ordering::Greater {
                *best = particle.clone();
            }
        }
    }

    fn generation(&mut self) -> Result<()> {
        let mut speed = self.update_velocity()?;
        let mut swarm = self.update_position(&mut speed);
        self.perturbation(&mut swarm);
        evaluate_population(&self.problem, &mut swarm, self.config.parallel)?;

        self.swarm = swarm;
        self.speed = speed;
        self.update_leaders();
        self.update_particles_memory();
        self.iterations += 1;
        self.leaders.compute_density_estimator();
        Ok(())
    }

    fn initialize(&mut self) -> Result<()> {
        let mut swarm: Vec<_> = (0..self.config.swarm_size)
            .map(|_| self.problem.create_solution(&mut self.rng))
            .collect();
        evaluate_population(&self.problem, &mut swarm, self.config.parallel)?;

        let n = self.problem.number_of_variables();
        self.speed = vec![vec![0.0; n]; swarm.len()];
        self.local_best = swarm.clone();
        self.swarm = swarm;
        self.update_leaders();
        self.iterations = 1;
        self.leaders.compute_density_estimator();
        Ok(())
    }
}

/// Binary tournament on crowding distance between two random leaders.
fn select_global_best<'a, V>(leaders: &'a [Solution<V>], rng: &mut StdRng) -> &'a Solution<V> {
    let one = &leaders[rng.random_range(0..leaders.len())];
    let two = &leaders[rng.random_range(0..leaders.len())];
    if CrowdingDistanceComparator.compare(one, two) != Ordering::Greater {
        one
    } else {
        two
    }
}

impl<P: Problem> Algorithm for Smpso<P> {
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
            swarm = self.swarm.len(),
            leaders = self.leaders.len(),
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
            leaders = self.leaders.len(),
            "generation complete"
        );
        let done = self.iterations >= self.config.max_iterations;
        if done {
            info!(
                algorithm = self.lifecycle.name(),
                iterations = self.iterations,
                leaders = self.leaders.len(),
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
        Ok(self.leaders.solutions().to_vec())
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
