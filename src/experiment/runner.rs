//! Worker-side execution of an algorithm.

use super::monitor::ExperimentMonitor;
use crate::algorithm::{Algorithm, AlgorithmState};
use crate::core::Solution;
use crate::error::{Error, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Result of an experiment run.
#[derive(Debug, Clone)]
pub struct ExperimentOutcome<V> {
    /// The algorithm's result at the last completed generation.
    pub solutions: Vec<Solution<V>>,

    /// Whether the run was cancelled externally.
    pub cancelled: bool,

    /// Final status line of the algorithm.
    pub status: String,

    /// Wall-clock duration of the run.
    pub elapsed: Duration,
}

/// Drives one algorithm one generation at a time.
///
/// Cancellation is observed only between generations; a generation in
/// progress always completes. Progress and status lines are published to
/// the [`ExperimentMonitor`] after initialization and after every step. The
/// algorithm is closed exactly once when the run ends, whatever the
/// outcome.
///
/// # Usage
///
/// ```
/// use u_moea::experiment::Experiment;
/// use u_moea::nsga2::{Nsga2, Nsga2Config};
/// use u_moea::problems::Zdt1;
///
/// let config = Nsga2Config::default()
///     .with_population_size(20)
///     .with_offspring_population_size(20)
///     .with_max_evaluations(200)
///     .with_seed(42);
/// let algorithm = Nsga2::new(Zdt1::new(5), config).unwrap();
///
/// let handle = Experiment::new(algorithm).spawn();
/// let outcome = handle.join().unwrap();
/// assert!(!outcome.cancelled);
/// assert!(!outcome.solutions.is_empty());
/// ```
pub struct Experiment<A: Algorithm> {
    algorithm: A,
    cancel: Arc<AtomicBool>,
    monitor: Arc<ExperimentMonitor>,
}

impl<A: Algorithm> Experiment<A> {
    /// Wraps an algorithm in state [`AlgorithmState::Created`].
    pub fn new(algorithm: A) -> Self {
        Self {
            algorithm,
            cancel: Arc::new(AtomicBool::new(false)),
            monitor: Arc::new(ExperimentMonitor::new()),
        }
    }

    /// Uses an external cancellation token.
    pub fn with_cancel_flag(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = cancel;
        self
    }

    /// The cancellation token.
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    /// The shared monitor.
    pub fn monitor(&self) -> Arc<ExperimentMonitor> {
        Arc::clone(&self.monitor)
    }

    /// Runs to completion (or cancellation) on the calling thread.
    ///
    /// # Errors
    /// Propagates the first initialization or step failure; the algorithm
    /// has been closed by then.
    pub fn run_blocking(self) -> Result<ExperimentOutcome<A::Variable>> {
        let Self {
            algorithm,
            cancel,
            monitor,
        } = self;
        let mut algorithm = Closing(algorithm);
        let outcome = drive(&mut algorithm.0, &cancel, &monitor);
        if let Err(e) = &outcome {
            warn!(algorithm = algorithm.0.name(), error = %e, "experiment failed");
            monitor.log().append(format!("{} failed: {e}", algorithm.0.name()));
        }
        outcome
    }
}

impl<A: Algorithm + 'static> Experiment<A> {
    /// Runs on a dedicated worker thread.
    pub fn spawn(self) -> ExperimentHandle<A::Variable> {
        let cancel = self.cancel_flag();
        let monitor = self.monitor();
        let worker = std::thread::spawn(move || self.run_blocking());
        ExperimentHandle {
            cancel,
            monitor,
            worker,
        }
    }
}

/// Handle to an experiment running on a worker thread.
#[derive(Debug)]
pub struct ExperimentHandle<V> {
    cancel: Arc<AtomicBool>,
    monitor: Arc<ExperimentMonitor>,
    worker: JoinHandle<Result<ExperimentOutcome<V>>>,
}

impl<V> ExperimentHandle<V> {
    /// Requests cancellation at the next generation boundary.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }

    /// Progress and log of the run.
    pub fn monitor(&self) -> &ExperimentMonitor {
        &self.monitor
    }

    /// Whether the worker has finished.
    pub fn is_finished(&self) -> bool {
        self.worker.is_finished()
    }

    /// Waits for the worker.
    ///
    /// # Errors
    /// The run's own error, or [`Error::WorkerPanicked`] if the worker
    /// panicked.
    pub fn join(self) -> Result<ExperimentOutcome<V>> {
        self.worker.join().map_err(|_| Error::WorkerPanicked)?
    }
}

/// Closes the wrapped algorithm when dropped, including on unwind.
struct Closing<A: Algorithm>(A);

impl<A: Algorithm> Drop for Closing<A> {
    fn drop(&mut self) {
        self.0.close();
    }
}

fn drive<A: Algorithm>(
    algorithm: &mut A,
    cancel: &AtomicBool,
    monitor: &ExperimentMonitor,
) -> Result<ExperimentOutcome<A::Variable>> {
    let started = Instant::now();
    if algorithm.state() == AlgorithmState::Created {
        algorithm.init_progress()?;
    }
    info!(algorithm = algorithm.name(), "experiment started");
    monitor.report(algorithm.progress(), algorithm.status());

    let mut cancelled = false;
    while !algorithm.is_stopping_condition_reached() {
        if cancel.load(Ordering::Relaxed) {
            cancelled = true;
            warn!(
                algorithm = algorithm.name(),
                status = %algorithm.status(),
                "experiment cancelled"
            );
            monitor.log().append(format!("{} cancelled", algorithm.name()));
            break;
        }
        algorithm.step()?;
        monitor.report(algorithm.progress(), algorithm.status());
    }

    let solutions = algorithm.result()?;
    let elapsed = started.elapsed();
    info!(
        algorithm = algorithm.name(),
        solutions = solutions.len(),
        cancelled,
        elapsed_ms = elapsed.as_millis() as u64,
        "experiment finished"
    );
    Ok(ExperimentOutcome {
        solutions,
        cancelled,
        status: algorithm.status(),
        elapsed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Bounds, Problem};
    use crate::de::{DeConfig, DifferentialEvolution};
    use crate::error::EvaluationError;
    use crate::nsga2::{Nsga2, Nsga2Config};
    use crate::problems::{Sphere, Zdt1};
    use std::sync::atomic::AtomicUsize;

    /// Sphere that counts closes and blocks evaluations while `gate` is set.
    struct Gated {
        inner: Sphere,
        gate: Arc<AtomicBool>,
        fail: bool,
        closed: Arc<AtomicUsize>,
    }

    impl Problem for Gated {
        type Variable = f64;
        fn name(&self) -> &str {
            "Gated"
        }
        fn number_of_objectives(&self) -> usize {
            1
        }
        fn bounds(&self) -> &Arc<[Bounds<f64>]> {
            self.inner.bounds()
        }
        fn evaluate(&self, s: &mut Solution<f64>) -> std::result::Result<(), EvaluationError> {
            while self.gate.load(Ordering::Relaxed) {
                std::thread::yield_now();
            }
            if self.fail {
                return Err(EvaluationError::new("solver diverged"));
            }
            self.inner.evaluate(s)
        }
        fn close(&self) {
            self.closed.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn gated(fail: bool) -> (Gated, Arc<AtomicBool>, Arc<AtomicUsize>) {
        let gate = Arc::new(AtomicBool::new(false));
        let closed = Arc::new(AtomicUsize::new(0));
        let problem = Gated {
            inner: Sphere::new(3),
            gate: Arc::clone(&gate),
            fail,
            closed: Arc::clone(&closed),
        };
        (problem, gate, closed)
    }

    fn de_config() -> DeConfig {
        DeConfig::default()
            .with_population_size(10)
            .with_max_evaluations(10 * 1_000_000)
            .with_seed(42)
    }

    #[test]
    fn test_blocking_run_reports_progress() {
        let config = Nsga2Config::default()
            .with_population_size(10)
            .with_offspring_population_size(10)
            .with_max_evaluations(60)
            .with_seed(42);
        let experiment = Experiment::new(Nsga2::new(Zdt1::new(3), config).unwrap());
        let monitor = experiment.monitor();
        let outcome = experiment.run_blocking().unwrap();

        assert!(!outcome.cancelled);
        assert_eq!(outcome.status, "Number of evaluations: 60 / 60");
        // One line after initialization and one per generation.
        assert_eq!(monitor.log().len(), 6);
        assert_eq!(monitor.progress().take().unwrap().fraction, 1.0);
    }

    #[test]
    fn test_cancel_stops_at_generation_boundary() {
        let (problem, _gate, closed) = gated(false);
        let algorithm = DifferentialEvolution::new(problem, de_config()).unwrap();
        let handle = Experiment::new(algorithm).spawn();

        while handle.monitor().log().len() < 3 {
            std::thread::yield_now();
        }
        handle.cancel();
        let outcome = handle.join().unwrap();

        assert!(outcome.cancelled);
        assert_eq!(outcome.solutions.len(), 1);
        assert_eq!(closed.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_cancel_waits_for_running_generation() {
        let (problem, gate, closed) = gated(false);
        let algorithm = DifferentialEvolution::new(problem, de_config()).unwrap();
        let experiment = Experiment::new(algorithm);
        let cancel = experiment.cancel_flag();
        let monitor = experiment.monitor();

        gate.store(true, Ordering::Relaxed);
        let handle = experiment.spawn();
        cancel.store(true, Ordering::Relaxed);
        assert!(!handle.is_finished());
        gate.store(false, Ordering::Relaxed);

        let outcome = handle.join().unwrap();
        assert!(outcome.cancelled);
        assert_eq!(outcome.status, "Number of evaluations: 10 / 10000000");
        assert!(monitor.log().lines().iter().any(|l| l.ends_with("cancelled")));
        assert_eq!(closed.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_failure_closes_once() {
        let (problem, _gate, closed) = gated(true);
        let algorithm = DifferentialEvolution::new(problem, de_config()).unwrap();
        let experiment = Experiment::new(algorithm);
        let monitor = experiment.monitor();

        let result = experiment.spawn().join();
        assert!(matches!(result, Err(Error::Evaluation(_))));
        assert_eq!(closed.load(Ordering::SeqCst), 1);
        assert!(monitor.log().lines().iter().any(|l| l.contains("solver diverged")));
    }
}
