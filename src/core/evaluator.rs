//! Population evaluation, sequential or data-parallel.

use super::problem::Problem;
use super::solution::Solution;
use crate::error::EvaluationError;

/// Evaluates every solution in `population`.
///
/// With the `parallel` feature and `parallel == true` the work is spread over
/// rayon's pool. The first failure is returned; since evaluation never draws
/// random numbers, results are identical in both modes.
pub fn evaluate_population<P: Problem>(
    problem: &P,
    population: &mut [Solution<P::Variable>],
    parallel: bool,
) -> Result<(), EvaluationError> {
    #[cfg(feature = "parallel")]
    {
        if parallel {
            use rayon::prelude::*;
            return population
                .par_iter_mut()
                .try_for_each(|solution| problem.evaluate(solution));
        }
    }
    #[cfg(not(feature = "parallel"))]
    let _ = parallel;

    for solution in population.iter_mut() {
        problem.evaluate(solution)?;
    }
    Ok(())
}
