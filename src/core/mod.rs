//! Solution and problem contracts.
//!
//! - [`Variable`]: decision variable encoding (`f64`, `i32`)
//! - [`Solution`]: variables, objectives and typed [`Attributes`]
//! - [`Problem`]: dimensions, bounds, random creation and evaluation
//! - [`evaluate_population`]: sequential or rayon-parallel evaluation

mod evaluator;
mod problem;
mod solution;
mod variable;

pub use evaluator::evaluate_population;
pub(crate) use problem::validate_bounds;
pub use problem::Problem;
pub use solution::{Attributes, Solution};
pub use variable::{Bounds, Variable};
