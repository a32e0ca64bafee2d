//! Variation and selection operators.
//!
//! Operators are object-safe traits parameterized by the variable encoding
//! and receive the random generator explicitly, so algorithms can hold them
//! as boxed trait objects and runs stay reproducible.
//!
//! # Selection
//!
//! - [`TournamentSelection`]: binary or n-ary tournament over any comparator
//! - [`RandomSelection`]: uniform pick
//! - [`DifferentialEvolutionSelection`]: distinct donor indices for DE
//!
//! # Crossover
//!
//! - [`SbxCrossover`]: simulated binary crossover
//! - [`SinglePointCrossover`]: tail exchange
//! - [`DifferentialEvolutionCrossover`]: DE trial vectors ([`DeVariant`])
//!
//! # Mutation
//!
//! - [`PolynomialMutation`], [`UniformMutation`], [`SimpleRandomMutation`],
//!   [`NullMutation`]

mod crossover;
mod mutation;
mod selection;

pub use crossover::{
    CrossoverOperator, DeVariant, DifferentialEvolutionCrossover, SbxCrossover,
    SinglePointCrossover,
};
pub use mutation::{
    per_variable_probability, MutationOperator, NullMutation, PolynomialMutation,
    SimpleRandomMutation, UniformMutation,
};
pub use selection::{
    DifferentialEvolutionSelection, RandomSelection, SelectionOperator, TournamentSelection,
};
