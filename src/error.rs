//! Error types.
//!
//! Configuration problems, arity mismatches and evaluation failures are all
//! reported through [`Error`]. Invariants that can only be broken by a
//! programming mistake (e.g. comparing solutions of different problems)
//! panic instead.

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced by the engine.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A configuration value is out of its valid range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// An operator received the wrong number of parents.
    #[error("operator {operator} requires {expected} parents, got {got}")]
    ParentCount {
        /// Operator name.
        operator: &'static str,
        /// Parents the operator needs.
        expected: usize,
        /// Parents actually supplied.
        got: usize,
    },

    /// Two solutions with different objective counts were compared.
    #[error("objective count mismatch: {left} vs {right}")]
    ObjectiveCountMismatch {
        /// Objectives of the left-hand solution.
        left: usize,
        /// Objectives of the right-hand solution.
        right: usize,
    },

    /// A front index beyond the computed fronts was requested.
    #[error("front index {index} out of range: only {count} fronts computed")]
    FrontOutOfRange {
        /// Requested front.
        index: usize,
        /// Number of computed fronts.
        count: usize,
    },

    /// A selection pool is smaller than the number of solutions requested.
    #[error("cannot select {requested} solutions from a pool of {available}")]
    InsufficientPool {
        /// Solutions requested.
        requested: usize,
        /// Solutions available.
        available: usize,
    },

    /// An operation needs at least one solution.
    #[error("population is empty")]
    EmptyPopulation,

    /// An algorithm method was called in a state that does not allow it.
    #[error("invalid algorithm state: {0}")]
    InvalidState(String),

    /// The problem failed to evaluate a solution.
    #[error(transparent)]
    Evaluation(#[from] EvaluationError),

    /// The worker thread driving an experiment panicked.
    #[error("experiment worker panicked")]
    WorkerPanicked,

    /// Writing a solution list failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        Error::InvalidConfig(message.into())
    }

    pub(crate) fn state(message: impl Into<String>) -> Self {
        Error::InvalidState(message.into())
    }
}

/// Failure raised by [`Problem::evaluate`](crate::core::Problem::evaluate).
///
/// Typically wraps a fault of an external simulator. The optional source is
/// kept so callers can downcast to the simulator's own error type.
#[derive(Debug, thiserror::Error)]
#[error("evaluation failed: {message}")]
pub struct EvaluationError {
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
}

impl EvaluationError {
    /// Creates an evaluation error from a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Creates an evaluation error wrapping an underlying cause.
    pub fn with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// The human-readable failure description.
    pub fn message(&self) -> &str {
        &self.message
    }
}
