//! Solver errors.

use thiserror::Error;

/// Error raised by the oracle.
///
/// `unsat` and `unknown` are results, not errors; see
/// [`SolverResult`](crate::SolverResult).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SolverError {
    /// The assertions mention more than one string variable.
    #[error("assertions mention {count} string variables ({names}); only one is supported")]
    MultipleVariables {
        /// Number of distinct variables
        count: usize,
        /// Comma-separated variable names
        names: String,
    },
    /// A model was requested without a preceding `sat` answer.
    #[error("no model available: last check was not sat")]
    NoModel,
}

/// Result type for solver operations.
pub type Result<T> = std::result::Result<T, SolverError>;
