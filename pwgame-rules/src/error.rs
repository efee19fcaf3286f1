//! Errors of the rule layer.

use pwgame_core::ConstructionError;
use pwgame_solver::SolverError;
use thiserror::Error;

/// Error raised while building a rule's formula.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuleError {
    /// The rule exists in the catalog but has no encoding yet.
    #[error("rule {index} is not implemented")]
    NotImplemented {
        /// Catalog index
        index: usize,
    },
    /// A combinator rejected its arguments.
    #[error("invalid rule encoding: {0}")]
    Construction(#[from] ConstructionError),
}

/// Fatal error of the model-finding driver.
///
/// A pending rule is not an error; it ends accumulation early.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DriverError {
    /// A rule failed for a reason other than being pending.
    #[error("rule {index}: {source}")]
    Rule {
        /// Catalog index
        index: usize,
        /// Underlying failure
        source: RuleError,
    },
    /// The oracle failed.
    #[error("solver error: {0}")]
    Solver(#[from] SolverError),
    /// A driver runs at most once.
    #[error("driver has already run")]
    AlreadyRun,
}

/// Fatal error of the redundancy prover.
///
/// Unresolved proofs are verdicts, not errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProverError {
    /// A claim names an index outside the catalog.
    #[error("claim references rule {index}, but the catalog has {len} rules")]
    UnknownRule {
        /// Offending index
        index: usize,
        /// Catalog size
        len: usize,
    },
    /// A claim names a rule that is not implemented.
    #[error("claim references pending rule {index}")]
    PendingRule {
        /// Offending index
        index: usize,
    },
    /// A rule failed to build.
    #[error("rule {index}: {source}")]
    Rule {
        /// Catalog index
        index: usize,
        /// Underlying failure
        source: RuleError,
    },
    /// The oracle failed.
    #[error("solver error: {0}")]
    Solver(#[from] SolverError),
    /// The oracle answered `sat` without a usable counterexample.
    #[error("inconsistent witness for {claim}: {witness:?}")]
    InconsistentWitness {
        /// Claim being checked
        claim: String,
        /// Witness returned by the oracle, if any
        witness: Option<String>,
    },
    /// The worker pool could not be created.
    #[error("failed to build thread pool: {0}")]
    ThreadPool(String),
}
