//! Model-finding driver.
//!
//! Folds the catalog into one conjunction, rule by rule in index order, and
//! asks the oracle for a model exactly once. The first pending rule ends the
//! fold: the rules before it are still solved, the rest are skipped.

use crate::catalog::{Catalog, VARIABLE};
use crate::error::{DriverError, RuleError};
use pwgame_core::{Formula, StrVar};
use pwgame_solver::{Model, Oracle, SolverError, SolverResult, SolverStats};
use serde::Serialize;
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Where the driver is in its single run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DriverPhase {
    /// Adding rules to the oracle
    Accumulating,
    /// Waiting for the oracle's answer
    Solving,
    /// The outcome is known
    Done,
}

/// Final answer of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// A password satisfying every added rule
    Witness(String),
    /// The added rules contradict each other
    NoSolution,
    /// The oracle gave up, with its reason
    Unknown(String),
}

impl Outcome {
    /// Result the outcome corresponds to.
    #[must_use]
    pub fn result(&self) -> SolverResult {
        match self {
            Outcome::Witness(_) => SolverResult::Sat,
            Outcome::NoSolution => SolverResult::Unsat,
            Outcome::Unknown(_) => SolverResult::Unknown,
        }
    }

    /// The witness, if any.
    #[must_use]
    pub fn witness(&self) -> Option<&str> {
        match self {
            Outcome::Witness(w) => Some(w),
            _ => None,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Witness(w) => write!(f, "{}", Model::singleton(StrVar::new(VARIABLE), w.as_str())),
            Outcome::NoSolution => write!(f, "No solution found"),
            Outcome::Unknown(reason) => write!(f, "Unknown ({})", reason),
        }
    }
}

/// Progress notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriverEvent {
    /// A rule's formula was handed to the oracle.
    RuleAdded {
        /// Catalog index
        index: usize,
    },
    /// A pending rule stopped accumulation.
    RuleNotImplemented {
        /// Catalog index
        index: usize,
    },
    /// The oracle is about to be queried.
    Solving,
    /// The oracle answered.
    Finished {
        /// What it answered
        outcome: Outcome,
    },
}

impl fmt::Display for DriverEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriverEvent::RuleAdded { index } => write!(f, "Rule {}: added", index),
            DriverEvent::RuleNotImplemented { index } => {
                write!(f, "Rule {}: not implemented (additional rules skipped)", index)
            }
            DriverEvent::Solving => write!(f, "Solving..."),
            DriverEvent::Finished { outcome } => write!(f, "{}", outcome),
        }
    }
}

/// Everything a run established.
#[derive(Debug, Clone, Serialize)]
pub struct DriverReport {
    /// Indices of the rules in the conjunction
    pub added: Vec<usize>,
    /// First pending rule, if accumulation stopped early
    pub pending: Option<usize>,
    /// The oracle's answer
    pub outcome: Outcome,
    /// Oracle counters after the check
    pub stats: SolverStats,
    /// Wall-clock time of the run
    pub elapsed: Duration,
    /// The conjunction, one formula per added rule
    #[serde(skip)]
    pub assertions: Vec<Formula>,
}

/// Runs a catalog against an oracle, once.
#[derive(Debug)]
pub struct Driver<'c, O> {
    catalog: &'c Catalog,
    oracle: O,
    var: StrVar,
    phase: DriverPhase,
}

impl<'c, O: Oracle> Driver<'c, O> {
    /// Create a driver feeding `catalog` to `oracle`.
    pub fn new(catalog: &'c Catalog, oracle: O) -> Self {
        Self {
            catalog,
            oracle,
            var: StrVar::new(VARIABLE),
            phase: DriverPhase::Accumulating,
        }
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> DriverPhase {
        self.phase
    }

    /// The oracle, e.g. to inspect it after the run.
    #[must_use]
    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    /// Accumulate, solve, and report; `on_event` sees every step.
    ///
    /// Fails if called twice, if a rule fails for any reason other than
    /// being pending, or if the oracle fails.
    pub fn run(&mut self, mut on_event: impl FnMut(&DriverEvent)) -> Result<DriverReport, DriverError> {
        if self.phase != DriverPhase::Accumulating {
            return Err(DriverError::AlreadyRun);
        }
        let start = Instant::now();
        let mut added = Vec::new();
        let mut pending = None;
        let mut assertions = Vec::new();

        for rule in self.catalog.iter() {
            match rule.formula(&self.var) {
                Ok(formula) => {
                    debug!(rule = rule.index(), formula = %formula, "encoded");
                    self.oracle.assert(formula.clone());
                    assertions.push(formula);
                    added.push(rule.index());
                    info!(rule = rule.index(), name = rule.name(), "rule added");
                    on_event(&DriverEvent::RuleAdded { index: rule.index() });
                }
                Err(RuleError::NotImplemented { index }) => {
                    warn!(rule = index, "rule not implemented, skipping the rest");
                    pending = Some(index);
                    on_event(&DriverEvent::RuleNotImplemented { index });
                    break;
                }
                Err(source) => {
                    self.phase = DriverPhase::Done;
                    return Err(DriverError::Rule {
                        index: rule.index(),
                        source,
                    });
                }
            }
        }

        self.phase = DriverPhase::Solving;
        on_event(&DriverEvent::Solving);
        let checked = self.oracle.check();
        self.phase = DriverPhase::Done;

        let outcome = match checked? {
            SolverResult::Sat => {
                let model = self.oracle.model().ok_or(SolverError::NoModel)?;
                // An unconstrained password (no rules added) takes any value.
                Outcome::Witness(model.get(&self.var).unwrap_or_default().to_string())
            }
            SolverResult::Unsat => Outcome::NoSolution,
            SolverResult::Unknown => {
                Outcome::Unknown(self.oracle.reason_unknown().unwrap_or("unknown").to_string())
            }
        };
        info!(outcome = %outcome, rules = added.len(), "solved");
        on_event(&DriverEvent::Finished {
            outcome: outcome.clone(),
        });

        Ok(DriverReport {
            added,
            pending,
            outcome,
            stats: self.oracle.stats(),
            elapsed: start.elapsed(),
            assertions,
        })
    }
}
