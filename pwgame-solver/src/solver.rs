//! Incremental solver front end and the [`Oracle`] abstraction.

use crate::config::SolverConfig;
use crate::error::{Result, SolverError};
use crate::model::Model;
use crate::search::{Compiled, SearchOutcome, SearchStats};
use pwgame_core::Formula;
use pwgame_core::smtlib::script;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use tracing::{debug, info, warn};

/// Result of a satisfiability check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SolverResult {
    /// Satisfiable
    Sat,
    /// Unsatisfiable
    Unsat,
    /// Unknown (resource limit hit)
    Unknown,
}

impl SolverResult {
    /// SMT-LIB spelling of the result.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sat => "sat",
            Self::Unsat => "unsat",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for SolverResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A satisfiability oracle over string formulas.
///
/// Assertions accumulate until [`Oracle::check`]; after `sat` a model is
/// available, after `unknown` a reason is.
pub trait Oracle {
    /// Add a formula to the conjunction being checked.
    fn assert(&mut self, formula: Formula);

    /// Decide the conjunction of all assertions.
    fn check(&mut self) -> Result<SolverResult>;

    /// Model of the last `sat` check.
    fn model(&self) -> Option<&Model>;

    /// Why the last check answered `unknown`.
    fn reason_unknown(&self) -> Option<&str>;

    /// Work done since creation; oracles without counters report zeros.
    fn stats(&self) -> SolverStats {
        SolverStats::default()
    }
}

/// Solver statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SolverStats {
    /// Number of checks performed
    pub checks: u64,
    /// Product states reached, summed over checks
    pub explored: u64,
    /// Product states pruned, summed over checks
    pub pruned: u64,
    /// Character classes in the last check
    pub classes: usize,
    /// Membership atoms in the last check
    pub atoms: usize,
}

impl SolverStats {
    fn record(&mut self, search: &SearchStats) {
        self.explored += search.explored as u64;
        self.pruned += search.pruned as u64;
        self.classes = search.classes;
        self.atoms = search.automata;
    }
}

/// Automata-based decision procedure for single-variable string formulas.
#[derive(Debug, Default)]
pub struct Solver {
    config: SolverConfig,
    assertions: Vec<Formula>,
    model: Option<Model>,
    reason_unknown: Option<String>,
    stats: SolverStats,
}

impl Solver {
    /// Create a solver with default limits.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a solver with the given limits.
    #[must_use]
    pub fn with_config(config: SolverConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Current configuration.
    #[must_use]
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Assertions added so far.
    #[must_use]
    pub fn assertions(&self) -> &[Formula] {
        &self.assertions
    }

    /// Drop all assertions, the last answer and the statistics.
    pub fn reset(&mut self) {
        self.assertions.clear();
        self.model = None;
        self.reason_unknown = None;
        self.stats = SolverStats::default();
    }

    /// Model of the last check, or an error when it was not `sat`.
    pub fn get_model(&self) -> Result<&Model> {
        self.model.as_ref().ok_or(SolverError::NoModel)
    }

    /// Render the assertions as an SMT-LIB script.
    #[must_use]
    pub fn to_smtlib(&self) -> String {
        script(&self.assertions)
    }
}

impl Oracle for Solver {
    fn assert(&mut self, formula: Formula) {
        self.assertions.push(formula);
    }

    fn check(&mut self) -> Result<SolverResult> {
        self.model = None;
        self.reason_unknown = None;
        self.stats.checks += 1;

        let vars: BTreeSet<_> = self.assertions.iter().flat_map(Formula::vars).collect();
        if vars.len() > 1 {
            return Err(SolverError::MultipleVariables {
                count: vars.len(),
                names: vars
                    .iter()
                    .map(|v| v.name())
                    .collect::<Vec<_>>()
                    .join(", "),
            });
        }

        let conjunction = Formula::and(self.assertions.iter().cloned());
        debug!(assertions = self.assertions.len(), "checking conjunction");

        let Some(compiled) = Compiled::new(&conjunction, &self.config) else {
            let reason = format!(
                "automaton construction exceeded {} states",
                self.config.max_states
            );
            warn!("{}", reason);
            self.reason_unknown = Some(reason);
            return Ok(SolverResult::Unknown);
        };

        let mut search = SearchStats::default();
        let outcome = compiled.search(&self.config, &mut search);
        self.stats.record(&search);
        info!(
            explored = search.explored,
            pruned = search.pruned,
            classes = search.classes,
            automata = search.automata,
            "search finished"
        );

        Ok(match outcome {
            SearchOutcome::Found(witness) => {
                let mut model = Model::new();
                if let Some(var) = vars.into_iter().next() {
                    model.assign(var, witness);
                }
                self.model = Some(model);
                SolverResult::Sat
            }
            SearchOutcome::Exhausted => SolverResult::Unsat,
            SearchOutcome::GaveUp(reason) => {
                warn!("{}", reason);
                self.reason_unknown = Some(reason);
                SolverResult::Unknown
            }
        })
    }

    fn model(&self) -> Option<&Model> {
        self.model.as_ref()
    }

    fn reason_unknown(&self) -> Option<&str> {
        self.reason_unknown.as_deref()
    }

    fn stats(&self) -> SolverStats {
        self.stats.clone()
    }
}
