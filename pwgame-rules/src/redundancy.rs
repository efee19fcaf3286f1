//! Bounded redundancy proofs.
//!
//! A rule `A` is redundant given support `S` when every string satisfying `S`
//! also satisfies `A`. Unbounded implications are often out of reach, so the
//! prover asks the oracle whether `¬A ∧ S ∧ len ≤ L` has a model:
//! - `unsat` proves the implication for all strings of length at most `L`,
//!   unless `S ∧ len ≤ L` is itself unsatisfiable (a vacuous proof)
//! - `sat` yields a counterexample, which is re-checked before it is trusted
//! - `unknown` leaves the claim unresolved; it is never reported as proved

use crate::catalog::{Catalog, VARIABLE};
use crate::error::ProverError;
use pwgame_core::{Formula, StrVar};
use pwgame_solver::{Oracle, SolverResult, satisfies};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Length bound used by the catalog's claims.
pub const DEFAULT_BOUND: usize = 20;

/// "Rule `candidate` follows from rules `support` on strings up to `bound`."
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RedundancyClaim {
    candidate: usize,
    support: Vec<usize>,
    bound: usize,
}

impl RedundancyClaim {
    /// Create a claim; the support is sorted and deduplicated.
    #[must_use]
    pub fn new(candidate: usize, support: impl IntoIterator<Item = usize>, bound: usize) -> Self {
        let mut support: Vec<usize> = support.into_iter().collect();
        support.sort_unstable();
        support.dedup();
        Self {
            candidate,
            support,
            bound,
        }
    }

    /// Claim that `candidate` follows from every other implemented rule.
    #[must_use]
    pub fn against_rest(catalog: &Catalog, candidate: usize, bound: usize) -> Self {
        let support = catalog
            .iter()
            .filter(|rule| rule.is_implemented() && rule.index() != candidate)
            .map(|rule| rule.index());
        Self::new(candidate, support, bound)
    }

    /// Same claim under another length bound.
    #[must_use]
    pub fn with_bound(mut self, bound: usize) -> Self {
        self.bound = bound;
        self
    }

    /// Rule claimed redundant.
    #[must_use]
    pub fn candidate(&self) -> usize {
        self.candidate
    }

    /// Rules it supposedly follows from.
    #[must_use]
    pub fn support(&self) -> &[usize] {
        &self.support
    }

    /// Maximum password length considered.
    #[must_use]
    pub fn bound(&self) -> usize {
        self.bound
    }
}

impl fmt::Display for RedundancyClaim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let support: Vec<String> = self.support.iter().map(usize::to_string).collect();
        write!(
            f,
            "rule {} <= {{{}}} (len <= {})",
            self.candidate,
            support.join(", "),
            self.bound
        )
    }
}

/// Outcome of checking one claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum Verdict {
    /// The support implies the candidate up to the bound.
    Proved,
    /// A string within the bound satisfies the support but not the candidate.
    Refuted {
        /// The offending string
        counterexample: String,
    },
    /// Nothing within the bound satisfies the support; the bound is too tight.
    Vacuous,
    /// The oracle gave up.
    Unresolved {
        /// Oracle's explanation
        reason: String,
    },
}

impl Verdict {
    /// Check if the claim was proved.
    #[must_use]
    pub fn is_proved(&self) -> bool {
        matches!(self, Verdict::Proved)
    }

    /// Short tag, e.g. `proved`.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Proved => "proved",
            Verdict::Refuted { .. } => "refuted",
            Verdict::Vacuous => "vacuous",
            Verdict::Unresolved { .. } => "unresolved",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Proved | Verdict::Vacuous => f.write_str(self.as_str()),
            Verdict::Refuted { counterexample } => write!(f, "refuted by {:?}", counterexample),
            Verdict::Unresolved { reason } => write!(f, "unresolved ({})", reason),
        }
    }
}

/// A claim together with its verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProofReport {
    /// The claim checked
    pub claim: RedundancyClaim,
    /// What the oracle established
    pub verdict: Verdict,
    /// Wall-clock time spent on the claim
    pub elapsed: Duration,
}

impl fmt::Display for ProofReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.claim, self.verdict)
    }
}

/// Prover options
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProverConfig {
    /// Check claims concurrently
    pub parallel: bool,
    /// Worker threads when parallel (0 = rayon's global pool)
    pub num_threads: usize,
}

impl ProverConfig {
    /// Toggle concurrent checking.
    #[must_use]
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Set the number of worker threads.
    #[must_use]
    pub fn with_num_threads(mut self, n: usize) -> Self {
        self.num_threads = n;
        self
    }
}

/// Checks redundancy claims against a catalog.
///
/// Every query runs on a fresh oracle from `factory`, so claims share no
/// state and can be checked in any order.
pub struct RedundancyProver<'c, F> {
    catalog: &'c Catalog,
    factory: F,
    config: ProverConfig,
    var: StrVar,
}

impl<'c, F, O> RedundancyProver<'c, F>
where
    F: Fn() -> O,
    O: Oracle,
{
    /// Create a prover drawing oracles from `factory`.
    pub fn new(catalog: &'c Catalog, factory: F) -> Self {
        Self {
            catalog,
            factory,
            config: ProverConfig::default(),
            var: StrVar::new(VARIABLE),
        }
    }

    /// Set the prover options.
    #[must_use]
    pub fn with_config(mut self, config: ProverConfig) -> Self {
        self.config = config;
        self
    }

    fn formula(&self, index: usize) -> Result<Formula, ProverError> {
        let rule = self.catalog.get(index).ok_or(ProverError::UnknownRule {
            index,
            len: self.catalog.len(),
        })?;
        if !rule.is_implemented() {
            return Err(ProverError::PendingRule { index });
        }
        rule.formula(&self.var)
            .map_err(|source| ProverError::Rule { index, source })
    }

    fn query(&self, assertions: &[Formula]) -> Result<(SolverResult, O), ProverError> {
        let mut oracle = (self.factory)();
        for assertion in assertions {
            oracle.assert(assertion.clone());
        }
        let result = oracle.check()?;
        Ok((result, oracle))
    }

    fn unresolved(oracle: &O) -> Verdict {
        Verdict::Unresolved {
            reason: oracle.reason_unknown().unwrap_or("unknown").to_string(),
        }
    }

    /// Check one claim.
    pub fn prove(&self, claim: &RedundancyClaim) -> Result<ProofReport, ProverError> {
        let start = Instant::now();
        let candidate = self.formula(claim.candidate)?;
        let mut premises = claim
            .support
            .iter()
            .map(|&index| self.formula(index))
            .collect::<Result<Vec<_>, _>>()?;
        premises.push(self.var.len().le(claim.bound));

        let mut refutation = premises.clone();
        refutation.push(!candidate.clone());
        debug!(claim = %claim, "querying for a counterexample");

        let (result, oracle) = self.query(&refutation)?;
        let verdict = match result {
            SolverResult::Unsat => {
                let (result, oracle) = self.query(&premises)?;
                match result {
                    SolverResult::Sat => Verdict::Proved,
                    SolverResult::Unsat => Verdict::Vacuous,
                    SolverResult::Unknown => Self::unresolved(&oracle),
                }
            }
            SolverResult::Sat => {
                let witness = oracle
                    .model()
                    .and_then(|model| model.get(&self.var))
                    .map(str::to_string);
                match witness {
                    Some(w) if self.is_counterexample(&candidate, &premises, &w) => {
                        Verdict::Refuted { counterexample: w }
                    }
                    witness => {
                        return Err(ProverError::InconsistentWitness {
                            claim: claim.to_string(),
                            witness,
                        });
                    }
                }
            }
            SolverResult::Unknown => Self::unresolved(&oracle),
        };

        match &verdict {
            Verdict::Proved => info!(claim = %claim, "redundancy proved"),
            Verdict::Unresolved { reason } => warn!(claim = %claim, reason = %reason, "redundancy unresolved"),
            other => info!(claim = %claim, verdict = %other, "redundancy not proved"),
        }
        Ok(ProofReport {
            claim: claim.clone(),
            verdict,
            elapsed: start.elapsed(),
        })
    }

    /// `witness` violates the candidate, satisfies every premise (the bound
    /// included).
    fn is_counterexample(&self, candidate: &Formula, premises: &[Formula], witness: &str) -> bool {
        !satisfies(candidate, &self.var, witness)
            && premises.iter().all(|p| satisfies(p, &self.var, witness))
    }
}

impl<F, O> RedundancyProver<'_, F>
where
    F: Fn() -> O + Sync,
    O: Oracle,
{
    /// Check every claim, in order; stops at the first fatal error.
    pub fn prove_all(&self, claims: &[RedundancyClaim]) -> Result<Vec<ProofReport>, ProverError> {
        if !self.config.parallel {
            return claims.iter().map(|claim| self.prove(claim)).collect();
        }

        let run = || {
            claims
                .par_iter()
                .map(|claim| self.prove(claim))
                .collect::<Result<Vec<_>, _>>()
        };
        if self.config.num_threads > 0 {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(self.config.num_threads)
                .build()
                .map_err(|e| ProverError::ThreadPool(e.to_string()))?;
            pool.install(run)
        } else {
            run()
        }
    }
}
