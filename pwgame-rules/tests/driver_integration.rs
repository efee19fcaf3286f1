//! Integration tests for the model-finding driver
//!
//! These tests verify:
//! - End-to-end witnesses and their conformance
//! - Partial results when a rule is pending
//! - Fatal rule errors and single-use drivers
//! - Unsat and unknown answers surfacing as outcomes

use pwgame_core::regex::literal;
use pwgame_core::{ConstructionError, Formula, StrVar};
use pwgame_rules::{
    Catalog, Driver, DriverError, DriverEvent, DriverPhase, Outcome, Rule, RuleError, VARIABLE,
};
use pwgame_solver::{Model, Oracle, Result as SolverResultT, Solver, SolverResult, satisfies};

fn password() -> StrVar {
    StrVar::new(VARIABLE)
}

/// Oracle with a fixed answer and no reasoning.
struct Canned {
    answer: SolverResult,
    model: Option<Model>,
    asserted: usize,
}

impl Canned {
    fn new(answer: SolverResult) -> Self {
        Self {
            answer,
            model: None,
            asserted: 0,
        }
    }
}

impl Oracle for Canned {
    fn assert(&mut self, _formula: Formula) {
        self.asserted += 1;
    }

    fn check(&mut self) -> SolverResultT<SolverResult> {
        Ok(self.answer)
    }

    fn model(&self) -> Option<&Model> {
        self.model.as_ref()
    }

    fn reason_unknown(&self) -> Option<&str> {
        (self.answer == SolverResult::Unknown).then_some("canned answer")
    }
}

// ============================================================================
// End-to-end scenarios
// ============================================================================

#[test]
fn test_base_and_digit_rules_yield_digit_witness() {
    let p = password();
    let catalog = Catalog::standard();
    let base = catalog.get(0).unwrap().formula(&p).unwrap();
    let digit = catalog.get(2).unwrap().formula(&p).unwrap();

    let mut solver = Solver::new();
    solver.assert(base.clone());
    solver.assert(digit.clone());
    assert_eq!(solver.check().unwrap(), SolverResult::Sat);

    let witness = solver.model().unwrap().get(&p).unwrap().to_string();
    assert!(witness.chars().all(|c| (' '..='~').contains(&c)));
    assert!(witness.chars().any(|c| c.is_ascii_digit()));

    let both = Formula::and([base, digit]);
    assert!(satisfies(&both, &p, "a1"));
    assert!(!satisfies(&both, &p, "abc"));
}

#[test]
fn test_length_rule_rejects_short_and_long_witnesses() {
    let p = password();
    let catalog = Catalog::truncated(3);
    assert!(catalog.conforms(&p, "abcd1").unwrap());
    assert!(!catalog.conforms(&p, "ab1").unwrap());
    let long = format!("{}1", "a".repeat(40));
    assert_eq!(long.len(), 41);
    assert!(!catalog.conforms(&p, &long).unwrap());
}

#[test]
fn test_partial_catalog_solves_prefix() {
    let catalog = Catalog::truncated(5);
    let mut events = Vec::new();
    let mut driver = Driver::new(&catalog, Solver::new());
    assert_eq!(driver.phase(), DriverPhase::Accumulating);

    let report = driver.run(|event| events.push(event.clone())).unwrap();
    assert_eq!(driver.phase(), DriverPhase::Done);
    assert_eq!(report.added, vec![0, 1, 2, 3, 4]);
    assert_eq!(report.pending, Some(5));
    assert_eq!(report.assertions.len(), 5);
    assert_eq!(report.stats.checks, 1);

    let witness = report.outcome.witness().unwrap();
    assert!(catalog.conforms(&password(), witness).unwrap());

    let lines: Vec<String> = events.iter().map(ToString::to_string).collect();
    assert_eq!(
        &lines[..7],
        &[
            "Rule 0: added",
            "Rule 1: added",
            "Rule 2: added",
            "Rule 3: added",
            "Rule 4: added",
            "Rule 5: not implemented (additional rules skipped)",
            "Solving...",
        ]
    );
    assert!(matches!(events.last(), Some(DriverEvent::Finished { .. })));
}

#[test]
fn test_full_catalog_witness_conforms() {
    let catalog = Catalog::standard();
    let mut driver = Driver::new(&catalog, Solver::new());
    let report = driver.run(|_| {}).unwrap();

    assert_eq!(report.added, (0..11).collect::<Vec<_>>());
    assert_eq!(report.pending, None);
    let witness = report.outcome.witness().expect("the rules are satisfiable");
    assert_eq!(catalog.violations(&password(), witness).unwrap(), Vec::<usize>::new());
    assert!(witness.len() <= 40);
}

#[test]
fn test_no_rules_yields_empty_witness() {
    let catalog = Catalog::truncated(0);
    let report = Driver::new(&catalog, Solver::new()).run(|_| {}).unwrap();
    assert!(report.added.is_empty());
    assert_eq!(report.pending, Some(0));
    assert_eq!(report.outcome, Outcome::Witness(String::new()));
}

// ============================================================================
// Contradictions and limits
// ============================================================================

fn at_most_four(p: &StrVar) -> Result<Formula, ConstructionError> {
    Ok(p.len().le(4))
}

fn at_least_five(p: &StrVar) -> Result<Formula, ConstructionError> {
    Ok(p.len().ge(5))
}

#[test]
fn test_mutually_exclusive_rules_have_no_solution() {
    let catalog = Catalog::from_rules([
        Rule::new(0, "short", "at most 4 characters", at_most_four),
        Rule::new(1, "long", "at least 5 characters", at_least_five),
    ]);
    let report = Driver::new(&catalog, Solver::new()).run(|_| {}).unwrap();
    assert_eq!(report.outcome, Outcome::NoSolution);
    assert_eq!(report.outcome.to_string(), "No solution found");
}

#[test]
fn test_unknown_is_an_outcome() {
    let catalog = Catalog::truncated(2);
    let mut driver = Driver::new(&catalog, Canned::new(SolverResult::Unknown));
    let report = driver.run(|_| {}).unwrap();
    assert_eq!(report.outcome, Outcome::Unknown("canned answer".to_string()));
    assert_eq!(driver.oracle().asserted, 2);
}

#[test]
fn test_sat_without_model_is_an_error() {
    let catalog = Catalog::truncated(1);
    let mut driver = Driver::new(&catalog, Canned::new(SolverResult::Sat));
    assert!(matches!(driver.run(|_| {}), Err(DriverError::Solver(_))));
}

// ============================================================================
// Fatal errors
// ============================================================================

fn broken(p: &StrVar) -> Result<Formula, ConstructionError> {
    Ok(p.in_re(literal("caf\u{e9}")?))
}

#[test]
fn test_construction_error_is_fatal() {
    let catalog = Catalog::from_rules([
        Rule::new(0, "short", "at most 4 characters", at_most_four),
        Rule::new(1, "broken", "non-ASCII literal", broken),
        Rule::new(2, "long", "at least 5 characters", at_least_five),
    ]);
    let mut events = Vec::new();
    let mut driver = Driver::new(&catalog, Canned::new(SolverResult::Sat));
    let err = driver.run(|e| events.push(e.clone())).unwrap_err();

    assert_eq!(
        err,
        DriverError::Rule {
            index: 1,
            source: RuleError::Construction(ConstructionError::NonAscii { ch: '\u{e9}' }),
        }
    );
    // nothing was solved
    assert_eq!(events, vec![DriverEvent::RuleAdded { index: 0 }]);
}

#[test]
fn test_pending_rule_is_not_fatal() {
    let catalog = Catalog::from_rules([
        Rule::new(0, "long", "at least 5 characters", at_least_five),
        Rule::new(1, "broken", "non-ASCII literal", broken).pending(),
    ]);
    let report = Driver::new(&catalog, Solver::new()).run(|_| {}).unwrap();
    assert_eq!(report.pending, Some(1));
    assert_eq!(report.outcome.witness().map(str::len), Some(5));
}

#[test]
fn test_driver_runs_once() {
    let catalog = Catalog::truncated(1);
    let mut driver = Driver::new(&catalog, Solver::new());
    driver.run(|_| {}).unwrap();
    assert_eq!(driver.run(|_| {}).unwrap_err(), DriverError::AlreadyRun);
}
