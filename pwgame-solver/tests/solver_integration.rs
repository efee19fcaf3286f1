//! Integration tests for the automata-based solver
//!
//! These tests verify:
//! - Membership in the regex combinators at every position
//! - Length and count reasoning, including contradictions
//! - Short witnesses and their validity
//! - Resource limits turning into `unknown`

use pwgame_core::regex::{any_literal, class, concat, containing, full, literal, range, union};
use pwgame_core::{CharSet, Formula, StrVar};
use pwgame_solver::{Oracle, Solver, SolverConfig, SolverResult, satisfies};
use std::time::Duration;

fn password() -> StrVar {
    StrVar::new("password")
}

fn solve(assertions: impl IntoIterator<Item = Formula>) -> (SolverResult, Option<String>) {
    let p = password();
    let mut solver = Solver::new();
    for a in assertions {
        solver.assert(a);
    }
    let result = solver.check().expect("single variable");
    let witness = solver.model().and_then(|m| m.get(&p)).map(str::to_string);
    (result, witness)
}

// ============================================================================
// Base language
// ============================================================================

#[test]
fn test_full_admits_empty_and_printable() {
    let p = password();
    let f = p.in_re(full());
    assert!(satisfies(&f, &p, ""));
    assert!(satisfies(&f, &p, " !~azAZ09"));
}

#[test]
fn test_full_rejects_control_and_delete() {
    let p = password();
    let f = p.in_re(full());
    for b in (0x00u8..0x20).chain(std::iter::once(0x7F)) {
        let s = format!("a{}b", char::from(b));
        assert!(!satisfies(&f, &p, &s), "accepted byte {:#04x}", b);
    }
}

#[test]
fn test_negated_full_has_one_char_witness() {
    let (result, witness) = solve([!password().in_re(full())]);
    assert_eq!(result, SolverResult::Sat);
    let witness = witness.unwrap();
    assert_eq!(witness.len(), 1);
    assert!(!witness.chars().all(|c| (' '..='~').contains(&c)));
}

// ============================================================================
// Containment
// ============================================================================

#[test]
fn test_containing_single_char_at_boundaries() {
    let p = password();
    let f = p.in_re(containing(literal("x").unwrap()));
    assert!(satisfies(&f, &p, "x"));
    assert!(satisfies(&f, &p, "xab"));
    assert!(satisfies(&f, &p, "abx"));
    assert!(!satisfies(&f, &p, ""));
    assert!(!satisfies(&f, &p, "ab"));
}

#[test]
fn test_containing_any_word_of_union() {
    let p = password();
    let f = p.in_re(containing(any_literal(["pepsi", "shell", "starbucks"]).unwrap()));
    assert!(satisfies(&f, &p, "I like shell!"));
    assert!(satisfies(&f, &p, "pepsi"));
    assert!(!satisfies(&f, &p, "pepshel"));
}

#[test]
fn test_concat_with_separator_class() {
    let p = password();
    let sep = union([range('a', 'z').unwrap(), range('0', '9').unwrap()]).unwrap();
    let f = p.in_re(containing(concat([
        literal("V").unwrap(),
        sep,
        literal("VII").unwrap(),
    ])));
    assert!(satisfies(&f, &p, "xxVaVIIxx"));
    assert!(satisfies(&f, &p, "V7VII"));
    assert!(!satisfies(&f, &p, "VVII"));
    assert!(!satisfies(&f, &p, "V VII"));
}

// ============================================================================
// Length and counts
// ============================================================================

#[test]
fn test_length_conflict_is_unsat() {
    let p = password();
    let (result, witness) = solve([p.len().eq(3), p.len().ge(5)]);
    assert_eq!(result, SolverResult::Unsat);
    assert!(witness.is_none());
}

#[test]
fn test_length_window_witness() {
    let p = password();
    let (result, witness) = solve([p.in_re(full()), p.len().ge(5), p.len().le(40)]);
    assert_eq!(result, SolverResult::Sat);
    assert_eq!(witness.unwrap().len(), 5);
}

#[test]
fn test_count_equal_and_absent() {
    let p = password();
    let roman = CharSet::chars("IVXLCDM").unwrap();
    let (result, witness) = solve([
        p.in_re(full()),
        p.count(roman.clone()).eq(2),
        p.in_re(containing(literal("MM").unwrap())),
    ]);
    assert_eq!(result, SolverResult::Sat);
    let witness = witness.unwrap();
    assert_eq!(witness.matches('M').count(), 2);
    assert!(witness.contains("MM"));

    let (result, _) = solve([
        p.count(roman).eq(1),
        p.in_re(containing(literal("MM").unwrap())),
    ]);
    assert_eq!(result, SolverResult::Unsat);
}

#[test]
fn test_weighted_digit_sum() {
    let p = password();
    let digits: Vec<(CharSet, u32)> = (1..=9u32)
        .map(|d| {
            let c = char::from_digit(d, 10).unwrap();
            (CharSet::range(c, c).unwrap(), d)
        })
        .collect();
    let sum = p.weighted_count(digits);
    let (result, witness) = solve([p.in_re(full()), sum.clone().eq(25)]);
    assert_eq!(result, SolverResult::Sat);

    let witness = witness.unwrap();
    assert_eq!(sum.value(&witness), 25);
    // 25 needs at least three digits (9 + 9 + 7).
    assert_eq!(witness.len(), 3);
}

// ============================================================================
// Connectives
// ============================================================================

#[test]
fn test_assertion_order_is_irrelevant() {
    let p = password();
    let a = p.in_re(containing(range('A', 'Z').unwrap()));
    let b = p.in_re(containing(range('0', '9').unwrap()));
    let c = p.len().le(2);
    let (r1, w1) = solve([a.clone(), b.clone(), c.clone()]);
    let (r2, w2) = solve([c, b, a]);
    assert_eq!(r1, r2);
    assert_eq!(w1, w2);
}

#[test]
fn test_implication_with_vacuous_premise() {
    let p = password();
    let f = Formula::implies(p.len().ge(100), Formula::False);
    let (result, witness) = solve([f.clone(), p.len().le(3)]);
    assert_eq!(result, SolverResult::Sat);
    assert!(satisfies(&f, &p, &witness.unwrap()));
}

#[test]
fn test_class_membership_exact() {
    let p = password();
    let vowels = CharSet::chars("aeiou").unwrap();
    let f = p.in_re(class(&vowels));
    assert!(satisfies(&f, &p, "e"));
    assert!(!satisfies(&f, &p, "b"));
    assert!(!satisfies(&f, &p, "ae"));
}

// ============================================================================
// Limits
// ============================================================================

#[test]
fn test_state_limit_yields_unknown() {
    let p = password();
    let digits: Vec<(CharSet, u32)> = (1..=9u32)
        .map(|d| {
            let c = char::from_digit(d, 10).unwrap();
            (CharSet::range(c, c).unwrap(), d)
        })
        .collect();
    // every witness has at least three digits, far beyond five states
    let mut solver = Solver::with_config(SolverConfig::default().with_max_states(5));
    solver.assert(p.in_re(full()));
    solver.assert(p.weighted_count(digits).eq(25));
    assert_eq!(solver.check().unwrap(), SolverResult::Unknown);
    assert!(solver.reason_unknown().unwrap().contains("limit of 5"));
    assert!(solver.model().is_none());
}

#[test]
fn test_readable_representatives_are_optional() {
    let p = password();
    let mut readable = Solver::new();
    readable.assert(p.len().eq(1));
    assert_eq!(readable.check().unwrap(), SolverResult::Sat);
    assert_eq!(readable.model().unwrap().get(&p), Some("a"));

    // without the preference a class is represented by its lowest code point
    let mut raw = Solver::with_config(SolverConfig::default().with_prefer_readable(false));
    raw.assert(p.len().eq(1));
    assert_eq!(raw.check().unwrap(), SolverResult::Sat);
    assert_eq!(raw.model().unwrap().get(&p), Some("\0"));
}

#[test]
fn test_generous_timeout_still_decides() {
    let p = password();
    let config = SolverConfig::default().with_timeout(Duration::from_secs(60));
    let mut solver = Solver::with_config(config);
    solver.assert(p.in_re(containing(literal("997").unwrap())));
    assert_eq!(solver.check().unwrap(), SolverResult::Sat);
    assert_eq!(solver.model().unwrap().get(&p), Some("997"));
    assert!(solver.stats().explored > 0);
}
