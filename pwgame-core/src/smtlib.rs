//! SMT-LIB2 rendering helpers.
//!
//! Membership and length atoms use the standard strings theory. Count atoms
//! use the non-standard `str.count_in` extension.

use crate::formula::{Formula, declare};
use std::collections::BTreeSet;

/// Quote `s` as an SMT-LIB2 string literal.
///
/// Double quotes are doubled; characters outside printable ASCII use the
/// `\u{..}` escape of the strings theory.
#[must_use]
pub fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for ch in s.chars() {
        match ch {
            '"' => out.push_str("\"\""),
            ' '..='~' => out.push(ch),
            _ => out.push_str(&format!("\\u{{{:x}}}", u32::from(ch))),
        }
    }
    out.push('"');
    out
}

/// Render `assertions` as a script: one declaration per variable, then one
/// `assert` per formula.
#[must_use]
pub fn script(assertions: &[Formula]) -> String {
    let vars: BTreeSet<_> = assertions.iter().flat_map(Formula::vars).collect();
    let mut out = String::new();
    for var in &vars {
        out.push_str(&declare(var));
        out.push('\n');
    }
    for assertion in assertions {
        out.push_str(&format!("(assert {})\n", assertion));
    }
    out
}
