//! Models and direct formula evaluation.

use crate::automaton::Nfa;
use pwgame_core::formula::show_value;
use pwgame_core::{Formula, StrVar};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Concrete assignment of strings to variables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Model {
    assignments: BTreeMap<StrVar, String>,
}

impl Model {
    /// Empty model.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Model assigning `value` to `var`.
    #[must_use]
    pub fn singleton(var: StrVar, value: impl Into<String>) -> Self {
        let mut model = Self::new();
        model.assign(var, value);
        model
    }

    /// Assign `value` to `var`, replacing any previous value.
    pub fn assign(&mut self, var: StrVar, value: impl Into<String>) {
        self.assignments.insert(var, value.into());
    }

    /// Value of `var`.
    #[must_use]
    pub fn get(&self, var: &StrVar) -> Option<&str> {
        self.assignments.get(var).map(String::as_str)
    }

    /// Number of assigned variables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    /// Check if no variable is assigned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    /// Iterate over assignments in variable order.
    pub fn iter(&self) -> impl Iterator<Item = (&StrVar, &str)> {
        self.assignments.iter().map(|(var, value)| (var, value.as_str()))
    }

    /// Evaluate `formula` under the model.
    ///
    /// Returns `None` when the formula mentions an unassigned variable.
    #[must_use]
    pub fn eval(&self, formula: &Formula) -> Option<bool> {
        Some(match formula {
            Formula::True => true,
            Formula::False => false,
            Formula::InRe(var, regex) => Nfa::from_regex(regex).accepts(self.get(var)?),
            Formula::Len(var, op, n) => {
                op.holds(self.get(var)?.chars().count() as u64, *n as u64)
            }
            Formula::Count(term, op, n) => op.holds(term.value(self.get(term.var())?), *n),
            Formula::Not(inner) => !self.eval(inner)?,
            Formula::And(parts) => {
                let mut all = true;
                for part in parts {
                    all &= self.eval(part)?;
                }
                all
            }
            Formula::Or(parts) => {
                let mut any = false;
                for part in parts {
                    any |= self.eval(part)?;
                }
                any
            }
        })
    }
}

/// Check whether `value`, assigned to `var`, satisfies `formula`.
///
/// Formulas mentioning other variables are reported as not satisfied.
#[must_use]
pub fn satisfies(formula: &Formula, var: &StrVar, value: &str) -> bool {
    Model::singleton(var.clone(), value)
        .eval(formula)
        .unwrap_or(false)
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, (var, value)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{} = {}", var, show_value(value))?;
        }
        write!(f, "]")
    }
}

impl Serialize for Model {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter().map(|(var, value)| (var.name(), value)))
    }
}
