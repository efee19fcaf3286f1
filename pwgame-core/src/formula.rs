//! Formulas over string variables.
//!
//! A [`Formula`] is a value handed to an oracle; nothing in this crate
//! evaluates it. Atoms are regular-language membership, length comparisons
//! and (weighted) character-count comparisons.

use crate::charset::CharSet;
use crate::regex::Regex;
use crate::smtlib::quote;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

/// Symbolic string variable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StrVar {
    name: Arc<str>,
}

impl StrVar {
    /// Declare a string variable.
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self { name: name.into() }
    }

    /// Variable name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The variable matches `regex`.
    #[must_use]
    pub fn in_re(&self, regex: Regex) -> Formula {
        Formula::InRe(self.clone(), regex)
    }

    /// Length of the variable.
    #[must_use]
    pub fn len(&self) -> LenTerm {
        LenTerm { var: self.clone() }
    }

    /// Number of characters of the variable that belong to `set`.
    #[must_use]
    pub fn count(&self, set: CharSet) -> CountTerm {
        self.weighted_count([(set, 1)])
    }

    /// Weighted character count `Σ wᵢ · #{c ∈ setᵢ}`.
    ///
    /// A character belonging to several sets contributes every matching weight.
    #[must_use]
    pub fn weighted_count(&self, weights: impl IntoIterator<Item = (CharSet, u32)>) -> CountTerm {
        CountTerm {
            var: self.clone(),
            weights: weights.into_iter().collect(),
        }
    }
}

impl fmt::Display for StrVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Integer comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Cmp {
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `=`
    Eq,
    /// `!=`
    Ne,
    /// `>=`
    Ge,
    /// `>`
    Gt,
}

impl Cmp {
    /// Evaluate `lhs <op> rhs`.
    #[must_use]
    pub fn holds(self, lhs: u64, rhs: u64) -> bool {
        match self {
            Cmp::Lt => lhs < rhs,
            Cmp::Le => lhs <= rhs,
            Cmp::Eq => lhs == rhs,
            Cmp::Ne => lhs != rhs,
            Cmp::Ge => lhs >= rhs,
            Cmp::Gt => lhs > rhs,
        }
    }

    /// Complementary operator: `!(a op b)` iff `a op.negate() b`.
    #[must_use]
    pub fn negate(self) -> Cmp {
        match self {
            Cmp::Lt => Cmp::Ge,
            Cmp::Le => Cmp::Gt,
            Cmp::Eq => Cmp::Ne,
            Cmp::Ne => Cmp::Eq,
            Cmp::Ge => Cmp::Lt,
            Cmp::Gt => Cmp::Le,
        }
    }

    /// SMT-LIB operator symbol (`!=` renders through `not`).
    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            Cmp::Lt => "<",
            Cmp::Le => "<=",
            Cmp::Eq | Cmp::Ne => "=",
            Cmp::Ge => ">=",
            Cmp::Gt => ">",
        }
    }
}

/// `str.len` of a variable, waiting for a comparison.
#[derive(Debug, Clone)]
pub struct LenTerm {
    var: StrVar,
}

impl LenTerm {
    /// `len <op> n`
    #[must_use]
    pub fn cmp(self, op: Cmp, n: usize) -> Formula {
        Formula::Len(self.var, op, n)
    }

    /// `len >= n`
    #[must_use]
    pub fn ge(self, n: usize) -> Formula {
        self.cmp(Cmp::Ge, n)
    }

    /// `len <= n`
    #[must_use]
    pub fn le(self, n: usize) -> Formula {
        self.cmp(Cmp::Le, n)
    }

    /// `len = n`
    #[must_use]
    pub fn eq(self, n: usize) -> Formula {
        self.cmp(Cmp::Eq, n)
    }
}

/// Weighted count of the characters of a variable.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CountTerm {
    var: StrVar,
    weights: Vec<(CharSet, u32)>,
}

impl CountTerm {
    /// Counted variable.
    #[must_use]
    pub fn var(&self) -> &StrVar {
        &self.var
    }

    /// Classes and their weights.
    #[must_use]
    pub fn weights(&self) -> &[(CharSet, u32)] {
        &self.weights
    }

    /// Contribution of one occurrence of `c`.
    #[must_use]
    pub fn weight_of(&self, c: char) -> u64 {
        self.weights
            .iter()
            .filter(|(set, _)| set.contains(c))
            .map(|(_, w)| u64::from(*w))
            .sum()
    }

    /// Value of the term for a concrete string.
    #[must_use]
    pub fn value(&self, s: &str) -> u64 {
        s.chars().map(|c| self.weight_of(c)).sum()
    }

    /// `count <op> n`
    #[must_use]
    pub fn cmp(self, op: Cmp, n: u64) -> Formula {
        Formula::Count(self, op, n)
    }

    /// `count = n`
    #[must_use]
    pub fn eq(self, n: u64) -> Formula {
        self.cmp(Cmp::Eq, n)
    }

    /// `count <= n`
    #[must_use]
    pub fn le(self, n: u64) -> Formula {
        self.cmp(Cmp::Le, n)
    }

    /// `count >= n`
    #[must_use]
    pub fn ge(self, n: u64) -> Formula {
        self.cmp(Cmp::Ge, n)
    }
}

/// Rendered as a sum of `(str.count_in var class)` terms. `str.count_in` is
/// not part of the SMT-LIB strings theory, so scripts with count atoms do not
/// load into other solvers as they are.
impl fmt::Display for CountTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let terms: Vec<String> = self
            .weights
            .iter()
            .map(|(set, w)| {
                let count = format!(
                    "(str.count_in {} {})",
                    self.var,
                    crate::regex::class(set)
                );
                if *w == 1 {
                    count
                } else {
                    format!("(* {} {})", w, count)
                }
            })
            .collect();
        match terms.as_slice() {
            [] => write!(f, "0"),
            [single] => write!(f, "{}", single),
            many => write!(f, "(+ {})", many.join(" ")),
        }
    }
}

/// Boolean combination of string constraints.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Formula {
    /// Always holds
    True,
    /// Never holds
    False,
    /// Membership of a variable in a regular language
    InRe(StrVar, Regex),
    /// Comparison on the length of a variable
    Len(StrVar, Cmp, usize),
    /// Comparison on a weighted character count
    Count(CountTerm, Cmp, u64),
    /// Negation
    Not(Box<Formula>),
    /// Conjunction (empty conjunction holds)
    And(Vec<Formula>),
    /// Disjunction (empty disjunction fails)
    Or(Vec<Formula>),
}

impl Formula {
    /// Conjunction of `parts`.
    #[must_use]
    pub fn and(parts: impl IntoIterator<Item = Formula>) -> Formula {
        Formula::And(parts.into_iter().collect())
    }

    /// Disjunction of `parts`.
    #[must_use]
    pub fn or(parts: impl IntoIterator<Item = Formula>) -> Formula {
        Formula::Or(parts.into_iter().collect())
    }

    /// `premise => conclusion`
    #[must_use]
    pub fn implies(premise: Formula, conclusion: Formula) -> Formula {
        Formula::Or(vec![premise.negate(), conclusion])
    }

    /// Negation, collapsing double negation.
    #[must_use]
    pub fn negate(self) -> Formula {
        match self {
            Formula::Not(inner) => *inner,
            Formula::True => Formula::False,
            Formula::False => Formula::True,
            other => Formula::Not(Box::new(other)),
        }
    }

    /// Variables mentioned by the formula.
    #[must_use]
    pub fn vars(&self) -> BTreeSet<StrVar> {
        let mut out = BTreeSet::new();
        self.collect_vars(&mut out);
        out
    }

    fn collect_vars(&self, out: &mut BTreeSet<StrVar>) {
        match self {
            Formula::True | Formula::False => {}
            Formula::InRe(var, _) | Formula::Len(var, _, _) => {
                out.insert(var.clone());
            }
            Formula::Count(term, _, _) => {
                out.insert(term.var.clone());
            }
            Formula::Not(inner) => inner.collect_vars(out),
            Formula::And(parts) | Formula::Or(parts) => {
                for part in parts {
                    part.collect_vars(out);
                }
            }
        }
    }
}

impl std::ops::Not for Formula {
    type Output = Formula;

    fn not(self) -> Formula {
        self.negate()
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Formula::True => write!(f, "true"),
            Formula::False => write!(f, "false"),
            Formula::InRe(var, regex) => write!(f, "(str.in_re {} {})", var, regex),
            Formula::Len(var, Cmp::Ne, n) => write!(f, "(not (= (str.len {}) {}))", var, n),
            Formula::Len(var, op, n) => write!(f, "({} (str.len {}) {})", op.symbol(), var, n),
            Formula::Count(term, Cmp::Ne, n) => write!(f, "(not (= {} {}))", term, n),
            Formula::Count(term, op, n) => write!(f, "({} {} {})", op.symbol(), term, n),
            Formula::Not(inner) => write!(f, "(not {})", inner),
            Formula::And(parts) if parts.is_empty() => write!(f, "true"),
            Formula::Or(parts) if parts.is_empty() => write!(f, "false"),
            Formula::And(parts) => write_connective(f, "and", parts),
            Formula::Or(parts) => write_connective(f, "or", parts),
        }
    }
}

fn write_connective(f: &mut fmt::Formatter<'_>, op: &str, parts: &[Formula]) -> fmt::Result {
    write!(f, "({}", op)?;
    for part in parts {
        write!(f, " {}", part)?;
    }
    write!(f, ")")
}

/// Declare `var` as an SMT-LIB2 string constant.
#[must_use]
pub fn declare(var: &StrVar) -> String {
    format!("(declare-const {} String)", var)
}

/// Render a string value the way models print it.
#[must_use]
pub fn show_value(value: &str) -> String {
    quote(value)
}
