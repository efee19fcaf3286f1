//! Regular-language combinators.
//!
//! Expressions are immutable trees over the ASCII alphabet. Every rule of the
//! catalog is phrased with the handful of builders in this module:
//!
//! ```
//! use pwgame_core::regex::{containing, range};
//!
//! // "the password contains a digit", anywhere
//! let digit = containing(range('0', '9').unwrap());
//! assert_eq!(
//!     digit.to_string(),
//!     r#"(re.++ (re.* (re.range " " "~")) (re.range "0" "9") (re.* (re.range " " "~")))"#
//! );
//! ```

use crate::charset::{CharRange, CharSet};
use crate::error::{ConstructionError, Result};
use crate::smtlib::quote;
use std::fmt;

/// Regular-language expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Regex {
    /// One character from a range
    Range(CharRange),
    /// Exactly this string (the empty literal denotes the empty string)
    Literal(String),
    /// Union of alternatives
    Union(Vec<Regex>),
    /// Concatenation, left to right
    Concat(Vec<Regex>),
    /// Kleene star
    Star(Box<Regex>),
}

/// Every string over printable ASCII (`' '..='~'`).
#[must_use]
pub fn full() -> Regex {
    star(Regex::Range(CharRange::PRINTABLE))
}

/// Strings that contain a match of `r` at any position.
///
/// Built as `concat(full(), r, full())`, so nothing is anchored to the start
/// or the end of the string.
#[must_use]
pub fn containing(r: Regex) -> Regex {
    Regex::Concat(vec![full(), r, full()])
}

/// One character in `lo..=hi`.
pub fn range(lo: char, hi: char) -> Result<Regex> {
    Ok(Regex::Range(CharRange::new(lo, hi)?))
}

/// One character of `set`.
#[must_use]
pub fn class(set: &CharSet) -> Regex {
    match set.ranges() {
        [single] => Regex::Range(*single),
        ranges => Regex::Union(ranges.iter().copied().map(Regex::Range).collect()),
    }
}

/// Union of at least one alternative.
pub fn union(parts: impl IntoIterator<Item = Regex>) -> Result<Regex> {
    let parts: Vec<Regex> = parts.into_iter().collect();
    if parts.is_empty() {
        return Err(ConstructionError::EmptyUnion);
    }
    Ok(Regex::Union(parts))
}

/// Concatenation; an empty sequence denotes the empty string.
#[must_use]
pub fn concat(parts: impl IntoIterator<Item = Regex>) -> Regex {
    let parts: Vec<Regex> = parts.into_iter().collect();
    if parts.is_empty() {
        return Regex::Literal(String::new());
    }
    Regex::Concat(parts)
}

/// Zero or more repetitions of `r`.
#[must_use]
pub fn star(r: Regex) -> Regex {
    Regex::Star(Box::new(r))
}

/// Exactly the string `s`.
pub fn literal(s: &str) -> Result<Regex> {
    if let Some(ch) = s.chars().find(|c| !c.is_ascii()) {
        return Err(ConstructionError::NonAscii { ch });
    }
    Ok(Regex::Literal(s.to_string()))
}

/// Union of literal words.
pub fn any_literal<'a>(words: impl IntoIterator<Item = &'a str>) -> Result<Regex> {
    union(
        words
            .into_iter()
            .map(literal)
            .collect::<Result<Vec<_>>>()?,
    )
}

impl Regex {
    /// Call `f` with every character range the expression mentions.
    ///
    /// Literal characters are reported as single-character ranges.
    pub fn visit_ranges(&self, f: &mut impl FnMut(CharRange)) {
        match self {
            Regex::Range(r) => f(*r),
            Regex::Literal(s) => {
                for ch in s.chars() {
                    if let Ok(r) = CharRange::single(ch) {
                        f(r);
                    }
                }
            }
            Regex::Union(parts) | Regex::Concat(parts) => {
                for part in parts {
                    part.visit_ranges(f);
                }
            }
            Regex::Star(inner) => inner.visit_ranges(f),
        }
    }

    /// Number of nodes in the expression tree.
    #[must_use]
    pub fn size(&self) -> usize {
        match self {
            Regex::Range(_) | Regex::Literal(_) => 1,
            Regex::Union(parts) | Regex::Concat(parts) => {
                1 + parts.iter().map(Regex::size).sum::<usize>()
            }
            Regex::Star(inner) => 1 + inner.size(),
        }
    }
}

impl fmt::Display for Regex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Regex::Range(r) => {
                let lo = char::from(r.lo()).to_string();
                let hi = char::from(r.hi()).to_string();
                if r.lo() == r.hi() {
                    write!(f, "(str.to_re {})", quote(&lo))
                } else {
                    write!(f, "(re.range {} {})", quote(&lo), quote(&hi))
                }
            }
            Regex::Literal(s) => write!(f, "(str.to_re {})", quote(s)),
            Regex::Union(parts) => write_app(f, "re.union", parts),
            Regex::Concat(parts) if parts.is_empty() => write!(f, "(str.to_re \"\")"),
            Regex::Concat(parts) => write_app(f, "re.++", parts),
            Regex::Star(inner) => write!(f, "(re.* {})", inner),
        }
    }
}

fn write_app(f: &mut fmt::Formatter<'_>, op: &str, parts: &[Regex]) -> fmt::Result {
    write!(f, "({}", op)?;
    for part in parts {
        write!(f, " {}", part)?;
    }
    write!(f, ")")
}
