//! pwgame Core - regular-language combinators and string formulas
//!
//! This crate provides the vocabulary the password rules are written in:
//! - ASCII character ranges and classes ([`CharRange`], [`CharSet`])
//! - Immutable regular-language expressions built from a few combinators
//!   ([`regex::full`], [`regex::containing`], [`regex::range`], ...)
//! - Formulas over a string variable: membership, length and weighted
//!   character-count comparisons under `and`/`or`/`not`
//! - SMT-LIB2 rendering of all of the above
//!
//! # Examples
//!
//! ```
//! use pwgame_core::regex::{containing, range};
//! use pwgame_core::{Formula, StrVar};
//!
//! let password = StrVar::new("password");
//! let rule = Formula::and([
//!     password.len().ge(5),
//!     password.in_re(containing(range('A', 'Z').unwrap())),
//! ]);
//! assert_eq!(rule.vars().len(), 1);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod charset;
pub mod error;
pub mod formula;
pub mod regex;
pub mod smtlib;

pub use charset::{ASCII_MAX, CharRange, CharSet};
pub use error::{ConstructionError, Result};
pub use formula::{Cmp, CountTerm, Formula, LenTerm, StrVar};
pub use regex::Regex;
