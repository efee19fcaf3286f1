//! pwgame Solver - satisfiability oracle for single-variable string formulas
//!
//! The decision procedure is purely automata based:
//! - every regular expression is compiled to a Thompson NFA, determinised
//!   over the coarsest character classes of the formula and minimised
//! - length and weighted character counts become saturating counters
//! - a best-first search over the product of all of them, guided by each
//!   automaton's distance to acceptance, finds a short (not necessarily
//!   shortest) witness, or exhausts the finite state space and answers
//!   `unsat`
//!
//! Searches that exceed [`SolverConfig::max_states`] or the configured
//! timeout answer `unknown` with a reason instead of running unbounded.
//!
//! # Examples
//!
//! ```
//! use pwgame_core::regex::{containing, full, range};
//! use pwgame_core::StrVar;
//! use pwgame_solver::{Oracle, Solver, SolverResult};
//!
//! let password = StrVar::new("password");
//! let mut solver = Solver::new();
//! solver.assert(password.in_re(full()));
//! solver.assert(password.in_re(containing(range('0', '9').unwrap())));
//!
//! assert_eq!(solver.check().unwrap(), SolverResult::Sat);
//! assert_eq!(solver.model().unwrap().get(&password), Some("0"));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod alphabet;
pub mod automaton;
pub mod config;
pub mod dfa;
pub mod error;
pub mod model;
pub mod search;
pub mod solver;

pub use config::SolverConfig;
pub use error::{Result, SolverError};
pub use model::{Model, satisfies};
pub use solver::{Oracle, Solver, SolverResult, SolverStats};
