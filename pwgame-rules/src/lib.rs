//! pwgame Rules - the password game as string constraints
//!
//! This crate holds everything specific to the game:
//! - the [`Catalog`] of rules 0..=10, each a pure function from the password
//!   variable to a [`Formula`](pwgame_core::Formula)
//! - the model-finding [`Driver`], which conjoins the implemented rules and
//!   asks an [`Oracle`](pwgame_solver::Oracle) for a password
//! - the [`RedundancyProver`], which shows that some rules follow from others
//!   for every password up to a length bound
//!
//! # Examples
//!
//! ```
//! use pwgame_rules::{Catalog, Driver, Outcome};
//! use pwgame_solver::Solver;
//!
//! let catalog = Catalog::truncated(3);
//! let mut driver = Driver::new(&catalog, Solver::new());
//! let report = driver.run(|event| println!("{}", event)).unwrap();
//!
//! assert_eq!(report.pending, Some(3));
//! let Outcome::Witness(password) = &report.outcome else { panic!() };
//! assert!(password.len() >= 5);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod catalog;
pub mod driver;
pub mod error;
pub mod redundancy;

pub use catalog::{Catalog, Rule, VARIABLE};
pub use driver::{Driver, DriverEvent, DriverPhase, DriverReport, Outcome};
pub use error::{DriverError, ProverError, RuleError};
pub use redundancy::{ProofReport, ProverConfig, RedundancyClaim, RedundancyProver, Verdict};
