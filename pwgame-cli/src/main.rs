//! pwgame CLI - solve the password game and prove rule redundancies

mod format;

use clap::{Parser, ValueEnum};
use pwgame_core::smtlib::script;
use pwgame_rules::{
    Catalog, Driver, DriverError, ProofReport, ProverConfig, ProverError, RedundancyClaim,
    RedundancyProver,
};
use pwgame_solver::{Solver, SolverConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::time::Duration;
use thiserror::Error;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use format::{eprintln_colored, print_event, print_json, print_proofs, print_report};

/// Configuration file structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct CliConfig {
    /// Default verbosity level
    #[serde(default)]
    verbosity: Option<String>,
    /// Default output format
    #[serde(default)]
    format: Option<String>,
    /// Default timeout in seconds
    #[serde(default)]
    timeout: Option<u64>,
    /// Default state budget
    #[serde(default)]
    max_states: Option<usize>,
    /// Enable colors by default
    #[serde(default)]
    color: Option<bool>,
    /// Check redundancy claims in parallel by default
    #[serde(default)]
    parallel: Option<bool>,
    /// Default number of prover threads
    #[serde(default)]
    threads: Option<usize>,
    /// Default length bound for redundancy claims
    #[serde(default)]
    bound: Option<usize>,
}

impl CliConfig {
    /// Load configuration from file
    fn load() -> Self {
        let config_path = dirs::home_dir()
            .map(|mut p| {
                p.push(".pwgamerc");
                p
            })
            .filter(|p| p.exists())
            .or_else(|| {
                dirs::config_dir().map(|mut p| {
                    p.push("pwgame");
                    p.push("config.yaml");
                    p
                })
            });

        if let Some(path) = config_path
            && path.exists()
            && let Ok(contents) = fs::read_to_string(&path)
            && let Ok(config) = serde_yaml::from_str(&contents)
        {
            return config;
        }

        Self::default()
    }

    /// Merge configuration with command-line arguments
    fn merge_with_args(&self, args: &mut Args) {
        // Only apply config if arg is not explicitly set
        if args.verbosity == Verbosity::Normal
            && let Some(ref v) = self.verbosity
            && let Ok(v) = Verbosity::from_str(v, true)
        {
            args.verbosity = v;
        }

        if args.format == OutputFormat::Text
            && let Some(ref f) = self.format
            && let Ok(f) = OutputFormat::from_str(f, true)
        {
            args.format = f;
        }

        if args.timeout == 0 {
            args.timeout = self.timeout.unwrap_or(0);
        }

        if args.max_states.is_none() {
            args.max_states = self.max_states;
        }

        if args.bound.is_none() {
            args.bound = self.bound;
        }

        if !args.parallel {
            args.parallel = self.parallel.unwrap_or(false);
        }

        if args.threads == 0 {
            args.threads = self.threads.unwrap_or(0);
        }

        if let Some(color) = self.color
            && !color
        {
            args.no_color = true;
        }
    }
}

/// Output format for results
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
enum OutputFormat {
    /// Progress lines and verdicts (default)
    Text,
    /// One JSON document at the end
    Json,
}

/// Verbosity level
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, PartialOrd, Ord)]
enum Verbosity {
    /// Only the outcome and verdicts
    Quiet,
    /// Progress lines
    Normal,
    /// Progress lines and statistics
    Verbose,
    /// Debug logging
    Debug,
    /// Trace logging
    Trace,
}

/// pwgame - the password game as string constraints
#[derive(Parser, Debug, Clone)]
#[command(name = "pwgame")]
#[command(version)]
#[command(about = "Find a password satisfying the password-game rules")]
struct Args {
    /// Number of implemented rules (default: all)
    #[arg(short, long, value_name = "N")]
    rules: Option<usize>,

    /// Check the catalog's redundancy claims after solving
    #[arg(short, long)]
    prove: bool,

    /// Length bound for redundancy claims
    #[arg(short, long, value_name = "L")]
    bound: Option<usize>,

    /// Use every other implemented rule as the support of each claim
    #[arg(long)]
    against_rest: bool,

    /// Print the accumulated assertions as SMT-LIB2 (count atoms use the
    /// non-standard `str.count_in` extension)
    #[arg(long)]
    dump_assertions: bool,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Timeout per check in seconds (0 = no timeout)
    #[arg(short, long, default_value = "0")]
    timeout: u64,

    /// Maximum number of automaton and search states per check
    #[arg(long, value_name = "N")]
    max_states: Option<usize>,

    /// Check redundancy claims in parallel
    #[arg(long)]
    parallel: bool,

    /// Number of prover threads (0 = one per core)
    #[arg(long, default_value = "0")]
    threads: usize,

    /// Verbosity level
    #[arg(short, long, value_enum, default_value = "normal")]
    verbosity: Verbosity,

    /// Enable quiet mode (equivalent to --verbosity quiet)
    #[arg(short, long)]
    quiet: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,
}

impl Args {
    fn solver_config(&self) -> SolverConfig {
        let mut config = SolverConfig::default();
        if self.timeout > 0 {
            config = config.with_timeout(Duration::from_secs(self.timeout));
        }
        if let Some(max_states) = self.max_states {
            config = config.with_max_states(max_states);
        }
        config
    }

    fn catalog(&self) -> Catalog {
        self.rules.map_or_else(Catalog::standard, Catalog::truncated)
    }

    /// Claims to check: the catalog's own, rebounded or widened per the flags.
    fn claims(&self, catalog: &Catalog) -> Vec<RedundancyClaim> {
        catalog
            .redundancy_claims()
            .into_iter()
            .map(|claim| {
                let bound = self.bound.unwrap_or(claim.bound());
                if self.against_rest {
                    RedundancyClaim::against_rest(catalog, claim.candidate(), bound)
                } else {
                    claim.with_bound(bound)
                }
            })
            .collect()
    }
}

/// Fatal error of a run
#[derive(Error, Debug)]
enum CliError {
    #[error("{0}")]
    Driver(#[from] DriverError),
    #[error("{0}")]
    Prover(#[from] ProverError),
    #[error("failed to serialize output: {0}")]
    Json(#[from] serde_json::Error),
}

fn main() {
    let mut args = Args::parse();

    // Load configuration file and merge with args
    let config = CliConfig::load();
    config.merge_with_args(&mut args);

    // Determine verbosity level
    let verbosity = if args.quiet {
        Verbosity::Quiet
    } else {
        args.verbosity
    };

    // Set up logging
    if verbosity >= Verbosity::Debug {
        let level = match verbosity {
            Verbosity::Trace => Level::TRACE,
            _ => Level::DEBUG,
        };
        let subscriber = FmtSubscriber::builder()
            .with_max_level(level)
            .with_writer(std::io::stderr)
            .finish();
        if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
            eprintln_colored(&args, &format!("Failed to set tracing subscriber: {}", e));
            std::process::exit(1);
        }
    }

    if let Err(e) = run(&args, verbosity) {
        eprintln_colored(&args, &format!("Error: {}", e));
        std::process::exit(1);
    }
}

fn run(args: &Args, verbosity: Verbosity) -> Result<(), CliError> {
    let catalog = args.catalog();
    let solver_config = args.solver_config();
    let text = args.format == OutputFormat::Text;

    let mut driver = Driver::new(&catalog, Solver::with_config(solver_config.clone()));
    let report = driver.run(|event| {
        if text {
            print_event(args, verbosity, event);
        }
    })?;

    if args.dump_assertions && text {
        print!("{}", script(&report.assertions));
    }
    if text && verbosity >= Verbosity::Verbose {
        print_report(args, &report);
    }

    let proofs: Vec<ProofReport> = if args.prove {
        let claims = args.claims(&catalog);
        let prover = RedundancyProver::new(&catalog, || {
            Solver::with_config(solver_config.clone())
        })
        .with_config(
            ProverConfig::default()
                .with_parallel(args.parallel)
                .with_num_threads(args.threads),
        );
        prover.prove_all(&claims)?
    } else {
        Vec::new()
    };

    if text {
        print_proofs(args, verbosity, &proofs);
    } else {
        let assertions = args.dump_assertions.then(|| script(&report.assertions));
        print_json(&report, &proofs, assertions.as_deref())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Args {
        Args::parse_from(std::iter::once("pwgame").chain(argv.iter().copied()))
    }

    #[test]
    fn test_defaults() {
        let args = parse(&[]);
        assert_eq!(args.rules, None);
        assert_eq!(args.format, OutputFormat::Text);
        assert_eq!(args.verbosity, Verbosity::Normal);
        assert_eq!(args.solver_config(), SolverConfig::default());
        assert_eq!(args.catalog().implemented(), 11);
    }

    #[test]
    fn test_limits_reach_solver_config() {
        let args = parse(&["--timeout", "3", "--max-states", "1000"]);
        let config = args.solver_config();
        assert_eq!(config.timeout, Some(Duration::from_secs(3)));
        assert_eq!(config.max_states, 1000);
    }

    #[test]
    fn test_claims_follow_flags() {
        let catalog = Catalog::standard();
        let rebounded = parse(&["--prove", "--bound", "8"]).claims(&catalog);
        assert_eq!(rebounded.len(), 3);
        assert!(rebounded.iter().all(|c| c.bound() == 8));

        let widened = parse(&["--prove", "--against-rest"]).claims(&catalog);
        assert_eq!(widened[0].candidate(), 2);
        assert_eq!(widened[0].support().len(), 10);
    }

    #[test]
    fn test_config_fills_unset_args() {
        let config: CliConfig =
            serde_yaml::from_str("verbosity: verbose\nformat: json\ntimeout: 5\ncolor: false\n")
                .unwrap();
        let mut args = parse(&["--bound", "12"]);
        config.merge_with_args(&mut args);
        assert_eq!(args.verbosity, Verbosity::Verbose);
        assert_eq!(args.format, OutputFormat::Json);
        assert_eq!(args.timeout, 5);
        assert_eq!(args.bound, Some(12));
        assert!(args.no_color);
    }

    #[test]
    fn test_explicit_args_win_over_config() {
        let config: CliConfig = serde_yaml::from_str("timeout: 5\nbound: 30\n").unwrap();
        let mut args = parse(&["--timeout", "2", "--bound", "12"]);
        config.merge_with_args(&mut args);
        assert_eq!(args.timeout, 2);
        assert_eq!(args.bound, Some(12));
    }
}
