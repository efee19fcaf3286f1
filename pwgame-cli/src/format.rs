//! Output formatting and display utilities for pwgame CLI

use owo_colors::{AnsiColors, OwoColorize, Stream};
use pwgame_rules::{DriverEvent, DriverReport, Outcome, ProofReport, Verdict};
use serde::Serialize;

use crate::{Args, Verbosity};

/// Everything a run produced, for `--format json`
#[derive(Debug, Serialize)]
struct JsonOutput<'a> {
    driver: &'a DriverReport,
    proofs: &'a [ProofReport],
    #[serde(skip_serializing_if = "Option::is_none")]
    assertions: Option<&'a str>,
}

fn outcome_color(outcome: &Outcome) -> AnsiColors {
    match outcome {
        Outcome::Witness(_) => AnsiColors::Green,
        Outcome::NoSolution => AnsiColors::Red,
        Outcome::Unknown(_) => AnsiColors::Yellow,
    }
}

fn verdict_color(verdict: &Verdict) -> AnsiColors {
    match verdict {
        Verdict::Proved => AnsiColors::Green,
        Verdict::Refuted { .. } => AnsiColors::Red,
        Verdict::Vacuous | Verdict::Unresolved { .. } => AnsiColors::Yellow,
    }
}

/// Print one driver step; quiet mode keeps only the outcome.
pub(crate) fn print_event(args: &Args, verbosity: Verbosity, event: &DriverEvent) {
    match event {
        DriverEvent::Finished { outcome } => {
            println_colored(args, &outcome.to_string(), Some(outcome_color(outcome)));
        }
        _ if verbosity > Verbosity::Quiet => println!("{}", event),
        _ => {}
    }
}

/// Print run statistics
pub(crate) fn print_report(args: &Args, report: &DriverReport) {
    println!();
    println_colored(args, "Statistics:", Some(AnsiColors::Yellow));
    println!("  Rules added: {}", report.added.len());
    if let Some(index) = report.pending {
        println!("  First pending rule: {}", index);
    }
    println!("  Checks: {}", report.stats.checks);
    println!("  Character classes: {}", report.stats.classes);
    println!("  Membership atoms: {}", report.stats.atoms);
    println!("  States explored: {}", report.stats.explored);
    println!("  States pruned: {}", report.stats.pruned);
    println!("  Time: {:.3}s", report.elapsed.as_secs_f64());
}

/// Print one verdict line per claim
pub(crate) fn print_proofs(args: &Args, verbosity: Verbosity, proofs: &[ProofReport]) {
    if proofs.is_empty() {
        return;
    }
    if verbosity > Verbosity::Quiet {
        println!();
        println_colored(args, "Redundancy:", Some(AnsiColors::Yellow));
    }
    for proof in proofs {
        let line = if verbosity >= Verbosity::Verbose {
            format!("{} [{:.3}s]", proof, proof.elapsed.as_secs_f64())
        } else {
            proof.to_string()
        };
        println_colored(args, &line, Some(verdict_color(&proof.verdict)));
    }
}

/// Print the whole run as one JSON document
pub(crate) fn print_json(
    report: &DriverReport,
    proofs: &[ProofReport],
    assertions: Option<&str>,
) -> Result<(), serde_json::Error> {
    let output = JsonOutput {
        driver: report,
        proofs,
        assertions,
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// Print text to stdout, colored unless disabled
pub(crate) fn println_colored(args: &Args, text: &str, color: Option<AnsiColors>) {
    if args.no_color {
        println!("{}", text);
    } else if let Some(c) = color {
        println!("{}", text.if_supports_color(Stream::Stdout, |t| t.color(c)));
    } else {
        println!("{}", text);
    }
}

/// Print colored error message to stderr
pub(crate) fn eprintln_colored(args: &Args, text: &str) {
    if args.no_color {
        eprintln!("{}", text);
    } else {
        eprintln!("{}", text.if_supports_color(Stream::Stderr, |t| t.red()));
    }
}
