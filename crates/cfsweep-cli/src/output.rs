//! Console output helpers.
//!
//! Human-facing lines share one vocabulary across commands: green checks
//! for completed operations, yellow warnings for skipped or unmatched
//! input, red errors on stderr for failures. Summaries always print, even
//! under `--quiet` — quiet suppresses per-item success lines only.

use std::process::ExitCode;

use colored::Colorize;

use cfsweep_core::Summary;

/// Print a success line.
pub fn success(message: &str) {
    println!("{} {message}", "✓".green());
}

/// Print a warning line.
pub fn warning(message: &str) {
    println!("{} {message}", "warning:".yellow());
}

/// Print an error line to stderr.
pub fn error(message: &str) {
    eprintln!("{} {message}", "error:".red());
}

/// Print a section header with a separator rule.
pub fn header(title: &str) {
    println!("\n{title}");
    println!("{}", "-".repeat(80));
}

/// Print the run summary and verdict.
pub fn print_summary(summary: Summary) {
    println!(
        "\nSummary: {} successful, {} failed",
        summary.success, summary.failure
    );
    if summary.is_clean() {
        success("all operations completed successfully");
    } else {
        error("some operations failed");
    }
}

/// Map a run summary to the process exit code.
pub fn summary_exit(summary: Summary) -> ExitCode {
    if summary.is_clean() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
