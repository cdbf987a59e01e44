pub mod types;

pub use types::{PrMeta, ValidationReport};

use colored::Colorize;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::engine::Issue;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to write report file: {0}")]
    FileWrite(#[from] std::io::Error),

    #[error("Failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Markdown,
}

/// Output the report to stdout or to a file.
///
/// Text goes to the terminal with colors; when written to a file it is
/// rendered as markdown instead.
#[instrument(skip(report), fields(issues = report.issues().len(), files = report.files_checked_count()))]
pub fn output(
    report: &ValidationReport,
    format: OutputFormat,
    output_path: Option<&Path>,
) -> Result<(), ReportError> {
    match (format, output_path) {
        (OutputFormat::Text, None) => {
            debug!("writing report to terminal");
            print_terminal_report(report);
        }
        (OutputFormat::Json, None) => {
            println!("{}", serde_json::to_string_pretty(report)?);
        }
        (OutputFormat::Markdown, None) => {
            print!("{}", render_markdown(report));
        }
        (OutputFormat::Json, Some(path)) => {
            debug!(path = %path.display(), "writing JSON report to file");
            std::fs::write(path, serde_json::to_string_pretty(report)?)?;
        }
        (OutputFormat::Text | OutputFormat::Markdown, Some(path)) => {
            debug!(path = %path.display(), "writing markdown report to file");
            std::fs::write(path, render_markdown(report))?;
        }
    }
    Ok(())
}

fn location(issue: &Issue) -> String {
    format!("{}:{}", issue.file, issue.line)
}

/// Format and print the report to the terminal with colors.
///
/// PR: "Migrate send flow specs"
/// Author: alice | https://github.com/org/repo/pull/42 | Files checked: 3
///
/// ═══ Issues (2) ═══
///   • [getter-type] e2e/pages/Send.ts:14
///       get reviewButton(): Promise<any> {
///
/// ═══ FAILED: 2 issues ═══
fn print_terminal_report(report: &ValidationReport) {
    println!();
    println!("PR: \"{}\"", report.pr.title);
    println!(
        "Author: {} | {} | Files checked: {}",
        report.pr.author,
        report.pr.url,
        report.files_checked_count()
    );
    println!();

    println!("═══ Issues ({}) ═══", report.issues().len());
    if report.passed() {
        println!("  No issues.");
    } else {
        for issue in report.issues() {
            println!(
                "  • {} {}",
                format!("[{}]", issue.check).yellow().bold(),
                location(issue)
            );
            println!("      {}", issue.snippet.dimmed());
        }
    }
    println!();

    if !report.passed() {
        println!("═══ By check ═══");
        for (kind, count) in report.counts_by_kind() {
            println!("  {:<26} {:>3}  {}", kind.as_str(), count, kind.description());
        }
        println!();
    }

    let verdict = if report.passed() {
        "PASSED".green().bold()
    } else {
        format!("FAILED: {} issues", report.issues().len()).red().bold()
    };
    println!("═══ {} ═══", verdict);
    println!();
}

/// Render the report as markdown, one table row per issue.
fn render_markdown(report: &ValidationReport) -> String {
    let mut md = String::new();
    md.push_str(&format!("# PR: \"{}\"\n\n", report.pr.title));
    md.push_str(&format!(
        "**Author:** {} | **URL:** {} | **Files checked:** {}\n\n",
        report.pr.author,
        report.pr.url,
        report.files_checked_count()
    ));

    md.push_str(&format!("## Issues ({})\n\n", report.issues().len()));
    if report.passed() {
        md.push_str("No issues.\n\n");
    } else {
        md.push_str("| Check | Location | Line |\n|---|---|---|\n");
        for issue in report.issues() {
            md.push_str(&format!(
                "| `{}` | `{}` | `{}` |\n",
                issue.check,
                location(issue),
                issue.snippet.replace('|', "\\|")
            ));
        }
        md.push('\n');
    }

    md.push_str("## Checked files\n\n");
    for file in report.checked_files() {
        md.push_str(&format!("- `{}`\n", file));
    }
    md.push('\n');

    let verdict = if report.passed() { "PASSED" } else { "FAILED" };
    md.push_str(&format!("## Result: {}\n", verdict));
    md
}
