//! Output formatting for lint results.

use anyhow::Result;
use miette::{NamedSource, Report};
use modbound_core::{LintResult, Severity, Violation, ViolationDiagnostic};
use std::path::Path;

use crate::OutputFormat;

/// Print lint results in the specified format.
///
/// `root` is the directory violation paths are relative to.
pub fn print(result: &LintResult, format: OutputFormat, root: &Path) -> Result<()> {
    match format {
        OutputFormat::Text => print_text(result),
        OutputFormat::Json => return print_json(result),
        OutputFormat::Compact => print_compact(result),
        OutputFormat::Pretty => print_pretty(result, root),
    }
    Ok(())
}

fn print_text(result: &LintResult) {
    for violation in &result.violations {
        println!(
            "{} {} at {}:{}:{}",
            violation.code,
            violation.rule,
            violation.location.file.display(),
            violation.location.line,
            violation.location.column,
        );
        println!("  {}: {}", colored_severity(violation.severity), violation.message);
        if let Some(suggestion) = &violation.suggestion {
            println!("  = help: {}", suggestion.message);
        }
        println!();
    }
    print_summary(result);
}

fn colored_severity(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "\x1b[31merror\x1b[0m",
        Severity::Warning => "\x1b[33mwarning\x1b[0m",
        Severity::Info => "\x1b[34minfo\x1b[0m",
    }
}

fn print_summary(result: &LintResult) {
    let (errors, warnings, infos) = result.count_by_severity();

    let summary_color = if errors > 0 {
        "\x1b[31m"
    } else if warnings > 0 {
        "\x1b[33m"
    } else {
        "\x1b[32m"
    };

    println!(
        "{}Found {} error(s), {} warning(s), {} info(s) in {} file(s)\x1b[0m",
        summary_color, errors, warnings, infos, result.files_checked
    );
    if result.files_skipped > 0 {
        println!("Skipped {} unparsable file(s)", result.files_skipped);
    }
}

fn print_json(result: &LintResult) -> Result<()> {
    let json = serde_json::to_string_pretty(result)?;
    println!("{json}");
    Ok(())
}

fn print_compact(result: &LintResult) {
    for violation in &result.violations {
        println!("{violation}");
    }
}

fn print_pretty(result: &LintResult, root: &Path) {
    for violation in &result.violations {
        println!("{:?}", pretty_report(violation, root));
    }
    print_summary(result);
}

/// Builds a miette report for `violation`, attaching the file text when readable.
fn pretty_report(violation: &Violation, root: &Path) -> Report {
    let report = Report::new(ViolationDiagnostic::from(violation));
    let path = root.join(&violation.location.file);
    match std::fs::read_to_string(&path) {
        Ok(text) => report.with_source_code(NamedSource::new(
            violation.location.file.display().to_string(),
            text,
        )),
        Err(e) => {
            tracing::debug!("No source excerpt for {}: {e}", path.display());
            report
        }
    }
}
