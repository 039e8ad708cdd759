use crate::app::models::{BatchReport, LogFormat, ProcessingOptions};
use anyhow::Result;
use std::io::{self, Write};
use std::process::ExitCode;

/// Writes the batch report to stdout/stderr in the configured format.
pub fn print_report(report: &BatchReport, options: &ProcessingOptions) -> Result<()> {
    let stdout = io::stdout();
    let stderr = io::stderr();
    write_report(report, options, &mut stdout.lock(), &mut stderr.lock())
}

pub fn write_report(
    report: &BatchReport,
    options: &ProcessingOptions,
    out: &mut impl Write,
    err: &mut impl Write,
) -> Result<()> {
    match options.log_format {
        LogFormat::Json => {
            writeln!(out, "{}", serde_json::to_string_pretty(report)?)?;
        }
        LogFormat::Text => write_text(report, options.quiet, out, err)?,
    }
    Ok(())
}

fn write_text(
    report: &BatchReport,
    quiet: bool,
    out: &mut impl Write,
    err: &mut impl Write,
) -> io::Result<()> {
    for outcome in &report.outcomes {
        if outcome.converted {
            if !quiet {
                writeln!(
                    out,
                    "✅ {} -> {}",
                    outcome.source_path.display(),
                    outcome.output_path.display()
                )?;
            }
        } else {
            writeln!(
                err,
                "❌ {}: {}",
                outcome.source_path.display(),
                outcome.failure_reason.as_deref().unwrap_or("Unknown error")
            )?;
        }
    }

    if !quiet && report.total > 1 {
        let icon = if report.has_failures() { "⚠️" } else { "✅" };
        writeln!(
            out,
            "\n{} {} files converted ({} success, {} failed)",
            icon, report.total, report.succeeded, report.failed
        )?;
    }

    Ok(())
}

/// Non-zero as soon as one file failed.
pub fn exit_code(report: &BatchReport) -> ExitCode {
    if report.has_failures() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
