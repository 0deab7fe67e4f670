//! `describe` and `validate` command handlers.

use std::fmt::Write as _;
use std::path::Path;

use anyhow::Context;
use reelstat_engine::{read_table, run_pipeline, PipelineSummary, QualityReport};

/// Run the enrichment pipeline from `input` to `output`.
///
/// # Errors
///
/// Returns an error if the input cannot be read or lacks a required column,
/// or if the output cannot be written.
pub(crate) fn run_describe(input: &Path, output: &Path) -> anyhow::Result<()> {
    let summary = run_pipeline(input, output)
        .with_context(|| format!("failed to describe {}", input.display()))?;
    print!("{}", render_describe_summary(&summary, output)?);
    Ok(())
}

fn render_describe_summary(
    summary: &PipelineSummary,
    output: &Path,
) -> Result<String, std::fmt::Error> {
    let mut out = String::new();
    writeln!(
        out,
        "described {} reels across {} accounts -> {}",
        summary.rows,
        summary.accounts,
        output.display()
    )?;
    if summary.clamped_values > 0 {
        writeln!(out, "  negative counters clamped to 0: {}", summary.clamped_values)?;
    }
    if summary.unparsable_values > 0 {
        writeln!(
            out,
            "  non-numeric counters left empty: {}",
            summary.unparsable_values
        )?;
    }
    if summary.unparsable_timestamps > 0 {
        writeln!(
            out,
            "  timestamps kept verbatim: {}",
            summary.unparsable_timestamps
        )?;
    }
    Ok(out)
}

/// Print a data-quality report for `input`.
///
/// # Errors
///
/// Returns an error if the table cannot be read.
pub(crate) fn run_validate(input: &Path) -> anyhow::Result<()> {
    let table =
        read_table(input).with_context(|| format!("failed to read {}", input.display()))?;
    let report = QualityReport::from_table(&table);
    print!("{}", render_quality_report(&report, input)?);
    Ok(())
}

fn render_quality_report(
    report: &QualityReport,
    input: &Path,
) -> Result<String, std::fmt::Error> {
    let mut out = String::new();
    writeln!(out, "# Data Quality Report")?;
    writeln!(out)?;
    writeln!(out, "**Source**: {}", input.display())?;
    writeln!(out, "**Rows**: {}", report.total_rows)?;
    writeln!(out, "**Columns**: {}", report.total_columns)?;
    writeln!(out, "**Missing cells**: {}", report.missing_cells)?;
    writeln!(out, "**Duplicate rows**: {}", report.duplicate_rows)?;
    writeln!(out)?;

    if report.is_processable() {
        writeln!(out, "All required columns present.")?;
    } else {
        writeln!(
            out,
            "Missing required columns: {}",
            report.missing_required.join(", ")
        )?;
    }

    if !report.missing_by_column.is_empty() {
        writeln!(out)?;
        writeln!(out, "| Column | Missing |")?;
        writeln!(out, "|--------|---------|")?;
        for (column, missing) in &report.missing_by_column {
            writeln!(out, "| {column} | {missing} |")?;
        }
    }

    Ok(out)
}
