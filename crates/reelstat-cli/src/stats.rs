//! `stats` command: markdown distribution report for one column.

use std::fmt::Write as _;
use std::path::Path;

use anyhow::Context;
use chrono::Utc;
use reelstat_core::AppConfig;
use reelstat_engine::{analyze_metric, read_table, AccountFilter, MetricReport, Thresholds};

/// Format a value with three decimals, matching the dashboard's table format.
pub(crate) fn fmt_value(value: f64) -> String {
    format!("{value:.3}")
}

/// Format an optional value, returning a dash when `None`.
pub(crate) fn fmt_opt(value: Option<f64>) -> String {
    value.map_or_else(|| "\u{2014}".to_string(), fmt_value)
}

fn fmt_percent(fraction: f64) -> String {
    format!("{:.2}%", fraction * 100.0)
}

/// Print the distribution report for `metric` over the selected accounts.
///
/// # Errors
///
/// Returns an error if the table cannot be read, the column does not exist,
/// or accounts were requested and the table has no account column.
pub(crate) fn run_stats(
    config: &AppConfig,
    input: &Path,
    metric: &str,
    accounts: &[String],
) -> anyhow::Result<()> {
    let table =
        read_table(input).with_context(|| format!("failed to read {}", input.display()))?;
    let thresholds = Thresholds::from_config(config);
    let filter = AccountFilter::accounts(accounts);

    let report = analyze_metric(&table, metric, &filter, &thresholds)
        .with_context(|| format!("failed to analyze '{metric}' in {}", input.display()))?;

    if report.summary.is_none() {
        println!("no values for '{metric}' in the selected rows; nothing to report");
        return Ok(());
    }

    print!("{}", render_stats_report(&report, &thresholds)?);
    Ok(())
}

fn render_stats_report(
    report: &MetricReport,
    thresholds: &Thresholds,
) -> Result<String, std::fmt::Error> {
    let mut out = String::new();
    let now = Utc::now().format("%Y-%m-%d %H:%M UTC");
    let accounts = if report.accounts.is_empty() {
        "All accounts".to_string()
    } else {
        report.accounts.join(", ")
    };

    writeln!(out, "# Metric Report: {}", report.column)?;
    writeln!(out)?;
    writeln!(out, "**Generated**: {now}")?;
    writeln!(out, "**Accounts**: {accounts}")?;
    writeln!(out, "**Rows**: {}", report.rows)?;
    writeln!(out)?;
    writeln!(out, "---")?;

    let Some(s) = &report.summary else {
        return Ok(out);
    };

    writeln!(out)?;
    writeln!(out, "## Summary")?;
    writeln!(out)?;
    writeln!(out, "| Statistic | Value |")?;
    writeln!(out, "|-----------|-------|")?;
    writeln!(out, "| Count | {} |", s.count)?;
    for (label, value) in [
        ("Sum", Some(s.sum)),
        ("Mean", Some(s.mean)),
        ("Median", Some(s.median)),
        ("Min", Some(s.min)),
        ("Max", Some(s.max)),
        ("Std", s.std),
        ("Coefficient of variation", s.coefficient_of_variation),
        ("Skewness", s.skewness),
        ("Kurtosis", s.kurtosis),
    ] {
        writeln!(out, "| {label} | {} |", fmt_opt(value))?;
    }

    writeln!(out)?;
    writeln!(out, "## Thresholds")?;
    writeln!(out)?;
    writeln!(out, "| Threshold | Value |")?;
    writeln!(out, "|-----------|-------|")?;
    writeln!(
        out,
        "| Hot (mean + {}σ) | {} |",
        thresholds.hot,
        fmt_opt(s.hot_threshold)
    )?;
    writeln!(
        out,
        "| Very successful (mean + {}σ) | {} |",
        thresholds.very_successful,
        fmt_opt(s.very_successful_threshold)
    )?;
    writeln!(
        out,
        "| Cold (mean - {}σ) | {} |",
        thresholds.hot,
        fmt_opt(s.cold_threshold)
    )?;
    writeln!(out, "| Q1 | {} |", fmt_value(s.q1))?;
    writeln!(out, "| Q3 | {} |", fmt_value(s.q3))?;
    writeln!(out, "| IQR | {} |", fmt_value(s.iqr))?;
    writeln!(out, "| Lower fence | {} |", fmt_value(s.lower_fence))?;
    writeln!(out, "| Upper fence | {} |", fmt_value(s.upper_fence))?;

    writeln!(out)?;
    writeln!(out, "## Percentiles")?;
    writeln!(out)?;
    writeln!(out, "| Percentile | Value |")?;
    writeln!(out, "|------------|-------|")?;
    for (p, value) in &s.percentiles {
        writeln!(out, "| {p}% | {} |", fmt_value(*value))?;
    }

    writeln!(out)?;
    writeln!(out, "## Distribution")?;
    writeln!(out)?;
    writeln!(out, "| Bucket | Range | Count | Count share | Sum | Sum share |")?;
    writeln!(out, "|--------|-------|-------|-------------|-----|-----------|")?;
    for b in &s.buckets {
        writeln!(
            out,
            "| {} | {} .. {} | {} | {} | {} | {} |",
            b.label(),
            fmt_value(b.lower),
            fmt_value(b.upper),
            b.count,
            fmt_percent(b.count_share),
            fmt_value(b.sum),
            fmt_percent(b.sum_share)
        )?;
    }

    let t = &report.totals;
    writeln!(out)?;
    writeln!(out, "## Totals")?;
    writeln!(out)?;
    writeln!(out, "| Total | Value |")?;
    writeln!(out, "|-------|-------|")?;
    writeln!(out, "| Views | {:.0} |", t.views)?;
    writeln!(out, "| Likes | {:.0} |", t.likes)?;
    writeln!(out, "| Comments | {:.0} |", t.comments)?;
    writeln!(out, "| Like rate | {} |", fmt_percent(t.like_rate))?;
    writeln!(out, "| Comment rate | {} |", fmt_percent(t.comment_rate))?;
    writeln!(out, "| Like-comment rate | {} |", fmt_percent(t.like_comment_rate))?;
    writeln!(
        out,
        "| {} / views | {} |",
        report.column,
        fmt_value(report.ratio_to_total_views)
    )?;

    Ok(out)
}
