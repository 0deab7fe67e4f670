//! `top` and `videos` command handlers.

use std::fmt::Write as _;
use std::path::Path;

use anyhow::Context;
use reelstat_core::posts::columns;
use reelstat_core::{AppConfig, Metric};
use reelstat_engine::{
    filter_by_category, rank_by_account, read_table, AccountFilter, AccountRanking, Category,
    Order, Table,
};

use crate::stats::fmt_value;

/// Print each account's best (or, with `bottom`, worst) reels by `metric`.
///
/// # Errors
///
/// Returns an error if the table cannot be read or lacks the metric or
/// account column.
pub(crate) fn run_top(
    config: &AppConfig,
    input: &Path,
    metric: &str,
    limit: Option<usize>,
    bottom: bool,
) -> anyhow::Result<()> {
    let (order, default_limit) = if bottom {
        (Order::Bottom, config.bad_reels_count)
    } else {
        (Order::Top, config.top_reels_count)
    };
    let limit = limit.unwrap_or(default_limit);

    let table =
        read_table(input).with_context(|| format!("failed to read {}", input.display()))?;
    let rankings = rank_by_account(&table, metric, limit, order)
        .with_context(|| format!("failed to rank by '{metric}' in {}", input.display()))?;

    if rankings.is_empty() {
        println!("no reels with a value for '{metric}'; run `describe` first");
        return Ok(());
    }

    print!(
        "{}",
        render_rankings(&table, metric, limit, order, &rankings)?
    );
    Ok(())
}

fn render_rankings(
    table: &Table,
    metric: &str,
    limit: usize,
    order: Order,
    rankings: &[AccountRanking],
) -> Result<String, std::fmt::Error> {
    let mut out = String::new();
    let heading = match order {
        Order::Top => "Top",
        Order::Bottom => "Bottom",
    };
    // Raw columns have no label; only show one when the pipeline wrote it.
    let mark_column = metric
        .parse::<Metric>()
        .ok()
        .map(Metric::mark_column)
        .filter(|c| table.has_column(c));

    writeln!(out, "# {heading} {limit} reels by {metric}")?;
    for ranking in rankings {
        writeln!(out)?;
        writeln!(out, "## {}", ranking.account)?;
        writeln!(out)?;
        writeln!(out, "| # | Posted | {metric} | Label | URL |")?;
        writeln!(out, "|---|--------|--------|-------|-----|")?;
        for (i, &row) in ranking.rows.iter().enumerate() {
            let label = mark_column
                .as_deref()
                .and_then(|c| table.cell(row, c))
                .unwrap_or("\u{2014}");
            writeln!(
                out,
                "| {} | {} | {} | {} | {} |",
                i + 1,
                table.cell(row, columns::TIMESTAMP).unwrap_or_default(),
                numeric_cell(table, row, metric),
                label,
                table.cell(row, columns::URL).unwrap_or_default(),
            )?;
        }
    }

    Ok(out)
}

/// List reels whose label for `metric` is in `categories` (default: viral hits).
///
/// # Errors
///
/// Returns an error if the table cannot be read or has not been through
/// the pipeline.
pub(crate) fn run_videos(
    input: &Path,
    metric: Metric,
    categories: &[Category],
    account: Option<&str>,
) -> anyhow::Result<()> {
    let categories = if categories.is_empty() {
        &[Category::ViralHit][..]
    } else {
        categories
    };
    let filter = account.map_or_else(AccountFilter::all, |a| AccountFilter::accounts([a]));

    let table =
        read_table(input).with_context(|| format!("failed to read {}", input.display()))?;
    let rows = filter_by_category(&table, metric, categories, &filter)
        .with_context(|| format!("failed to filter {} by category", input.display()))?;

    let wanted: Vec<&str> = categories.iter().map(|c| c.label()).collect();
    if rows.is_empty() {
        println!(
            "no reels labelled {} on {metric}",
            wanted.join(" or ")
        );
        return Ok(());
    }

    print!("{}", render_videos(&table, metric, &wanted, &rows)?);
    Ok(())
}

fn render_videos(
    table: &Table,
    metric: Metric,
    wanted: &[&str],
    rows: &[usize],
) -> Result<String, std::fmt::Error> {
    let mut out = String::new();
    let z_column = metric.z_column();
    let mark_column = metric.mark_column();

    writeln!(out, "# Reels labelled {} on {metric}", wanted.join(" or "))?;
    writeln!(out)?;
    writeln!(out, "**Matches**: {}", rows.len())?;
    writeln!(out)?;
    writeln!(out, "| Account | Posted | {metric} | z | Label | URL |")?;
    writeln!(out, "|---------|--------|--------|---|-------|-----|")?;
    for &row in rows {
        writeln!(
            out,
            "| {} | {} | {} | {} | {} | {} |",
            table.cell(row, columns::ACCOUNT_NAME).unwrap_or_default(),
            table.cell(row, columns::TIMESTAMP).unwrap_or_default(),
            numeric_cell(table, row, metric.column()),
            numeric_cell(table, row, &z_column),
            table.cell(row, &mark_column).unwrap_or_default(),
            table.cell(row, columns::URL).unwrap_or_default(),
        )?;
    }

    Ok(out)
}

/// Cell rendered with three decimals, or a dash when missing.
fn numeric_cell(table: &Table, row: usize, column: &str) -> String {
    table
        .cell(row, column)
        .and_then(|c| c.trim().parse::<f64>().ok())
        .map_or_else(|| "\u{2014}".to_string(), fmt_value)
}
