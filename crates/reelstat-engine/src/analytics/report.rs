//! Table-level queries: per-account selection, totals, rankings and
//! category filters.

use std::collections::BTreeMap;

use reelstat_core::posts::columns;
use reelstat_core::Metric;

use super::ratio;
use super::summary::{MetricSummary, Thresholds};
use crate::categorize::Category;
use crate::error::EngineError;
use crate::table::{parse_number, Table};

/// Which accounts an analytics query looks at.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountFilter {
    accounts: Vec<String>,
}

impl AccountFilter {
    /// Every row, regardless of account.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Only rows whose account is one of `names`. Blank names are dropped;
    /// if nothing is left the filter matches every row.
    #[must_use]
    pub fn accounts<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            accounts: names
                .into_iter()
                .map(|n| n.as_ref().trim().to_string())
                .filter(|n| !n.is_empty())
                .collect(),
        }
    }

    #[must_use]
    pub fn is_all(&self) -> bool {
        self.accounts.is_empty()
    }

    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.accounts
    }

    #[must_use]
    pub fn matches(&self, account: &str) -> bool {
        self.is_all() || self.accounts.iter().any(|a| a == account)
    }
}

/// Ratio-of-sums totals over a selection of reels.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AccountTotals {
    pub views: f64,
    pub likes: f64,
    pub comments: f64,
    pub like_rate: f64,
    pub comment_rate: f64,
    pub like_comment_rate: f64,
}

impl AccountTotals {
    /// Sum the raw counters over `rows`. Missing cells and absent columns
    /// contribute nothing; rates against a zero total are 0.
    #[must_use]
    pub fn from_rows(table: &Table, rows: &[usize]) -> Self {
        let views = column_sum(table, columns::VIDEO_PLAY_COUNT, rows);
        let likes = column_sum(table, columns::LIKES_COUNT, rows);
        let comments = column_sum(table, columns::COMMENTS_COUNT, rows);
        Self {
            views,
            likes,
            comments,
            like_rate: ratio(likes, views),
            comment_rate: ratio(comments, views),
            like_comment_rate: ratio(comments, likes),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MetricReport {
    pub column: String,
    /// Accounts the report was restricted to; empty means all.
    pub accounts: Vec<String>,
    /// Selected rows, including those with a missing value.
    pub rows: usize,
    /// `None` when no selected row has a value.
    pub summary: Option<MetricSummary>,
    pub totals: AccountTotals,
    /// Column sum over total views of the same selection.
    pub ratio_to_total_views: f64,
}

/// Summarize `column` over the rows selected by `filter`.
///
/// # Errors
///
/// Returns [`EngineError::UnknownColumn`] if `column` is not in the table,
/// or if `filter` names accounts and the table has no account column.
pub fn analyze_metric(
    table: &Table,
    column: &str,
    filter: &AccountFilter,
    thresholds: &Thresholds,
) -> Result<MetricReport, EngineError> {
    let cells = table.column(column)?;
    let rows = select_rows(table, filter)?;

    let values: Vec<f64> = rows.iter().filter_map(|&r| parse_number(cells[r])).collect();
    let summary = MetricSummary::from_values(&values, thresholds);
    let totals = AccountTotals::from_rows(table, &rows);
    let metric_sum = summary.as_ref().map_or(0.0, |s| s.sum);

    tracing::debug!(
        column,
        rows = rows.len(),
        values = values.len(),
        "metric analyzed"
    );

    Ok(MetricReport {
        column: column.to_string(),
        accounts: filter.names().to_vec(),
        rows: rows.len(),
        summary,
        totals,
        ratio_to_total_views: ratio(metric_sum, totals.views),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    /// Highest values first.
    Top,
    /// Lowest values first.
    Bottom,
}

/// One account's best (or worst) rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountRanking {
    pub account: String,
    /// Row indices into the source table, in ranked order.
    pub rows: Vec<usize>,
}

/// Per account, the `limit` rows with the highest (`Order::Top`) or lowest
/// (`Order::Bottom`) value of `column`.
///
/// Accounts come back sorted by name. Rows with a missing value or an empty
/// account are skipped. Ties keep table order.
///
/// # Errors
///
/// Returns [`EngineError::UnknownColumn`] if `column` or the account column
/// is missing.
pub fn rank_by_account(
    table: &Table,
    column: &str,
    limit: usize,
    order: Order,
) -> Result<Vec<AccountRanking>, EngineError> {
    let cells = table.column(column)?;
    let accounts = account_cells(table)?;

    let mut by_account: BTreeMap<&str, Vec<(usize, f64)>> = BTreeMap::new();
    for (row, (&account, &cell)) in accounts.iter().zip(&cells).enumerate() {
        if account.is_empty() {
            continue;
        }
        if let Some(value) = parse_number(cell) {
            by_account.entry(account).or_default().push((row, value));
        }
    }

    Ok(by_account
        .into_iter()
        .map(|(account, mut scored)| {
            scored.sort_by(|a, b| match order {
                Order::Top => b.1.total_cmp(&a.1),
                Order::Bottom => a.1.total_cmp(&b.1),
            });
            AccountRanking {
                account: account.to_string(),
                rows: scored.into_iter().take(limit).map(|(row, _)| row).collect(),
            }
        })
        .collect())
}

/// Rows whose label for `metric` is one of `categories`, restricted to
/// `filter`. An empty category list keeps every selected row.
///
/// # Errors
///
/// Returns [`EngineError::UnknownColumn`] if the table has no label column
/// for `metric` (it has not been through the pipeline), or if `filter`
/// names accounts and there is no account column.
pub fn filter_by_category(
    table: &Table,
    metric: Metric,
    categories: &[Category],
    filter: &AccountFilter,
) -> Result<Vec<usize>, EngineError> {
    let marks = table.column(&metric.mark_column())?;
    let rows = select_rows(table, filter)?;

    if categories.is_empty() {
        return Ok(rows);
    }

    Ok(rows
        .into_iter()
        .filter(|&r| {
            marks[r]
                .parse::<Category>()
                .is_ok_and(|c| categories.contains(&c))
        })
        .collect())
}

/// Column that identifies a row's account: `accountName` when the table has
/// been enriched, otherwise the raw `ownerUsername`.
fn account_column(table: &Table) -> Option<&'static str> {
    [columns::ACCOUNT_NAME, columns::OWNER_USERNAME]
        .into_iter()
        .find(|c| table.has_column(c))
}

fn account_cells(table: &Table) -> Result<Vec<&str>, EngineError> {
    let column = account_column(table)
        .ok_or_else(|| EngineError::UnknownColumn(columns::ACCOUNT_NAME.to_string()))?;
    Ok(table.column(column)?.into_iter().map(str::trim).collect())
}

fn select_rows(table: &Table, filter: &AccountFilter) -> Result<Vec<usize>, EngineError> {
    if filter.is_all() {
        return Ok((0..table.len()).collect());
    }
    let accounts = account_cells(table)?;
    Ok(accounts
        .iter()
        .enumerate()
        .filter(|(_, a)| filter.matches(a))
        .map(|(row, _)| row)
        .collect())
}

fn column_sum(table: &Table, column: &str, rows: &[usize]) -> f64 {
    let Ok(cells) = table.column(column) else {
        return 0.0;
    };
    rows.iter().filter_map(|&r| parse_number(cells[r])).sum()
}
