//! Distribution analytics over enriched (or raw) reel tables.
//!
//! [`summary`] reduces one numeric column to descriptive statistics and
//! percentile buckets. [`report`] selects rows from a [`crate::table::Table`]
//! (by account, by category) and feeds them into the summary.

pub mod report;
pub mod summary;

pub use report::{
    analyze_metric, filter_by_category, rank_by_account, AccountFilter, AccountRanking,
    AccountTotals, MetricReport, Order,
};
pub use summary::{percentile, MetricSummary, PercentileBucket, Thresholds};

/// `numerator / denominator`, or 0 when the denominator is zero.
pub(crate) fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}
