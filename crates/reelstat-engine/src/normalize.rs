//! Per-account z-scores.
//!
//! Rows are partitioned by account, each account is reduced independently
//! (in parallel), and the scores are scattered back by original row index so
//! the output lines up with the input.

use std::collections::HashMap;

use rayon::prelude::*;

/// Sample mean and standard deviation (ddof = 1) of one account's values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroupStats {
    pub count: usize,
    pub mean: f64,
    pub std: f64,
}

impl GroupStats {
    /// Reduce a group's non-missing values.
    ///
    /// Returns `None` when the group cannot produce a z-score: fewer than two
    /// values, or every value identical (zero spread).
    #[must_use]
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let count = values.len();
        if count < 2 {
            return None;
        }
        let first = values[0];
        if values.iter().all(|&v| v == first) {
            return None;
        }

        #[allow(clippy::cast_precision_loss)]
        let n = count as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
        let std = variance.sqrt();

        if !std.is_finite() || std <= 0.0 {
            return None;
        }

        Some(Self { count, mean, std })
    }

    #[must_use]
    pub fn zscore(&self, value: f64) -> f64 {
        (value - self.mean) / self.std
    }
}

/// Compute one z-score per row, scoped to the row's account.
///
/// `keys[i]` is the account of row `i` and `values[i]` its metric value.
/// A row's score is `None` when its value is missing, its account key is
/// empty, or its account has fewer than two values or zero spread. Missing
/// values are excluded from the account's mean and std.
///
/// # Panics
///
/// Panics if `keys` and `values` differ in length.
#[must_use]
pub fn zscores_by_group<K>(keys: &[K], values: &[Option<f64>]) -> Vec<Option<f64>>
where
    K: AsRef<str> + Sync,
{
    assert_eq!(
        keys.len(),
        values.len(),
        "every row needs both an account key and a value"
    );

    let groups = partition(keys);

    let scored: Vec<Vec<(usize, Option<f64>)>> = groups
        .par_iter()
        .map(|rows| score_group(rows, values))
        .collect();

    let mut out = vec![None; values.len()];
    for (row, z) in scored.into_iter().flatten() {
        out[row] = z;
    }
    out
}

/// Row indices per non-empty account key. Indices within a group stay ascending.
fn partition<K: AsRef<str>>(keys: &[K]) -> Vec<Vec<usize>> {
    let mut by_key: HashMap<&str, Vec<usize>> = HashMap::new();
    for (row, key) in keys.iter().enumerate() {
        let key = key.as_ref();
        if key.is_empty() {
            continue;
        }
        by_key.entry(key).or_default().push(row);
    }
    by_key.into_values().collect()
}

fn score_group(rows: &[usize], values: &[Option<f64>]) -> Vec<(usize, Option<f64>)> {
    let present: Vec<f64> = rows.iter().filter_map(|&r| values[r]).collect();
    let Some(stats) = GroupStats::from_values(&present) else {
        return rows.iter().map(|&r| (r, None)).collect();
    };
    rows.iter()
        .map(|&r| (r, values[r].map(|v| stats.zscore(v))))
        .collect()
}
