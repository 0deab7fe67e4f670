//! Descriptive statistics for one numeric column.

use reelstat_core::AppConfig;

use super::ratio;

/// Percentiles reported in the summary table, highest first.
pub const REPORTED_PERCENTILES: [u8; 7] = [99, 90, 75, 50, 25, 10, 5];

/// Bucket edges as `(upper, lower)` percentiles, highest first.
const BUCKET_EDGES: [(u8, u8); 8] = [
    (100, 99),
    (99, 90),
    (90, 75),
    (75, 50),
    (50, 25),
    (25, 10),
    (10, 5),
    (5, 0),
];

const FENCE_MULTIPLIER: f64 = 1.5;

/// Standard-deviation multipliers for the hot / very-successful / cold cutoffs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub hot: f64,
    pub very_successful: f64,
}

impl Thresholds {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            hot: config.stdev_hot_threshold,
            very_successful: config.stdev_very_successful_threshold,
        }
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

/// Values falling between two percentile cutoffs.
///
/// Both ends are inclusive, so a value sitting exactly on a shared cutoff is
/// counted in both neighbouring buckets.
#[derive(Debug, Clone, PartialEq)]
pub struct PercentileBucket {
    pub upper_percentile: u8,
    pub lower_percentile: u8,
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
    pub sum: f64,
    /// Fraction of the column total, in `[0, 1]` for non-negative data.
    pub sum_share: f64,
    pub count_share: f64,
}

impl PercentileBucket {
    /// Label such as `"100-99"`.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{}-{}", self.upper_percentile, self.lower_percentile)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MetricSummary {
    pub count: usize,
    pub sum: f64,
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
    /// Sample standard deviation; `None` below two values.
    pub std: Option<f64>,
    pub coefficient_of_variation: Option<f64>,
    /// Adjusted Fisher-Pearson skewness; `None` below three values.
    pub skewness: Option<f64>,
    /// Unbiased excess kurtosis; `None` below four values.
    pub kurtosis: Option<f64>,
    /// `(percentile, value)` pairs for [`REPORTED_PERCENTILES`].
    pub percentiles: Vec<(u8, f64)>,
    pub q1: f64,
    pub q3: f64,
    pub iqr: f64,
    pub lower_fence: f64,
    pub upper_fence: f64,
    pub hot_threshold: Option<f64>,
    pub very_successful_threshold: Option<f64>,
    pub cold_threshold: Option<f64>,
    pub buckets: Vec<PercentileBucket>,
}

impl MetricSummary {
    /// Summarize the non-missing values of one column.
    ///
    /// Returns `None` for an empty slice. Non-finite values are ignored.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn from_values(values: &[f64], thresholds: &Thresholds) -> Option<Self> {
        let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        if sorted.is_empty() {
            return None;
        }
        sorted.sort_by(f64::total_cmp);

        let count = sorted.len();
        let n = count as f64;
        let sum: f64 = sorted.iter().sum();
        let mean = sum / n;
        let min = sorted[0];
        let max = sorted[count - 1];

        let std = sample_std(&sorted, mean);
        let coefficient_of_variation = std.map(|s| ratio(s, mean));

        let q1 = percentile(&sorted, 25.0);
        let q3 = percentile(&sorted, 75.0);
        let iqr = q3 - q1;

        let percentiles = REPORTED_PERCENTILES
            .iter()
            .map(|&p| (p, percentile(&sorted, f64::from(p))))
            .collect();

        Some(Self {
            count,
            sum,
            mean,
            median: percentile(&sorted, 50.0),
            min,
            max,
            std,
            coefficient_of_variation,
            skewness: skewness(&sorted, mean),
            kurtosis: excess_kurtosis(&sorted, mean),
            percentiles,
            q1,
            q3,
            iqr,
            lower_fence: q1 - FENCE_MULTIPLIER * iqr,
            upper_fence: q3 + FENCE_MULTIPLIER * iqr,
            hot_threshold: std.map(|s| mean + thresholds.hot * s),
            very_successful_threshold: std.map(|s| mean + thresholds.very_successful * s),
            cold_threshold: std.map(|s| mean - thresholds.hot * s),
            buckets: buckets(&sorted, sum),
        })
    }

    /// Values above the upper fence or below the lower one.
    #[must_use]
    pub fn is_outlier(&self, value: f64) -> bool {
        value < self.lower_fence || value > self.upper_fence
    }
}

/// Percentile of an ascending slice using linear interpolation between
/// closest ranks. `p` is in `[0, 100]`. Returns 0 for an empty slice.
#[must_use]
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn percentile(sorted: &[f64], p: f64) -> f64 {
    match sorted.len() {
        0 => return 0.0,
        1 => return sorted[0],
        _ => {}
    }

    let rank = (p.clamp(0.0, 100.0) / 100.0) * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let frac = rank - lower as f64;

    if upper >= sorted.len() {
        sorted[sorted.len() - 1]
    } else {
        sorted[lower] * (1.0 - frac) + sorted[upper] * frac
    }
}

#[allow(clippy::cast_precision_loss)]
fn sample_std(values: &[f64], mean: f64) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let n = values.len() as f64;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    Some(variance.sqrt())
}

#[allow(clippy::cast_precision_loss)]
fn skewness(values: &[f64], mean: f64) -> Option<f64> {
    if values.len() < 3 {
        return None;
    }
    let n = values.len() as f64;
    let m2 = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    if m2 == 0.0 {
        return Some(0.0);
    }
    let m3 = values.iter().map(|v| (v - mean).powi(3)).sum::<f64>() / n;
    let g1 = m3 / m2.powf(1.5);
    Some((n * (n - 1.0)).sqrt() / (n - 2.0) * g1)
}

#[allow(clippy::cast_precision_loss)]
fn excess_kurtosis(values: &[f64], mean: f64) -> Option<f64> {
    if values.len() < 4 {
        return None;
    }
    let n = values.len() as f64;
    let m2 = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>();
    if m2 == 0.0 {
        return Some(0.0);
    }
    let m4 = values.iter().map(|v| (v - mean).powi(4)).sum::<f64>();
    let numerator = n * (n + 1.0) * (n - 1.0) * m4;
    let denominator = (n - 2.0) * (n - 3.0) * m2 * m2;
    let adjustment = 3.0 * (n - 1.0).powi(2) / ((n - 2.0) * (n - 3.0));
    Some(numerator / denominator - adjustment)
}

#[allow(clippy::cast_precision_loss)]
fn buckets(sorted: &[f64], total_sum: f64) -> Vec<PercentileBucket> {
    let total_count = sorted.len() as f64;
    let cutoff = |p: u8| match p {
        100 => sorted[sorted.len() - 1],
        0 => sorted[0],
        p => percentile(sorted, f64::from(p)),
    };

    BUCKET_EDGES
        .iter()
        .map(|&(upper_percentile, lower_percentile)| {
            let upper = cutoff(upper_percentile);
            let lower = cutoff(lower_percentile);
            let (count, sum) = sorted
                .iter()
                .filter(|&&v| v >= lower && v <= upper)
                .fold((0_usize, 0.0), |(c, s), &v| (c + 1, s + v));
            PercentileBucket {
                upper_percentile,
                lower_percentile,
                lower,
                upper,
                count,
                sum,
                sum_share: ratio(sum, total_sum),
                count_share: ratio(count as f64, total_count),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn one_to_ten() -> Vec<f64> {
        (1..=10).map(f64::from).collect()
    }

    #[test]
    fn empty_column_has_no_summary() {
        assert!(MetricSummary::from_values(&[], &Thresholds::default()).is_none());
    }

    #[test]
    fn percentile_interpolates_linearly() {
        let sorted = one_to_ten();
        assert!(approx(percentile(&sorted, 25.0), 3.25));
        assert!(approx(percentile(&sorted, 50.0), 5.5));
        assert!(approx(percentile(&sorted, 99.0), 9.91));
        assert!(approx(percentile(&sorted, 0.0), 1.0));
        assert!(approx(percentile(&sorted, 100.0), 10.0));
        assert!(approx(percentile(&[7.0], 90.0), 7.0));
        assert!(approx(percentile(&[], 90.0), 0.0));
    }

    #[test]
    fn summary_of_one_to_ten() {
        let s = MetricSummary::from_values(&one_to_ten(), &Thresholds::default()).unwrap();
        assert_eq!(s.count, 10);
        assert!(approx(s.sum, 55.0));
        assert!(approx(s.mean, 5.5));
        assert!(approx(s.median, 5.5));
        assert!(approx(s.min, 1.0));
        assert!(approx(s.max, 10.0));
        let std = (82.5_f64 / 9.0).sqrt();
        assert!(approx(s.std.unwrap(), std));
        assert!(approx(s.coefficient_of_variation.unwrap(), std / 5.5));
        assert!(approx(s.skewness.unwrap(), 0.0));
        assert!(approx(s.kurtosis.unwrap(), -1.2));
        assert!(approx(s.q1, 3.25));
        assert!(approx(s.q3, 7.75));
        assert!(approx(s.iqr, 4.5));
        assert!(approx(s.lower_fence, -3.5));
        assert!(approx(s.upper_fence, 14.5));
    }

    #[test]
    fn thresholds_scale_with_std() {
        let thresholds = Thresholds {
            hot: 2.0,
            very_successful: 0.75,
        };
        let s = MetricSummary::from_values(&one_to_ten(), &thresholds).unwrap();
        let std = s.std.unwrap();
        assert!(approx(s.hot_threshold.unwrap(), 5.5 + 2.0 * std));
        assert!(approx(s.very_successful_threshold.unwrap(), 5.5 + 0.75 * std));
        assert!(approx(s.cold_threshold.unwrap(), 5.5 - 2.0 * std));
    }

    #[test]
    fn skewness_matches_adjusted_fisher_pearson() {
        let s = MetricSummary::from_values(&[1.0, 2.0, 10.0], &Thresholds::default()).unwrap();
        assert!((s.skewness.unwrap() - 1.652_316_740_3).abs() < 1e-8);
        assert!(s.kurtosis.is_none());
    }

    #[test]
    fn single_value_has_no_spread_statistics() {
        let s = MetricSummary::from_values(&[42.0], &Thresholds::default()).unwrap();
        assert!(s.std.is_none());
        assert!(s.coefficient_of_variation.is_none());
        assert!(s.skewness.is_none());
        assert!(s.hot_threshold.is_none());
        assert!(approx(s.median, 42.0));
        assert!(s.buckets.iter().all(|b| b.count == 1));
    }

    #[test]
    fn constant_column_has_zero_moments() {
        let s = MetricSummary::from_values(&[3.0; 5], &Thresholds::default()).unwrap();
        assert!(approx(s.std.unwrap(), 0.0));
        assert!(approx(s.skewness.unwrap(), 0.0));
        assert!(approx(s.kurtosis.unwrap(), 0.0));
    }

    #[test]
    fn zero_mean_coefficient_of_variation_is_zero() {
        let s = MetricSummary::from_values(&[-1.0, 1.0], &Thresholds::default()).unwrap();
        assert!(approx(s.coefficient_of_variation.unwrap(), 0.0));
    }

    #[test]
    fn buckets_partition_one_to_ten_exactly() {
        let s = MetricSummary::from_values(&one_to_ten(), &Thresholds::default()).unwrap();
        let labels: Vec<String> = s.buckets.iter().map(PercentileBucket::label).collect();
        assert_eq!(
            labels,
            ["100-99", "99-90", "90-75", "75-50", "50-25", "25-10", "10-5", "5-0"]
        );
        let sums: Vec<f64> = s.buckets.iter().map(|b| b.sum).collect();
        assert_eq!(sums, vec![10.0, 0.0, 17.0, 13.0, 9.0, 5.0, 0.0, 1.0]);
        assert_eq!(s.buckets.iter().map(|b| b.count).sum::<usize>(), 10);
        assert!(approx(s.buckets.iter().map(|b| b.sum_share).sum::<f64>(), 1.0));
    }

    #[test]
    fn boundary_values_count_in_both_buckets() {
        let values = [5.0, 5.0, 5.0, 5.0, 100.0];
        let s = MetricSummary::from_values(&values, &Thresholds::default()).unwrap();
        let covered: f64 = s.buckets.iter().map(|b| b.sum).sum();
        assert!(covered >= s.sum);
    }

    #[test]
    fn all_zero_column_has_zero_shares() {
        let s = MetricSummary::from_values(&[0.0, 0.0, 0.0], &Thresholds::default()).unwrap();
        assert!(s.buckets.iter().all(|b| b.sum_share == 0.0));
        assert!(s.buckets.iter().all(|b| approx(b.count_share, 1.0)));
    }

    #[test]
    fn fences_flag_outliers() {
        let s = MetricSummary::from_values(&one_to_ten(), &Thresholds::default()).unwrap();
        assert!(s.is_outlier(20.0));
        assert!(s.is_outlier(-4.0));
        assert!(!s.is_outlier(10.0));
    }

    #[test]
    fn non_finite_values_are_ignored() {
        let s = MetricSummary::from_values(&[1.0, f64::NAN, 3.0], &Thresholds::default()).unwrap();
        assert_eq!(s.count, 2);
        assert!(approx(s.mean, 2.0));
    }
}
