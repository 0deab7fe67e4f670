//! Raw table → enriched table.
//!
//! 1. Validate that every required column is present.
//! 2. Coerce counters to numbers (unparsable → missing, negative → 0).
//! 3. Derive the engagement ratios per reel.
//! 4. For each target metric, z-score within the account and label it.
//! 5. Write the enriched table atomically.
//!
//! Enriched columns overwrite same-named input columns, so feeding an
//! enriched table back in reproduces it exactly.

use std::collections::HashSet;
use std::path::Path;

use reelstat_core::posts::{columns, parse_timestamp};
use reelstat_core::{Metric, RawPost};

use crate::categorize::Category;
use crate::derive::{derive, DerivedMetrics};
use crate::error::EngineError;
use crate::normalize::zscores_by_group;
use crate::table::{parse_number, read_table, write_table, Table};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Counters reported after a pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineSummary {
    pub rows: usize,
    pub accounts: usize,
    /// Negative counter values replaced by 0.
    pub clamped_values: usize,
    /// Non-empty counter cells that did not parse as a number.
    pub unparsable_values: usize,
    /// Non-empty timestamps that did not parse and were kept verbatim.
    pub unparsable_timestamps: usize,
}

/// Read `input`, enrich it, and write the result to `output`.
///
/// Nothing is written unless enrichment succeeds, and the write itself is
/// atomic. `input` and `output` may be the same file.
///
/// # Errors
///
/// Returns [`EngineError`] if the input cannot be read, lacks a required
/// column, or the output cannot be written.
pub fn run_pipeline(input: &Path, output: &Path) -> Result<PipelineSummary, EngineError> {
    let source = input.display().to_string();
    let table = read_table(input)?;
    let (enriched, summary) = enrich(table, &source)?;
    write_table(output, &enriched)?;

    tracing::info!(
        input = %source,
        output = %output.display(),
        rows = summary.rows,
        accounts = summary.accounts,
        "enriched table written"
    );

    Ok(summary)
}

/// Enrich an in-memory table.
///
/// # Errors
///
/// Returns [`EngineError::MissingColumn`] if a required column is absent.
pub fn enrich_table(table: Table) -> Result<(Table, PipelineSummary), EngineError> {
    enrich(table, "<memory>")
}

fn enrich(mut table: Table, source: &str) -> Result<(Table, PipelineSummary), EngineError> {
    validate_columns(&table, source)?;

    let mut summary = PipelineSummary {
        rows: table.len(),
        ..PipelineSummary::default()
    };

    let [plays, likes, comments, durations] =
        columns::NUMERIC.map(|name| coerce_numeric_column(&table, name, &mut summary));

    let posts = build_posts(&table, &plays, &likes, &comments, &durations, &mut summary)?;
    let derived: Vec<DerivedMetrics> = posts.iter().map(derive).collect();

    let accounts: Vec<&str> = posts.iter().map(|p| p.account_name.as_str()).collect();
    summary.accounts = accounts
        .iter()
        .filter(|a| !a.is_empty())
        .collect::<HashSet<_>>()
        .len();

    let timestamps: Vec<String> = posts
        .iter()
        .zip(table.column(columns::TIMESTAMP)?)
        .map(|(post, raw)| match post.timestamp {
            Some(ts) => ts.format(TIMESTAMP_FORMAT).to_string(),
            None => raw.to_string(),
        })
        .collect();
    let account_cells: Vec<String> = accounts.iter().map(|a| (*a).to_string()).collect();

    // Scores are computed from the typed values before any column is touched.
    let scored: Vec<(Metric, Vec<Option<f64>>)> = Metric::ALL
        .into_iter()
        .map(|metric| {
            let values: Vec<Option<f64>> = posts
                .iter()
                .zip(&derived)
                .map(|(post, d)| metric_value(metric, post, d))
                .collect();
            (metric, zscores_by_group(&accounts, &values))
        })
        .collect();

    table.set_column(columns::ACCOUNT_NAME, account_cells);
    table.set_column(columns::TIMESTAMP, timestamps);
    for (name, values) in columns::NUMERIC
        .into_iter()
        .zip([&plays, &likes, &comments, &durations])
    {
        table.set_column(name, values.iter().map(|v| format_number(*v)).collect());
    }

    for (i, name) in columns::DERIVED.into_iter().enumerate() {
        table.set_column(
            name,
            derived.iter().map(|d| format_number(d.values()[i])).collect(),
        );
    }

    for (metric, zscores) in scored {
        let marks = zscores
            .iter()
            .map(|z| Category::from_zscore(*z).label().to_string())
            .collect();
        table.set_column(
            &metric.z_column(),
            zscores.iter().map(|z| format_number(*z)).collect(),
        );
        table.set_column(&metric.mark_column(), marks);
    }

    if summary.unparsable_timestamps > 0 {
        tracing::warn!(
            count = summary.unparsable_timestamps,
            "timestamps that failed to parse were kept verbatim"
        );
    }

    Ok((table, summary))
}

fn validate_columns(table: &Table, source: &str) -> Result<(), EngineError> {
    match columns::REQUIRED.iter().find(|c| !table.has_column(c)) {
        Some(missing) => Err(EngineError::MissingColumn {
            column: (*missing).to_string(),
            path: source.to_string(),
        }),
        None => Ok(()),
    }
}

fn coerce_numeric_column(
    table: &Table,
    name: &str,
    summary: &mut PipelineSummary,
) -> Vec<Option<f64>> {
    let mut clamped = 0usize;
    let mut unparsable = 0usize;
    let idx = table.column_index(name);

    let values = table
        .rows()
        .iter()
        .map(|row| {
            let cell = idx.map_or("", |i| row[i].as_str());
            let value = parse_number(cell);
            if value.is_none() && !cell.trim().is_empty() {
                unparsable += 1;
            }
            value.map(|v| {
                if v < 0.0 {
                    clamped += 1;
                    0.0
                } else {
                    // -0.0 + 0.0 == +0.0
                    v + 0.0
                }
            })
        })
        .collect();

    if clamped > 0 {
        tracing::warn!(column = name, count = clamped, "negative values clamped to 0");
    }
    if unparsable > 0 {
        tracing::warn!(column = name, count = unparsable, "non-numeric values treated as missing");
    }

    summary.clamped_values += clamped;
    summary.unparsable_values += unparsable;
    values
}

fn build_posts(
    table: &Table,
    plays: &[Option<f64>],
    likes: &[Option<f64>],
    comments: &[Option<f64>],
    durations: &[Option<f64>],
    summary: &mut PipelineSummary,
) -> Result<Vec<RawPost>, EngineError> {
    let owners = table.column(columns::OWNER_USERNAME)?;
    let timestamps = table.column(columns::TIMESTAMP)?;
    let captions = table.column(columns::CAPTION)?;
    let urls = table.column(columns::URL)?;
    let video_urls = table.column(columns::VIDEO_URL)?;

    let posts = (0..table.len())
        .map(|i| {
            let timestamp = parse_timestamp(timestamps[i]);
            if timestamp.is_none() && !timestamps[i].trim().is_empty() {
                summary.unparsable_timestamps += 1;
            }
            RawPost {
                account_name: owners[i].trim().to_string(),
                timestamp,
                video_play_count: plays[i],
                likes_count: likes[i],
                comments_count: comments[i],
                video_duration: durations[i],
                caption: captions[i].to_string(),
                url: urls[i].to_string(),
                video_url: video_urls[i].to_string(),
            }
        })
        .collect();

    Ok(posts)
}

fn metric_value(metric: Metric, post: &RawPost, derived: &DerivedMetrics) -> Option<f64> {
    match metric {
        Metric::CommentsCount => post.comments_count,
        Metric::LikesCount => post.likes_count,
        Metric::VideoPlayCount => post.video_play_count,
        Metric::VideoDuration => post.video_duration,
        Metric::EngagementRate => derived.engagement_rate,
        Metric::CommentRate => derived.comment_rate,
        Metric::LikeRate => derived.like_rate,
        Metric::PerformanceScore => derived.performance_score,
    }
}

/// Shortest decimal that parses back to the same `f64`; empty when missing.
fn format_number(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}
