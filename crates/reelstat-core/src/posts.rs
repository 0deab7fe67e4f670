//! Domain types shared between the engine and the CLI.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Column names in the acquisition actor's export.
pub mod columns {
    pub const OWNER_USERNAME: &str = "ownerUsername";
    pub const ACCOUNT_NAME: &str = "accountName";
    pub const TIMESTAMP: &str = "timestamp";
    pub const VIDEO_PLAY_COUNT: &str = "videoPlayCount";
    pub const LIKES_COUNT: &str = "likesCount";
    pub const COMMENTS_COUNT: &str = "commentsCount";
    pub const VIDEO_DURATION: &str = "videoDuration";
    pub const CAPTION: &str = "caption";
    pub const URL: &str = "url";
    pub const VIDEO_URL: &str = "videoUrl";

    /// Columns the pipeline refuses to run without, in report order.
    pub const REQUIRED: [&str; 9] = [
        OWNER_USERNAME,
        TIMESTAMP,
        VIDEO_PLAY_COUNT,
        LIKES_COUNT,
        COMMENTS_COUNT,
        VIDEO_DURATION,
        CAPTION,
        URL,
        VIDEO_URL,
    ];

    /// Raw counters that are coerced to numbers and clamped at zero.
    pub const NUMERIC: [&str; 4] = [VIDEO_PLAY_COUNT, LIKES_COUNT, COMMENTS_COUNT, VIDEO_DURATION];

    pub const ENGAGEMENT_RATE: &str = "engagementRate";
    pub const COMMENT_RATE: &str = "commentRate";
    pub const LIKE_RATE: &str = "likeRate";
    pub const LIKE_COMMENT_RATE: &str = "likeCommentRate";
    pub const VIRALITY_INDEX: &str = "viralityIndex";
    pub const PERFORMANCE_SCORE: &str = "performanceScore";

    /// Derived metric columns in output order.
    pub const DERIVED: [&str; 6] = [
        ENGAGEMENT_RATE,
        COMMENT_RATE,
        LIKE_RATE,
        LIKE_COMMENT_RATE,
        VIRALITY_INDEX,
        PERFORMANCE_SCORE,
    ];
}

/// One scraped reel after numeric coercion.
///
/// Numeric fields are `None` when the source cell was empty or unparsable.
#[derive(Debug, Clone, PartialEq)]
pub struct RawPost {
    pub account_name: String,
    pub timestamp: Option<NaiveDateTime>,
    pub video_play_count: Option<f64>,
    pub likes_count: Option<f64>,
    pub comments_count: Option<f64>,
    pub video_duration: Option<f64>,
    pub caption: String,
    pub url: String,
    pub video_url: String,
}

/// A metric that gets a per-account z-score and category label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    CommentsCount,
    LikesCount,
    VideoPlayCount,
    VideoDuration,
    EngagementRate,
    CommentRate,
    LikeRate,
    PerformanceScore,
}

impl Metric {
    /// All normalized metrics, in output column order.
    pub const ALL: [Metric; 8] = [
        Metric::CommentsCount,
        Metric::LikesCount,
        Metric::VideoPlayCount,
        Metric::VideoDuration,
        Metric::EngagementRate,
        Metric::CommentRate,
        Metric::LikeRate,
        Metric::PerformanceScore,
    ];

    /// Name of the source column holding this metric's value.
    #[must_use]
    pub fn column(self) -> &'static str {
        match self {
            Metric::CommentsCount => columns::COMMENTS_COUNT,
            Metric::LikesCount => columns::LIKES_COUNT,
            Metric::VideoPlayCount => columns::VIDEO_PLAY_COUNT,
            Metric::VideoDuration => columns::VIDEO_DURATION,
            Metric::EngagementRate => columns::ENGAGEMENT_RATE,
            Metric::CommentRate => columns::COMMENT_RATE,
            Metric::LikeRate => columns::LIKE_RATE,
            Metric::PerformanceScore => columns::PERFORMANCE_SCORE,
        }
    }

    /// Column holding the per-account z-score, e.g. `zLikesCount`.
    #[must_use]
    pub fn z_column(self) -> String {
        format!("z{}", capitalize(self.column()))
    }

    /// Column holding the category label, e.g. `markLikesCount`.
    #[must_use]
    pub fn mark_column(self) -> String {
        format!("mark{}", capitalize(self.column()))
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.column())
    }
}

impl std::str::FromStr for Metric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Metric::ALL
            .into_iter()
            .find(|m| m.column().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                let known: Vec<&str> = Metric::ALL.iter().map(|m| m.column()).collect();
                format!("unknown metric '{s}'; expected one of: {}", known.join(", "))
            })
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

/// Parse a scrape timestamp.
///
/// Accepts RFC 3339 (converted to UTC), naive date-times with `T` or space
/// separators and optional fractional seconds, and bare dates.
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    for fmt in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}
