//! Per-reel engagement ratios.
//!
//! Every ratio is total: zero denominators are replaced by 1, so a reel with
//! no views or no likes yields a finite value instead of a fault. A ratio is
//! missing only when one of the counters it reads is missing.

use reelstat_core::RawPost;

const WEIGHT_ENGAGEMENT_RATE: f64 = 0.4;
const WEIGHT_LIKE_RATE: f64 = 0.3;
const WEIGHT_COMMENT_RATE: f64 = 0.2;
const WEIGHT_INVERSE_VIRALITY: f64 = 0.1;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DerivedMetrics {
    pub engagement_rate: Option<f64>,
    pub comment_rate: Option<f64>,
    pub like_rate: Option<f64>,
    pub like_comment_rate: Option<f64>,
    pub virality_index: Option<f64>,
    pub performance_score: Option<f64>,
}

impl DerivedMetrics {
    /// Values in the same order as `reelstat_core::posts::columns::DERIVED`.
    #[must_use]
    pub fn values(&self) -> [Option<f64>; 6] {
        [
            self.engagement_rate,
            self.comment_rate,
            self.like_rate,
            self.like_comment_rate,
            self.virality_index,
            self.performance_score,
        ]
    }
}

/// Substitute 1 for a zero denominator.
fn guard(denominator: f64) -> f64 {
    if denominator == 0.0 {
        1.0
    } else {
        denominator
    }
}

/// Compute all derived metrics for one reel.
#[must_use]
pub fn derive(post: &RawPost) -> DerivedMetrics {
    let plays = post.video_play_count;
    let likes = post.likes_count;
    let comments = post.comments_count;

    let engagement_rate = zip3(likes, comments, plays, |l, c, p| (l + c) / guard(p));
    let comment_rate = comments.zip(plays).map(|(c, p)| c / guard(p));
    let like_rate = likes.zip(plays).map(|(l, p)| l / guard(p));
    let like_comment_rate = comments.zip(likes).map(|(c, l)| c / guard(l));
    let virality_index = zip3(plays, likes, comments, |p, l, c| p / (l + c + 1.0));

    let performance_score = match (engagement_rate, like_rate, comment_rate, virality_index) {
        (Some(er), Some(lr), Some(cr), Some(vi)) => Some(performance_score(er, lr, cr, vi)),
        _ => None,
    };

    DerivedMetrics {
        engagement_rate,
        comment_rate,
        like_rate,
        like_comment_rate,
        virality_index,
        performance_score,
    }
}

/// Weighted blend of the engagement ratios.
///
/// `viralityIndex` enters inverted as `1 / (vi + 1)`; with non-negative
/// counters `vi >= 0`, so the term stays in `(0, 1]`.
#[must_use]
pub fn performance_score(
    engagement_rate: f64,
    like_rate: f64,
    comment_rate: f64,
    virality_index: f64,
) -> f64 {
    engagement_rate * WEIGHT_ENGAGEMENT_RATE
        + like_rate * WEIGHT_LIKE_RATE
        + comment_rate * WEIGHT_COMMENT_RATE
        + (1.0 / (virality_index + 1.0)) * WEIGHT_INVERSE_VIRALITY
}

fn zip3(
    a: Option<f64>,
    b: Option<f64>,
    c: Option<f64>,
    f: impl FnOnce(f64, f64, f64) -> f64,
) -> Option<f64> {
    Some(f(a?, b?, c?))
}
