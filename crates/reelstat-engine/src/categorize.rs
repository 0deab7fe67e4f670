//! Z-score to outcome label.

/// Outcome label for one reel on one metric.
///
/// The five ranked labels are ordered `Weak < Average < Successful <
/// VerySuccessful < ViralHit`. `NoData` is the label for an undefined
/// z-score (single-reel account, zero spread, missing value) and sits
/// outside that order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    ViralHit,
    VerySuccessful,
    Successful,
    Average,
    Weak,
    NoData,
}

/// Lower bounds checked top to bottom; first match wins. `strict` means
/// the z-score must exceed the bound, otherwise it may equal it.
const THRESHOLDS: &[(f64, bool, Category)] = &[
    (2.0, true, Category::ViralHit),
    (1.0, true, Category::VerySuccessful),
    (0.2, true, Category::Successful),
    (-1.0, false, Category::Average),
];

impl Category {
    /// Ranked labels from best to worst.
    pub const RANKED: [Category; 5] = [
        Category::ViralHit,
        Category::VerySuccessful,
        Category::Successful,
        Category::Average,
        Category::Weak,
    ];

    /// Map a z-score to its label.
    ///
    /// Total over finite reals; `None` and NaN map to [`Category::NoData`].
    #[must_use]
    pub fn from_zscore(z: Option<f64>) -> Self {
        let Some(z) = z.filter(|z| !z.is_nan()) else {
            return Category::NoData;
        };
        THRESHOLDS
            .iter()
            .find(|&&(bound, strict, _)| if strict { z > bound } else { z >= bound })
            .map_or(Category::Weak, |&(_, _, category)| category)
    }

    /// Ordinal position, `Weak` = 0 up to `ViralHit` = 4. `None` for `NoData`.
    #[must_use]
    pub fn rank(self) -> Option<u8> {
        match self {
            Category::Weak => Some(0),
            Category::Average => Some(1),
            Category::Successful => Some(2),
            Category::VerySuccessful => Some(3),
            Category::ViralHit => Some(4),
            Category::NoData => None,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Category::ViralHit => "viral hit",
            Category::VerySuccessful => "very successful",
            Category::Successful => "successful",
            Category::Average => "average",
            Category::Weak => "weak",
            Category::NoData => "no data",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    /// Parses labels case-insensitively. Decorations in front of the words
    /// (older exports wrote `🔥viral hit`) are ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let cleaned = s
            .trim()
            .trim_start_matches(|c: char| !c.is_alphanumeric())
            .to_lowercase()
            .replace(['_', '-'], " ");
        Category::RANKED
            .into_iter()
            .chain([Category::NoData])
            .find(|c| c.label() == cleaned)
            .ok_or_else(|| format!("unknown category '{s}'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thresholds_are_strict_except_average() {
        assert_eq!(Category::from_zscore(Some(2.5)), Category::ViralHit);
        assert_eq!(Category::from_zscore(Some(2.0)), Category::VerySuccessful);
        assert_eq!(Category::from_zscore(Some(1.0)), Category::Successful);
        assert_eq!(Category::from_zscore(Some(0.2)), Category::Average);
        assert_eq!(Category::from_zscore(Some(0.0)), Category::Average);
        assert_eq!(Category::from_zscore(Some(-1.0)), Category::Average);
        assert_eq!(Category::from_zscore(Some(-1.000_001)), Category::Weak);
    }

    #[test]
    fn extremes_are_covered() {
        assert_eq!(Category::from_zscore(Some(f64::INFINITY)), Category::ViralHit);
        assert_eq!(Category::from_zscore(Some(f64::NEG_INFINITY)), Category::Weak);
        assert_eq!(Category::from_zscore(Some(f64::MAX)), Category::ViralHit);
    }

    #[test]
    fn undefined_maps_to_no_data() {
        assert_eq!(Category::from_zscore(None), Category::NoData);
        assert_eq!(Category::from_zscore(Some(f64::NAN)), Category::NoData);
        assert_eq!(Category::NoData.rank(), None);
    }

    #[test]
    fn categorizer_is_monotonic() {
        let mut previous: Option<u8> = None;
        let mut z = -4.0;
        while z <= 4.0 {
            let rank = Category::from_zscore(Some(z)).rank().unwrap();
            if let Some(prev) = previous {
                assert!(rank >= prev, "rank dropped at z = {z}");
            }
            previous = Some(rank);
            z += 0.01;
        }
    }

    #[test]
    fn ranked_labels_are_in_descending_order() {
        let ranks: Vec<u8> = Category::RANKED.iter().filter_map(|c| c.rank()).collect();
        assert_eq!(ranks, vec![4, 3, 2, 1, 0]);
    }

    #[test]
    fn labels_round_trip_through_from_str() {
        for category in Category::RANKED.into_iter().chain([Category::NoData]) {
            assert_eq!(category.label().parse::<Category>().unwrap(), category);
        }
    }

    #[test]
    fn from_str_accepts_decorated_and_cased_labels() {
        assert_eq!("🔥viral hit".parse::<Category>().unwrap(), Category::ViralHit);
        assert_eq!(
            "✅Very Successful".parse::<Category>().unwrap(),
            Category::VerySuccessful
        );
        assert_eq!("no_data".parse::<Category>().unwrap(), Category::NoData);
    }

    #[test]
    fn from_str_rejects_unknown() {
        assert!("legendary".parse::<Category>().is_err());
    }
}
