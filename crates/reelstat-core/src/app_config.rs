use std::path::PathBuf;

pub const DEFAULT_STDEV_HOT_THRESHOLD: f64 = 2.0;
pub const DEFAULT_STDEV_VERY_SUCCESSFUL_THRESHOLD: f64 = 0.75;
pub const DEFAULT_TOP_REELS_COUNT: usize = 15;
pub const DEFAULT_BAD_REELS_COUNT: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Immutable process configuration, built once at startup and passed by
/// reference into every pipeline and analytics call.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    /// Raw table produced by the acquisition actor.
    pub input_path: PathBuf,
    /// Enriched table written by `describe`.
    pub output_path: PathBuf,
    pub settings_path: PathBuf,
    /// Multiplier `k` for the "hot" line at `mean + k * std`.
    pub stdev_hot_threshold: f64,
    /// Multiplier `k` for the "very successful" line at `mean + k * std`.
    pub stdev_very_successful_threshold: f64,
    pub top_reels_count: usize,
    pub bad_reels_count: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            env: Environment::Development,
            log_level: "info".to_string(),
            input_path: PathBuf::from("./raw_data/reels.csv"),
            output_path: PathBuf::from("./raw_data/described_data.csv"),
            settings_path: PathBuf::from("./config/settings.yaml"),
            stdev_hot_threshold: DEFAULT_STDEV_HOT_THRESHOLD,
            stdev_very_successful_threshold: DEFAULT_STDEV_VERY_SUCCESSFUL_THRESHOLD,
            top_reels_count: DEFAULT_TOP_REELS_COUNT,
            bad_reels_count: DEFAULT_BAD_REELS_COUNT,
        }
    }
}
