use std::path::PathBuf;

use crate::app_config::{
    AppConfig, Environment, DEFAULT_BAD_REELS_COUNT, DEFAULT_STDEV_HOT_THRESHOLD,
    DEFAULT_STDEV_VERY_SUCCESSFUL_THRESHOLD, DEFAULT_TOP_REELS_COUNT,
};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Every variable has a default; only malformed values are errors.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_multiplier = |var: &str, default: f64| -> Result<f64, ConfigError> {
        let Ok(raw) = lookup(var) else {
            return Ok(default);
        };
        let value = raw
            .trim()
            .parse::<f64>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })?;
        if !value.is_finite() || value < 0.0 {
            return Err(ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: format!("must be a finite non-negative number, got {value}"),
            });
        }
        Ok(value)
    };

    let parse_usize = |var: &str, default: usize| -> Result<usize, ConfigError> {
        let Ok(raw) = lookup(var) else {
            return Ok(default);
        };
        raw.trim()
            .parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let env = parse_environment(&or_default("REELSTAT_ENV", "development"))?;
    let log_level = or_default("REELSTAT_LOG_LEVEL", "info");

    let input_path = PathBuf::from(or_default("REELSTAT_INPUT_PATH", "./raw_data/reels.csv"));
    let output_path = PathBuf::from(or_default(
        "REELSTAT_OUTPUT_PATH",
        "./raw_data/described_data.csv",
    ));
    let settings_path = PathBuf::from(or_default(
        "REELSTAT_SETTINGS_PATH",
        "./config/settings.yaml",
    ));

    let stdev_hot_threshold =
        parse_multiplier("REELSTAT_STDEV_HOT_THRESHOLD", DEFAULT_STDEV_HOT_THRESHOLD)?;
    let stdev_very_successful_threshold = parse_multiplier(
        "REELSTAT_STDEV_VERY_SUCCESSFUL_THRESHOLD",
        DEFAULT_STDEV_VERY_SUCCESSFUL_THRESHOLD,
    )?;

    let top_reels_count = parse_usize("REELSTAT_TOP_REELS_COUNT", DEFAULT_TOP_REELS_COUNT)?;
    let bad_reels_count = parse_usize("REELSTAT_BAD_REELS_COUNT", DEFAULT_BAD_REELS_COUNT)?;

    Ok(AppConfig {
        env,
        log_level,
        input_path,
        output_path,
        settings_path,
        stdev_hot_threshold,
        stdev_very_successful_threshold,
        top_reels_count,
        bad_reels_count,
    })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidEnvVar`] for anything other than
/// `development`, `test` or `production`.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "REELSTAT_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}
