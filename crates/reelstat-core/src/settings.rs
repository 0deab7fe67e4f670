//! Operator settings persisted as YAML.
//!
//! Holds the accounts handed to the acquisition actor and how many recent
//! reels to pull per account. Edits go through [`save_settings`], which
//! validates before anything touches disk.

use std::collections::HashSet;
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

pub const MIN_RESULTS_LIMIT: u32 = 1;
pub const MAX_RESULTS_LIMIT: u32 = 500;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub accounts: Vec<String>,
    #[serde(default = "default_results_limit")]
    pub results_limit: u32,
}

fn default_results_limit() -> u32 {
    5
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            accounts: Vec::new(),
            results_limit: default_results_limit(),
        }
    }
}

impl Settings {
    /// Replace the account list, trimming names and dropping blanks.
    #[must_use]
    pub fn with_accounts<I, S>(mut self, accounts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.accounts = accounts
            .into_iter()
            .map(|a| a.as_ref().trim().to_string())
            .filter(|a| !a.is_empty())
            .collect();
        self
    }
}

/// Load and validate settings from a YAML file.
///
/// A file that does not exist yet yields [`Settings::default`].
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_settings(path: &Path) -> Result<Settings, ConfigError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Settings::default()),
        Err(e) => {
            return Err(ConfigError::SettingsIo {
                path: path.display().to_string(),
                source: e,
            })
        }
    };

    let settings: Settings =
        serde_yaml::from_str(&content).map_err(ConfigError::SettingsParse)?;

    validate_settings(&settings)?;

    Ok(settings)
}

/// Validate and write settings to `path`.
///
/// The YAML is written to a temp file beside `path` and renamed over it, so
/// a failed save leaves the previous file intact.
///
/// # Errors
///
/// Returns `ConfigError` if validation fails or the file cannot be written.
pub fn save_settings(path: &Path, settings: &Settings) -> Result<(), ConfigError> {
    validate_settings(settings)?;

    let yaml = serde_yaml::to_string(settings).map_err(ConfigError::SettingsSerialize)?;

    let io_err = |source: std::io::Error| ConfigError::SettingsIo {
        path: path.display().to_string(),
        source,
    };

    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(io_err)?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(io_err)?;
    tmp.write_all(yaml.as_bytes()).map_err(io_err)?;
    tmp.as_file().sync_all().map_err(io_err)?;
    tmp.persist(path).map_err(|e| io_err(e.error))?;

    Ok(())
}

fn validate_settings(settings: &Settings) -> Result<(), ConfigError> {
    if !(MIN_RESULTS_LIMIT..=MAX_RESULTS_LIMIT).contains(&settings.results_limit) {
        return Err(ConfigError::Validation(format!(
            "results_limit must be between {MIN_RESULTS_LIMIT} and {MAX_RESULTS_LIMIT}, got {}",
            settings.results_limit
        )));
    }

    let mut seen = HashSet::new();
    for account in &settings.accounts {
        if account.trim().is_empty() {
            return Err(ConfigError::Validation(
                "account name must be non-empty".to_string(),
            ));
        }
        if !seen.insert(account.trim().to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate account: '{account}'"
            )));
        }
    }

    Ok(())
}
