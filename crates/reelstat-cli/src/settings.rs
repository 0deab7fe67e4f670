//! Operator settings command handlers.

use std::path::Path;

use anyhow::Context;
use clap::Subcommand;
use reelstat_core::{load_settings, save_settings, Settings};

/// Sub-commands available under `settings`.
#[derive(Debug, Subcommand)]
pub enum SettingsCommands {
    /// Print the current settings
    Show,
    /// Replace the tracked accounts and optionally the per-account reel limit
    Set {
        /// Comma-separated account names
        #[arg(long, value_delimiter = ',', required = true)]
        accounts: Vec<String>,
        /// Recent reels to fetch per account (1-500)
        #[arg(long)]
        limit: Option<u32>,
    },
}

/// Print the settings stored at `path`.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or is invalid.
pub(crate) fn run_settings_show(path: &Path) -> anyhow::Result<()> {
    let settings = load_settings(path)
        .with_context(|| format!("failed to load settings from {}", path.display()))?;
    print_settings(path, &settings);
    Ok(())
}

/// Replace the account list (and optionally the limit) and save.
///
/// # Errors
///
/// Returns an error if the current file is invalid or the new settings fail
/// validation or cannot be written.
pub(crate) fn run_settings_set(
    path: &Path,
    accounts: &[String],
    limit: Option<u32>,
) -> anyhow::Result<()> {
    let mut settings = load_settings(path)
        .with_context(|| format!("failed to load settings from {}", path.display()))?
        .with_accounts(accounts);
    if let Some(limit) = limit {
        settings.results_limit = limit;
    }

    save_settings(path, &settings)
        .with_context(|| format!("failed to save settings to {}", path.display()))?;
    tracing::info!(
        path = %path.display(),
        accounts = settings.accounts.len(),
        results_limit = settings.results_limit,
        "settings saved"
    );

    print_settings(path, &settings);
    Ok(())
}

fn print_settings(path: &Path, settings: &Settings) {
    println!("settings: {}", path.display());
    println!("results_limit: {}", settings.results_limit);
    if settings.accounts.is_empty() {
        println!("accounts: (none)");
    } else {
        println!("accounts:");
        for account in &settings.accounts {
            println!("  - {account}");
        }
    }
}
