mod describe;
mod rank;
mod settings;
mod stats;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use reelstat_core::Metric;
use reelstat_engine::Category;
use tracing_subscriber::EnvFilter;

use crate::settings::SettingsCommands;

#[derive(Debug, Parser)]
#[command(name = "reelstat")]
#[command(about = "Per-account engagement statistics for short-form video posts")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Enrich a raw reels table with derived metrics, z-scores and labels
    Describe {
        /// Raw table to read (defaults to `REELSTAT_INPUT_PATH`)
        #[arg(long)]
        input: Option<PathBuf>,
        /// Where to write the enriched table (defaults to `REELSTAT_OUTPUT_PATH`)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Print a data-quality report for a table
    Validate {
        /// Table to inspect (defaults to `REELSTAT_INPUT_PATH`)
        #[arg(long)]
        input: Option<PathBuf>,
    },
    /// Print a markdown distribution report for one numeric column
    Stats {
        /// Column to analyze, e.g. `likesCount` or `viralityIndex`
        #[arg(long)]
        metric: String,
        /// Restrict to an account (repeatable)
        #[arg(long = "account")]
        accounts: Vec<String>,
        /// Enriched table to read (defaults to `REELSTAT_OUTPUT_PATH`)
        #[arg(long)]
        input: Option<PathBuf>,
    },
    /// Show each account's best (or worst) reels by one column
    Top {
        /// Column to rank by
        #[arg(long)]
        metric: String,
        /// Reels per account (defaults to the configured top or bad count)
        #[arg(long)]
        limit: Option<usize>,
        /// Rank lowest values first
        #[arg(long)]
        bottom: bool,
        /// Enriched table to read (defaults to `REELSTAT_OUTPUT_PATH`)
        #[arg(long)]
        input: Option<PathBuf>,
    },
    /// List reels whose label for a metric is one of the given categories
    Videos {
        /// Labelled metric, e.g. `likesCount`
        #[arg(long)]
        metric: Metric,
        /// Category to keep (repeatable; defaults to `viral hit`)
        #[arg(long = "category")]
        categories: Vec<Category>,
        /// Restrict to one account
        #[arg(long)]
        account: Option<String>,
        /// Enriched table to read (defaults to `REELSTAT_OUTPUT_PATH`)
        #[arg(long)]
        input: Option<PathBuf>,
    },
    /// Inspect or edit the operator settings file
    Settings {
        #[command(subcommand)]
        command: SettingsCommands,
    },
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = reelstat_core::load_app_config()?;
    // Logs go to stderr so reports on stdout can be piped.
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
    tracing::debug!(env = %config.env, "configuration loaded");

    match cli.command {
        Some(Commands::Describe { input, output }) => {
            let input = input.unwrap_or_else(|| config.input_path.clone());
            let output = output.unwrap_or_else(|| config.output_path.clone());
            describe::run_describe(&input, &output)?;
        }
        Some(Commands::Validate { input }) => {
            let input = input.unwrap_or_else(|| config.input_path.clone());
            describe::run_validate(&input)?;
        }
        Some(Commands::Stats {
            metric,
            accounts,
            input,
        }) => {
            let input = input.unwrap_or_else(|| config.output_path.clone());
            stats::run_stats(&config, &input, &metric, &accounts)?;
        }
        Some(Commands::Top {
            metric,
            limit,
            bottom,
            input,
        }) => {
            let input = input.unwrap_or_else(|| config.output_path.clone());
            rank::run_top(&config, &input, &metric, limit, bottom)?;
        }
        Some(Commands::Videos {
            metric,
            categories,
            account,
            input,
        }) => {
            let input = input.unwrap_or_else(|| config.output_path.clone());
            rank::run_videos(&input, metric, &categories, account.as_deref())?;
        }
        Some(Commands::Settings { command }) => match command {
            SettingsCommands::Show => settings::run_settings_show(&config.settings_path)?,
            SettingsCommands::Set { accounts, limit } => {
                settings::run_settings_set(&config.settings_path, &accounts, limit)?;
            }
        },
        None => println!("reelstat: no command given; run `reelstat --help` for usage"),
    }

    Ok(())
}
