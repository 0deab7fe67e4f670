pub mod app_config;
pub mod config;
pub mod posts;
pub mod settings;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use posts::{Metric, RawPost};
pub use settings::{load_settings, save_settings, Settings};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to access settings file {path}: {source}")]
    SettingsIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse settings file: {0}")]
    SettingsParse(#[source] serde_yaml::Error),

    #[error("failed to serialize settings: {0}")]
    SettingsSerialize(#[source] serde_yaml::Error),

    #[error("settings validation error: {0}")]
    Validation(String),
}
