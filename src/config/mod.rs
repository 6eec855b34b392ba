//! Configuration module for repo-insights
//!
//! This module handles:
//! - Analysis options (which extractors run, window length)
//! - Project-level configuration (repo-insights.toml)
//! - User-level configuration (GitHub token)

mod analysis;
mod project_config;
mod user_config;

pub use analysis::{AnalysisOptions, DEFAULT_ANALYZE_DAYS, MAX_ANALYZE_DAYS, MIN_ANALYZE_DAYS};
pub use project_config::{
    load_config, GithubSettings, InsightsConfig, CONFIG_FILE, DEFAULT_WORKERS, JSON_CONFIG_FILE,
    MAX_WORKERS,
};
pub use user_config::UserConfig;

use thiserror::Error;

/// Errors that can occur while loading configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;
