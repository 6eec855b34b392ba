//! Project-level configuration
//!
//! Loaded from `repo-insights.toml` (preferred) or `.repo-insights.json` in
//! the working directory:
//!
//! ```toml
//! workers = 4
//!
//! [analysis]
//! include_code_quality = true
//! include_contributor_insights = true
//! include_activity_trends = true
//! analyze_days = 90
//!
//! [github]
//! # token = "ghp_..."   # prefer the GITHUB_TOKEN environment variable
//! api_url = "https://api.github.com"
//! timeout_secs = 30
//! ```
//!
//! Token precedence, highest first: CLI flag, `GITHUB_TOKEN`, project file,
//! user config (`~/.config/repo-insights/config.toml`).

use super::{AnalysisOptions, ConfigError, ConfigResult, UserConfig};
use crate::github::{DEFAULT_API_URL, DEFAULT_USER_AGENT};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, warn};

pub const CONFIG_FILE: &str = "repo-insights.toml";
pub const JSON_CONFIG_FILE: &str = ".repo-insights.json";

pub const DEFAULT_WORKERS: usize = 4;
pub const MAX_WORKERS: usize = 64;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// GitHub API connection settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GithubSettings {
    pub token: Option<String>,
    pub api_url: String,
    pub user_agent: String,
    pub timeout_secs: u64,
}

impl Default for GithubSettings {
    fn default() -> Self {
        Self {
            token: None,
            api_url: DEFAULT_API_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Complete configuration for a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InsightsConfig {
    pub analysis: AnalysisOptions,
    pub github: GithubSettings,
    /// Repositories analyzed in parallel
    pub workers: usize,
}

impl Default for InsightsConfig {
    fn default() -> Self {
        Self {
            analysis: AnalysisOptions::default(),
            github: GithubSettings::default(),
            workers: DEFAULT_WORKERS,
        }
    }
}

impl InsightsConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        self.analysis.validate()?;
        if self.workers == 0 || self.workers > MAX_WORKERS {
            return Err(ConfigError::Invalid(format!(
                "workers must be between 1 and {}, got {}",
                MAX_WORKERS, self.workers
            )));
        }
        if self.github.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "github.timeout_secs must be at least 1".to_string(),
            ));
        }
        if self.github.api_url.trim().is_empty() {
            return Err(ConfigError::Invalid("github.api_url is empty".to_string()));
        }
        Ok(())
    }
}

/// Load configuration for a run started in `dir`.
///
/// A missing file yields defaults; a broken or invalid one is logged and
/// ignored. Never fails.
pub fn load_config(dir: &Path) -> InsightsConfig {
    let env_token = std::env::var("GITHUB_TOKEN").ok();
    resolve_config(dir, UserConfig::load(), env_token)
}

pub(crate) fn resolve_config(
    dir: &Path,
    user: UserConfig,
    env_token: Option<String>,
) -> InsightsConfig {
    let mut config = load_project_file(dir);

    if config.github.token.is_none() {
        config.github.token = user.token().map(str::to_string);
    }
    if let Some(token) = env_token.filter(|t| !t.trim().is_empty()) {
        config.github.token = Some(token);
    }

    config
}

fn load_project_file(dir: &Path) -> InsightsConfig {
    // Try TOML first (preferred format)
    let toml_path = dir.join(CONFIG_FILE);
    if toml_path.exists() {
        match load_toml_config(&toml_path) {
            Ok(config) => {
                debug!("Loaded config from {}", toml_path.display());
                return config;
            }
            Err(e) => {
                warn!("Failed to load {}: {}", toml_path.display(), e);
            }
        }
    }

    let json_path = dir.join(JSON_CONFIG_FILE);
    if json_path.exists() {
        match load_json_config(&json_path) {
            Ok(config) => {
                debug!("Loaded config from {}", json_path.display());
                return config;
            }
            Err(e) => {
                warn!("Failed to load {}: {}", json_path.display(), e);
            }
        }
    }

    debug!("No config file found, using defaults");
    InsightsConfig::default()
}

/// Load configuration from a TOML file
fn load_toml_config(path: &Path) -> ConfigResult<InsightsConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: InsightsConfig = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

/// Load configuration from a JSON file
fn load_json_config(path: &Path) -> ConfigResult<InsightsConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: InsightsConfig = serde_json::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &str) {
        std::fs::write(dir.path().join(name), content).unwrap();
    }

    #[test]
    fn test_defaults_without_files() {
        let dir = TempDir::new().unwrap();
        let config = resolve_config(dir.path(), UserConfig::default(), None);
        assert_eq!(config, InsightsConfig::default());
        assert_eq!(config.github.api_url, "https://api.github.com");
        assert_eq!(config.workers, DEFAULT_WORKERS);
    }

    #[test]
    fn test_toml_config() {
        let dir = TempDir::new().unwrap();
        write(
            &dir,
            CONFIG_FILE,
            r#"
workers = 2

[analysis]
include_code_quality = false
analyze_days = 30

[github]
token = "from-file"
timeout_secs = 10
"#,
        );
        let config = resolve_config(dir.path(), UserConfig::default(), None);
        assert_eq!(config.workers, 2);
        assert!(!config.analysis.include_code_quality);
        assert!(config.analysis.include_activity_trends);
        assert_eq!(config.analysis.analyze_days, 30);
        assert_eq!(config.github.token.as_deref(), Some("from-file"));
        assert_eq!(config.github.timeout_secs, 10);
    }

    #[test]
    fn test_json_config() {
        let dir = TempDir::new().unwrap();
        write(
            &dir,
            JSON_CONFIG_FILE,
            r#"{"analysis": {"include_activity_trends": false, "analyze_days": 14}}"#,
        );
        let config = resolve_config(dir.path(), UserConfig::default(), None);
        assert!(!config.analysis.include_activity_trends);
        assert_eq!(config.analysis.analyze_days, 14);
    }

    #[test]
    fn test_toml_takes_precedence_over_json() {
        let dir = TempDir::new().unwrap();
        write(&dir, CONFIG_FILE, "[analysis]\nanalyze_days = 7\n");
        write(&dir, JSON_CONFIG_FILE, r#"{"analysis": {"analyze_days": 14}}"#);
        let config = resolve_config(dir.path(), UserConfig::default(), None);
        assert_eq!(config.analysis.analyze_days, 7);
    }

    #[test]
    fn test_broken_toml_falls_back() {
        let dir = TempDir::new().unwrap();
        write(&dir, CONFIG_FILE, "[analysis\nanalyze_days = ");
        write(&dir, JSON_CONFIG_FILE, r#"{"workers": 3}"#);
        let config = resolve_config(dir.path(), UserConfig::default(), None);
        assert_eq!(config.workers, 3);
    }

    #[test]
    fn test_invalid_values_fall_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        write(&dir, CONFIG_FILE, "[analysis]\nanalyze_days = 0\n");
        let config = resolve_config(dir.path(), UserConfig::default(), None);
        assert_eq!(config.analysis.analyze_days, 90);
    }

    #[test]
    fn test_token_precedence() {
        let dir = TempDir::new().unwrap();
        let user: UserConfig = toml::from_str("[github]\ntoken = \"from-user\"\n").unwrap();
        let config = resolve_config(dir.path(), user, None);
        assert_eq!(config.github.token.as_deref(), Some("from-user"));

        write(&dir, CONFIG_FILE, "[github]\ntoken = \"from-file\"\n");
        let user: UserConfig = toml::from_str("[github]\ntoken = \"from-user\"\n").unwrap();
        let config = resolve_config(dir.path(), user, None);
        assert_eq!(config.github.token.as_deref(), Some("from-file"));

        let config = resolve_config(
            dir.path(),
            UserConfig::default(),
            Some("from-env".to_string()),
        );
        assert_eq!(config.github.token.as_deref(), Some("from-env"));

        let config = resolve_config(dir.path(), UserConfig::default(), Some(String::new()));
        assert_eq!(config.github.token.as_deref(), Some("from-file"));
    }

    #[test]
    fn test_validate_workers() {
        let config = InsightsConfig {
            workers: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
        let config = InsightsConfig {
            workers: 65,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
