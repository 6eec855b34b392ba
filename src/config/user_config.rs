//! User-level configuration for repo-insights
//!
//! Supports loading config from:
//! - Environment variables
//! - ~/.config/repo-insights/config.toml

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct UserConfig {
    #[serde(default)]
    pub github: UserGithubConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct UserGithubConfig {
    /// Personal access token used when a project file sets none
    pub token: Option<String>,
}

impl UserConfig {
    /// Load the user config file, if present and readable
    pub fn load() -> Self {
        Self::user_config_path()
            .map(|path| Self::load_from(&path))
            .unwrap_or_default()
    }

    pub(crate) fn load_from(path: &Path) -> Self {
        std::fs::read_to_string(path)
            .ok()
            .and_then(|content| toml::from_str::<UserConfig>(&content).ok())
            .unwrap_or_default()
    }

    /// Get the user config directory path
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("repo-insights").join("config.toml"))
    }

    pub fn token(&self) -> Option<&str> {
        self.github.token.as_deref().filter(|t| !t.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_has_no_token() {
        assert!(UserConfig::default().token().is_none());
    }

    #[test]
    fn test_toml_parsing() {
        let config: UserConfig = toml::from_str("[github]\ntoken = \"ghp_test\"\n").unwrap();
        assert_eq!(config.token(), Some("ghp_test"));
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = UserConfig::load_from(&dir.path().join("config.toml"));
        assert!(config.token().is_none());
    }

    #[test]
    fn test_blank_token_ignored() {
        let config: UserConfig = toml::from_str("[github]\ntoken = \"  \"\n").unwrap();
        assert!(config.token().is_none());
    }
}
