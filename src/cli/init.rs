//! Init command - write a project config file with default settings

use crate::config::CONFIG_FILE;
use anyhow::{Context, Result};
use console::style;
use std::path::Path;

const DEFAULT_CONFIG: &str = r#"# repo-insights configuration
#
# CLI flags override these values. The GitHub token is best supplied through
# the GITHUB_TOKEN environment variable instead of this file.

# Repositories analyzed in parallel (1-64)
workers = 4

[analysis]
# Disabled extractors make their score category use a fallback estimate
include_code_quality = true
include_contributor_insights = true
include_activity_trends = true

# Length of the activity window in days (1-3650)
analyze_days = 90

[github]
api_url = "https://api.github.com"
timeout_secs = 30
# token = "ghp_..."
"#;

/// Run the init command
pub(super) fn run(dir: &Path, force: bool) -> Result<()> {
    if !dir.is_dir() {
        anyhow::bail!("Path is not a directory: {}", dir.display());
    }

    let config_path = dir.join(CONFIG_FILE);
    if config_path.exists() && !force {
        println!(
            "{} Config already exists at {} (use --force to overwrite)",
            style("✓").green(),
            style(config_path.display()).cyan()
        );
        return Ok(());
    }

    std::fs::write(&config_path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;
    println!(
        "{} Created {}",
        style("✓").green(),
        style(config_path.display()).cyan()
    );

    Ok(())
}
