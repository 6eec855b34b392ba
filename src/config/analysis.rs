//! Per-run analysis options

use super::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};

pub const DEFAULT_ANALYZE_DAYS: u32 = 90;
pub const MIN_ANALYZE_DAYS: u32 = 1;
pub const MAX_ANALYZE_DAYS: u32 = 3650;

/// Which optional extractors run, and how far back activity is measured.
///
/// Tech stack is always extracted. Each disabled extractor makes the
/// health scorer use that category's fallback formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisOptions {
    pub include_code_quality: bool,
    pub include_contributor_insights: bool,
    pub include_activity_trends: bool,
    pub analyze_days: u32,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            include_code_quality: true,
            include_contributor_insights: true,
            include_activity_trends: true,
            analyze_days: DEFAULT_ANALYZE_DAYS,
        }
    }
}

impl AnalysisOptions {
    pub fn validate(&self) -> ConfigResult<()> {
        if !(MIN_ANALYZE_DAYS..=MAX_ANALYZE_DAYS).contains(&self.analyze_days) {
            return Err(ConfigError::Invalid(format!(
                "analyze_days must be between {} and {}, got {}",
                MIN_ANALYZE_DAYS, MAX_ANALYZE_DAYS, self.analyze_days
            )));
        }
        Ok(())
    }

    /// Whether commits need to be fetched at all
    pub fn needs_commits(&self) -> bool {
        self.include_contributor_insights || self.include_activity_trends
    }
}
