//! JSON reporter
//!
//! Outputs the outcome list as pretty-printed JSON. This is also the
//! persisted record: one object per input repository, successes carrying
//! the full insights and failures carrying `url`, `error` and
//! `success: false`.

use crate::models::AnalysisOutcome;
use anyhow::Result;

/// Render outcomes as JSON
pub fn render(outcomes: &[AnalysisOutcome]) -> Result<String> {
    Ok(serde_json::to_string_pretty(outcomes)?)
}
