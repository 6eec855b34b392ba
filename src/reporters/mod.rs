//! Output reporters for repo-insights analysis results
//!
//! Supports multiple output formats:
//! - `text` - Terminal output with colors
//! - `json` - Machine-readable JSON (the persisted record format)
//! - `markdown` - GitHub-flavored Markdown

mod json;
mod markdown;
mod text;

use crate::models::AnalysisOutcome;
use anyhow::{anyhow, Result};
use std::str::FromStr;

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
    Markdown,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" | "terminal" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            _ => Err(anyhow!(
                "Unknown format '{}'. Valid formats: text, json, markdown",
                s
            )),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Markdown => write!(f, "markdown"),
        }
    }
}

/// Render analysis outcomes in the specified format
pub fn report(outcomes: &[AnalysisOutcome], format: &str) -> Result<String> {
    let fmt = OutputFormat::from_str(format)?;
    report_with_format(outcomes, fmt)
}

/// Render analysis outcomes using an OutputFormat enum
pub fn report_with_format(outcomes: &[AnalysisOutcome], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => text::render(outcomes),
        OutputFormat::Json => json::render(outcomes),
        OutputFormat::Markdown => markdown::render(outcomes),
    }
}
