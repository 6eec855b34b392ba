//! Score command - run the analysis over captured snapshots, offline

use super::{effective_workers, write_report, AnalysisArgs};
use crate::config::InsightsConfig;
use crate::github::SnapshotProvider;
use crate::models::RawRepositorySnapshot;
use crate::pipeline::BatchAnalyzer;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// A snapshot file holds either one snapshot or a list of them
#[derive(Deserialize)]
#[serde(untagged)]
enum SnapshotFile {
    Many(Vec<RawRepositorySnapshot>),
    One(Box<RawRepositorySnapshot>),
}

/// Run the score command
pub(super) fn run(
    config: &InsightsConfig,
    paths: &[PathBuf],
    as_of: Option<&str>,
    workers: Option<usize>,
    args: &AnalysisArgs,
) -> Result<()> {
    let now = match as_of {
        Some(s) => parse_as_of(s)?,
        None => Utc::now(),
    };

    let mut snapshots = Vec::new();
    for path in paths {
        snapshots.extend(load_snapshots(path)?);
    }
    info!("Loaded {} snapshots from {} files", snapshots.len(), paths.len());

    // One URL per distinct repository, in file order
    let mut urls: Vec<String> = Vec::with_capacity(snapshots.len());
    for snapshot in &snapshots {
        let url = snapshot.id.html_url();
        if urls.contains(&url) {
            warn!("Duplicate snapshot for {}; the last one wins", snapshot.id);
        } else {
            urls.push(url);
        }
    }

    let provider = SnapshotProvider::new(snapshots);
    if provider.is_empty() {
        anyhow::bail!("No snapshots found in {} file(s)", paths.len());
    }
    let options = args.options(config.analysis);
    let outcomes = BatchAnalyzer::new(&provider, options, effective_workers(config, workers))
        .run(&urls, now)?;

    write_report(&outcomes, args)
}

fn parse_as_of(s: &str) -> Result<DateTime<Utc>> {
    let ts = DateTime::parse_from_rfc3339(s)
        .with_context(|| format!("Invalid --as-of timestamp '{}', expected RFC 3339", s))?;
    Ok(ts.with_timezone(&Utc))
}

pub(crate) fn load_snapshots(path: &Path) -> Result<Vec<RawRepositorySnapshot>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read snapshot file {}", path.display()))?;
    let file: SnapshotFile = serde_json::from_str(&content)
        .with_context(|| format!("Invalid snapshot file {}", path.display()))?;

    Ok(match file {
        SnapshotFile::Many(snapshots) => snapshots,
        SnapshotFile::One(snapshot) => vec![*snapshot],
    })
}
