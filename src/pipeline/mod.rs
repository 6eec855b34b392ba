//! Repository analysis pipeline
//!
//! Orchestrates one analysis run:
//! 1. Parse each repository URL
//! 2. Fetch a raw snapshot, limited to what the enabled extractors need
//! 3. Run the extractors and the health scorer (pure, no I/O)
//! 4. Turn per-repository errors into failure records
//!
//! Repositories are analyzed in parallel on a dedicated rayon pool; output
//! order always matches input order.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, info, warn};

use crate::config::AnalysisOptions;
use crate::github::{parse_github_url, MetadataProvider};
use crate::models::{
    AnalysisOutcome, AnalysisWindow, Manifest, RawRepositorySnapshot, RepositoryId,
    RepositoryInsights,
};
use crate::scoring::{HealthInputs, HealthScorer};
use crate::signals::markers::MANIFEST_FILES;
use crate::signals::{
    extract_activity, extract_code_quality, extract_contributors, extract_tech_stack,
};

/// Below this many remaining API requests the run is likely to hit the limit
pub const LOW_RATE_LIMIT: u64 = 50;

/// Progress callback: (repository url, completed, total)
pub type ProgressCallback = Box<dyn Fn(&str, usize, usize) + Send + Sync>;

/// Success/failure counts for a finished batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl BatchSummary {
    pub fn from_outcomes(outcomes: &[AnalysisOutcome]) -> Self {
        let succeeded = outcomes.iter().filter(|o| o.is_success()).count();
        Self {
            total: outcomes.len(),
            succeeded,
            failed: outcomes.len() - succeeded,
        }
    }
}

/// Fetch everything the enabled extractors need for one repository.
///
/// Tech stack inputs are always fetched. A manifest that cannot be fetched
/// is treated as absent.
pub fn fetch_snapshot(
    provider: &dyn MetadataProvider,
    id: &RepositoryId,
    options: &AnalysisOptions,
    window: &AnalysisWindow,
) -> Result<RawRepositorySnapshot> {
    let basic = provider
        .basic_info(id)
        .with_context(|| format!("Failed to fetch repository info for {}", id))?;

    debug!("{}: fetching tech stack inputs", id);
    let languages = provider
        .languages(id)
        .with_context(|| format!("Failed to fetch languages for {}", id))?;
    let root_entries = provider
        .root_entries(id)
        .with_context(|| format!("Failed to list root directory of {}", id))?;
    let manifest = fetch_manifest(provider, id, &root_entries);

    let file_paths = if options.include_code_quality {
        debug!("{}: fetching file tree", id);
        provider
            .file_paths(id, &basic.default_branch)
            .with_context(|| format!("Failed to fetch file tree for {}", id))?
    } else {
        Vec::new()
    };

    let commits = if options.needs_commits() {
        debug!("{}: fetching commits since {}", id, window.since);
        provider
            .commits(id, window.since)
            .with_context(|| format!("Failed to fetch commits for {}", id))?
    } else {
        Vec::new()
    };

    let contributors = if options.include_contributor_insights {
        provider
            .contributors(id)
            .with_context(|| format!("Failed to fetch contributors for {}", id))?
    } else {
        Vec::new()
    };

    let (issues, releases) = if options.include_activity_trends {
        debug!("{}: fetching issues and releases", id);
        let issues = provider
            .issues(id, window.since)
            .with_context(|| format!("Failed to fetch issues for {}", id))?;
        let releases = provider
            .releases(id)
            .with_context(|| format!("Failed to fetch releases for {}", id))?;
        (issues, releases)
    } else {
        (Vec::new(), Vec::new())
    };

    Ok(RawRepositorySnapshot {
        id: id.clone(),
        basic,
        commits,
        issues,
        releases,
        contributors,
        file_paths,
        languages,
        root_entries,
        manifest,
    })
}

/// First known manifest present in the root listing
fn fetch_manifest(
    provider: &dyn MetadataProvider,
    id: &RepositoryId,
    root_entries: &[String],
) -> Option<Manifest> {
    // Fetch the entry as listed; marker matching is case-insensitive
    let path = MANIFEST_FILES.iter().find_map(|name| {
        root_entries
            .iter()
            .find(|entry| entry.eq_ignore_ascii_case(name))
    })?;

    match provider.file_content(id, path) {
        Ok(Some(content)) => Some(Manifest {
            path: path.clone(),
            content,
        }),
        Ok(None) => None,
        Err(e) => {
            warn!("{}: could not fetch {}, skipping dependencies: {}", id, path, e);
            None
        }
    }
}

/// Run the extractors and the scorer over a snapshot.
///
/// Pure: the same snapshot, options and `now` always give the same result.
pub fn analyze_snapshot(
    snapshot: &RawRepositorySnapshot,
    options: &AnalysisOptions,
    now: DateTime<Utc>,
) -> RepositoryInsights {
    let window = AnalysisWindow::ending_at(now, options.analyze_days);

    let tech_stack = extract_tech_stack(
        &snapshot.languages,
        &snapshot.root_entries,
        snapshot.manifest.as_ref(),
    );

    let ((code_quality, contributors), activity) = rayon::join(
        || {
            rayon::join(
                || {
                    options
                        .include_code_quality
                        .then(|| extract_code_quality(&snapshot.file_paths))
                },
                || {
                    options.include_contributor_insights.then(|| {
                        extract_contributors(&snapshot.contributors, &snapshot.commits, &window)
                    })
                },
            )
        },
        || {
            options.include_activity_trends.then(|| {
                extract_activity(
                    &snapshot.commits,
                    &snapshot.issues,
                    &snapshot.releases,
                    &window,
                )
            })
        },
    );

    let inputs = HealthInputs {
        basic: &snapshot.basic,
        tech_stack: &tech_stack,
        code_quality: code_quality.as_ref().into(),
        contributors: contributors.as_ref().into(),
        activity: activity.as_ref().into(),
    };
    let breakdown = HealthScorer::new(inputs, now).calculate();

    RepositoryInsights {
        url: snapshot.id.html_url(),
        owner: snapshot.id.owner.clone(),
        repo: snapshot.id.repo.clone(),
        analyzed_at: now,
        basic_info: snapshot.basic.clone(),
        tech_stack,
        code_quality,
        contributors,
        activity,
        health_score: breakdown.total(),
        health_breakdown: breakdown,
        success: true,
    }
}

fn try_analyze(
    provider: &dyn MetadataProvider,
    url: &str,
    options: &AnalysisOptions,
    now: DateTime<Utc>,
) -> Result<RepositoryInsights> {
    let id = parse_github_url(url)?;
    let window = AnalysisWindow::ending_at(now, options.analyze_days);
    let snapshot = fetch_snapshot(provider, &id, options, &window)?;
    Ok(analyze_snapshot(&snapshot, options, now))
}

/// Analyze one repository; every error becomes a failure record.
pub fn analyze_one(
    provider: &dyn MetadataProvider,
    url: &str,
    options: &AnalysisOptions,
    now: DateTime<Utc>,
) -> AnalysisOutcome {
    match try_analyze(provider, url, options, now) {
        Ok(insights) => {
            info!(
                "Analyzed {}/{}: health score {}/100",
                insights.owner, insights.repo, insights.health_score
            );
            AnalysisOutcome::Success(Box::new(insights))
        }
        Err(e) => {
            warn!("Error analyzing {}: {:#}", url, e);
            AnalysisOutcome::failure(url, format!("{:#}", e))
        }
    }
}

/// Log the remaining API quota; never blocks the run
pub fn check_rate_limit(provider: &dyn MetadataProvider) {
    match provider.rate_limit() {
        Ok(Some(rate)) => {
            info!(
                "GitHub API rate limit: {}/{} requests remaining",
                rate.remaining, rate.limit
            );
            if rate.remaining < LOW_RATE_LIMIT {
                warn!(
                    "Low GitHub API rate limit ({} remaining). Consider providing a GitHub token for higher limits.",
                    rate.remaining
                );
            }
        }
        Ok(None) => debug!("Provider is not rate limited"),
        Err(e) => warn!("Could not query GitHub API rate limit: {}", e),
    }
}

/// Batch analyzer over a worker pool
pub struct BatchAnalyzer<'a> {
    provider: &'a dyn MetadataProvider,
    options: AnalysisOptions,
    workers: usize,
    progress_callback: Option<ProgressCallback>,
}

impl<'a> BatchAnalyzer<'a> {
    pub fn new(provider: &'a dyn MetadataProvider, options: AnalysisOptions, workers: usize) -> Self {
        Self {
            provider,
            options,
            workers: workers.max(1),
            progress_callback: None,
        }
    }

    /// Called once per finished repository
    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Analyze every URL; the result has one outcome per input, in input order.
    ///
    /// Fails only on invalid options or when the worker pool cannot start.
    pub fn run(&self, urls: &[String], now: DateTime<Utc>) -> Result<Vec<AnalysisOutcome>> {
        self.options.validate()?;
        info!("Analyzing {} repositories with {} workers", urls.len(), self.workers);

        check_rate_limit(self.provider);

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .build()
            .context("Failed to start worker pool")?;

        let completed = AtomicUsize::new(0);
        let total = urls.len();

        let outcomes: Vec<AnalysisOutcome> = pool.install(|| {
            urls.par_iter()
                .map(|url| {
                    let outcome = analyze_one(self.provider, url, &self.options, now);

                    let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                    if let Some(ref callback) = self.progress_callback {
                        callback(url, done, total);
                    }

                    outcome
                })
                .collect()
        });

        let summary = BatchSummary::from_outcomes(&outcomes);
        info!(
            "Successfully analyzed {}/{} repositories",
            summary.succeeded, summary.total
        );

        Ok(outcomes)
    }
}

/// Analyze a batch without progress reporting
pub fn analyze_batch(
    provider: &dyn MetadataProvider,
    urls: &[String],
    options: &AnalysisOptions,
    workers: usize,
    now: DateTime<Utc>,
) -> Result<Vec<AnalysisOutcome>> {
    BatchAnalyzer::new(provider, *options, workers).run(urls, now)
}
