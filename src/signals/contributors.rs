//! Contributor distribution and engagement
//!
//! Two separate views are combined here and never mixed:
//! - the lifetime contributor list (top 10, concentration)
//! - the commits inside the analysis window (per-author aggregates,
//!   active vs casual, engagement)

use super::round2;
use crate::models::{AnalysisWindow, CommitRecord, ContributorRecord};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Size of the lifetime "top contributors" list
pub const TOP_CONTRIBUTORS: usize = 10;
/// Window commits needed to count as an active contributor
pub const ACTIVE_COMMIT_THRESHOLD: usize = 3;
/// Concentration below this is a healthy distribution
pub const HEALTHY_CONCENTRATION: f64 = 70.0;
/// Active contributors needed for an active core
pub const ACTIVE_CORE_SIZE: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopContributor {
    pub login: String,
    pub contributions: u64,
}

/// Commits of one author inside the window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorActivity {
    pub login: String,
    pub commits: usize,
    pub first_commit: DateTime<Utc>,
    pub last_commit: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecentActivity {
    pub contributors_in_period: usize,
    pub active_contributors: usize,
    pub casual_contributors: usize,
    /// Sorted by commit count, most active first
    pub authors: Vec<AuthorActivity>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diversity {
    /// Share of lifetime contributions held by the top 10, 0-100
    pub contributor_concentration: f64,
    pub is_healthy_distribution: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Engagement {
    pub average_commits_per_contributor: f64,
    pub has_active_core: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContributorMetrics {
    pub total_contributors: usize,
    pub top_contributors: Vec<TopContributor>,
    pub recent_activity: RecentActivity,
    pub diversity: Diversity,
    pub engagement: Engagement,
}

impl ContributorMetrics {
    pub fn active_contributors(&self) -> usize {
        self.recent_activity.active_contributors
    }
}

/// Extract contributor metrics.
///
/// `commits` may contain records outside `window`; those are ignored.
pub fn extract_contributors(
    contributors: &[ContributorRecord],
    commits: &[CommitRecord],
    window: &AnalysisWindow,
) -> ContributorMetrics {
    let windowed: Vec<&CommitRecord> = commits
        .iter()
        .filter(|c| window.contains(c.authored_at))
        .collect();

    let authors = aggregate_authors(&windowed);
    let active_contributors = authors
        .iter()
        .filter(|a| a.commits >= ACTIVE_COMMIT_THRESHOLD)
        .count();
    let casual_contributors = authors.len() - active_contributors;

    let top_contributors = top_contributors(contributors);
    let contributor_concentration = concentration(contributors, &top_contributors);

    let average_commits_per_contributor = if authors.is_empty() {
        0.0
    } else {
        round2(windowed.len() as f64 / authors.len() as f64)
    };

    ContributorMetrics {
        total_contributors: contributors.len(),
        top_contributors,
        recent_activity: RecentActivity {
            contributors_in_period: authors.len(),
            active_contributors,
            casual_contributors,
            authors,
        },
        diversity: Diversity {
            contributor_concentration,
            is_healthy_distribution: contributor_concentration < HEALTHY_CONCENTRATION,
        },
        engagement: Engagement {
            average_commits_per_contributor,
            has_active_core: active_contributors >= ACTIVE_CORE_SIZE,
        },
    }
}

fn aggregate_authors(commits: &[&CommitRecord]) -> Vec<AuthorActivity> {
    let mut by_author: HashMap<&str, AuthorActivity> = HashMap::new();

    for commit in commits.iter().copied() {
        let identity = commit.identity();
        let entry = by_author
            .entry(identity)
            .or_insert_with(|| AuthorActivity {
                login: identity.to_string(),
                commits: 0,
                first_commit: commit.authored_at,
                last_commit: commit.authored_at,
            });
        entry.commits += 1;
        entry.first_commit = entry.first_commit.min(commit.authored_at);
        entry.last_commit = entry.last_commit.max(commit.authored_at);
    }

    let mut authors: Vec<AuthorActivity> = by_author.into_values().collect();
    authors.sort_by(|a, b| b.commits.cmp(&a.commits).then_with(|| a.login.cmp(&b.login)));
    authors
}

fn top_contributors(contributors: &[ContributorRecord]) -> Vec<TopContributor> {
    let mut sorted: Vec<&ContributorRecord> = contributors.iter().collect();
    // Stable: equal counts keep the provider's order
    sorted.sort_by(|a, b| b.contributions.cmp(&a.contributions));
    sorted
        .into_iter()
        .take(TOP_CONTRIBUTORS)
        .map(|c| TopContributor {
            login: c.login.clone(),
            contributions: c.contributions,
        })
        .collect()
}

fn concentration(all: &[ContributorRecord], top: &[TopContributor]) -> f64 {
    let total: u64 = all.iter().map(|c| c.contributions).sum();
    let top_sum: u64 = top.iter().map(|c| c.contributions).sum();
    if total == 0 {
        return 0.0;
    }
    round2(top_sum as f64 / total as f64 * 100.0).min(100.0)
}
