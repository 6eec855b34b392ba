//! Core data models for repo-insights
//!
//! The raw snapshot types are what a metadata provider hands to the core.
//! They are plain immutable values: the extractors read them and never
//! mutate them, and nothing is cached between analysis runs.

use crate::scoring::ScoreBreakdown;
use crate::signals::{ActivityMetrics, CodeQualityMetrics, ContributorMetrics, TechStackMetrics};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Owner/name pair identifying a repository on the hosting platform.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct RepositoryId {
    pub owner: String,
    pub repo: String,
}

impl RepositoryId {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
        }
    }

    /// `owner/repo`
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }

    /// Canonical browser URL for the repository
    pub fn html_url(&self) -> String {
        format!("https://github.com/{}/{}", self.owner, self.repo)
    }
}

impl fmt::Display for RepositoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// Basic repository attributes
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct BasicInfo {
    pub name: String,
    pub full_name: String,
    pub description: Option<String>,
    pub stars: u64,
    pub forks: u64,
    pub watchers: u64,
    pub open_issues: u64,
    /// License display name, `None` when the repository declares none
    pub license: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub pushed_at: Option<DateTime<Utc>>,
    /// Repository size in KB as reported by the platform
    pub size: u64,
    pub default_branch: String,
    pub is_private: bool,
    pub is_fork: bool,
    pub has_issues: bool,
    pub has_wiki: bool,
    pub has_projects: bool,
    pub has_pages: bool,
    pub has_downloads: bool,
}

impl BasicInfo {
    pub fn has_license(&self) -> bool {
        self.license
            .as_deref()
            .is_some_and(|name| !name.trim().is_empty() && !name.eq_ignore_ascii_case("none"))
    }

    /// Whole days elapsed since the last push, `None` if the repository was never pushed to.
    pub fn days_since_push(&self, now: DateTime<Utc>) -> Option<i64> {
        self.pushed_at
            .map(|pushed| (now - pushed).num_days().max(0))
    }
}

/// A single commit as seen by the metadata provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitRecord {
    /// Platform login of the author, when the commit email maps to an account
    #[serde(default)]
    pub login: Option<String>,
    /// Raw author name from the commit object
    #[serde(default)]
    pub author_name: String,
    pub authored_at: DateTime<Utc>,
}

impl CommitRecord {
    /// Identity used to aggregate commits per author: login, then raw name.
    ///
    /// The two identity spaces do not reconcile, so one person may show up
    /// under several keys (renamed accounts, unlinked emails).
    pub fn identity(&self) -> &str {
        match self.login.as_deref() {
            Some(login) if !login.is_empty() => login,
            _ if !self.author_name.is_empty() => &self.author_name,
            _ => "unknown",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ItemState {
    #[default]
    Open,
    Closed,
}

/// Present on issues that are actually pull requests
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PullRequestMarker {
    #[serde(default)]
    pub merged_at: Option<DateTime<Utc>>,
}

/// An issue or pull request from the unified issue listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueRecord {
    #[serde(default)]
    pub state: ItemState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub comments: u32,
    #[serde(default)]
    pub pull_request: Option<PullRequestMarker>,
}

impl IssueRecord {
    pub fn is_pull_request(&self) -> bool {
        self.pull_request.is_some()
    }

    pub fn is_closed(&self) -> bool {
        self.state == ItemState::Closed
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseRecord {
    #[serde(default)]
    pub name: Option<String>,
    pub tag_name: String,
    /// Drafts have no publication timestamp
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
}

/// Lifetime contributor entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContributorRecord {
    pub login: String,
    pub contributions: u64,
}

/// Dependency manifest file content fetched from the repository root
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    pub path: String,
    pub content: String,
}

/// Everything the core needs about one repository, fetched once per run.
///
/// Collections belonging to an extractor that was switched off are simply
/// left empty by the orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RawRepositorySnapshot {
    pub id: RepositoryId,
    pub basic: BasicInfo,
    pub commits: Vec<CommitRecord>,
    pub issues: Vec<IssueRecord>,
    pub releases: Vec<ReleaseRecord>,
    pub contributors: Vec<ContributorRecord>,
    /// Full recursive listing of file paths (blobs only)
    pub file_paths: Vec<String>,
    /// Bytes of source per language
    pub languages: BTreeMap<String, u64>,
    /// Names of the entries in the repository root (files and directories)
    pub root_entries: Vec<String>,
    pub manifest: Option<Manifest>,
}

/// The trailing time span activity is measured over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisWindow {
    pub days: u32,
    pub since: DateTime<Utc>,
    pub until: DateTime<Utc>,
}

impl AnalysisWindow {
    /// Window of `days` days ending at `until`
    pub fn ending_at(until: DateTime<Utc>, days: u32) -> Self {
        Self {
            days,
            since: until - Duration::days(i64::from(days)),
            until,
        }
    }

    /// Inclusive on both ends
    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        ts >= self.since && ts <= self.until
    }
}

/// Full analysis result for one repository
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryInsights {
    pub url: String,
    pub owner: String,
    pub repo: String,
    pub analyzed_at: DateTime<Utc>,
    pub basic_info: BasicInfo,
    pub tech_stack: TechStackMetrics,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_quality: Option<CodeQualityMetrics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contributors: Option<ContributorMetrics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activity: Option<ActivityMetrics>,
    pub health_score: u32,
    pub health_breakdown: ScoreBreakdown,
    pub success: bool,
}

/// Degraded record for a repository whose analysis failed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailedAnalysis {
    pub url: String,
    pub error: String,
    pub success: bool,
}

/// One entry of the persisted report
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnalysisOutcome {
    Success(Box<RepositoryInsights>),
    Failure(FailedAnalysis),
}

impl AnalysisOutcome {
    pub fn failure(url: impl Into<String>, error: impl Into<String>) -> Self {
        AnalysisOutcome::Failure(FailedAnalysis {
            url: url.into(),
            error: error.into(),
            success: false,
        })
    }

    pub fn is_success(&self) -> bool {
        matches!(self, AnalysisOutcome::Success(_))
    }

    pub fn url(&self) -> &str {
        match self {
            AnalysisOutcome::Success(insights) => &insights.url,
            AnalysisOutcome::Failure(failed) => &failed.url,
        }
    }
}
