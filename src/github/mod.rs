//! Repository metadata providers
//!
//! The scoring core never talks to the network. Everything it consumes is
//! gathered through [`MetadataProvider`], which has two implementations:
//!
//! - [`GithubClient`]: sync REST client over `ureq` (no async runtime)
//! - [`SnapshotProvider`]: serves a previously captured
//!   [`RawRepositorySnapshot`](crate::models::RawRepositorySnapshot), used
//!   for offline scoring and tests
//!
//! # Environment Variables
//!
//! - `GITHUB_TOKEN`: optional, raises the API rate limit from 60 to 5000
//!   requests per hour

mod client;
mod snapshot;
mod url;

pub use client::{GithubClient, DEFAULT_API_URL, DEFAULT_USER_AGENT};
pub use snapshot::SnapshotProvider;
pub use url::parse_github_url;

use crate::models::{
    BasicInfo, CommitRecord, ContributorRecord, IssueRecord, ReleaseRecord, RepositoryId,
};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors that can occur while fetching repository metadata
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Invalid GitHub URL format: {0}. Expected format: https://github.com/owner/repo")]
    InvalidUrl(String),

    #[error("Request failed: {0}")]
    Request(String),

    #[error("GitHub API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Failed to parse API response: {0}")]
    Parse(String),

    #[error("Repository {0} has no default branch (empty repository?)")]
    MissingDefaultBranch(String),
}

pub type ProviderResult<T> = Result<T, ProviderError>;

/// Advisory API quota
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimit {
    pub limit: u64,
    pub remaining: u64,
    pub reset_at: Option<DateTime<Utc>>,
}

/// Source of raw repository collections.
///
/// Implementations must be shareable across the batch worker pool.
pub trait MetadataProvider: Send + Sync {
    fn basic_info(&self, id: &RepositoryId) -> ProviderResult<BasicInfo>;

    /// Commits authored at or after `since`
    fn commits(&self, id: &RepositoryId, since: DateTime<Utc>) -> ProviderResult<Vec<CommitRecord>>;

    /// Issues and pull requests, in any state, updated at or after `since`
    fn issues(&self, id: &RepositoryId, since: DateTime<Utc>) -> ProviderResult<Vec<IssueRecord>>;

    /// Newest first
    fn releases(&self, id: &RepositoryId) -> ProviderResult<Vec<ReleaseRecord>>;

    fn contributors(&self, id: &RepositoryId) -> ProviderResult<Vec<ContributorRecord>>;

    /// Recursive listing of file paths (no directories) on `branch`
    fn file_paths(&self, id: &RepositoryId, branch: &str) -> ProviderResult<Vec<String>>;

    /// Bytes of source per language
    fn languages(&self, id: &RepositoryId) -> ProviderResult<BTreeMap<String, u64>>;

    /// Names of files and directories in the repository root
    fn root_entries(&self, id: &RepositoryId) -> ProviderResult<Vec<String>>;

    /// Raw file content, `None` when the file does not exist
    fn file_content(&self, id: &RepositoryId, path: &str) -> ProviderResult<Option<String>>;

    /// Remaining API quota, `None` when the provider is not rate limited
    fn rate_limit(&self) -> ProviderResult<Option<RateLimit>>;
}
