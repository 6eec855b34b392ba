//! GitHub REST client
//!
//! Uses ureq (sync HTTP), so no async runtime is needed. Status codes are
//! handled here rather than by ureq so API error bodies reach the caller.

use super::{MetadataProvider, ProviderError, ProviderResult, RateLimit};
use crate::config::GithubSettings;
use crate::models::{
    BasicInfo, CommitRecord, ContributorRecord, IssueRecord, ItemState, PullRequestMarker,
    ReleaseRecord, RepositoryId,
};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_API_URL: &str = "https://api.github.com";
pub const DEFAULT_USER_AGENT: &str = concat!("repo-insights/", env!("CARGO_PKG_VERSION"));

const JSON_MEDIA_TYPE: &str = "application/vnd.github+json";
const RAW_MEDIA_TYPE: &str = "application/vnd.github.raw+json";
const API_VERSION: &str = "2022-11-28";

const PAGE_SIZE: u32 = 100;
const RELEASE_PAGE_SIZE: u32 = 20;
/// Hard stop for paginated listings
const MAX_PAGES: usize = 10;

type HttpResponse = ureq::http::Response<ureq::Body>;

/// GitHub REST API client
pub struct GithubClient {
    api_url: String,
    token: Option<String>,
    user_agent: String,
    agent: ureq::Agent,
}

fn make_agent(timeout: Duration) -> ureq::Agent {
    ureq::config::Config::builder()
        .http_status_as_error(false)
        .timeout_global(Some(timeout))
        .build()
        .new_agent()
}

impl GithubClient {
    pub fn new(settings: &GithubSettings) -> Self {
        Self {
            api_url: settings.api_url.trim_end_matches('/').to_string(),
            token: settings.token.clone().filter(|t| !t.trim().is_empty()),
            user_agent: settings.user_agent.clone(),
            agent: make_agent(Duration::from_secs(settings.timeout_secs)),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    fn repo_url(&self, id: &RepositoryId, suffix: &str) -> String {
        format!("{}/repos/{}/{}{}", self.api_url, id.owner, id.repo, suffix)
    }

    /// Issue a GET; `Ok(None)` for 404 and 204
    fn get(
        &self,
        url: &str,
        query: &[(&str, String)],
        accept: &str,
    ) -> ProviderResult<Option<HttpResponse>> {
        debug!("GET {} {:?}", url, query);

        let mut req = self
            .agent
            .get(url)
            .header("Accept", accept)
            .header("User-Agent", &self.user_agent)
            .header("X-GitHub-Api-Version", API_VERSION);
        if let Some(token) = &self.token {
            req = req.header("Authorization", &format!("Bearer {}", token));
        }
        for (key, value) in query {
            req = req.query(*key, value);
        }

        let response = req
            .call()
            .map_err(|e| ProviderError::Request(e.to_string()))?;

        let status = response.status().as_u16();
        if status == 404 || status == 204 {
            return Ok(None);
        }
        if status >= 400 {
            let message = response.into_body().read_to_string().unwrap_or_default();
            return Err(ProviderError::Api {
                status,
                message: api_message(&message),
            });
        }
        Ok(Some(response))
    }

    fn get_json<T: DeserializeOwned>(&self, url: &str, query: &[(&str, String)]) -> ProviderResult<T> {
        let response = self
            .get(url, query, JSON_MEDIA_TYPE)?
            .ok_or_else(|| ProviderError::Api {
                status: 404,
                message: format!("Not Found: {}", url),
            })?;
        response
            .into_body()
            .read_json()
            .map_err(|e| ProviderError::Parse(e.to_string()))
    }

    /// Follow `Link: rel="next"` up to [`MAX_PAGES`] pages
    fn get_paged<T: DeserializeOwned>(
        &self,
        url: &str,
        query: Vec<(&str, String)>,
    ) -> ProviderResult<Vec<T>> {
        let mut items = Vec::new();
        let mut next = Some((url.to_string(), query));

        for _ in 0..MAX_PAGES {
            let Some((page_url, page_query)) = next.take() else {
                break;
            };
            let Some(response) = self.get(&page_url, &page_query, JSON_MEDIA_TYPE)? else {
                break;
            };
            let link = response
                .headers()
                .get("link")
                .and_then(|v| v.to_str().ok())
                .and_then(next_page_url);
            let page: Vec<T> = response
                .into_body()
                .read_json()
                .map_err(|e| ProviderError::Parse(e.to_string()))?;
            items.extend(page);
            // The next link already carries the query string
            next = link.map(|url| (url, Vec::new()));
        }

        Ok(items)
    }
}

/// Pull the `message` field out of a GitHub error body when there is one
fn api_message(body: &str) -> String {
    #[derive(Deserialize)]
    struct ApiErrorBody {
        message: String,
    }
    serde_json::from_str::<ApiErrorBody>(body)
        .map(|b| b.message)
        .unwrap_or_else(|_| body.trim().to_string())
}

/// Extract the `rel="next"` target from a Link header
fn next_page_url(header: &str) -> Option<String> {
    header.split(',').find_map(|part| {
        let (target, params) = part.split_once(';')?;
        params
            .split(';')
            .any(|p| p.trim() == r#"rel="next""#)
            .then(|| {
                target
                    .trim()
                    .trim_start_matches('<')
                    .trim_end_matches('>')
                    .to_string()
            })
    })
}

fn timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

impl MetadataProvider for GithubClient {
    fn basic_info(&self, id: &RepositoryId) -> ProviderResult<BasicInfo> {
        let repo: RepoResponse = self.get_json(&self.repo_url(id, ""), &[])?;
        Ok(repo.into())
    }

    fn commits(&self, id: &RepositoryId, since: DateTime<Utc>) -> ProviderResult<Vec<CommitRecord>> {
        let commits: Vec<CommitResponse> = self.get_paged(
            &self.repo_url(id, "/commits"),
            vec![
                ("since", timestamp(since)),
                ("per_page", PAGE_SIZE.to_string()),
            ],
        )?;
        Ok(commits.into_iter().filter_map(CommitResponse::into_record).collect())
    }

    fn issues(&self, id: &RepositoryId, since: DateTime<Utc>) -> ProviderResult<Vec<IssueRecord>> {
        let issues: Vec<IssueResponse> = self.get_paged(
            &self.repo_url(id, "/issues"),
            vec![
                ("state", "all".to_string()),
                ("since", timestamp(since)),
                ("per_page", PAGE_SIZE.to_string()),
            ],
        )?;
        Ok(issues.into_iter().map(IssueRecord::from).collect())
    }

    fn releases(&self, id: &RepositoryId) -> ProviderResult<Vec<ReleaseRecord>> {
        // A single page: only the most recent releases are ever used
        let releases: Vec<ReleaseResponse> = self.get_json(
            &self.repo_url(id, "/releases"),
            &[("per_page", RELEASE_PAGE_SIZE.to_string())],
        )?;
        Ok(releases.into_iter().map(ReleaseRecord::from).collect())
    }

    fn contributors(&self, id: &RepositoryId) -> ProviderResult<Vec<ContributorRecord>> {
        let contributors: Vec<ContributorResponse> = self.get_paged(
            &self.repo_url(id, "/contributors"),
            vec![("per_page", PAGE_SIZE.to_string())],
        )?;
        Ok(contributors
            .into_iter()
            .filter_map(ContributorResponse::into_record)
            .collect())
    }

    fn file_paths(&self, id: &RepositoryId, branch: &str) -> ProviderResult<Vec<String>> {
        if branch.is_empty() {
            return Err(ProviderError::MissingDefaultBranch(id.full_name()));
        }
        let tree: TreeResponse = self.get_json(
            &self.repo_url(id, &format!("/git/trees/{}", branch)),
            &[("recursive", "1".to_string())],
        )?;
        if tree.truncated {
            debug!("Tree listing for {} was truncated by the API", id);
        }
        Ok(tree.blob_paths())
    }

    fn languages(&self, id: &RepositoryId) -> ProviderResult<BTreeMap<String, u64>> {
        self.get_json(&self.repo_url(id, "/languages"), &[])
    }

    fn root_entries(&self, id: &RepositoryId) -> ProviderResult<Vec<String>> {
        let Some(response) = self.get(&self.repo_url(id, "/contents"), &[], JSON_MEDIA_TYPE)? else {
            // Empty repositories have no contents
            return Ok(Vec::new());
        };
        let entries: Vec<ContentEntry> = response
            .into_body()
            .read_json()
            .map_err(|e| ProviderError::Parse(e.to_string()))?;
        Ok(entries.into_iter().map(|e| e.name).collect())
    }

    fn file_content(&self, id: &RepositoryId, path: &str) -> ProviderResult<Option<String>> {
        let url = self.repo_url(id, &format!("/contents/{}", path));
        match self.get(&url, &[], RAW_MEDIA_TYPE)? {
            Some(response) => response
                .into_body()
                .read_to_string()
                .map(Some)
                .map_err(|e| ProviderError::Parse(e.to_string())),
            None => Ok(None),
        }
    }

    fn rate_limit(&self) -> ProviderResult<Option<RateLimit>> {
        // GitHub Enterprise instances may have rate limiting disabled
        let Some(response) = self.get(&format!("{}/rate_limit", self.api_url), &[], JSON_MEDIA_TYPE)?
        else {
            return Ok(None);
        };
        let body: RateLimitResponse = response
            .into_body()
            .read_json()
            .map_err(|e| ProviderError::Parse(e.to_string()))?;
        Ok(Some(body.rate.into()))
    }
}

// GitHub API types

#[derive(Debug, Deserialize)]
struct RepoResponse {
    name: String,
    full_name: String,
    description: Option<String>,
    #[serde(default)]
    stargazers_count: u64,
    #[serde(default)]
    forks_count: u64,
    #[serde(default)]
    watchers_count: u64,
    #[serde(default)]
    open_issues_count: u64,
    license: Option<LicenseResponse>,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
    pushed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    size: u64,
    #[serde(default)]
    default_branch: String,
    #[serde(default)]
    private: bool,
    #[serde(default)]
    fork: bool,
    #[serde(default)]
    has_issues: bool,
    #[serde(default)]
    has_wiki: bool,
    #[serde(default)]
    has_projects: bool,
    #[serde(default)]
    has_pages: bool,
    #[serde(default)]
    has_downloads: bool,
}

#[derive(Debug, Deserialize)]
struct LicenseResponse {
    name: Option<String>,
}

impl From<RepoResponse> for BasicInfo {
    fn from(repo: RepoResponse) -> Self {
        BasicInfo {
            name: repo.name,
            full_name: repo.full_name,
            description: repo.description,
            stars: repo.stargazers_count,
            forks: repo.forks_count,
            watchers: repo.watchers_count,
            open_issues: repo.open_issues_count,
            license: repo.license.and_then(|l| l.name),
            created_at: repo.created_at,
            updated_at: repo.updated_at,
            pushed_at: repo.pushed_at,
            size: repo.size,
            default_branch: repo.default_branch,
            is_private: repo.private,
            is_fork: repo.fork,
            has_issues: repo.has_issues,
            has_wiki: repo.has_wiki,
            has_projects: repo.has_projects,
            has_pages: repo.has_pages,
            has_downloads: repo.has_downloads,
        }
    }
}

#[derive(Debug, Deserialize)]
struct CommitResponse {
    commit: CommitDetail,
    author: Option<UserResponse>,
}

#[derive(Debug, Deserialize)]
struct CommitDetail {
    author: Option<GitAuthor>,
}

#[derive(Debug, Deserialize)]
struct GitAuthor {
    #[serde(default)]
    name: String,
    date: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct UserResponse {
    login: String,
}

impl CommitResponse {
    /// Commits without an author timestamp cannot be placed in the window
    fn into_record(self) -> Option<CommitRecord> {
        let author = self.commit.author?;
        Some(CommitRecord {
            login: self.author.map(|u| u.login),
            author_name: author.name,
            authored_at: author.date?,
        })
    }
}

#[derive(Debug, Deserialize)]
struct IssueResponse {
    state: ItemState,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[serde(default)]
    comments: u32,
    pull_request: Option<PullRequestMarker>,
}

impl From<IssueResponse> for IssueRecord {
    fn from(issue: IssueResponse) -> Self {
        IssueRecord {
            state: issue.state,
            created_at: issue.created_at,
            updated_at: issue.updated_at,
            comments: issue.comments,
            pull_request: issue.pull_request,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ReleaseResponse {
    name: Option<String>,
    tag_name: String,
    published_at: Option<DateTime<Utc>>,
}

impl From<ReleaseResponse> for ReleaseRecord {
    fn from(release: ReleaseResponse) -> Self {
        ReleaseRecord {
            name: release.name.filter(|n| !n.is_empty()),
            tag_name: release.tag_name,
            published_at: release.published_at,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ContributorResponse {
    login: Option<String>,
    #[serde(default)]
    contributions: u64,
}

impl ContributorResponse {
    /// Anonymous entries carry no login and are skipped
    fn into_record(self) -> Option<ContributorRecord> {
        Some(ContributorRecord {
            login: self.login?,
            contributions: self.contributions,
        })
    }
}

#[derive(Debug, Deserialize)]
struct TreeResponse {
    #[serde(default)]
    tree: Vec<TreeEntry>,
    #[serde(default)]
    truncated: bool,
}

#[derive(Debug, Deserialize)]
struct TreeEntry {
    path: String,
    #[serde(rename = "type")]
    entry_type: String,
}

impl TreeResponse {
    fn blob_paths(self) -> Vec<String> {
        self.tree
            .into_iter()
            .filter(|e| e.entry_type == "blob")
            .map(|e| e.path)
            .collect()
    }
}

#[derive(Debug, Deserialize)]
struct ContentEntry {
    name: String,
}

#[derive(Debug, Deserialize)]
struct RateLimitResponse {
    rate: RateResponse,
}

#[derive(Debug, Deserialize)]
struct RateResponse {
    limit: u64,
    remaining: u64,
    reset: Option<i64>,
}

impl From<RateResponse> for RateLimit {
    fn from(rate: RateResponse) -> Self {
        RateLimit {
            limit: rate.limit,
            remaining: rate.remaining,
            reset_at: rate.reset.and_then(|secs| DateTime::from_timestamp(secs, 0)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_response_conversion() {
        let json = r#"{
            "name": "cargo",
            "full_name": "rust-lang/cargo",
            "description": "The Rust package manager",
            "stargazers_count": 12000,
            "forks_count": 2300,
            "watchers_count": 12000,
            "open_issues_count": 1400,
            "license": {"key": "apache-2.0", "name": "Apache License 2.0"},
            "created_at": "2014-03-03T19:51:02Z",
            "updated_at": "2024-06-01T10:00:00Z",
            "pushed_at": "2024-06-01T09:00:00Z",
            "size": 98000,
            "default_branch": "master",
            "private": false,
            "fork": false,
            "has_issues": true,
            "has_wiki": false,
            "has_projects": true,
            "has_pages": false,
            "has_downloads": true
        }"#;
        let repo: RepoResponse = serde_json::from_str(json).expect("parse repo");
        let info = BasicInfo::from(repo);
        assert_eq!(info.full_name, "rust-lang/cargo");
        assert_eq!(info.stars, 12000);
        assert_eq!(info.license.as_deref(), Some("Apache License 2.0"));
        assert!(info.has_license());
        assert_eq!(info.default_branch, "master");
        assert!(info.has_issues);
        assert!(info.pushed_at.is_some());
    }

    #[test]
    fn test_repo_without_license() {
        let json = r#"{"name": "x", "full_name": "o/x", "description": null, "license": null}"#;
        let info = BasicInfo::from(serde_json::from_str::<RepoResponse>(json).expect("parse"));
        assert!(!info.has_license());
        assert_eq!(info.pushed_at, None);
    }

    #[test]
    fn test_commit_conversion() {
        let json = r#"[
            {"commit": {"author": {"name": "Jane", "date": "2024-05-01T12:00:00Z"}}, "author": {"login": "jane"}},
            {"commit": {"author": {"name": "Ghost", "date": "2024-05-02T12:00:00Z"}}, "author": null},
            {"commit": {"author": null}, "author": null}
        ]"#;
        let commits: Vec<CommitResponse> = serde_json::from_str(json).expect("parse commits");
        let records: Vec<CommitRecord> = commits
            .into_iter()
            .filter_map(CommitResponse::into_record)
            .collect();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].identity(), "jane");
        assert_eq!(records[1].identity(), "Ghost");
    }

    #[test]
    fn test_issue_conversion_keeps_pr_marker() {
        let json = r#"[
            {"state": "closed", "created_at": "2024-05-01T00:00:00Z", "updated_at": "2024-05-02T00:00:00Z", "comments": 3},
            {"state": "open", "created_at": "2024-05-01T00:00:00Z", "updated_at": "2024-05-03T00:00:00Z", "comments": 0,
             "pull_request": {"url": "https://api.github.com/x", "merged_at": null}}
        ]"#;
        let issues: Vec<IssueResponse> = serde_json::from_str(json).expect("parse issues");
        let records: Vec<IssueRecord> = issues.into_iter().map(IssueRecord::from).collect();
        assert!(records[0].is_closed());
        assert!(!records[0].is_pull_request());
        assert_eq!(records[0].comments, 3);
        assert!(records[1].is_pull_request());
    }

    #[test]
    fn test_tree_keeps_blobs_only() {
        let json = r#"{"tree": [
            {"path": "src", "type": "tree"},
            {"path": "src/main.rs", "type": "blob"},
            {"path": "vendor/lib", "type": "commit"},
            {"path": "README.md", "type": "blob"}
        ], "truncated": false}"#;
        let tree: TreeResponse = serde_json::from_str(json).expect("parse tree");
        assert_eq!(tree.blob_paths(), vec!["src/main.rs", "README.md"]);
    }

    #[test]
    fn test_anonymous_contributors_skipped() {
        let json = r#"[{"login": "a", "contributions": 5}, {"name": "anon", "contributions": 2, "type": "Anonymous"}]"#;
        let list: Vec<ContributorResponse> = serde_json::from_str(json).expect("parse contributors");
        let records: Vec<_> = list.into_iter().filter_map(ContributorResponse::into_record).collect();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].login, "a");
    }

    #[test]
    fn test_next_page_url() {
        let header = r#"<https://api.github.com/repositories/1/commits?page=2>; rel="next", <https://api.github.com/repositories/1/commits?page=9>; rel="last""#;
        assert_eq!(
            next_page_url(header).as_deref(),
            Some("https://api.github.com/repositories/1/commits?page=2")
        );
        let last = r#"<https://api.github.com/repositories/1/commits?page=1>; rel="prev""#;
        assert_eq!(next_page_url(last), None);
    }

    #[test]
    fn test_api_message() {
        assert_eq!(
            api_message(r#"{"message": "API rate limit exceeded", "documentation_url": "x"}"#),
            "API rate limit exceeded"
        );
        assert_eq!(api_message("  plain text "), "plain text");
    }

    #[test]
    fn test_rate_limit_conversion() {
        let json = r#"{"rate": {"limit": 60, "remaining": 12, "reset": 1717200000}}"#;
        let response: RateLimitResponse = serde_json::from_str(json).expect("parse rate");
        let rate = RateLimit::from(response.rate);
        assert_eq!(rate.remaining, 12);
        assert!(rate.reset_at.is_some());
    }

    #[test]
    fn test_client_settings() {
        let settings = GithubSettings {
            token: Some("   ".to_string()),
            api_url: "https://ghe.example.com/api/v3/".to_string(),
            ..Default::default()
        };
        let client = GithubClient::new(&settings);
        assert!(!client.is_authenticated());
        assert_eq!(
            client.repo_url(&RepositoryId::new("o", "r"), "/languages"),
            "https://ghe.example.com/api/v3/repos/o/r/languages"
        );
    }
}
