//! Repository identifier parsing

use super::{ProviderError, ProviderResult};
use crate::models::RepositoryId;
use regex::Regex;
use std::sync::OnceLock;

static WEB_URL: OnceLock<Regex> = OnceLock::new();
static SSH_URL: OnceLock<Regex> = OnceLock::new();
static SHORT_FORM: OnceLock<Regex> = OnceLock::new();

fn web_url() -> &'static Regex {
    WEB_URL.get_or_init(|| {
        Regex::new(r"^(?:https?://)?(?:www\.)?github\.com/([^/\s]+)/([^/\s]+)$").expect("valid regex")
    })
}

fn ssh_url() -> &'static Regex {
    SSH_URL.get_or_init(|| Regex::new(r"^git@github\.com:([^/\s]+)/([^/\s]+)$").expect("valid regex"))
}

fn short_form() -> &'static Regex {
    SHORT_FORM.get_or_init(|| {
        Regex::new(r"^([A-Za-z0-9][A-Za-z0-9-]*)/([A-Za-z0-9._-]+)$").expect("valid regex")
    })
}

/// Parse a GitHub repository URL into owner and repository name.
///
/// Accepted forms, each with an optional trailing `/` and `.git`:
/// `https://github.com/o/r`, `http://github.com/o/r`, `www.github.com/o/r`,
/// `github.com/o/r`, `git@github.com:o/r` and the short form `o/r`.
pub fn parse_github_url(input: &str) -> ProviderResult<RepositoryId> {
    let trimmed = input.trim();
    let without_slash = trimmed.strip_suffix('/').unwrap_or(trimmed);
    let clean = without_slash.strip_suffix(".git").unwrap_or(without_slash);

    [web_url(), ssh_url(), short_form()]
        .iter()
        .find_map(|pattern| pattern.captures(clean))
        .and_then(|caps| Some(RepositoryId::new(caps.get(1)?.as_str(), caps.get(2)?.as_str())))
        .filter(|id| !id.repo.is_empty() && id.repo != "." && id.repo != "..")
        .ok_or_else(|| ProviderError::InvalidUrl(input.to_string()))
}
