//! Activity trends over the analysis window
//!
//! # Activity score (0-100)
//!
//! ```text
//! commits/day   ≥5: 40  ≥2: 30  ≥1: 20  ≥0.5: 10
//! close rate    ≥80: 30 ≥60: 20 ≥40: 10
//! PR rate       ≥80: 20 ≥60: 15 ≥40: 10
//! release in window: 10
//! ```
//!
//! The PR "merge rate" counts every closed pull request, merged or not.

use super::{percentage, round2};
use crate::models::{AnalysisWindow, CommitRecord, IssueRecord, ReleaseRecord};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Distinct active days needed before a trend is reported
pub const MIN_TREND_DAYS: usize = 7;
/// Daily commit map is only returned up to this many distinct days
pub const MAX_REPORTED_DAYS: usize = 30;
/// Relative change (percent) between halves that counts as a trend
const TREND_THRESHOLD: f64 = 20.0;
/// Releases considered for the cadence
const CADENCE_RELEASES: usize = 5;

const COMMIT_TIERS: &[(f64, u32)] = &[(5.0, 40), (2.0, 30), (1.0, 20), (0.5, 10)];
const CLOSE_RATE_TIERS: &[(f64, u32)] = &[(80.0, 30), (60.0, 20), (40.0, 10)];
const PR_RATE_TIERS: &[(f64, u32)] = &[(80.0, 20), (60.0, 15), (40.0, 10)];
const RECENT_RELEASE_POINTS: u32 = 10;

pub const MAX_ACTIVITY_SCORE: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CommitTrend {
    Increasing,
    Decreasing,
    Stable,
    InsufficientData,
}

impl std::fmt::Display for CommitTrend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CommitTrend::Increasing => write!(f, "increasing"),
            CommitTrend::Decreasing => write!(f, "decreasing"),
            CommitTrend::Stable => write!(f, "stable"),
            CommitTrend::InsufficientData => write!(f, "insufficient-data"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Period {
    pub days: u32,
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitActivity {
    pub total: usize,
    pub average_per_day: f64,
    pub trend: CommitTrend,
    /// Commits per UTC day; omitted when more than 30 days had commits
    pub commits_by_day: Option<BTreeMap<NaiveDate, usize>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueActivity {
    pub total: usize,
    pub open: usize,
    pub closed: usize,
    pub close_rate: f64,
    /// Mean hours from creation to last update over commented issues
    pub average_response_time_hours: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullRequestActivity {
    pub total: usize,
    pub open: usize,
    pub closed: usize,
    /// closed / total, merged or not
    pub merge_rate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseSummary {
    pub name: Option<String>,
    pub tag_name: String,
    pub published_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseActivity {
    pub total: usize,
    pub recent_count: usize,
    pub latest_release: Option<ReleaseSummary>,
    /// Mean days between the five most recent releases
    pub average_cadence_days: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityMetrics {
    pub period: Period,
    pub commits: CommitActivity,
    pub issues: IssueActivity,
    pub pull_requests: PullRequestActivity,
    pub releases: ReleaseActivity,
    /// 0-100
    pub activity_score: u32,
}

impl ActivityMetrics {
    pub fn close_rate(&self) -> f64 {
        self.issues.close_rate
    }

    pub fn merge_rate(&self) -> f64 {
        self.pull_requests.merge_rate
    }
}

/// Extract activity metrics.
///
/// Commits and issues outside `window` are ignored; `releases` is the full
/// release history and is filtered to the window only for `recent_count`.
pub fn extract_activity(
    commits: &[CommitRecord],
    issues: &[IssueRecord],
    releases: &[ReleaseRecord],
    window: &AnalysisWindow,
) -> ActivityMetrics {
    let commit_count = commits
        .iter()
        .filter(|c| window.contains(c.authored_at))
        .count();
    let commits_per_day = if window.days == 0 {
        0.0
    } else {
        commit_count as f64 / f64::from(window.days)
    };

    let by_day = commits_by_day(commits, window);
    let trend = calculate_trend(&by_day);
    let commit_activity = CommitActivity {
        total: commit_count,
        average_per_day: round2(commits_per_day),
        trend,
        commits_by_day: (by_day.len() <= MAX_REPORTED_DAYS).then_some(by_day),
    };

    let (pull_requests, true_issues): (Vec<&IssueRecord>, Vec<&IssueRecord>) = issues
        .iter()
        .filter(|i| window.contains(i.updated_at))
        .partition(|i| i.is_pull_request());

    let issue_stats = issue_activity(&true_issues);
    let pr_stats = pull_request_activity(&pull_requests);
    let release_stats = release_activity(releases, window);

    let score = activity_score(
        commits_per_day,
        issue_stats.close_rate,
        pr_stats.merge_rate,
        release_stats.recent_count > 0,
    );

    ActivityMetrics {
        period: Period {
            days: window.days,
            from: window.since,
            to: window.until,
        },
        commits: commit_activity,
        issues: issue_stats,
        pull_requests: pr_stats,
        releases: release_stats,
        activity_score: score,
    }
}

fn commits_by_day(commits: &[CommitRecord], window: &AnalysisWindow) -> BTreeMap<NaiveDate, usize> {
    let mut by_day = BTreeMap::new();
    for commit in commits.iter().filter(|c| window.contains(c.authored_at)) {
        *by_day.entry(commit.authored_at.date_naive()).or_insert(0) += 1;
    }
    by_day
}

/// Compare the mean daily count of the later half of active days to the earlier half
pub fn calculate_trend(by_day: &BTreeMap<NaiveDate, usize>) -> CommitTrend {
    if by_day.len() < MIN_TREND_DAYS {
        return CommitTrend::InsufficientData;
    }

    let counts: Vec<f64> = by_day.values().map(|&c| c as f64).collect();
    let (earlier, later) = counts.split_at(counts.len() / 2);
    let mean = |half: &[f64]| half.iter().sum::<f64>() / half.len() as f64;

    let earlier_avg = mean(earlier);
    if earlier_avg == 0.0 {
        return CommitTrend::Stable;
    }
    let change = (mean(later) - earlier_avg) / earlier_avg * 100.0;

    if change > TREND_THRESHOLD {
        CommitTrend::Increasing
    } else if change < -TREND_THRESHOLD {
        CommitTrend::Decreasing
    } else {
        CommitTrend::Stable
    }
}

fn issue_activity(issues: &[&IssueRecord]) -> IssueActivity {
    let closed = issues.iter().filter(|i| i.is_closed()).count();

    IssueActivity {
        total: issues.len(),
        open: issues.len() - closed,
        closed,
        close_rate: percentage(closed, issues.len()),
        average_response_time_hours: average_response_time(issues),
    }
}

/// Last update stands in for the first response
fn average_response_time(issues: &[&IssueRecord]) -> Option<f64> {
    let hours: Vec<f64> = issues
        .iter()
        .filter(|i| i.comments > 0)
        .map(|i| (i.updated_at - i.created_at).num_seconds() as f64 / 3600.0)
        .collect();

    if hours.is_empty() {
        return None;
    }
    Some(round2(hours.iter().sum::<f64>() / hours.len() as f64))
}

fn pull_request_activity(pull_requests: &[&IssueRecord]) -> PullRequestActivity {
    let closed = pull_requests.iter().filter(|pr| pr.is_closed()).count();

    PullRequestActivity {
        total: pull_requests.len(),
        open: pull_requests.len() - closed,
        closed,
        merge_rate: percentage(closed, pull_requests.len()),
    }
}

fn release_activity(releases: &[ReleaseRecord], window: &AnalysisWindow) -> ReleaseActivity {
    let mut published: Vec<(&ReleaseRecord, DateTime<Utc>)> = releases
        .iter()
        .filter_map(|r| r.published_at.map(|at| (r, at)))
        .collect();
    published.sort_by(|a, b| b.1.cmp(&a.1));

    let recent_count = published
        .iter()
        .filter(|(_, at)| window.contains(*at))
        .count();

    let latest = published
        .first()
        .map(|(r, _)| *r)
        .or_else(|| releases.first());

    let average_cadence_days = if releases.len() < 2 {
        None
    } else {
        let recent: Vec<DateTime<Utc>> = published
            .iter()
            .take(CADENCE_RELEASES)
            .map(|(_, at)| *at)
            .collect();
        release_cadence(&recent)
    };

    ReleaseActivity {
        total: releases.len(),
        recent_count,
        latest_release: latest.map(|r| ReleaseSummary {
            name: r.name.clone(),
            tag_name: r.tag_name.clone(),
            published_at: r.published_at,
        }),
        average_cadence_days,
    }
}

/// Mean gap in days between consecutive timestamps sorted newest first
fn release_cadence(newest_first: &[DateTime<Utc>]) -> Option<f64> {
    if newest_first.len() < 2 {
        return None;
    }
    let gaps: Vec<f64> = newest_first
        .windows(2)
        .map(|pair| (pair[0] - pair[1]).num_seconds() as f64 / 86_400.0)
        .collect();
    Some(round2(gaps.iter().sum::<f64>() / gaps.len() as f64))
}

fn tier_points(value: f64, tiers: &[(f64, u32)]) -> u32 {
    tiers
        .iter()
        .find(|(threshold, _)| value >= *threshold)
        .map_or(0, |(_, points)| *points)
}

fn activity_score(
    commits_per_day: f64,
    close_rate: f64,
    merge_rate: f64,
    has_recent_release: bool,
) -> u32 {
    let mut score = tier_points(commits_per_day, COMMIT_TIERS)
        + tier_points(close_rate, CLOSE_RATE_TIERS)
        + tier_points(merge_rate, PR_RATE_TIERS);
    if has_recent_release {
        score += RECENT_RELEASE_POINTS;
    }
    score.min(MAX_ACTIVITY_SCORE)
}
