//! Category scorer
//!
//! Each category is computed by a two-arm function: the primary formula when
//! its signal block is [`Signal::Present`], the fallback formula when it is
//! [`Signal::Absent`]. Both arms are plain functions and tested separately.

use crate::models::BasicInfo;
use crate::signals::{ActivityMetrics, CodeQualityMetrics, ContributorMetrics, TechStackMetrics};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const MAX_POPULARITY: u32 = 20;
pub const MAX_ACTIVITY: u32 = 25;
pub const MAX_MAINTENANCE: u32 = 20;
pub const MAX_COMMUNITY: u32 = 20;
pub const MAX_QUALITY: u32 = 15;
pub const MAX_HEALTH: u32 = 100;

const STAR_TIERS: &[(u64, u32)] = &[
    (10_000, 20),
    (5_000, 18),
    (1_000, 15),
    (500, 12),
    (100, 9),
    (50, 6),
    (10, 3),
];

/// Upper bounds in days since the last push
const PUSH_RECENCY_TIERS: &[(i64, u32)] = &[(7, 25), (30, 20), (90, 15), (180, 10)];
/// Activity fallback never drops below this
const STALE_PUSH_POINTS: u32 = 5;

const FORK_TIERS: &[(u64, u32)] = &[(1_000, 20), (500, 15), (100, 10), (50, 5)];
const CONTRIBUTOR_COUNT_TIERS: &[(usize, u32)] = &[(50, 8), (20, 6), (10, 4), (5, 2)];
const ACTIVE_CONTRIBUTOR_TIERS: &[(usize, u32)] = &[(5, 6), (3, 4), (1, 2)];
const HEALTHY_DISTRIBUTION_POINTS: u32 = 6;

const MAINTENANCE_POINTS: u32 = 5;
const OPEN_ISSUE_LIMIT: u64 = 50;
const MAINTENANCE_RATE_THRESHOLD: f64 = 60.0;

const ACTIVITY_WEIGHT: f64 = 0.25;
const QUALITY_WEIGHT: f64 = 0.15;
const QUALITY_FALLBACK_POINTS: u32 = 5;

/// A signal block that may or may not have been extracted
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Signal<T> {
    Present(T),
    Absent,
}

impl<T> From<Option<T>> for Signal<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Signal::Present(v),
            None => Signal::Absent,
        }
    }
}

/// Which formula produced a category score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreSource {
    Primary,
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryScore {
    pub score: u32,
    pub max_score: u32,
    pub source: ScoreSource,
}

impl CategoryScore {
    fn new(score: u32, max_score: u32, source: ScoreSource) -> Self {
        Self {
            score: score.min(max_score),
            max_score,
            source,
        }
    }

    fn primary(score: u32, max_score: u32) -> Self {
        Self::new(score, max_score, ScoreSource::Primary)
    }

    fn fallback(score: u32, max_score: u32) -> Self {
        Self::new(score, max_score, ScoreSource::Fallback)
    }
}

/// Per-category scores, each next to its fixed maximum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub popularity: CategoryScore,
    pub activity: CategoryScore,
    pub maintenance: CategoryScore,
    pub community: CategoryScore,
    pub quality: CategoryScore,
}

impl ScoreBreakdown {
    /// Final health score, 0-100
    pub fn total(&self) -> u32 {
        self.categories()
            .iter()
            .map(|(_, c)| c.score)
            .sum::<u32>()
            .min(MAX_HEALTH)
    }

    pub fn categories(&self) -> [(&'static str, CategoryScore); 5] {
        [
            ("Popularity", self.popularity),
            ("Activity", self.activity),
            ("Maintenance", self.maintenance),
            ("Community", self.community),
            ("Quality", self.quality),
        ]
    }
}

/// Letter grade for display
pub fn grade(score: u32) -> &'static str {
    match score {
        s if s >= 90 => "A",
        s if s >= 80 => "B",
        s if s >= 70 => "C",
        s if s >= 60 => "D",
        _ => "F",
    }
}

/// Everything the scorer reads
#[derive(Debug, Clone, Copy)]
pub struct HealthInputs<'a> {
    pub basic: &'a BasicInfo,
    pub tech_stack: &'a TechStackMetrics,
    pub code_quality: Signal<&'a CodeQualityMetrics>,
    pub contributors: Signal<&'a ContributorMetrics>,
    pub activity: Signal<&'a ActivityMetrics>,
}

/// Health scorer over one repository's signals
pub struct HealthScorer<'a> {
    inputs: HealthInputs<'a>,
    now: DateTime<Utc>,
}

impl<'a> HealthScorer<'a> {
    /// `now` anchors the days-since-push fallback
    pub fn new(inputs: HealthInputs<'a>, now: DateTime<Utc>) -> Self {
        Self { inputs, now }
    }

    /// Calculate every category score
    pub fn calculate(&self) -> ScoreBreakdown {
        let basic = self.inputs.basic;

        ScoreBreakdown {
            popularity: popularity_score(basic.stars),
            activity: activity_score(self.inputs.activity, basic.days_since_push(self.now)),
            maintenance: maintenance_score(basic, self.inputs.activity),
            community: community_score(self.inputs.contributors, basic.forks),
            quality: quality_score(self.inputs.code_quality, basic, self.inputs.tech_stack),
        }
    }

    /// Generate human-readable explanation of the score
    pub fn explain(&self, breakdown: &ScoreBreakdown) -> String {
        let total = breakdown.total();
        let mut lines = Vec::new();

        lines.push(format!("# Health Score: {} / 100 ({})\n", total, grade(total)));
        lines.push("## Categories\n".to_string());
        for (name, category) in breakdown.categories() {
            let source = match category.source {
                ScoreSource::Primary => "",
                ScoreSource::Fallback => " (fallback)",
            };
            lines.push(format!(
                "- **{}**: {} / {}{}",
                name, category.score, category.max_score, source
            ));
        }
        lines.push(String::new());

        lines.push("## Inputs\n".to_string());
        let basic = self.inputs.basic;
        lines.push(format!("- Stars: {}, forks: {}", basic.stars, basic.forks));
        lines.push(format!(
            "- Open issues: {} (issue tracking {})",
            basic.open_issues,
            if basic.has_issues { "enabled" } else { "disabled" }
        ));
        match self.inputs.activity {
            Signal::Present(a) => lines.push(format!(
                "- Activity score {} (close rate {:.2}%, merge rate {:.2}%)",
                a.activity_score,
                a.close_rate(),
                a.merge_rate()
            )),
            Signal::Absent => match basic.days_since_push(self.now) {
                Some(days) => lines.push(format!("- Last push {} days ago", days)),
                None => lines.push("- Never pushed".to_string()),
            },
        }
        match self.inputs.contributors {
            Signal::Present(c) => lines.push(format!(
                "- Contributors: {} total, {} active, concentration {:.2}%",
                c.total_contributors,
                c.active_contributors(),
                c.diversity.contributor_concentration
            )),
            Signal::Absent => lines.push("- Contributor insights not collected".to_string()),
        }
        match self.inputs.code_quality {
            Signal::Present(q) => lines.push(format!("- Code quality score {}", q.score)),
            Signal::Absent => lines.push(format!(
                "- License: {}, CI tools: {}, build tools: {}",
                if basic.has_license() { "yes" } else { "no" },
                self.inputs.tech_stack.ci_tools.len(),
                self.inputs.tech_stack.build_tools.len()
            )),
        }

        lines.join("\n")
    }
}

fn tier<T: PartialOrd + Copy>(value: T, tiers: &[(T, u32)]) -> u32 {
    tiers
        .iter()
        .find(|(threshold, _)| value >= *threshold)
        .map_or(0, |(_, points)| *points)
}

fn weighted(score: u32, weight: f64) -> u32 {
    (f64::from(score) * weight).round() as u32
}

pub(crate) fn popularity_score(stars: u64) -> CategoryScore {
    CategoryScore::primary(tier(stars, STAR_TIERS), MAX_POPULARITY)
}

pub(crate) fn activity_score(
    activity: Signal<&ActivityMetrics>,
    days_since_push: Option<i64>,
) -> CategoryScore {
    match activity {
        Signal::Present(metrics) => activity_primary(metrics.activity_score),
        Signal::Absent => activity_fallback(days_since_push),
    }
}

pub(crate) fn activity_primary(activity_score: u32) -> CategoryScore {
    CategoryScore::primary(weighted(activity_score, ACTIVITY_WEIGHT), MAX_ACTIVITY)
}

pub(crate) fn activity_fallback(days_since_push: Option<i64>) -> CategoryScore {
    let points = days_since_push
        .and_then(|days| {
            PUSH_RECENCY_TIERS
                .iter()
                .find(|(limit, _)| days <= *limit)
                .map(|(_, points)| *points)
        })
        .unwrap_or(STALE_PUSH_POINTS);
    CategoryScore::fallback(points, MAX_ACTIVITY)
}

pub(crate) fn maintenance_score(
    basic: &BasicInfo,
    activity: Signal<&ActivityMetrics>,
) -> CategoryScore {
    let mut points = 0;
    if basic.has_issues {
        points += MAINTENANCE_POINTS;
    }
    if basic.open_issues < OPEN_ISSUE_LIMIT {
        points += MAINTENANCE_POINTS;
    }

    match activity {
        Signal::Present(metrics) => {
            if metrics.close_rate() > MAINTENANCE_RATE_THRESHOLD {
                points += MAINTENANCE_POINTS;
            }
            if metrics.merge_rate() > MAINTENANCE_RATE_THRESHOLD {
                points += MAINTENANCE_POINTS;
            }
            CategoryScore::primary(points, MAX_MAINTENANCE)
        }
        // Rate terms contribute nothing without activity metrics
        Signal::Absent => CategoryScore::fallback(points, MAX_MAINTENANCE),
    }
}

pub(crate) fn community_score(
    contributors: Signal<&ContributorMetrics>,
    forks: u64,
) -> CategoryScore {
    match contributors {
        Signal::Present(metrics) => community_primary(metrics),
        Signal::Absent => community_fallback(forks),
    }
}

pub(crate) fn community_primary(metrics: &ContributorMetrics) -> CategoryScore {
    let mut points = tier(metrics.total_contributors, CONTRIBUTOR_COUNT_TIERS);
    if metrics.diversity.is_healthy_distribution {
        points += HEALTHY_DISTRIBUTION_POINTS;
    }
    points += tier(metrics.active_contributors(), ACTIVE_CONTRIBUTOR_TIERS);
    CategoryScore::primary(points, MAX_COMMUNITY)
}

pub(crate) fn community_fallback(forks: u64) -> CategoryScore {
    CategoryScore::fallback(tier(forks, FORK_TIERS), MAX_COMMUNITY)
}

pub(crate) fn quality_score(
    code_quality: Signal<&CodeQualityMetrics>,
    basic: &BasicInfo,
    tech_stack: &TechStackMetrics,
) -> CategoryScore {
    match code_quality {
        Signal::Present(metrics) => quality_primary(metrics.score),
        Signal::Absent => quality_fallback(basic, tech_stack),
    }
}

pub(crate) fn quality_primary(code_quality_score: u32) -> CategoryScore {
    CategoryScore::primary(weighted(code_quality_score, QUALITY_WEIGHT), MAX_QUALITY)
}

pub(crate) fn quality_fallback(basic: &BasicInfo, tech_stack: &TechStackMetrics) -> CategoryScore {
    let points = [
        basic.has_license(),
        !tech_stack.ci_tools.is_empty(),
        !tech_stack.build_tools.is_empty(),
    ]
    .iter()
    .filter(|present| **present)
    .count() as u32
        * QUALITY_FALLBACK_POINTS;
    CategoryScore::fallback(points, MAX_QUALITY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AnalysisWindow, ContributorRecord};
    use crate::signals::{extract_activity, extract_code_quality, extract_contributors, extract_tech_stack};
    use chrono::{Duration, TimeZone};
    use std::collections::BTreeMap;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 30, 0, 0, 0).unwrap()
    }

    fn tech(root: &[&str]) -> TechStackMetrics {
        let names: Vec<String> = root.iter().map(|n| n.to_string()).collect();
        extract_tech_stack(&BTreeMap::new(), &names, None)
    }

    fn contributors(counts: &[u64]) -> ContributorMetrics {
        let list: Vec<ContributorRecord> = counts
            .iter()
            .enumerate()
            .map(|(i, &c)| ContributorRecord {
                login: format!("dev{i}"),
                contributions: c,
            })
            .collect();
        extract_contributors(&list, &[], &AnalysisWindow::ending_at(now(), 90))
    }

    #[test]
    fn test_popularity_ladder() {
        assert_eq!(popularity_score(0).score, 0);
        assert_eq!(popularity_score(9).score, 0);
        assert_eq!(popularity_score(10).score, 3);
        assert_eq!(popularity_score(50).score, 6);
        assert_eq!(popularity_score(100).score, 9);
        assert_eq!(popularity_score(999).score, 12);
        assert_eq!(popularity_score(1_000).score, 15);
        assert_eq!(popularity_score(5_000).score, 18);
        assert_eq!(popularity_score(250_000).score, 20);
    }

    #[test]
    fn test_activity_fallback_never_zero() {
        assert_eq!(activity_fallback(Some(0)).score, 25);
        assert_eq!(activity_fallback(Some(7)).score, 25);
        assert_eq!(activity_fallback(Some(8)).score, 20);
        assert_eq!(activity_fallback(Some(90)).score, 15);
        assert_eq!(activity_fallback(Some(180)).score, 10);
        assert_eq!(activity_fallback(Some(5_000)).score, 5);
        assert_eq!(activity_fallback(None).score, 5);
        assert_eq!(activity_fallback(Some(3)).source, ScoreSource::Fallback);
    }

    #[test]
    fn test_activity_primary_can_be_zero() {
        assert_eq!(activity_primary(0).score, 0);
        assert_eq!(activity_primary(100).score, 25);
        // 0.25 * 50 = 12.5 rounds up
        assert_eq!(activity_primary(50).score, 13);
        assert_eq!(activity_primary(50).source, ScoreSource::Primary);
    }

    #[test]
    fn test_maintenance_without_activity() {
        let basic = BasicInfo {
            has_issues: true,
            open_issues: 12,
            ..Default::default()
        };
        let score = maintenance_score(&basic, Signal::Absent);
        assert_eq!(score.score, 10);
        assert_eq!(score.source, ScoreSource::Fallback);

        let busy = BasicInfo {
            has_issues: false,
            open_issues: 50,
            ..Default::default()
        };
        assert_eq!(maintenance_score(&busy, Signal::Absent).score, 0);
    }

    #[test]
    fn test_maintenance_rate_terms_are_strict() {
        let window = AnalysisWindow::ending_at(now(), 90);
        let activity = extract_activity(&[], &[], &[], &window);
        let basic = BasicInfo {
            has_issues: true,
            ..Default::default()
        };
        // 0% rates: only the basic terms apply
        assert_eq!(maintenance_score(&basic, Signal::Present(&activity)).score, 10);

        let mut busy = activity.clone();
        busy.issues.close_rate = 60.0;
        busy.pull_requests.merge_rate = 60.01;
        assert_eq!(maintenance_score(&basic, Signal::Present(&busy)).score, 15);
    }

    #[test]
    fn test_community_primary_tiers() {
        // 60 equal contributors: healthy, none active in window
        let metrics = contributors(&[5; 60]);
        let score = community_primary(&metrics);
        assert_eq!(score.score, 8 + 6);

        let solo = contributors(&[100]);
        assert!(!solo.diversity.is_healthy_distribution);
        assert_eq!(community_primary(&solo).score, 0);
    }

    #[test]
    fn test_community_fallback_forks() {
        assert_eq!(community_fallback(0).score, 0);
        assert_eq!(community_fallback(50).score, 5);
        assert_eq!(community_fallback(100).score, 10);
        assert_eq!(community_fallback(500).score, 15);
        assert_eq!(community_fallback(1_000).score, 20);
    }

    #[test]
    fn test_quality_fallback() {
        let licensed = BasicInfo {
            license: Some("MIT License".to_string()),
            ..Default::default()
        };
        let full = quality_fallback(&licensed, &tech(&[".github", "Makefile"]));
        assert_eq!(full.score, 15);
        assert_eq!(full.source, ScoreSource::Fallback);

        let bare = quality_fallback(&BasicInfo::default(), &tech(&[]));
        assert_eq!(bare.score, 0);
    }

    #[test]
    fn test_quality_primary() {
        assert_eq!(quality_primary(100).score, 15);
        assert_eq!(quality_primary(55).score, 8);
        assert_eq!(quality_primary(0).score, 0);
    }

    #[test]
    fn test_popular_repo_with_only_fallbacks() {
        let basic = BasicInfo {
            stars: 10_000,
            forks: 600,
            open_issues: 120,
            has_issues: true,
            license: Some("Apache License 2.0".to_string()),
            pushed_at: Some(now() - Duration::days(3)),
            ..Default::default()
        };
        let tech_stack = tech(&[".travis.yml"]);
        let inputs = HealthInputs {
            basic: &basic,
            tech_stack: &tech_stack,
            code_quality: Signal::Absent,
            contributors: Signal::Absent,
            activity: Signal::Absent,
        };
        let breakdown = HealthScorer::new(inputs, now()).calculate();

        assert_eq!(breakdown.popularity.score, 20);
        assert_eq!(breakdown.activity.score, 25);
        assert_eq!(breakdown.activity.source, ScoreSource::Fallback);
        assert_eq!(breakdown.maintenance.score, 5);
        assert_eq!(breakdown.community.score, 15);
        assert_eq!(breakdown.quality.score, 10);
        assert_eq!(breakdown.total(), 20 + 25 + 5 + 15 + 10);
    }

    #[test]
    fn test_primary_paths_and_idempotence() {
        let basic = BasicInfo {
            stars: 120,
            has_issues: true,
            open_issues: 3,
            ..Default::default()
        };
        let tech_stack = tech(&[]);
        let quality = extract_code_quality(&[
            "README.md".to_string(),
            "LICENSE".to_string(),
            "src/main.rs".to_string(),
        ]);
        let people = contributors(&[10, 10, 10, 10, 10, 10]);
        let activity = extract_activity(&[], &[], &[], &AnalysisWindow::ending_at(now(), 90));

        let inputs = HealthInputs {
            basic: &basic,
            tech_stack: &tech_stack,
            code_quality: Signal::Present(&quality),
            contributors: Signal::Present(&people),
            activity: Signal::Present(&activity),
        };
        let scorer = HealthScorer::new(inputs, now());
        let first = scorer.calculate();
        let second = scorer.calculate();
        assert_eq!(first, second);

        assert_eq!(first.popularity.score, 9);
        assert_eq!(first.activity.score, 0);
        assert_eq!(first.activity.source, ScoreSource::Primary);
        assert_eq!(first.maintenance.score, 10);
        // 6 contributors: 2 for count, concentration 100% so no distribution points
        assert_eq!(first.community.score, 2);
        // docs 50 -> 15, tests 0 -> quality score round(15) = 15 -> 2
        assert_eq!(quality.score, 15);
        assert_eq!(first.quality.score, 2);
        assert_eq!(first.total(), 9 + 10 + 2 + 2);
    }

    #[test]
    fn test_scores_respect_maximums() {
        for stars in [0, 10, 1_000_000] {
            let s = popularity_score(stars);
            assert!(s.score <= s.max_score);
        }
        for days in [None, Some(0), Some(10_000)] {
            let s = activity_fallback(days);
            assert!(s.score <= MAX_ACTIVITY && s.score >= STALE_PUSH_POINTS);
        }
        for value in [0, 50, 100, 400] {
            assert!(activity_primary(value).score <= MAX_ACTIVITY);
            assert!(quality_primary(value).score <= MAX_QUALITY);
        }
    }

    #[test]
    fn test_explain_mentions_fallbacks() {
        let basic = BasicInfo::default();
        let tech_stack = tech(&[]);
        let inputs = HealthInputs {
            basic: &basic,
            tech_stack: &tech_stack,
            code_quality: Signal::Absent,
            contributors: Signal::Absent,
            activity: Signal::Absent,
        };
        let scorer = HealthScorer::new(inputs, now());
        let text = scorer.explain(&scorer.calculate());
        assert!(text.contains("# Health Score: 10 / 100 (F)"));
        assert!(text.contains("**Activity**: 5 / 25 (fallback)"));
        assert!(text.contains("Never pushed"));
    }

    #[test]
    fn test_signal_from_option() {
        let present: Signal<u32> = Some(3).into();
        assert_eq!(present, Signal::Present(3));
        let absent: Signal<u32> = None.into();
        assert_eq!(absent, Signal::Absent);
    }

    #[test]
    fn test_grade() {
        assert_eq!(grade(95), "A");
        assert_eq!(grade(80), "B");
        assert_eq!(grade(70), "C");
        assert_eq!(grade(65), "D");
        assert_eq!(grade(12), "F");
    }
}
