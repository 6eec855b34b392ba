//! Text (terminal) reporter with colors

use crate::models::{AnalysisOutcome, FailedAnalysis, RepositoryInsights};
use crate::pipeline::BatchSummary;
use crate::scoring::{grade, ScoreSource};
use anyhow::Result;

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const RED: &str = "\x1b[31m";

fn grade_color(grade: &str) -> &'static str {
    match grade {
        "A" => "\x1b[32m",
        "B" => "\x1b[92m",
        "C" => "\x1b[33m",
        "D" => "\x1b[91m",
        _ => "\x1b[31m",
    }
}

/// Render outcomes as colored terminal text
pub fn render(outcomes: &[AnalysisOutcome]) -> Result<String> {
    let mut out = String::new();

    for outcome in outcomes {
        match outcome {
            AnalysisOutcome::Success(insights) => render_insights(&mut out, insights),
            AnalysisOutcome::Failure(failed) => render_failure(&mut out, failed),
        }
        out.push('\n');
    }

    let summary = BatchSummary::from_outcomes(outcomes);
    out.push_str(&format!(
        "{BOLD}Successfully analyzed {}/{} repositories{RESET}",
        summary.succeeded, summary.total
    ));
    if summary.failed > 0 {
        out.push_str(&format!(" {RED}({} failed){RESET}", summary.failed));
    }
    out.push('\n');

    Ok(out)
}

fn render_insights(out: &mut String, insights: &RepositoryInsights) {
    let g = grade(insights.health_score);
    let color = grade_color(g);

    out.push_str(&format!(
        "{BOLD}{}/{}{RESET}  {DIM}{}{RESET}\n",
        insights.owner, insights.repo, insights.url
    ));
    if let Some(description) = &insights.basic_info.description {
        out.push_str(&format!("  {DIM}{}{RESET}\n", description));
    }
    out.push_str(&format!(
        "  Health: {color}{BOLD}{}/100 ({}){RESET}\n",
        insights.health_score, g
    ));

    for (name, category) in insights.health_breakdown.categories() {
        let marker = match category.source {
            ScoreSource::Primary => String::new(),
            ScoreSource::Fallback => format!(" {DIM}(fallback){RESET}"),
        };
        out.push_str(&format!(
            "    {:<12} {:>3}/{:<3}{}\n",
            name, category.score, category.max_score, marker
        ));
    }

    let tech = &insights.tech_stack;
    out.push_str(&format!(
        "  Stars: {}  Forks: {}  Language: {}\n",
        insights.basic_info.stars, insights.basic_info.forks, tech.primary_language
    ));
    if !tech.frameworks.is_empty() {
        let names: Vec<&str> = tech.frameworks.iter().map(String::as_str).collect();
        out.push_str(&format!("  Frameworks: {}\n", names.join(", ")));
    }
    if !tech.ci_tools.is_empty() {
        let names: Vec<&str> = tech.ci_tools.iter().map(String::as_str).collect();
        out.push_str(&format!("  CI: {}\n", names.join(", ")));
    }

    if let Some(activity) = &insights.activity {
        out.push_str(&format!(
            "  Commits ({}d): {} ({}), issue close rate {:.1}%, PR merge rate {:.1}%\n",
            activity.period.days,
            activity.commits.total,
            activity.commits.trend,
            activity.issues.close_rate,
            activity.pull_requests.merge_rate
        ));
    }
    if let Some(contributors) = &insights.contributors {
        out.push_str(&format!(
            "  Contributors: {} total, {} active\n",
            contributors.total_contributors,
            contributors.active_contributors()
        ));
    }
    if let Some(quality) = &insights.code_quality {
        out.push_str(&format!("  Code quality: {}/100\n", quality.score));
    }
}

fn render_failure(out: &mut String, failed: &FailedAnalysis) {
    out.push_str(&format!("{BOLD}{}{RESET}\n", failed.url));
    out.push_str(&format!("  {RED}Failed:{RESET} {}\n", failed.error));
}
