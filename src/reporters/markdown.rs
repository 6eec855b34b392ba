//! Markdown reporter
//!
//! Generates GitHub-flavored Markdown with:
//! - Batch summary table
//! - Per-repository score breakdown
//! - Tech stack, activity and contributor highlights
//! - Failed repositories with their error

use crate::models::{AnalysisOutcome, FailedAnalysis, RepositoryInsights};
use crate::pipeline::BatchSummary;
use crate::scoring::{grade, ScoreSource};
use anyhow::Result;

/// Render outcomes as Markdown
pub fn render(outcomes: &[AnalysisOutcome]) -> Result<String> {
    let mut md = String::new();

    md.push_str(&render_header(outcomes));
    md.push_str(&render_summary(outcomes));

    for outcome in outcomes {
        if let AnalysisOutcome::Success(insights) = outcome {
            md.push_str(&render_repository(insights));
        }
    }

    let failures: Vec<&FailedAnalysis> = outcomes
        .iter()
        .filter_map(|o| match o {
            AnalysisOutcome::Failure(failed) => Some(failed),
            AnalysisOutcome::Success(_) => None,
        })
        .collect();
    if !failures.is_empty() {
        md.push_str(&render_failures(&failures));
    }

    md.push_str("---\n\n");
    md.push_str("*Generated by repo-insights*\n");

    Ok(md)
}

fn render_header(outcomes: &[AnalysisOutcome]) -> String {
    let mut md = String::new();
    md.push_str("# Repository Insights Report\n\n");

    let analyzed_at = outcomes
        .iter()
        .filter_map(|o| match o {
            AnalysisOutcome::Success(insights) => Some(insights.analyzed_at),
            AnalysisOutcome::Failure(_) => None,
        })
        .max();
    if let Some(ts) = analyzed_at {
        md.push_str(&format!(
            "**Analyzed:** {}\n\n",
            ts.format("%Y-%m-%d %H:%M:%S UTC")
        ));
    }
    md
}

fn render_summary(outcomes: &[AnalysisOutcome]) -> String {
    let summary = BatchSummary::from_outcomes(outcomes);
    let mut md = String::new();

    md.push_str("## Summary\n\n");
    md.push_str(&format!(
        "Successfully analyzed **{}/{}** repositories.\n\n",
        summary.succeeded, summary.total
    ));

    if summary.succeeded == 0 {
        return md;
    }

    md.push_str("| Repository | Health | Grade | Language | Stars |\n");
    md.push_str("|------------|-------:|:-----:|----------|------:|\n");
    for outcome in outcomes {
        if let AnalysisOutcome::Success(i) = outcome {
            md.push_str(&format!(
                "| [{}/{}]({}) | {} | {} | {} | {} |\n",
                i.owner,
                i.repo,
                i.url,
                i.health_score,
                grade(i.health_score),
                escape_cell(&i.tech_stack.primary_language),
                i.basic_info.stars
            ));
        }
    }
    md.push('\n');
    md
}

fn render_repository(insights: &RepositoryInsights) -> String {
    let mut md = String::new();

    md.push_str(&format!("## {}/{}\n\n", insights.owner, insights.repo));
    if let Some(description) = &insights.basic_info.description {
        md.push_str(&blockquote(description));
        md.push('\n');
    }
    md.push_str(&format!(
        "**Health score:** {}/100 ({})\n\n",
        insights.health_score,
        grade(insights.health_score)
    ));

    md.push_str("| Category | Score | Max | Source |\n");
    md.push_str("|----------|------:|----:|--------|\n");
    for (name, category) in insights.health_breakdown.categories() {
        let source = match category.source {
            ScoreSource::Primary => "primary",
            ScoreSource::Fallback => "fallback",
        };
        md.push_str(&format!(
            "| {} | {} | {} | {} |\n",
            name, category.score, category.max_score, source
        ));
    }
    md.push('\n');

    let tech = &insights.tech_stack;
    md.push_str("### Tech Stack\n\n");
    md.push_str(&format!("- **Primary language:** {}\n", tech.primary_language));
    if !tech.language_breakdown.is_empty() {
        let shares: Vec<String> = tech
            .language_breakdown
            .iter()
            .map(|l| format!("{} {:.1}%", l.name, l.percentage))
            .collect();
        md.push_str(&format!("- **Languages:** {}\n", shares.join(", ")));
    }
    for (label, set) in [
        ("Frameworks", &tech.frameworks),
        ("Build tools", &tech.build_tools),
        ("Package managers", &tech.package_managers),
        ("CI", &tech.ci_tools),
    ] {
        if !set.is_empty() {
            let names: Vec<&str> = set.iter().map(String::as_str).collect();
            md.push_str(&format!("- **{}:** {}\n", label, names.join(", ")));
        }
    }
    if let Some(deps) = &tech.dependencies {
        md.push_str(&format!(
            "- **Dependencies ({}):** {} production, {} development\n",
            deps.manifest, deps.production_count, deps.development_count
        ));
    }
    md.push('\n');

    if let Some(activity) = &insights.activity {
        md.push_str(&format!("### Activity (last {} days)\n\n", activity.period.days));
        md.push_str(&format!(
            "- **Commits:** {} ({:.2}/day, {})\n",
            activity.commits.total, activity.commits.average_per_day, activity.commits.trend
        ));
        md.push_str(&format!(
            "- **Issues:** {} in window, {} closed ({:.1}% close rate)\n",
            activity.issues.total, activity.issues.closed, activity.issues.close_rate
        ));
        md.push_str(&format!(
            "- **Pull requests:** {} ({:.1}% merge rate)\n",
            activity.pull_requests.total, activity.pull_requests.merge_rate
        ));
        if let Some(latest) = &activity.releases.latest_release {
            md.push_str(&format!("- **Latest release:** {}\n", latest.tag_name));
        }
        md.push('\n');
    }

    if let Some(contributors) = &insights.contributors {
        md.push_str("### Contributors\n\n");
        md.push_str(&format!(
            "- **Total:** {} ({} active in period)\n",
            contributors.total_contributors,
            contributors.active_contributors()
        ));
        md.push_str(&format!(
            "- **Top contributor share:** {:.1}%\n",
            contributors.diversity.contributor_concentration
        ));
        md.push('\n');
    }

    if let Some(quality) = &insights.code_quality {
        md.push_str("### Code Quality\n\n");
        md.push_str(&format!("- **Score:** {}/100\n", quality.score));
        md.push_str(&format!(
            "- **Documentation:** {}/100, **Testing:** {}/100\n",
            quality.documentation.documentation_score, quality.testing.testing_score
        ));
        md.push('\n');
    }

    md
}

fn render_failures(failures: &[&FailedAnalysis]) -> String {
    let mut md = String::new();
    md.push_str("## Failed Repositories\n\n");
    md.push_str("| Repository | Error |\n");
    md.push_str("|------------|-------|\n");
    for failed in failures {
        md.push_str(&format!(
            "| {} | {} |\n",
            escape_cell(&failed.url),
            escape_cell(&failed.error)
        ));
    }
    md.push('\n');
    md
}

/// Quote every line so multi-line text stays inside the blockquote
fn blockquote(text: &str) -> String {
    text.trim_end()
        .lines()
        .map(|line| format!("> {}\n", line.trim_end()))
        .collect()
}

/// Keep pipes and newlines from breaking table rows
fn escape_cell(s: &str) -> String {
    s.replace('|', "\\|").replace('\n', " ")
}
