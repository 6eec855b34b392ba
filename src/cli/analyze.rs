//! Analyze command - score repositories through the GitHub API

use super::{effective_workers, write_report, AnalysisArgs};
use crate::config::InsightsConfig;
use crate::github::GithubClient;
use crate::pipeline::BatchAnalyzer;
use anyhow::Result;
use chrono::Utc;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

/// Run the analyze command
pub(super) fn run(
    config: &InsightsConfig,
    urls: &[String],
    token: Option<String>,
    workers: Option<usize>,
    quiet: bool,
    args: &AnalysisArgs,
) -> Result<()> {
    let mut settings = config.github.clone();
    if let Some(token) = token.filter(|t| !t.trim().is_empty()) {
        settings.token = Some(token);
    }

    let client = GithubClient::new(&settings);
    if !client.is_authenticated() && !quiet {
        eprintln!(
            "{} No GitHub token configured; unauthenticated requests are limited to 60 per hour. Set {} to raise the limit.",
            style("!").yellow().bold(),
            style("GITHUB_TOKEN").cyan()
        );
    }

    let options = args.options(config.analysis);
    let workers = effective_workers(config, workers);
    debug!("Analysis options: {:?}", options);

    let bar = if quiet {
        ProgressBar::hidden()
    } else {
        let bar = ProgressBar::new(urls.len() as u64);
        bar.set_style(bar_style());
        bar.set_message("Analyzing repositories...");
        bar
    };

    let progress = bar.clone();
    let analyzer = BatchAnalyzer::new(&client, options, workers).with_progress_callback(
        Box::new(move |url, completed, _total| {
            progress.set_position(completed as u64);
            progress.set_message(url.to_string());
        }),
    );

    let outcomes = analyzer.run(urls, Utc::now())?;
    bar.finish_and_clear();

    write_report(&outcomes, args)
}

fn bar_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .expect("valid template")
        .progress_chars("█▓▒░  ")
}
