//! CLI command definitions and handlers

mod analyze;
mod init;
mod score;

use crate::config::{
    AnalysisOptions, InsightsConfig, MAX_ANALYZE_DAYS, MAX_WORKERS, MIN_ANALYZE_DAYS,
};
use crate::models::{AnalysisOutcome, RepositoryInsights};
use crate::reporters::{self, OutputFormat};
use crate::scoring::{HealthInputs, HealthScorer};
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Parse and validate workers count (1 to MAX_WORKERS)
fn parse_workers(s: &str) -> Result<usize, String> {
    let n: usize = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;
    if n == 0 {
        Err("workers must be at least 1".to_string())
    } else if n > MAX_WORKERS {
        Err(format!("workers cannot exceed {}", MAX_WORKERS))
    } else {
        Ok(n)
    }
}

/// Parse and validate the analysis window length
fn parse_days(s: &str) -> Result<u32, String> {
    let n: u32 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;
    if !(MIN_ANALYZE_DAYS..=MAX_ANALYZE_DAYS).contains(&n) {
        Err(format!(
            "days must be between {} and {}",
            MIN_ANALYZE_DAYS, MAX_ANALYZE_DAYS
        ))
    } else {
        Ok(n)
    }
}

/// repo-insights - Explainable health scores for GitHub repositories
#[derive(Parser, Debug)]
#[command(name = "repo-insights")]
#[command(
    version,
    about = "Explainable health scores for GitHub repositories",
    long_about = "repo-insights fetches public metadata for one or more GitHub repositories \
and turns it into a 0-100 health score built from five categories: popularity, activity, \
maintenance, community and quality.\n\n\
When a signal cannot be collected (disabled extractor, API failure), the category falls \
back to a coarser estimate from basic repository data instead of scoring zero.",
    after_help = "\
Examples:
  repo-insights analyze https://github.com/rust-lang/cargo
  repo-insights analyze owner/repo other/repo --format json -o report.json
  repo-insights analyze owner/repo --days 30 --no-contributors
  repo-insights score snapshot.json --as-of 2024-06-30T00:00:00Z
  repo-insights init                   Write a repo-insights.toml with defaults

Set GITHUB_TOKEN to raise the API rate limit from 60 to 5000 requests per hour."
)]
pub struct Cli {
    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "warn", value_parser = ["error", "warn", "info", "debug", "trace"])]
    pub log_level: String,

    /// Number of repositories analyzed in parallel (1-64, default from config)
    #[arg(long, global = true, value_parser = parse_workers)]
    pub workers: Option<usize>,

    /// Directory holding repo-insights.toml (default: current directory)
    #[arg(long, global = true, default_value = ".")]
    pub config_dir: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

/// Extractor switches and report options shared by `analyze` and `score`
#[derive(Args, Debug, Clone)]
pub struct AnalysisArgs {
    /// Length of the activity window in days (1-3650, default from config)
    #[arg(long, value_parser = parse_days)]
    pub days: Option<u32>,

    /// Skip code quality analysis (quality falls back to license/CI/build signals)
    #[arg(long)]
    pub no_code_quality: bool,

    /// Skip contributor analysis (community falls back to fork count)
    #[arg(long)]
    pub no_contributors: bool,

    /// Skip activity analysis (activity falls back to days since last push)
    #[arg(long)]
    pub no_activity: bool,

    /// Output format: text, json, markdown (or md)
    #[arg(long, short = 'f', default_value = "text", value_parser = ["text", "json", "markdown", "md"])]
    pub format: String,

    /// Output file path (default: stdout)
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Print a per-repository score explanation to stderr
    #[arg(long)]
    pub explain: bool,
}

impl AnalysisArgs {
    /// Apply CLI switches on top of the configured options
    pub(crate) fn options(&self, base: AnalysisOptions) -> AnalysisOptions {
        AnalysisOptions {
            include_code_quality: base.include_code_quality && !self.no_code_quality,
            include_contributor_insights: base.include_contributor_insights
                && !self.no_contributors,
            include_activity_trends: base.include_activity_trends && !self.no_activity,
            analyze_days: self.days.unwrap_or(base.analyze_days),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze repositories through the GitHub REST API
    #[command(after_help = "\
Examples:
  repo-insights analyze https://github.com/owner/repo
  repo-insights analyze git@github.com:owner/repo.git owner/other
  repo-insights analyze --file repos.txt --format markdown -o report.md")]
    Analyze {
        /// Repository URLs (https://github.com/owner/repo, git@github.com:owner/repo.git, owner/repo)
        urls: Vec<String>,

        /// Read additional URLs from a file, one per line (# starts a comment)
        #[arg(long)]
        file: Option<PathBuf>,

        /// GitHub token (overrides GITHUB_TOKEN and config files)
        #[arg(long)]
        token: Option<String>,

        /// Hide the progress bar
        #[arg(long, short = 'q')]
        quiet: bool,

        #[command(flatten)]
        args: AnalysisArgs,
    },

    /// Score previously captured repository snapshots without network access
    Score {
        /// Snapshot JSON files (a single snapshot object or an array of them)
        #[arg(required = true)]
        snapshots: Vec<PathBuf>,

        /// Reference time for windows and recency (RFC 3339, default: now)
        #[arg(long)]
        as_of: Option<String>,

        #[command(flatten)]
        args: AnalysisArgs,
    },

    /// Write a repo-insights.toml config file with default settings
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
}

/// Run the CLI with parsed arguments
pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Init { force } => init::run(&cli.config_dir, force),

        Commands::Analyze {
            urls,
            file,
            token,
            quiet,
            args,
        } => {
            let config = crate::config::load_config(&cli.config_dir);
            let urls = collect_urls(urls, file.as_deref())?;
            analyze::run(&config, &urls, token, cli.workers, quiet, &args)
        }

        Commands::Score {
            snapshots,
            as_of,
            args,
        } => {
            let config = crate::config::load_config(&cli.config_dir);
            score::run(&config, &snapshots, as_of.as_deref(), cli.workers, &args)
        }
    }
}

/// Merge positional URLs with the ones listed in `file`
fn collect_urls(mut urls: Vec<String>, file: Option<&Path>) -> Result<Vec<String>> {
    if let Some(path) = file {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read URL list {}", path.display()))?;
        urls.extend(
            content
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with('#'))
                .map(str::to_string),
        );
    }
    if urls.is_empty() {
        anyhow::bail!("No repository URLs given. Pass URLs as arguments or use --file");
    }
    Ok(urls)
}

fn effective_workers(config: &InsightsConfig, workers: Option<usize>) -> usize {
    workers.unwrap_or(config.workers)
}

/// Render outcomes and write them to the output file or stdout
fn write_report(outcomes: &[AnalysisOutcome], args: &AnalysisArgs) -> Result<()> {
    let format = OutputFormat::from_str(&args.format)?;
    let rendered = reporters::report_with_format(outcomes, format)?;

    match &args.output {
        Some(path) => {
            std::fs::write(path, &rendered)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            eprintln!("Report written to {}", path.display());
        }
        None => print!("{}", rendered),
    }

    if args.explain {
        for outcome in outcomes {
            if let AnalysisOutcome::Success(insights) = outcome {
                eprintln!("{}\n", explain_insights(insights));
            }
        }
    }

    Ok(())
}

/// Rebuild the scorer over a finished record to explain its breakdown
fn explain_insights(insights: &RepositoryInsights) -> String {
    let inputs = HealthInputs {
        basic: &insights.basic_info,
        tech_stack: &insights.tech_stack,
        code_quality: insights.code_quality.as_ref().into(),
        contributors: insights.contributors.as_ref().into(),
        activity: insights.activity.as_ref().into(),
    };
    let explanation =
        HealthScorer::new(inputs, insights.analyzed_at).explain(&insights.health_breakdown);
    format!("{}/{}\n{}", insights.owner, insights.repo, explanation)
}
