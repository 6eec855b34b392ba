//! Code quality signals inferred from the file listing
//!
//! No source is parsed. Documentation, testing and code-standard presence
//! are all read off file names and paths, matched case-insensitively.
//!
//! ```text
//! Composite = 0.3 × documentation + 0.3 × testing
//!           + 15 (linter) + 10 (formatter) + 15 (type checker)
//! ```

use super::markers::{
    contains_any, FORMATTER_CONFIGS, LINTER_CONFIGS, SOURCE_EXTENSIONS, TEST_FILE_SUFFIXES,
    TEST_PATH_FRAGMENTS, TEST_RUNNER_CONFIGS, TYPE_CHECKER_CONFIGS,
};
use super::percentage;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

const README_POINTS: u32 = 30;
const LICENSE_POINTS: u32 = 20;
const CONTRIBUTING_POINTS: u32 = 15;
const DOCS_FOLDER_POINTS: u32 = 20;
const CHANGELOG_POINTS: u32 = 10;
const CODE_OF_CONDUCT_POINTS: u32 = 5;

/// Coverage can earn at most this many testing points
const MAX_COVERAGE_POINTS: f64 = 80.0;
const COVERAGE_WEIGHT: f64 = 0.8;
const TEST_RUNNER_POINTS: f64 = 20.0;

const DOCUMENTATION_WEIGHT: f64 = 0.3;
const TESTING_WEIGHT: f64 = 0.3;
const LINTING_POINTS: f64 = 15.0;
const FORMATTING_POINTS: f64 = 10.0;
const TYPE_CHECKING_POINTS: f64 = 15.0;

pub const MAX_SUB_SCORE: u32 = 100;

/// Minimum number of conventional top-level directories for a tidy layout
const WELL_STRUCTURED_MIN: usize = 3;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentationSignals {
    pub has_readme: bool,
    pub has_license: bool,
    pub has_contributing: bool,
    pub has_code_of_conduct: bool,
    pub has_changelog: bool,
    pub has_docs_folder: bool,
    /// Source files per extension (ts, js, py, java)
    pub source_files_by_extension: BTreeMap<String, usize>,
    pub estimated_documented_files: usize,
    /// 0-100
    pub documentation_score: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestingSignals {
    pub test_file_count: usize,
    pub total_file_count: usize,
    /// Test files as a percentage of all files, two decimals
    pub estimated_coverage_percentage: f64,
    pub has_testing_framework: bool,
    /// 0-100
    pub testing_score: u32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CodeStandards {
    pub has_linting: bool,
    pub has_formatting: bool,
    pub has_type_checking: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileStructure {
    pub top_level_directories: Vec<String>,
    pub total_files: usize,
    pub has_src_folder: bool,
    pub has_lib_folder: bool,
    pub has_test_folder: bool,
    pub has_docs_folder: bool,
    pub has_examples_folder: bool,
    pub has_config_folder: bool,
    /// Reported only, does not feed the composite score
    pub is_well_structured: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeQualityMetrics {
    /// Composite 0-100
    pub score: u32,
    pub documentation: DocumentationSignals,
    pub testing: TestingSignals,
    pub code_standards: CodeStandards,
    pub file_structure: FileStructure,
}

/// Extract code quality signals from a recursive file-path listing
pub fn extract_code_quality(file_paths: &[String]) -> CodeQualityMetrics {
    let lower: Vec<String> = file_paths.iter().map(|p| p.to_lowercase()).collect();

    let documentation = documentation_signals(&lower);
    let testing = testing_signals(&lower);
    let code_standards = CodeStandards {
        has_linting: lower.iter().any(|p| contains_any(p, LINTER_CONFIGS)),
        has_formatting: lower.iter().any(|p| contains_any(p, FORMATTER_CONFIGS)),
        has_type_checking: lower.iter().any(|p| contains_any(p, TYPE_CHECKER_CONFIGS)),
    };
    let file_structure = file_structure(&lower);

    let score = composite_score(
        documentation.documentation_score,
        testing.testing_score,
        code_standards,
    );

    CodeQualityMetrics {
        score,
        documentation,
        testing,
        code_standards,
        file_structure,
    }
}

fn is_readme(path: &str) -> bool {
    path.strip_prefix("readme.")
        .is_some_and(|ext| matches!(ext, "md" | "txt" | "rst"))
}

fn documentation_signals(paths: &[String]) -> DocumentationSignals {
    let has_readme = paths.iter().any(|p| is_readme(p));
    let has_license = paths.iter().any(|p| p.starts_with("license"));
    let has_contributing = paths.iter().any(|p| p.contains("contributing"));
    let has_code_of_conduct = paths
        .iter()
        .any(|p| p.contains("code_of_conduct") || p.contains("code-of-conduct"));
    let has_changelog = paths.iter().any(|p| p.starts_with("changelog"));
    let has_docs_folder = paths.iter().any(|p| p.starts_with("docs/"));

    let mut source_files_by_extension = BTreeMap::new();
    for path in paths {
        if let Some((_, ext)) = path.rsplit_once('.') {
            if SOURCE_EXTENSIONS.contains(&ext) {
                *source_files_by_extension.entry(ext.to_string()).or_insert(0) += 1;
            }
        }
    }
    let estimated_documented_files = source_files_by_extension.values().sum();

    let documentation_score = [
        (has_readme, README_POINTS),
        (has_license, LICENSE_POINTS),
        (has_contributing, CONTRIBUTING_POINTS),
        (has_docs_folder, DOCS_FOLDER_POINTS),
        (has_changelog, CHANGELOG_POINTS),
        (has_code_of_conduct, CODE_OF_CONDUCT_POINTS),
    ]
    .iter()
    .filter(|(present, _)| *present)
    .map(|(_, points)| points)
    .sum::<u32>()
    .min(MAX_SUB_SCORE);

    DocumentationSignals {
        has_readme,
        has_license,
        has_contributing,
        has_code_of_conduct,
        has_changelog,
        has_docs_folder,
        source_files_by_extension,
        estimated_documented_files,
        documentation_score,
    }
}

/// Check if a lowercase path looks like a test file
fn is_test_path(path: &str) -> bool {
    contains_any(path, TEST_PATH_FRAGMENTS) || TEST_FILE_SUFFIXES.iter().any(|s| path.ends_with(s))
}

fn testing_signals(paths: &[String]) -> TestingSignals {
    let test_file_count = paths.iter().filter(|p| is_test_path(p)).count();
    let total_file_count = paths.len();
    let has_testing_framework = paths.iter().any(|p| contains_any(p, TEST_RUNNER_CONFIGS));

    TestingSignals {
        test_file_count,
        total_file_count,
        estimated_coverage_percentage: percentage(test_file_count, total_file_count),
        has_testing_framework,
        testing_score: testing_score(test_file_count, total_file_count, has_testing_framework),
    }
}

fn testing_score(test_files: usize, total_files: usize, has_framework: bool) -> u32 {
    if total_files == 0 {
        return 0;
    }

    let coverage = test_files as f64 / total_files as f64 * 100.0;
    let mut score = (coverage * COVERAGE_WEIGHT).min(MAX_COVERAGE_POINTS);
    if has_framework {
        score += TEST_RUNNER_POINTS;
    }

    (score.round() as u32).min(MAX_SUB_SCORE)
}

fn file_structure(paths: &[String]) -> FileStructure {
    let directories: BTreeSet<&str> = paths
        .iter()
        .filter_map(|p| p.split_once('/').map(|(top, _)| top))
        .filter(|top| !top.is_empty())
        .collect();
    let has_any = |names: &[&str]| names.iter().any(|n| directories.contains(n));

    let flags = [
        has_any(&["src"]),
        has_any(&["lib"]),
        has_any(&["test", "tests", "__tests__"]),
        has_any(&["docs", "documentation"]),
        has_any(&["examples", "sample"]),
        has_any(&["config", "configs"]),
    ];

    FileStructure {
        top_level_directories: directories.iter().map(|d| d.to_string()).collect(),
        total_files: paths.len(),
        has_src_folder: flags[0],
        has_lib_folder: flags[1],
        has_test_folder: flags[2],
        has_docs_folder: flags[3],
        has_examples_folder: flags[4],
        has_config_folder: flags[5],
        is_well_structured: flags.iter().filter(|f| **f).count() >= WELL_STRUCTURED_MIN,
    }
}

fn composite_score(documentation: u32, testing: u32, standards: CodeStandards) -> u32 {
    let mut score = f64::from(documentation) * DOCUMENTATION_WEIGHT
        + f64::from(testing) * TESTING_WEIGHT;
    if standards.has_linting {
        score += LINTING_POINTS;
    }
    if standards.has_formatting {
        score += FORMATTING_POINTS;
    }
    if standards.has_type_checking {
        score += TYPE_CHECKING_POINTS;
    }
    (score.round() as u32).min(MAX_SUB_SCORE)
}
