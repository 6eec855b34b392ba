//! Technology footprint extraction
//!
//! Derives language shares from the per-language byte counts, detects
//! frameworks, build tools, package managers and CI systems from the names
//! of root entries, and summarizes the dependency manifest when one exists.

use super::markers::{
    matching_labels, BUILD_TOOL_MARKERS, CI_MARKERS, DEPENDENCY_FRAMEWORKS, FRAMEWORK_MARKERS,
    PACKAGE_MANAGER_MARKERS,
};
use super::round2;
use crate::models::Manifest;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

/// Primary language reported when no language bytes are known
pub const UNKNOWN_LANGUAGE: &str = "Unknown";

/// Share of one language in the repository
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageShare {
    pub name: String,
    pub bytes: u64,
    /// Percent of all language bytes, two decimals
    pub percentage: f64,
}

/// Production and development dependencies declared in the manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencySummary {
    /// Path of the manifest the summary was read from
    pub manifest: String,
    pub production: Vec<String>,
    pub development: Vec<String>,
    pub production_count: usize,
    pub development_count: usize,
    pub total_count: usize,
}

impl DependencySummary {
    fn new(manifest: &str, production: Vec<String>, development: Vec<String>) -> Self {
        Self {
            manifest: manifest.to_string(),
            production_count: production.len(),
            development_count: development.len(),
            total_count: production.len() + development.len(),
            production,
            development,
        }
    }

    fn names(&self) -> impl Iterator<Item = &str> {
        self.production
            .iter()
            .chain(self.development.iter())
            .map(String::as_str)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TechStackMetrics {
    /// Language names, largest first
    pub languages: Vec<String>,
    pub primary_language: String,
    pub language_breakdown: Vec<LanguageShare>,
    pub frameworks: BTreeSet<String>,
    pub build_tools: BTreeSet<String>,
    pub package_managers: BTreeSet<String>,
    pub ci_tools: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependencies: Option<DependencySummary>,
}

/// Why a manifest could not be summarized
#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("invalid package.json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid Cargo.toml: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("unsupported manifest: {0}")]
    Unsupported(String),
}

/// Extract the tech stack of a repository.
///
/// A manifest that fails to parse only drops the `dependencies` block;
/// every other signal is still reported.
pub fn extract_tech_stack(
    languages: &BTreeMap<String, u64>,
    root_entries: &[String],
    manifest: Option<&Manifest>,
) -> TechStackMetrics {
    let language_breakdown = language_shares(languages);
    let primary_language = language_breakdown
        .first()
        .map(|l| l.name.clone())
        .unwrap_or_else(|| UNKNOWN_LANGUAGE.to_string());

    let names: Vec<String> = root_entries.iter().map(|n| n.to_lowercase()).collect();
    let dependencies = manifest.and_then(|m| parse_manifest(m).ok());

    let mut frameworks = labels(FRAMEWORK_MARKERS, &names);
    if let Some(deps) = &dependencies {
        frameworks.extend(dependency_frameworks(deps));
    }

    TechStackMetrics {
        languages: language_breakdown.iter().map(|l| l.name.clone()).collect(),
        primary_language,
        language_breakdown,
        frameworks,
        build_tools: labels(BUILD_TOOL_MARKERS, &names),
        package_managers: labels(PACKAGE_MANAGER_MARKERS, &names),
        ci_tools: labels(CI_MARKERS, &names),
        dependencies,
    }
}

/// Language shares sorted by bytes descending (ties by name)
fn language_shares(languages: &BTreeMap<String, u64>) -> Vec<LanguageShare> {
    let total: u64 = languages.values().sum();

    let mut shares: Vec<LanguageShare> = languages
        .iter()
        .map(|(name, &bytes)| LanguageShare {
            name: name.clone(),
            bytes,
            percentage: if total == 0 {
                0.0
            } else {
                round2(bytes as f64 / total as f64 * 100.0)
            },
        })
        .collect();

    shares.sort_by(|a, b| b.bytes.cmp(&a.bytes).then_with(|| a.name.cmp(&b.name)));
    shares
}

fn labels(table: &[(&str, &str)], names: &[String]) -> BTreeSet<String> {
    matching_labels(table, names).map(str::to_string).collect()
}

fn dependency_frameworks(deps: &DependencySummary) -> BTreeSet<String> {
    DEPENDENCY_FRAMEWORKS
        .iter()
        .filter(|(dep, _)| deps.names().any(|name| name.eq_ignore_ascii_case(dep)))
        .map(|(_, label)| label.to_string())
        .collect()
}

#[derive(Deserialize)]
struct PackageJson {
    #[serde(default)]
    dependencies: BTreeMap<String, serde_json::Value>,
    #[serde(default, rename = "devDependencies")]
    dev_dependencies: BTreeMap<String, serde_json::Value>,
}

#[derive(Deserialize)]
struct CargoManifest {
    #[serde(default)]
    dependencies: BTreeMap<String, toml::Value>,
    #[serde(default, rename = "dev-dependencies")]
    dev_dependencies: BTreeMap<String, toml::Value>,
}

/// Summarize the dependencies declared in a `package.json` or `Cargo.toml`
pub fn parse_manifest(manifest: &Manifest) -> Result<DependencySummary, ManifestError> {
    let file_name = manifest
        .path
        .rsplit('/')
        .next()
        .unwrap_or(&manifest.path)
        .to_lowercase();

    match file_name.as_str() {
        "package.json" => {
            let pkg: PackageJson = serde_json::from_str(&manifest.content)?;
            Ok(DependencySummary::new(
                &manifest.path,
                pkg.dependencies.into_keys().collect(),
                pkg.dev_dependencies.into_keys().collect(),
            ))
        }
        "cargo.toml" => {
            let cargo: CargoManifest = toml::from_str(&manifest.content)?;
            Ok(DependencySummary::new(
                &manifest.path,
                cargo.dependencies.into_keys().collect(),
                cargo.dev_dependencies.into_keys().collect(),
            ))
        }
        _ => Err(ManifestError::Unsupported(manifest.path.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn langs(entries: &[(&str, u64)]) -> BTreeMap<String, u64> {
        entries.iter().map(|(n, b)| (n.to_string(), *b)).collect()
    }

    fn entries(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    fn manifest(path: &str, content: &str) -> Manifest {
        Manifest {
            path: path.to_string(),
            content: content.to_string(),
        }
    }

    #[test]
    fn test_language_shares_sorted_by_bytes() {
        let metrics = extract_tech_stack(
            &langs(&[("Python", 1000), ("Rust", 3000), ("Shell", 0)]),
            &[],
            None,
        );
        assert_eq!(metrics.primary_language, "Rust");
        assert_eq!(metrics.languages, vec!["Rust", "Python", "Shell"]);
        assert_eq!(metrics.language_breakdown[0].percentage, 75.0);
        assert_eq!(metrics.language_breakdown[1].percentage, 25.0);
        assert_eq!(metrics.language_breakdown[2].percentage, 0.0);
    }

    #[test]
    fn test_percentages_round_to_two_decimals() {
        let metrics = extract_tech_stack(&langs(&[("A", 1), ("B", 1), ("C", 1)]), &[], None);
        for share in &metrics.language_breakdown {
            assert_eq!(share.percentage, 33.33);
        }
        // Ties keep a stable name order
        assert_eq!(metrics.languages, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_empty_languages_is_unknown() {
        let metrics = extract_tech_stack(&BTreeMap::new(), &[], None);
        assert_eq!(metrics.primary_language, UNKNOWN_LANGUAGE);
        assert!(metrics.languages.is_empty());
        assert!(metrics.language_breakdown.is_empty());
    }

    #[test]
    fn test_marker_detection_is_case_insensitive_and_deduplicated() {
        let metrics = extract_tech_stack(
            &BTreeMap::new(),
            &entries(&[
                "Makefile",
                ".babelrc",
                "babel.config.js",
                "Cargo.toml",
                ".github",
                "Jenkinsfile",
                "manage.py",
                "wsgi.py",
            ]),
            None,
        );
        assert_eq!(
            metrics.build_tools.iter().collect::<Vec<_>>(),
            vec!["Babel", "Make"]
        );
        assert!(metrics.package_managers.contains("Cargo"));
        assert!(metrics.ci_tools.contains("GitHub Actions"));
        assert!(metrics.ci_tools.contains("Jenkins"));
        assert_eq!(
            metrics.frameworks.iter().collect::<Vec<_>>(),
            vec!["Django", "Flask"]
        );
    }

    #[test]
    fn test_package_json_dependencies() {
        let pkg = manifest(
            "package.json",
            r#"{
                "name": "web",
                "dependencies": { "react": "^18.0.0", "express": "^4.0.0", "lodash": "*" },
                "devDependencies": { "jest": "^29.0.0" }
            }"#,
        );
        let metrics = extract_tech_stack(&BTreeMap::new(), &entries(&["package.json"]), Some(&pkg));
        let deps = metrics.dependencies.expect("dependencies parsed");
        assert_eq!(deps.production_count, 3);
        assert_eq!(deps.development_count, 1);
        assert_eq!(deps.total_count, 4);
        assert_eq!(deps.development, vec!["jest"]);
        assert!(metrics.frameworks.contains("React"));
        assert!(metrics.frameworks.contains("Express"));
    }

    #[test]
    fn test_package_json_alone_is_not_a_framework() {
        let pkg = manifest("package.json", r#"{ "name": "cli-tool" }"#);
        let metrics = extract_tech_stack(&BTreeMap::new(), &entries(&["package.json"]), Some(&pkg));
        assert!(metrics.frameworks.is_empty());
        assert_eq!(metrics.dependencies.map(|d| d.total_count), Some(0));
    }

    #[test]
    fn test_cargo_manifest_dependencies() {
        let cargo = manifest(
            "Cargo.toml",
            r#"
[package]
name = "svc"

[dependencies]
axum = "0.7"
serde = { version = "1", features = ["derive"] }

[dev-dependencies]
tempfile = "3"
"#,
        );
        let deps = parse_manifest(&cargo).expect("valid Cargo.toml");
        assert_eq!(deps.production, vec!["axum", "serde"]);
        assert_eq!(deps.development, vec!["tempfile"]);

        let metrics = extract_tech_stack(&BTreeMap::new(), &entries(&["Cargo.toml"]), Some(&cargo));
        assert!(metrics.frameworks.contains("Axum"));
    }

    #[test]
    fn test_broken_manifest_is_not_fatal() {
        let broken = manifest("package.json", "{ not json");
        assert!(matches!(parse_manifest(&broken), Err(ManifestError::Json(_))));

        let metrics = extract_tech_stack(
            &langs(&[("JavaScript", 10)]),
            &entries(&["package.json", "yarn.lock"]),
            Some(&broken),
        );
        assert!(metrics.dependencies.is_none());
        assert_eq!(metrics.primary_language, "JavaScript");
        assert!(metrics.package_managers.contains("Yarn"));
    }

    #[test]
    fn test_unsupported_manifest() {
        let other = manifest("setup.py", "from setuptools import setup");
        assert!(matches!(
            parse_manifest(&other),
            Err(ManifestError::Unsupported(_))
        ));
    }
}
