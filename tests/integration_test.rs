//! Integration tests for the repo-insights CLI
//!
//! These tests run the actual binary against snapshot fixtures, so no test
//! touches the network:
//! - Offline scoring produces the expected health scores
//! - Disabled extractors switch categories to their fallback formulas
//! - JSON and Markdown output are well formed
//! - `init` writes a config file that the loader accepts

use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

const AS_OF: &str = "2024-06-30T00:00:00Z";

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

/// Run the binary with `--config-dir` pointing at an isolated directory
fn run_cli(config_dir: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_repo-insights"))
        .arg("--config-dir")
        .arg(config_dir)
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute repo-insights");

    (
        String::from_utf8_lossy(&output.stdout).to_string(),
        String::from_utf8_lossy(&output.stderr).to_string(),
        output.status.code().unwrap_or(-1),
    )
}

fn score_json(extra: &[&str]) -> serde_json::Value {
    let dir = TempDir::new().unwrap();
    let snapshots = fixture("snapshots.json");
    let mut args = vec![
        "score",
        snapshots.to_str().unwrap(),
        "--as-of",
        AS_OF,
        "--format",
        "json",
    ];
    args.extend(extra);

    let (stdout, stderr, code) = run_cli(dir.path(), &args);
    assert_eq!(code, 0, "score failed: {}", stderr);
    serde_json::from_str(&stdout).expect("score output is valid JSON")
}

#[test]
fn test_help_lists_commands() {
    let dir = TempDir::new().unwrap();
    let (stdout, _, code) = run_cli(dir.path(), &["--help"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("analyze"));
    assert!(stdout.contains("score"));
    assert!(stdout.contains("init"));
}

#[test]
fn test_score_with_all_fallbacks() {
    let records = score_json(&["--no-code-quality", "--no-contributors", "--no-activity"]);
    let records = records.as_array().expect("array of outcomes");
    assert_eq!(records.len(), 2);

    // 15 popularity + 25 recent push + 10 maintenance + 5 forks + 15 license/CI/build
    let rocket = &records[0];
    assert_eq!(rocket["url"], "https://github.com/acme/rocket-app");
    assert_eq!(rocket["health_score"], 70);
    assert_eq!(rocket["health_breakdown"]["activity"]["source"], "fallback");
    assert_eq!(rocket["health_breakdown"]["community"]["score"], 5);
    assert_eq!(rocket["health_breakdown"]["quality"]["score"], 15);
    assert!(rocket.get("activity").is_none());
    assert!(rocket.get("contributors").is_none());
    assert!(rocket.get("code_quality").is_none());

    // Stale push floor plus the open-issue term
    let legacy = &records[1];
    assert_eq!(legacy["health_score"], 10);
    assert_eq!(legacy["health_breakdown"]["activity"]["score"], 5);
    assert_eq!(legacy["health_breakdown"]["maintenance"]["score"], 5);
}

#[test]
fn test_score_with_all_extractors() {
    let records = score_json(&[]);
    let rocket = &records[0];

    assert_eq!(rocket["success"], true);
    assert_eq!(rocket["tech_stack"]["primary_language"], "Rust");
    assert!(rocket["tech_stack"]["frameworks"]
        .as_array()
        .unwrap()
        .iter()
        .any(|f| f == "Rocket"));
    assert_eq!(rocket["tech_stack"]["dependencies"]["production_count"], 2);

    for category in ["popularity", "activity", "maintenance", "community", "quality"] {
        assert_eq!(
            rocket["health_breakdown"][category]["source"], "primary",
            "category {category}"
        );
    }
    assert_eq!(rocket["activity"]["commits"]["total"], 6);
    assert_eq!(rocket["contributors"]["total_contributors"], 3);

    let total = rocket["health_score"].as_u64().unwrap();
    assert!(total <= 100);
}

#[test]
fn test_score_is_deterministic() {
    assert_eq!(score_json(&[]), score_json(&[]));
}

#[test]
fn test_score_markdown_to_file() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("report.md");
    let snapshots = fixture("snapshots.json");

    let (_, stderr, code) = run_cli(
        dir.path(),
        &[
            "score",
            snapshots.to_str().unwrap(),
            "--as-of",
            AS_OF,
            "--format",
            "md",
            "-o",
            out.to_str().unwrap(),
        ],
    );
    assert_eq!(code, 0, "score failed: {}", stderr);

    let md = std::fs::read_to_string(&out).unwrap();
    assert!(md.contains("# Repository Insights Report"));
    assert!(md.contains("## acme/rocket-app"));
    assert!(md.contains("## acme/legacy-lib"));
}

#[test]
fn test_score_missing_file_fails() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope.json");
    let (_, stderr, code) = run_cli(dir.path(), &["score", missing.to_str().unwrap()]);
    assert_ne!(code, 0);
    assert!(stderr.contains("nope.json"));
}

#[test]
fn test_score_empty_snapshot_list_fails() {
    let dir = TempDir::new().unwrap();
    let empty = dir.path().join("empty.json");
    std::fs::write(&empty, "[]").unwrap();

    let (_, stderr, code) = run_cli(dir.path(), &["score", empty.to_str().unwrap()]);
    assert_ne!(code, 0);
    assert!(stderr.contains("No snapshots found"));
}

#[test]
fn test_score_rejects_invalid_days() {
    let dir = TempDir::new().unwrap();
    let snapshots = fixture("snapshots.json");
    let (_, _, code) = run_cli(
        dir.path(),
        &["score", snapshots.to_str().unwrap(), "--days", "0"],
    );
    assert_ne!(code, 0);
}

#[test]
fn test_analyze_invalid_url_becomes_failure_record() {
    let dir = TempDir::new().unwrap();
    // Unreachable API so nothing leaves the machine
    std::fs::write(
        dir.path().join("repo-insights.toml"),
        "[github]\napi_url = \"http://127.0.0.1:9\"\ntimeout_secs = 2\n",
    )
    .unwrap();

    let (stdout, stderr, code) = run_cli(
        dir.path(),
        &["analyze", "not a url", "--quiet", "--format", "json"],
    );
    assert_eq!(code, 0, "analyze failed: {}", stderr);

    let records: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(records[0]["success"], false);
    assert_eq!(records[0]["url"], "not a url");
    assert!(records[0]["error"]
        .as_str()
        .unwrap()
        .contains("Invalid GitHub URL format"));
}

#[test]
fn test_init_writes_loadable_config() {
    let dir = TempDir::new().unwrap();
    let (stdout, _, code) = run_cli(dir.path(), &["init"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("Created"));

    let content = std::fs::read_to_string(dir.path().join("repo-insights.toml")).unwrap();
    let parsed: toml::Value = toml::from_str(&content).unwrap();
    assert_eq!(parsed["analysis"]["analyze_days"].as_integer(), Some(90));

    // The written config drives a real run
    let snapshots = fixture("snapshots.json");
    let (_, stderr, code) = run_cli(
        dir.path(),
        &["score", snapshots.to_str().unwrap(), "--as-of", AS_OF],
    );
    assert_eq!(code, 0, "score failed: {}", stderr);
}
