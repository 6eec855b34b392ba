//! Signal extractors
//!
//! Each extractor turns one slice of a [`RawRepositorySnapshot`] into a
//! bounded, serializable metrics block. Extractors are independent of each
//! other, pure, and side-effect free: no logging, no I/O, no shared state.
//!
//! - [`tech_stack`]: language shares, tooling markers, dependency summary
//! - [`code_quality`]: documentation, testing and code-standard presence
//! - [`contributors`]: lifetime concentration and in-window engagement
//! - [`activity`]: commit trend, issue/PR throughput, release cadence
//!
//! [`RawRepositorySnapshot`]: crate::models::RawRepositorySnapshot

pub mod activity;
pub mod code_quality;
pub mod contributors;
pub mod markers;
pub mod tech_stack;

pub use activity::{extract_activity, ActivityMetrics, CommitTrend};
pub use code_quality::{extract_code_quality, CodeQualityMetrics};
pub use contributors::{extract_contributors, ContributorMetrics};
pub use tech_stack::{extract_tech_stack, DependencySummary, TechStackMetrics};

/// Round to two decimals
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// `part / whole * 100`, rounded to two decimals; 0 when `whole` is 0.
pub(crate) fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    round2(part as f64 / whole as f64 * 100.0).clamp(0.0, 100.0)
}
