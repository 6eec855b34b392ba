//! repo-insights - Explainable health scores for GitHub repositories
//!
//! Fetches repository metadata, extracts tech stack, code quality,
//! contributor and activity signals, and combines them into a 0-100 health
//! score whose categories fall back to coarser estimates when a signal is
//! unavailable.

pub mod cli;
pub mod config;
pub mod github;
pub mod models;
pub mod pipeline;
pub mod reporters;
pub mod scoring;
pub mod signals;
