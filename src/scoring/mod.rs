//! Health Scoring System
//!
//! Combines basic repository attributes with whichever signal blocks were
//! extracted into a single 0-100 health score. Every category has a primary
//! formula that reads its signal block and a fallback formula used when
//! that extractor was not run.
//!
//! # Scoring Formula
//!
//! ```text
//! Health = Popularity (20) + Activity (25) + Maintenance (20)
//!        + Community (20) + Quality (15)
//!
//! Activity    primary: round(activity_score × 0.25)
//!             fallback: days since last push ≤7:25 ≤30:20 ≤90:15 ≤180:10 else 5
//! Maintenance issues enabled +5, open issues < 50 +5,
//!             close rate > 60 +5, merge rate > 60 +5 (activity only)
//! Community   primary: contributor count tier + healthy distribution
//!             + active contributor tier
//!             fallback: fork ladder
//! Quality     primary: round(code_quality_score × 0.15)
//!             fallback: license +5, CI +5, build tool +5
//! ```

mod health_scorer;

pub use health_scorer::{
    grade, CategoryScore, HealthInputs, HealthScorer, ScoreBreakdown, ScoreSource, Signal,
};
