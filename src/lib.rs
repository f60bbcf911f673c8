//! Workforce SWOT early warning: derives productivity, engagement and risk
//! scores from employee records, buckets employees into Strength,
//! Opportunity, Weakness and Threat, and reports department rollups,
//! outliers and attrition risk.

pub mod aggregate;
pub mod categorize;
pub mod config;
pub mod error;
pub mod export;
pub mod ingest;
pub mod insights;
pub mod model;
pub mod models;
pub mod pipeline;
pub mod report;
pub mod scoring;
pub mod stats;
pub mod telemetry;
pub mod thresholds;

pub use aggregate::aggregate;
pub use categorize::{categorize, CategorizationPolicy};
pub use config::AnalysisConfig;
pub use error::{DataError, IngestError, ModelSkip};
pub use insights::{generate_insights, Insights};
pub use model::fit_and_score_anomalies;
pub use models::{DerivedScores, EmployeeRecord, GroupSummary, ScoredEmployee, SwotCategory};
pub use pipeline::AnalysisRun;
pub use scoring::{score, ScoringProfile};
pub use thresholds::{calibrate, ThresholdMode, Thresholds};
