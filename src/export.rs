//! Regenerable run artifacts. Each writer opens, fills and drops its own file.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::categorize::CategorizationPolicy;
use crate::error::ExportError;
use crate::insights::Insights;
use crate::model::anomaly::{AnomalyModel, ContaminationPoint, SeverityCutoffs};
use crate::model::attrition::FeatureImportance;
use crate::model::clustering::ClusterProfile;
use crate::model::features::{columns, ANOMALY_FEATURES, ATTRITION_FEATURES, CLUSTER_FEATURES};
use crate::model::{ModelKind, ModelStatus};
use crate::models::ScoredEmployee;
use crate::pipeline::AnalysisRun;
use crate::scoring::ScoringProfile;
use crate::thresholds::Thresholds;

pub const MODEL_CONFIG_FILE: &str = "model_config.json";
pub const INSIGHTS_FILE: &str = "business_insights.json";
pub const SAMPLE_FILE: &str = "scored_sample.csv";
pub const REPORT_FILE: &str = "swot_report.md";

#[derive(Debug, Serialize)]
struct FeatureColumns {
    clustering: Vec<&'static str>,
    anomaly: Vec<&'static str>,
    attrition: Vec<&'static str>,
}

#[derive(Debug, Serialize)]
struct AnomalySettings<'a> {
    contamination: f64,
    offset: f64,
    outlier_count: usize,
    severity_cutoffs: SeverityCutoffs,
    contamination_sweep: &'a [ContaminationPoint],
}

impl<'a> From<&'a AnomalyModel> for AnomalySettings<'a> {
    fn from(model: &'a AnomalyModel) -> Self {
        Self {
            contamination: model.forest.contamination,
            offset: model.forest.offset,
            outlier_count: model.outlier_count,
            severity_cutoffs: model.severity_cutoffs,
            contamination_sweep: &model.contamination_sweep,
        }
    }
}

#[derive(Debug, Serialize)]
struct ModelConfigSnapshot<'a> {
    model_version: &'static str,
    run_id: Uuid,
    training_date: DateTime<Utc>,
    scoring_profile: ScoringProfile,
    categorization_policy: CategorizationPolicy,
    thresholds: &'a Thresholds,
    feature_columns: FeatureColumns,
    models: Vec<(ModelKind, ModelStatus)>,
    cluster_mapping: Option<&'a [ClusterProfile]>,
    inertia_sweep: Option<&'a [(usize, f64)]>,
    anomaly: Option<AnomalySettings<'a>>,
    feature_importance: Option<&'a [FeatureImportance]>,
}

#[derive(Debug, Serialize)]
struct SampleRow<'a> {
    employee_id: &'a str,
    department: &'a str,
    job_title: &'a str,
    productivity_score: f64,
    engagement_score: f64,
    risk_score: f64,
    work_life_balance_score: f64,
    tenure_factor: f64,
    swot_category: &'static str,
    cluster: Option<usize>,
    cluster_category: Option<&'static str>,
    anomaly_score: Option<f64>,
    anomaly_level: Option<&'static str>,
    attrition_probability: Option<f64>,
    attrition_risk_level: Option<&'static str>,
    substituted: bool,
}

impl<'a> From<&'a ScoredEmployee> for SampleRow<'a> {
    fn from(employee: &'a ScoredEmployee) -> Self {
        Self {
            employee_id: &employee.record.employee_id,
            department: &employee.record.department,
            job_title: &employee.record.job_title,
            productivity_score: employee.scores.productivity,
            engagement_score: employee.scores.engagement,
            risk_score: employee.scores.risk,
            work_life_balance_score: employee.scores.work_life_balance,
            tenure_factor: employee.scores.tenure_factor,
            swot_category: employee.category.label(),
            cluster: employee.cluster.map(|c| c.cluster),
            cluster_category: employee.cluster.map(|c| c.category.label()),
            anomaly_score: employee.anomaly.map(|a| a.anomaly_score),
            anomaly_level: employee.anomaly.map(|a| a.severity_level.label()),
            attrition_probability: employee.attrition.map(|a| a.probability),
            attrition_risk_level: employee.attrition.map(|a| a.risk_level.label()),
            substituted: employee.substituted,
        }
    }
}

/// Paths of everything written by `write_all`.
#[derive(Debug, Clone, PartialEq)]
pub struct WrittenArtifacts {
    pub model_config: PathBuf,
    pub insights: PathBuf,
    pub sample: PathBuf,
    pub report: PathBuf,
}

pub fn write_all(dir: &Path, run: &AnalysisRun, insights: &Insights, report: &str) -> Result<WrittenArtifacts, ExportError> {
    std::fs::create_dir_all(dir)?;
    let artifacts = WrittenArtifacts {
        model_config: dir.join(MODEL_CONFIG_FILE),
        insights: dir.join(INSIGHTS_FILE),
        sample: dir.join(SAMPLE_FILE),
        report: dir.join(REPORT_FILE),
    };

    write_model_config(&artifacts.model_config, run)?;
    write_insights(&artifacts.insights, insights)?;
    let rows = write_sample(&artifacts.sample, &run.scored, run.config.report.sample_rows)?;
    write_report(&artifacts.report, report)?;

    info!(dir = %dir.display(), sample_rows = rows, "wrote run artifacts");
    Ok(artifacts)
}

pub fn write_model_config(path: &Path, run: &AnalysisRun) -> Result<(), ExportError> {
    let clustering = run.models.clustering.fitted();
    let snapshot = ModelConfigSnapshot {
        model_version: env!("CARGO_PKG_VERSION"),
        run_id: run.run_id,
        training_date: run.generated_at,
        scoring_profile: run.config.scoring_profile,
        categorization_policy: run.config.categorization_policy,
        thresholds: &run.thresholds,
        feature_columns: FeatureColumns {
            clustering: columns(&CLUSTER_FEATURES),
            anomaly: columns(&ANOMALY_FEATURES),
            attrition: columns(&ATTRITION_FEATURES),
        },
        models: run.models.statuses(),
        cluster_mapping: clustering.map(|model| model.profiles.as_slice()),
        inertia_sweep: clustering.map(|model| model.inertia_sweep.as_slice()),
        anomaly: run.models.anomaly.fitted().map(AnomalySettings::from),
        feature_importance: run
            .models
            .attrition
            .fitted()
            .map(|model| model.feature_importance.as_slice()),
    };
    write_json(path, &snapshot)
}

pub fn write_insights(path: &Path, insights: &Insights) -> Result<(), ExportError> {
    write_json(path, insights)
}

/// Writes the first `limit` scored employees and returns how many rows were written.
pub fn write_sample(path: &Path, scored: &[ScoredEmployee], limit: usize) -> Result<usize, ExportError> {
    let mut writer = csv::Writer::from_path(path)?;
    let mut written = 0;
    for employee in scored.iter().take(limit) {
        writer.serialize(SampleRow::from(employee))?;
        written += 1;
    }
    writer.flush()?;
    Ok(written)
}

pub fn write_report(path: &Path, report: &str) -> Result<(), ExportError> {
    std::fs::write(path, report)?;
    Ok(())
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), ExportError> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}
