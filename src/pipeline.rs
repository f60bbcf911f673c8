use chrono::{DateTime, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use crate::aggregate::{aggregate, distribution, score_statistics, ScoreStatistics, SwotDistribution};
use crate::categorize::categorize;
use crate::config::AnalysisConfig;
use crate::ingest::InputRecord;
use crate::model::{self, ModelRegistry};
use crate::models::{DerivedScores, GroupSummary, ScoredEmployee, SwotCategory};
use crate::scoring::score;
use crate::thresholds::{calibrate, Thresholds};

/// Everything produced by one pass over an employee table.
#[derive(Debug, Clone)]
pub struct AnalysisRun {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub config: AnalysisConfig,
    pub scored: Vec<ScoredEmployee>,
    pub thresholds: Thresholds,
    pub departments: Vec<GroupSummary>,
    pub distribution: SwotDistribution,
    pub statistics: ScoreStatistics,
    pub models: ModelRegistry,
    pub substituted: usize,
}

pub fn run(inputs: Vec<InputRecord>, config: &AnalysisConfig) -> AnalysisRun {
    let run_id = Uuid::new_v4();
    info!(%run_id, records = inputs.len(), profile = config.scoring_profile.label(), "starting analysis");

    let mut substituted = 0;
    let mut scored: Vec<ScoredEmployee> = inputs
        .into_iter()
        .map(|input| {
            let is_substitute = input.defect.is_some();
            let scores = if is_substitute {
                substituted += 1;
                DerivedScores::neutral()
            } else {
                score(&input.record, config.scoring_profile)
            };
            ScoredEmployee {
                record: input.record,
                scores,
                category: SwotCategory::Opportunity,
                substituted: is_substitute,
                cluster: None,
                anomaly: None,
                attrition: None,
            }
        })
        .collect();

    if substituted > 0 {
        warn!(substituted, "records scored with neutral values");
    }

    let population: Vec<DerivedScores> = scored.iter().map(|e| e.scores).collect();
    let thresholds = calibrate(&population, config.threshold_mode);

    for employee in scored.iter_mut() {
        employee.category = categorize(&employee.scores, &thresholds, config.categorization_policy);
    }

    let models = model::fit_all(run_id, &scored, &config.models);
    model::annotate(&mut scored, &models);

    let departments = aggregate(&scored, config.report.mean_precision);
    let distribution = distribution(&scored);
    let statistics = score_statistics(&scored);

    info!(
        %run_id,
        departments = departments.len(),
        threats = distribution.count(SwotCategory::Threat),
        strengths = distribution.count(SwotCategory::Strength),
        "analysis complete"
    );

    AnalysisRun {
        run_id,
        generated_at: Utc::now(),
        config: config.clone(),
        scored,
        thresholds,
        departments,
        distribution,
        statistics,
        models,
        substituted,
    }
}
