//! Statistical models fitted over the scored population: clustering,
//! anomaly scoring and attrition prediction. All inputs are standardised
//! before fitting and every fit is seeded, so a run is reproducible.

pub mod anomaly;
pub mod attrition;
pub mod clustering;
pub mod features;
pub mod isolation;
pub mod kmeans;
pub mod logistic;
pub mod registry;
pub mod scaler;

use tracing::warn;
use uuid::Uuid;

pub use anomaly::{fit_and_score_anomalies, fit_anomalies, AnomalyModel};
pub use attrition::{fit_attrition, risk_tier, AttritionModel};
pub use clustering::{fit_clusters, ClusteringModel};
pub use registry::{ModelKind, ModelOutcome, ModelRegistry, ModelStatus};

use crate::config::ModelConfig;
use crate::models::ScoredEmployee;

/// Fits every configured model. A model that cannot be fitted is recorded as
/// not run and the others still proceed.
pub fn fit_all(run_id: Uuid, population: &[ScoredEmployee], config: &ModelConfig) -> ModelRegistry {
    if !config.enabled {
        return ModelRegistry::disabled(run_id);
    }

    let registry = ModelRegistry {
        run_id,
        clustering: ModelOutcome::from_fit(fit_clusters(population, &config.clustering)),
        anomaly: ModelOutcome::from_fit(fit_anomalies(population, &config.anomaly)),
        attrition: ModelOutcome::from_fit(fit_attrition(population, &config.attrition)),
    };

    for (kind, status) in registry.statuses() {
        if let ModelStatus::NotRun { reason } = status {
            warn!(model = %kind, %reason, "model not run");
        }
    }
    registry
}

/// Copies per-employee model outputs onto the scored records.
pub fn annotate(population: &mut [ScoredEmployee], registry: &ModelRegistry) {
    if let Some(model) = registry.clustering.fitted() {
        for (employee, assignment) in population.iter_mut().zip(&model.assignments) {
            employee.cluster = Some(*assignment);
        }
    }
    if let Some(model) = registry.anomaly.fitted() {
        for (employee, assessment) in population.iter_mut().zip(&model.assessments) {
            employee.anomaly = Some(*assessment);
        }
    }
    if let Some(model) = registry.attrition.fitted() {
        for (employee, assessment) in population.iter_mut().zip(&model.assessments) {
            employee.attrition = Some(*assessment);
        }
    }
}
