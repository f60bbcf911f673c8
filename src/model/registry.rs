use std::fmt;

use serde::Serialize;
use uuid::Uuid;

use super::anomaly::AnomalyModel;
use super::attrition::AttritionModel;
use super::clustering::ClusteringModel;
use crate::error::ModelSkip;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ModelKind {
    Clustering,
    Anomaly,
    Attrition,
}

impl ModelKind {
    pub fn label(&self) -> &'static str {
        match self {
            ModelKind::Clustering => "k-means clustering",
            ModelKind::Anomaly => "isolation forest",
            ModelKind::Attrition => "attrition logistic regression",
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// What happened to one model during a run.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelOutcome<T> {
    /// The model layer was switched off in configuration.
    Disabled,
    Fitted(T),
    NotRun(ModelSkip),
}

impl<T> ModelOutcome<T> {
    pub fn from_fit(result: Result<T, ModelSkip>) -> Self {
        match result {
            Ok(model) => ModelOutcome::Fitted(model),
            Err(reason) => ModelOutcome::NotRun(reason),
        }
    }

    pub fn fitted(&self) -> Option<&T> {
        match self {
            ModelOutcome::Fitted(model) => Some(model),
            _ => None,
        }
    }

    pub fn status(&self) -> ModelStatus {
        match self {
            ModelOutcome::Disabled => ModelStatus::Disabled,
            ModelOutcome::Fitted(_) => ModelStatus::Fitted,
            ModelOutcome::NotRun(reason) => ModelStatus::NotRun {
                reason: reason.to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ModelStatus {
    Disabled,
    Fitted,
    NotRun { reason: String },
}

impl fmt::Display for ModelStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelStatus::Disabled => f.write_str("disabled"),
            ModelStatus::Fitted => f.write_str("fitted"),
            ModelStatus::NotRun { reason } => write!(f, "not run ({reason})"),
        }
    }
}

/// Owns every model fitted during one analysis run. Nothing outlives the run.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelRegistry {
    pub run_id: Uuid,
    pub clustering: ModelOutcome<ClusteringModel>,
    pub anomaly: ModelOutcome<AnomalyModel>,
    pub attrition: ModelOutcome<AttritionModel>,
}

impl ModelRegistry {
    pub fn disabled(run_id: Uuid) -> Self {
        Self {
            run_id,
            clustering: ModelOutcome::Disabled,
            anomaly: ModelOutcome::Disabled,
            attrition: ModelOutcome::Disabled,
        }
    }

    pub fn status(&self, kind: ModelKind) -> ModelStatus {
        match kind {
            ModelKind::Clustering => self.clustering.status(),
            ModelKind::Anomaly => self.anomaly.status(),
            ModelKind::Attrition => self.attrition.status(),
        }
    }

    pub fn statuses(&self) -> Vec<(ModelKind, ModelStatus)> {
        [ModelKind::Clustering, ModelKind::Anomaly, ModelKind::Attrition]
            .into_iter()
            .map(|kind| (kind, self.status(kind)))
            .collect()
    }
}
