use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::categorize::CategorizationPolicy;
use crate::error::ConfigError;
use crate::ingest::MissingDataPolicy;
use crate::scoring::ScoringProfile;
use crate::thresholds::ThresholdMode;

pub const DEFAULT_SEED: u64 = 42;

/// Everything one analysis run needs to know, loadable from TOML.
///
/// Unset keys fall back to the enhanced preset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub scoring_profile: ScoringProfile,
    pub threshold_mode: ThresholdMode,
    pub categorization_policy: CategorizationPolicy,
    pub missing_data: MissingDataPolicy,
    pub log_level: String,
    pub models: ModelConfig,
    pub report: ReportConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self::enhanced()
    }
}

impl AnalysisConfig {
    /// Percentile thresholds over enhanced scores, with the model layer enabled.
    pub fn enhanced() -> Self {
        Self {
            scoring_profile: ScoringProfile::Enhanced,
            threshold_mode: ThresholdMode::Percentile,
            categorization_policy: CategorizationPolicy::Quartile,
            missing_data: MissingDataPolicy::Abort,
            log_level: "info".to_string(),
            models: ModelConfig::default(),
            report: ReportConfig::default(),
        }
    }

    /// Lightweight validation path: basic scores, fixed cutoffs, no models.
    pub fn validator() -> Self {
        Self {
            scoring_profile: ScoringProfile::Basic,
            threshold_mode: ThresholdMode::Fixed,
            categorization_policy: CategorizationPolicy::FixedBand,
            missing_data: MissingDataPolicy::Substitute,
            log_level: "info".to_string(),
            models: ModelConfig {
                enabled: false,
                ..ModelConfig::default()
            },
            report: ReportConfig::default(),
        }
    }

    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path)?;
                Self::from_toml(&raw)?
            }
            None => Self::default(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let anomaly = &self.models.anomaly;
        if !(anomaly.contamination > 0.0 && anomaly.contamination <= 0.5) {
            return Err(ConfigError::Invalid {
                field: "models.anomaly.contamination",
                reason: format!("{} is outside (0, 0.5]", anomaly.contamination),
            });
        }
        if let Some(rate) = anomaly
            .contamination_sweep
            .iter()
            .find(|rate| !(**rate > 0.0 && **rate <= 0.5))
        {
            return Err(ConfigError::Invalid {
                field: "models.anomaly.contamination_sweep",
                reason: format!("{rate} is outside (0, 0.5]"),
            });
        }
        if anomaly.trees == 0 || anomaly.max_samples < 2 {
            return Err(ConfigError::Invalid {
                field: "models.anomaly",
                reason: "need at least one tree and two samples per tree".to_string(),
            });
        }

        let clustering = &self.models.clustering;
        if clustering.clusters == 0 || clustering.restarts == 0 {
            return Err(ConfigError::Invalid {
                field: "models.clustering",
                reason: "clusters and restarts must be at least 1".to_string(),
            });
        }
        if clustering.inertia_sweep.contains(&0) {
            return Err(ConfigError::Invalid {
                field: "models.clustering.inertia_sweep",
                reason: "cluster counts must be at least 1".to_string(),
            });
        }

        let attrition = &self.models.attrition;
        if !(attrition.test_fraction > 0.0 && attrition.test_fraction < 1.0) {
            return Err(ConfigError::Invalid {
                field: "models.attrition.test_fraction",
                reason: format!("{} is outside (0, 1)", attrition.test_fraction),
            });
        }
        if attrition.inverse_regularization <= 0.0 {
            return Err(ConfigError::Invalid {
                field: "models.attrition.inverse_regularization",
                reason: "must be positive".to_string(),
            });
        }

        if self.report.mean_precision > 6 {
            return Err(ConfigError::Invalid {
                field: "report.mean_precision",
                reason: "at most 6 decimal places are supported".to_string(),
            });
        }

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub enabled: bool,
    pub clustering: ClusteringConfig,
    pub anomaly: AnomalyConfig,
    pub attrition: AttritionConfig,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            clustering: ClusteringConfig::default(),
            anomaly: AnomalyConfig::default(),
            attrition: AttritionConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusteringConfig {
    pub clusters: usize,
    pub restarts: usize,
    pub max_iterations: usize,
    pub tolerance: f64,
    pub inertia_sweep: Vec<usize>,
    pub seed: u64,
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            clusters: 4,
            restarts: 10,
            max_iterations: 300,
            tolerance: 1e-4,
            inertia_sweep: vec![3, 4, 5],
            seed: DEFAULT_SEED,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnomalyConfig {
    pub contamination: f64,
    /// Extra contamination rates whose outlier counts are reported alongside the fit.
    pub contamination_sweep: Vec<f64>,
    pub trees: usize,
    pub max_samples: usize,
    pub seed: u64,
}

impl Default for AnomalyConfig {
    fn default() -> Self {
        Self {
            contamination: 0.1,
            contamination_sweep: vec![0.05, 0.1, 0.15],
            trees: 100,
            max_samples: 256,
            seed: DEFAULT_SEED,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttritionConfig {
    pub test_fraction: f64,
    /// Inverse L2 strength, as in the usual `C` parameter.
    pub inverse_regularization: f64,
    pub learning_rate: f64,
    pub max_iterations: usize,
    pub tolerance: f64,
    pub seed: u64,
}

impl Default for AttritionConfig {
    fn default() -> Self {
        Self {
            test_fraction: 0.2,
            inverse_regularization: 1.0,
            learning_rate: 0.5,
            max_iterations: 1000,
            tolerance: 1e-6,
            seed: DEFAULT_SEED,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub top_n: usize,
    pub mean_precision: u32,
    pub sample_rows: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            top_n: 10,
            mean_precision: 2,
            sample_rows: 1000,
        }
    }
}
