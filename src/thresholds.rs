use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::models::DerivedScores;
use crate::stats::percentile;

/// Percentile cutoffs are unreliable below this population size.
pub const MIN_PERCENTILE_POPULATION: usize = 4;

const LOW_PERCENTILE: f64 = 25.0;
const HIGH_PERCENTILE: f64 = 75.0;

const FIXED_SCORE_LOW: f64 = 2.5;
const FIXED_SCORE_HIGH: f64 = 3.5;
const FIXED_RISK_LOW: f64 = 2.0;
const FIXED_RISK_HIGH: f64 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThresholdMode {
    Percentile,
    Fixed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdSource {
    Percentile,
    Fixed,
    /// Percentile mode was requested but the population was too small.
    FixedFallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub low: f64,
    pub high: f64,
}

/// Immutable cutoff snapshot for one categorization pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    pub productivity: Band,
    pub engagement: Band,
    pub risk: Band,
    pub source: ThresholdSource,
}

impl Thresholds {
    pub fn fixed() -> Self {
        Self::fixed_with_source(ThresholdSource::Fixed)
    }

    fn fixed_with_source(source: ThresholdSource) -> Self {
        Self {
            productivity: Band {
                low: FIXED_SCORE_LOW,
                high: FIXED_SCORE_HIGH,
            },
            engagement: Band {
                low: FIXED_SCORE_LOW,
                high: FIXED_SCORE_HIGH,
            },
            risk: Band {
                low: FIXED_RISK_LOW,
                high: FIXED_RISK_HIGH,
            },
            source,
        }
    }
}

pub fn calibrate(population: &[DerivedScores], mode: ThresholdMode) -> Thresholds {
    match mode {
        ThresholdMode::Fixed => Thresholds::fixed(),
        ThresholdMode::Percentile if population.len() < MIN_PERCENTILE_POPULATION => {
            warn!(
                population = population.len(),
                minimum = MIN_PERCENTILE_POPULATION,
                "population too small for percentile thresholds; using fixed cutoffs"
            );
            Thresholds::fixed_with_source(ThresholdSource::FixedFallback)
        }
        ThresholdMode::Percentile => {
            let thresholds = Thresholds {
                productivity: quartile_band(population, |s| s.productivity),
                engagement: quartile_band(population, |s| s.engagement),
                risk: quartile_band(population, |s| s.risk),
                source: ThresholdSource::Percentile,
            };
            debug!(?thresholds, "calibrated percentile thresholds");
            thresholds
        }
    }
}

fn quartile_band(population: &[DerivedScores], field: impl Fn(&DerivedScores) -> f64) -> Band {
    let values: Vec<f64> = population.iter().map(field).collect();
    Band {
        low: percentile(&values, LOW_PERCENTILE),
        high: percentile(&values, HIGH_PERCENTILE),
    }
}
