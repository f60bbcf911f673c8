use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::Serialize;
use tracing::{debug, info};

use super::features::{self, FeatureMatrix, ATTRITION_FEATURES};
use super::logistic::{balanced_weights, LogisticRegression};
use super::scaler::StandardScaler;
use crate::config::AttritionConfig;
use crate::error::ModelSkip;
use crate::models::{AttritionAssessment, AttritionRiskLevel, ScoredEmployee};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureImportance {
    pub feature: &'static str,
    pub importance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttritionModel {
    pub scaler: StandardScaler,
    pub regression: LogisticRegression,
    pub train_size: usize,
    pub test_size: usize,
    pub train_accuracy: f64,
    pub test_accuracy: Option<f64>,
    /// Absolute coefficients, largest first.
    pub feature_importance: Vec<FeatureImportance>,
    pub assessments: Vec<AttritionAssessment>,
}

pub fn fit_attrition(population: &[ScoredEmployee], config: &AttritionConfig) -> Result<AttritionModel, ModelSkip> {
    let targets: Vec<bool> = population.iter().map(|e| e.record.resigned).collect();
    let positives = targets.iter().filter(|t| **t).count();
    let distinct = usize::from(positives > 0) + usize::from(positives < targets.len());
    if distinct < 2 {
        return Err(ModelSkip::InsufficientClassVariation { distinct });
    }

    let raw = features::matrix(population, &ATTRITION_FEATURES);
    let (train, test) = stratified_split(&targets, config.test_fraction, config.seed);
    debug!(train = train.len(), test = test.len(), "split attrition data");

    let select = |indices: &[usize]| -> (FeatureMatrix, Vec<bool>) {
        indices
            .iter()
            .map(|&i| (raw[i].clone(), targets[i]))
            .unzip()
    };
    let (train_raw, train_targets) = select(&train);
    let (test_raw, test_targets) = select(&test);

    let (scaler, train_scaled) = StandardScaler::fit_transform(&train_raw);
    let test_scaled = scaler.transform(&test_raw);
    let weights = balanced_weights(&train_targets);
    let regression = LogisticRegression::fit(&train_scaled, &train_targets, &weights, config);

    let train_accuracy = regression
        .accuracy(&train_scaled, &train_targets)
        .unwrap_or_default();
    let test_accuracy = regression.accuracy(&test_scaled, &test_targets);

    let mut feature_importance: Vec<FeatureImportance> = features::columns(&ATTRITION_FEATURES)
        .into_iter()
        .zip(&regression.weights)
        .map(|(feature, weight)| FeatureImportance {
            feature,
            importance: weight.abs(),
        })
        .collect();
    feature_importance.sort_by(|a, b| b.importance.total_cmp(&a.importance));

    let assessments = raw
        .iter()
        .map(|row| {
            let probability = regression.predict_proba(&scaler.transform_row(row));
            AttritionAssessment {
                probability,
                risk_level: risk_tier(probability),
            }
        })
        .collect();

    info!(
        train_accuracy,
        test_accuracy = test_accuracy.unwrap_or_default(),
        iterations = regression.iterations,
        "fitted attrition model"
    );

    Ok(AttritionModel {
        scaler,
        regression,
        train_size: train.len(),
        test_size: test.len(),
        train_accuracy,
        test_accuracy,
        feature_importance,
        assessments,
    })
}

/// Probability bins `[0, 0.1], (0.1, 0.3], (0.3, 0.5], (0.5, 0.7], (0.7, 1]`.
pub fn risk_tier(probability: f64) -> AttritionRiskLevel {
    if probability <= 0.1 {
        AttritionRiskLevel::VeryLow
    } else if probability <= 0.3 {
        AttritionRiskLevel::Low
    } else if probability <= 0.5 {
        AttritionRiskLevel::Medium
    } else if probability <= 0.7 {
        AttritionRiskLevel::High
    } else {
        AttritionRiskLevel::VeryHigh
    }
}

/// Splits indices per class so both halves keep the class ratio. Every class
/// keeps at least one training row.
fn stratified_split(targets: &[bool], test_fraction: f64, seed: u64) -> (Vec<usize>, Vec<usize>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut train = Vec::new();
    let mut test = Vec::new();

    for class in [false, true] {
        let mut members: Vec<usize> = (0..targets.len()).filter(|&i| targets[i] == class).collect();
        if members.is_empty() {
            continue;
        }
        members.shuffle(&mut rng);
        let wanted = (members.len() as f64 * test_fraction).round() as usize;
        let test_count = wanted.min(members.len() - 1);
        test.extend_from_slice(&members[..test_count]);
        train.extend_from_slice(&members[test_count..]);
    }

    train.sort_unstable();
    test.sort_unstable();
    (train, test)
}
