use serde::Serialize;
use tracing::info;

use super::features::{self, ANOMALY_FEATURES};
use super::isolation::{contamination_offset, IsolationForest};
use super::scaler::StandardScaler;
use crate::config::AnomalyConfig;
use crate::error::ModelSkip;
use crate::models::{AnomalyAssessment, ScoredEmployee, SeverityLevel};
use crate::stats::percentile;

#[derive(Debug, Clone, PartialEq)]
pub struct AnomalyModel {
    pub scaler: StandardScaler,
    pub forest: IsolationForest,
    pub assessments: Vec<AnomalyAssessment>,
    pub outlier_count: usize,
    pub severity_cutoffs: SeverityCutoffs,
    pub contamination_sweep: Vec<ContaminationPoint>,
}

/// Decision values at the 10th and 25th percentiles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeverityCutoffs {
    pub high: f64,
    pub medium: f64,
}

/// Outliers the fitted forest would flag at another contamination rate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ContaminationPoint {
    pub contamination: f64,
    pub outliers: usize,
}

pub fn fit_anomalies(population: &[ScoredEmployee], config: &AnomalyConfig) -> Result<AnomalyModel, ModelSkip> {
    let raw = features::matrix(population, &ANOMALY_FEATURES);
    let (scaler, scaled) = StandardScaler::fit_transform(&raw);
    let forest = IsolationForest::fit(&scaled, config)?;

    let scores: Vec<f64> = scaled.iter().map(|row| forest.score_sample(row)).collect();
    let decisions: Vec<f64> = scaled.iter().map(|row| forest.decision(row)).collect();
    let cutoffs = SeverityCutoffs {
        high: percentile(&decisions, 10.0),
        medium: percentile(&decisions, 25.0),
    };

    let assessments: Vec<AnomalyAssessment> = decisions
        .iter()
        .map(|&decision| AnomalyAssessment {
            is_outlier: decision < 0.0,
            anomaly_score: decision,
            severity_level: severity(decision, cutoffs.high, cutoffs.medium),
        })
        .collect();
    let outlier_count = assessments.iter().filter(|a| a.is_outlier).count();
    let contamination_sweep = sweep_contamination(&scores, &config.contamination_sweep);

    info!(
        outliers = outlier_count,
        population = population.len(),
        contamination = config.contamination,
        "scored anomalies"
    );

    Ok(AnomalyModel {
        scaler,
        forest,
        assessments,
        outlier_count,
        severity_cutoffs: cutoffs,
        contamination_sweep,
    })
}

/// Re-thresholds the training scores at each rate; the trees do not depend on it.
fn sweep_contamination(scores: &[f64], rates: &[f64]) -> Vec<ContaminationPoint> {
    rates
        .iter()
        .map(|&contamination| {
            let offset = contamination_offset(scores, contamination);
            ContaminationPoint {
                contamination,
                outliers: scores.iter().filter(|&&score| score < offset).count(),
            }
        })
        .collect()
}

/// Fits an isolation forest on the population and returns one assessment per employee.
pub fn fit_and_score_anomalies(
    population: &[ScoredEmployee],
    config: &AnomalyConfig,
) -> Result<Vec<AnomalyAssessment>, ModelSkip> {
    fit_anomalies(population, config).map(|model| model.assessments)
}

fn severity(decision: f64, high_cutoff: f64, medium_cutoff: f64) -> SeverityLevel {
    if decision <= high_cutoff {
        SeverityLevel::High
    } else if decision <= medium_cutoff {
        SeverityLevel::Medium
    } else {
        SeverityLevel::Low
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DerivedScores, EmployeeRecord, SwotCategory};

    fn employee(id: usize, overtime: f64, sick: f64) -> ScoredEmployee {
        let mut record = EmployeeRecord::placeholder(&format!("E{id}"), "Ops", "Analyst");
        record.work_hours_per_week = 40.0 + (id % 5) as f64;
        record.overtime_hours = overtime;
        record.sick_days = sick;
        record.satisfaction_score = 3.5;
        record.performance_score = 4.0;
        ScoredEmployee {
            record,
            scores: DerivedScores {
                productivity: 3.0 + (id % 3) as f64 * 0.1,
                engagement: 3.0,
                risk: 1.0,
                work_life_balance: 4.0,
                tenure_factor: 1.0,
            },
            category: SwotCategory::Opportunity,
            substituted: false,
            cluster: None,
            anomaly: None,
            attrition: None,
        }
    }

    #[test]
    fn extreme_employee_is_flagged_high_severity() {
        let mut population: Vec<ScoredEmployee> = (0..39).map(|i| employee(i, 5.0, 2.0)).collect();
        population.push(employee(39, 80.0, 40.0));

        let assessments = fit_and_score_anomalies(&population, &AnomalyConfig::default()).expect("fits");
        assert_eq!(assessments.len(), population.len());
        let extreme = assessments[39];
        assert!(extreme.is_outlier);
        assert_eq!(extreme.severity_level, SeverityLevel::High);
        assert!(assessments.iter().all(|a| a.anomaly_score >= extreme.anomaly_score));
    }

    #[test]
    fn outlier_share_tracks_contamination() {
        let population: Vec<ScoredEmployee> = (0..50)
            .map(|i| employee(i, (i % 10) as f64 * 3.0, (i % 7) as f64))
            .collect();
        let model = fit_anomalies(&population, &AnomalyConfig::default()).expect("fits");
        assert!(model.outlier_count >= 1);
        assert!(model.outlier_count <= 10);
    }

    #[test]
    fn higher_contamination_never_flags_fewer_outliers() {
        let population: Vec<ScoredEmployee> = (0..60)
            .map(|i| employee(i, (i % 12) as f64 * 4.0, (i % 9) as f64))
            .collect();
        let model = fit_anomalies(&population, &AnomalyConfig::default()).expect("fits");

        let rates: Vec<f64> = model.contamination_sweep.iter().map(|p| p.contamination).collect();
        assert_eq!(rates, vec![0.05, 0.1, 0.15]);
        assert!(model
            .contamination_sweep
            .windows(2)
            .all(|pair| pair[0].outliers <= pair[1].outliers));
        // The configured rate reproduces the fitted outlier count.
        assert_eq!(model.contamination_sweep[1].outliers, model.outlier_count);
        assert!(model.severity_cutoffs.high <= model.severity_cutoffs.medium);
    }

    #[test]
    fn sweep_counts_scores_below_each_offset() {
        let scores: Vec<f64> = (0..20).map(|i| -0.8 + i as f64 * 0.02).collect();
        let sweep = sweep_contamination(&scores, &[0.05, 0.1, 0.15, 0.5]);
        let counts: Vec<usize> = sweep.iter().map(|p| p.outliers).collect();
        assert_eq!(counts, vec![1, 2, 3, 10]);
    }

    #[test]
    fn severity_bands_are_inclusive() {
        assert_eq!(severity(-0.2, -0.2, -0.1), SeverityLevel::High);
        assert_eq!(severity(-0.1, -0.2, -0.1), SeverityLevel::Medium);
        assert_eq!(severity(0.05, -0.2, -0.1), SeverityLevel::Low);
    }

    #[test]
    fn empty_population_is_skipped() {
        let err = fit_and_score_anomalies(&[], &AnomalyConfig::default()).expect_err("skipped");
        assert!(matches!(err, ModelSkip::InsufficientPopulation { available: 0, .. }));
    }
}
