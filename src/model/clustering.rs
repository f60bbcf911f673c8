use serde::Serialize;
use tracing::info;

use super::features::{self, CLUSTER_FEATURES};
use super::kmeans::KMeans;
use super::scaler::StandardScaler;
use crate::config::ClusteringConfig;
use crate::error::ModelSkip;
use crate::models::{ClusterAssignment, ScoredEmployee, SwotCategory};
use crate::stats::mean;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterProfile {
    pub cluster: usize,
    pub size: usize,
    pub avg_productivity: f64,
    pub avg_engagement: f64,
    pub avg_risk: f64,
    pub category: SwotCategory,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusteringModel {
    pub scaler: StandardScaler,
    pub kmeans: KMeans,
    pub profiles: Vec<ClusterProfile>,
    /// Inertia for each cluster count tried during the sweep.
    pub inertia_sweep: Vec<(usize, f64)>,
    pub assignments: Vec<ClusterAssignment>,
}

pub fn fit_clusters(
    population: &[ScoredEmployee],
    config: &ClusteringConfig,
) -> Result<ClusteringModel, ModelSkip> {
    let raw = features::matrix(population, &CLUSTER_FEATURES);
    let (scaler, scaled) = StandardScaler::fit_transform(&raw);

    let inertia_sweep = config
        .inertia_sweep
        .iter()
        .filter_map(|&k| {
            KMeans::fit(&scaled, k, config)
                .ok()
                .map(|model| (k, model.inertia))
        })
        .collect();

    let kmeans = KMeans::fit(&scaled, config.clusters, config)?;
    let labels = kmeans.labels(&scaled);
    let profiles = characterize(population, &labels, config.clusters);

    let assignments = labels
        .iter()
        .map(|&cluster| ClusterAssignment {
            cluster,
            category: profiles[cluster].category,
        })
        .collect();

    info!(
        clusters = config.clusters,
        inertia = kmeans.inertia,
        "fitted k-means clustering"
    );

    Ok(ClusteringModel {
        scaler,
        kmeans,
        profiles,
        inertia_sweep,
        assignments,
    })
}

/// Labels each cluster by comparing its mean scores with the population means.
pub fn characterize(
    population: &[ScoredEmployee],
    labels: &[usize],
    clusters: usize,
) -> Vec<ClusterProfile> {
    let overall = |field: fn(&ScoredEmployee) -> f64| {
        mean(&population.iter().map(field).collect::<Vec<_>>())
    };
    let avg_productivity = overall(|e| e.scores.productivity);
    let avg_engagement = overall(|e| e.scores.engagement);
    let avg_risk = overall(|e| e.scores.risk);

    (0..clusters)
        .map(|cluster| {
            let members: Vec<&ScoredEmployee> = population
                .iter()
                .zip(labels)
                .filter(|(_, label)| **label == cluster)
                .map(|(employee, _)| employee)
                .collect();
            let member_mean = |field: fn(&ScoredEmployee) -> f64| {
                mean(&members.iter().map(|e| field(e)).collect::<Vec<_>>())
            };
            let productivity = member_mean(|e| e.scores.productivity);
            let engagement = member_mean(|e| e.scores.engagement);
            let risk = member_mean(|e| e.scores.risk);

            let category = if members.is_empty() {
                SwotCategory::Opportunity
            } else if productivity > avg_productivity && engagement > avg_engagement && risk < avg_risk {
                SwotCategory::Strength
            } else if productivity < avg_productivity && engagement < avg_engagement {
                SwotCategory::Weakness
            } else if risk > avg_risk && (productivity < avg_productivity || engagement < avg_engagement) {
                SwotCategory::Threat
            } else {
                SwotCategory::Opportunity
            };

            ClusterProfile {
                cluster,
                size: members.len(),
                avg_productivity: productivity,
                avg_engagement: engagement,
                avg_risk: risk,
                category,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DerivedScores, EmployeeRecord};

    fn employee(productivity: f64, engagement: f64, risk: f64) -> ScoredEmployee {
        ScoredEmployee {
            record: EmployeeRecord::placeholder("E", "Ops", "Analyst"),
            scores: DerivedScores {
                productivity,
                engagement,
                risk,
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
    fn clusters_are_characterized_against_population_means() {
        let population = vec![
            employee(4.0, 4.0, 0.5),
            employee(1.0, 1.0, 1.0),
            employee(1.0, 3.5, 4.0),
            employee(2.5, 2.5, 1.5),
        ];
        let labels = vec![0, 1, 2, 3];
        let profiles = characterize(&population, &labels, 5);
        let categories: Vec<SwotCategory> = profiles.iter().map(|p| p.category).collect();
        assert_eq!(
            categories,
            vec![
                SwotCategory::Strength,
                SwotCategory::Weakness,
                SwotCategory::Threat,
                SwotCategory::Opportunity,
                SwotCategory::Opportunity,
            ]
        );
        assert_eq!(profiles[4].size, 0);
    }

    #[test]
    fn fit_assigns_every_employee_a_cluster() {
        let mut population = Vec::new();
        for i in 0..12 {
            let offset = (i % 3) as f64 * 0.1;
            population.push(employee(4.0 + offset, 4.0, 0.5));
            population.push(employee(1.0 + offset, 1.0, 3.5));
        }
        let config = ClusteringConfig {
            clusters: 2,
            inertia_sweep: vec![1, 2, 3],
            ..ClusteringConfig::default()
        };
        let model = fit_clusters(&population, &config).expect("fits");
        assert_eq!(model.assignments.len(), population.len());
        assert_eq!(model.inertia_sweep.len(), 3);
        assert_eq!(model.assignments[0].category, SwotCategory::Strength);
        assert_eq!(model.assignments[1].category, SwotCategory::Weakness);
    }

    #[test]
    fn too_few_employees_skip_clustering() {
        let population = vec![employee(1.0, 1.0, 1.0)];
        let err = fit_clusters(&population, &ClusteringConfig::default()).expect_err("skipped");
        assert!(matches!(err, ModelSkip::InsufficientPopulation { .. }));
    }
}
