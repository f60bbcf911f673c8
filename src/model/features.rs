use serde::Serialize;

use crate::models::ScoredEmployee;

/// Rows are employees, columns follow the feature list they were built from.
pub type FeatureMatrix = Vec<Vec<f64>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Feature {
    Productivity,
    Engagement,
    Risk,
    WorkLifeBalance,
    TenureFactor,
    WorkHours,
    OvertimeHours,
    SickDays,
    Satisfaction,
    Performance,
    ProjectsHandled,
    TrainingHours,
}

pub const CLUSTER_FEATURES: [Feature; 5] = [
    Feature::Productivity,
    Feature::Engagement,
    Feature::Risk,
    Feature::WorkLifeBalance,
    Feature::TenureFactor,
];

pub const ANOMALY_FEATURES: [Feature; 8] = [
    Feature::Productivity,
    Feature::Engagement,
    Feature::Risk,
    Feature::WorkHours,
    Feature::SickDays,
    Feature::OvertimeHours,
    Feature::Satisfaction,
    Feature::Performance,
];

pub const ATTRITION_FEATURES: [Feature; 10] = [
    Feature::Productivity,
    Feature::Engagement,
    Feature::Risk,
    Feature::WorkHours,
    Feature::OvertimeHours,
    Feature::SickDays,
    Feature::Satisfaction,
    Feature::Performance,
    Feature::ProjectsHandled,
    Feature::TrainingHours,
];

impl Feature {
    pub fn column(&self) -> &'static str {
        match self {
            Feature::Productivity => "productivity_score",
            Feature::Engagement => "engagement_score",
            Feature::Risk => "risk_score",
            Feature::WorkLifeBalance => "work_life_balance_score",
            Feature::TenureFactor => "tenure_factor",
            Feature::WorkHours => "Work_Hours_Per_Week",
            Feature::OvertimeHours => "Overtime_Hours",
            Feature::SickDays => "Sick_Days",
            Feature::Satisfaction => "Employee_Satisfaction_Score",
            Feature::Performance => "Performance_Score",
            Feature::ProjectsHandled => "Projects_Handled",
            Feature::TrainingHours => "Training_Hours",
        }
    }

    pub fn value(&self, employee: &ScoredEmployee) -> f64 {
        let record = &employee.record;
        let scores = &employee.scores;
        match self {
            Feature::Productivity => scores.productivity,
            Feature::Engagement => scores.engagement,
            Feature::Risk => scores.risk,
            Feature::WorkLifeBalance => scores.work_life_balance,
            Feature::TenureFactor => scores.tenure_factor,
            Feature::WorkHours => record.work_hours_per_week,
            Feature::OvertimeHours => record.overtime_hours,
            Feature::SickDays => record.sick_days,
            Feature::Satisfaction => record.satisfaction_score,
            Feature::Performance => record.performance_score,
            Feature::ProjectsHandled => record.projects_handled,
            Feature::TrainingHours => record.training_hours,
        }
    }
}

pub fn matrix(population: &[ScoredEmployee], features: &[Feature]) -> FeatureMatrix {
    population
        .iter()
        .map(|employee| features.iter().map(|f| f.value(employee)).collect())
        .collect()
}

pub fn columns(features: &[Feature]) -> Vec<&'static str> {
    features.iter().map(Feature::column).collect()
}

pub fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}
