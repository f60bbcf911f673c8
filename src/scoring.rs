use serde::{Deserialize, Serialize};

use crate::models::{DerivedScores, EmployeeRecord};
use crate::stats::round2;

/// Which weighting of the raw attributes produces the derived scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoringProfile {
    /// Plain linear averages, unclipped.
    Basic,
    /// Reweighted formulas clipped to `[0, 5]`.
    Enhanced,
}

impl ScoringProfile {
    pub fn label(&self) -> &'static str {
        match self {
            ScoringProfile::Basic => "basic",
            ScoringProfile::Enhanced => "enhanced",
        }
    }
}

const SCORE_FLOOR: f64 = 0.0;
const SCORE_CEILING: f64 = 5.0;

pub fn score(record: &EmployeeRecord, profile: ScoringProfile) -> DerivedScores {
    match profile {
        ScoringProfile::Basic => score_basic(record),
        ScoringProfile::Enhanced => score_enhanced(record),
    }
}

fn score_basic(record: &EmployeeRecord) -> DerivedScores {
    let productivity = (record.performance_score * 2.0
        + record.work_hours_per_week / 40.0
        + record.projects_handled / 10.0
        + record.training_hours / 50.0
        - record.sick_days / 5.0
        + record.satisfaction_score / 5.0)
        / 6.0;

    let engagement = (record.satisfaction_score
        + record.training_hours / 10.0
        + record.promotions * 2.0
        - record.sick_days * 0.5)
        / 4.0;

    let resignation_penalty = if record.resigned { 5.0 } else { 0.0 };
    let risk = (record.sick_days
        + record.overtime_hours / 10.0
        + resignation_penalty
        + (5.0 - record.performance_score)
        - record.satisfaction_score)
        / 5.0;

    DerivedScores {
        productivity: round2(productivity),
        engagement: round2(engagement),
        risk: round2(risk),
        work_life_balance: round2(work_life_balance_tier(record.overtime_hours)),
        tenure_factor: round2(tenure_tier(record.years_at_company)),
    }
}

fn score_enhanced(record: &EmployeeRecord) -> DerivedScores {
    let productivity = (record.performance_score * 1.2
        + (record.work_hours_per_week / 50.0) * 2.0
        + (record.projects_handled / 15.0) * 1.5
        + (record.training_hours / 100.0) * 1.0
        + (record.satisfaction_score / 5.0) * 1.3)
        / 5.0;

    let engagement = (record.satisfaction_score * 1.5
        + (record.training_hours / 50.0) * 1.0
        + record.promotions * 3.0
        + (record.remote_work_frequency / 100.0) * 0.5
        - record.sick_days * 0.3)
        / 4.0;

    let resignation_penalty = if record.resigned { 2.0 } else { 0.0 };
    let risk = (record.sick_days * 0.3
        + record.overtime_hours / 15.0
        + resignation_penalty
        + (5.0 - record.performance_score) * 0.4
        + (5.0 - record.satisfaction_score) * 0.3)
        / 5.0;

    let work_life_balance = 5.0 - (record.overtime_hours / 10.0).clamp(0.0, 5.0);
    let tenure_factor = record.years_at_company.max(0.0).ln_1p().clamp(0.0, 3.0);

    DerivedScores {
        productivity: round2(clip_score(productivity)),
        engagement: round2(clip_score(engagement)),
        risk: round2(clip_score(risk)),
        work_life_balance: round2(work_life_balance),
        tenure_factor: round2(tenure_factor),
    }
}

fn clip_score(value: f64) -> f64 {
    value.clamp(SCORE_FLOOR, SCORE_CEILING)
}

pub fn work_life_balance_tier(overtime_hours: f64) -> f64 {
    match overtime_hours {
        hours if hours <= 5.0 => 5.0,
        hours if hours <= 15.0 => 4.0,
        hours if hours <= 25.0 => 3.0,
        _ => 2.0,
    }
}

pub fn tenure_tier(years_at_company: f64) -> f64 {
    match years_at_company {
        years if years <= 1.0 => 1.0,
        years if years <= 3.0 => 2.0,
        years if years <= 5.0 => 3.0,
        _ => 4.0,
    }
}
