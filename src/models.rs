use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeRecord {
    pub employee_id: String,
    pub department: String,
    pub job_title: String,
    pub years_at_company: f64,
    pub performance_score: f64,
    pub work_hours_per_week: f64,
    pub projects_handled: f64,
    pub overtime_hours: f64,
    pub sick_days: f64,
    pub remote_work_frequency: f64,
    pub training_hours: f64,
    pub promotions: f64,
    pub satisfaction_score: f64,
    pub resigned: bool,
}

impl EmployeeRecord {
    /// Identity-only record with zeroed attributes, used when a row could not
    /// be parsed and the run substitutes neutral scores.
    pub fn placeholder(employee_id: &str, department: &str, job_title: &str) -> Self {
        Self {
            employee_id: employee_id.to_string(),
            department: department.to_string(),
            job_title: job_title.to_string(),
            years_at_company: 0.0,
            performance_score: 0.0,
            work_hours_per_week: 0.0,
            projects_handled: 0.0,
            overtime_hours: 0.0,
            sick_days: 0.0,
            remote_work_frequency: 0.0,
            training_hours: 0.0,
            promotions: 0.0,
            satisfaction_score: 0.0,
            resigned: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DerivedScores {
    pub productivity: f64,
    pub engagement: f64,
    pub risk: f64,
    pub work_life_balance: f64,
    pub tenure_factor: f64,
}

impl DerivedScores {
    pub fn neutral() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SwotCategory {
    Strength,
    Opportunity,
    Weakness,
    Threat,
}

impl SwotCategory {
    pub fn ordered() -> [SwotCategory; 4] {
        [
            SwotCategory::Strength,
            SwotCategory::Opportunity,
            SwotCategory::Weakness,
            SwotCategory::Threat,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            SwotCategory::Strength => "Strength",
            SwotCategory::Opportunity => "Opportunity",
            SwotCategory::Weakness => "Weakness",
            SwotCategory::Threat => "Threat",
        }
    }
}

impl fmt::Display for SwotCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CategoryTally {
    pub strengths: usize,
    pub opportunities: usize,
    pub weaknesses: usize,
    pub threats: usize,
}

impl CategoryTally {
    pub fn record(&mut self, category: SwotCategory) {
        match category {
            SwotCategory::Strength => self.strengths += 1,
            SwotCategory::Opportunity => self.opportunities += 1,
            SwotCategory::Weakness => self.weaknesses += 1,
            SwotCategory::Threat => self.threats += 1,
        }
    }

    pub fn count(&self, category: SwotCategory) -> usize {
        match category {
            SwotCategory::Strength => self.strengths,
            SwotCategory::Opportunity => self.opportunities,
            SwotCategory::Weakness => self.weaknesses,
            SwotCategory::Threat => self.threats,
        }
    }

    pub fn total(&self) -> usize {
        self.strengths + self.opportunities + self.weaknesses + self.threats
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupSummary {
    pub department: String,
    pub count: usize,
    pub tally: CategoryTally,
    pub avg_productivity: f64,
    pub avg_engagement: f64,
    pub avg_risk: f64,
    pub threat_percentage: f64,
}

impl GroupSummary {
    pub fn empty(department: &str) -> Self {
        Self {
            department: department.to_string(),
            count: 0,
            tally: CategoryTally::default(),
            avg_productivity: 0.0,
            avg_engagement: 0.0,
            avg_risk: 0.0,
            threat_percentage: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SeverityLevel {
    Low,
    Medium,
    High,
}

impl SeverityLevel {
    pub fn label(&self) -> &'static str {
        match self {
            SeverityLevel::Low => "Low",
            SeverityLevel::Medium => "Medium",
            SeverityLevel::High => "High",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnomalyAssessment {
    pub is_outlier: bool,
    pub anomaly_score: f64,
    pub severity_level: SeverityLevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AttritionRiskLevel {
    VeryLow,
    Low,
    Medium,
    High,
    VeryHigh,
}

impl AttritionRiskLevel {
    pub fn label(&self) -> &'static str {
        match self {
            AttritionRiskLevel::VeryLow => "Very Low",
            AttritionRiskLevel::Low => "Low",
            AttritionRiskLevel::Medium => "Medium",
            AttritionRiskLevel::High => "High",
            AttritionRiskLevel::VeryHigh => "Very High",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttritionAssessment {
    pub probability: f64,
    pub risk_level: AttritionRiskLevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterAssignment {
    pub cluster: usize,
    pub category: SwotCategory,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredEmployee {
    pub record: EmployeeRecord,
    pub scores: DerivedScores,
    pub category: SwotCategory,
    pub substituted: bool,
    pub cluster: Option<ClusterAssignment>,
    pub anomaly: Option<AnomalyAssessment>,
    pub attrition: Option<AttritionAssessment>,
}
