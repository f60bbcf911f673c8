//! Business-facing summary of an analysis run: health score, risk drivers,
//! department ranking, highlighted employees and prioritised recommendations.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::categorize::CategorizationPolicy;
use crate::model::{ModelKind, ModelStatus};
use crate::models::{AttritionRiskLevel, ScoredEmployee, SeverityLevel, SwotCategory};
use crate::pipeline::AnalysisRun;
use crate::stats::{mean, percentage, round_to};

/// Alert cutoffs, all in percent, plus the productivity floor for top performers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecommendationBands {
    pub critical_threat: f64,
    pub elevated_threat: f64,
    pub low_strength: Option<f64>,
    pub department_threat: f64,
    pub top_performer_productivity: Option<f64>,
}

impl RecommendationBands {
    pub fn for_policy(policy: CategorizationPolicy) -> Self {
        match policy {
            CategorizationPolicy::Quartile => Self {
                critical_threat: 20.0,
                elevated_threat: 10.0,
                low_strength: Some(15.0),
                department_threat: 25.0,
                top_performer_productivity: None,
            },
            // Quick validation pass: tighter threat alerts, no strength alert.
            CategorizationPolicy::FixedBand => Self {
                critical_threat: 15.0,
                elevated_threat: 10.0,
                low_strength: None,
                department_threat: 20.0,
                top_performer_productivity: Some(4.0),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Insights {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub dataset: DatasetSummary,
    pub swot: SwotSummary,
    pub risk: RiskAnalysis,
    pub departments: Vec<DepartmentRanking>,
    pub highest_risk: Vec<EmployeeHighlight>,
    pub top_performers: Vec<EmployeeHighlight>,
    pub recommendations: Vec<Recommendation>,
    pub models: Vec<ModelSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetSummary {
    pub total_employees: usize,
    pub departments: usize,
    pub avg_tenure: f64,
    pub substituted_records: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryShare {
    pub category: SwotCategory,
    pub count: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SwotSummary {
    pub distribution: Vec<CategoryShare>,
    pub health_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskFactor {
    pub factor: &'static str,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskAnalysis {
    pub high_risk_count: usize,
    pub high_risk_percentage: f64,
    pub avg_risk_score: f64,
    /// Ordered by prevalence, most common first.
    pub top_risk_factors: Vec<RiskFactor>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DepartmentRanking {
    pub department: String,
    pub total: usize,
    pub threats: usize,
    pub threat_percentage: f64,
    pub avg_productivity: f64,
    pub avg_engagement: f64,
    pub avg_risk: f64,
    pub avg_attrition_probability: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmployeeHighlight {
    pub employee_id: String,
    pub department: String,
    pub job_title: String,
    pub category: SwotCategory,
    pub productivity: f64,
    pub engagement: f64,
    pub risk: f64,
}

impl From<&ScoredEmployee> for EmployeeHighlight {
    fn from(employee: &ScoredEmployee) -> Self {
        Self {
            employee_id: employee.record.employee_id.clone(),
            department: employee.record.department.clone(),
            job_title: employee.record.job_title.clone(),
            category: employee.category,
            productivity: employee.scores.productivity,
            engagement: employee.scores.engagement,
            risk: employee.scores.risk,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Priority {
    Critical,
    High,
    Medium,
}

impl Priority {
    pub fn label(&self) -> &'static str {
        match self {
            Priority::Critical => "CRITICAL",
            Priority::High => "HIGH",
            Priority::Medium => "MEDIUM",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub priority: Priority,
    pub category: &'static str,
    pub action: String,
    pub expected_impact: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelSummary {
    pub model: ModelKind,
    pub status: ModelStatus,
}

pub fn generate_insights(run: &AnalysisRun) -> Insights {
    let scored = &run.scored;
    let total = scored.len();

    let distribution: Vec<CategoryShare> = SwotCategory::ordered()
        .into_iter()
        .map(|category| CategoryShare {
            category,
            count: run.distribution.count(category),
            percentage: run.distribution.percentage(category),
        })
        .collect();
    let share = |category: SwotCategory| run.distribution.percentage(category);

    let bands = RecommendationBands::for_policy(run.config.categorization_policy);
    let departments = rank_departments(run);
    let recommendations = recommend(
        &bands,
        share(SwotCategory::Threat),
        share(SwotCategory::Strength),
        &departments,
    );

    let high_risk: Vec<&ScoredEmployee> = scored.iter().filter(|e| is_high_risk(e)).collect();
    let top_n = run.config.report.top_n;

    Insights {
        run_id: run.run_id,
        generated_at: run.generated_at,
        dataset: DatasetSummary {
            total_employees: total,
            departments: scored
                .iter()
                .map(|e| e.record.department.as_str())
                .collect::<BTreeSet<_>>()
                .len(),
            avg_tenure: round_to(
                mean(&scored.iter().map(|e| e.record.years_at_company).collect::<Vec<_>>()),
                2,
            ),
            substituted_records: run.substituted,
        },
        swot: SwotSummary {
            distribution,
            health_score: health_score(
                share(SwotCategory::Strength),
                share(SwotCategory::Opportunity),
                share(SwotCategory::Weakness),
                share(SwotCategory::Threat),
            ),
        },
        risk: RiskAnalysis {
            high_risk_count: high_risk.len(),
            high_risk_percentage: round_to(percentage(high_risk.len(), total), 1),
            avg_risk_score: round_to(run.statistics.risk.mean, 2),
            top_risk_factors: risk_factors(scored),
        },
        departments,
        highest_risk: highest_risk(&high_risk, top_n),
        top_performers: top_performers(scored, bands.top_performer_productivity, top_n),
        recommendations,
        models: run
            .models
            .statuses()
            .into_iter()
            .map(|(model, status)| ModelSummary { model, status })
            .collect(),
    }
}

/// Weighted sum of category percentages; positive means more strengths and
/// opportunities than weaknesses and threats.
pub fn health_score(strength: f64, opportunity: f64, weakness: f64, threat: f64) -> f64 {
    round_to(strength * 1.0 + opportunity * 0.7 - weakness * 0.3 - threat * 1.0, 1)
}

/// Threat category, a High/Very High attrition tier, or a High anomaly severity.
pub fn is_high_risk(employee: &ScoredEmployee) -> bool {
    employee.category == SwotCategory::Threat
        || employee.attrition.is_some_and(|a| {
            matches!(a.risk_level, AttritionRiskLevel::High | AttritionRiskLevel::VeryHigh)
        })
        || employee
            .anomaly
            .is_some_and(|a| a.severity_level == SeverityLevel::High)
}

pub fn risk_factors(scored: &[ScoredEmployee]) -> Vec<RiskFactor> {
    let count = |predicate: fn(&ScoredEmployee) -> bool| {
        scored.iter().filter(|e| !e.substituted && predicate(e)).count()
    };

    let mut factors = vec![
        RiskFactor {
            factor: "high_overtime",
            count: count(|e| e.record.overtime_hours > 20.0),
        },
        RiskFactor {
            factor: "low_satisfaction",
            count: count(|e| e.record.satisfaction_score < 2.5),
        },
        RiskFactor {
            factor: "high_sick_days",
            count: count(|e| e.record.sick_days > 10.0),
        },
        RiskFactor {
            factor: "low_performance",
            count: count(|e| e.record.performance_score < 3.0),
        },
        RiskFactor {
            factor: "no_training",
            count: count(|e| e.record.training_hours == 0.0),
        },
    ];
    // Stable sort keeps the declaration order between equal counts.
    factors.sort_by(|a, b| b.count.cmp(&a.count));
    factors
}

fn rank_departments(run: &AnalysisRun) -> Vec<DepartmentRanking> {
    let mut ranking: Vec<DepartmentRanking> = run
        .departments
        .iter()
        .map(|summary| {
            let probabilities: Vec<f64> = run
                .scored
                .iter()
                .filter(|e| e.record.department == summary.department)
                .filter_map(|e| e.attrition.map(|a| a.probability))
                .collect();
            DepartmentRanking {
                department: summary.department.clone(),
                total: summary.count,
                threats: summary.tally.threats,
                threat_percentage: summary.threat_percentage,
                avg_productivity: summary.avg_productivity,
                avg_engagement: summary.avg_engagement,
                avg_risk: summary.avg_risk,
                avg_attrition_probability: (!probabilities.is_empty())
                    .then(|| round_to(mean(&probabilities), 3)),
            }
        })
        .collect();
    ranking.sort_by(|a, b| b.threat_percentage.total_cmp(&a.threat_percentage));
    ranking
}

fn recommend(
    bands: &RecommendationBands,
    threat_percentage: f64,
    strength_percentage: f64,
    departments: &[DepartmentRanking],
) -> Vec<Recommendation> {
    let mut recommendations = Vec::new();

    if threat_percentage > bands.critical_threat {
        recommendations.push(Recommendation {
            priority: Priority::Critical,
            category: "Risk Mitigation",
            action: "Implement immediate intervention program for high-threat employees".to_string(),
            expected_impact: "Reduce turnover risk by 15-25%",
        });
    } else if threat_percentage > bands.elevated_threat {
        recommendations.push(Recommendation {
            priority: Priority::Medium,
            category: "Manager Engagement",
            action: "Increase manager-employee check-ins and review workload and support systems"
                .to_string(),
            expected_impact: "Keep threat levels from escalating",
        });
    }

    if bands.low_strength.is_some_and(|floor| strength_percentage < floor) {
        recommendations.push(Recommendation {
            priority: Priority::High,
            category: "Performance Enhancement",
            action: "Develop talent development programs to move Opportunities to Strengths".to_string(),
            expected_impact: "Increase top performer retention by 20%",
        });
    }

    let flagged: Vec<&str> = departments
        .iter()
        .filter(|d| d.threat_percentage > bands.department_threat)
        .map(|d| d.department.as_str())
        .collect();
    if !flagged.is_empty() {
        recommendations.push(Recommendation {
            priority: Priority::High,
            category: "Departmental Focus",
            action: format!("Conduct culture assessment in: {}", flagged.join(", ")),
            expected_impact: "Improve departmental satisfaction by 15%",
        });
    }

    recommendations.sort_by_key(|r| r.priority);
    recommendations
}

fn highest_risk(high_risk: &[&ScoredEmployee], limit: usize) -> Vec<EmployeeHighlight> {
    let mut ranked = high_risk.to_vec();
    ranked.sort_by(|a, b| b.scores.risk.total_cmp(&a.scores.risk));
    ranked.into_iter().take(limit).map(EmployeeHighlight::from).collect()
}

fn top_performers(
    scored: &[ScoredEmployee],
    min_productivity: Option<f64>,
    limit: usize,
) -> Vec<EmployeeHighlight> {
    let mut strengths: Vec<&ScoredEmployee> = scored
        .iter()
        .filter(|e| e.category == SwotCategory::Strength)
        .filter(|e| min_productivity.map_or(true, |floor| e.scores.productivity >= floor))
        .collect();
    strengths.sort_by(|a, b| b.scores.productivity.total_cmp(&a.scores.productivity));
    strengths.into_iter().take(limit).map(EmployeeHighlight::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AnomalyAssessment, AttritionAssessment, DerivedScores, EmployeeRecord};

    fn employee(department: &str, category: SwotCategory, risk: f64) -> ScoredEmployee {
        ScoredEmployee {
            record: EmployeeRecord::placeholder("E", department, "Analyst"),
            scores: DerivedScores {
                productivity: 3.0,
                engagement: 3.0,
                risk,
                ..DerivedScores::default()
            },
            category,
            substituted: false,
            cluster: None,
            anomaly: None,
            attrition: None,
        }
    }

    fn quartile() -> RecommendationBands {
        RecommendationBands::for_policy(CategorizationPolicy::Quartile)
    }

    fn fixed_band() -> RecommendationBands {
        RecommendationBands::for_policy(CategorizationPolicy::FixedBand)
    }

    fn ranking(department: &str, threat_percentage: f64) -> DepartmentRanking {
        DepartmentRanking {
            department: department.to_string(),
            total: 10,
            threats: 0,
            threat_percentage,
            avg_productivity: 3.0,
            avg_engagement: 3.0,
            avg_risk: 1.0,
            avg_attrition_probability: None,
        }
    }

    #[test]
    fn health_score_weights_each_category() {
        assert!((health_score(20.0, 30.0, 10.0, 40.0) - (-2.0)).abs() < 0.001);
        assert!((health_score(25.0, 25.0, 25.0, 25.0) - 10.0).abs() < 0.001);
    }

    #[test]
    fn high_threat_share_is_critical_and_first() {
        let departments = vec![ranking("Sales", 30.0), ranking("IT", 5.0)];
        let recommendations = recommend(&quartile(), 25.0, 10.0, &departments);
        let priorities: Vec<Priority> = recommendations.iter().map(|r| r.priority).collect();
        assert_eq!(priorities, vec![Priority::Critical, Priority::High, Priority::High]);
        assert_eq!(recommendations[0].category, "Risk Mitigation");
        assert_eq!(recommendations[2].action, "Conduct culture assessment in: Sales");
    }

    #[test]
    fn elevated_threat_share_is_medium() {
        let recommendations = recommend(&quartile(), 15.0, 40.0, &[]);
        assert_eq!(recommendations.len(), 1);
        assert_eq!(recommendations[0].priority, Priority::Medium);
        assert_eq!(recommendations[0].category, "Manager Engagement");
    }

    #[test]
    fn healthy_population_needs_no_recommendations() {
        assert!(recommend(&quartile(), 5.0, 30.0, &[ranking("IT", 25.0)]).is_empty());
    }

    #[test]
    fn high_risk_includes_model_flags() {
        let threat = employee("IT", SwotCategory::Threat, 3.0);
        let mut attrition = employee("IT", SwotCategory::Opportunity, 1.0);
        attrition.attrition = Some(AttritionAssessment {
            probability: 0.9,
            risk_level: AttritionRiskLevel::VeryHigh,
        });
        let mut anomaly = employee("IT", SwotCategory::Strength, 0.5);
        anomaly.anomaly = Some(AnomalyAssessment {
            is_outlier: true,
            anomaly_score: -0.2,
            severity_level: SeverityLevel::High,
        });
        let calm = employee("IT", SwotCategory::Opportunity, 1.0);

        assert!(is_high_risk(&threat));
        assert!(is_high_risk(&attrition));
        assert!(is_high_risk(&anomaly));
        assert!(!is_high_risk(&calm));
    }

    #[test]
    fn risk_factors_sorted_by_prevalence() {
        let mut tired = employee("IT", SwotCategory::Threat, 3.0);
        tired.record.overtime_hours = 30.0;
        tired.record.performance_score = 4.0;
        tired.record.satisfaction_score = 4.0;
        tired.record.training_hours = 10.0;
        let mut untrained = tired.clone();
        untrained.record.overtime_hours = 25.0;
        untrained.record.training_hours = 0.0;

        let factors = risk_factors(&[tired, untrained]);
        assert_eq!(factors[0].factor, "high_overtime");
        assert_eq!(factors[0].count, 2);
        assert_eq!(factors[1].factor, "no_training");
        assert_eq!(factors[1].count, 1);
        assert_eq!(factors.len(), 5);
    }

    #[test]
    fn highlights_are_capped_and_ordered() {
        let employees = [
            employee("IT", SwotCategory::Threat, 2.0),
            employee("IT", SwotCategory::Threat, 4.5),
            employee("IT", SwotCategory::Threat, 3.0),
        ];
        let refs: Vec<&ScoredEmployee> = employees.iter().collect();
        let top = highest_risk(&refs, 2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].risk, 4.5);
        assert_eq!(top[1].risk, 3.0);
    }

    #[test]
    fn fixed_band_alerts_fire_at_validation_cutoffs() {
        // 16% threat is critical here but only medium under quartile bands.
        let departments = [ranking("Sales", 21.0), ranking("IT", 19.0)];
        let validation = recommend(&fixed_band(), 16.0, 5.0, &departments);
        let priorities: Vec<Priority> = validation.iter().map(|r| r.priority).collect();
        assert_eq!(priorities, vec![Priority::Critical, Priority::High]);
        assert_eq!(validation[1].action, "Conduct culture assessment in: Sales");

        let quartile = recommend(&quartile(), 16.0, 5.0, &[ranking("Sales", 21.0)]);
        let priorities: Vec<Priority> = quartile.iter().map(|r| r.priority).collect();
        assert_eq!(priorities, vec![Priority::High, Priority::Medium]);
        assert_eq!(quartile[0].category, "Performance Enhancement");
    }

    #[test]
    fn fixed_band_warning_band_is_medium() {
        let recommendations = recommend(&fixed_band(), 12.0, 0.0, &[]);
        assert_eq!(recommendations.len(), 1);
        assert_eq!(recommendations[0].priority, Priority::Medium);
        assert!(recommend(&fixed_band(), 10.0, 0.0, &[ranking("IT", 20.0)]).is_empty());
    }

    #[test]
    fn top_performers_respect_productivity_floor() {
        let mut employees = [
            employee("IT", SwotCategory::Strength, 0.5),
            employee("IT", SwotCategory::Strength, 0.5),
            employee("IT", SwotCategory::Opportunity, 0.5),
        ];
        employees[0].scores.productivity = 4.2;
        employees[1].scores.productivity = 3.9;
        employees[2].scores.productivity = 4.8;

        let floored = top_performers(&employees, fixed_band().top_performer_productivity, 10);
        assert_eq!(floored.len(), 1);
        assert_eq!(floored[0].productivity, 4.2);

        let unfloored = top_performers(&employees, quartile().top_performer_productivity, 10);
        assert_eq!(unfloored.len(), 2);
        assert_eq!(unfloored[1].productivity, 3.9);
    }
}
