use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::{CategoryTally, GroupSummary, ScoredEmployee, SwotCategory};
use crate::stats::{mean, median, percentage, round_to};

pub const THREAT_PERCENTAGE_PLACES: u32 = 1;

/// Rolls scored employees up by department, ordered by department name.
pub fn aggregate(scored: &[ScoredEmployee], mean_precision: u32) -> Vec<GroupSummary> {
    let mut groups: BTreeMap<&str, Vec<&ScoredEmployee>> = BTreeMap::new();
    for employee in scored {
        groups
            .entry(employee.record.department.as_str())
            .or_default()
            .push(employee);
    }

    groups
        .into_iter()
        .map(|(department, members)| summarize_group(department, &members, mean_precision))
        .collect()
}

pub fn summarize_group(
    department: &str,
    members: &[&ScoredEmployee],
    mean_precision: u32,
) -> GroupSummary {
    if members.is_empty() {
        return GroupSummary::empty(department);
    }

    let mut tally = CategoryTally::default();
    for member in members {
        tally.record(member.category);
    }

    let column = |field: fn(&ScoredEmployee) -> f64| -> f64 {
        let values: Vec<f64> = members.iter().map(|member| field(member)).collect();
        round_to(mean(&values), mean_precision)
    };

    GroupSummary {
        department: department.to_string(),
        count: members.len(),
        tally,
        avg_productivity: column(|e| e.scores.productivity),
        avg_engagement: column(|e| e.scores.engagement),
        avg_risk: column(|e| e.scores.risk),
        threat_percentage: round_to(
            percentage(tally.threats, members.len()),
            THREAT_PERCENTAGE_PLACES,
        ),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SwotDistribution {
    pub total: usize,
    pub tally: CategoryTally,
}

impl SwotDistribution {
    pub fn count(&self, category: SwotCategory) -> usize {
        self.tally.count(category)
    }

    /// Share of the population in `category`, rounded to one decimal.
    pub fn percentage(&self, category: SwotCategory) -> f64 {
        round_to(percentage(self.count(category), self.total), 1)
    }
}

pub fn distribution(scored: &[ScoredEmployee]) -> SwotDistribution {
    let mut tally = CategoryTally::default();
    for employee in scored {
        tally.record(employee.category);
    }
    SwotDistribution {
        total: scored.len(),
        tally,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreSummary {
    pub mean: f64,
    pub median: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreStatistics {
    pub productivity: ScoreSummary,
    pub engagement: ScoreSummary,
    pub risk: ScoreSummary,
}

pub fn score_statistics(scored: &[ScoredEmployee]) -> ScoreStatistics {
    let summary = |field: fn(&ScoredEmployee) -> f64| {
        let values: Vec<f64> = scored.iter().map(field).collect();
        ScoreSummary {
            mean: mean(&values),
            median: median(&values),
        }
    };

    ScoreStatistics {
        productivity: summary(|e| e.scores.productivity),
        engagement: summary(|e| e.scores.engagement),
        risk: summary(|e| e.scores.risk),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DerivedScores, EmployeeRecord};

    fn employee(department: &str, category: SwotCategory, productivity: f64) -> ScoredEmployee {
        ScoredEmployee {
            record: EmployeeRecord::placeholder("E", department, "Analyst"),
            scores: DerivedScores {
                productivity,
                engagement: 2.0,
                risk: 1.0,
                ..DerivedScores::default()
            },
            category,
            substituted: false,
            cluster: None,
            anomaly: None,
            attrition: None,
        }
    }

    #[test]
    fn groups_are_summarized_per_department() {
        let scored = vec![
            employee("Sales", SwotCategory::Strength, 3.0),
            employee("Sales", SwotCategory::Opportunity, 2.0),
            employee("IT", SwotCategory::Threat, 1.0),
            employee("IT", SwotCategory::Threat, 1.5),
        ];

        let summaries = aggregate(&scored, 2);
        assert_eq!(summaries.len(), 2);

        let it = &summaries[0];
        assert_eq!(it.department, "IT");
        assert_eq!(it.count, 2);
        assert_eq!(it.tally.threats, 2);
        assert_eq!(it.avg_productivity, 1.25);
        assert_eq!(it.threat_percentage, 100.0);

        let sales = &summaries[1];
        assert_eq!(sales.department, "Sales");
        assert_eq!(sales.tally.strengths, 1);
        assert_eq!(sales.tally.opportunities, 1);
        assert_eq!(sales.avg_productivity, 2.5);
        assert_eq!(sales.threat_percentage, 0.0);
    }

    #[test]
    fn threat_percentage_pairs_threats_with_their_own_group() {
        let scored = vec![
            employee("A", SwotCategory::Opportunity, 2.0),
            employee("A", SwotCategory::Strength, 2.0),
            employee("B", SwotCategory::Threat, 2.0),
            employee("B", SwotCategory::Threat, 2.0),
        ];
        let percentages: Vec<f64> = aggregate(&scored, 2)
            .iter()
            .map(|summary| summary.threat_percentage)
            .collect();
        assert_eq!(percentages, vec![0.0, 100.0]);
    }

    #[test]
    fn threat_percentage_rounds_to_one_decimal() {
        let scored = vec![
            employee("Ops", SwotCategory::Threat, 2.0),
            employee("Ops", SwotCategory::Opportunity, 2.0),
            employee("Ops", SwotCategory::Opportunity, 2.0),
        ];
        assert_eq!(aggregate(&scored, 2)[0].threat_percentage, 33.3);
    }

    #[test]
    fn mean_precision_is_configurable() {
        let scored = vec![
            employee("Ops", SwotCategory::Opportunity, 1.0),
            employee("Ops", SwotCategory::Opportunity, 1.0),
            employee("Ops", SwotCategory::Opportunity, 2.0),
        ];
        assert_eq!(aggregate(&scored, 1)[0].avg_productivity, 1.3);
        assert_eq!(aggregate(&scored, 3)[0].avg_productivity, 1.333);
    }

    #[test]
    fn empty_group_is_zero_filled() {
        let summary = summarize_group("Legal", &[], 2);
        assert_eq!(summary.count, 0);
        assert_eq!(summary.threat_percentage, 0.0);
        assert_eq!(summary.avg_risk, 0.0);
        assert!(aggregate(&[], 2).is_empty());
    }

    #[test]
    fn distribution_reports_rounded_percentages() {
        let scored = vec![
            employee("A", SwotCategory::Strength, 2.0),
            employee("A", SwotCategory::Threat, 2.0),
            employee("B", SwotCategory::Threat, 2.0),
        ];
        let dist = distribution(&scored);
        assert_eq!(dist.total, 3);
        assert_eq!(dist.count(SwotCategory::Threat), 2);
        assert_eq!(dist.percentage(SwotCategory::Threat), 66.7);
        assert_eq!(dist.percentage(SwotCategory::Weakness), 0.0);
        assert_eq!(distribution(&[]).percentage(SwotCategory::Strength), 0.0);
    }

    #[test]
    fn score_statistics_reports_mean_and_median() {
        let scored = vec![
            employee("A", SwotCategory::Strength, 1.0),
            employee("A", SwotCategory::Strength, 2.0),
            employee("A", SwotCategory::Strength, 6.0),
        ];
        let stats = score_statistics(&scored);
        assert_eq!(stats.productivity.mean, 3.0);
        assert_eq!(stats.productivity.median, 2.0);
        assert_eq!(stats.risk.mean, 1.0);
    }
}
