use std::fmt::Write;

use crate::insights::Insights;
use crate::model::ModelStatus;
use crate::pipeline::AnalysisRun;
use crate::thresholds::ThresholdSource;

pub fn build_report(run: &AnalysisRun, insights: &Insights) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Workforce SWOT Report");
    let _ = writeln!(
        output,
        "Generated {} (run {}, {} scoring)",
        run.generated_at.format("%Y-%m-%d %H:%M UTC"),
        run.run_id,
        run.config.scoring_profile.label()
    );
    let _ = writeln!(output);

    let _ = writeln!(output, "## Dataset");
    let _ = writeln!(
        output,
        "- {} employees across {} departments (avg tenure {:.1} years)",
        insights.dataset.total_employees, insights.dataset.departments, insights.dataset.avg_tenure
    );
    if insights.dataset.substituted_records > 0 {
        let _ = writeln!(
            output,
            "- {} malformed records scored with neutral values",
            insights.dataset.substituted_records
        );
    }
    let _ = writeln!(output);

    let _ = writeln!(output, "## Thresholds");
    let source = match run.thresholds.source {
        ThresholdSource::Percentile => "25th/75th percentiles",
        ThresholdSource::Fixed => "fixed cutoffs",
        ThresholdSource::FixedFallback => "fixed cutoffs (population too small for percentiles)",
    };
    let _ = writeln!(output, "Source: {source}");
    for (name, band) in [
        ("Productivity", run.thresholds.productivity),
        ("Engagement", run.thresholds.engagement),
        ("Risk", run.thresholds.risk),
    ] {
        let _ = writeln!(output, "- {name}: low {:.2}, high {:.2}", band.low, band.high);
    }
    let policy = run.config.categorization_policy;
    let _ = writeln!(output, "Categorization ({} rules, first match wins):", policy.label());
    for (position, rule) in policy.rules().iter().enumerate() {
        let _ = writeln!(output, "{}. {}: {}", position + 1, rule.category, rule.description);
    }
    let _ = writeln!(output, "{}. Opportunity: anything else", policy.rules().len() + 1);
    let _ = writeln!(output);

    let _ = writeln!(output, "## SWOT Distribution");
    if insights.dataset.total_employees == 0 {
        let _ = writeln!(output, "No employees in this table.");
    } else {
        for share in insights.swot.distribution.iter() {
            let _ = writeln!(
                output,
                "- {}: {} ({:.1}%)",
                share.category, share.count, share.percentage
            );
        }
        let _ = writeln!(output, "- Health score: {:.1}", insights.swot.health_score);
    }
    let _ = writeln!(output);

    let stats = &run.statistics;
    let _ = writeln!(output, "## Score Statistics");
    let _ = writeln!(output, "| Score | Mean | Median |");
    let _ = writeln!(output, "|---|---|---|");
    for (name, summary) in [
        ("Productivity", stats.productivity),
        ("Engagement", stats.engagement),
        ("Risk", stats.risk),
    ] {
        let _ = writeln!(output, "| {name} | {:.2} | {:.2} |", summary.mean, summary.median);
    }
    let _ = writeln!(output);

    let _ = writeln!(output, "## Departments by Threat Share");
    if insights.departments.is_empty() {
        let _ = writeln!(output, "No departments recorded.");
    } else {
        let _ = writeln!(output, "| Department | Total | Threats | Threat % | Avg Prod | Avg Eng | Avg Risk |");
        let _ = writeln!(output, "|---|---|---|---|---|---|---|");
        for dept in insights.departments.iter() {
            let _ = writeln!(
                output,
                "| {} | {} | {} | {:.1} | {:.2} | {:.2} | {:.2} |",
                dept.department,
                dept.total,
                dept.threats,
                dept.threat_percentage,
                dept.avg_productivity,
                dept.avg_engagement,
                dept.avg_risk
            );
        }
    }
    let _ = writeln!(output);

    let _ = writeln!(output, "## Risk Analysis");
    let _ = writeln!(
        output,
        "- {} high-risk employees ({:.1}%), average risk score {:.2}",
        insights.risk.high_risk_count, insights.risk.high_risk_percentage, insights.risk.avg_risk_score
    );
    for factor in insights.risk.top_risk_factors.iter().filter(|f| f.count > 0) {
        let _ = writeln!(output, "- {}: {}", factor.factor, factor.count);
    }
    let _ = writeln!(output);

    let _ = writeln!(output, "## Highest Risk Employees");
    if insights.highest_risk.is_empty() {
        let _ = writeln!(output, "No high-risk employees identified.");
    } else {
        for employee in insights.highest_risk.iter() {
            let _ = writeln!(
                output,
                "- {} ({}, {}) risk {:.2}, productivity {:.2}, engagement {:.2}",
                employee.employee_id,
                employee.department,
                employee.category,
                employee.risk,
                employee.productivity,
                employee.engagement
            );
        }
    }
    let _ = writeln!(output);

    let _ = writeln!(output, "## Top Performers");
    if insights.top_performers.is_empty() {
        let _ = writeln!(output, "No top performers in the Strength category.");
    } else {
        for employee in insights.top_performers.iter() {
            let _ = writeln!(
                output,
                "- {} ({}, {}) productivity {:.2}, engagement {:.2}",
                employee.employee_id,
                employee.department,
                employee.job_title,
                employee.productivity,
                employee.engagement
            );
        }
    }
    let _ = writeln!(output);

    let _ = writeln!(output, "## Recommendations");
    if insights.recommendations.is_empty() {
        let _ = writeln!(output, "Threat levels are manageable; continue current practices.");
    } else {
        for rec in insights.recommendations.iter() {
            let _ = writeln!(
                output,
                "- [{}] {}: {} (expected impact: {})",
                rec.priority.label(),
                rec.category,
                rec.action,
                rec.expected_impact
            );
        }
    }
    let _ = writeln!(output);

    let _ = writeln!(output, "## Models");
    for summary in insights.models.iter() {
        let _ = writeln!(output, "- {}: {}", summary.model, summary.status);
    }
    if let Some(model) = run.models.attrition.fitted() {
        let test = model
            .test_accuracy
            .map(|accuracy| format!("{accuracy:.3}"))
            .unwrap_or_else(|| "n/a".to_string());
        let _ = writeln!(
            output,
            "- Attrition accuracy: train {:.3}, test {}",
            model.train_accuracy, test
        );
    }
    if let Some(model) = run.models.anomaly.fitted() {
        let _ = writeln!(
            output,
            "- Outliers flagged: {} (contamination {:.2})",
            model.outlier_count, model.forest.contamination
        );
        for point in model.contamination_sweep.iter() {
            let _ = writeln!(
                output,
                "  - at contamination {:.2}: {} outliers",
                point.contamination, point.outliers
            );
        }
    }
    if insights
        .models
        .iter()
        .all(|summary| summary.status == ModelStatus::Disabled)
    {
        let _ = writeln!(output, "Model layer disabled for this run.");
    }

    output
}
