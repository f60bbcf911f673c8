use serde::{Deserialize, Serialize};

use crate::models::{DerivedScores, SwotCategory};
use crate::thresholds::Thresholds;

/// Rule ordering used to turn scores into a SWOT category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategorizationPolicy {
    /// Strength, Threat (high risk with a low score), Weakness (both low).
    Quartile,
    /// Strength, Threat (any low score or high risk), Weakness (mid band).
    FixedBand,
}

/// One entry in a policy's priority list.
pub struct Rule {
    pub category: SwotCategory,
    pub description: &'static str,
    pub matches: fn(&DerivedScores, &Thresholds) -> bool,
}

static QUARTILE_RULES: [Rule; 3] = [
    Rule {
        category: SwotCategory::Strength,
        description: "high productivity, high engagement, low risk",
        matches: is_strength,
    },
    Rule {
        category: SwotCategory::Threat,
        description: "high risk with low productivity or low engagement",
        matches: is_quartile_threat,
    },
    Rule {
        category: SwotCategory::Weakness,
        description: "low productivity and low engagement",
        matches: is_quartile_weakness,
    },
];

static FIXED_BAND_RULES: [Rule; 3] = [
    Rule {
        category: SwotCategory::Strength,
        description: "high productivity, high engagement, low risk",
        matches: is_strength,
    },
    Rule {
        category: SwotCategory::Threat,
        description: "productivity or engagement below band, or high risk",
        matches: is_band_threat,
    },
    Rule {
        category: SwotCategory::Weakness,
        description: "productivity and engagement inside the middle band",
        matches: is_band_weakness,
    },
];

impl CategorizationPolicy {
    pub fn label(&self) -> &'static str {
        match self {
            CategorizationPolicy::Quartile => "quartile",
            CategorizationPolicy::FixedBand => "fixed band",
        }
    }

    /// Rules in evaluation order; anything unmatched is an Opportunity.
    pub fn rules(&self) -> &'static [Rule] {
        match self {
            CategorizationPolicy::Quartile => &QUARTILE_RULES,
            CategorizationPolicy::FixedBand => &FIXED_BAND_RULES,
        }
    }
}

pub fn categorize(
    scores: &DerivedScores,
    thresholds: &Thresholds,
    policy: CategorizationPolicy,
) -> SwotCategory {
    policy
        .rules()
        .iter()
        .find(|rule| (rule.matches)(scores, thresholds))
        .map(|rule| rule.category)
        .unwrap_or(SwotCategory::Opportunity)
}

fn is_strength(scores: &DerivedScores, thresholds: &Thresholds) -> bool {
    scores.productivity >= thresholds.productivity.high
        && scores.engagement >= thresholds.engagement.high
        && scores.risk <= thresholds.risk.low
}

fn is_quartile_threat(scores: &DerivedScores, thresholds: &Thresholds) -> bool {
    scores.risk >= thresholds.risk.high
        && (is_low_productivity(scores, thresholds) || is_low_engagement(scores, thresholds))
}

fn is_quartile_weakness(scores: &DerivedScores, thresholds: &Thresholds) -> bool {
    is_low_productivity(scores, thresholds) && is_low_engagement(scores, thresholds)
}

fn is_band_threat(scores: &DerivedScores, thresholds: &Thresholds) -> bool {
    scores.productivity < thresholds.productivity.low
        || scores.engagement < thresholds.engagement.low
        || scores.risk >= thresholds.risk.high
}

fn is_band_weakness(scores: &DerivedScores, thresholds: &Thresholds) -> bool {
    (thresholds.productivity.low..thresholds.productivity.high).contains(&scores.productivity)
        && (thresholds.engagement.low..thresholds.engagement.high).contains(&scores.engagement)
}

fn is_low_productivity(scores: &DerivedScores, thresholds: &Thresholds) -> bool {
    scores.productivity <= thresholds.productivity.low
}

fn is_low_engagement(scores: &DerivedScores, thresholds: &Thresholds) -> bool {
    scores.engagement <= thresholds.engagement.low
}
