use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::Serialize;

use super::domain::PredictionOutcome;
use crate::scoring::{ConfidenceLevel, RecommendationTier};

/// How many dispatches the risk and overrun lists keep.
pub const HIGHLIGHT_COUNT: usize = 10;

/// Aggregate view of a scored batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionSummary {
    pub total: usize,
    pub predicted_successes: usize,
    pub predicted_failures: usize,
    pub mean_success_probability: f64,
    pub mean_expected_duration_minutes: f64,
    pub mean_estimated_duration_minutes: f64,
    pub mean_duration_difference_minutes: f64,
    pub recommendations: BTreeMap<RecommendationTier, usize>,
    pub confidence: BTreeMap<ConfidenceLevel, usize>,
    pub riskiest: Vec<PredictionHighlight>,
    pub longest_overruns: Vec<PredictionHighlight>,
}

/// Short reference to one scored dispatch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionHighlight {
    pub dispatch_id: Option<String>,
    pub success_probability: f64,
    pub duration_difference_minutes: f64,
    pub recommendation: String,
}

impl PredictionHighlight {
    fn from_outcome(outcome: &PredictionOutcome) -> Self {
        Self {
            dispatch_id: outcome.dispatch_id.clone(),
            success_probability: outcome.success_probability,
            duration_difference_minutes: outcome.duration_difference_minutes,
            recommendation: outcome.recommendation.to_string(),
        }
    }
}

impl PredictionSummary {
    pub fn from_outcomes(outcomes: &[PredictionOutcome]) -> Self {
        let total = outcomes.len();
        let predicted_successes = outcomes
            .iter()
            .filter(|outcome| outcome.success_prediction)
            .count();

        let mut recommendations = BTreeMap::new();
        let mut confidence = BTreeMap::new();
        for outcome in outcomes {
            *recommendations.entry(outcome.recommendation.tier).or_insert(0) += 1;
            *confidence.entry(outcome.confidence).or_insert(0) += 1;
        }

        let mut by_risk: Vec<&PredictionOutcome> = outcomes.iter().collect();
        by_risk.sort_by(|a, b| {
            a.success_probability
                .partial_cmp(&b.success_probability)
                .unwrap_or(Ordering::Equal)
        });

        let mut by_overrun: Vec<&PredictionOutcome> = outcomes.iter().collect();
        by_overrun.sort_by(|a, b| {
            b.duration_difference_minutes
                .partial_cmp(&a.duration_difference_minutes)
                .unwrap_or(Ordering::Equal)
        });

        Self {
            total,
            predicted_successes,
            predicted_failures: total - predicted_successes,
            mean_success_probability: mean(outcomes.iter().map(|o| o.success_probability)),
            mean_expected_duration_minutes: mean(
                outcomes.iter().map(|o| o.expected_duration_minutes),
            ),
            mean_estimated_duration_minutes: mean(
                outcomes.iter().map(|o| o.estimated_duration_minutes),
            ),
            mean_duration_difference_minutes: mean(
                outcomes.iter().map(|o| o.duration_difference_minutes),
            ),
            recommendations,
            confidence,
            riskiest: by_risk
                .into_iter()
                .take(HIGHLIGHT_COUNT)
                .map(PredictionHighlight::from_outcome)
                .collect(),
            longest_overruns: by_overrun
                .into_iter()
                .take(HIGHLIGHT_COUNT)
                .map(PredictionHighlight::from_outcome)
                .collect(),
        }
    }

    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.predicted_successes as f64 / self.total as f64
        }
    }
}

pub(crate) fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), value| (sum + value, count + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}
