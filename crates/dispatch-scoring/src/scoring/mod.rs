//! Pure scoring engine.
//!
//! Every function here is synchronous and side-effect free. The tables behind
//! them are immutable, so callers can score from any number of threads.

mod blend;
mod category;
mod error;
mod features;
mod grade;
mod probability;
mod recommendation;
mod rules;

pub use blend::{blend, BlendWeight, DEFAULT_RULE_WEIGHT};
pub use category::{CategoryInterval, CategoryTable, DistanceBucket, WorkloadBucket};
pub use error::ScoringError;
pub use features::{
    skill_match, workload_ratio, DispatchFeatures, Priority, TicketType, DEFAULT_WORKLOAD_RATIO,
};
pub use grade::{
    distance_score, duration_score, Grade, GradeBreakdown, GradeCalculator, LetterGrade,
    OutcomeSignals,
};
pub use probability::Probability;
pub use recommendation::{
    ConfidenceLevel, DurationOutlook, RecommendationLabel, RecommendationTier,
    DURATION_WARNING_FRACTION,
};
pub use rules::{
    AdjustmentTable, RuleBreakdown, RuleContribution, RuleEngine, RuleFactor, BASE_SUCCESS_RATE,
};

use std::sync::OnceLock;

fn standard_engine() -> &'static RuleEngine {
    static ENGINE: OnceLock<RuleEngine> = OnceLock::new();
    ENGINE.get_or_init(RuleEngine::standard)
}

/// Rule-based success probability under the standard rule set.
pub fn compute_rule_probability(features: &DispatchFeatures) -> Probability {
    standard_engine().estimate(features)
}

/// Same computation as [`compute_rule_probability`], with its audit trail.
pub fn compute_rule_breakdown(features: &DispatchFeatures) -> RuleBreakdown {
    standard_engine().explain(features)
}

/// Blends raw scalars; fails only when an input is outside `[0, 1]`.
pub fn compute_blend(
    model_probability: f64,
    rule_probability: f64,
    rule_weight: f64,
) -> Result<Probability, ScoringError> {
    let weight = BlendWeight::new(rule_weight)?;
    let model = Probability::new(model_probability)?;
    let rule = Probability::new(rule_probability)?;
    Ok(blend(model, rule, weight))
}

/// Grades a dispatch. With `use_probability_mode` and a shared probability,
/// that probability replaces both the productive and first-time-fix flags.
pub fn compute_grade(
    distance_km: f64,
    overrun_minutes: f64,
    productive: bool,
    first_time_fix: bool,
    use_probability_mode: bool,
    shared_probability: Option<f64>,
) -> Result<GradeBreakdown, ScoringError> {
    let signals = match (use_probability_mode, shared_probability) {
        (true, Some(shared)) => OutcomeSignals::Estimated {
            shared_probability: Probability::new(shared)?,
        },
        _ => OutcomeSignals::Observed {
            productive,
            first_time_fix,
        },
    };
    Ok(GradeCalculator.breakdown(distance_km, overrun_minutes, signals))
}

pub fn classify_recommendation(
    probability: f64,
    duration_diff_minutes: f64,
    expected_duration_minutes: f64,
) -> RecommendationLabel {
    RecommendationLabel::classify(probability, duration_diff_minutes, expected_duration_minutes)
}
