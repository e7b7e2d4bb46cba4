use super::common::*;
use crate::scoring::{ConfidenceLevel, RecommendationTier};
use crate::workflows::prediction::{BlendMode, PredictionSummary, HIGHLIGHT_COUNT};

#[test]
fn summary_counts_tiers_and_highlights_risk() {
    let predictor = predictor(BlendMode::Hybrid);
    let mut requests = Vec::new();
    for index in 0..12 {
        requests.push(request(
            favourable_dispatch(&format!("good-{index}")),
            estimate(0.8, 60.0 + index as f64),
        ));
    }
    for index in 0..3 {
        requests.push(request(
            hostile_dispatch(&format!("bad-{index}")),
            estimate(0.1 * index as f64, 200.0),
        ));
    }

    let outcomes = predictor.predict_batch(&requests).expect("batch succeeds");
    let summary = PredictionSummary::from_outcomes(&outcomes);

    assert_eq!(summary.total, 15);
    assert_eq!(summary.predicted_successes, 12);
    assert_eq!(summary.predicted_failures, 3);
    assert_close(summary.success_rate(), 12.0 / 15.0);
    assert_eq!(summary.recommendations.get(&RecommendationTier::Proceed), Some(&12));
    assert_eq!(
        summary.recommendations.get(&RecommendationTier::DoNotProceed),
        Some(&3)
    );
    assert_eq!(summary.confidence.get(&ConfidenceLevel::High), Some(&12));

    assert_eq!(summary.riskiest.len(), HIGHLIGHT_COUNT);
    assert_eq!(summary.riskiest[0].dispatch_id.as_deref(), Some("bad-0"));
    assert_eq!(summary.longest_overruns.len(), HIGHLIGHT_COUNT);
    assert_close(summary.longest_overruns[0].duration_difference_minutes, 110.0);
}

#[test]
fn empty_batch_summarises_to_zeroes() {
    let summary = PredictionSummary::from_outcomes(&[]);
    assert_eq!(summary.total, 0);
    assert_eq!(summary.success_rate(), 0.0);
    assert_eq!(summary.mean_success_probability, 0.0);
    assert!(summary.riskiest.is_empty());
    assert!(summary.recommendations.is_empty());
}
