use std::sync::Arc;

use axum::response::Response;
use serde_json::Value;

use crate::scoring::{BlendWeight, DispatchFeatures, Priority, RuleEngine, TicketType};
use crate::workflows::prediction::{
    BlendMode, DispatchInput, DispatchModel, DispatchPredictor, ModelError, ModelEstimate,
    PredictionRequest,
};

pub(super) fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

/// Close, matched, lightly loaded dispatch; the rule estimate clips to 1.0.
pub(super) fn favourable_dispatch(id: &str) -> DispatchInput {
    DispatchInput {
        dispatch_id: Some(id.to_string()),
        ticket_type: Some(TicketType::Order),
        priority: Some(Priority::Normal),
        required_skill: Some("Fiber Splicing".to_string()),
        technician_skill: Some("Fiber Splicing".to_string()),
        skill_match: None,
        distance_km: 15.0,
        workload_ratio: Some(0.4),
        expected_duration_minutes: 60.0,
    }
}

/// Mismatched, overloaded, far dispatch; the rule estimate clips to 0.0.
pub(super) fn hostile_dispatch(id: &str) -> DispatchInput {
    DispatchInput {
        dispatch_id: Some(id.to_string()),
        ticket_type: Some(TicketType::Trouble),
        priority: Some(Priority::Critical),
        required_skill: Some("Fiber Splicing".to_string()),
        technician_skill: Some("Copper Repair".to_string()),
        skill_match: None,
        distance_km: 150.0,
        workload_ratio: Some(1.2),
        expected_duration_minutes: 90.0,
    }
}

pub(super) fn estimate(success_probability: f64, estimated_duration_minutes: f64) -> ModelEstimate {
    ModelEstimate {
        success_probability,
        estimated_duration_minutes,
    }
}

pub(super) fn request(dispatch: DispatchInput, model: ModelEstimate) -> PredictionRequest {
    PredictionRequest { dispatch, model }
}

pub(super) fn predictor(mode: BlendMode) -> DispatchPredictor {
    DispatchPredictor::new(
        Arc::new(RuleEngine::standard()),
        BlendWeight::default(),
        mode,
    )
}

/// Model stand-in that is never reachable.
pub(super) struct OfflineModel;

impl DispatchModel for OfflineModel {
    fn predict_success_probability(&self, _features: &DispatchFeatures) -> Result<f64, ModelError> {
        Err(ModelError::Unavailable("inference endpoint offline".to_string()))
    }

    fn predict_duration(&self, _features: &DispatchFeatures) -> Result<f64, ModelError> {
        Err(ModelError::Unavailable("inference endpoint offline".to_string()))
    }
}

/// Model whose probability tracks distance, to check features reach it.
pub(super) struct DistanceSensitiveModel;

impl DispatchModel for DistanceSensitiveModel {
    fn predict_success_probability(&self, features: &DispatchFeatures) -> Result<f64, ModelError> {
        Ok(if features.distance_km < 50.0 { 0.9 } else { 0.2 })
    }

    fn predict_duration(&self, _features: &DispatchFeatures) -> Result<f64, ModelError> {
        Ok(45.0)
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
