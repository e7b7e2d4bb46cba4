use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::PredictionRequest;
use super::service::{DispatchPredictor, PredictionError};
use super::summary::PredictionSummary;
use crate::scoring::{GradeCalculator, OutcomeSignals};

/// HTTP endpoints for single and batch scoring plus direct grading.
pub fn prediction_router(predictor: Arc<DispatchPredictor>) -> Router {
    Router::new()
        .route("/api/v1/predict", post(predict_handler))
        .route("/api/v1/predict/batch", post(batch_handler))
        .route("/api/v1/grade", post(grade_handler))
        .with_state(predictor)
}

#[derive(Debug, Deserialize)]
pub(crate) struct BatchBody {
    pub dispatches: Vec<PredictionRequest>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GradeBody {
    pub distance_km: f64,
    #[serde(default)]
    pub overrun_minutes: f64,
    pub signals: OutcomeSignals,
}

pub(crate) async fn predict_handler(
    State(predictor): State<Arc<DispatchPredictor>>,
    axum::Json(request): axum::Json<PredictionRequest>,
) -> Response {
    match predictor.predict_request(&request) {
        Ok(outcome) => (StatusCode::OK, axum::Json(outcome)).into_response(),
        Err(error) => error_response(&error),
    }
}

pub(crate) async fn batch_handler(
    State(predictor): State<Arc<DispatchPredictor>>,
    axum::Json(body): axum::Json<BatchBody>,
) -> Response {
    match predictor.predict_batch(&body.dispatches) {
        Ok(outcomes) => {
            let summary = PredictionSummary::from_outcomes(&outcomes);
            let payload = json!({
                "predictions": outcomes,
                "summary": summary,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => error_response(&error),
    }
}

pub(crate) async fn grade_handler(axum::Json(body): axum::Json<GradeBody>) -> Response {
    if !body.distance_km.is_finite() || body.distance_km < 0.0 {
        let payload = json!({
            "error": format!("distance_km must be a non-negative number, got {}", body.distance_km),
        });
        return (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response();
    }

    let breakdown = GradeCalculator.breakdown(body.distance_km, body.overrun_minutes, body.signals);
    let payload = json!({
        "breakdown": breakdown,
        "letter": breakdown.grade.letter(),
    });
    (StatusCode::OK, axum::Json(payload)).into_response()
}

fn error_response(error: &PredictionError) -> Response {
    let status = match error.root() {
        PredictionError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        PredictionError::Model(_) => StatusCode::UNPROCESSABLE_ENTITY,
        PredictionError::Batch { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let payload = json!({
        "error": error.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}
