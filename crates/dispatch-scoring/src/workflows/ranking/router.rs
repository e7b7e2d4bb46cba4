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

use super::domain::{OpenDispatch, Technician};
use super::engine::{RankingError, TechnicianRanker};
use super::summary::RankingSummary;
use crate::scoring::RuleEngine;
use crate::workflows::prediction::BlendMode;

#[derive(Debug)]
pub(crate) struct RankingState {
    ranker: TechnicianRanker,
    engine: Arc<RuleEngine>,
    mode: BlendMode,
}

/// Ranks a technician pool against dispatches using the rule estimate.
///
/// Requests carry no per-candidate model estimate, so in model-only mode the
/// route answers 409 instead of ranking.
pub fn ranking_router(
    ranker: TechnicianRanker,
    engine: Arc<RuleEngine>,
    mode: BlendMode,
) -> Router {
    Router::new()
        .route("/api/v1/rank", post(rank_handler))
        .with_state(Arc::new(RankingState {
            ranker,
            engine,
            mode,
        }))
}

#[derive(Debug, Deserialize)]
pub(crate) struct RankBody {
    pub dispatches: Vec<OpenDispatch>,
    pub technicians: Vec<Technician>,
    #[serde(default)]
    pub top_n: Option<usize>,
}

pub(crate) async fn rank_handler(
    State(state): State<Arc<RankingState>>,
    axum::Json(body): axum::Json<RankBody>,
) -> Response {
    if let Err(error) = TechnicianRanker::require_rule_estimates(state.mode) {
        return error_response(&error);
    }

    let ranker = match body.top_n {
        Some(top_n) => match TechnicianRanker::new(top_n) {
            Ok(ranker) => ranker,
            Err(error) => return error_response(&error),
        },
        None => state.ranker,
    };

    match ranker.rank_all(&body.dispatches, &body.technicians, state.engine.as_ref()) {
        Ok(rankings) => {
            let summary = RankingSummary::from_rankings(&rankings);
            let payload = json!({
                "rankings": rankings,
                "summary": summary,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => error_response(&error),
    }
}

fn error_response(error: &RankingError) -> Response {
    let status = match error {
        RankingError::InvalidTopN
        | RankingError::EmptyPool { .. }
        | RankingError::InvalidCoordinates { .. } => StatusCode::BAD_REQUEST,
        RankingError::ModelOnlyUnsupported => StatusCode::CONFLICT,
        RankingError::Model(_) => StatusCode::UNPROCESSABLE_ENTITY,
    };
    let payload = json!({
        "error": error.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use serde_json::Value;
    use tower::ServiceExt;

    fn router_in(mode: BlendMode) -> Router {
        ranking_router(
            TechnicianRanker::default(),
            Arc::new(RuleEngine::standard()),
            mode,
        )
    }

    fn router() -> Router {
        router_in(BlendMode::Hybrid)
    }

    fn post(body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/v1/rank")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .expect("request builds")
    }

    fn technicians() -> Value {
        json!([
            {
                "technician_id": "T-1",
                "skill": "Fiber",
                "location": {"latitude": 41.61, "longitude": -93.61},
                "current_assignments": 1,
                "workload_capacity": 5
            },
            {
                "technician_id": "T-2",
                "skill": "Copper",
                "location": {"latitude": 42.5, "longitude": -93.0},
                "workload_capacity": 5
            }
        ])
    }

    async fn read_json_body(response: Response) -> Value {
        let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
            .await
            .expect("read body");
        serde_json::from_slice(&body).expect("json payload")
    }

    #[tokio::test]
    async fn rank_route_returns_ordered_candidates() {
        let body = json!({
            "dispatches": [{
                "dispatch_id": "D-1",
                "required_skill": "Fiber",
                "location": {"latitude": 41.6, "longitude": -93.6},
                "priority": "High"
            }],
            "technicians": technicians(),
            "top_n": 1
        });

        let response = router().oneshot(post(body)).await.expect("router responds");
        assert_eq!(response.status(), StatusCode::OK);

        let payload = read_json_body(response).await;
        let candidates = payload["rankings"][0]["candidates"]
            .as_array()
            .expect("candidates");
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0]["technician_id"], "T-1");
        assert_eq!(candidates[0]["rank"], 1);
        assert_eq!(payload["summary"]["skill_match_rate"], 1.0);
    }

    #[tokio::test]
    async fn rank_route_rejects_zero_top_n() {
        let body = json!({
            "dispatches": [],
            "technicians": technicians(),
            "top_n": 0
        });

        let response = router().oneshot(post(body)).await.expect("router responds");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn rank_route_rejects_invalid_coordinates() {
        let body = json!({
            "dispatches": [{
                "dispatch_id": "D-1",
                "required_skill": "Fiber",
                "location": {"latitude": 123.0, "longitude": -93.6}
            }],
            "technicians": technicians()
        });

        let response = router().oneshot(post(body)).await.expect("router responds");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let payload = read_json_body(response).await;
        assert_eq!(payload["error"], "invalid coordinates for dispatch D-1");
    }

    #[tokio::test]
    async fn rank_route_refuses_model_only_mode() {
        let body = json!({
            "dispatches": [{
                "dispatch_id": "D-1",
                "required_skill": "Fiber",
                "location": {"latitude": 41.6, "longitude": -93.6}
            }],
            "technicians": technicians()
        });

        let response = router_in(BlendMode::ModelOnly)
            .oneshot(post(body))
            .await
            .expect("router responds");
        assert_eq!(response.status(), StatusCode::CONFLICT);
        let payload = read_json_body(response).await;
        assert!(payload["error"]
            .as_str()
            .is_some_and(|message| message.contains("model_only")));
        assert!(payload.get("rankings").is_none());
    }
}
