use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use dispatch_scoring::workflows::prediction::{prediction_router, DispatchPredictor};
use dispatch_scoring::workflows::ranking::{ranking_router, TechnicianRanker};
use serde_json::json;
use std::sync::Arc;

/// Scoring endpoints plus the health and readiness checks.
///
/// Ranking shares the predictor's rule engine; there is no in-process model to
/// blend with, so ranking is refused when the predictor runs model-only.
pub(crate) fn with_scoring_routes(
    predictor: Arc<DispatchPredictor>,
    ranker: TechnicianRanker,
) -> axum::Router {
    let engine = predictor.shared_engine();
    let mode = predictor.mode();
    prediction_router(predictor)
        .merge(ranking_router(ranker, engine, mode))
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use dispatch_scoring::config::ScoringConfig;
    use dispatch_scoring::workflows::prediction::BlendMode;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use std::sync::atomic::AtomicBool;
    use tower::ServiceExt;

    fn app_with(ready: bool, predictor: DispatchPredictor) -> axum::Router {
        let state = AppState {
            readiness: Arc::new(AtomicBool::new(ready)),
            metrics: Arc::new(PrometheusBuilder::new().build_recorder().handle()),
        };
        with_scoring_routes(Arc::new(predictor), TechnicianRanker::default())
            .layer(Extension(state))
    }

    fn app(ready: bool) -> axum::Router {
        app_with(ready, DispatchPredictor::default())
    }

    async fn read_json_body(response: axum::response::Response) -> serde_json::Value {
        let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
            .await
            .expect("read body");
        serde_json::from_slice(&body).expect("json payload")
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .body(Body::empty())
            .expect("request builds")
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let response = app(false).oneshot(get("/health")).await.expect("responds");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(read_json_body(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn readiness_follows_the_flag() {
        let response = app(false).oneshot(get("/ready")).await.expect("responds");
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(read_json_body(response).await["status"], "initializing");

        let response = app(true).oneshot(get("/ready")).await.expect("responds");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(read_json_body(response).await["status"], "ready");
    }

    #[tokio::test]
    async fn metrics_render_as_prometheus_text() {
        let response = app(true).oneshot(get("/metrics")).await.expect("responds");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).and_then(|v| v.to_str().ok()),
            Some("text/plain; version=0.0.4")
        );
    }

    #[tokio::test]
    async fn workflow_routes_are_mounted() {
        let body = json!({
            "distance_km": 0.0,
            "overrun_minutes": 0.0,
            "signals": {"mode": "observed", "productive": true, "first_time_fix": true}
        });
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/grade")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .expect("request builds");

        let response = app(true).oneshot(request).await.expect("responds");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(read_json_body(response).await["breakdown"]["grade"], 100.0);

        let rank = Request::builder()
            .method("POST")
            .uri("/api/v1/rank")
            .header("content-type", "application/json")
            .body(Body::from(
                json!({"dispatches": [], "technicians": []}).to_string(),
            ))
            .expect("request builds");
        let response = app(true).oneshot(rank).await.expect("responds");
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn model_only_service_refuses_to_rank() {
        let predictor = DispatchPredictor::from_config(&ScoringConfig {
            blend_mode: BlendMode::ModelOnly,
            ..ScoringConfig::default()
        });

        let rank = Request::builder()
            .method("POST")
            .uri("/api/v1/rank")
            .header("content-type", "application/json")
            .body(Body::from(
                json!({"dispatches": [], "technicians": []}).to_string(),
            ))
            .expect("request builds");
        let response = app_with(true, predictor)
            .oneshot(rank)
            .await
            .expect("responds");
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }
}
