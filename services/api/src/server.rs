use crate::cli::ServeArgs;
use crate::infra::{apply_overrides, AppState};
use crate::routes::with_scoring_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use dispatch_scoring::config::AppConfig;
use dispatch_scoring::error::AppError;
use dispatch_scoring::telemetry;
use dispatch_scoring::workflows::prediction::DispatchPredictor;
use dispatch_scoring::workflows::ranking::TechnicianRanker;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }
    apply_overrides(&mut config.scoring, &args.blend, args.top_n)?;

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let predictor = Arc::new(DispatchPredictor::from_config(&config.scoring));
    let ranker = TechnicianRanker::from_config(&config.scoring)?;

    let app = with_scoring_routes(predictor, ranker)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        rule_weight = config.scoring.rule_weight.rule_share(),
        mode = ?config.scoring.blend_mode,
        top_n = config.scoring.top_n,
        "dispatch scoring service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
