use crate::config::ConfigError;
use crate::scoring::ScoringError;
use crate::telemetry::TelemetryError;
use crate::workflows::history::HistoryImportError;
use crate::workflows::prediction::PredictionError;
use crate::workflows::ranking::RankingError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Csv(csv::Error),
    Scoring(ScoringError),
    Prediction(PredictionError),
    Ranking(RankingError),
    History(HistoryImportError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Csv(err) => write!(f, "csv error: {}", err),
            AppError::Scoring(err) => write!(f, "scoring error: {}", err),
            AppError::Prediction(err) => write!(f, "prediction error: {}", err),
            AppError::Ranking(err) => write!(f, "ranking error: {}", err),
            AppError::History(err) => write!(f, "history error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Csv(err) => Some(err),
            AppError::Scoring(err) => Some(err),
            AppError::Prediction(err) => Some(err),
            AppError::Ranking(err) => Some(err),
            AppError::History(err) => Some(err),
        }
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Csv(_) | AppError::History(_) | AppError::Scoring(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Prediction(err) => match err.root() {
                PredictionError::InvalidInput(_) => StatusCode::BAD_REQUEST,
                PredictionError::Model(_) => StatusCode::UNPROCESSABLE_ENTITY,
                PredictionError::Batch { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            },
            AppError::Ranking(RankingError::Model(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Ranking(RankingError::ModelOnlyUnsupported) => StatusCode::CONFLICT,
            AppError::Ranking(_) => StatusCode::BAD_REQUEST,
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<csv::Error> for AppError {
    fn from(value: csv::Error) -> Self {
        Self::Csv(value)
    }
}

impl From<ScoringError> for AppError {
    fn from(value: ScoringError) -> Self {
        Self::Scoring(value)
    }
}

impl From<PredictionError> for AppError {
    fn from(value: PredictionError) -> Self {
        Self::Prediction(value)
    }
}

impl From<RankingError> for AppError {
    fn from(value: RankingError) -> Self {
        Self::Ranking(value)
    }
}

impl From<HistoryImportError> for AppError {
    fn from(value: HistoryImportError) -> Self {
        Self::History(value)
    }
}
