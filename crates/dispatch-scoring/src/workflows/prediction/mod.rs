//! Dispatch prediction: rule and model blending, recommendations, projected
//! grades, batch scoring, and the CSV and HTTP surfaces around them.

pub mod domain;
pub mod model;
pub mod parser;
pub mod router;
pub mod service;
pub mod summary;

#[cfg(test)]
mod tests;

pub use domain::{BlendMode, DispatchInput, PredictionOutcome, PredictionRequest};
pub use model::{DispatchModel, ModelError, ModelEstimate};
pub use parser::{parse_requests, write_outcomes};
pub use router::prediction_router;
pub use service::{DispatchPredictor, PredictionError, SUCCESS_THRESHOLD};
pub use summary::{PredictionHighlight, PredictionSummary, HIGHLIGHT_COUNT};
