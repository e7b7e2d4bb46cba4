use crate::scoring::{DispatchFeatures, Probability};
use serde::{Deserialize, Serialize};

/// Statistical model collaborator.
///
/// Feature encoding and inference stay behind this trait; the engine only
/// consumes the resulting scalars.
pub trait DispatchModel: Send + Sync {
    fn predict_success_probability(&self, features: &DispatchFeatures) -> Result<f64, ModelError>;

    /// Estimated duration in minutes.
    fn predict_duration(&self, features: &DispatchFeatures) -> Result<f64, ModelError>;
}

/// Model output computed upstream and attached to a request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelEstimate {
    pub success_probability: f64,
    pub estimated_duration_minutes: f64,
}

impl DispatchModel for ModelEstimate {
    fn predict_success_probability(&self, _features: &DispatchFeatures) -> Result<f64, ModelError> {
        Ok(self.success_probability)
    }

    fn predict_duration(&self, _features: &DispatchFeatures) -> Result<f64, ModelError> {
        Ok(self.estimated_duration_minutes)
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ModelError {
    #[error("model returned success probability {0} outside [0, 1]")]
    ProbabilityOutOfRange(f64),
    #[error("model returned invalid duration {0} minutes")]
    InvalidDuration(f64),
    #[error("model unavailable: {0}")]
    Unavailable(String),
}

/// Runs both predictions and checks the collaborator kept its contract.
pub(crate) fn checked_predictions<M: DispatchModel + ?Sized>(
    model: &M,
    features: &DispatchFeatures,
) -> Result<(Probability, f64), ModelError> {
    let probability = checked_probability(model, features)?;
    let duration = model.predict_duration(features)?;
    if !duration.is_finite() || duration < 0.0 {
        return Err(ModelError::InvalidDuration(duration));
    }
    Ok((probability, duration))
}

pub(crate) fn checked_probability<M: DispatchModel + ?Sized>(
    model: &M,
    features: &DispatchFeatures,
) -> Result<Probability, ModelError> {
    let raw = model.predict_success_probability(features)?;
    Probability::new(raw).map_err(|_| ModelError::ProbabilityOutOfRange(raw))
}
