use crate::scoring::{DispatchFeatures, Probability, RuleEngine};
use crate::workflows::prediction::{DispatchModel, DispatchPredictor, ModelError};

/// Source of the success probability used when ranking candidates.
pub trait SuccessEstimator: Sync {
    fn estimate_success(&self, features: &DispatchFeatures) -> Result<Probability, ModelError>;
}

impl SuccessEstimator for RuleEngine {
    fn estimate_success(&self, features: &DispatchFeatures) -> Result<Probability, ModelError> {
        Ok(self.estimate(features))
    }
}

/// Predictor settings applied to a live model.
pub struct BlendedEstimator<'a, M: ?Sized> {
    predictor: &'a DispatchPredictor,
    model: &'a M,
}

impl<'a, M: DispatchModel + ?Sized> BlendedEstimator<'a, M> {
    pub fn new(predictor: &'a DispatchPredictor, model: &'a M) -> Self {
        Self { predictor, model }
    }
}

impl<M: DispatchModel + ?Sized> SuccessEstimator for BlendedEstimator<'_, M> {
    fn estimate_success(&self, features: &DispatchFeatures) -> Result<Probability, ModelError> {
        self.predictor.final_probability(features, self.model)
    }
}
