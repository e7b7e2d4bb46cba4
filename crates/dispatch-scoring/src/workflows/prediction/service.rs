use std::sync::Arc;

use rayon::prelude::*;
use tracing::{debug, info};

use super::domain::{BlendMode, DispatchInput, PredictionOutcome, PredictionRequest};
use super::model::{checked_predictions, checked_probability, DispatchModel, ModelError};
use crate::config::ScoringConfig;
use crate::scoring::{
    blend, BlendWeight, DispatchFeatures, DurationOutlook, GradeCalculator, OutcomeSignals,
    Probability, RecommendationLabel, RuleEngine,
};

/// Blended probability at or above this counts as a predicted success.
pub const SUCCESS_THRESHOLD: f64 = 0.5;

/// Combines the rule engine, the model collaborator, grading, and recommendation.
#[derive(Debug, Clone)]
pub struct DispatchPredictor {
    engine: Arc<RuleEngine>,
    weight: BlendWeight,
    mode: BlendMode,
}

impl DispatchPredictor {
    pub fn new(engine: Arc<RuleEngine>, weight: BlendWeight, mode: BlendMode) -> Self {
        Self {
            engine,
            weight,
            mode,
        }
    }

    pub fn from_config(config: &ScoringConfig) -> Self {
        Self::new(
            Arc::new(RuleEngine::standard()),
            config.rule_weight,
            config.blend_mode,
        )
    }

    pub fn weight(&self) -> BlendWeight {
        self.weight
    }

    pub fn mode(&self) -> BlendMode {
        self.mode
    }

    pub fn engine(&self) -> &RuleEngine {
        &self.engine
    }

    pub fn shared_engine(&self) -> Arc<RuleEngine> {
        Arc::clone(&self.engine)
    }

    /// Final probability for a candidate, without the rest of the outcome.
    pub fn final_probability<M: DispatchModel + ?Sized>(
        &self,
        features: &DispatchFeatures,
        model: &M,
    ) -> Result<Probability, ModelError> {
        let model_probability = checked_probability(model, features)?;
        Ok(match self.mode {
            BlendMode::Hybrid => blend(model_probability, self.engine.estimate(features), self.weight),
            BlendMode::ModelOnly => model_probability,
        })
    }

    pub fn predict<M: DispatchModel + ?Sized>(
        &self,
        dispatch: &DispatchInput,
        model: &M,
    ) -> Result<PredictionOutcome, PredictionError> {
        dispatch.validate().map_err(PredictionError::InvalidInput)?;

        let features = dispatch.features();
        let (model_probability, estimated_duration) = checked_predictions(model, &features)?;

        let (rule_probability, success_probability, explanation) = match self.mode {
            BlendMode::Hybrid => {
                let breakdown = self.engine.explain(&features);
                let blended = blend(model_probability, breakdown.probability, self.weight);
                (Some(breakdown.probability), blended, breakdown.trace())
            }
            BlendMode::ModelOnly => (None, model_probability, Vec::new()),
        };

        let expected = dispatch.expected_duration_minutes;
        let duration_difference = estimated_duration - expected;
        let recommendation =
            RecommendationLabel::classify(success_probability.value(), duration_difference, expected);
        let projected_grade = GradeCalculator.breakdown(
            features.distance_km,
            duration_difference,
            OutcomeSignals::Estimated {
                shared_probability: success_probability,
            },
        );

        debug!(
            dispatch_id = dispatch.dispatch_id.as_deref().unwrap_or("-"),
            probability = success_probability.value(),
            tier = %recommendation.tier,
            "dispatch scored"
        );

        Ok(PredictionOutcome {
            dispatch_id: dispatch.dispatch_id.clone(),
            skill_match: features.skill_match,
            rule_probability: rule_probability.map(Probability::value),
            model_probability: model_probability.value(),
            success_probability: success_probability.value(),
            failure_probability: success_probability.complement().value(),
            success_prediction: success_probability.value() >= SUCCESS_THRESHOLD,
            expected_duration_minutes: expected,
            estimated_duration_minutes: estimated_duration,
            duration_difference_minutes: duration_difference,
            duration_outlook: DurationOutlook::assess(duration_difference, expected),
            confidence: recommendation.confidence(),
            recommendation,
            projected_grade,
            explanation,
        })
    }

    /// Scores a request against the model estimate it carries.
    pub fn predict_request(
        &self,
        request: &PredictionRequest,
    ) -> Result<PredictionOutcome, PredictionError> {
        self.predict(&request.dispatch, &request.model)
    }

    /// Scores a batch in parallel; output order follows the input, and the
    /// first failing request aborts the batch.
    pub fn predict_batch(
        &self,
        requests: &[PredictionRequest],
    ) -> Result<Vec<PredictionOutcome>, PredictionError> {
        info!(
            dispatches = requests.len(),
            rule_weight = self.weight.rule_share(),
            mode = ?self.mode,
            "scoring dispatch batch"
        );

        requests
            .par_iter()
            .enumerate()
            .map(|(index, request)| {
                self.predict_request(request)
                    .map_err(|source| PredictionError::Batch {
                        index,
                        source: Box::new(source),
                    })
            })
            .collect()
    }
}

impl Default for DispatchPredictor {
    fn default() -> Self {
        Self::from_config(&ScoringConfig::default())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PredictionError {
    #[error("invalid dispatch: {0}")]
    InvalidInput(String),
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error("dispatch #{index} in batch: {source}")]
    Batch {
        index: usize,
        #[source]
        source: Box<PredictionError>,
    },
}

impl PredictionError {
    /// The underlying failure, looking through batch wrappers.
    pub fn root(&self) -> &PredictionError {
        match self {
            PredictionError::Batch { source, .. } => source.root(),
            other => other,
        }
    }
}
