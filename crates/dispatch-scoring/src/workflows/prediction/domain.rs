use super::model::ModelEstimate;
use crate::scoring::{
    skill_match, ConfidenceLevel, DispatchFeatures, DurationOutlook, GradeBreakdown, Priority,
    RecommendationLabel, TicketType,
};
use serde::{Deserialize, Serialize};

/// How the final probability is formed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlendMode {
    /// Weighted blend of rule and model probabilities.
    #[default]
    Hybrid,
    /// Model probability only; the rule estimate is not consulted.
    ModelOnly,
}

impl BlendMode {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "hybrid" => Some(Self::Hybrid),
            "model_only" | "model" => Some(Self::ModelOnly),
            _ => None,
        }
    }
}

/// A dispatch to score, as supplied by a caller or a batch file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchInput {
    #[serde(default)]
    pub dispatch_id: Option<String>,
    #[serde(default)]
    pub ticket_type: Option<TicketType>,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub required_skill: Option<String>,
    #[serde(default)]
    pub technician_skill: Option<String>,
    /// Explicit flag; wins over skill comparison when present.
    #[serde(default)]
    pub skill_match: Option<bool>,
    pub distance_km: f64,
    #[serde(default)]
    pub workload_ratio: Option<f64>,
    pub expected_duration_minutes: f64,
}

impl DispatchInput {
    pub fn resolved_skill_match(&self) -> bool {
        if let Some(flag) = self.skill_match {
            return flag;
        }
        match (&self.required_skill, &self.technician_skill) {
            (Some(required), Some(technician)) => skill_match(required, technician),
            _ => false,
        }
    }

    pub fn features(&self) -> DispatchFeatures {
        DispatchFeatures {
            distance_km: self.distance_km,
            skill_match: self.resolved_skill_match(),
            workload_ratio: self.workload_ratio,
            priority: self.priority.clone(),
            ticket_type: self.ticket_type.clone(),
        }
    }

    pub(crate) fn validate(&self) -> Result<(), String> {
        if !self.distance_km.is_finite() || self.distance_km < 0.0 {
            return Err(format!(
                "distance_km must be a non-negative number, got {}",
                self.distance_km
            ));
        }
        if !self.expected_duration_minutes.is_finite() || self.expected_duration_minutes < 0.0 {
            return Err(format!(
                "expected_duration_minutes must be a non-negative number, got {}",
                self.expected_duration_minutes
            ));
        }
        if let Some(ratio) = self.workload_ratio {
            if !ratio.is_finite() || ratio < 0.0 {
                return Err(format!(
                    "workload_ratio must be a non-negative number, got {ratio}"
                ));
            }
        }
        Ok(())
    }
}

/// Dispatch plus the upstream model estimate that accompanies it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRequest {
    #[serde(flatten)]
    pub dispatch: DispatchInput,
    pub model: ModelEstimate,
}

/// Everything the predictor derives for one dispatch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionOutcome {
    pub dispatch_id: Option<String>,
    pub skill_match: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule_probability: Option<f64>,
    pub model_probability: f64,
    pub success_probability: f64,
    pub failure_probability: f64,
    pub success_prediction: bool,
    pub expected_duration_minutes: f64,
    pub estimated_duration_minutes: f64,
    pub duration_difference_minutes: f64,
    pub duration_outlook: DurationOutlook,
    pub recommendation: RecommendationLabel,
    pub confidence: ConfidenceLevel,
    pub projected_grade: GradeBreakdown,
    pub explanation: Vec<String>,
}
