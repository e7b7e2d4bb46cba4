use std::cmp::Ordering;

use rayon::prelude::*;
use tracing::info;

use super::domain::{DispatchRanking, OpenDispatch, RankedCandidate, Technician};
use super::estimator::SuccessEstimator;
use crate::config::{ScoringConfig, DEFAULT_TOP_N};
use crate::scoring::{skill_match, workload_ratio, DispatchFeatures};
use crate::workflows::prediction::{BlendMode, ModelError};

pub const SUCCESS_WEIGHT: f64 = 100.0;
pub const PROXIMITY_WEIGHT: f64 = 20.0;
pub const SKILL_MATCH_WEIGHT: f64 = 30.0;
pub const CAPACITY_WEIGHT: f64 = 10.0;

/// Orders a technician pool for each dispatch and keeps the best `top_n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TechnicianRanker {
    top_n: usize,
}

impl TechnicianRanker {
    pub fn new(top_n: usize) -> Result<Self, RankingError> {
        if top_n == 0 {
            return Err(RankingError::InvalidTopN);
        }
        Ok(Self { top_n })
    }

    pub fn from_config(config: &ScoringConfig) -> Result<Self, RankingError> {
        Self::new(config.top_n)
    }

    pub fn top_n(&self) -> usize {
        self.top_n
    }

    /// Ranking surfaces that only hold the rule engine cannot honour model-only blending.
    pub fn require_rule_estimates(mode: BlendMode) -> Result<(), RankingError> {
        match mode {
            BlendMode::Hybrid => Ok(()),
            BlendMode::ModelOnly => Err(RankingError::ModelOnlyUnsupported),
        }
    }

    pub fn rank<E: SuccessEstimator + ?Sized>(
        &self,
        dispatch: &OpenDispatch,
        technicians: &[Technician],
        estimator: &E,
    ) -> Result<DispatchRanking, RankingError> {
        if technicians.is_empty() {
            return Err(RankingError::EmptyPool {
                dispatch_id: dispatch.dispatch_id.clone(),
            });
        }
        if !dispatch.location.is_valid() {
            return Err(RankingError::InvalidCoordinates {
                subject: format!("dispatch {}", dispatch.dispatch_id),
            });
        }

        let mut evaluated = Vec::with_capacity(technicians.len());
        for technician in technicians {
            if !technician.location.is_valid() {
                return Err(RankingError::InvalidCoordinates {
                    subject: format!("technician {}", technician.technician_id),
                });
            }
            let distance_km = dispatch.location.distance_km(&technician.location);
            let features = DispatchFeatures {
                distance_km,
                skill_match: skill_match(&dispatch.required_skill, &technician.skill),
                workload_ratio: workload_ratio(
                    technician.current_assignments,
                    technician.workload_capacity,
                ),
                priority: dispatch.priority.clone(),
                ticket_type: dispatch.ticket_type.clone(),
            };
            let success = estimator.estimate_success(&features)?;
            evaluated.push((technician, features, success.value()));
        }

        let max_distance = evaluated
            .iter()
            .map(|(_, features, _)| features.distance_km)
            .fold(0.0_f64, f64::max);
        let max_capacity = technicians
            .iter()
            .map(|technician| technician.workload_capacity)
            .max()
            .unwrap_or(0);

        let mut candidates: Vec<RankedCandidate> = evaluated
            .into_iter()
            .map(|(technician, features, success)| RankedCandidate {
                rank: 0,
                technician_id: technician.technician_id.clone(),
                technician_name: technician.name.clone(),
                technician_skill: technician.skill.clone(),
                distance_km: features.distance_km,
                skill_match: features.skill_match,
                workload_ratio: features.workload_ratio,
                current_assignments: technician.current_assignments,
                workload_capacity: technician.workload_capacity,
                success_probability: success,
                score: candidate_score(
                    success,
                    features.distance_km,
                    max_distance,
                    features.skill_match,
                    technician,
                    max_capacity,
                ),
            })
            .collect();

        candidates.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.technician_id.cmp(&b.technician_id))
        });
        candidates.truncate(self.top_n);
        for (index, candidate) in candidates.iter_mut().enumerate() {
            candidate.rank = index + 1;
        }

        Ok(DispatchRanking {
            dispatch_id: dispatch.dispatch_id.clone(),
            required_skill: dispatch.required_skill.clone(),
            candidates,
        })
    }

    /// Ranks every dispatch against the same pool, in parallel, preserving input order.
    pub fn rank_all<E: SuccessEstimator + ?Sized>(
        &self,
        dispatches: &[OpenDispatch],
        technicians: &[Technician],
        estimator: &E,
    ) -> Result<Vec<DispatchRanking>, RankingError> {
        info!(
            dispatches = dispatches.len(),
            technicians = technicians.len(),
            assignments = dispatches.len() * technicians.len(),
            top_n = self.top_n,
            "ranking technicians"
        );

        dispatches
            .par_iter()
            .map(|dispatch| self.rank(dispatch, technicians, estimator))
            .collect()
    }
}

impl Default for TechnicianRanker {
    fn default() -> Self {
        Self {
            top_n: DEFAULT_TOP_N,
        }
    }
}

/// Composite assignment score; higher is better.
pub fn candidate_score(
    success_probability: f64,
    distance_km: f64,
    max_distance_km: f64,
    matched: bool,
    technician: &Technician,
    max_capacity: u32,
) -> f64 {
    let proximity = if max_distance_km > 0.0 {
        1.0 - distance_km / max_distance_km
    } else {
        1.0
    };
    let skill = if matched { 1.0 } else { 0.0 };
    let capacity = if max_capacity > 0 {
        (f64::from(technician.workload_capacity) - f64::from(technician.current_assignments))
            / f64::from(max_capacity)
    } else {
        0.0
    };

    success_probability * SUCCESS_WEIGHT
        + proximity * PROXIMITY_WEIGHT
        + skill * SKILL_MATCH_WEIGHT
        + capacity * CAPACITY_WEIGHT
}

#[derive(Debug, thiserror::Error)]
pub enum RankingError {
    #[error("top_n must be at least 1")]
    InvalidTopN,
    #[error("no technicians available for dispatch {dispatch_id}")]
    EmptyPool { dispatch_id: String },
    #[error("invalid coordinates for {subject}")]
    InvalidCoordinates { subject: String },
    #[error("ranking uses rule estimates and is unavailable in model_only blend mode")]
    ModelOnlyUnsupported,
    #[error(transparent)]
    Model(#[from] ModelError),
}
