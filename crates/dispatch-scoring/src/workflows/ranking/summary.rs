use serde::Serialize;

use super::domain::DispatchRanking;
use crate::workflows::prediction::summary::mean;

/// Figures over each dispatch's best candidate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankingSummary {
    pub dispatches: usize,
    pub mean_success_probability: f64,
    pub mean_distance_km: f64,
    pub skill_match_rate: f64,
}

impl RankingSummary {
    pub fn from_rankings(rankings: &[DispatchRanking]) -> Self {
        let best: Vec<_> = rankings.iter().filter_map(DispatchRanking::best).collect();
        Self {
            dispatches: rankings.len(),
            mean_success_probability: mean(best.iter().map(|c| c.success_probability)),
            mean_distance_km: mean(best.iter().map(|c| c.distance_km)),
            skill_match_rate: mean(
                best.iter()
                    .map(|c| if c.skill_match { 1.0 } else { 0.0 }),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::ranking::domain::RankedCandidate;

    fn candidate(success: f64, distance: f64, matched: bool) -> RankedCandidate {
        RankedCandidate {
            rank: 1,
            technician_id: "T".to_string(),
            technician_name: None,
            technician_skill: "Fiber".to_string(),
            distance_km: distance,
            skill_match: matched,
            workload_ratio: None,
            current_assignments: 0,
            workload_capacity: 4,
            success_probability: success,
            score: 0.0,
        }
    }

    #[test]
    fn summary_uses_best_candidates_only() {
        let rankings = vec![
            DispatchRanking {
                dispatch_id: "D-1".to_string(),
                required_skill: "Fiber".to_string(),
                candidates: vec![candidate(0.9, 10.0, true), candidate(0.1, 900.0, false)],
            },
            DispatchRanking {
                dispatch_id: "D-2".to_string(),
                required_skill: "Fiber".to_string(),
                candidates: vec![candidate(0.5, 30.0, false)],
            },
        ];
        let summary = RankingSummary::from_rankings(&rankings);
        assert_eq!(summary.dispatches, 2);
        assert!((summary.mean_success_probability - 0.7).abs() < 1e-9);
        assert!((summary.mean_distance_km - 20.0).abs() < 1e-9);
        assert!((summary.skill_match_rate - 0.5).abs() < 1e-9);
    }
}
