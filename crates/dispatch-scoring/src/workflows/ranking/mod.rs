//! Technician ranking: score every technician in a pool for each open
//! dispatch and keep the strongest candidates.

pub mod domain;
pub mod engine;
pub mod estimator;
pub mod parser;
pub mod router;
pub mod summary;

pub use domain::{
    DispatchRanking, GeoPoint, OpenDispatch, RankedCandidate, Technician, EARTH_RADIUS_KM,
};
pub use engine::{candidate_score, RankingError, TechnicianRanker};
pub use estimator::{BlendedEstimator, SuccessEstimator};
pub use parser::{parse_dispatches, parse_technicians, write_rankings};
pub use router::ranking_router;
pub use summary::RankingSummary;
