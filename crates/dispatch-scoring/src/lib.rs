//! Dispatch success scoring.
//!
//! The `scoring` module holds the pure engine (bucketing, rule probability,
//! blending, grading, recommendation). The `workflows` build batch prediction,
//! technician ranking, and historical grading on top of it.

pub mod config;
pub mod error;
pub mod scoring;
pub mod telemetry;
pub mod workflows;
