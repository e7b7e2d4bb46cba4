use super::error::ScoringError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A success probability, always within `[0, 1]`.
///
/// Computed fresh for every request; nothing caches one across requests.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Probability(f64);

impl Probability {
    pub const ZERO: Self = Self(0.0);
    pub const ONE: Self = Self(1.0);

    /// Accepts only values already inside the unit interval.
    pub fn new(value: f64) -> Result<Self, ScoringError> {
        if (0.0..=1.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(ScoringError::ProbabilityOutOfRange(value))
        }
    }

    /// Clips a raw additive sum into the unit interval. NaN clips to zero.
    pub fn clipped(raw: f64) -> Self {
        if raw.is_nan() {
            Self::ZERO
        } else {
            Self(raw.clamp(0.0, 1.0))
        }
    }

    pub fn value(self) -> f64 {
        self.0
    }

    pub fn complement(self) -> Self {
        Self(1.0 - self.0)
    }
}

impl TryFrom<f64> for Probability {
    type Error = ScoringError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Probability> for f64 {
    fn from(value: Probability) -> Self {
        value.0
    }
}

impl fmt::Display for Probability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.0}%", self.0 * 100.0)
    }
}
