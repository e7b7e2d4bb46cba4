use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// An estimate running more than this fraction over the expected duration is flagged.
pub const DURATION_WARNING_FRACTION: f64 = 0.3;

/// Action tier; each lower bound is inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationTier {
    Proceed,
    ProceedWithCaution,
    Review,
    DoNotProceed,
}

impl RecommendationTier {
    pub const ALL: [RecommendationTier; 4] = [
        Self::Proceed,
        Self::ProceedWithCaution,
        Self::Review,
        Self::DoNotProceed,
    ];

    pub fn for_probability(probability: f64) -> Self {
        if probability >= 0.8 {
            Self::Proceed
        } else if probability >= 0.6 {
            Self::ProceedWithCaution
        } else if probability >= 0.4 {
            Self::Review
        } else {
            Self::DoNotProceed
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Proceed => "PROCEED",
            Self::ProceedWithCaution => "PROCEED WITH CAUTION",
            Self::Review => "REVIEW",
            Self::DoNotProceed => "DO NOT PROCEED",
        }
    }

    pub fn rationale(self) -> &'static str {
        match self {
            Self::Proceed => "High probability of success",
            Self::ProceedWithCaution => "Moderate probability of success",
            Self::Review => "Low probability of success, consider reassignment",
            Self::DoNotProceed => "Very low probability of success, reassign dispatch",
        }
    }

    pub fn confidence(self) -> ConfidenceLevel {
        match self {
            Self::Proceed => ConfidenceLevel::High,
            Self::ProceedWithCaution => ConfidenceLevel::Medium,
            Self::Review => ConfidenceLevel::Low,
            Self::DoNotProceed => ConfidenceLevel::VeryLow,
        }
    }
}

impl fmt::Display for RecommendationTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
    VeryLow,
}

impl ConfidenceLevel {
    pub fn for_probability(probability: f64) -> Self {
        RecommendationTier::for_probability(probability).confidence()
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
            Self::VeryLow => "Very Low",
        }
    }
}

impl fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Estimated duration relative to the scheduled one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DurationOutlook {
    /// More than 30% over the expected duration.
    Overrun { minutes: f64 },
    Shorter { minutes: f64 },
    AsExpected,
}

impl DurationOutlook {
    pub fn assess(duration_diff_minutes: f64, expected_duration_minutes: f64) -> Self {
        if duration_diff_minutes > expected_duration_minutes * DURATION_WARNING_FRACTION {
            Self::Overrun {
                minutes: duration_diff_minutes,
            }
        } else if duration_diff_minutes < 0.0 {
            Self::Shorter {
                minutes: duration_diff_minutes.abs(),
            }
        } else {
            Self::AsExpected
        }
    }
}

/// Action tier plus an optional duration warning that never changes the tier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecommendationLabel {
    pub tier: RecommendationTier,
    pub duration_warning_minutes: Option<f64>,
}

impl RecommendationLabel {
    pub fn classify(
        probability: f64,
        duration_diff_minutes: f64,
        expected_duration_minutes: f64,
    ) -> Self {
        let tier = RecommendationTier::for_probability(probability);
        let duration_warning_minutes =
            match DurationOutlook::assess(duration_diff_minutes, expected_duration_minutes) {
                DurationOutlook::Overrun { minutes } => Some(minutes),
                DurationOutlook::Shorter { .. } | DurationOutlook::AsExpected => None,
            };

        Self {
            tier,
            duration_warning_minutes,
        }
    }

    pub fn confidence(&self) -> ConfidenceLevel {
        self.tier.confidence()
    }
}

impl fmt::Display for RecommendationLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.duration_warning_minutes {
            Some(minutes) => write!(f, "{} (Warning: +{:.0} min)", self.tier, minutes),
            None => write!(f, "{}", self.tier),
        }
    }
}

impl Serialize for RecommendationLabel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("RecommendationLabel", 3)?;
        state.serialize_field("tier", &self.tier)?;
        state.serialize_field("label", &self.to_string())?;
        state.serialize_field("duration_warning_minutes", &self.duration_warning_minutes)?;
        state.end()
    }
}
