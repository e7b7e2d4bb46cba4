use super::error::ScoringError;
use super::probability::Probability;
use serde::{Deserialize, Serialize};

pub const DEFAULT_RULE_WEIGHT: f64 = 0.7;

/// Share of the final probability attributed to the rule estimate.
///
/// Out-of-range weights are a caller misconfiguration and are rejected, never clamped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct BlendWeight(f64);

impl BlendWeight {
    pub fn new(rule_weight: f64) -> Result<Self, ScoringError> {
        if (0.0..=1.0).contains(&rule_weight) {
            Ok(Self(rule_weight))
        } else {
            Err(ScoringError::InvalidBlendWeight(rule_weight))
        }
    }

    pub fn rule_share(self) -> f64 {
        self.0
    }

    pub fn model_share(self) -> f64 {
        1.0 - self.0
    }
}

impl Default for BlendWeight {
    fn default() -> Self {
        Self(DEFAULT_RULE_WEIGHT)
    }
}

impl TryFrom<f64> for BlendWeight {
    type Error = ScoringError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<BlendWeight> for f64 {
    fn from(value: BlendWeight) -> Self {
        value.0
    }
}

/// Convex combination `w * rule + (1 - w) * model`.
pub fn blend(model: Probability, rule: Probability, weight: BlendWeight) -> Probability {
    let combined = weight.rule_share() * rule.value() + weight.model_share() * model.value();
    // a convex combination of unit values; clipping only absorbs rounding
    Probability::clipped(combined)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn p(value: f64) -> Probability {
        Probability::new(value).expect("valid probability")
    }

    #[test]
    fn default_weight_favours_rules() {
        let blended = blend(p(0.2), p(0.9), BlendWeight::default());
        assert!((blended.value() - (0.7 * 0.9 + 0.3 * 0.2)).abs() < 1e-12);
    }

    #[test]
    fn out_of_range_weights_are_configuration_errors() {
        assert_eq!(
            BlendWeight::new(1.2),
            Err(ScoringError::InvalidBlendWeight(1.2))
        );
        assert_eq!(
            BlendWeight::new(-0.1),
            Err(ScoringError::InvalidBlendWeight(-0.1))
        );
        assert!(BlendWeight::new(f64::NAN).is_err());
        assert!(serde_json::from_str::<BlendWeight>("2.0").is_err());
    }

    proptest! {
        #[test]
        fn extreme_weights_select_one_source(mp in 0.0f64..=1.0, rp in 0.0f64..=1.0) {
            let all_rules = blend(p(mp), p(rp), BlendWeight::new(1.0).expect("weight"));
            prop_assert_eq!(all_rules.value(), rp);
            let all_model = blend(p(mp), p(rp), BlendWeight::new(0.0).expect("weight"));
            prop_assert_eq!(all_model.value(), mp);
        }

        #[test]
        fn blend_lies_between_its_inputs(mp in 0.0f64..=1.0, rp in 0.0f64..=1.0, w in 0.0f64..=1.0) {
            let blended = blend(p(mp), p(rp), BlendWeight::new(w).expect("weight")).value();
            prop_assert!(blended >= mp.min(rp) - 1e-12);
            prop_assert!(blended <= mp.max(rp) + 1e-12);
        }
    }
}
