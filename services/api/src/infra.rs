use crate::cli::BlendOverrides;
use dispatch_scoring::config::ScoringConfig;
use dispatch_scoring::error::AppError;
use dispatch_scoring::scoring::BlendWeight;
use dispatch_scoring::workflows::prediction::BlendMode;
use dispatch_scoring::workflows::ranking::RankingError;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Applies command-line overrides on top of the environment configuration.
///
/// Every override is validated before any is written, so a rejected call
/// leaves `config` untouched.
pub(crate) fn apply_overrides(
    config: &mut ScoringConfig,
    blend: &BlendOverrides,
    top_n: Option<usize>,
) -> Result<(), AppError> {
    let rule_weight = blend.rule_weight.map(BlendWeight::new).transpose()?;
    if top_n == Some(0) {
        return Err(RankingError::InvalidTopN.into());
    }

    if let Some(weight) = rule_weight {
        config.rule_weight = weight;
    }
    if blend.model_only {
        config.blend_mode = BlendMode::ModelOnly;
    }
    if let Some(top_n) = top_n {
        config.top_n = top_n;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_replace_configured_values() {
        let mut config = ScoringConfig::default();
        let blend = BlendOverrides {
            rule_weight: Some(0.4),
            model_only: true,
        };

        apply_overrides(&mut config, &blend, Some(2)).expect("overrides apply");
        assert_eq!(config.rule_weight.rule_share(), 0.4);
        assert_eq!(config.blend_mode, BlendMode::ModelOnly);
        assert_eq!(config.top_n, 2);
    }

    #[test]
    fn invalid_overrides_are_rejected() {
        let mut config = ScoringConfig::default();
        let weight = BlendOverrides {
            rule_weight: Some(1.2),
            ..BlendOverrides::default()
        };
        assert!(matches!(
            apply_overrides(&mut config, &weight, None),
            Err(AppError::Scoring(_))
        ));
        assert!(matches!(
            apply_overrides(&mut config, &BlendOverrides::default(), Some(0)),
            Err(AppError::Ranking(RankingError::InvalidTopN))
        ));
        assert_eq!(config, ScoringConfig::default());
    }

    #[test]
    fn rejected_top_n_leaves_valid_blend_overrides_unwritten() {
        let mut config = ScoringConfig::default();
        let blend = BlendOverrides {
            rule_weight: Some(0.2),
            model_only: true,
        };

        assert!(matches!(
            apply_overrides(&mut config, &blend, Some(0)),
            Err(AppError::Ranking(RankingError::InvalidTopN))
        ));
        assert_eq!(config, ScoringConfig::default());
    }
}
