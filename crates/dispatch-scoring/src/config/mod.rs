use crate::scoring::{BlendWeight, ScoringError, DEFAULT_RULE_WEIGHT};
use crate::workflows::prediction::BlendMode;
use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the scoring service.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub scoring: ScoringConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        let ansi = match env::var("APP_LOG_ANSI") {
            Ok(raw) => parse_flag(&raw).ok_or(ConfigError::InvalidFlag {
                name: "APP_LOG_ANSI",
                value: raw,
            })?,
            Err(_) => false,
        };

        let scoring = ScoringConfig::from_env()?;

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level, ansi },
            scoring,
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub ansi: bool,
}

/// Blend and ranking knobs, loaded once at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringConfig {
    pub rule_weight: BlendWeight,
    pub blend_mode: BlendMode,
    pub top_n: usize,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            rule_weight: BlendWeight::default(),
            blend_mode: BlendMode::Hybrid,
            top_n: DEFAULT_TOP_N,
        }
    }
}

pub const DEFAULT_TOP_N: usize = 5;

impl ScoringConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let rule_weight = match env::var("SCORING_RULE_WEIGHT") {
            Ok(raw) => {
                let parsed = raw
                    .trim()
                    .parse::<f64>()
                    .map_err(|_| ConfigError::InvalidRuleWeight { value: raw.clone() })?;
                BlendWeight::new(parsed)?
            }
            Err(_) => BlendWeight::new(DEFAULT_RULE_WEIGHT)?,
        };

        let blend_mode = match env::var("SCORING_BLEND_MODE") {
            Ok(raw) => BlendMode::parse(&raw).ok_or(ConfigError::InvalidBlendMode { value: raw })?,
            Err(_) => BlendMode::Hybrid,
        };

        let top_n = match env::var("SCORING_TOP_N") {
            Ok(raw) => match raw.trim().parse::<usize>() {
                Ok(value) if value > 0 => value,
                _ => return Err(ConfigError::InvalidTopN { value: raw }),
            },
            Err(_) => DEFAULT_TOP_N,
        };

        Ok(Self {
            rule_weight,
            blend_mode,
            top_n,
        })
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidFlag { name: &'static str, value: String },
    InvalidRuleWeight { value: String },
    InvalidBlendMode { value: String },
    InvalidTopN { value: String },
    Scoring(ScoringError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidFlag { name, value } => {
                write!(f, "{name} must be true or false, got '{value}'")
            }
            ConfigError::InvalidRuleWeight { value } => {
                write!(f, "SCORING_RULE_WEIGHT must be a number, got '{value}'")
            }
            ConfigError::InvalidBlendMode { value } => write!(
                f,
                "SCORING_BLEND_MODE must be 'hybrid' or 'model_only', got '{value}'"
            ),
            ConfigError::InvalidTopN { value } => {
                write!(f, "SCORING_TOP_N must be a positive integer, got '{value}'")
            }
            ConfigError::Scoring(err) => write!(f, "invalid scoring configuration: {err}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::Scoring(err) => Some(err),
            ConfigError::InvalidPort
            | ConfigError::InvalidFlag { .. }
            | ConfigError::InvalidRuleWeight { .. }
            | ConfigError::InvalidBlendMode { .. }
            | ConfigError::InvalidTopN { .. } => None,
        }
    }
}

impl From<ScoringError> for ConfigError {
    fn from(value: ScoringError) -> Self {
        Self::Scoring(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        for key in [
            "APP_ENV",
            "APP_HOST",
            "APP_PORT",
            "APP_LOG_LEVEL",
            "APP_LOG_ANSI",
            "SCORING_RULE_WEIGHT",
            "SCORING_BLEND_MODE",
            "SCORING_TOP_N",
        ] {
            env::remove_var(key);
        }
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");
        assert!(!config.telemetry.ansi);
        assert_eq!(config.scoring, ScoringConfig::default());
        assert_eq!(config.scoring.rule_weight.rule_share(), 0.7);
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
        reset_env();
    }

    #[test]
    fn reads_scoring_overrides() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("SCORING_RULE_WEIGHT", "0.4");
        env::set_var("SCORING_BLEND_MODE", "model_only");
        env::set_var("SCORING_TOP_N", "3");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.scoring.rule_weight.rule_share(), 0.4);
        assert_eq!(config.scoring.blend_mode, BlendMode::ModelOnly);
        assert_eq!(config.scoring.top_n, 3);
        reset_env();
    }

    #[test]
    fn rejects_out_of_range_rule_weight() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("SCORING_RULE_WEIGHT", "1.3");
        let err = AppConfig::load().expect_err("weight rejected");
        assert!(matches!(
            err,
            ConfigError::Scoring(ScoringError::InvalidBlendWeight(_))
        ));

        env::set_var("SCORING_RULE_WEIGHT", "heavy");
        let err = AppConfig::load().expect_err("weight rejected");
        assert!(matches!(err, ConfigError::InvalidRuleWeight { .. }));
        reset_env();
    }

    #[test]
    fn rejects_zero_top_n() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("SCORING_TOP_N", "0");
        let err = AppConfig::load().expect_err("top-n rejected");
        assert!(matches!(err, ConfigError::InvalidTopN { .. }));
        reset_env();
    }
}
