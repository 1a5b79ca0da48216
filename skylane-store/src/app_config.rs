use serde::Deserialize;
use skylane_booking::OrchestratorConfig;
use std::env;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub business_rules: BusinessRules,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BusinessRules {
    #[serde(default = "default_payment_timeout_seconds")]
    pub payment_timeout_seconds: u64,
    #[serde(default = "default_persistence_retry_attempts")]
    pub persistence_retry_attempts: u32,
    #[serde(default = "default_conflict_retry_attempts")]
    pub conflict_retry_attempts: u32,
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

fn default_payment_timeout_seconds() -> u64 {
    5
}
fn default_persistence_retry_attempts() -> u32 {
    3
}
fn default_conflict_retry_attempts() -> u32 {
    3
}
fn default_retry_backoff_ms() -> u64 {
    50
}

impl Default for BusinessRules {
    fn default() -> Self {
        Self {
            payment_timeout_seconds: default_payment_timeout_seconds(),
            persistence_retry_attempts: default_persistence_retry_attempts(),
            conflict_retry_attempts: default_conflict_retry_attempts(),
            retry_backoff_ms: default_retry_backoff_ms(),
        }
    }
}

impl BusinessRules {
    pub fn orchestrator_config(&self) -> OrchestratorConfig {
        OrchestratorConfig {
            payment_timeout: Duration::from_secs(self.payment_timeout_seconds),
            persistence_retry_attempts: self.persistence_retry_attempts,
            conflict_retry_attempts: self.conflict_retry_attempts,
            retry_backoff: Duration::from_millis(self.retry_backoff_ms),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            // Start off by merging in the "default" configuration file
            .add_source(config::File::with_name("config/default").required(false))
            // Add in the current environment file, defaulting to 'development'
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Add in a local configuration file not checked into git
            .add_source(config::File::with_name("config/local").required(false))
            // Add in settings from the environment (with a prefix of SKYLANE)
            // E.g. `SKYLANE__BUSINESS_RULES__PAYMENT_TIMEOUT_SECONDS=10`
            .add_source(config::Environment::with_prefix("SKYLANE").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_apply_without_any_source() {
        let rules = BusinessRules::default();
        assert_eq!(rules.payment_timeout_seconds, 5);
        assert_eq!(rules.persistence_retry_attempts, 3);
        assert_eq!(rules.conflict_retry_attempts, 3);
        assert_eq!(rules.retry_backoff_ms, 50);
    }

    #[test]
    fn test_orchestrator_config_conversion() {
        let rules = BusinessRules {
            payment_timeout_seconds: 2,
            persistence_retry_attempts: 5,
            conflict_retry_attempts: 4,
            retry_backoff_ms: 10,
        };
        let cfg = rules.orchestrator_config();
        assert_eq!(cfg.payment_timeout, Duration::from_secs(2));
        assert_eq!(cfg.persistence_retry_attempts, 5);
        assert_eq!(cfg.conflict_retry_attempts, 4);
        assert_eq!(cfg.retry_backoff, Duration::from_millis(10));
    }

    #[test]
    fn test_empty_config_deserializes_to_defaults() {
        let cfg: Config = config::Config::builder()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert_eq!(cfg.business_rules.payment_timeout_seconds, 5);
    }
}
