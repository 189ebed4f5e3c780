//! # Simulator Configuration
//!
//! Environment-based configuration for the strategy simulator. CLI flags
//! are applied on top by the binary.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use fetch_strategies::Strategy;

use crate::error::ConfigError;
use crate::source::FaultProfile;

/// Simulator configuration
#[derive(Debug, Clone, PartialEq)]
pub struct SimulatorConfig {
    /// Strategy under test
    pub strategy: Strategy,

    /// Number of strategy invocations
    pub runs: u32,

    /// Cache read behaviour
    pub cache: SourceSettings,

    /// Network behaviour
    pub network: SourceSettings,

    /// Probability that a cache write-back fails
    pub write_failure_rate: f64,

    /// Start with a populated cache
    pub seed_cache: bool,

    /// Entries per generated catalog
    pub catalog_size: usize,

    /// Logging level
    pub log_level: String,

    /// Emit JSON logs
    pub log_json: bool,
}

/// Latency and failure settings for one simulated source
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SourceSettings {
    pub latency_ms: u64,
    pub failure_rate: f64,
}

impl SourceSettings {
    pub const fn profile(&self) -> FaultProfile {
        FaultProfile::new(Duration::from_millis(self.latency_ms), self.failure_rate)
    }
}

impl SimulatorConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if a variable is set but cannot be parsed,
    /// or the resulting configuration is out of range.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    ///
    /// # Errors
    ///
    /// Same as [`SimulatorConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let strategy = match lookup("SIM_STRATEGY") {
            Some(value) => value.parse::<Strategy>()?,
            None => defaults.strategy,
        };

        let config = Self {
            strategy,
            runs: parse_var(&lookup, "SIM_RUNS", defaults.runs)?,
            cache: SourceSettings {
                latency_ms: parse_var(&lookup, "SIM_CACHE_LATENCY_MS", defaults.cache.latency_ms)?,
                failure_rate: parse_var(
                    &lookup,
                    "SIM_CACHE_FAILURE_RATE",
                    defaults.cache.failure_rate,
                )?,
            },
            network: SourceSettings {
                latency_ms: parse_var(
                    &lookup,
                    "SIM_NETWORK_LATENCY_MS",
                    defaults.network.latency_ms,
                )?,
                failure_rate: parse_var(
                    &lookup,
                    "SIM_NETWORK_FAILURE_RATE",
                    defaults.network.failure_rate,
                )?,
            },
            write_failure_rate: parse_var(
                &lookup,
                "SIM_WRITE_FAILURE_RATE",
                defaults.write_failure_rate,
            )?,
            seed_cache: parse_flag(&lookup, "SIM_SEED_CACHE", defaults.seed_cache)?,
            catalog_size: parse_var(&lookup, "SIM_CATALOG_SIZE", defaults.catalog_size)?,
            log_level: lookup("LOG_LEVEL").unwrap_or(defaults.log_level),
            log_json: parse_flag(&lookup, "LOG_JSON", defaults.log_json)?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Check value ranges
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::RateOutOfRange`] for probabilities outside
    /// `0.0..=1.0` and [`ConfigError::NoRuns`] for a zero run count.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.runs == 0 {
            return Err(ConfigError::NoRuns);
        }

        let rates = [
            ("cache failure rate", self.cache.failure_rate),
            ("network failure rate", self.network.failure_rate),
            ("write failure rate", self.write_failure_rate),
        ];
        for (name, value) in rates {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::RateOutOfRange { name, value });
            }
        }

        Ok(())
    }

    /// Pause between runs so a write-back issued at the end of one run can
    /// land before the next run reads the cache
    pub const fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.cache.latency_ms.saturating_add(1))
    }

    /// Fault profile for cache writes; shares the cache read latency
    pub const fn write_profile(&self) -> FaultProfile {
        FaultProfile::new(
            Duration::from_millis(self.cache.latency_ms),
            self.write_failure_rate,
        )
    }
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::default(),
            runs: 3,
            cache: SourceSettings {
                latency_ms: 5,
                failure_rate: 0.0,
            },
            network: SourceSettings {
                latency_ms: 150,
                failure_rate: 0.2,
            },
            write_failure_rate: 0.0,
            seed_cache: false,
            catalog_size: 5,
            log_level: "info".to_string(),
            log_json: false,
        }
    }
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(var) {
        Some(value) => {
            let parsed = value.trim().parse::<T>();
            parsed.map_err(|_| ConfigError::InvalidValue { var, value })
        }
        None => Ok(default),
    }
}

fn parse_flag(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: bool,
) -> Result<bool, ConfigError> {
    let Some(value) = lookup(var) else {
        return Ok(default);
    };

    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(ConfigError::InvalidValue { var, value }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_env() {
        let config = SimulatorConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, SimulatorConfig::default());
    }

    #[test]
    fn test_env_overrides() {
        let config = SimulatorConfig::from_lookup(lookup(&[
            ("SIM_STRATEGY", "NorC"),
            ("SIM_RUNS", "10"),
            ("SIM_NETWORK_FAILURE_RATE", "1.0"),
            ("SIM_SEED_CACHE", "1"),
            ("LOG_JSON", "true"),
        ]))
        .unwrap();

        assert_eq!(config.strategy, Strategy::NetworkOrCache);
        assert_eq!(config.runs, 10);
        assert!((config.network.failure_rate - 1.0).abs() < f64::EPSILON);
        assert!(config.seed_cache);
        assert!(config.log_json);
    }

    #[test]
    fn test_invalid_number() {
        let err = SimulatorConfig::from_lookup(lookup(&[("SIM_RUNS", "many")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidValue {
                var: "SIM_RUNS",
                value: "many".to_string(),
            }
        );
    }

    #[test]
    fn test_flags_ignore_case() {
        let config = SimulatorConfig::from_lookup(lookup(&[
            ("SIM_SEED_CACHE", "TRUE"),
            ("LOG_JSON", " False "),
        ]))
        .unwrap();

        assert!(config.seed_cache);
        assert!(!config.log_json);
    }

    #[test]
    fn test_invalid_flag() {
        let err = SimulatorConfig::from_lookup(lookup(&[("SIM_SEED_CACHE", "yes")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidValue {
                var: "SIM_SEED_CACHE",
                value: "yes".to_string(),
            }
        );
    }

    #[test]
    fn test_settle_delay_saturates() {
        let mut config = SimulatorConfig::default();
        assert_eq!(config.settle_delay(), Duration::from_millis(6));

        config.cache.latency_ms = u64::MAX;
        assert_eq!(config.settle_delay(), Duration::from_millis(u64::MAX));
    }

    #[test]
    fn test_rate_out_of_range() {
        let err = SimulatorConfig::from_lookup(lookup(&[("SIM_CACHE_FAILURE_RATE", "1.5")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::RateOutOfRange { name: "cache failure rate", .. }));
    }

    #[test]
    fn test_unknown_strategy() {
        let err = SimulatorConfig::from_lookup(lookup(&[("SIM_STRATEGY", "LRU")])).unwrap_err();
        assert!(matches!(err, ConfigError::Strategy(_)));
    }

    #[test]
    fn test_zero_runs_rejected() {
        let config = SimulatorConfig {
            runs: 0,
            ..SimulatorConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::NoRuns));
    }
}
