//! Simulator error types

use fetch_strategies::StrategyError;
use thiserror::Error;

/// Invalid simulator configuration
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {value:?}")]
    InvalidValue { var: &'static str, value: String },

    #[error("{name} must be between 0.0 and 1.0, got {value}")]
    RateOutOfRange { name: &'static str, value: f64 },

    #[error("Run count must be at least 1")]
    NoRuns,

    #[error(transparent)]
    Strategy(#[from] StrategyError),
}

/// Simulator errors
#[derive(Debug, Error)]
pub enum SimulatorError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Strategy error: {0}")]
    Strategy(#[from] StrategyError),
}

pub type Result<T> = std::result::Result<T, SimulatorError>;
