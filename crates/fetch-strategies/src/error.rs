//! Strategy configuration error types

use thiserror::Error;

use crate::strategy::{SourceKind, Strategy};

/// Errors raised while setting up a strategy call.
///
/// Data-source failures never show up here; they travel as
/// `SealedResponse::Error` values through the response continuation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StrategyError {
    #[error("Unknown strategy: {0} (expected one of CN, NC, CorN, NorC, CNC)")]
    UnknownStrategy(String),

    #[error("{strategy} strategy has no use for a {kind} source")]
    UnusedSource { strategy: Strategy, kind: SourceKind },
}

pub type Result<T> = std::result::Result<T, StrategyError>;
