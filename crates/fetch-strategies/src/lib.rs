//! # Fetch Strategies Library
//!
//! Control-flow combinators that coordinate a fast local cache and a slower
//! network source behind one [`SealedResponse`] stream, optionally writing
//! fresh network data back into the cache.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Application Layer                        │
//! │          (supplies sources + response continuation)          │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Strategy Engine                          │
//! │              CN · NC · CNC · CorN · NorC                     │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   Storage Functions                          │
//! │        StorageFunction (read) · WriteBackFunction            │
//! └─────────────────────────────────────────────────────────────┘
//!                    │                   │
//!                    ▼                   ▼
//! ┌─────────────────────────┐   ┌──────────────────────────────┐
//! │      Cache source       │   │       Network source         │
//! │     (caller-owned)      │   │       (caller-owned)         │
//! └─────────────────────────┘   └──────────────────────────────┘
//! ```
//!
//! The engine owns no storage, transport, retries or timeouts. Sources are
//! always called one after another, never in parallel.
//!
//! ## Features
//!
//! - `tokio`: task-backed storage functions and [`ResponseStream`] (default)
//!
//! ## Usage
//!
//! ```rust
//! use fetch_domain::{RequestError, SealedResponse};
//! use fetch_strategies::{cache_or_network, StorageFunction};
//!
//! let cache = StorageFunction::ready(SealedResponse::<u32>::Error(RequestError::Unknown));
//! let network = StorageFunction::ready(SealedResponse::Success(42));
//!
//! cache_or_network(Some(cache), Some(network), |response| {
//!     assert_eq!(response, SealedResponse::Success(42));
//! });
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod storage;
pub mod strategy;

// Re-export commonly used types
pub use error::{Result, StrategyError};
pub use fetch_domain::{RequestError, SealedResponse};
pub use storage::{Continuation, StorageFunction, WriteBackFunction};
#[cfg(feature = "tokio")]
pub use strategy::ResponseStream;
pub use strategy::{
    cache_network_cache, cache_or_network, cache_then_network, network_or_cache,
    network_then_cache, SourceKind, Sources, Strategy,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
