//! # Fetch Simulator
//!
//! Simulated cache and network sources for exercising the fetch strategies.
//!
//! ## Features
//!
//! - In-memory cache with write-back support
//! - Network source producing increasing catalog revisions
//! - Latency and failure injection per source
//! - Per-run reports of every forwarded response

#![forbid(unsafe_code)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod scenario;
pub mod source;

pub use config::{SimulatorConfig, SourceSettings};
pub use error::{ConfigError, Result, SimulatorError};
pub use scenario::{ObservedResponse, RunReport, Scenario};
pub use source::{
    storage_function, write_back_function, Catalog, DataSource, FaultProfile, MemoryCache,
    SimulatedNetwork, WritableSource,
};
