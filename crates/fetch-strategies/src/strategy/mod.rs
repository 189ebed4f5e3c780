//! # Strategy Module
//!
//! Cache/network strategies, available as plain combinator functions or
//! through enum dispatch.
//!
//! ## Available Strategies
//!
//! - `CN` - Cache, then network; both results forwarded
//! - `NC` - Network, then write a successful result into the cache
//! - `CNC` - Cache, then network, then write-back (default)
//! - `CorN` - First success, cache first; errors suppressed
//! - `NorC` - First success, network first; errors suppressed
//!
//! ## Example
//!
//! ```rust,ignore
//! use fetch_strategies::{Sources, Strategy};
//!
//! let sources = Sources::new()
//!     .cache(cache_lookup)
//!     .network(network_fetch)
//!     .write_back(cache_store);
//!
//! Strategy::CacheNetworkCache.execute(sources, |response| render(response))?;
//! ```

pub mod combinators;
pub mod dispatch;
#[cfg(feature = "tokio")]
pub mod stream;

pub use combinators::{
    cache_network_cache, cache_or_network, cache_then_network, network_or_cache,
    network_then_cache,
};
pub use dispatch::{SourceKind, Sources, Strategy};
#[cfg(feature = "tokio")]
pub use stream::ResponseStream;
