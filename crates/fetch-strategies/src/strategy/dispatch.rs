//! Strategy selection using enum dispatch.

use std::fmt;
use std::str::FromStr;

use fetch_domain::SealedResponse;
use serde::{Deserialize, Serialize};

use super::combinators;
use crate::error::{Result, StrategyError};
use crate::storage::{StorageFunction, WriteBackFunction};

/// Strategy enum - determines how cache and network are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Strategy {
    /// Cache, then network; forward both
    #[serde(rename = "CN")]
    CacheNetwork,
    /// Network, then write the result into the cache
    #[serde(rename = "NC")]
    NetworkCache,
    /// First success, cache first
    #[serde(rename = "CorN")]
    CacheOrNetwork,
    /// First success, network first
    #[serde(rename = "NorC")]
    NetworkOrCache,
    /// Cache, then network, then write the network result into the cache
    #[default]
    #[serde(rename = "CNC")]
    CacheNetworkCache,
}

impl Strategy {
    pub const ALL: [Self; 5] = [
        Self::CacheNetwork,
        Self::NetworkCache,
        Self::CacheOrNetwork,
        Self::NetworkOrCache,
        Self::CacheNetworkCache,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::CacheNetwork => "CN",
            Self::NetworkCache => "NC",
            Self::CacheOrNetwork => "CorN",
            Self::NetworkOrCache => "NorC",
            Self::CacheNetworkCache => "CNC",
        }
    }

    /// Whether a successful network result is written back to the cache
    pub const fn writes_back(&self) -> bool {
        matches!(self, Self::NetworkCache | Self::CacheNetworkCache)
    }

    /// Whether the strategy ever reads from the cache
    pub const fn reads_cache(&self) -> bool {
        !matches!(self, Self::NetworkCache)
    }

    /// Check that every bound source is one this strategy can use.
    ///
    /// # Errors
    ///
    /// Returns [`StrategyError::UnusedSource`] for a cache read bound to
    /// NC, or a write-back bound to a strategy that never writes.
    pub fn validate<T>(&self, sources: &Sources<T>) -> Result<()> {
        if sources.cache.is_some() && !self.reads_cache() {
            return Err(StrategyError::UnusedSource {
                strategy: *self,
                kind: SourceKind::Cache,
            });
        }
        if sources.write_back.is_some() && !self.writes_back() {
            return Err(StrategyError::UnusedSource {
                strategy: *self,
                kind: SourceKind::WriteBack,
            });
        }
        Ok(())
    }

    /// Validate `sources`, then run the matching combinator.
    ///
    /// `on_response` receives zero, one or two responses, possibly after
    /// this call returns if the sources complete asynchronously.
    ///
    /// # Errors
    ///
    /// Fails before any source runs if [`Strategy::validate`] rejects the
    /// bindings.
    pub fn execute<T, F>(self, sources: Sources<T>, on_response: F) -> Result<()>
    where
        T: Clone + 'static,
        F: Fn(SealedResponse<T>) + Send + 'static,
    {
        self.validate(&sources)?;
        tracing::debug!(
            strategy = %self,
            cache = sources.cache.is_some(),
            network = sources.network.is_some(),
            write_back = sources.write_back.is_some(),
            "Executing strategy"
        );

        let Sources {
            cache,
            network,
            write_back,
        } = sources;

        match self {
            Self::CacheNetwork => combinators::cache_then_network(cache, network, on_response),
            Self::NetworkCache => combinators::network_then_cache(network, write_back, on_response),
            Self::CacheOrNetwork => combinators::cache_or_network(cache, network, on_response),
            Self::NetworkOrCache => combinators::network_or_cache(network, cache, on_response),
            Self::CacheNetworkCache => {
                combinators::cache_network_cache(cache, network, write_back, on_response);
            }
        }
        Ok(())
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = StrategyError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cn" => Ok(Self::CacheNetwork),
            "nc" => Ok(Self::NetworkCache),
            "corn" => Ok(Self::CacheOrNetwork),
            "norc" => Ok(Self::NetworkOrCache),
            "cnc" => Ok(Self::CacheNetworkCache),
            _ => Err(StrategyError::UnknownStrategy(s.to_string())),
        }
    }
}

/// Role of a source within a strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Cache,
    Network,
    WriteBack,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Cache => "cache",
            Self::Network => "network",
            Self::WriteBack => "write-back",
        })
    }
}

/// The storage functions handed to a [`Strategy`]. Any of them may be left out.
pub struct Sources<T> {
    cache: Option<StorageFunction<T>>,
    network: Option<StorageFunction<T>>,
    write_back: Option<WriteBackFunction<T>>,
}

impl<T> Sources<T> {
    pub const fn new() -> Self {
        Self {
            cache: None,
            network: None,
            write_back: None,
        }
    }

    #[must_use]
    pub fn cache(mut self, function: StorageFunction<T>) -> Self {
        self.cache = Some(function);
        self
    }

    #[must_use]
    pub fn network(mut self, function: StorageFunction<T>) -> Self {
        self.network = Some(function);
        self
    }

    #[must_use]
    pub fn write_back(mut self, function: WriteBackFunction<T>) -> Self {
        self.write_back = Some(function);
        self
    }
}

impl<T> Default for Sources<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Sources<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sources")
            .field("cache", &self.cache.is_some())
            .field("network", &self.network.is_some())
            .field("write_back", &self.write_back.is_some())
            .finish()
    }
}
