//! Strategy runs against the simulated sources.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use fetch_domain::SealedResponse;
use fetch_strategies::{Sources, Strategy};
use serde::Serialize;
use tokio::runtime::Handle;
use uuid::Uuid;

use crate::config::SimulatorConfig;
use crate::error::Result;
use crate::source::{
    storage_function, write_back_function, Catalog, MemoryCache, SimulatedNetwork,
};

/// One response as seen by the caller.
#[derive(Debug, Clone, Serialize)]
pub struct ObservedResponse {
    /// Milliseconds since the run started
    pub elapsed_ms: u64,
    pub response: SealedResponse<Catalog>,
}

/// Outcome of a single strategy invocation.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub strategy: Strategy,
    pub started_at: DateTime<Utc>,
    pub responses: Vec<ObservedResponse>,
}

impl RunReport {
    /// Revisions of the successful responses, in arrival order
    pub fn revisions(&self) -> Vec<u64> {
        self.responses
            .iter()
            .filter_map(|observed| observed.response.data().map(|catalog| catalog.revision))
            .collect()
    }

    pub fn error_count(&self) -> usize {
        self.responses
            .iter()
            .filter(|observed| observed.response.is_error())
            .count()
    }
}

/// A strategy wired to a simulated cache and network.
#[derive(Debug, Clone)]
pub struct Scenario {
    strategy: Strategy,
    cache: Arc<MemoryCache>,
    network: Arc<SimulatedNetwork>,
}

impl Scenario {
    pub const fn new(
        strategy: Strategy,
        cache: Arc<MemoryCache>,
        network: Arc<SimulatedNetwork>,
    ) -> Self {
        Self {
            strategy,
            cache,
            network,
        }
    }

    /// Build the cache and network described by `config`.
    pub fn from_config(config: &SimulatorConfig) -> Self {
        let mut cache = MemoryCache::new(config.cache.profile(), config.write_profile());
        if config.seed_cache {
            cache = cache.seeded(Catalog::generate(0, config.catalog_size));
        }
        let network = SimulatedNetwork::new(config.network.profile(), config.catalog_size);

        Self::new(config.strategy, Arc::new(cache), Arc::new(network))
    }

    pub const fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn cache(&self) -> &MemoryCache {
        &self.cache
    }

    pub fn network(&self) -> &SimulatedNetwork {
        &self.network
    }

    /// Bind only the sources the strategy can use.
    fn sources(&self, handle: &Handle) -> Sources<Catalog> {
        let mut sources = Sources::new().network(storage_function(handle, self.network.clone()));
        if self.strategy.reads_cache() {
            sources = sources.cache(storage_function(handle, self.cache.clone()));
        }
        if self.strategy.writes_back() {
            sources = sources.write_back(write_back_function(handle, self.cache.clone()));
        }
        sources
    }

    /// Invoke the strategy once and wait for every forwarded response.
    ///
    /// A write-back may still be in flight when this returns.
    ///
    /// # Errors
    ///
    /// Returns an error if the strategy rejects the bound sources.
    pub async fn run(&self) -> Result<RunReport> {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        let started = Instant::now();

        let mut stream = self.strategy.responses(self.sources(&Handle::current()))?;

        let mut responses = Vec::new();
        while let Some(response) = stream.recv().await {
            let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
            tracing::debug!(
                %run_id,
                elapsed_ms,
                success = response.is_success(),
                "Response forwarded"
            );
            responses.push(ObservedResponse {
                elapsed_ms,
                response,
            });
        }

        Ok(RunReport {
            run_id,
            strategy: self.strategy,
            started_at,
            responses,
        })
    }
}
