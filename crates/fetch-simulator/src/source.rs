//! Simulated cache and network sources with latency and failure injection.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fetch_domain::{RequestError, SealedResponse};
use fetch_strategies::{StorageFunction, WriteBackFunction};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tokio::runtime::Handle;
use tokio::sync::RwLock;

/// Payload served by the simulated sources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    pub revision: u64,
    pub fetched_at: DateTime<Utc>,
    pub entries: Vec<String>,
}

impl Catalog {
    /// Build a catalog of `size` generated entries.
    pub fn generate(revision: u64, size: usize) -> Self {
        Self {
            revision,
            fetched_at: Utc::now(),
            entries: (0..size).map(|i| format!("item-{revision}-{i}")).collect(),
        }
    }
}

// =============================================================================
// SOURCE TRAITS
// =============================================================================

/// A source that can be read.
#[async_trait]
pub trait DataSource<T>: Send + Sync {
    /// Name used in logs
    fn name(&self) -> &'static str;

    async fn fetch(&self) -> SealedResponse<T>;
}

/// A source that can persist a value.
#[async_trait]
pub trait WritableSource<T>: Send + Sync {
    /// Store `value`, reporting `Success(true)` once it is persisted.
    async fn store(&self, value: T) -> SealedResponse<bool>;
}

/// Wrap a readable source as a task-backed [`StorageFunction`].
pub fn storage_function<T, S>(handle: &Handle, source: Arc<S>) -> StorageFunction<T>
where
    T: Send + 'static,
    S: DataSource<T> + ?Sized + 'static,
{
    StorageFunction::spawn(handle.clone(), move || async move {
        tracing::debug!(source = source.name(), "Fetching");
        source.fetch().await
    })
}

/// Wrap a writable source as a task-backed [`WriteBackFunction`].
pub fn write_back_function<T, S>(handle: &Handle, source: Arc<S>) -> WriteBackFunction<T>
where
    T: Send + 'static,
    S: WritableSource<T> + ?Sized + 'static,
{
    WriteBackFunction::spawn(handle.clone(), move |value| async move {
        source.store(value).await
    })
}

// =============================================================================
// FAULT PROFILE
// =============================================================================

/// Latency and failure probability of one simulated operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaultProfile {
    pub latency: Duration,
    /// Probability in `0.0..=1.0` that the operation fails
    pub failure_rate: f64,
}

impl FaultProfile {
    pub const fn new(latency: Duration, failure_rate: f64) -> Self {
        Self {
            latency,
            failure_rate,
        }
    }

    /// No latency, never fails
    pub const fn reliable() -> Self {
        Self::new(Duration::ZERO, 0.0)
    }

    /// Wait out the latency, then roll whether the operation fails.
    async fn roll(&self) -> bool {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        rand::thread_rng().gen_bool(self.probability())
    }

    /// Failure rate clamped to `0.0..=1.0`; NaN never fails
    fn probability(&self) -> f64 {
        if self.failure_rate.is_nan() {
            0.0
        } else {
            self.failure_rate.clamp(0.0, 1.0)
        }
    }
}

impl Default for FaultProfile {
    fn default() -> Self {
        Self::reliable()
    }
}

// =============================================================================
// MEMORY CACHE
// =============================================================================

/// Single-slot in-memory cache.
///
/// Reads of an empty slot fail with [`RequestError::Unknown`], the same way
/// an injected fault does.
#[derive(Debug)]
pub struct MemoryCache {
    slot: RwLock<Option<Catalog>>,
    read: FaultProfile,
    write: FaultProfile,
}

impl MemoryCache {
    pub fn new(read: FaultProfile, write: FaultProfile) -> Self {
        Self {
            slot: RwLock::new(None),
            read,
            write,
        }
    }

    #[must_use]
    pub fn seeded(self, catalog: Catalog) -> Self {
        Self {
            slot: RwLock::new(Some(catalog)),
            ..self
        }
    }

    /// Current contents, bypassing latency and faults
    pub async fn snapshot(&self) -> Option<Catalog> {
        self.slot.read().await.clone()
    }
}

#[async_trait]
impl DataSource<Catalog> for MemoryCache {
    fn name(&self) -> &'static str {
        "cache"
    }

    async fn fetch(&self) -> SealedResponse<Catalog> {
        if self.read.roll().await {
            tracing::debug!("Injected cache read failure");
            return SealedResponse::Error(RequestError::Unknown);
        }

        match self.slot.read().await.clone() {
            Some(catalog) => {
                tracing::debug!(revision = catalog.revision, "Cache hit");
                SealedResponse::Success(catalog)
            }
            None => {
                tracing::debug!("Cache miss");
                SealedResponse::Error(RequestError::Unknown)
            }
        }
    }
}

#[async_trait]
impl WritableSource<Catalog> for MemoryCache {
    async fn store(&self, value: Catalog) -> SealedResponse<bool> {
        if self.write.roll().await {
            tracing::debug!("Injected cache write failure");
            return SealedResponse::Error(RequestError::Unknown);
        }

        let revision = value.revision;
        *self.slot.write().await = Some(value);
        tracing::debug!(revision, "Cache stored");
        SealedResponse::Success(true)
    }
}

// =============================================================================
// NETWORK
// =============================================================================

/// Remote source producing a new catalog revision on every successful fetch.
#[derive(Debug)]
pub struct SimulatedNetwork {
    profile: FaultProfile,
    catalog_size: usize,
    revision: AtomicU64,
}

impl SimulatedNetwork {
    pub const fn new(profile: FaultProfile, catalog_size: usize) -> Self {
        Self {
            profile,
            catalog_size,
            revision: AtomicU64::new(0),
        }
    }

    /// Revision of the most recent successful fetch
    pub fn revision(&self) -> u64 {
        self.revision.load(Ordering::SeqCst)
    }

    fn random_error() -> RequestError {
        let mut rng = rand::thread_rng();
        match rng.gen_range(0..4) {
            0 => RequestError::Unknown,
            1 => RequestError::NoInternet,
            2 => RequestError::Server,
            _ => RequestError::Http {
                code: 503,
                message: "Service Unavailable".to_string(),
            },
        }
    }
}

#[async_trait]
impl DataSource<Catalog> for SimulatedNetwork {
    fn name(&self) -> &'static str {
        "network"
    }

    async fn fetch(&self) -> SealedResponse<Catalog> {
        if self.profile.roll().await {
            let error = Self::random_error();
            tracing::debug!(error = %error, "Injected network failure");
            return SealedResponse::Error(error);
        }

        let revision = self.revision.fetch_add(1, Ordering::SeqCst) + 1;
        SealedResponse::Success(Catalog::generate(revision, self.catalog_size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fake::{Fake, Faker};

    fn failing() -> FaultProfile {
        FaultProfile::new(Duration::ZERO, 1.0)
    }

    #[test]
    fn test_empty_cache_misses() {
        let cache = MemoryCache::new(FaultProfile::reliable(), FaultProfile::reliable());

        let response = tokio_test::block_on(cache.fetch());
        assert_eq!(response, SealedResponse::Error(RequestError::Unknown));
    }

    #[tokio::test]
    async fn test_store_then_fetch() {
        let cache = MemoryCache::new(FaultProfile::reliable(), FaultProfile::reliable());
        let catalog = Catalog {
            revision: 3,
            fetched_at: Utc::now(),
            entries: vec![Faker.fake::<String>(), Faker.fake::<String>()],
        };

        assert_eq!(cache.store(catalog.clone()).await, SealedResponse::Success(true));
        assert_eq!(cache.fetch().await, SealedResponse::Success(catalog));
    }

    #[tokio::test]
    async fn test_failed_write_keeps_slot() {
        let seed = Catalog::generate(1, 2);
        let cache = MemoryCache::new(FaultProfile::reliable(), failing()).seeded(seed.clone());

        assert!(cache.store(Catalog::generate(2, 2)).await.is_error());
        assert_eq!(cache.snapshot().await, Some(seed));
    }

    #[tokio::test]
    async fn test_network_revisions_increase() {
        let network = SimulatedNetwork::new(FaultProfile::reliable(), 4);

        let first = network.fetch().await.into_data().unwrap();
        let second = network.fetch().await.into_data().unwrap();

        assert_eq!(first.revision, 1);
        assert_eq!(second.revision, 2);
        assert_eq!(second.entries.len(), 4);
        assert_eq!(network.revision(), 2);
    }

    #[tokio::test]
    async fn test_network_failure_has_no_revision() {
        let network = SimulatedNetwork::new(failing(), 4);

        assert!(network.fetch().await.is_error());
        assert_eq!(network.revision(), 0);
    }

    #[tokio::test]
    async fn test_nan_failure_rate_never_fails() {
        let network = SimulatedNetwork::new(FaultProfile::new(Duration::ZERO, f64::NAN), 1);

        assert!(network.fetch().await.is_success());
        assert_eq!(network.revision(), 1);
    }

    #[test]
    fn test_probability_is_clamped() {
        assert!(FaultProfile::new(Duration::ZERO, 7.5).probability() <= 1.0);
        assert!(FaultProfile::new(Duration::ZERO, f64::NEG_INFINITY).probability() >= 0.0);
        assert!(FaultProfile::new(Duration::ZERO, f64::NAN).probability().abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_storage_function_adapter() {
        let network = Arc::new(SimulatedNetwork::new(FaultProfile::reliable(), 1));
        let (tx, rx) = tokio::sync::oneshot::channel();

        storage_function::<Catalog, _>(&Handle::current(), network).execute(move |response| {
            let _ = tx.send(response);
        });

        let catalog = rx.await.unwrap().into_data().unwrap();
        assert_eq!(catalog.entries, vec!["item-1-0".to_string()]);
    }
}
