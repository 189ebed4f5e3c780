//! The five cache/network combinators.
//!
//! Every combinator reports only through `on_response`, which is invoked
//! zero, one or two times. Sources run strictly one after another: the
//! next source is executed from inside the previous source's continuation,
//! so the order holds even when sources complete on other threads.
//!
//! An absent source (`None`) is skipped: it is not called and contributes
//! no response.

use fetch_domain::SealedResponse;

use crate::storage::{StorageFunction, WriteBackFunction};

/// **CN**: cache, then network. Both results are forwarded.
///
/// Same as [`cache_network_cache`] without a write-back step.
pub fn cache_then_network<T, F>(
    cache: Option<StorageFunction<T>>,
    network: Option<StorageFunction<T>>,
    on_response: F,
) where
    T: Clone + 'static,
    F: Fn(SealedResponse<T>) + Send + 'static,
{
    cache_network_cache(cache, network, None, on_response);
}

/// **CNC**: cache, then network, then write a successful network result
/// back into the cache.
///
/// Cache and network results are forwarded whether they succeed or not.
/// Without a cache source nothing runs at all, network included.
pub fn cache_network_cache<T, F>(
    cache: Option<StorageFunction<T>>,
    network: Option<StorageFunction<T>>,
    write_back: Option<WriteBackFunction<T>>,
    on_response: F,
) where
    T: Clone + 'static,
    F: Fn(SealedResponse<T>) + Send + 'static,
{
    let Some(cache) = cache else {
        tracing::debug!("Cache source absent, skipping network");
        return;
    };

    cache.execute(move |cached| {
        tracing::debug!(success = cached.is_success(), "Cache responded");
        on_response(cached);

        if let Some(network) = network {
            network.execute(move |fetched| {
                tracing::debug!(success = fetched.is_success(), "Network responded");
                forward_then_write_back(fetched, &on_response, write_back);
            });
        }
    });
}

/// **NC**: network, then write a successful result back into the cache.
///
/// The network result is always forwarded. Without a network source
/// nothing runs.
pub fn network_then_cache<T, F>(
    network: Option<StorageFunction<T>>,
    write_back: Option<WriteBackFunction<T>>,
    on_response: F,
) where
    T: Clone + 'static,
    F: Fn(SealedResponse<T>) + Send + 'static,
{
    let Some(network) = network else {
        tracing::debug!("Network source absent, nothing to do");
        return;
    };

    network.execute(move |fetched| {
        tracing::debug!(success = fetched.is_success(), "Network responded");
        forward_then_write_back(fetched, &on_response, write_back);
    });
}

/// **CorN**: the first successful answer, cache first.
///
/// A cache hit stops there and the network is never called. Errors are
/// never forwarded; if neither source succeeds `on_response` is not called.
pub fn cache_or_network<T, F>(
    cache: Option<StorageFunction<T>>,
    network: Option<StorageFunction<T>>,
    on_response: F,
) where
    T: 'static,
    F: Fn(SealedResponse<T>) + Send + 'static,
{
    first_success(cache, network, ["cache", "network"], on_response);
}

/// **NorC**: the first successful answer, network first.
pub fn network_or_cache<T, F>(
    network: Option<StorageFunction<T>>,
    cache: Option<StorageFunction<T>>,
    on_response: F,
) where
    T: 'static,
    F: Fn(SealedResponse<T>) + Send + 'static,
{
    first_success(network, cache, ["network", "cache"], on_response);
}

fn forward_then_write_back<T, F>(
    fetched: SealedResponse<T>,
    on_response: &F,
    write_back: Option<WriteBackFunction<T>>,
) where
    T: Clone + 'static,
    F: Fn(SealedResponse<T>),
{
    match (fetched, write_back) {
        (SealedResponse::Success(data), Some(write_back)) => {
            on_response(SealedResponse::Success(data.clone()));
            tracing::debug!("Writing network result back to cache");
            write_back.execute_with_value(data, log_write_back);
        }
        (fetched, _) => on_response(fetched),
    }
}

// Write-back outcomes never reach the caller.
fn log_write_back(outcome: SealedResponse<bool>) {
    match outcome {
        SealedResponse::Success(true) => tracing::debug!("Cache write-back stored"),
        SealedResponse::Success(false) => tracing::warn!("Cache write-back stored nothing"),
        SealedResponse::Error(e) => tracing::warn!(error = %e, "Cache write-back failed"),
    }
}

fn first_success<T, F>(
    primary: Option<StorageFunction<T>>,
    fallback: Option<StorageFunction<T>>,
    [primary_name, fallback_name]: [&'static str; 2],
    on_response: F,
) where
    T: 'static,
    F: Fn(SealedResponse<T>) + Send + 'static,
{
    let try_fallback = move |on_response: F| {
        let Some(fallback) = fallback else {
            tracing::debug!(source = fallback_name, "Fallback source absent");
            return;
        };
        fallback.execute(move |response| match response {
            SealedResponse::Success(_) => on_response(response),
            SealedResponse::Error(e) => {
                tracing::debug!(source = fallback_name, error = %e, "Both sources failed, nothing forwarded");
            }
        });
    };

    let Some(primary) = primary else {
        tracing::debug!(source = primary_name, "Primary source absent, falling back");
        try_fallback(on_response);
        return;
    };

    primary.execute(move |response| match response {
        SealedResponse::Success(_) => {
            tracing::debug!(source = primary_name, "Primary source answered");
            on_response(response);
        }
        SealedResponse::Error(e) => {
            tracing::debug!(source = primary_name, error = %e, "Primary source failed, falling back");
            try_fallback(on_response);
        }
    });
}
