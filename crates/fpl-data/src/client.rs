//! Unified client: the single path through which every reader fetches.
//!
//! [`FplClient::resolve`] checks the cache, collapses concurrent misses for the
//! same key into one upstream fetch, wraps that fetch in the retry policy and
//! stores successful results. Failures are never cached.
//!
//! The fetch itself runs on a spawned task. A caller that stops waiting (for
//! example because it hit its own deadline) does not cancel the fetch; the
//! task still completes and fills the cache for later callers. The task owns
//! its in-flight table entry and removes it on every exit, including a panic
//! or the runtime shutting down, so a lost fetch never blocks later reads.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::cache::{CacheKey, CacheMode, CacheStore};
use crate::config::ClientConfig;
use crate::domain::{Cacheable, Payload};
use crate::error::FplError;
use crate::http_client::{HttpClient, ReqwestHttpClient, Transport};
use crate::readers::{BootstrapReader, FixturesReader, ManagerReader, PlayerReader};
use crate::retry::RetryPolicy;

type FetchOutcome = Option<Result<Payload, FplError>>;

struct ClientInner {
    transport: Transport,
    cache: CacheStore<Payload>,
    retry: RetryPolicy,
    in_flight: Mutex<HashMap<CacheKey, watch::Receiver<FetchOutcome>>>,
}

/// Cached, retrying, deduplicating client for the upstream API.
///
/// Cloning is cheap and every clone shares one cache and one in-flight table.
#[derive(Clone)]
pub struct FplClient {
    inner: Arc<ClientInner>,
}

/// Builder for [`FplClient`].
///
/// ```rust,ignore
/// use fpl_data::{ClientConfig, FplClient};
///
/// let client = FplClient::builder(ClientConfig::from_env()).build();
/// let snapshot = client.bootstrap().get_snapshot().await?;
/// ```
pub struct FplClientBuilder {
    config: ClientConfig,
    http: Option<Arc<dyn HttpClient>>,
    cache: Option<CacheStore<Payload>>,
    retry: Option<RetryPolicy>,
}

impl FplClientBuilder {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            http: None,
            cache: None,
            retry: None,
        }
    }

    pub fn http_client(mut self, http: Arc<dyn HttpClient>) -> Self {
        self.http = Some(http);
        self
    }

    /// Use an existing cache instead of a fresh one sized from the config.
    ///
    /// Ignored when the config disables caching.
    pub fn cache(mut self, cache: CacheStore<Payload>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = Some(retry);
        self
    }

    pub fn build(self) -> FplClient {
        let config = self.config;
        let http = self
            .http
            .unwrap_or_else(|| Arc::new(ReqwestHttpClient::new(&config.user_agent)));
        let transport = Transport::new(http, &config.base_url, config.request_timeout);
        let cache = if config.enable_cache {
            self.cache.unwrap_or_else(|| CacheStore::new(config.cache_ttl))
        } else {
            CacheStore::disabled()
        };
        let retry = self
            .retry
            .unwrap_or_else(|| RetryPolicy::from_config(&config));

        FplClient {
            inner: Arc::new(ClientInner {
                transport,
                cache,
                retry,
                in_flight: Mutex::new(HashMap::new()),
            }),
        }
    }
}

impl FplClient {
    pub fn builder(config: ClientConfig) -> FplClientBuilder {
        FplClientBuilder::new(config)
    }

    /// Client against the real upstream with the given configuration.
    pub fn new(config: ClientConfig) -> Self {
        Self::builder(config).build()
    }

    pub fn from_env() -> Self {
        Self::new(ClientConfig::from_env())
    }

    pub fn transport(&self) -> &Transport {
        &self.inner.transport
    }

    pub fn cache(&self) -> &CacheStore<Payload> {
        &self.inner.cache
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.inner.retry
    }

    pub fn bootstrap(&self) -> BootstrapReader {
        BootstrapReader::new(self.clone())
    }

    pub fn managers(&self) -> ManagerReader {
        ManagerReader::new(self.clone())
    }

    pub fn players(&self) -> PlayerReader {
        PlayerReader::new(self.clone())
    }

    pub fn fixtures(&self) -> FixturesReader {
        FixturesReader::new(self.clone())
    }

    /// Drop the cached entry for `key`, forcing the next read to fetch.
    pub fn invalidate(&self, key: &CacheKey) {
        if self.inner.cache.invalidate(key) {
            info!(key = %key, "cache entry invalidated");
        }
    }

    pub fn clear_cache(&self) {
        self.inner.cache.clear();
        info!("cache cleared");
    }

    /// Resolve `key` through the cache, fetching with `fetcher` on a miss.
    pub async fn resolve<T, F, Fut>(&self, key: CacheKey, fetcher: F) -> Result<Arc<T>, FplError>
    where
        T: Cacheable,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, FplError>> + Send + 'static,
    {
        self.resolve_with(key, CacheMode::Use, fetcher).await
    }

    /// [`resolve`](Self::resolve) with an explicit [`CacheMode`].
    ///
    /// At most one fetch per key is in flight at a time, whatever the mode.
    /// Callers that arrive while a fetch is running wait for it and receive
    /// its outcome, success or failure.
    pub async fn resolve_with<T, F, Fut>(
        &self,
        key: CacheKey,
        mode: CacheMode,
        fetcher: F,
    ) -> Result<Arc<T>, FplError>
    where
        T: Cacheable,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, FplError>> + Send + 'static,
    {
        let mode = self.effective_mode(mode);

        if let Some(payload) = self.cached(&key, mode) {
            debug!(key = %key, "cache hit");
            return downcast(&key, &payload);
        }

        let (mut receiver, leader) = {
            let mut in_flight = self
                .inner
                .in_flight
                .lock()
                .unwrap_or_else(PoisonError::into_inner);

            // A fetch may have completed between the first lookup and taking
            // the lock; it stores before leaving the table, so check again.
            if let Some(payload) = self.cached(&key, mode) {
                debug!(key = %key, "cache hit");
                return downcast(&key, &payload);
            }

            match in_flight.get(&key) {
                Some(receiver) => {
                    debug!(key = %key, "joining in-flight fetch");
                    (receiver.clone(), None)
                }
                None => {
                    debug!(key = %key, "cache miss");
                    let (sender, receiver) = watch::channel(None);
                    in_flight.insert(key.clone(), receiver.clone());
                    (receiver, Some(sender))
                }
            }
        };

        // Spawned outside the lock: a task dropped during spawn releases its
        // entry, which takes the same lock.
        if let Some(sender) = leader {
            self.spawn_fetch(key.clone(), mode, sender, fetcher);
        }

        let outcome = receiver
            .wait_for(Option::is_some)
            .await
            .map(|outcome| (*outcome).clone())
            .map_err(|_| FplError::internal(format!("fetch for {key} ended without a result")))?;

        match outcome {
            Some(Ok(payload)) => downcast(&key, &payload),
            Some(Err(error)) => Err(error),
            None => Err(FplError::internal(format!("fetch for {key} ended without a result"))),
        }
    }

    fn effective_mode(&self, mode: CacheMode) -> CacheMode {
        if self.inner.cache.is_disabled() {
            CacheMode::Bypass
        } else {
            mode
        }
    }

    fn cached(&self, key: &CacheKey, mode: CacheMode) -> Option<Payload> {
        if !mode.reads() {
            return None;
        }
        self.inner.cache.get(key).map(|entry| entry.payload)
    }

    fn spawn_fetch<T, F, Fut>(
        &self,
        key: CacheKey,
        mode: CacheMode,
        sender: watch::Sender<FetchOutcome>,
        fetcher: F,
    ) where
        T: Cacheable,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, FplError>> + Send + 'static,
    {
        let guard = InFlightGuard {
            inner: Arc::clone(&self.inner),
            key,
            sender,
            released: false,
        };
        tokio::spawn(async move {
            let result = guard
                .inner
                .retry
                .run(&fetcher)
                .await
                .map(|record| T::into_payload(Arc::new(record)));

            if let Ok(payload) = &result {
                if mode.writes() {
                    guard.inner.cache.put(guard.key.clone(), payload.clone());
                }
            }

            guard.complete(result);
        });
    }
}

/// Ownership of one in-flight table entry.
///
/// The entry is removed before the sender is closed, whether the fetch
/// completes or its task is dropped part way through.
struct InFlightGuard {
    inner: Arc<ClientInner>,
    key: CacheKey,
    sender: watch::Sender<FetchOutcome>,
    released: bool,
}

impl InFlightGuard {
    fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        self.inner
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.key);
    }

    fn complete(mut self, result: Result<Payload, FplError>) {
        self.release();
        // Every waiter holds a receiver cloned from the table entry; a send
        // error only means nobody is waiting any more.
        let _ = self.sender.send(Some(result));
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        if !self.released {
            warn!(key = %self.key, "fetch task dropped before completing");
            self.release();
        }
    }
}

impl std::fmt::Debug for FplClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FplClient")
            .field("transport", &self.inner.transport)
            .field("retry", &self.inner.retry)
            .field("cache_entries", &self.inner.cache.len())
            .finish_non_exhaustive()
    }
}

fn downcast<T: Cacheable>(key: &CacheKey, payload: &Payload) -> Result<Arc<T>, FplError> {
    T::from_payload(payload).ok_or_else(|| {
        FplError::internal(format!("cache entry {key} holds an unexpected record type"))
    })
}
