use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::FetchError;
use crate::models::{Observation, StationId};
use crate::provider::ObservationProvider;

struct StoredEntry<T> {
    value: T,
    expires_at: Instant,
}

/// Short-lived in-memory cache of observations, keyed by station.
///
/// METARs are issued roughly hourly, so repeated dashboard refreshes within the
/// TTL are served without touching the provider's rate limit.
pub struct ObservationCache {
    ttl: Duration,
    store: RwLock<HashMap<StationId, StoredEntry<Observation>>>,
}

impl ObservationCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            store: RwLock::new(HashMap::new()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        !self.ttl.is_zero()
    }

    /// Stores an observation until the TTL elapses.
    #[tracing::instrument(name = "put_cache", level = "debug", skip(self, value))]
    pub async fn put(&self, key: &StationId, value: Observation) {
        if !self.is_enabled() {
            return;
        }
        let entry = StoredEntry {
            value,
            expires_at: Instant::now() + self.ttl,
        };
        self.store.write().await.insert(key.clone(), entry);
    }

    /// Retrieves an observation if it exists and has not expired.
    /// Returns `None` for cache misses or expired entries.
    #[tracing::instrument(name = "query_cache", level = "debug", skip(self))]
    pub async fn get(&self, key: &StationId) -> Option<Observation> {
        let expired = {
            let store = self.store.read().await;
            match store.get(key) {
                Some(entry) if Instant::now() < entry.expires_at => {
                    tracing::debug!("Key found and still fresh");
                    return Some(entry.value.clone());
                }
                Some(_) => true,
                None => false,
            }
        };

        if expired {
            tracing::debug!("Key found but expired");
            self.remove(key).await;
        } else {
            tracing::debug!("Key not found");
        }
        None
    }

    /// Manually removes a station from the cache.
    pub async fn remove(&self, key: &StationId) {
        self.store.write().await.remove(key);
    }

    pub async fn len(&self) -> usize {
        self.store.read().await.len()
    }
}

/// Provider wrapper that consults an [`ObservationCache`] first.
///
/// Failures are never cached.
pub struct CachedProvider<P> {
    inner: P,
    cache: ObservationCache,
}

impl<P: ObservationProvider> CachedProvider<P> {
    pub fn new(inner: P, ttl: Duration) -> Self {
        Self {
            inner,
            cache: ObservationCache::new(ttl),
        }
    }

    pub fn cache(&self) -> &ObservationCache {
        &self.cache
    }
}

#[async_trait]
impl<P: ObservationProvider> ObservationProvider for CachedProvider<P> {
    async fn fetch_observation(&self, station: &StationId) -> Result<Observation, FetchError> {
        if let Some(cached) = self.cache.get(station).await {
            return Ok(cached);
        }
        let observation = self.inner.fetch_observation(station).await?;
        self.cache.put(station, observation.clone()).await;
        Ok(observation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::AvwxMetar;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingProvider {
        calls: AtomicUsize,
        fail: bool,
    }

    impl CountingProvider {
        fn new(fail: bool) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail,
            }
        }
    }

    #[async_trait]
    impl ObservationProvider for CountingProvider {
        async fn fetch_observation(&self, station: &StationId) -> Result<Observation, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(FetchError::UpstreamUnavailable("down".into()));
            }
            let metar: AvwxMetar =
                serde_json::from_str(include_str!("../tests/fixtures/avwx_kjfk.json")).unwrap();
            metar.into_observation(station)
        }
    }

    fn kjfk() -> StationId {
        StationId::parse("KJFK").unwrap()
    }

    #[tokio::test]
    async fn test_second_fetch_is_served_from_cache() {
        let provider = CachedProvider::new(CountingProvider::new(false), Duration::from_secs(60));
        let first = provider.fetch_observation(&kjfk()).await.unwrap();
        let second = provider.fetch_observation(&kjfk()).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(provider.inner.calls.load(Ordering::SeqCst), 1);
        assert_eq!(provider.cache().len().await, 1);
    }

    #[tokio::test]
    async fn test_zero_ttl_disables_cache() {
        let provider = CachedProvider::new(CountingProvider::new(false), Duration::ZERO);
        provider.fetch_observation(&kjfk()).await.unwrap();
        provider.fetch_observation(&kjfk()).await.unwrap();
        assert_eq!(provider.inner.calls.load(Ordering::SeqCst), 2);
        assert_eq!(provider.cache().len().await, 0);
    }

    #[tokio::test]
    async fn test_failures_are_not_cached() {
        let provider = CachedProvider::new(CountingProvider::new(true), Duration::from_secs(60));
        assert!(provider.fetch_observation(&kjfk()).await.is_err());
        assert!(provider.fetch_observation(&kjfk()).await.is_err());
        assert_eq!(provider.inner.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_expired_entry_is_evicted() {
        let cache = ObservationCache::new(Duration::from_millis(20));
        let metar: AvwxMetar =
            serde_json::from_str(include_str!("../tests/fixtures/avwx_kjfk.json")).unwrap();
        cache.put(&kjfk(), metar.into_observation(&kjfk()).unwrap()).await;
        assert!(cache.get(&kjfk()).await.is_some());

        tokio::time::sleep(Duration::from_millis(40)).await;
        assert!(cache.get(&kjfk()).await.is_none());
        assert_eq!(cache.len().await, 0);
    }
}
