//! Fail-open cache for upstream data.
//!
//! [`Cache`] wraps a [`CacheStore`] chosen once at startup:
//! - [`RedisStore`] when Redis is reachable
//! - [`MemoryStore`] when `REDIS_URL=memory`
//! - [`NoopStore`] when disabled, misconfigured or unreachable
//!
//! Callers never see a cache failure as an error response; [`Cache::fetch_through`]
//! logs it and goes to the source of truth.

pub mod keys;
pub mod memory;
pub mod store;

use serde::{de::DeserializeOwned, Serialize};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

pub use keys::{CacheKey, TtlClass};
pub use memory::MemoryStore;
pub use store::{CacheStore, NoopStore, RedisStore};

use crate::config::Config;
use crate::error::CacheResult;

/// TTLs per key class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheTtls {
    pub search: Duration,
    pub providers: Duration,
}

impl CacheTtls {
    pub fn from_config(config: &Config) -> Self {
        Self {
            search: config.search_cache_ttl(),
            providers: config.providers_cache_ttl(),
        }
    }

    pub fn for_key(&self, key: &CacheKey) -> Duration {
        match key.ttl_class() {
            TtlClass::Search => self.search,
            TtlClass::Providers => self.providers,
        }
    }
}

impl Default for CacheTtls {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Typed JSON cache over a [`CacheStore`]
#[derive(Clone)]
pub struct Cache {
    store: Arc<dyn CacheStore>,
    ttls: CacheTtls,
}

impl Cache {
    pub fn new(store: Arc<dyn CacheStore>, ttls: CacheTtls) -> Self {
        Self { store, ttls }
    }

    /// Cache that never stores anything
    pub fn disabled() -> Self {
        Self::new(Arc::new(NoopStore), CacheTtls::default())
    }

    /// Cache backed by an in-process store
    pub fn in_memory(ttls: CacheTtls) -> Self {
        Self::new(Arc::new(MemoryStore::new()), ttls)
    }

    /// Builds the cache from `REDIS_URL`.
    ///
    /// Never fails: `disabled`, an unparsable address or an unreachable server all
    /// yield a no-op cache.
    pub async fn connect(config: &Config) -> Self {
        let ttls = CacheTtls::from_config(config);
        let addr = config.redis_url.trim();

        if addr.eq_ignore_ascii_case("disabled") {
            tracing::info!("Cache disabled via REDIS_URL=disabled");
            return Self::new(Arc::new(NoopStore), ttls);
        }

        if addr.eq_ignore_ascii_case("memory") {
            tracing::info!("Using in-process cache");
            return Self::in_memory(ttls);
        }

        match RedisStore::connect(addr, config.redis_timeout()).await {
            Ok(store) => {
                tracing::info!("Connected to Redis cache");
                Self::new(Arc::new(store), ttls)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Redis unavailable, disabling cache");
                Self::new(Arc::new(NoopStore), ttls)
            }
        }
    }

    pub fn backend(&self) -> &'static str {
        self.store.backend()
    }

    /// Retrieves a value from the cache by key
    ///
    /// `Ok(None)` means the key was never set or has expired. A stored value that no
    /// longer decodes is an error, not a miss.
    pub async fn get_from_cache<T: DeserializeOwned>(&self, key: &CacheKey) -> CacheResult<Option<T>> {
        match self.store.get(&key.to_string()).await? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    /// Stores a value with the TTL of the key's class
    pub async fn set<T: Serialize>(&self, key: &CacheKey, value: &T) -> CacheResult<()> {
        let json = serde_json::to_string(value)?;
        self.store
            .set(&key.to_string(), json, self.ttls.for_key(key))
            .await
    }

    /// Cache-aside: returns the cached value, or runs `fetch` and writes its result back.
    ///
    /// A cache read error is handled like a miss. A failed write is logged and the
    /// fetched value is still returned. Errors from `fetch` pass through untouched.
    pub async fn fetch_through<T, E, F, Fut>(&self, key: &CacheKey, fetch: F) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        match self.get_from_cache::<T>(key).await {
            Ok(Some(cached)) => {
                tracing::debug!(key = %key, "Cache hit");
                return Ok(cached);
            }
            Ok(None) => tracing::debug!(key = %key, "Cache miss"),
            Err(e) => tracing::warn!(key = %key, error = %e, "Cache lookup failed"),
        }

        let value = fetch().await?;

        if let Err(e) = self.set(key, &value).await {
            tracing::warn!(key = %key, error = %e, "Cache write failed");
        }

        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CacheError, CacheResult};
    use crate::models::{MediaType, SearchPage, SearchQuery, TitleRef};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Store whose every operation fails
    struct BrokenStore;

    #[async_trait::async_trait]
    impl CacheStore for BrokenStore {
        async fn get(&self, _key: &str) -> CacheResult<Option<String>> {
            Err(CacheError::Backend("connection reset".to_string()))
        }

        async fn set(&self, _key: &str, _value: String, _ttl: Duration) -> CacheResult<()> {
            Err(CacheError::Backend("connection reset".to_string()))
        }

        fn backend(&self) -> &'static str {
            "broken"
        }
    }

    fn providers_key(id: i64) -> CacheKey {
        CacheKey::providers(TitleRef::parse(id, "movie").unwrap())
    }

    fn search_key() -> CacheKey {
        CacheKey::search(&SearchQuery {
            query: "dune".to_string(),
            page: 1,
            include_adult: false,
            language: None,
            region: None,
            media_type: MediaType::Movie,
        })
    }

    #[tokio::test]
    async fn test_set_then_get_returns_value() {
        let cache = Cache::in_memory(CacheTtls::default());
        let page = SearchPage {
            results: vec![],
            page: 1,
            total_pages: 3,
        };

        cache.set(&search_key(), &page).await.unwrap();
        let cached: Option<SearchPage> = cache.get_from_cache(&search_key()).await.unwrap();

        assert_eq!(cached, Some(page));
    }

    #[tokio::test]
    async fn test_get_never_set_is_miss() {
        let cache = Cache::in_memory(CacheTtls::default());
        let cached: Option<SearchPage> = cache.get_from_cache(&providers_key(42)).await.unwrap();
        assert_eq!(cached, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ttl_follows_key_class() {
        let ttls = CacheTtls {
            search: Duration::from_secs(10),
            providers: Duration::from_secs(100),
        };
        let cache = Cache::in_memory(ttls);

        cache.set(&search_key(), &1u32).await.unwrap();
        cache.set(&providers_key(1), &2u32).await.unwrap();

        tokio::time::advance(Duration::from_secs(11)).await;

        assert_eq!(cache.get_from_cache::<u32>(&search_key()).await.unwrap(), None);
        assert_eq!(cache.get_from_cache::<u32>(&providers_key(1)).await.unwrap(), Some(2));
    }

    #[tokio::test]
    async fn test_undecodable_value_is_error_not_miss() {
        let store = Arc::new(MemoryStore::new());
        store
            .set(&providers_key(7).to_string(), "not json".to_string(), Duration::from_secs(60))
            .await
            .unwrap();
        let cache = Cache::new(store, CacheTtls::default());

        let result = cache.get_from_cache::<SearchPage>(&providers_key(7)).await;
        assert!(matches!(result, Err(CacheError::Serialization(_))));
    }

    #[tokio::test]
    async fn test_disabled_cache_misses_and_accepts_writes() {
        let cache = Cache::disabled();
        assert_eq!(cache.backend(), "noop");

        cache.set(&providers_key(1), &"value").await.unwrap();
        let cached: Option<String> = cache.get_from_cache(&providers_key(1)).await.unwrap();
        assert_eq!(cached, None);
    }

    #[tokio::test]
    async fn test_connect_disabled_is_noop() {
        let config = Config {
            redis_url: " DISABLED ".to_string(),
            ..Config::default()
        };
        let cache = Cache::connect(&config).await;
        assert_eq!(cache.backend(), "noop");
    }

    #[tokio::test]
    async fn test_connect_malformed_address_is_noop() {
        let config = Config {
            redis_url: "::not-a-redis-url::".to_string(),
            ..Config::default()
        };
        let cache = Cache::connect(&config).await;
        assert_eq!(cache.backend(), "noop");
    }

    #[tokio::test]
    async fn test_connect_unreachable_is_noop() {
        let config = Config {
            redis_url: "redis://127.0.0.1:1".to_string(),
            ..Config::default()
        };
        let cache = Cache::connect(&config).await;
        assert_eq!(cache.backend(), "noop");

        cache.set(&providers_key(3), &"v").await.unwrap();
        assert_eq!(cache.get_from_cache::<String>(&providers_key(3)).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_connect_memory() {
        let config = Config {
            redis_url: "memory".to_string(),
            ..Config::default()
        };
        assert_eq!(Cache::connect(&config).await.backend(), "memory");
    }

    #[tokio::test]
    async fn test_fetch_through_fetches_once_then_hits() {
        let cache = Cache::in_memory(CacheTtls::default());
        let calls = AtomicUsize::new(0);

        for _ in 0..3 {
            let value: Result<u32, String> = cache
                .fetch_through(&providers_key(9), || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(99)
                })
                .await;
            assert_eq!(value, Ok(99));
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_fetch_through_survives_broken_store() {
        let cache = Cache::new(Arc::new(BrokenStore), CacheTtls::default());
        let value: Result<u32, String> = cache
            .fetch_through(&providers_key(9), || async { Ok(5) })
            .await;
        assert_eq!(value, Ok(5));
    }

    #[tokio::test]
    async fn test_fetch_through_does_not_cache_errors() {
        let cache = Cache::in_memory(CacheTtls::default());

        let first: Result<u32, String> = cache
            .fetch_through(&providers_key(5), || async { Err("upstream down".to_string()) })
            .await;
        assert!(first.is_err());

        let second: Result<u32, String> = cache
            .fetch_through(&providers_key(5), || async { Ok(1) })
            .await;
        assert_eq!(second, Ok(1));
    }
}
