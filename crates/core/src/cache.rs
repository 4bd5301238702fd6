//! Feed caching.
//!
//! The rendered index page is cached as an opaque HTML blob under a
//! fixed key, shared by every anonymous and signed-in visitor. The
//! window is short (20 seconds by default) and the cache is not
//! invalidated when posts change unless `cache.invalidate_on_write` is
//! enabled: a fresh post stays invisible on the index until the window
//! elapses. Many concurrent misses after expiry all re-render; there is
//! no stampede mitigation.
//!
//! The backend is injectable: Redis in production, in-memory for tests
//! and single-process deployments.

use async_trait::async_trait;
use fred::clients::Client as RedisClient;
use fred::interfaces::KeysInterface;
use fred::types::Expiration;
use quill_common::{AppError, AppResult, config::CacheConfig};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Cache key for the rendered global index page.
const INDEX_FEED_KEY: &str = "feed:index";

/// A string cache with per-entry expiry.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Get a cached value, `None` on miss or expiry.
    async fn get(&self, key: &str) -> AppResult<Option<String>>;

    /// Store a value that expires after `ttl`.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()>;

    /// Remove a value. No-op when the key is absent.
    async fn delete(&self, key: &str) -> AppResult<()>;
}

/// Redis-backed cache.
#[derive(Clone)]
pub struct RedisCache {
    redis: Arc<RedisClient>,
    prefix: String,
}

impl RedisCache {
    /// Create a Redis cache. Keys are stored under `prefix:`.
    #[must_use]
    pub fn new(redis: Arc<RedisClient>, prefix: impl Into<String>) -> Self {
        Self {
            redis,
            prefix: prefix.into(),
        }
    }

    fn full_key(&self, key: &str) -> String {
        format!("{}:{key}", self.prefix)
    }
}

#[async_trait]
impl CacheBackend for RedisCache {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        self.redis
            .get(self.full_key(key))
            .await
            .map_err(|e| AppError::Cache(e.to_string()))
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()> {
        self.redis
            .set::<(), _, _>(
                self.full_key(key),
                value,
                Some(Expiration::EX(ttl.as_secs() as i64)),
                None,
                false,
            )
            .await
            .map_err(|e| AppError::Cache(e.to_string()))
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.redis
            .del::<(), _>(self.full_key(key))
            .await
            .map_err(|e| AppError::Cache(e.to_string()))
    }
}

/// In-memory cache for tests and single-process deployments.
#[derive(Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, (String, Instant)>>,
}

impl MemoryCache {
    /// Create an empty in-memory cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheBackend for MemoryCache {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        let entries = self.entries.read().await;
        Ok(entries
            .get(key)
            .filter(|(_, deadline)| Instant::now() < *deadline)
            .map(|(value, _)| value.clone()))
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()> {
        let mut entries = self.entries.write().await;
        // Expired entries are dropped lazily, on overwrite
        entries.retain(|_, (_, deadline)| Instant::now() < *deadline);
        entries.insert(key.to_string(), (value.to_string(), Instant::now() + ttl));
        Ok(())
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}

/// The feed cache: lifecycle around a [`CacheBackend`].
///
/// Populate-on-miss, expire-on-timeout, explicit clear. A backend error
/// degrades to a miss (logged) rather than failing the request.
#[derive(Clone)]
pub struct FeedCache {
    backend: Arc<dyn CacheBackend>,
    ttl: Duration,
    invalidate_on_write: bool,
}

impl FeedCache {
    /// Create a feed cache over the given backend.
    #[must_use]
    pub fn new(backend: Arc<dyn CacheBackend>, config: &CacheConfig) -> Self {
        Self {
            backend,
            ttl: Duration::from_secs(config.feed_ttl_secs),
            invalidate_on_write: config.invalidate_on_write,
        }
    }

    /// Get the cached index page, if still fresh.
    pub async fn get_index(&self) -> Option<String> {
        match self.backend.get(INDEX_FEED_KEY).await {
            Ok(Some(html)) => {
                debug!("Index feed cache hit");
                Some(html)
            }
            Ok(None) => {
                debug!("Index feed cache miss");
                None
            }
            Err(e) => {
                warn!(error = %e, "Feed cache read failed, treating as miss");
                None
            }
        }
    }

    /// Store the rendered index page.
    pub async fn store_index(&self, html: &str) {
        if let Err(e) = self.backend.set(INDEX_FEED_KEY, html, self.ttl).await {
            warn!(error = %e, "Feed cache write failed");
        }
    }

    /// Drop the cached index page.
    pub async fn clear_index(&self) {
        if let Err(e) = self.backend.delete(INDEX_FEED_KEY).await {
            warn!(error = %e, "Feed cache clear failed");
        }
    }

    /// Called after any post write.
    ///
    /// Clears the cached index only when `cache.invalidate_on_write` is
    /// set; the default keeps the coarse time-based staleness window.
    pub async fn on_post_write(&self) {
        if self.invalidate_on_write {
            self.clear_index().await;
        }
    }
}
