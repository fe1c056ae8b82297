use chrono::{DateTime, Utc};
use redis::aio::ConnectionManager;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::models::UserId;

/// Errors that can occur with cache operations
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Redis error: {0}")]
    RedisError(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Cache miss: {0}")]
    CacheMiss(String),
}

/// Multi-tier cache manager
///
/// Implements L1 (in-memory) and L2 (Redis) caching strategy.
/// L1 is fastest but local to this instance, L2 is shared across instances.
pub struct CacheManager {
    redis: Arc<tokio::sync::Mutex<ConnectionManager>>,
    l1_cache: moka::future::Cache<String, Vec<u8>>,
}

/// Marker stored while a user must wait before requesting another match
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cooldown {
    pub until: DateTime<Utc>,
}

impl CacheManager {
    /// Create a new cache manager
    pub async fn new(redis_url: &str, l1_size: u64, ttl_secs: u64) -> Result<Self, CacheError> {
        let client = redis::Client::open(redis_url)?;
        let redis = redis::aio::ConnectionManager::new(client).await?;

        let l1_cache = moka::future::CacheBuilder::new(l1_size)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();

        Ok(Self {
            redis: Arc::new(tokio::sync::Mutex::new(redis)),
            l1_cache,
        })
    }

    /// Get a value from cache (L1 first, then L2)
    pub async fn get<T>(&self, key: &str) -> Result<T, CacheError>
    where
        T: for<'de> Deserialize<'de>,
    {
        if let Some(bytes) = self.l1_cache.get(key).await {
            tracing::trace!("L1 cache hit: {}", key);
            return Ok(serde_json::from_slice(&bytes)?);
        }

        let mut conn = self.redis.lock().await;
        let value: Option<String> = redis::cmd("GET")
            .arg(key)
            .query_async(&mut *conn)
            .await?;
        drop(conn);

        if let Some(json) = value {
            tracing::trace!("L2 cache hit: {}", key);

            // Populate L1 cache
            let bytes = json.as_bytes().to_vec();
            self.l1_cache.insert(key.to_string(), bytes).await;

            return Ok(serde_json::from_str(&json)?);
        }

        tracing::trace!("Cache miss: {}", key);
        Err(CacheError::CacheMiss(key.to_string()))
    }

    /// Set a value in both tiers; the Redis entry expires after `ttl_secs`
    ///
    /// L1 keeps its own configured TTL, so values that must expire sooner
    /// carry their own deadline (see [`Cooldown`]).
    pub async fn set_with_ttl<T>(&self, key: &str, value: &T, ttl_secs: u64) -> Result<(), CacheError>
    where
        T: Serialize,
    {
        let json = serde_json::to_string(value)?;

        let bytes = json.as_bytes().to_vec();
        self.l1_cache.insert(key.to_string(), bytes).await;

        let mut conn = self.redis.lock().await;
        redis::cmd("SETEX")
            .arg(key)
            .arg(ttl_secs.max(1))
            .arg(json)
            .query_async::<()>(&mut *conn)
            .await?;
        drop(conn);

        tracing::trace!("Cache set: {}", key);
        Ok(())
    }

    /// Delete a value from both cache tiers
    pub async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.l1_cache.invalidate(key).await;
        let mut conn = self.redis.lock().await;
        redis::cmd("DEL")
            .arg(key)
            .query_async::<()>(&mut *conn)
            .await?;
        Ok(())
    }

    /// Start a match cooldown for `user_id`
    pub async fn start_cooldown(&self, user_id: UserId, secs: u64) -> Result<(), CacheError> {
        if secs == 0 {
            return Ok(());
        }
        let marker = Cooldown {
            until: Utc::now() + chrono::Duration::seconds(secs as i64),
        };
        self.set_with_ttl(&CacheKey::cooldown(user_id), &marker, secs)
            .await
    }

    /// Seconds left on `user_id`'s cooldown, `None` if there is none
    pub async fn cooldown_remaining(&self, user_id: UserId) -> Result<Option<i64>, CacheError> {
        let key = CacheKey::cooldown(user_id);
        match self.get::<Cooldown>(&key).await {
            Ok(marker) => Ok(remaining_secs(&marker, Utc::now())),
            Err(CacheError::CacheMiss(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

}

fn remaining_secs(marker: &Cooldown, now: DateTime<Utc>) -> Option<i64> {
    let left = (marker.until - now).num_seconds();
    (left > 0).then_some(left)
}

/// Cache key builder
pub struct CacheKey;

impl CacheKey {
    /// Build a cache key for a user's match cooldown
    pub fn cooldown(user_id: UserId) -> String {
        format!("cooldown:{}", user_id)
    }
}
