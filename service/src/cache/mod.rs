/// Cache Access Layer (C1): string KV with miss discrimination,
/// sorted-set operations for the popularity window, and the
/// lease-based single-flight primitive used by cache-aside reads.
pub mod keys;

use std::time::Duration;

use redis_utils::{lease, RedisUtilError, SharedRedis};
use resilience::poll::{poll_until, PollConfig};
use serde::{de::DeserializeOwned, Serialize};

use crate::error::AppResult;

/// Distinguishes "not present" from a transport/timeout failure so
/// callers can choose: a miss triggers a rebuild, an error degrades to
/// the source of truth without attempting one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheLookup<T> {
    Hit(T),
    Miss,
}

#[derive(Clone)]
pub struct CacheAccess {
    redis: SharedRedis,
}

impl CacheAccess {
    pub fn new(redis: SharedRedis) -> Self {
        Self { redis }
    }

    pub async fn get(&self, key: &str) -> Result<CacheLookup<Vec<u8>>, RedisUtilError> {
        match redis_utils::get(&self.redis, key).await? {
            Some(bytes) => Ok(CacheLookup::Hit(bytes)),
            None => Ok(CacheLookup::Miss),
        }
    }

    pub async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> Result<(), RedisUtilError> {
        redis_utils::set_ex(&self.redis, key, value, ttl).await
    }

    pub async fn del(&self, key: &str) -> Result<(), RedisUtilError> {
        redis_utils::del(&self.redis, key).await
    }

    pub async fn exists(&self, key: &str) -> Result<bool, RedisUtilError> {
        redis_utils::exists(&self.redis, key).await
    }

    pub async fn zincr(&self, key: &str, member: &str, delta: f64) -> Result<f64, RedisUtilError> {
        redis_utils::zincr(&self.redis, key, member, delta).await
    }

    pub async fn expire(&self, key: &str, ttl: Duration) -> Result<(), RedisUtilError> {
        redis_utils::expire(&self.redis, key, ttl).await
    }

    pub async fn zunionstore_sum(&self, dst: &str, src_keys: &[String]) -> Result<(), RedisUtilError> {
        redis_utils::zunionstore_sum(&self.redis, dst, src_keys).await
    }

    pub async fn zrevrange(&self, key: &str, start: isize, stop: isize) -> Result<Vec<String>, RedisUtilError> {
        redis_utils::zrevrange(&self.redis, key, start, stop).await
    }

    pub async fn acquire_lease(&self, cache_key: &str, ttl: Duration) -> Result<Option<lease::Lease>, RedisUtilError> {
        lease::acquire(&self.redis, cache_key, ttl).await
    }

    pub async fn release_lease(&self, lease: &lease::Lease) -> Result<(), RedisUtilError> {
        lease::release(&self.redis, lease).await
    }

    /// Cache-aside-with-lease protocol shared by every cached read path:
    /// hit returns immediately; a miss races to acquire the rebuild
    /// lease, the loser polls the key bounded by `resilience::poll`
    /// rather than stampeding the source of truth, and a cache error
    /// degrades straight to `build` without blocking on Redis at all.
    pub async fn cache_aside<T, F, Fut>(&self, key: &str, ttl: Duration, lease_ttl: Duration, build: F) -> AppResult<T>
    where
        T: Serialize + DeserializeOwned,
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = AppResult<T>>,
    {
        if let Ok(CacheLookup::Hit(bytes)) = self.get(key).await {
            if let Ok(value) = serde_json::from_slice(&bytes) {
                return Ok(value);
            }
        }

        match self.acquire_lease(key, lease_ttl).await {
            Ok(Some(lease)) => {
                if let Ok(CacheLookup::Hit(bytes)) = self.get(key).await {
                    if let Ok(value) = serde_json::from_slice(&bytes) {
                        let _ = self.release_lease(&lease).await;
                        return Ok(value);
                    }
                }
                let value = build().await?;
                if let Ok(bytes) = serde_json::to_vec(&value) {
                    let _ = self.set(key, &bytes, ttl).await;
                }
                let _ = self.release_lease(&lease).await;
                Ok(value)
            }
            Ok(None) => {
                let cache = self.clone();
                let key_owned = key.to_string();
                let found = poll_until(PollConfig::default(), || {
                    let cache = cache.clone();
                    let key = key_owned.clone();
                    async move {
                        match cache.get(&key).await {
                            Ok(CacheLookup::Hit(bytes)) => serde_json::from_slice(&bytes).ok(),
                            _ => None,
                        }
                    }
                })
                .await;
                if let Some(value) = found {
                    return Ok(value);
                }
                let value = build().await?;
                if let Ok(bytes) = serde_json::to_vec(&value) {
                    let _ = self.set(key, &bytes, ttl).await;
                }
                Ok(value)
            }
            Err(_) => build().await,
        }
    }
}
