// product_api/src/cache/mod.rs

//! Key-value cache capability injected into the product service.
//!
//! Values are stored as `serde_json::Value` so any backend that can hold JSON
//! documents can implement [`Cache`]. The typed get-or-populate helper lives in
//! [`remember`].

pub mod memory;

pub use memory::InMemoryCache;

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::{AppError, Result};

#[async_trait]
pub trait Cache: Send + Sync {
  /// Returns the value under `key` unless it is missing or expired.
  async fn get(&self, key: &str) -> Result<Option<Value>>;

  async fn put(&self, key: &str, value: Value, ttl: Duration) -> Result<()>;

  /// Removes `key`. Removing an absent key is not an error.
  async fn forget(&self, key: &str) -> Result<()>;
}

/// Get-or-populate: returns the cached value for `key`, or runs `producer`,
/// stores its output for `ttl` and returns it.
///
/// There is no single-flight guard; concurrent misses each run the producer.
pub async fn remember<T, F, Fut>(cache: &dyn Cache, key: &str, ttl: Duration, producer: F) -> Result<T>
where
  T: Serialize + DeserializeOwned,
  F: FnOnce() -> Fut,
  Fut: Future<Output = Result<T>>,
{
  if let Some(cached) = cache.get(key).await? {
    match serde_json::from_value::<T>(cached) {
      Ok(value) => {
        debug!(cache_key = key, "Cache hit.");
        return Ok(value);
      }
      Err(e) => {
        warn!(cache_key = key, error = %e, "Discarding undecodable cache entry.");
        cache.forget(key).await?;
      }
    }
  }

  debug!(cache_key = key, "Cache miss, populating.");
  let value = producer().await?;
  let encoded = serde_json::to_value(&value)
    .map_err(|e| AppError::Internal(format!("Failed to encode cache entry '{}': {}", key, e)))?;
  cache.put(key, encoded, ttl).await?;
  Ok(value)
}
