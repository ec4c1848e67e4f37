// product_api/src/cache/memory.rs

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;
use tokio::time::Instant;

use super::Cache;
use crate::errors::Result;

#[derive(Debug, Clone)]
struct CacheEntry {
  value: Value,
  expires_at: Instant,
}

/// Process-local cache. Expired entries are dropped lazily on read.
///
/// Uses `tokio::time::Instant` so expiry follows paused test clocks.
#[derive(Debug, Default)]
pub struct InMemoryCache {
  entries: RwLock<HashMap<String, CacheEntry>>,
}

impl InMemoryCache {
  pub fn new() -> Self {
    Self::default()
  }

  /// Number of live (unexpired) entries.
  pub fn len(&self) -> usize {
    let now = Instant::now();
    self.entries.read().values().filter(|entry| entry.expires_at > now).count()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}

#[async_trait]
impl Cache for InMemoryCache {
  async fn get(&self, key: &str) -> Result<Option<Value>> {
    let now = Instant::now();
    {
      let guard = self.entries.read();
      match guard.get(key) {
        Some(entry) if entry.expires_at > now => return Ok(Some(entry.value.clone())),
        Some(_) => {}
        None => return Ok(None),
      }
    } // read guard dropped before taking the write lock

    let mut guard = self.entries.write();
    if guard.get(key).is_some_and(|entry| entry.expires_at <= now) {
      guard.remove(key);
    }
    Ok(None)
  }

  async fn put(&self, key: &str, value: Value, ttl: Duration) -> Result<()> {
    let entry = CacheEntry {
      value,
      expires_at: Instant::now() + ttl,
    };
    self.entries.write().insert(key.to_string(), entry);
    Ok(())
  }

  async fn forget(&self, key: &str) -> Result<()> {
    self.entries.write().remove(key);
    Ok(())
  }
}
