// tests/cache_tests.rs
mod common;
use common::setup_tracing;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use product_api::cache::{remember, Cache, InMemoryCache};
use product_api::{AppError, Result};
use serde_json::json;

const TTL: Duration = Duration::from_secs(60);

#[tokio::test]
async fn test_remember_populates_once() {
  setup_tracing();
  let cache = InMemoryCache::new();
  let calls = AtomicUsize::new(0);

  for _ in 0..3 {
    let value: Vec<String> = remember(&cache, "names", TTL, || async {
      calls.fetch_add(1, Ordering::SeqCst);
      Ok(vec!["a".to_string(), "b".to_string()])
    })
    .await
    .unwrap();
    assert_eq!(value, ["a", "b"]);
  }
  assert_eq!(calls.load(Ordering::SeqCst), 1);
  assert_eq!(cache.len(), 1);
}

#[tokio::test]
async fn test_remember_does_not_cache_producer_errors() {
  setup_tracing();
  let cache = InMemoryCache::new();

  let result: Result<Vec<i32>> = remember(&cache, "numbers", TTL, || async {
    Err(AppError::Internal("store unavailable".to_string()))
  })
  .await;
  assert!(matches!(result, Err(AppError::Internal(_))));
  assert!(cache.get("numbers").await.unwrap().is_none());
}

#[tokio::test]
async fn test_remember_replaces_undecodable_entries() {
  setup_tracing();
  let cache = InMemoryCache::new();
  cache.put("numbers", json!("not a list"), TTL).await.unwrap();

  let value: Vec<i32> = remember(&cache, "numbers", TTL, || async { Ok(vec![1, 2, 3]) })
    .await
    .unwrap();
  assert_eq!(value, vec![1, 2, 3]);
  assert_eq!(cache.get("numbers").await.unwrap(), Some(json!([1, 2, 3])));
}

#[tokio::test(start_paused = true)]
async fn test_entries_expire_after_ttl() {
  setup_tracing();
  let cache = InMemoryCache::new();
  cache.put("products", json!([]), TTL).await.unwrap();

  tokio::time::advance(Duration::from_secs(59)).await;
  assert_eq!(cache.get("products").await.unwrap(), Some(json!([])));

  tokio::time::advance(Duration::from_secs(1)).await;
  assert_eq!(cache.get("products").await.unwrap(), None);
  assert!(cache.is_empty());
}

#[tokio::test]
async fn test_forget_is_idempotent() {
  setup_tracing();
  let cache = InMemoryCache::new();
  cache.forget("products").await.unwrap();

  cache.put("products", json!([1]), TTL).await.unwrap();
  cache.forget("products").await.unwrap();
  cache.forget("products").await.unwrap();
  assert_eq!(cache.get("products").await.unwrap(), None);
}
