// tests/common/mod.rs
#![allow(dead_code)] // Not every test binary uses every helper

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use serde_json::{json, Value};
use tracing::Level;

use product_api::cache::InMemoryCache;
use product_api::config::AppConfig;
use product_api::models::{Category, Product, ProductFields, ProductPayload};
use product_api::store::{InMemoryProductStore, ProductStore};
use product_api::{AppState, Result};

// --- Helper for Tracing Setup ---
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer() // Important for tests to capture output
    .try_init()
    .ok(); // Allow multiple initializations in tests (ok if fails)
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

/// In-memory store that counts how often the product list is loaded, so tests
/// can tell cache hits from misses.
#[derive(Debug, Default)]
pub struct CountingStore {
  inner: InMemoryProductStore,
  find_all_calls: AtomicUsize,
}

impl CountingStore {
  pub fn find_all_calls(&self) -> usize {
    self.find_all_calls.load(Ordering::SeqCst)
  }

  pub fn insert_category(&self, name: &str) -> Category {
    self.inner.insert_category(name)
  }
}

#[async_trait]
impl ProductStore for CountingStore {
  async fn find_all(&self) -> Result<Vec<Product>> {
    self.find_all_calls.fetch_add(1, Ordering::SeqCst);
    self.inner.find_all().await
  }

  async fn find_by_id(&self, id: i64) -> Result<Option<Product>> {
    self.inner.find_by_id(id).await
  }

  async fn create(&self, fields: ProductFields) -> Result<Product> {
    self.inner.create(fields).await
  }

  async fn update(&self, id: i64, fields: ProductFields) -> Result<Option<Product>> {
    self.inner.update(id, fields).await
  }

  async fn delete(&self, id: i64) -> Result<bool> {
    self.inner.delete(id).await
  }

  async fn name_taken(&self, name: &str, except_id: Option<i64>) -> Result<bool> {
    self.inner.name_taken(name, except_id).await
  }

  async fn category_exists(&self, id: i64) -> Result<bool> {
    self.inner.category_exists(id).await
  }

  async fn seed_categories(&self, names: &[&str]) -> Result<Vec<Category>> {
    self.inner.seed_categories(names).await
  }
}

/// In-memory store whose lookups always report "free name, known category", so
/// the constraint checks inside the store itself are the ones that fire, as when
/// a concurrent writer slips in between validation and the write.
#[derive(Debug, Default)]
pub struct RacingStore {
  inner: InMemoryProductStore,
}

#[async_trait]
impl ProductStore for RacingStore {
  async fn find_all(&self) -> Result<Vec<Product>> {
    self.inner.find_all().await
  }

  async fn find_by_id(&self, id: i64) -> Result<Option<Product>> {
    self.inner.find_by_id(id).await
  }

  async fn create(&self, fields: ProductFields) -> Result<Product> {
    self.inner.create(fields).await
  }

  async fn update(&self, id: i64, fields: ProductFields) -> Result<Option<Product>> {
    self.inner.update(id, fields).await
  }

  async fn delete(&self, id: i64) -> Result<bool> {
    self.inner.delete(id).await
  }

  async fn name_taken(&self, _name: &str, _except_id: Option<i64>) -> Result<bool> {
    Ok(false)
  }

  async fn category_exists(&self, _id: i64) -> Result<bool> {
    Ok(true)
  }

  async fn seed_categories(&self, names: &[&str]) -> Result<Vec<Category>> {
    self.inner.seed_categories(names).await
  }
}

pub struct TestHarness {
  pub state: AppState,
  pub store: Arc<CountingStore>,
  pub cache: Arc<InMemoryCache>,
}

pub fn harness() -> TestHarness {
  setup_tracing();
  let config = Arc::new(AppConfig {
    products_cache_ttl: Duration::from_secs(60),
    ..AppConfig::default()
  });
  let store = Arc::new(CountingStore::default());
  let cache = Arc::new(InMemoryCache::new());
  let state = AppState::new(config, store.clone(), cache.clone());
  TestHarness { state, store, cache }
}

pub fn racing_state() -> AppState {
  setup_tracing();
  let config = Arc::new(AppConfig::default());
  AppState::new(config, Arc::new(RacingStore::default()), Arc::new(InMemoryCache::new()))
}

pub fn payload(body: Value) -> ProductPayload {
  serde_json::from_value(body).expect("test payload should deserialize")
}

pub fn widget(name: &str, price: f64) -> ProductPayload {
  payload(json!({ "name": name, "price": price }))
}
