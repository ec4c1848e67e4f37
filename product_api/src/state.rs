// product_api/src/state.rs
use crate::cache::Cache;
use crate::config::AppConfig;
use crate::services::ProductService;
use crate::store::ProductStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
  pub products: ProductService,
  pub config: Arc<AppConfig>, // Share loaded config
}

impl AppState {
  pub fn new(config: Arc<AppConfig>, store: Arc<dyn ProductStore>, cache: Arc<dyn Cache>) -> Self {
    let products = ProductService::new(store, cache, config.products_cache_ttl);
    Self { products, config }
  }
}
