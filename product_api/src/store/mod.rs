// product_api/src/store/mod.rs

//! Persistence for products and categories.
//!
//! [`ProductStore`] is the contract the service relies on. Both implementations
//! enforce the name uniqueness and category foreign-key constraints themselves,
//! reporting violations as [`AppError::Constraint`](crate::errors::AppError::Constraint).

pub mod memory;
pub mod postgres;

pub use memory::InMemoryProductStore;
pub use postgres::PgProductStore;

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::errors::{AppError, Result};
use crate::models::{Category, Product, ProductFields};

#[async_trait]
pub trait ProductStore: Send + Sync {
  /// All products with their category, ordered by id.
  async fn find_all(&self) -> Result<Vec<Product>>;

  async fn find_by_id(&self, id: i64) -> Result<Option<Product>>;

  async fn create(&self, fields: ProductFields) -> Result<Product>;

  /// Returns `None` when no product has `id`.
  async fn update(&self, id: i64, fields: ProductFields) -> Result<Option<Product>>;

  /// Returns whether a row was removed.
  async fn delete(&self, id: i64) -> Result<bool>;

  /// Whether some product other than `except_id` already uses `name`.
  async fn name_taken(&self, name: &str, except_id: Option<i64>) -> Result<bool>;

  async fn category_exists(&self, id: i64) -> Result<bool>;

  /// Inserts categories whose name is not present yet and returns them.
  async fn seed_categories(&self, names: &[&str]) -> Result<Vec<Category>>;
}

pub const DEFAULT_CATEGORIES: &[&str] = &["Electronics", "Books", "Home & Kitchen"];

/// Builds the store selected by the configuration: Postgres when a database URL
/// is configured, the in-memory store otherwise.
pub async fn connect(config: &AppConfig) -> Result<Arc<dyn ProductStore>> {
  let store: Arc<dyn ProductStore> = match &config.database_url {
    Some(database_url) => {
      let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(database_url)
        .await?;
      info!("Successfully connected to the database.");

      if config.run_migrations {
        sqlx::migrate!("./migrations")
          .run(&pool)
          .await
          .map_err(|e| AppError::Internal(format!("Failed to run migrations: {}", e)))?;
        info!("Database migrations applied.");
      }
      Arc::new(PgProductStore::new(pool))
    }
    None => {
      warn!("DATABASE_URL not set; using the in-memory store. Data will not survive a restart.");
      Arc::new(InMemoryProductStore::new())
    }
  };

  if config.seed_db {
    let seeded = store.seed_categories(DEFAULT_CATEGORIES).await?;
    info!(count = seeded.len(), "Seeded categories.");
  }

  Ok(store)
}
