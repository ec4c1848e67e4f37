// product_api/src/store/postgres.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tracing::error;

use super::ProductStore;
use crate::errors::{AppError, Result};
use crate::models::{Category, Product, ProductFields};

// Every product query selects from a relation named `p` (the table or a CTE)
// and left joins the category with `cat_` prefixed columns.
const PRODUCT_COLUMNS: &str = "p.id, p.name, p.description, p.price, p.category_id, p.created_at, p.updated_at, \
   c.id AS cat_id, c.name AS cat_name, c.created_at AS cat_created_at, c.updated_at AS cat_updated_at";

#[derive(Debug, FromRow)]
struct ProductRow {
  id: i64,
  name: String,
  description: Option<String>,
  price: f64,
  category_id: Option<i64>,
  created_at: DateTime<Utc>,
  updated_at: DateTime<Utc>,
  cat_id: Option<i64>,
  cat_name: Option<String>,
  cat_created_at: Option<DateTime<Utc>>,
  cat_updated_at: Option<DateTime<Utc>>,
}

impl From<ProductRow> for Product {
  fn from(row: ProductRow) -> Self {
    let category = match (row.cat_id, row.cat_name, row.cat_created_at, row.cat_updated_at) {
      (Some(id), Some(name), Some(created_at), Some(updated_at)) => Some(Category {
        id,
        name,
        created_at,
        updated_at,
      }),
      _ => None,
    };
    Product {
      id: row.id,
      name: row.name,
      description: row.description,
      price: row.price,
      category_id: row.category_id,
      category,
      created_at: row.created_at,
      updated_at: row.updated_at,
    }
  }
}

#[derive(Clone)]
pub struct PgProductStore {
  pool: PgPool,
}

impl PgProductStore {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }
}

fn log_db_error(operation: &'static str) -> impl Fn(sqlx::Error) -> AppError {
  move |e| {
    error!("Database error during {}: {}", operation, e);
    AppError::from(e)
  }
}

#[async_trait]
impl ProductStore for PgProductStore {
  async fn find_all(&self) -> Result<Vec<Product>> {
    let sql = format!(
      "SELECT {PRODUCT_COLUMNS} FROM products p LEFT JOIN categories c ON c.id = p.category_id ORDER BY p.id ASC"
    );
    let rows: Vec<ProductRow> = sqlx::query_as(&sql)
      .fetch_all(&self.pool)
      .await
      .map_err(log_db_error("find_all"))?;
    Ok(rows.into_iter().map(Product::from).collect())
  }

  async fn find_by_id(&self, id: i64) -> Result<Option<Product>> {
    let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products p LEFT JOIN categories c ON c.id = p.category_id WHERE p.id = $1");
    let row: Option<ProductRow> = sqlx::query_as(&sql)
      .bind(id)
      .fetch_optional(&self.pool)
      .await
      .map_err(log_db_error("find_by_id"))?;
    Ok(row.map(Product::from))
  }

  async fn create(&self, fields: ProductFields) -> Result<Product> {
    let sql = format!(
      "WITH p AS ( \
         INSERT INTO products (name, description, price, category_id) VALUES ($1, $2, $3, $4) RETURNING * \
       ) \
       SELECT {PRODUCT_COLUMNS} FROM p LEFT JOIN categories c ON c.id = p.category_id"
    );
    let row: ProductRow = sqlx::query_as(&sql)
      .bind(&fields.name)
      .bind(&fields.description)
      .bind(fields.price)
      .bind(fields.category_id)
      .fetch_one(&self.pool)
      .await
      .map_err(log_db_error("create"))?;
    Ok(row.into())
  }

  async fn update(&self, id: i64, fields: ProductFields) -> Result<Option<Product>> {
    let sql = format!(
      "WITH p AS ( \
         UPDATE products SET name = $2, description = $3, price = $4, category_id = $5, updated_at = NOW() \
         WHERE id = $1 RETURNING * \
       ) \
       SELECT {PRODUCT_COLUMNS} FROM p LEFT JOIN categories c ON c.id = p.category_id"
    );
    let row: Option<ProductRow> = sqlx::query_as(&sql)
      .bind(id)
      .bind(&fields.name)
      .bind(&fields.description)
      .bind(fields.price)
      .bind(fields.category_id)
      .fetch_optional(&self.pool)
      .await
      .map_err(log_db_error("update"))?;
    Ok(row.map(Product::from))
  }

  async fn delete(&self, id: i64) -> Result<bool> {
    let result = sqlx::query("DELETE FROM products WHERE id = $1")
      .bind(id)
      .execute(&self.pool)
      .await
      .map_err(log_db_error("delete"))?;
    Ok(result.rows_affected() > 0)
  }

  async fn name_taken(&self, name: &str, except_id: Option<i64>) -> Result<bool> {
    let taken: bool = sqlx::query_scalar(
      "SELECT EXISTS (SELECT 1 FROM products WHERE name = $1 AND ($2::BIGINT IS NULL OR id <> $2))",
    )
    .bind(name)
    .bind(except_id)
    .fetch_one(&self.pool)
    .await
    .map_err(log_db_error("name_taken"))?;
    Ok(taken)
  }

  async fn category_exists(&self, id: i64) -> Result<bool> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM categories WHERE id = $1)")
      .bind(id)
      .fetch_one(&self.pool)
      .await
      .map_err(log_db_error("category_exists"))?;
    Ok(exists)
  }

  async fn seed_categories(&self, names: &[&str]) -> Result<Vec<Category>> {
    let mut seeded = Vec::new();
    for name in names {
      let inserted: Option<Category> = sqlx::query_as(
        "INSERT INTO categories (name) \
         SELECT $1::TEXT WHERE NOT EXISTS (SELECT 1 FROM categories WHERE name = $1::TEXT) \
         RETURNING id, name, created_at, updated_at",
      )
      .bind(*name)
      .fetch_optional(&self.pool)
      .await
      .map_err(log_db_error("seed_categories"))?;
      seeded.extend(inserted);
    }
    Ok(seeded)
  }
}
