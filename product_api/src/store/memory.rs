// product_api/src/store/memory.rs

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;

use super::ProductStore;
use crate::errors::{AppError, ConstraintViolation, Result};
use crate::models::{Category, Product, ProductFields};

#[derive(Debug, Clone)]
struct ProductRecord {
  id: i64,
  fields: ProductFields,
  created_at: chrono::DateTime<Utc>,
  updated_at: chrono::DateTime<Utc>,
}

#[derive(Debug, Default)]
struct Tables {
  categories: BTreeMap<i64, Category>,
  products: BTreeMap<i64, ProductRecord>,
  last_category_id: i64,
  last_product_id: i64,
}

impl Tables {
  fn load(&self, record: &ProductRecord) -> Product {
    Product {
      id: record.id,
      name: record.fields.name.clone(),
      description: record.fields.description.clone(),
      price: record.fields.price,
      category_id: record.fields.category_id,
      category: record.fields.category_id.and_then(|id| self.categories.get(&id).cloned()),
      created_at: record.created_at,
      updated_at: record.updated_at,
    }
  }

  fn check_constraints(&self, fields: &ProductFields, except_id: Option<i64>) -> Result<()> {
    if let Some(category_id) = fields.category_id {
      if !self.categories.contains_key(&category_id) {
        return Err(AppError::Constraint(ConstraintViolation::MissingCategory));
      }
    }
    if self.name_taken(&fields.name, except_id) {
      return Err(AppError::Constraint(ConstraintViolation::DuplicateName));
    }
    Ok(())
  }

  fn insert_category(&mut self, name: &str) -> Category {
    self.last_category_id += 1;
    let now = Utc::now();
    let category = Category {
      id: self.last_category_id,
      name: name.to_string(),
      created_at: now,
      updated_at: now,
    };
    self.categories.insert(category.id, category.clone());
    category
  }

  fn name_taken(&self, name: &str, except_id: Option<i64>) -> bool {
    self
      .products
      .values()
      .any(|record| record.fields.name == name && Some(record.id) != except_id)
  }
}

/// Store kept in process memory. Ids are assigned sequentially starting at 1 and
/// never reused, like a database sequence.
#[derive(Debug, Default)]
pub struct InMemoryProductStore {
  tables: RwLock<Tables>,
}

impl InMemoryProductStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn insert_category(&self, name: &str) -> Category {
    self.tables.write().insert_category(name)
  }
}

#[async_trait]
impl ProductStore for InMemoryProductStore {
  async fn find_all(&self) -> Result<Vec<Product>> {
    let tables = self.tables.read();
    Ok(tables.products.values().map(|record| tables.load(record)).collect())
  }

  async fn find_by_id(&self, id: i64) -> Result<Option<Product>> {
    let tables = self.tables.read();
    Ok(tables.products.get(&id).map(|record| tables.load(record)))
  }

  async fn create(&self, fields: ProductFields) -> Result<Product> {
    let mut tables = self.tables.write();
    tables.check_constraints(&fields, None)?;

    tables.last_product_id += 1;
    let now = Utc::now();
    let record = ProductRecord {
      id: tables.last_product_id,
      fields,
      created_at: now,
      updated_at: now,
    };
    let product = tables.load(&record);
    tables.products.insert(record.id, record);
    Ok(product)
  }

  async fn update(&self, id: i64, fields: ProductFields) -> Result<Option<Product>> {
    let mut tables = self.tables.write();
    if !tables.products.contains_key(&id) {
      return Ok(None);
    }
    tables.check_constraints(&fields, Some(id))?;

    let Some(record) = tables.products.get_mut(&id) else {
      return Ok(None);
    };
    record.fields = fields;
    record.updated_at = Utc::now();
    let record = record.clone();
    Ok(Some(tables.load(&record)))
  }

  async fn delete(&self, id: i64) -> Result<bool> {
    Ok(self.tables.write().products.remove(&id).is_some())
  }

  async fn name_taken(&self, name: &str, except_id: Option<i64>) -> Result<bool> {
    Ok(self.tables.read().name_taken(name, except_id))
  }

  async fn category_exists(&self, id: i64) -> Result<bool> {
    Ok(self.tables.read().categories.contains_key(&id))
  }

  async fn seed_categories(&self, names: &[&str]) -> Result<Vec<Category>> {
    // One guard for check and insert so concurrent seeders cannot both add a name.
    let mut tables = self.tables.write();
    let mut seeded = Vec::new();
    for name in names {
      if !tables.categories.values().any(|c| c.name == *name) {
        seeded.push(tables.insert_category(name));
      }
    }
    Ok(seeded)
  }
}
