// product_api/src/services/product_service.rs

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::{info, instrument, warn};

use crate::cache::{self, Cache};
use crate::errors::{AppError, FieldErrors, Result};
use crate::models::{Product, ProductFields, ProductPayload};
use crate::store::ProductStore;

/// Cache key holding the snapshot served by [`ProductService::list`].
pub const PRODUCTS_CACHE_KEY: &str = "products";

pub const DESCRIPTION_MAX_CHARS: usize = 500;

/// The five product operations. Holds no state of its own beyond handles to
/// the store and cache, so one instance is shared by every request.
#[derive(Clone)]
pub struct ProductService {
  store: Arc<dyn ProductStore>,
  cache: Arc<dyn Cache>,
  list_ttl: Duration,
}

impl ProductService {
  pub fn new(store: Arc<dyn ProductStore>, cache: Arc<dyn Cache>, list_ttl: Duration) -> Self {
    Self { store, cache, list_ttl }
  }

  #[instrument(name = "service::list_products", skip(self), err)]
  pub async fn list(&self) -> Result<Vec<Product>> {
    let store = self.store.clone();
    let products: Vec<Product> = cache::remember(self.cache.as_ref(), PRODUCTS_CACHE_KEY, self.list_ttl, || async move {
      info!("Loading product list from the store.");
      store.find_all().await
    })
    .await?;
    Ok(products)
  }

  #[instrument(name = "service::get_product", skip(self), err)]
  pub async fn get(&self, id: i64) -> Result<Product> {
    self.store.find_by_id(id).await?.ok_or_else(AppError::product_not_found)
  }

  #[instrument(name = "service::create_product", skip(self, payload), err)]
  pub async fn create(&self, payload: ProductPayload) -> Result<Product> {
    let fields = self.validate(&payload, None).await?;
    let product = self.store.create(fields).await?;
    info!(product_id = product.id, "Product created.");
    self.invalidate_list().await?;
    Ok(product)
  }

  #[instrument(name = "service::update_product", skip(self, payload), err)]
  pub async fn update(&self, id: i64, payload: ProductPayload) -> Result<Product> {
    let existing = self.get(id).await?;
    let fields = self.validate(&payload, Some(&existing)).await?;
    let product = self
      .store
      .update(id, fields)
      .await?
      .ok_or_else(AppError::product_not_found)?;
    info!(product_id = product.id, "Product updated.");
    self.invalidate_list().await?;
    Ok(product)
  }

  #[instrument(name = "service::delete_product", skip(self), err)]
  pub async fn delete(&self, id: i64) -> Result<()> {
    let existing = self.get(id).await?;
    if !self.store.delete(existing.id).await? {
      return Err(AppError::product_not_found());
    }
    info!(product_id = id, "Product deleted.");
    self.invalidate_list().await
  }

  async fn invalidate_list(&self) -> Result<()> {
    self.cache.forget(PRODUCTS_CACHE_KEY).await
  }

  /// Checks `payload` against the product rules and resolves the columns to write.
  ///
  /// `existing` is the product being updated: its id is excluded from the name
  /// uniqueness check and its values fill in omitted optional fields.
  async fn validate(&self, payload: &ProductPayload, existing: Option<&Product>) -> Result<ProductFields> {
    let mut errors = FieldErrors::new();

    let mut name = None;
    match payload.name.as_ref().and_then(blank_to_null) {
      None => errors.add("name", "The name field is required."),
      Some(Value::String(value)) => {
        let value = value.trim();
        if self.store.name_taken(value, existing.map(|p| p.id)).await? {
          errors.add("name", "The name has already been taken.");
        }
        name = Some(value.to_string());
      }
      Some(_) => errors.add("name", "The name field must be a string."),
    }

    // Blank descriptions are stored as null.
    let description = match payload.description.as_ref() {
      None => existing.and_then(|p| p.description.clone()),
      Some(value) => match blank_to_null(value) {
        None => None,
        Some(Value::String(value)) => Some(value.trim().to_string()),
        Some(_) => {
          errors.add("description", "The description field must be a string.");
          None
        }
      },
    };
    if let Some(description) = &description {
      if description.chars().count() > DESCRIPTION_MAX_CHARS {
        errors.add(
          "description",
          format!(
            "The description field must not be greater than {} characters.",
            DESCRIPTION_MAX_CHARS
          ),
        );
      }
    }

    let mut price = None;
    match payload.price.as_ref().and_then(blank_to_null) {
      None => errors.add("price", "The price field is required."),
      Some(value) => match numeric(value) {
        None => errors.add("price", "The price field must be a number."),
        Some(value) if value < 0.0 => errors.add("price", "The price field must be at least 0."),
        Some(value) => price = Some(value),
      },
    }

    let category_id = match payload.category_id.as_ref() {
      None => existing.and_then(|p| p.category_id),
      Some(value) => match blank_to_null(value) {
        None => None,
        Some(value) => match integer(value) {
          Some(id) if self.store.category_exists(id).await? => Some(id),
          _ => {
            errors.add("category_id", "The selected category id is invalid.");
            None
          }
        },
      },
    };

    if !errors.is_empty() {
      warn!(errors = %errors, "Product input failed validation.");
      return Err(AppError::Validation(errors));
    }

    Ok(ProductFields {
      name: name.unwrap_or_default(),
      description,
      price: price.unwrap_or_default(),
      category_id,
    })
  }
}

/// `null` and whitespace-only strings count as missing.
fn blank_to_null(value: &Value) -> Option<&Value> {
  match value {
    Value::Null => None,
    Value::String(s) if s.trim().is_empty() => None,
    other => Some(other),
  }
}

/// JSON numbers and numeric strings, finite only.
fn numeric(value: &Value) -> Option<f64> {
  let number = match value {
    Value::Number(n) => n.as_f64(),
    Value::String(s) => s.trim().parse::<f64>().ok(),
    _ => None,
  }?;
  number.is_finite().then_some(number)
}

/// Integral JSON numbers and integer strings.
fn integer(value: &Value) -> Option<i64> {
  match value {
    Value::Number(n) => n.as_i64(),
    Value::String(s) => s.trim().parse::<i64>().ok(),
    _ => None,
  }
}
