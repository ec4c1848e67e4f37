// product_api/src/models/product.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::Category;

/// A product as returned to clients, with its category already loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
  pub id: i64,
  pub name: String,
  pub description: Option<String>, // Description can be optional
  pub price: f64,
  pub category_id: Option<i64>,
  pub category: Option<Category>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// Column values written by create and update, after validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductFields {
  pub name: String,
  pub description: Option<String>,
  pub price: f64,
  pub category_id: Option<i64>,
}

/// Request body for create and update.
///
/// Fields are kept as raw JSON so type mismatches surface as field-level
/// validation errors. `None` means the key was absent; an explicit `null` is
/// `Some(Value::Null)`, so an update only touches the optional fields it was sent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductPayload {
  #[serde(default, deserialize_with = "present")]
  pub name: Option<Value>,
  #[serde(default, deserialize_with = "present")]
  pub description: Option<Value>,
  #[serde(default, deserialize_with = "present")]
  pub price: Option<Value>,
  #[serde(default, deserialize_with = "present")]
  pub category_id: Option<Value>,
}

fn present<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
  T: Deserialize<'de>,
  D: Deserializer<'de>,
{
  T::deserialize(deserializer).map(Some)
}
