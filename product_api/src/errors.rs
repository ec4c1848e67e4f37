// product_api/src/errors.rs

use std::collections::BTreeMap;
use std::fmt;

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

/// Field name -> list of human readable messages, rendered verbatim in 422 bodies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
  pub fn new() -> Self {
    Self::default()
  }

  /// Shorthand for a map holding a single message.
  pub fn single(field: &str, message: impl Into<String>) -> Self {
    let mut errors = Self::new();
    errors.add(field, message);
    errors
  }

  pub fn add(&mut self, field: &str, message: impl Into<String>) {
    self.0.entry(field.to_string()).or_default().push(message.into());
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  pub fn has(&self, field: &str) -> bool {
    self.0.contains_key(field)
  }

  pub fn get(&self, field: &str) -> Option<&[String]> {
    self.0.get(field).map(Vec::as_slice)
  }
}

impl fmt::Display for FieldErrors {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let mut first = true;
    for (field, messages) in &self.0 {
      for message in messages {
        if !first {
          f.write_str("; ")?;
        }
        write!(f, "{}: {}", field, message)?;
        first = false;
      }
    }
    Ok(())
  }
}

/// Store-level constraint failures that got past pre-validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConstraintViolation {
  #[error("referenced category does not exist")]
  MissingCategory,

  #[error("product name already exists")]
  DuplicateName,
}

#[derive(Debug, Error)]
pub enum AppError {
  #[error("Validation Error: {0}")]
  Validation(FieldErrors),

  #[error("Resource Not Found: {0}")]
  NotFound(String),

  #[error("Constraint Violation: {0}")]
  Constraint(ConstraintViolation),

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Database Error: {0}")]
  Sqlx(sqlx::Error),

  #[error("Internal Server Error: {0}")]
  Internal(String),
}

impl AppError {
  pub fn product_not_found() -> Self {
    AppError::NotFound("Product not found".to_string())
  }
}

impl From<sqlx::Error> for AppError {
  fn from(err: sqlx::Error) -> Self {
    if let sqlx::Error::Database(db_err) = &err {
      if db_err.is_foreign_key_violation() {
        return AppError::Constraint(ConstraintViolation::MissingCategory);
      }
      if db_err.is_unique_violation() {
        return AppError::Constraint(ConstraintViolation::DuplicateName);
      }
    }
    AppError::Sqlx(err)
  }
}

// Lets `?` work on functions returning `anyhow::Result`, keeping the concrete
// error when one is wrapped.
impl From<anyhow::Error> for AppError {
  fn from(err: anyhow::Error) -> Self {
    let err = match err.downcast::<AppError>() {
      Ok(app_err) => return app_err,
      Err(err) => err,
    };
    match err.downcast::<sqlx::Error>() {
      Ok(sqlx_err) => AppError::from(sqlx_err),
      Err(err) => AppError::Internal(format!("{:#}", err)),
    }
  }
}

impl ResponseError for AppError {
  fn status_code(&self) -> StatusCode {
    match self {
      AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
      AppError::NotFound(_) => StatusCode::NOT_FOUND,
      AppError::Constraint(ConstraintViolation::MissingCategory) => StatusCode::NOT_FOUND,
      AppError::Constraint(ConstraintViolation::DuplicateName) => StatusCode::UNPROCESSABLE_ENTITY,
      AppError::Config(_) | AppError::Sqlx(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  fn error_response(&self) -> HttpResponse {
    let status = self.status_code();
    if status.is_server_error() {
      tracing::error!(application_error = %self, "Responding with error");
    } else {
      tracing::warn!(application_error = %self, status = status.as_u16(), "Responding with error");
    }

    let body = match self {
      AppError::Validation(errors) => validation_body(errors),
      AppError::NotFound(m) => json!({ "message": m }),
      AppError::Constraint(ConstraintViolation::MissingCategory) => json!({ "message": "Category not found" }),
      AppError::Constraint(ConstraintViolation::DuplicateName) => {
        validation_body(&FieldErrors::single("name", "The name has already been taken."))
      }
      AppError::Config(_) => json!({ "message": "Configuration issue" }),
      AppError::Sqlx(_) => json!({ "message": "Database operation failed" }),
      AppError::Internal(_) => json!({ "message": "An internal error occurred" }),
    };
    HttpResponse::build(status).json(body)
  }
}

fn validation_body(errors: &FieldErrors) -> serde_json::Value {
  json!({
    "message": "The given data was invalid.",
    "errors": errors,
  })
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;
