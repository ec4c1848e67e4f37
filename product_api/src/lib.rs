// product_api/src/lib.rs

//! REST CRUD service for products, with a read-through cache in front of the
//! product listing.

pub mod cache;
pub mod config;
pub mod errors;
pub mod models;
pub mod services;
pub mod state;
pub mod store;
pub mod web;

pub use errors::{AppError, Result};
pub use state::AppState;
