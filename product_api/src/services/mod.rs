// product_api/src/services/mod.rs

pub mod product_service;

pub use product_service::{ProductService, PRODUCTS_CACHE_KEY};
