// product_api/src/models/mod.rs

//! Contains data structures representing database entities and request payloads.

pub mod category;
pub mod product;

pub use category::Category;
pub use product::{Product, ProductFields, ProductPayload};
