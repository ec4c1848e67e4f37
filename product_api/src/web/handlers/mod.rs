// product_api/src/web/handlers/mod.rs

pub mod product_handlers;
