// product_api/src/web/routes.rs

use actix_web::{web, HttpResponse};

use crate::errors::{AppError, FieldErrors};
use crate::web::handlers::product_handlers;

async fn health_check_handler() -> HttpResponse {
  HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

/// Malformed or mistyped bodies are reported in the same 422 shape as field
/// validation failures, under the `body` key.
fn json_config() -> web::JsonConfig {
  web::JsonConfig::default().error_handler(|err, _req| {
    AppError::Validation(FieldErrors::single("body", err.to_string())).into()
  })
}

/// An id that is not an integer cannot name a product.
fn path_config() -> web::PathConfig {
  web::PathConfig::default().error_handler(|_err, _req| AppError::product_not_found().into())
}

fn product_scope(path: &str) -> actix_web::Scope {
  web::scope(path)
    .service(
      web::resource("")
        .route(web::get().to(product_handlers::list_products_handler))
        .route(web::post().to(product_handlers::create_product_handler)),
    )
    .service(
      web::resource("/{product_id}")
        .route(web::get().to(product_handlers::get_product_handler))
        .route(web::put().to(product_handlers::update_product_handler))
        .route(web::patch().to(product_handlers::update_product_handler))
        .route(web::delete().to(product_handlers::delete_product_handler)),
    )
}

// Called from `main.rs` (and the tests) to configure services for the Actix App.
pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  cfg
    .app_data(json_config())
    .app_data(path_config())
    .route("/health", web::get().to(health_check_handler))
    .service(product_scope("/products"))
    .service(web::scope("/api").service(product_scope("/products")));
}
