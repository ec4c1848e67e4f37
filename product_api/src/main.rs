// product_api/src/main.rs

use std::sync::Arc;

use actix_web::{web, App, HttpServer};
use anyhow::Context;
use tracing_subscriber::fmt::format::FmtSpan; // For span events in tracing
use tracing_subscriber::EnvFilter;

use product_api::cache::InMemoryCache;
use product_api::config::{AppConfig, LogFormat};
use product_api::state::AppState;
use product_api::store;
use product_api::web::configure_app_routes;

fn init_tracing(format: LogFormat) {
  // RUST_LOG overrides the default level
  let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
  let builder = tracing_subscriber::fmt()
    .with_env_filter(env_filter)
    .with_span_events(FmtSpan::CLOSE); // Log when spans close, showing duration

  match format {
    LogFormat::Pretty => builder.init(),
    LogFormat::Json => builder.json().init(),
  }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
  let app_config = Arc::new(AppConfig::from_env().context("Failed to load application configuration")?);
  init_tracing(app_config.log_format);

  tracing::info!("Starting product API server...");
  tracing::debug!(
    server = %app_config.server_address(),
    database = app_config.database_url.is_some(),
    cache_ttl_secs = app_config.products_cache_ttl.as_secs(),
    "Application configuration loaded."
  );

  let product_store = store::connect(&app_config)
    .await
    .context("Failed to initialize the product store")?;
  let cache = Arc::new(InMemoryCache::new());
  let app_state = AppState::new(app_config.clone(), product_store, cache);

  let server_address = app_config.server_address();
  tracing::info!("Attempting to bind server to {}...", server_address);

  HttpServer::new(move || {
    App::new()
      .app_data(web::Data::new(app_state.clone())) // Share AppState with handlers
      .wrap(tracing_actix_web::TracingLogger::default()) // Actix middleware for tracing requests
      .configure(configure_app_routes)
  })
  .bind(&server_address)
  .with_context(|| format!("Failed to bind {}", server_address))?
  .run()
  .await
  .context("HTTP server terminated with an error")
}
