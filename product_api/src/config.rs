// product_api/src/config.rs

use crate::errors::{AppError, Result}; // Use AppError specific Result
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
  Pretty,
  Json,
}

impl FromStr for LogFormat {
  type Err = AppError;

  fn from_str(s: &str) -> Result<Self> {
    match s.to_ascii_lowercase().as_str() {
      "pretty" | "text" => Ok(LogFormat::Pretty),
      "json" => Ok(LogFormat::Json),
      other => Err(AppError::Config(format!("Invalid LOG_FORMAT: '{}'", other))),
    }
  }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,

  // None selects the in-memory store
  pub database_url: Option<String>,
  pub database_max_connections: u32,
  pub run_migrations: bool,
  pub seed_db: bool,

  pub products_cache_ttl: Duration,
  pub log_format: LogFormat,
}

impl Default for AppConfig {
  fn default() -> Self {
    Self {
      server_host: "127.0.0.1".to_string(),
      server_port: 8080,
      database_url: None,
      database_max_connections: 5,
      run_migrations: true,
      seed_db: false,
      products_cache_ttl: Duration::from_secs(60),
      log_format: LogFormat::Pretty,
    }
  }
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok(); // Load .env file if present
    Self::from_lookup(|name| env::var(name).ok())
  }

  /// Builds the configuration from an arbitrary variable source. Unset variables
  /// fall back to [`AppConfig::default`].
  pub fn from_lookup<F>(lookup: F) -> Result<Self>
  where
    F: Fn(&str) -> Option<String>,
  {
    let defaults = Self::default();
    let get_env = |var_name: &str| lookup(var_name).filter(|v| !v.trim().is_empty());

    let server_host = get_env("SERVER_HOST").unwrap_or(defaults.server_host);
    let server_port = parse_or(get_env("SERVER_PORT"), "SERVER_PORT", defaults.server_port)?;
    let database_url = get_env("DATABASE_URL");
    let database_max_connections = parse_or(
      get_env("DATABASE_MAX_CONNECTIONS"),
      "DATABASE_MAX_CONNECTIONS",
      defaults.database_max_connections,
    )?;
    let run_migrations = parse_or(get_env("RUN_MIGRATIONS"), "RUN_MIGRATIONS", defaults.run_migrations)?;
    let seed_db = parse_or(get_env("SEED_DB"), "SEED_DB", defaults.seed_db)?;
    let products_cache_ttl = parse_or(
      get_env("PRODUCTS_CACHE_TTL_SECS"),
      "PRODUCTS_CACHE_TTL_SECS",
      defaults.products_cache_ttl.as_secs(),
    )
    .map(Duration::from_secs)?;
    let log_format = match get_env("LOG_FORMAT") {
      Some(raw) => raw.parse()?,
      None => defaults.log_format,
    };

    Ok(Self {
      server_host,
      server_port,
      database_url,
      database_max_connections,
      run_migrations,
      seed_db,
      products_cache_ttl,
      log_format,
    })
  }

  pub fn server_address(&self) -> String {
    format!("{}:{}", self.server_host, self.server_port)
  }
}

fn parse_or<T>(raw: Option<String>, var_name: &str, default: T) -> Result<T>
where
  T: FromStr,
  T::Err: std::fmt::Display,
{
  match raw {
    Some(raw) => raw
      .trim()
      .parse::<T>()
      .map_err(|e| AppError::Config(format!("Invalid {}: {}", var_name, e))),
    None => Ok(default),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::HashMap;

  fn config_from(vars: &[(&str, &str)]) -> Result<AppConfig> {
    let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
    AppConfig::from_lookup(|name| vars.get(name).cloned())
  }

  #[test]
  fn defaults_apply_when_nothing_is_set() {
    let config = config_from(&[]).unwrap();
    assert_eq!(config.server_address(), "127.0.0.1:8080");
    assert_eq!(config.database_url, None);
    assert_eq!(config.products_cache_ttl, Duration::from_secs(60));
    assert!(config.run_migrations);
    assert!(!config.seed_db);
    assert_eq!(config.log_format, LogFormat::Pretty);
  }

  #[test]
  fn values_are_read_from_the_environment() {
    let config = config_from(&[
      ("SERVER_PORT", "9000"),
      ("DATABASE_URL", "postgres://localhost/products"),
      ("PRODUCTS_CACHE_TTL_SECS", "5"),
      ("SEED_DB", "true"),
      ("LOG_FORMAT", "JSON"),
    ])
    .unwrap();
    assert_eq!(config.server_port, 9000);
    assert_eq!(config.database_url.as_deref(), Some("postgres://localhost/products"));
    assert_eq!(config.products_cache_ttl, Duration::from_secs(5));
    assert!(config.seed_db);
    assert_eq!(config.log_format, LogFormat::Json);
  }

  #[test]
  fn invalid_values_are_config_errors() {
    let err = config_from(&[("SERVER_PORT", "not-a-port")]).unwrap_err();
    assert!(matches!(err, AppError::Config(ref m) if m.contains("SERVER_PORT")));

    let err = config_from(&[("LOG_FORMAT", "xml")]).unwrap_err();
    assert!(matches!(err, AppError::Config(_)));
  }
}
