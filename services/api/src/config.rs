//! Service configuration
//!
//! Built-in defaults, overridden by `APP_*` environment variables, e.g.
//! `APP_PORT=9090` or `APP_DEFAULT_LOCALE=es`.

use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use common::database::DatabaseConfig;
use config::{Config, ConfigError, Environment};
use serde::Deserialize;

use crate::i18n::Locale;

/// Runtime configuration of the API service
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub port: u16,
    /// `tracing` filter directive, e.g. `info` or `api=debug,sqlx=warn`
    pub log_level: String,
    pub database_url: String,
    pub database_max_connections: u32,
    /// Locale used when `Accept-Language` names nothing supported
    pub default_locale: Locale,
    /// Page size of listings that do not specify paging
    pub default_limit: u32,
    /// Per-request query deadline in seconds; zero disables it
    pub request_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            log_level: "info".to_string(),
            database_url: "sqlite://roster.db?mode=rwc".to_string(),
            database_max_connections: 5,
            default_locale: Locale::En,
            default_limit: 50,
            request_timeout_secs: 30,
        }
    }
}

impl AppConfig {
    /// Load configuration from the environment
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let config = Config::builder()
            .set_default("port", i64::from(defaults.port))?
            .set_default("log_level", defaults.log_level)?
            .set_default("database_url", defaults.database_url)?
            .set_default("database_max_connections", i64::from(defaults.database_max_connections))?
            .set_default("default_locale", defaults.default_locale.as_str())?
            .set_default("default_limit", i64::from(defaults.default_limit))?
            .set_default("request_timeout_secs", defaults.request_timeout_secs as i64)?
            .add_source(Environment::with_prefix("APP").try_parsing(true))
            .build()?;

        let loaded: Self = config.try_deserialize()?;
        if loaded.default_limit == 0 {
            return Err(ConfigError::Message(
                "default_limit must be greater than zero".to_string(),
            ));
        }
        Ok(loaded)
    }

    pub fn database(&self) -> DatabaseConfig {
        DatabaseConfig {
            max_connections: self.database_max_connections,
            ..DatabaseConfig::new(self.database_url.clone())
        }
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_secs > 0).then(|| Duration::from_secs(self.request_timeout_secs))
    }

    pub fn bind_address(&self) -> SocketAddr {
        SocketAddr::from((Ipv4Addr::UNSPECIFIED, self.port))
    }
}
