use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;
use thiserror::Error;

use crate::auth::MAX_TOKEN_TTL_HOURS;

/// Startup configuration failures. These are fatal: the server refuses to start.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing configuration: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Memory,
    Postgres,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout_secs: u64,
    pub lookup_timeout_ms: u64,
    /// Email ensured to hold the admin role at startup
    pub bootstrap_admin: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// HMAC signing secret for bearer tokens
    #[serde(skip_serializing)]
    pub access_secret: String,
    pub token_ttl_hours: u64,
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
}

impl StoreConfig {
    pub fn lookup_timeout(&self) -> Duration {
        Duration::from_millis(self.lookup_timeout_ms)
    }
}

impl SecurityConfig {
    /// Lifetime for issued tokens. `validate` keeps the hours within range.
    pub fn token_ttl(&self) -> chrono::Duration {
        let hours = i64::try_from(self.token_ttl_hours).unwrap_or(MAX_TOKEN_TTL_HOURS);
        chrono::Duration::hours(hours.clamp(1, MAX_TOKEN_TTL_HOURS))
    }
}

impl AppConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = match lookup("APP_ENV").as_deref() {
            Some("production") | Some("prod") => Environment::Production,
            Some("staging") | Some("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        let config = match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_overrides(&lookup)?;

        config.validate()?;
        Ok(config)
    }

    fn with_overrides<F>(mut self, lookup: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Server overrides
        if let Some(v) = lookup("BISTRO_PORT").or_else(|| lookup("PORT")) {
            self.server.port = parse_var("PORT", &v)?;
        }
        if let Some(v) = lookup("BIND_HOST") {
            self.server.host = v;
        }

        // Store overrides
        if let Some(v) = lookup("STORE_BACKEND") {
            self.store.backend = match v.to_ascii_lowercase().as_str() {
                "memory" => StoreBackend::Memory,
                "postgres" | "postgresql" => StoreBackend::Postgres,
                _ => return Err(ConfigError::Invalid { name: "STORE_BACKEND", value: v }),
            };
        }
        if let Some(v) = lookup("DATABASE_URL") {
            self.store.database_url = Some(v);
        }
        if let Some(v) = lookup("DATABASE_MAX_CONNECTIONS") {
            self.store.max_connections = parse_var("DATABASE_MAX_CONNECTIONS", &v)?;
        }
        if let Some(v) = lookup("DATABASE_CONNECTION_TIMEOUT") {
            self.store.connection_timeout_secs = parse_var("DATABASE_CONNECTION_TIMEOUT", &v)?;
        }
        if let Some(v) = lookup("STORE_LOOKUP_TIMEOUT_MS") {
            self.store.lookup_timeout_ms = parse_var("STORE_LOOKUP_TIMEOUT_MS", &v)?;
        }
        if let Some(v) = lookup("BISTRO_BOOTSTRAP_ADMIN") {
            let v = v.trim().to_string();
            self.store.bootstrap_admin = (!v.is_empty()).then_some(v);
        }

        // Security overrides
        if let Some(v) = lookup("ACCESS_SECRET_TOKEN") {
            self.security.access_secret = v;
        }
        if let Some(v) = lookup("TOKEN_TTL_HOURS") {
            self.security.token_ttl_hours = parse_var("TOKEN_TTL_HOURS", &v)?;
        }
        if let Some(v) = lookup("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = parse_var("SECURITY_ENABLE_CORS", &v)?;
        }
        if let Some(v) = lookup("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        Ok(self)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.security.access_secret.trim().is_empty() {
            return Err(ConfigError::Missing("ACCESS_SECRET_TOKEN"));
        }
        if !(1..=MAX_TOKEN_TTL_HOURS as u64).contains(&self.security.token_ttl_hours) {
            return Err(ConfigError::Invalid {
                name: "TOKEN_TTL_HOURS",
                value: self.security.token_ttl_hours.to_string(),
            });
        }
        if self.store.lookup_timeout_ms == 0 {
            return Err(ConfigError::Invalid {
                name: "STORE_LOOKUP_TIMEOUT_MS",
                value: "0".to_string(),
            });
        }
        if self.store.backend == StoreBackend::Postgres && self.store.database_url.is_none() {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }
        Ok(())
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 5000,
            },
            store: StoreConfig {
                backend: StoreBackend::Memory,
                database_url: None,
                max_connections: 5,
                connection_timeout_secs: 30,
                lookup_timeout_ms: 5_000,
                bootstrap_admin: None,
            },
            security: SecurityConfig {
                access_secret: String::new(),
                token_ttl_hours: 4,
                enable_cors: true,
                cors_origins: vec!["*".to_string()],
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 5000,
            },
            store: StoreConfig {
                backend: StoreBackend::Postgres,
                database_url: None,
                max_connections: 10,
                connection_timeout_secs: 10,
                lookup_timeout_ms: 5_000,
                bootstrap_admin: None,
            },
            security: SecurityConfig {
                access_secret: String::new(),
                token_ttl_hours: 4,
                enable_cors: true,
                cors_origins: vec!["https://staging.example.com".to_string()],
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 5000,
            },
            store: StoreConfig {
                backend: StoreBackend::Postgres,
                database_url: None,
                max_connections: 20,
                connection_timeout_secs: 5,
                lookup_timeout_ms: 3_000,
                bootstrap_admin: None,
            },
            security: SecurityConfig {
                access_secret: String::new(),
                token_ttl_hours: 4,
                enable_cors: true,
                cors_origins: vec!["https://app.example.com".to_string()],
            },
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        name,
        value: value.to_string(),
    })
}
