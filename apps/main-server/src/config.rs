//! Server configuration.

use std::env;

/// Default SQLite database, created next to the binary if missing.
pub const DEFAULT_DATABASE_URL: &str = "sqlite:jamtracker.db?mode=rwc";

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host address.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Database URL.
    pub database_url: String,
    /// Secret used to sign session tokens.
    pub jwt_secret: String,
    /// Session token lifetime in hours.
    pub jwt_expiration_hours: u64,
    /// Deployment environment name.
    pub environment: String,
    /// Log level.
    pub log_level: String,
}

impl Config {
    /// Creates a configuration with default values and the given signing
    /// secret.
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            jwt_secret: jwt_secret.into(),
            jwt_expiration_hours: auth::DEFAULT_JWT_EXPIRATION_HOURS,
            environment: "development".to_string(),
            log_level: "info".to_string(),
        }
    }

    /// Loads configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        let jwt_secret = env::var("JWT_SECRET")
            .ok()
            .filter(|secret| !secret.trim().is_empty())
            .ok_or_else(|| anyhow::anyhow!("JWT_SECRET is required"))?;

        let defaults = Self::new(jwt_secret);

        Ok(Self {
            host: env::var("HOST").unwrap_or(defaults.host),
            port: match env::var("PORT") {
                Ok(port) => port
                    .parse()
                    .map_err(|_| anyhow::anyhow!("PORT must be a port number, got '{port}'"))?,
                Err(_) => defaults.port,
            },
            database_url: env::var("DATABASE_URL").unwrap_or(defaults.database_url),
            jwt_expiration_hours: env::var("JWT_EXPIRATION_HOURS")
                .ok()
                .and_then(|hours| hours.parse().ok())
                .unwrap_or(defaults.jwt_expiration_hours),
            environment: env::var("ENVIRONMENT").unwrap_or(defaults.environment),
            log_level: env::var("LOG_LEVEL").unwrap_or(defaults.log_level),
            jwt_secret: defaults.jwt_secret,
        })
    }

    /// Returns the server address.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
