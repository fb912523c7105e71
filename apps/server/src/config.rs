//! Server configuration module.
//!
//! Configuration is loaded from environment variables with fallback to
//! defaults.

use serde::{Deserialize, Serialize};
use std::env;

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP listen port
    pub http_port: u16,

    /// SQLite database file path
    pub database_path: String,

    /// JWT secret key for validating staff tokens
    pub jwt_secret: String,

    /// JWT token lifetime in seconds
    pub jwt_lifetime_secs: i64,

    /// Kitchen bus broadcast channel capacity
    pub kds_bus_capacity: usize,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let config = ServerConfig {
            http_port: env::var("HTTP_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("HTTP_PORT".to_string()))?,

            database_path: env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "./tiffin.db".to_string()),

            jwt_secret: env::var("JWT_SECRET").unwrap_or_else(|_| {
                // Random-looking default for development.
                // In production, this MUST be set via environment variable.
                "tiffin-dev-secret-change-in-production".to_string()
            }),

            jwt_lifetime_secs: env::var("JWT_LIFETIME_SECS")
                .unwrap_or_else(|_| "43200".to_string()) // 12 hours, one shift
                .parse()
                .map_err(|_| ConfigError::InvalidValue("JWT_LIFETIME_SECS".to_string()))?,

            kds_bus_capacity: env::var("KDS_BUS_CAPACITY")
                .unwrap_or_else(|_| "256".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("KDS_BUS_CAPACITY".to_string()))?,
        };

        Ok(config)
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}
