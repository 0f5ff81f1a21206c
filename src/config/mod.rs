use crate::core::{AppError, Result};
use serde::Deserialize;
use std::env;

pub mod database;
pub mod server;

pub use database::DatabaseConfig;
pub use server::ServerConfig;

/// Main application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub env: String,
    pub log_level: String,
    /// Default page size for list endpoints
    pub list_page_size: i64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let config = Config {
            app: AppConfig {
                env: env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
                log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
                list_page_size: env::var("LIST_PAGE_SIZE")
                    .unwrap_or_else(|_| "50".to_string())
                    .parse()
                    .map_err(|_| AppError::Configuration("Invalid LIST_PAGE_SIZE".to_string()))?,
            },
            database: DatabaseConfig::from_env()?,
            server: ServerConfig::from_env()?,
        };

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.app.list_page_size <= 0 {
            return Err(AppError::Configuration(
                "List page size must be greater than 0".to_string(),
            ));
        }

        if self.database.pool_size == 0 {
            return Err(AppError::Configuration(
                "Database pool size must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}
