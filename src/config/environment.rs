// ABOUTME: Environment-based server configuration for the catalog server
// ABOUTME: Reads ports, database location, image limits, and composition depth with validation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::database::DatabaseUrl;
use crate::constants::{defaults, limits};
use crate::errors::{AppError, AppResult};
use std::env;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::info;

/// Database settings
#[derive(Debug, Clone, Default)]
pub struct DatabaseConfig {
    /// Database location
    pub url: DatabaseUrl,
}

/// Image upload settings
#[derive(Debug, Clone)]
pub struct ImageConfig {
    /// Directory where uploaded images are written
    pub upload_dir: PathBuf,
    /// Largest accepted upload in bytes
    pub max_bytes: usize,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            upload_dir: PathBuf::from(defaults::UPLOAD_DIR),
            max_bytes: defaults::MAX_IMAGE_BYTES,
        }
    }
}

/// Composition and dietary profile settings
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Number of ingredient levels folded into a product's dietary profile.
    ///
    /// `1` aggregates the product's direct ingredients only and trusts the
    /// flags declared on composite ingredients.
    pub max_expansion_depth: usize,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            max_expansion_depth: defaults::MAX_EXPANSION_DEPTH,
        }
    }
}

/// CORS settings
#[derive(Debug, Clone)]
pub struct CorsConfig {
    /// Comma separated origins, or `*`
    pub allowed_origins: String,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: defaults::CORS_ALLOWED_ORIGINS.to_owned(),
        }
    }
}

/// Catalog event bus settings
#[derive(Debug, Clone)]
pub struct EventsConfig {
    /// Broadcast buffer per subscriber
    pub channel_capacity: usize,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            channel_capacity: defaults::EVENT_CHANNEL_CAPACITY,
        }
    }
}

/// Complete server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP listen port
    pub http_port: u16,
    /// HTTP bind address
    pub host: String,
    /// Database settings
    pub database: DatabaseConfig,
    /// Image upload settings
    pub images: ImageConfig,
    /// Composition settings
    pub catalog: CatalogConfig,
    /// CORS settings
    pub cors: CorsConfig,
    /// Event bus settings
    pub events: EventsConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_port: defaults::HTTP_PORT,
            host: defaults::HOST.to_owned(),
            database: DatabaseConfig::default(),
            images: ImageConfig::default(),
            catalog: CatalogConfig::default(),
            cors: CorsConfig::default(),
            events: EventsConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set to a value that cannot be parsed
    /// or falls outside its accepted range
    pub fn from_env() -> AppResult<Self> {
        info!("Loading configuration from environment variables");

        let config = Self {
            http_port: parse_env("HTTP_PORT", defaults::HTTP_PORT)?,
            host: env_var_or("HOST", defaults::HOST),
            database: DatabaseConfig {
                url: DatabaseUrl::parse_url(&env_var_or("DATABASE_URL", defaults::DATABASE_URL))?,
            },
            images: ImageConfig {
                upload_dir: PathBuf::from(env_var_or("UPLOAD_DIR", defaults::UPLOAD_DIR)),
                max_bytes: parse_env("MAX_IMAGE_BYTES", defaults::MAX_IMAGE_BYTES)?,
            },
            catalog: CatalogConfig {
                max_expansion_depth: parse_env(
                    "MAX_EXPANSION_DEPTH",
                    defaults::MAX_EXPANSION_DEPTH,
                )?,
            },
            cors: CorsConfig {
                allowed_origins: env_var_or(
                    "CORS_ALLOWED_ORIGINS",
                    defaults::CORS_ALLOWED_ORIGINS,
                ),
            },
            events: EventsConfig {
                channel_capacity: parse_env(
                    "EVENT_CHANNEL_CAPACITY",
                    defaults::EVENT_CHANNEL_CAPACITY,
                )?,
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Check value ranges
    ///
    /// # Errors
    ///
    /// Returns a `ConfigInvalid` error naming the first offending setting
    pub fn validate(&self) -> AppResult<()> {
        let depth = self.catalog.max_expansion_depth;
        if depth == 0 || depth > limits::MAX_EXPANSION_DEPTH_LIMIT {
            return Err(AppError::config_invalid(format!(
                "MAX_EXPANSION_DEPTH must be between 1 and {}, got {depth}",
                limits::MAX_EXPANSION_DEPTH_LIMIT
            )));
        }
        if self.images.max_bytes == 0 {
            return Err(AppError::config_invalid(
                "MAX_IMAGE_BYTES must be greater than zero",
            ));
        }
        if self.events.channel_capacity == 0 {
            return Err(AppError::config_invalid(
                "EVENT_CHANNEL_CAPACITY must be greater than zero",
            ));
        }
        Ok(())
    }

    /// One line description for startup logs
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Pasta catalog: http={}:{} database={} uploads={} max_expansion_depth={} cors={}",
            self.host,
            self.http_port,
            self.database.url,
            self.images.upload_dir.display(),
            self.catalog.max_expansion_depth,
            self.cors.allowed_origins
        )
    }
}

/// Get environment variable or default value
fn env_var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}

/// Parse an environment variable, falling back to `default` when unset
fn parse_env<T>(key: &str, default: T) -> AppResult<T>
where
    T: FromStr,
    T::Err: Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| AppError::config_invalid(format!("Invalid {key} value '{raw}': {e}"))),
        Err(_) => Ok(default),
    }
}
