//! Service configuration loaded from environment variables.
//!
//! A `.env` file in the working directory is honoured via `dotenvy`.
//!
//! - `DATABASE_URL` (required): PostgreSQL connection string
//! - `HOST` (default `0.0.0.0`), `PORT` (default `8080`)
//! - `DATABASE_POOL_SIZE` (default `10`)
//! - `AUTH_USER_HEADER` (default `x-user-id`): header carrying the user id
//!   established by the upstream session layer

use std::env;
use std::str::FromStr;

use thiserror::Error;

pub const DEFAULT_AUTH_USER_HEADER: &str = "x-user-id";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub database_pool_size: u32,
    pub auth_user_header: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            host: "0.0.0.0".to_string(),
            port: 8080,
            database_pool_size: 10,
            auth_user_header: DEFAULT_AUTH_USER_HEADER.to_string(),
        }
    }
}

impl AppConfig {
    /// Load from the process environment, after merging any `.env` file.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let database_url = lookup("DATABASE_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar("DATABASE_URL".to_string()))?;

        Ok(Self {
            database_url,
            host: lookup("HOST").unwrap_or(defaults.host),
            port: parse_or(&lookup, "PORT", defaults.port)?,
            database_pool_size: parse_or(&lookup, "DATABASE_POOL_SIZE", defaults.database_pool_size)?,
            auth_user_header: lookup("AUTH_USER_HEADER")
                .map(|h| h.trim().to_ascii_lowercase())
                .unwrap_or(defaults.auth_user_header),
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidEnvVar(key.to_string(), raw)),
    }
}
