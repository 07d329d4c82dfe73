// ABOUTME: Environment configuration management for deployment-specific settings
// ABOUTME: Handles environment variables, defaults, and runtime configuration parsing
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Environment-based configuration management for production deployment

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use tracing::info;

/// Default HTTP port the server binds to
pub const DEFAULT_HTTP_PORT: u16 = 8080;
/// Default SQLite database URL
pub const DEFAULT_DATABASE_URL: &str = "sqlite:./data/ladle.db";
/// Default directory decoded image assets are written to
pub const DEFAULT_MEDIA_DIR: &str = "./data/media";

/// Strongly typed log level configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Errors only
    Error,
    /// Warnings and errors
    Warn,
    /// Default production level
    #[default]
    Info,
    /// Verbose development output
    Debug,
    /// Everything, including per-query spans
    Trace,
}

impl LogLevel {
    /// Convert to `tracing::Level`
    #[must_use]
    pub const fn to_tracing_level(&self) -> tracing::Level {
        match self {
            Self::Error => tracing::Level::ERROR,
            Self::Warn => tracing::Level::WARN,
            Self::Info => tracing::Level::INFO,
            Self::Debug => tracing::Level::DEBUG,
            Self::Trace => tracing::Level::TRACE,
        }
    }

    /// Parse from string with fallback to `Info`
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "error" => Self::Error,
            "warn" => Self::Warn,
            "debug" => Self::Debug,
            "trace" => Self::Trace,
            _ => Self::Info,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warn => write!(f, "warn"),
            Self::Info => write!(f, "info"),
            Self::Debug => write!(f, "debug"),
            Self::Trace => write!(f, "trace"),
        }
    }
}

/// Server runtime configuration loaded from the environment
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP port the API binds to
    pub http_port: u16,
    /// Database connection URL (SQLite)
    pub database_url: String,
    /// Shared secret used to validate bearer tokens issued by the external
    /// identity service
    pub jwt_secret: String,
    /// Directory decoded image assets are written to
    pub media_dir: PathBuf,
    /// Log level
    pub log_level: LogLevel,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if `JWT_SECRET` is unset or a numeric variable
    /// fails to parse.
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");

        let http_port = env_var_or("HTTP_PORT", &DEFAULT_HTTP_PORT.to_string())
            .parse()
            .context("Invalid HTTP_PORT value")?;

        let jwt_secret = env::var("JWT_SECRET")
            .context("JWT_SECRET must be set to the identity service's signing secret")?;

        Ok(Self {
            http_port,
            database_url: env_var_or("DATABASE_URL", DEFAULT_DATABASE_URL),
            jwt_secret,
            media_dir: PathBuf::from(env_var_or("MEDIA_DIR", DEFAULT_MEDIA_DIR)),
            log_level: LogLevel::from_str_or_default(&env_var_or("LOG_LEVEL", "info")),
        })
    }

    /// One-line-per-setting summary for startup logging
    ///
    /// The JWT secret is intentionally absent.
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Ladle Server Configuration:\n\
             - HTTP Port: {}\n\
             - Log Level: {}\n\
             - Database: {}\n\
             - Media Dir: {}",
            self.http_port,
            self.log_level,
            self.database_url,
            self.media_dir.display(),
        )
    }
}

/// Read an environment variable with a default fallback
fn env_var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_parsing() {
        assert_eq!(LogLevel::from_str_or_default("debug"), LogLevel::Debug);
        assert_eq!(LogLevel::from_str_or_default("WARN"), LogLevel::Warn);
        assert_eq!(LogLevel::from_str_or_default("bogus"), LogLevel::Info);
    }

    #[test]
    fn test_log_level_to_tracing_level() {
        assert_eq!(LogLevel::Error.to_tracing_level(), tracing::Level::ERROR);
        assert_eq!(LogLevel::Trace.to_tracing_level(), tracing::Level::TRACE);
    }
}
