//! Configuration management for the rifa server.
//!
//! Loads configuration from environment variables with sensible defaults.
//! A `.env` file is honored when present (loaded by the binary before the
//! first read).

use rifa_core::RatePolicy;
use serde::{Deserialize, Serialize};
use std::env;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server configuration
    pub server: ServerConfig,
    /// SQLite database configuration
    pub database: DatabaseConfig,
    /// Participation admission rate limiting
    pub rate_limit: RateLimitConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,
    /// Port to bind to
    pub port: u16,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Path of the SQLite file; the literal `:memory:` selects a private
    /// in-memory database
    pub path: String,
}

/// Rate limiting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Admitted attempts per identifier per window
    pub max_attempts: u32,
    /// Window length in seconds
    pub window_secs: i64,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Every variable is optional; missing or unparseable values fall back
    /// to the defaults:
    ///
    /// | variable                        | default     |
    /// |---------------------------------|-------------|
    /// | `RIFA_HOST`                     | `127.0.0.1` |
    /// | `RIFA_PORT`                     | `3000`      |
    /// | `DATABASE_PATH`                 | `rifa.db`   |
    /// | `RIFA_RATE_LIMIT_MAX_ATTEMPTS`  | `3`         |
    /// | `RIFA_RATE_LIMIT_WINDOW_SECS`   | `60`        |
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            server: ServerConfig {
                host: env::var("RIFA_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
                port: env::var("RIFA_PORT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(3000),
            },
            database: DatabaseConfig {
                path: env::var("DATABASE_PATH").unwrap_or_else(|_| "rifa.db".to_string()),
            },
            rate_limit: RateLimitConfig {
                max_attempts: env::var("RIFA_RATE_LIMIT_MAX_ATTEMPTS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(3),
                window_secs: env::var("RIFA_RATE_LIMIT_WINDOW_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(60),
            },
        }
    }

    /// The address the server binds to, as `host:port`.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl DatabaseConfig {
    /// Whether the in-memory database was selected.
    #[must_use]
    pub fn is_in_memory(&self) -> bool {
        self.path == ":memory:"
    }
}

impl RateLimitConfig {
    /// The configured values as a limiter policy.
    #[must_use]
    pub fn policy(&self) -> RatePolicy {
        RatePolicy::per_seconds(self.max_attempts, self.window_secs)
    }
}
