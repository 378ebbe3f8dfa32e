//! # Service Configuration
//!
//! Command-line flags with environment fallbacks. Every setting has a
//! default, so the binary starts with no configuration at all (in-memory
//! store, `0.0.0.0:8080`, `info` logging, metrics on).

use std::fmt;
use std::net::SocketAddr;

use clap::{ArgAction, Args, Parser};

/// Top-level configuration for the `prr-api` binary.
#[derive(Debug, Clone, Parser)]
#[command(name = "prr-api", version, about = "Pull request merge service")]
pub struct AppConfig {
    /// Address the HTTP server binds to.
    #[arg(long = "bind", env = "BIND_ADDRESS", default_value = "0.0.0.0:8080")]
    pub bind: SocketAddr,

    #[command(flatten)]
    pub database: DatabaseConfig,

    #[command(flatten)]
    pub logging: LoggingConfig,

    /// Install the Prometheus recorder and serve `/metrics`.
    #[arg(
        long = "metrics-enabled",
        env = "METRICS_ENABLED",
        default_value_t = true,
        action = ArgAction::Set
    )]
    pub metrics_enabled: bool,
}

/// PostgreSQL connection settings.
#[derive(Clone, Args)]
pub struct DatabaseConfig {
    /// Connection string. When absent the in-memory store is used.
    #[arg(long = "database-url", env = "DATABASE_URL")]
    pub url: Option<String>,

    /// Upper bound on pooled connections.
    #[arg(long = "max-connections", env = "DB_MAX_CONNECTIONS", default_value_t = 15)]
    pub max_connections: u32,

    /// Connections kept open while idle.
    #[arg(long = "min-connections", env = "DB_MIN_CONNECTIONS", default_value_t = 5)]
    pub min_connections: u32,

    /// Seconds to wait for a pooled connection.
    #[arg(
        long = "acquire-timeout-secs",
        env = "DB_ACQUIRE_TIMEOUT_SECS",
        default_value_t = 5
    )]
    pub acquire_timeout_secs: u64,
}

/// Debug output redacts the connection string, which usually embeds a password.
impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("url", &self.url.as_ref().map(|_| "[REDACTED]"))
            .field("max_connections", &self.max_connections)
            .field("min_connections", &self.min_connections)
            .field("acquire_timeout_secs", &self.acquire_timeout_secs)
            .finish()
    }
}

/// Logging settings.
#[derive(Debug, Clone, Args)]
pub struct LoggingConfig {
    /// Default filter directive. `RUST_LOG` takes precedence when set.
    #[arg(long = "log-level", env = "LOG_LEVEL", default_value = "info")]
    pub level: String,

    /// Emit newline-delimited JSON instead of human-readable lines.
    #[arg(long = "log-json", env = "LOG_JSON")]
    pub json: bool,
}
