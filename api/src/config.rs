//! Server configuration module.
//!
//! Handles loading configuration from environment variables with sensible defaults.

use anyhow::{bail, Result};
use std::net::SocketAddr;

/// Which storage backend the server should use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// In-memory stores; data is lost on restart. For development and tests.
    Memory,
    /// `ClickHouse`-backed stores. The production default.
    ClickHouse,
}

/// Server configuration.
///
/// Configuration values can be set via environment variables:
/// - `SHOPSIGHT_HOST`: The host address to bind to (default: "0.0.0.0")
/// - `SHOPSIGHT_PORT`: The port to listen on (default: 8080)
/// - `SHOPSIGHT_STORE`: Storage backend, `clickhouse` or `memory`
///   (default: "clickhouse")
#[derive(Debug, Clone)]
pub struct Config {
    /// The host address to bind to.
    pub host: String,
    /// The port to listen on.
    pub port: u16,
    /// The storage backend to use.
    pub store: StoreBackend,
}

impl Config {
    /// Creates a new configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `SHOPSIGHT_PORT` is set but cannot be parsed as a valid port number
    /// - `SHOPSIGHT_STORE` is set to an unknown backend name
    pub fn from_env() -> Result<Self> {
        let host = std::env::var("SHOPSIGHT_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());

        let port = std::env::var("SHOPSIGHT_PORT")
            .ok()
            .map(|p| p.parse::<u16>())
            .transpose()?
            .unwrap_or(8080);

        let store = match std::env::var("SHOPSIGHT_STORE").as_deref() {
            Err(_) | Ok("clickhouse") => StoreBackend::ClickHouse,
            Ok("memory") => StoreBackend::Memory,
            Ok(other) => bail!("Unknown store backend: '{other}' (expected clickhouse or memory)"),
        };

        Ok(Self { host, port, store })
    }

    /// Returns the socket address for binding.
    ///
    /// # Panics
    ///
    /// Panics if the host and port combination cannot be parsed as a valid socket address.
    #[must_use]
    pub fn socket_addr(&self) -> SocketAddr {
        format!("{}:{}", self.host, self.port)
            .parse()
            .expect("Invalid socket address from config")
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            store: StoreBackend::ClickHouse,
        }
    }
}
