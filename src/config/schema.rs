//! Configuration schema definitions.
//!
//! All types derive Serde traits so the same structure can be read from a
//! TOML file and then overridden from the environment.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration for the webhook service.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Listener, timeouts and limits.
    pub server: ServerConfig,

    /// Deployment environment and log level.
    pub app: ServiceConfig,

    /// Metrics and logger presentation.
    pub observability: ObservabilityConfig,
}

/// HTTP server settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    /// TCP port to listen on.
    pub port: String,

    /// Interface to bind (e.g. "0.0.0.0").
    pub bind_host: String,

    /// Time allowed for a client to send request headers.
    #[serde(with = "crate::config::duration")]
    pub read_timeout: Duration,

    /// Deadline for producing a response.
    #[serde(with = "crate::config::duration")]
    pub write_timeout: Duration,

    /// Keep-alive connections with no request in flight are closed after this.
    #[serde(with = "crate::config::duration")]
    pub idle_timeout: Duration,

    /// Upper bound on draining in-flight requests at shutdown.
    #[serde(with = "crate::config::duration")]
    pub shutdown_timeout: Duration,

    /// Maximum size of the request head in bytes.
    pub max_header_bytes: usize,

    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,

    /// Maximum concurrent client connections (backpressure).
    pub max_connections: usize,
}

impl ServerConfig {
    /// `host:port` string for binding.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.bind_host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: "8080".to_string(),
            bind_host: "0.0.0.0".to_string(),
            read_timeout: Duration::from_secs(15),
            write_timeout: Duration::from_secs(15),
            idle_timeout: Duration::from_secs(60),
            shutdown_timeout: Duration::from_secs(30),
            max_header_bytes: 1 << 20,
            max_body_bytes: 2 * 1024 * 1024,
            max_connections: 10_000,
        }
    }
}

/// Application-level settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ServiceConfig {
    /// Deployment label ("development", "staging", "production").
    pub environment: String,

    /// Minimum log level (debug, info, warn, error, fatal).
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Prometheus scrape address; metrics are disabled when unset.
    pub metrics_address: Option<String>,

    /// Append `caller=` attribution to log lines.
    pub log_caller: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_address: None,
            log_caller: true,
        }
    }
}
