//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, port valid, buffer floor)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is a pure function: AppConfig → Result<(), Vec<ValidationError>>

use std::net::SocketAddr;
use std::time::Duration;

use crate::config::schema::AppConfig;
use crate::observability::Level;

/// Smallest read buffer hyper accepts.
pub const MIN_HEADER_BYTES: usize = 8192;

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("invalid port `{0}`: expected 1-65535")]
    InvalidPort(String),

    #[error("{0} must be greater than zero")]
    ZeroTimeout(&'static str),

    #[error("max_header_bytes must be at least {MIN_HEADER_BYTES}, got {0}")]
    HeaderLimitTooSmall(usize),

    #[error("{0} must be greater than zero")]
    ZeroLimit(&'static str),

    #[error("invalid log level `{0}`")]
    InvalidLogLevel(String),

    #[error("invalid metrics address `{0}`")]
    InvalidMetricsAddress(String),
}

/// Check a configuration, collecting every problem found.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let server = &config.server;

    match server.port.parse::<u16>() {
        Ok(port) if port > 0 => {}
        _ => errors.push(ValidationError::InvalidPort(server.port.clone())),
    }

    let timeouts: [(&'static str, Duration); 4] = [
        ("read_timeout", server.read_timeout),
        ("write_timeout", server.write_timeout),
        ("idle_timeout", server.idle_timeout),
        ("shutdown_timeout", server.shutdown_timeout),
    ];
    for (name, value) in timeouts {
        if value.is_zero() {
            errors.push(ValidationError::ZeroTimeout(name));
        }
    }

    if server.max_header_bytes < MIN_HEADER_BYTES {
        errors.push(ValidationError::HeaderLimitTooSmall(server.max_header_bytes));
    }
    if server.max_body_bytes == 0 {
        errors.push(ValidationError::ZeroLimit("max_body_bytes"));
    }
    if server.max_connections == 0 {
        errors.push(ValidationError::ZeroLimit("max_connections"));
    }

    if config.app.log_level.parse::<Level>().is_err() {
        errors.push(ValidationError::InvalidLogLevel(config.app.log_level.clone()));
    }

    if let Some(addr) = &config.observability.metrics_address {
        if addr.parse::<SocketAddr>().is_err() {
            errors.push(ValidationError::InvalidMetricsAddress(addr.clone()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
