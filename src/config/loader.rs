//! Configuration loading from disk and the environment.
//!
//! Precedence, lowest first: defaults, TOML file, environment variables,
//! command-line port.

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use crate::config::duration::parse_duration;
use crate::config::schema::AppConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// An environment variable that was present but could not be used.
/// The previous value is kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvWarning {
    pub var: &'static str,
    pub value: String,
}

impl fmt::Display for EnvWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ignoring {}={:?}: not a valid value", self.var, self.value)
    }
}

/// A validated configuration plus the environment values that were ignored.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: AppConfig,
    pub warnings: Vec<EnvWarning>,
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let config = read_file(path)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Build the effective configuration from the process environment.
pub fn load(
    file: Option<&Path>,
    port_override: Option<String>,
) -> Result<LoadedConfig, ConfigError> {
    load_with(file, port_override, |key| std::env::var(key).ok())
}

/// Same as [`load`] with an injectable variable lookup.
pub fn load_with<F>(
    file: Option<&Path>,
    port_override: Option<String>,
    lookup: F,
) -> Result<LoadedConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match file {
        Some(path) => read_file(path)?,
        None => AppConfig::default(),
    };

    let warnings = apply_env(&mut config, lookup);

    if let Some(port) = port_override {
        config.server.port = port;
    }

    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(LoadedConfig { config, warnings })
}

fn read_file(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Overlay environment variables onto `config`.
pub fn apply_env<F>(config: &mut AppConfig, lookup: F) -> Vec<EnvWarning>
where
    F: Fn(&str) -> Option<String>,
{
    let mut env = EnvOverlay {
        lookup,
        warnings: Vec::new(),
    };
    let server = &mut config.server;

    env.string("PORT", &mut server.port);
    env.string("BIND_HOST", &mut server.bind_host);
    env.duration("READ_TIMEOUT", &mut server.read_timeout);
    env.duration("WRITE_TIMEOUT", &mut server.write_timeout);
    env.duration("IDLE_TIMEOUT", &mut server.idle_timeout);
    env.duration("SHUTDOWN_TIMEOUT", &mut server.shutdown_timeout);
    env.parsed("MAX_HEADER_BYTES", &mut server.max_header_bytes);
    env.parsed("MAX_BODY_BYTES", &mut server.max_body_bytes);
    env.parsed("MAX_CONNECTIONS", &mut server.max_connections);

    env.string("ENVIRONMENT", &mut config.app.environment);
    env.string("LOG_LEVEL", &mut config.app.log_level);

    if let Some(addr) = (env.lookup)("METRICS_ADDRESS") {
        config.observability.metrics_address = (!addr.is_empty()).then_some(addr);
    }
    env.parsed("LOG_CALLER", &mut config.observability.log_caller);

    env.warnings
}

struct EnvOverlay<F> {
    lookup: F,
    warnings: Vec<EnvWarning>,
}

impl<F: Fn(&str) -> Option<String>> EnvOverlay<F> {
    fn string(&mut self, var: &'static str, slot: &mut String) {
        if let Some(value) = (self.lookup)(var) {
            *slot = value;
        }
    }

    fn duration(&mut self, var: &'static str, slot: &mut Duration) {
        if let Some(value) = (self.lookup)(var) {
            match parse_duration(&value) {
                Some(d) => *slot = d,
                None => self.warnings.push(EnvWarning { var, value }),
            }
        }
    }

    fn parsed<T: FromStr>(&mut self, var: &'static str, slot: &mut T) {
        if let Some(value) = (self.lookup)(var) {
            match value.trim().parse() {
                Ok(v) => *slot = v,
                Err(_) => self.warnings.push(EnvWarning { var, value }),
            }
        }
    }
}
