//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! defaults (schema.rs)
//!     → optional TOML file (loader.rs)
//!     → environment variables (loader.rs, Go-style durations via duration.rs)
//!     → --port flag
//!     → validation.rs (semantic checks)
//!     → AppConfig (validated, immutable, shared by value)
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults so an empty environment is a valid setup
//! - Unusable environment values keep the previous value and surface as
//!   warnings instead of aborting startup

pub mod duration;
pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load, load_config, load_with, ConfigError, EnvWarning, LoadedConfig};
pub use schema::{AppConfig, ObservabilityConfig, ServerConfig, ServiceConfig};
pub use validation::{validate_config, ValidationError};
