//! `tracing` subscriber for framework diagnostics.
//!
//! tower-http's `TraceLayer` and hyper report through `tracing`; this
//! installs the fmt subscriber for them. Application events use the
//! structured [`Logger`](super::Logger) instead.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::observability::Level;

/// Default filter directives for a configured level.
pub fn default_directives(level: Level) -> String {
    let filter = level.to_level_filter();
    format!("confluence_hook={filter},tower_http={filter}").to_lowercase()
}

/// Install the global subscriber. `RUST_LOG` takes precedence over `level`.
///
/// Returns `false` if a subscriber was already installed.
pub fn init(level: Level) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(level)));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directives_follow_level() {
        assert_eq!(
            default_directives(Level::Debug),
            "confluence_hook=debug,tower_http=debug"
        );
        assert_eq!(
            default_directives(Level::Fatal),
            "confluence_hook=error,tower_http=error"
        );
    }
}
