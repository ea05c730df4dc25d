//! Confluence webhook receiver.
//!
//! # Architecture Overview
//!
//! ```text
//!     Confluence              ┌──────────────────────────────────────────────┐
//!     ───────────────────────▶│  net::Listener ──▶ http::HttpServer          │
//!     POST /webhook/confluence│  (conn limit)      ├─ /webhook/confluence    │
//!     GET  /health            │                    └─ /health                │
//!                             │                                              │
//!                             │  config ─ observability ─ lifecycle          │
//!                             └──────────────────────────────────────────────┘
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

use confluence_hook::config;
use confluence_hook::lifecycle::startup;
use confluence_hook::observability::{metrics, subscriber, Level, Logger};

#[derive(Parser)]
#[command(name = "confluence-hook")]
#[command(about = "Receives Confluence webhooks and logs each event", long_about = None)]
struct Cli {
    /// Listening port; overrides PORT and the config file.
    #[arg(short, long)]
    port: Option<String>,

    /// Optional TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let loaded = config::load(cli.config.as_deref(), cli.port)?;
    let config = loaded.config;

    // Validation has already rejected unknown levels.
    let level: Level = config.app.log_level.parse().unwrap_or_default();
    let logger = Logger::builder()
        .level(level)
        .caller(config.observability.log_caller)
        .build();

    subscriber::init(level);

    for warning in &loaded.warnings {
        confluence_hook::warn!(
            logger: logger,
            "Ignoring invalid environment value",
            "var" => warning.var,
            "value" => warning.value
        );
    }

    if let Some(address) = &config.observability.metrics_address {
        let addr: SocketAddr = address.parse()?;
        match metrics::init_metrics(addr) {
            Ok(()) => confluence_hook::info!(
                logger: logger,
                "Metrics exporter listening",
                "address" => addr
            ),
            Err(e) => confluence_hook::error!(
                logger: logger,
                "Failed to start metrics exporter",
                "error" => e
            ),
        }
    }

    startup::run(config, logger).await?;
    Ok(())
}
