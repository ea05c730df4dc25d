//! Startup orchestration.
//!
//! # Responsibilities
//! - Install the service logger as the global logger
//! - Bind the listener (failure is fatal)
//! - Serve until SIGINT/SIGTERM, then drain within the shutdown timeout

use crate::config::AppConfig;
use crate::http::{HttpServer, ServerError};
use crate::lifecycle::{signals, Shutdown};
use crate::net::Listener;
use crate::observability::{set_global_logger, Logger};

/// Run the service until a termination signal and a completed drain.
pub async fn run(config: AppConfig, logger: Logger) -> Result<(), ServerError> {
    set_global_logger(logger.clone());

    crate::info!(
        logger: logger,
        "Confluence webhook receiver starting",
        "port" => config.server.port,
        "environment" => config.app.environment
    );

    let listener = match Listener::bind(&config.server).await {
        Ok(listener) => listener,
        Err(e) => {
            crate::fatal!(logger: logger, "Server error", "error" => e);
            return Err(e.into());
        }
    };

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config.server.clone(), logger.clone());
    let mut server_task = tokio::spawn(server.run(listener, shutdown.subscribe()));

    tokio::select! {
        signal = signals::wait_for_termination() => {
            crate::info!(logger: logger, "Received signal", "signal" => signal);
            crate::info!(logger: logger, "Starting graceful shutdown");
            shutdown.trigger();
        }
        finished = &mut server_task => {
            let result = finished?;
            if let Err(e) = &result {
                crate::error!(logger: logger, "Server stopped unexpectedly", "error" => e);
            }
            return result;
        }
    }

    match server_task.await? {
        Ok(()) => {
            crate::info!(logger: logger, "Server shutdown completed");
            Ok(())
        }
        Err(e) => {
            crate::error!(logger: logger, "Server shutdown error", "error" => e);
            Err(e)
        }
    }
}
