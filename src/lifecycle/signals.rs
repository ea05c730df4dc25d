//! OS signal handling.
//!
//! SIGINT and SIGTERM both request a graceful shutdown. On platforms
//! without Unix signals only Ctrl-C is observed.

/// Resolve with the name of the first termination signal received.
#[cfg(unix)]
pub async fn wait_for_termination() -> &'static str {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate = match signal(SignalKind::terminate()) {
        Ok(stream) => stream,
        Err(e) => {
            crate::warn!("SIGTERM handler unavailable, listening for SIGINT only", "error" => e);
            return wait_for_ctrl_c().await;
        }
    };

    tokio::select! {
        name = wait_for_ctrl_c() => name,
        _ = terminate.recv() => "SIGTERM",
    }
}

#[cfg(not(unix))]
pub async fn wait_for_termination() -> &'static str {
    wait_for_ctrl_c().await
}

async fn wait_for_ctrl_c() -> &'static str {
    if let Err(e) = tokio::signal::ctrl_c().await {
        crate::error!("Failed to install SIGINT handler", "error" => e);
        std::future::pending::<()>().await;
    }
    "SIGINT"
}
