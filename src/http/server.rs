//! HTTP server setup and connection serving.
//!
//! # Responsibilities
//! - Create the Axum router with both endpoints
//! - Wire up middleware (request ID, tracing, timeouts, body limit, metrics)
//! - Serve HTTP/1.1 and HTTP/2 connections from the bounded listener
//! - Close idle keep-alive connections
//! - Drain in-flight requests on shutdown, bounded by the shutdown timeout

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::{DefaultBodyLimit, Request},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{any, post},
    Router,
};
use hyper::body::Incoming;
use hyper_util::{
    rt::{TokioExecutor, TokioIo, TokioTimer},
    server::conn::auto,
};
use tokio::net::TcpStream;
use tower::ServiceExt;
use tower_http::{limit::RequestBodyLimitLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::ServerConfig;
use crate::http::health::health_check;
use crate::http::request::{propagate_request_id_layer, set_request_id_layer};
use crate::http::webhook::{handle_confluence_webhook, method_not_allowed};
use crate::lifecycle::ShutdownSignal;
use crate::net::{
    ConnectionGuard, ConnectionPermit, ConnectionTracker, IdleTimer, Listener, ListenerError,
};
use crate::observability::{metrics, Clock, Logger, SystemClock};

pub const WEBHOOK_PATH: &str = "/webhook/confluence";
pub const HEALTH_PATH: &str = "/health";

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub logger: Logger,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    pub fn new(logger: Logger) -> Self {
        Self {
            logger,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(logger: Logger, clock: impl Clock + 'static) -> Self {
        Self {
            logger,
            clock: Arc::new(clock),
        }
    }
}

/// Error type for the serving loop.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error(transparent)]
    Listener(#[from] ListenerError),

    #[error("shutdown timed out with {remaining} open connection(s)")]
    DrainTimeout { remaining: u64 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("server task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Build the Axum router with all middleware layers.
#[allow(deprecated)]
pub fn create_router(state: AppState, config: &ServerConfig) -> Router {
    Router::new()
        .route(
            WEBHOOK_PATH,
            post(handle_confluence_webhook).fallback(method_not_allowed),
        )
        .route(HEALTH_PATH, any(health_check))
        .fallback(not_found)
        .with_state(state)
        .layer(middleware::from_fn(record_request_metrics))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(config.max_body_bytes))
        .layer(TimeoutLayer::new(config.write_timeout))
        .layer(TraceLayer::new_for_http())
        .layer(propagate_request_id_layer())
        .layer(set_request_id_layer())
}

async fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "404 page not found\n").into_response()
}

async fn record_request_metrics(request: Request, next: Next) -> Response {
    let path = match request.uri().path() {
        WEBHOOK_PATH => WEBHOOK_PATH,
        HEALTH_PATH => HEALTH_PATH,
        _ => "other",
    };
    let response = next.run(request).await;
    metrics::record_request(path, response.status().as_u16());
    response
}

/// HTTP server for the webhook receiver.
pub struct HttpServer {
    router: Router,
    config: ServerConfig,
    logger: Logger,
}

impl HttpServer {
    pub fn new(config: ServerConfig, logger: Logger) -> Self {
        Self::with_state(config, AppState::new(logger))
    }

    pub fn with_state(config: ServerConfig, state: AppState) -> Self {
        let logger = state.logger.clone();
        let router = create_router(state, &config);
        Self {
            router,
            config,
            logger,
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Clone of the router, for in-process requests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Accept connections until `shutdown` fires, then drain.
    pub async fn run(
        self,
        listener: Listener,
        mut shutdown: ShutdownSignal,
    ) -> Result<(), ServerError> {
        let address = listener.local_addr()?;
        crate::info!(logger: self.logger, "Server listening", "address" => address);

        let tracker = ConnectionTracker::new();
        let mut builder = auto::Builder::new(TokioExecutor::new());
        builder
            .http1()
            .timer(TokioTimer::new())
            .header_read_timeout(self.config.read_timeout)
            .max_buf_size(self.config.max_header_bytes);
        builder
            .http2()
            .timer(TokioTimer::new())
            .max_header_list_size(
                u32::try_from(self.config.max_header_bytes).unwrap_or(u32::MAX),
            );

        let connection_shutdown = shutdown.clone();
        loop {
            tokio::select! {
                accepted = listener.accept() => match accepted {
                    Ok((stream, _peer, permit)) => {
                        let guard = tracker.track();

                        let connection = Connection {
                            builder: builder.clone(),
                            router: self.router.clone(),
                            idle_timeout: self.config.idle_timeout,
                            shutdown: connection_shutdown.clone(),
                            logger: self.logger.clone(),
                            guard,
                            _permit: permit,
                        };
                        tokio::spawn(connection.serve(stream));
                    }
                    Err(e) => {
                        crate::error!(logger: self.logger, "Accept failed", "error" => e);
                        tokio::time::sleep(Duration::from_millis(100)).await;
                    }
                },
                _ = shutdown.recv() => break,
            }
        }

        drop(listener);
        crate::info!(
            logger: self.logger,
            "Draining connections",
            "active" => tracker.active_count(),
            "timeout" => crate::config::duration::format_duration(self.config.shutdown_timeout)
        );

        match tokio::time::timeout(self.config.shutdown_timeout, tracker.wait_idle()).await {
            Ok(()) => {
                crate::info!(logger: self.logger, "HTTP server stopped");
                Ok(())
            }
            Err(_) => {
                let remaining = tracker.active_count();
                crate::warn!(
                    logger: self.logger,
                    "Drain deadline exceeded",
                    "remaining" => remaining
                );
                Err(ServerError::DrainTimeout { remaining })
            }
        }
    }
}

/// One accepted client connection.
struct Connection {
    builder: auto::Builder<TokioExecutor>,
    router: Router,
    idle_timeout: Duration,
    shutdown: ShutdownSignal,
    logger: Logger,
    guard: ConnectionGuard,
    _permit: ConnectionPermit,
}

impl Connection {
    async fn serve(mut self, stream: TcpStream) {
        let logger = self.logger.with_field("connection_id", self.guard.id());
        let idle = IdleTimer::new(self.idle_timeout);

        let service = {
            let idle = idle.clone();
            let router = self.router.clone();
            hyper::service::service_fn(move |request: hyper::Request<Incoming>| {
                let activity = idle.begin();
                let router = router.clone();
                async move {
                    let response = router.oneshot(request.map(Body::new)).await;
                    drop(activity);
                    response
                }
            })
        };

        let conn = self.builder.serve_connection(TokioIo::new(stream), service);
        tokio::pin!(conn);

        let mut closing = false;
        loop {
            tokio::select! {
                result = conn.as_mut() => {
                    if let Err(e) = result {
                        crate::debug!(logger: logger, "Connection ended with error", "error" => e);
                    }
                    break;
                }
                _ = idle.expired(), if !closing => {
                    crate::debug!(logger: logger, "Closing idle connection");
                    closing = true;
                    conn.as_mut().graceful_shutdown();
                }
                _ = self.shutdown.recv(), if !closing => {
                    closing = true;
                    conn.as_mut().graceful_shutdown();
                }
            }
        }
    }
}
