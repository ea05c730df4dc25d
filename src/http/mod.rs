//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection (net::Listener)
//!     → server.rs (hyper connection, idle + drain handling)
//!     → request.rs (assign and propagate x-request-id)
//!     → webhook.rs  POST /webhook/confluence
//!     → health.rs   GET  /health
//! ```

pub mod health;
pub mod request;
pub mod server;
pub mod webhook;

pub use health::HealthResponse;
pub use request::{RequestIdExt, UuidRequestId, X_REQUEST_ID};
pub use server::{create_router, AppState, HttpServer, ServerError, HEALTH_PATH, WEBHOOK_PATH};
pub use webhook::{decode_webhook, ConfluenceWebhook, Page, WebhookError};
