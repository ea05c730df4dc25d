//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming TCP connection
//!     → listener.rs (accept loop, connection limits)
//!     → connection.rs (open-connection count, idle detection)
//!     → Hand off to HTTP layer
//! ```
//!
//! # Design Decisions
//! - Bounded accept queue prevents resource exhaustion
//! - Each connection tracked for graceful shutdown
//! - Idle keep-alive connections are closed from the server side

pub mod connection;
pub mod listener;

pub use connection::{ActivityGuard, ConnectionGuard, ConnectionId, ConnectionTracker, IdleTimer};
pub use listener::{ConnectionPermit, Listener, ListenerError};
