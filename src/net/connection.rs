//! Connection lifecycle tracking.
//!
//! # Responsibilities
//! - Generate unique connection IDs for log correlation
//! - Count open connections so shutdown can wait for the drain
//! - Mirror the open count into the `http_active_connections` gauge
//! - Detect idle keep-alive connections

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::time::Instant;

use crate::observability::metrics;

/// Global atomic counter for connection IDs.
/// Relaxed ordering is enough: only uniqueness matters.
static CONNECTION_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    pub fn new() -> Self {
        Self(CONNECTION_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Tracks open connections for graceful shutdown.
#[derive(Debug, Clone, Default)]
pub struct ConnectionTracker {
    active_count: Arc<AtomicU64>,
}

impl ConnectionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new connection. The count drops when the guard does.
    pub fn track(&self) -> ConnectionGuard {
        let open = self.active_count.fetch_add(1, Ordering::SeqCst) + 1;
        metrics::record_active_connections(open);
        ConnectionGuard {
            active_count: Arc::clone(&self.active_count),
            id: ConnectionId::new(),
        }
    }

    pub fn active_count(&self) -> u64 {
        self.active_count.load(Ordering::SeqCst)
    }

    /// Resolve once no connection is open.
    pub async fn wait_idle(&self) {
        while self.active_count.load(Ordering::SeqCst) > 0 {
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
    }
}

/// Guard that tracks a connection's lifetime.
#[derive(Debug)]
pub struct ConnectionGuard {
    active_count: Arc<AtomicU64>,
    id: ConnectionId,
}

impl ConnectionGuard {
    pub fn id(&self) -> ConnectionId {
        self.id
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        let open = self.active_count.fetch_sub(1, Ordering::SeqCst) - 1;
        metrics::record_active_connections(open);
    }
}

/// Per-connection idle detection.
///
/// A connection is idle when no request is in flight and none has started
/// or finished for `timeout`.
#[derive(Debug, Clone)]
pub struct IdleTimer {
    state: Arc<IdleState>,
    timeout: Duration,
}

#[derive(Debug)]
struct IdleState {
    in_flight: AtomicUsize,
    last_activity: Mutex<Instant>,
}

impl IdleTimer {
    pub fn new(timeout: Duration) -> Self {
        Self {
            state: Arc::new(IdleState {
                in_flight: AtomicUsize::new(0),
                last_activity: Mutex::new(Instant::now()),
            }),
            timeout,
        }
    }

    /// Mark a request as started; it ends when the guard is dropped.
    pub fn begin(&self) -> ActivityGuard {
        self.state.in_flight.fetch_add(1, Ordering::SeqCst);
        self.state.touch();
        ActivityGuard {
            state: Arc::clone(&self.state),
        }
    }

    pub fn in_flight(&self) -> usize {
        self.state.in_flight.load(Ordering::SeqCst)
    }

    /// Resolve once the connection has been idle for the full timeout.
    pub async fn expired(&self) {
        loop {
            let deadline = self.state.last_activity() + self.timeout;
            tokio::time::sleep_until(deadline).await;

            if self.in_flight() > 0 {
                tokio::time::sleep(self.timeout).await;
                continue;
            }
            if self.state.last_activity().elapsed() >= self.timeout {
                return;
            }
        }
    }
}

impl IdleState {
    fn touch(&self) {
        let mut last = self.last_activity.lock().unwrap_or_else(|e| e.into_inner());
        *last = Instant::now();
    }

    fn last_activity(&self) -> Instant {
        *self.last_activity.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Held while a request is being served.
#[derive(Debug)]
pub struct ActivityGuard {
    state: Arc<IdleState>,
}

impl Drop for ActivityGuard {
    fn drop(&mut self) {
        self.state.touch();
        self.state.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}
