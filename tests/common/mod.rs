//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::DateTime;
use confluence_hook::config::ServerConfig;
use confluence_hook::http::{AppState, HttpServer, ServerError};
use confluence_hook::lifecycle::Shutdown;
use confluence_hook::net::Listener;
use confluence_hook::observability::{FixedClock, Level, Logger, MemoryWriter, Terminator};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

pub const FIXED_TIME: &str = "2024-05-06T07:08:09.010Z";

pub fn fixed_clock() -> FixedClock {
    FixedClock(DateTime::parse_from_rfc3339(FIXED_TIME).unwrap())
}

/// Logger capturing output in memory, without caller tokens.
pub fn memory_logger(level: Level) -> (Logger, MemoryWriter) {
    let out = MemoryWriter::new();
    let logger = Logger::builder()
        .level(level)
        .writer(out.clone())
        .caller(false)
        .clock(fixed_clock())
        .build();
    (logger, out)
}

/// Records exit codes instead of ending the test process.
#[derive(Debug, Default)]
pub struct RecordingTerminator {
    codes: Mutex<Vec<i32>>,
}

impl RecordingTerminator {
    pub fn codes(&self) -> Vec<i32> {
        self.codes.lock().unwrap().clone()
    }
}

impl Terminator for RecordingTerminator {
    fn terminate(&self, code: i32) {
        self.codes.lock().unwrap().push(code);
    }
}

pub fn recording_terminator() -> Arc<RecordingTerminator> {
    Arc::new(RecordingTerminator::default())
}

/// A server running on an ephemeral local port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub output: MemoryWriter,
    pub handle: JoinHandle<Result<(), ServerError>>,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Trigger shutdown and wait for the serving task.
    pub async fn stop(self) -> Result<(), ServerError> {
        self.shutdown.trigger();
        tokio::time::timeout(Duration::from_secs(10), self.handle)
            .await
            .expect("server did not stop")
            .expect("server task panicked")
    }
}

pub async fn start_server(config: ServerConfig) -> TestServer {
    let (logger, output) = memory_logger(Level::Debug);
    let tcp = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = tcp.local_addr().unwrap();
    let listener = Listener::from_tcp(tcp, config.max_connections);

    let shutdown = Shutdown::new();
    let server = HttpServer::with_state(config, AppState::with_clock(logger, fixed_clock()));
    let handle = tokio::spawn(server.run(listener, shutdown.subscribe()));

    TestServer {
        addr,
        shutdown,
        output,
        handle,
    }
}

/// Wait until `check` holds or the timeout passes.
pub async fn eventually<F: Fn() -> bool>(check: F) -> bool {
    for _ in 0..100 {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    check()
}
