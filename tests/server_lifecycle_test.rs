//! Serving over real sockets, idle handling and graceful shutdown.

use std::time::Duration;

use confluence_hook::config::ServerConfig;
use confluence_hook::http::{HealthResponse, ServerError};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

mod common;

#[tokio::test]
async fn serves_both_endpoints_and_stops_cleanly() {
    let server = common::start_server(ServerConfig::default()).await;
    let client = reqwest::Client::new();

    let health: HealthResponse = client
        .get(server.url("/health"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health.status, "healthy");

    let res = client
        .post(server.url("/webhook/confluence"))
        .json(&serde_json::json!({
            "event": "page_created",
            "page": { "id": 123, "title": "Test Page" }
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::OK);
    assert_eq!(res.text().await.unwrap(), "Webhook processed");

    let res = client
        .post(server.url("/webhook/confluence"))
        .body("{broken")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::BAD_REQUEST);

    drop(client);
    let addr = server.addr;
    let output = server.output.clone();
    server.stop().await.unwrap();

    let logs = output.contents();
    assert!(logs.contains("[INFO] Confluence event received"));
    assert!(logs.contains("page_id=123 page_title=Test Page"));
    assert!(logs.contains("[INFO] Draining connections"));
    assert!(logs.contains("[INFO] HTTP server stopped"));

    assert!(TcpStream::connect(addr).await.is_err(), "listener must be closed");
}

#[tokio::test]
async fn idle_keep_alive_connection_is_closed() {
    let config = ServerConfig {
        idle_timeout: Duration::from_millis(200),
        ..ServerConfig::default()
    };
    let server = common::start_server(config).await;

    let mut stream = TcpStream::connect(server.addr).await.unwrap();
    stream
        .write_all(b"GET /health HTTP/1.1\r\nHost: localhost\r\n\r\n")
        .await
        .unwrap();

    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    while !buf.ends_with(b"}") {
        let n = stream.read(&mut chunk).await.unwrap();
        assert!(n > 0, "connection closed before the response");
        buf.extend_from_slice(&chunk[..n]);
    }
    assert!(String::from_utf8_lossy(&buf).starts_with("HTTP/1.1 200 OK"));

    let closed = tokio::time::timeout(Duration::from_secs(5), stream.read(&mut chunk))
        .await
        .expect("idle connection was not closed");
    assert_eq!(closed.unwrap_or(0), 0);

    assert!(
        common::eventually(|| server.output.contents().contains("Closing idle connection")).await
    );
    server.stop().await.unwrap();
}

#[tokio::test]
async fn shutdown_closes_open_idle_connections() {
    let config = ServerConfig {
        idle_timeout: Duration::from_secs(120),
        shutdown_timeout: Duration::from_secs(2),
        ..ServerConfig::default()
    };
    let server = common::start_server(config).await;

    let mut stream = TcpStream::connect(server.addr).await.unwrap();
    stream
        .write_all(b"GET /health HTTP/1.1\r\nHost: localhost\r\n\r\n")
        .await
        .unwrap();
    let mut chunk = [0u8; 1024];
    let n = stream.read(&mut chunk).await.unwrap();
    assert!(n > 0);

    server.stop().await.unwrap();
}

const DRAIN_BODY: &str = r#"{"event":"page_updated","page":{"id":4,"title":"Draining"}}"#;

/// Send the request head and the first bytes of the body, leaving the
/// request in flight.
async fn start_partial_webhook(server: &common::TestServer) -> TcpStream {
    let mut stream = TcpStream::connect(server.addr).await.unwrap();
    let head = format!(
        "POST /webhook/confluence HTTP/1.1\r\nHost: localhost\r\n\
         Content-Type: application/json\r\nContent-Length: {}\r\n\r\n{}",
        DRAIN_BODY.len(),
        &DRAIN_BODY[..10]
    );
    stream.write_all(head.as_bytes()).await.unwrap();
    tokio::time::sleep(Duration::from_millis(200)).await;
    stream
}

#[tokio::test]
async fn in_flight_request_completes_during_drain() {
    let config = ServerConfig {
        shutdown_timeout: Duration::from_secs(5),
        ..ServerConfig::default()
    };
    let server = common::start_server(config).await;
    let mut stream = start_partial_webhook(&server).await;

    server.shutdown.trigger();
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(!server.handle.is_finished(), "drain must wait for the open request");
    assert!(TcpStream::connect(server.addr).await.is_err(), "no new connections while draining");

    stream.write_all(DRAIN_BODY[10..].as_bytes()).await.unwrap();

    let mut response = Vec::new();
    tokio::time::timeout(Duration::from_secs(5), stream.read_to_end(&mut response))
        .await
        .expect("connection was not closed after the response")
        .unwrap();
    let response = String::from_utf8_lossy(&response);
    assert!(response.starts_with("HTTP/1.1 200 OK"), "{response}");
    assert!(response.ends_with("Webhook processed"), "{response}");

    let output = server.output.clone();
    server.stop().await.unwrap();
    assert!(output.contents().contains("page_id=4 page_title=Draining"));
}

#[tokio::test]
async fn drain_deadline_reports_remaining_connections() {
    let config = ServerConfig {
        shutdown_timeout: Duration::from_millis(300),
        ..ServerConfig::default()
    };
    let server = common::start_server(config).await;
    let _stream = start_partial_webhook(&server).await;

    let output = server.output.clone();
    let result = server.stop().await;

    assert!(
        matches!(result, Err(ServerError::DrainTimeout { remaining: 1 })),
        "{result:?}"
    );
    assert!(output.contents().contains("Drain deadline exceeded remaining=1"));
}
