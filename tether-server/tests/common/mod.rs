//! Shared test utilities for tether-server integration tests

use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures::{Stream, StreamExt};
use serde_json::{Value, json};
use tokio::net::TcpListener;

use tether_core::{
    Frame, MemorySessionStore, ProtocolEndpoint, ProtocolError, SessionConfig, SessionStore,
    StreamTransport,
};
use tether_server::{AppState, ServerConfig, TetherServer};

/// Test endpoint: answers `ping` with a pong ack; any other payload is
/// echoed back down the push channel and acknowledged with the bare
/// success marker.
pub struct TestEndpoint;

#[async_trait]
impl ProtocolEndpoint for TestEndpoint {
    async fn handle(
        &self,
        transport: &StreamTransport,
        payload: Bytes,
    ) -> Result<Option<Value>, ProtocolError> {
        let text = std::str::from_utf8(&payload)
            .map_err(|e| ProtocolError::InvalidPayload(e.to_string()))?;
        if text == "ping" {
            return Ok(Some(json!({"pong": true})));
        }
        transport
            .send(Frame::message(text))
            .await
            .map_err(|e| ProtocolError::Handler(e.to_string()))?;
        Ok(None)
    }
}

/// Creates a test server with its own in-memory store
#[allow(dead_code)]
pub async fn create_test_server() -> (Arc<AppState>, SocketAddr) {
    let store: Arc<dyn SessionStore> = Arc::new(MemorySessionStore::new());
    create_test_server_with_store(store).await
}

/// Creates a test server over a shared store (for cross-instance tests)
#[allow(dead_code)]
pub async fn create_test_server_with_store(
    store: Arc<dyn SessionStore>,
) -> (Arc<AppState>, SocketAddr) {
    create_test_server_with_config(store, SessionConfig::default()).await
}

/// Creates a test server with custom session config
#[allow(dead_code)]
pub async fn create_test_server_with_config(
    store: Arc<dyn SessionStore>,
    config: SessionConfig,
) -> (Arc<AppState>, SocketAddr) {
    let state = Arc::new(AppState::new(store, Arc::new(TestEndpoint), config));
    let server = TetherServer::with_state(ServerConfig::default(), Arc::clone(&state));
    let state = server.state();
    let addr = spawn_server(server).await;
    (state, addr)
}

/// Spawns server in background task, returns bound address
async fn spawn_server(server: TetherServer) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let _ = server.run_with_listener(listener).await;
    });

    // Brief delay to ensure server is accepting connections
    tokio::time::sleep(Duration::from_millis(10)).await;

    addr
}

/// POST one protocol message, returning (status, body)
#[allow(dead_code)]
pub async fn call(addr: SocketAddr, session_id: &str, payload: &str) -> (u16, Value) {
    let client = reqwest::Client::new();
    let response = client
        .post(format!("http://{addr}/messages"))
        .query(&[("sessionId", session_id)])
        .body(payload.to_string())
        .send()
        .await
        .unwrap();
    let status = response.status().as_u16();
    let body = response.json().await.unwrap();
    (status, body)
}

/// Incremental reader over an open SSE response
pub struct SseReader {
    stream: Pin<Box<dyn Stream<Item = reqwest::Result<Bytes>> + Send>>,
    buffer: String,
}

#[allow(dead_code)]
impl SseReader {
    /// Open the push channel on `addr`
    pub async fn connect(addr: SocketAddr) -> Self {
        let response = reqwest::get(format!("http://{addr}/sse")).await.unwrap();
        assert_eq!(response.status(), 200);
        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        assert!(
            content_type.starts_with("text/event-stream"),
            "unexpected content type: {content_type}"
        );

        Self {
            stream: response.bytes_stream().boxed(),
            buffer: String::new(),
        }
    }

    /// Next complete event as (event name, data), skipping keep-alives
    pub async fn next_event(&mut self) -> (Option<String>, String) {
        loop {
            if let Some(pos) = self.buffer.find("\n\n") {
                let raw: String = self.buffer.drain(..pos + 2).collect();
                let mut event = None;
                let mut data = Vec::new();
                for line in raw.lines() {
                    if let Some(rest) = line.strip_prefix("event:") {
                        event = Some(rest.trim().to_string());
                    } else if let Some(rest) = line.strip_prefix("data:") {
                        data.push(rest.strip_prefix(' ').unwrap_or(rest).to_string());
                    }
                }
                // A block with neither field is a keep-alive comment.
                if event.is_none() && data.is_empty() {
                    continue;
                }
                return (event, data.join("\n"));
            }

            let chunk = tokio::time::timeout(Duration::from_secs(5), self.stream.next())
                .await
                .expect("timed out waiting for SSE data")
                .expect("SSE stream ended")
                .unwrap();
            self.buffer.push_str(std::str::from_utf8(&chunk).unwrap());
        }
    }

    /// Read the initial `endpoint` event and extract the session id
    pub async fn session_id(&mut self) -> String {
        let (event, data) = self.next_event().await;
        assert_eq!(event.as_deref(), Some("endpoint"));
        data.split("sessionId=")
            .nth(1)
            .expect("endpoint event must carry a sessionId")
            .to_string()
    }
}
