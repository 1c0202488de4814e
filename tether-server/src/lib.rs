//! tether-server - HTTP server bridging SSE push channels and call routing
//!
//! This crate owns the axum layer over `tether-core`: a stream-open
//! endpoint that issues a session and holds its SSE push channel, a call
//! endpoint that routes protocol messages by session id, and a health
//! endpoint. The embedding application supplies the
//! [`ProtocolEndpoint`](tether_core::ProtocolEndpoint) and the
//! [`SessionStore`](tether_core::SessionStore).

mod error;
pub mod http;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;

pub use error::ServerError;
pub use http::create_router;
pub use state::AppState;

/// The main tether server
pub struct TetherServer {
    config: ServerConfig,
    state: Arc<AppState>,
}

impl TetherServer {
    /// Create a server over the given state
    pub fn with_state(config: ServerConfig, state: Arc<AppState>) -> Self {
        Self { config, state }
    }

    /// Get the server configuration
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Get the shared application state
    pub fn state(&self) -> Arc<AppState> {
        Arc::clone(&self.state)
    }

    /// Run the server, binding to the configured address
    pub async fn run(self) -> Result<(), ServerError> {
        let addr = self.config.addr();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| ServerError::Bind {
                addr: addr.clone(),
                source: e,
            })?;

        tracing::info!("tether server listening on {}", addr);
        self.run_with_listener(listener).await
    }

    /// Run the server on an already-bound listener (used by tests)
    pub async fn run_with_listener(self, listener: TcpListener) -> Result<(), ServerError> {
        let router = create_router(self.state);
        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .map_err(|e| ServerError::Internal(e.to_string()))?;

        Ok(())
    }
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host address to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 7447,
        }
    }
}

impl ServerConfig {
    /// Create a new ServerConfig with the specified host and port
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Returns the socket address string (e.g., "127.0.0.1:7447")
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
