//! Shared application state for the tether server

use std::sync::Arc;
use std::time::{Duration, Instant};

use tether_core::{
    MessageRouter, ProtocolEndpoint, SessionConfig, SessionManager, SessionRegistry, SessionStore,
};

/// Shared application state accessible by all handlers
///
/// Owns the process-local registry, the session manager, and the router.
/// Constructed once at startup and injected into the axum router; nothing
/// here is reachable through a global.
pub struct AppState {
    /// Opens sessions and wires their teardown
    pub sessions: SessionManager,
    /// Process-local transport registry
    pub registry: Arc<SessionRegistry>,
    /// Routes inbound calls to transports
    pub router: MessageRouter,
    /// Interval between SSE keep-alive comments
    sse_keep_alive: Duration,
    /// When the server started
    started_at: Instant,
}

impl AppState {
    /// Create state over the given store and endpoint
    pub fn new(
        store: Arc<dyn SessionStore>,
        endpoint: Arc<dyn ProtocolEndpoint>,
        config: SessionConfig,
    ) -> Self {
        let registry = Arc::new(SessionRegistry::new());
        let router = MessageRouter::new(Arc::clone(&registry), Arc::clone(&store), config.ttl);
        let sessions = SessionManager::new(Arc::clone(&registry), store, endpoint, config);

        Self {
            sessions,
            registry,
            router,
            sse_keep_alive: Duration::from_secs(15),
            started_at: Instant::now(),
        }
    }

    /// Override the SSE keep-alive interval
    ///
    /// A dead peer only surfaces when a write fails; the keep-alive
    /// guarantees a periodic write on otherwise idle streams.
    #[must_use]
    pub fn with_sse_keep_alive(mut self, interval: Duration) -> Self {
        self.sse_keep_alive = interval;
        self
    }

    /// Interval between SSE keep-alive comments
    pub fn sse_keep_alive(&self) -> Duration {
        self.sse_keep_alive
    }

    /// Returns how long the server has been running
    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
