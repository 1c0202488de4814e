//! Session lifecycle: open a stream, wire its teardown path, watch for
//! peer disconnect.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::endpoint::ProtocolEndpoint;
use crate::registry::{RegistryError, SessionRegistry};
use crate::session::SessionId;
use crate::store::SessionStore;
use crate::transport::{Frame, StreamTransport};

/// Tunables for newly opened sessions.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Time-to-live for the shared store record. Also applied on every
    /// successful-call refresh.
    pub ttl: Duration,
    /// Outbound frame buffer capacity per transport.
    pub frame_buffer: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(3600),
            frame_buffer: 64,
        }
    }
}

impl SessionConfig {
    /// Create a config with a custom TTL.
    #[must_use]
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Create a config with a custom frame buffer capacity.
    #[must_use]
    pub fn with_frame_buffer(mut self, frame_buffer: usize) -> Self {
        self.frame_buffer = frame_buffer;
        self
    }
}

/// A freshly opened session: the transport plus the consumer end of its
/// frame channel.
pub struct OpenSession {
    /// The id issued for this session.
    pub id: SessionId,
    /// The transport bound to the session.
    pub transport: Arc<StreamTransport>,
    /// Outbound frames to relay down the push channel.
    pub frames: mpsc::Receiver<Frame>,
}

/// Opens sessions and wires their teardown path.
///
/// On open: allocate an id, register the transport locally, record the
/// session in the shared store, and arm the disconnect watch. On teardown
/// (explicit close, write failure, or peer disconnect) the registered
/// callback removes the local binding and deletes the shared record, each
/// best-effort, both always attempted.
pub struct SessionManager {
    registry: Arc<SessionRegistry>,
    store: Arc<dyn SessionStore>,
    endpoint: Arc<dyn ProtocolEndpoint>,
    config: SessionConfig,
}

impl SessionManager {
    /// Create a manager over the given registry, store, and endpoint.
    pub fn new(
        registry: Arc<SessionRegistry>,
        store: Arc<dyn SessionStore>,
        endpoint: Arc<dyn ProtocolEndpoint>,
        config: SessionConfig,
    ) -> Self {
        Self {
            registry,
            store,
            endpoint,
            config,
        }
    }

    /// Open a new session.
    pub async fn open_session(&self) -> Result<OpenSession, RegistryError> {
        let id = SessionId::generate();
        let (transport, frames) = StreamTransport::open(
            id.clone(),
            Arc::clone(&self.endpoint),
            self.config.frame_buffer,
        );

        let registry = Arc::clone(&self.registry);
        let store = Arc::clone(&self.store);
        let teardown_id = id.clone();
        transport
            .set_teardown(Box::new(move |reason| {
                Box::pin(async move {
                    registry.remove(&teardown_id).await;
                    if let Err(e) = store.delete(&teardown_id).await {
                        warn!(
                            session_id = %teardown_id,
                            error = %e,
                            "store delete during teardown failed, record left to TTL expiry"
                        );
                    }
                    info!(session_id = %teardown_id, ?reason, "session closed");
                })
            }))
            .await;

        self.registry
            .register(id.clone(), Arc::clone(&transport))
            .await?;

        if let Err(e) = self.store.put(&id, self.config.ttl).await {
            warn!(session_id = %id, error = %e, "failed to record session in shared store");
        }

        transport.spawn_disconnect_watch().await;

        info!(session_id = %id, "session opened");
        Ok(OpenSession {
            id,
            transport,
            frames,
        })
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use bytes::Bytes;
    use serde_json::Value;

    use super::*;
    use crate::endpoint::ProtocolError;
    use crate::session::CloseReason;
    use crate::store::MemorySessionStore;

    struct NoopEndpoint;

    #[async_trait]
    impl ProtocolEndpoint for NoopEndpoint {
        async fn handle(
            &self,
            _transport: &StreamTransport,
            _payload: Bytes,
        ) -> Result<Option<Value>, ProtocolError> {
            Ok(None)
        }
    }

    struct Fixture {
        registry: Arc<SessionRegistry>,
        store: Arc<MemorySessionStore>,
        manager: SessionManager,
    }

    fn fixture() -> Fixture {
        let registry = Arc::new(SessionRegistry::new());
        let store = Arc::new(MemorySessionStore::new());
        let manager = SessionManager::new(
            Arc::clone(&registry),
            Arc::clone(&store) as Arc<dyn SessionStore>,
            Arc::new(NoopEndpoint),
            SessionConfig::default(),
        );
        Fixture {
            registry,
            store,
            manager,
        }
    }

    #[tokio::test]
    async fn open_session_registers_locally_and_in_store() {
        let fx = fixture();

        let session = fx.manager.open_session().await.unwrap();

        assert!(fx.registry.lookup(&session.id).await.is_some());
        assert!(fx.store.exists(&session.id).await.unwrap());
    }

    #[tokio::test]
    async fn open_sessions_get_distinct_ids() {
        let fx = fixture();

        let a = fx.manager.open_session().await.unwrap();
        let b = fx.manager.open_session().await.unwrap();

        assert_ne!(a.id, b.id);
        assert_eq!(fx.registry.count().await, 2);
    }

    #[tokio::test]
    async fn explicit_close_clears_both_records() {
        let fx = fixture();
        let session = fx.manager.open_session().await.unwrap();

        session.transport.close(CloseReason::Explicit).await;

        assert!(fx.registry.lookup(&session.id).await.is_none());
        assert!(!fx.store.exists(&session.id).await.unwrap());
    }

    #[tokio::test]
    async fn dropping_the_frame_consumer_tears_the_session_down() {
        let fx = fixture();
        let session = fx.manager.open_session().await.unwrap();
        let id = session.id.clone();

        drop(session.frames);
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert!(fx.registry.lookup(&id).await.is_none());
        assert!(!fx.store.exists(&id).await.unwrap());
    }

    #[tokio::test]
    async fn write_failure_tears_the_session_down() {
        let registry = Arc::new(SessionRegistry::new());
        let store = Arc::new(MemorySessionStore::new());
        let manager = SessionManager::new(
            Arc::clone(&registry),
            Arc::clone(&store) as Arc<dyn SessionStore>,
            Arc::new(NoopEndpoint),
            SessionConfig::default().with_frame_buffer(1),
        );
        let session = manager.open_session().await.unwrap();

        // Fill the buffer without draining, then overflow it.
        session.transport.send(Frame::message("a")).await.unwrap();
        let result = session.transport.send(Frame::message("b")).await;
        assert!(result.is_err());

        assert!(registry.lookup(&session.id).await.is_none());
        assert!(!store.exists(&session.id).await.unwrap());
    }
}
