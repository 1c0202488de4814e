//! Message router: correlates an inbound call to its local transport.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::endpoint::ProtocolError;
use crate::registry::SessionRegistry;
use crate::session::SessionId;
use crate::store::{SessionStore, StoreError};
use crate::transport::ForwardError;

/// Errors surfaced by [`MessageRouter::route`].
#[derive(Debug, Error)]
pub enum RouterError {
    /// The request carried no usable session id.
    #[error("missing or empty session id")]
    Validation,

    /// The session is absent from the shared store: it never existed, was
    /// torn down, or its TTL ran out.
    #[error("unknown or expired session: {0}")]
    SessionExpired(SessionId),

    /// The session exists in the shared store but has no transport in this
    /// process: the cross-instance mismatch. Kept distinct from
    /// [`RouterError::SessionExpired`] so operators can tell "unknown
    /// session" from "wrong instance".
    #[error("no local transport for session: {0}")]
    TransportUnreachable(SessionId),

    /// The endpoint rejected or failed on the message. The session
    /// survives; only this call fails.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The shared store could not answer the existence check. Routing on an
    /// unknown store state is refused rather than treated as "not found".
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result of a successfully routed call.
#[derive(Debug, Clone, PartialEq)]
pub struct RouterOutcome {
    /// The endpoint's synchronous acknowledgment, when it produced one.
    pub ack: Option<Value>,
}

/// Validates an inbound call against the shared store, resolves the
/// transport locally, and forwards the payload.
pub struct MessageRouter {
    registry: Arc<SessionRegistry>,
    store: Arc<dyn SessionStore>,
    ttl: Duration,
}

impl MessageRouter {
    /// Create a router over `registry` and `store`. `ttl` is applied on
    /// every successful-call refresh.
    pub fn new(registry: Arc<SessionRegistry>, store: Arc<dyn SessionStore>, ttl: Duration) -> Self {
        Self {
            registry,
            store,
            ttl,
        }
    }

    /// Route one protocol message to the session's transport.
    pub async fn route(
        &self,
        session_id: &str,
        payload: Bytes,
    ) -> Result<RouterOutcome, RouterError> {
        let session_id = session_id.trim();
        if session_id.is_empty() {
            return Err(RouterError::Validation);
        }
        let id = SessionId::from(session_id);

        if !self.store.exists(&id).await? {
            return Err(RouterError::SessionExpired(id));
        }

        // Detached best-effort TTL refresh; failure is logged, never
        // surfaced, and never blocks the call.
        let store = Arc::clone(&self.store);
        let refresh_id = id.clone();
        let ttl = self.ttl;
        tokio::spawn(async move {
            if let Err(e) = store.refresh(&refresh_id, ttl).await {
                warn!(session_id = %refresh_id, error = %e, "session TTL refresh failed");
            }
        });

        let transport = self
            .registry
            .lookup(&id)
            .await
            .ok_or_else(|| RouterError::TransportUnreachable(id.clone()))?;

        match transport.forward(payload).await {
            Ok(ack) => {
                debug!(session_id = %id, "call routed");
                Ok(RouterOutcome { ack })
            }
            // A transport caught mid-teardown reads the same as one that was
            // never here: the call is rejected, not queued.
            Err(ForwardError::Closed) => Err(RouterError::TransportUnreachable(id)),
            Err(ForwardError::Endpoint(e)) => Err(RouterError::Protocol(e)),
        }
    }
}
