//! Process-local session registry.
//!
//! The registry is the only authority on whether a transport is reachable
//! from this process instance. It holds no persistent state: a restart
//! empties it, which is what makes the cross-instance mismatch an expected
//! failure mode rather than a bug. Construct one at process start and
//! inject it wherever it is needed; it is deliberately not a global.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::RwLock;
use tracing::debug;

use crate::session::SessionId;
use crate::transport::StreamTransport;

/// Errors from registry mutation.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A transport is already bound to this id. Ids carry UUID entropy, so
    /// a collision is an invariant violation, not a retryable condition.
    #[error("session already registered: {0}")]
    DuplicateSession(SessionId),
}

/// Process-wide map from session id to live transport.
#[derive(Default)]
pub struct SessionRegistry {
    transports: RwLock<HashMap<SessionId, Arc<StreamTransport>>>,
}

impl SessionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `transport` to `id`.
    pub async fn register(
        &self,
        id: SessionId,
        transport: Arc<StreamTransport>,
    ) -> Result<(), RegistryError> {
        let mut transports = self.transports.write().await;
        match transports.entry(id) {
            Entry::Occupied(entry) => Err(RegistryError::DuplicateSession(entry.key().clone())),
            Entry::Vacant(entry) => {
                debug!(session_id = %entry.key(), "transport registered");
                entry.insert(transport);
                Ok(())
            }
        }
    }

    /// Look up the transport for `id`.
    ///
    /// Absence is a normal outcome: the session may live on another
    /// instance, or may never have existed.
    pub async fn lookup(&self, id: &SessionId) -> Option<Arc<StreamTransport>> {
        self.transports.read().await.get(id).cloned()
    }

    /// Erase the binding for `id`. Safe to call when absent.
    pub async fn remove(&self, id: &SessionId) {
        if self.transports.write().await.remove(id).is_some() {
            debug!(session_id = %id, "transport removed");
        }
    }

    /// Number of registered transports.
    pub async fn count(&self) -> usize {
        self.transports.read().await.len()
    }
}
