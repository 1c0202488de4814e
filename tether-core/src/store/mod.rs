//! Shared session-existence store contract.

mod memory;

pub use memory::MemorySessionStore;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::session::SessionId;

/// Errors from the shared store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing store could not be reached or answered with an error.
    #[error("session store unavailable: {0}")]
    Unavailable(String),
}

/// TTL-keyed session-existence record, visible to every process instance.
///
/// Presence of a record means "a transport for this session existed
/// somewhere recently"; it says nothing about reachability from the
/// current process, which only the local
/// [`SessionRegistry`](crate::SessionRegistry) decides. Every operation is
/// a single best-effort network call;
/// callers decide whether a failure is fatal (the existence check on the
/// routing path) or merely logged (refresh, delete).
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Create the liveness record with the given time-to-live.
    async fn put(&self, id: &SessionId, ttl: Duration) -> Result<(), StoreError>;

    /// Whether a record for this session currently exists.
    async fn exists(&self, id: &SessionId) -> Result<bool, StoreError>;

    /// Extend the record's time-to-live. A missing record is a no-op.
    async fn refresh(&self, id: &SessionId, ttl: Duration) -> Result<(), StoreError>;

    /// Remove the record. A missing record is a no-op.
    async fn delete(&self, id: &SessionId) -> Result<(), StoreError>;
}
