//! In-memory session store with lazy TTL expiry.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::time::Instant;

use super::{SessionStore, StoreError};
use crate::session::SessionId;

/// In-process [`SessionStore`] for tests and single-instance deployments.
///
/// Entries expire lazily: a record past its deadline reads as absent and is
/// dropped on the next access. There is no sweeper task.
#[derive(Default)]
pub struct MemorySessionStore {
    entries: Mutex<HashMap<SessionId, Instant>>,
}

impl MemorySessionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of unexpired records.
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.lock().await;
        entries.retain(|_, deadline| *deadline > now);
        entries.len()
    }

    /// Whether the store holds no unexpired records.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn put(&self, id: &SessionId, ttl: Duration) -> Result<(), StoreError> {
        self.entries
            .lock()
            .await
            .insert(id.clone(), Instant::now() + ttl);
        Ok(())
    }

    async fn exists(&self, id: &SessionId) -> Result<bool, StoreError> {
        let mut entries = self.entries.lock().await;
        match entries.get(id) {
            Some(deadline) if *deadline > Instant::now() => Ok(true),
            Some(_) => {
                entries.remove(id);
                Ok(false)
            }
            None => Ok(false),
        }
    }

    async fn refresh(&self, id: &SessionId, ttl: Duration) -> Result<(), StoreError> {
        let now = Instant::now();
        let mut entries = self.entries.lock().await;
        if let Some(deadline) = entries.get_mut(id) {
            if *deadline > now {
                *deadline = now + ttl;
            }
        }
        Ok(())
    }

    async fn delete(&self, id: &SessionId) -> Result<(), StoreError> {
        self.entries.lock().await.remove(id);
        Ok(())
    }
}
