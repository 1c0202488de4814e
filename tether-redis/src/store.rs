//! Redis-backed [`SessionStore`].

use std::time::Duration;

use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use tracing::{debug, info};
use url::Url;

use tether_core::session::SessionId;
use tether_core::store::{SessionStore, StoreError};

use crate::config::RedisConfig;
use crate::error::RedisStoreError;

/// Value written as the liveness marker. Only key presence matters.
const LIVENESS_MARKER: &str = "1";

/// [`SessionStore`] backed by Redis with native TTL expiry.
///
/// Keys are `<prefix><session-id>`; the value is an opaque marker. The
/// connection manager reconnects on its own, so every operation stays a
/// single attempt from the caller's point of view.
#[derive(Clone)]
pub struct RedisSessionStore {
    manager: ConnectionManager,
    key_prefix: String,
}

impl RedisSessionStore {
    /// Connect to the configured endpoint.
    ///
    /// Validates the URL scheme (`redis` or `rediss`; the latter turns TLS
    /// on) before the first connection attempt.
    pub async fn connect(config: RedisConfig) -> Result<Self, RedisStoreError> {
        let parsed = Url::parse(&config.url).map_err(|e| RedisStoreError::InvalidEndpoint {
            url: config.url.clone(),
            reason: e.to_string(),
        })?;
        match parsed.scheme() {
            "redis" | "rediss" => {}
            other => {
                return Err(RedisStoreError::InvalidEndpoint {
                    url: config.url.clone(),
                    reason: format!("unsupported scheme '{}'", other),
                });
            }
        }

        let client = redis::Client::open(config.url.as_str())?;
        let manager = client.get_connection_manager().await?;
        info!(
            host = %parsed.host_str().unwrap_or("unknown"),
            tls = config.uses_tls(),
            "connected to session store"
        );

        Ok(Self {
            manager,
            key_prefix: config.key_prefix,
        })
    }

    fn key(&self, id: &SessionId) -> String {
        format!("{}{}", self.key_prefix, id)
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn put(&self, id: &SessionId, ttl: Duration) -> Result<(), StoreError> {
        let mut con = self.manager.clone();
        let _: () = con
            .set_ex(self.key(id), LIVENESS_MARKER, ttl.as_secs())
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        debug!(session_id = %id, ttl_secs = ttl.as_secs(), "session recorded");
        Ok(())
    }

    async fn exists(&self, id: &SessionId) -> Result<bool, StoreError> {
        let mut con = self.manager.clone();
        con.exists(self.key(id))
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))
    }

    async fn refresh(&self, id: &SessionId, ttl: Duration) -> Result<(), StoreError> {
        let mut con = self.manager.clone();
        // EXPIRE on a missing key answers false; that is the documented
        // no-op, not an error.
        let _: bool = con
            .expire(self.key(id), ttl.as_secs() as i64)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Ok(())
    }

    async fn delete(&self, id: &SessionId) -> Result<(), StoreError> {
        let mut con = self.manager.clone();
        let _: () = con
            .del(self.key(id))
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        debug!(session_id = %id, "session record deleted");
        Ok(())
    }
}
