//! Configuration for the Redis session store.

use serde::{Deserialize, Serialize};

/// Key prefix for session liveness records.
pub const DEFAULT_KEY_PREFIX: &str = "mcp_session:";

/// Configuration for [`RedisSessionStore`](crate::RedisSessionStore).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisConfig {
    /// Connection endpoint, `redis://` or `rediss://`. The `rediss` scheme
    /// turns TLS on.
    pub url: String,

    /// Prefix prepended to every session key.
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
}

fn default_key_prefix() -> String {
    DEFAULT_KEY_PREFIX.to_string()
}

impl RedisConfig {
    /// Create a config for the given endpoint with the default key prefix.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            key_prefix: default_key_prefix(),
        }
    }

    /// Create a config with a custom key prefix.
    #[must_use]
    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = prefix.into();
        self
    }

    /// Whether the endpoint scheme asks for TLS.
    #[must_use]
    pub fn uses_tls(&self) -> bool {
        self.url.starts_with("rediss://")
    }
}
