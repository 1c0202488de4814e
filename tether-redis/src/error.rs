//! Error types for the Redis session store.

use thiserror::Error;

/// Errors from connecting to or talking to Redis.
#[derive(Debug, Error)]
pub enum RedisStoreError {
    /// The configured endpoint is not a usable Redis URL.
    #[error("invalid store endpoint '{url}': {reason}")]
    InvalidEndpoint { url: String, reason: String },

    /// The Redis client reported an error.
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),
}
