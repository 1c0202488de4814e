//! tether-redis: Redis-backed shared session store
//!
//! Implements [`tether_core::SessionStore`] on top of Redis so that every
//! process instance sees the same session-existence records. Expiry rides
//! on Redis key TTLs; there is no sweeper.

mod config;
mod error;
mod store;

pub use config::{DEFAULT_KEY_PREFIX, RedisConfig};
pub use error::RedisStoreError;
pub use store::RedisSessionStore;
