//! Session identity and lifecycle types.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque identifier for one session.
///
/// Generated at stream-open time. Unique within the generating process by
/// construction; uniqueness across instances rests on UUID entropy.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Generate a fresh session id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for SessionId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Lifecycle state of a session's transport.
///
/// `Open` while the push channel is writable and registered, `Closing` once
/// teardown has been triggered, `Closed` once teardown has completed and
/// both the local and shared records have been cleaned up (or left to TTL
/// expiry). `Closed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Push channel writable, transport registered.
    Open,
    /// Teardown triggered, cleanup in flight.
    Closing,
    /// Teardown complete.
    Closed,
}

/// Why a transport was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    /// The endpoint or the embedding application asked for the close.
    Explicit,
    /// A push write failed; the peer is gone or too slow.
    WriteFailure,
    /// The underlying push connection's consumer went away.
    PeerDisconnected,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_unique() {
        let a = SessionId::generate();
        let b = SessionId::generate();
        assert_ne!(a, b);
    }

    #[test]
    fn session_id_round_trips_through_str() {
        let id = SessionId::from("abc-123");
        assert_eq!(id.as_str(), "abc-123");
        assert_eq!(id.to_string(), "abc-123");
    }

    #[test]
    fn session_id_serializes_transparently() {
        let id = SessionId::from("s1");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"s1\"");
    }
}
