//! tether-core: session, transport, and routing primitives for tether
//!
//! This crate bridges a stateless request/response transport with a
//! server-push streaming channel, correlating both to one logical session:
//!
//! - **Sessions** - [`SessionId`], lifecycle state, and the
//!   [`SessionManager`] that opens sessions and wires their teardown
//! - **Transport** - [`StreamTransport`], the owner of one push channel's
//!   write and close lifecycle
//! - **Registry** - [`SessionRegistry`], the process-local authority on
//!   which transports are reachable from this instance
//! - **Store** - the [`SessionStore`] contract for the shared TTL-keyed
//!   existence record, with [`MemorySessionStore`] as the in-process
//!   implementation
//! - **Routing** - [`MessageRouter`], which validates a call against the
//!   store, resolves the transport locally, and forwards the payload
//!
//! A session is known fleet-wide through the shared store but reachable
//! only on the instance whose registry holds its transport. A call landing
//! anywhere else fails with [`RouterError::TransportUnreachable`]: the
//! cross-instance mismatch is an expected outcome, reported distinctly
//! from an expired session.

pub mod endpoint;
pub mod registry;
pub mod router;
pub mod session;
pub mod sessions;
pub mod store;
pub mod transport;

// Re-export key types for convenience
pub use endpoint::{ProtocolEndpoint, ProtocolError};
pub use registry::{RegistryError, SessionRegistry};
pub use router::{MessageRouter, RouterError, RouterOutcome};
pub use session::{CloseReason, SessionId, SessionState};
pub use sessions::{OpenSession, SessionConfig, SessionManager};
pub use store::{MemorySessionStore, SessionStore, StoreError};
pub use transport::{Frame, ForwardError, StreamTransport, TeardownFn, TransportWriteError};
