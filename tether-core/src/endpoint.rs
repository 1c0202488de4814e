//! The application handler seam.
//!
//! A [`ProtocolEndpoint`] is the opaque peer that consumes protocol
//! messages and produces push frames. The router hands it every inbound
//! call together with the session's transport, so the endpoint can push
//! frames back down the channel while the call is in flight or later.

use async_trait::async_trait;
use bytes::Bytes;
use serde_json::Value;
use thiserror::Error;

use crate::transport::StreamTransport;

/// Errors surfaced by an endpoint while handling a message.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The payload could not be understood by the handler.
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    /// The handler failed while processing the message.
    #[error("handler error: {0}")]
    Handler(String),
}

/// Application-level consumer of protocol messages.
///
/// One required inbound operation. An endpoint failure fails the call that
/// carried the message but never tears down the session.
#[async_trait]
pub trait ProtocolEndpoint: Send + Sync {
    /// Handle one inbound protocol message for the session owning
    /// `transport`. Returns an optional synchronous acknowledgment payload
    /// to relay to the caller.
    async fn handle(
        &self,
        transport: &StreamTransport,
        payload: Bytes,
    ) -> Result<Option<Value>, ProtocolError>;
}
