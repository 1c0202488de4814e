//! Demo protocol endpoint for standalone runs

use async_trait::async_trait;
use bytes::Bytes;
use serde_json::Value;
use tracing::debug;

use tether_core::{Frame, ProtocolEndpoint, ProtocolError, StreamTransport};

/// Echo endpoint: validates the payload as JSON, relays it back down the
/// session's push channel, and acknowledges with the bare success marker.
///
/// Stands in for a real protocol handler so `tether serve` can be
/// exercised end to end with nothing but curl.
pub struct EchoEndpoint;

#[async_trait]
impl ProtocolEndpoint for EchoEndpoint {
    async fn handle(
        &self,
        transport: &StreamTransport,
        payload: Bytes,
    ) -> Result<Option<Value>, ProtocolError> {
        let message: Value = serde_json::from_slice(&payload)
            .map_err(|e| ProtocolError::InvalidPayload(e.to_string()))?;

        debug!(session_id = %transport.id(), "echoing message");
        transport
            .send(Frame::message(message.to_string()))
            .await
            .map_err(|e| ProtocolError::Handler(e.to_string()))?;

        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tether_core::SessionId;

    use super::*;

    #[tokio::test]
    async fn echoes_json_message_down_the_channel() {
        let (transport, mut rx) =
            StreamTransport::open(SessionId::generate(), Arc::new(EchoEndpoint), 4);

        let ack = transport
            .forward(Bytes::from_static(br#"{"hello":"world"}"#))
            .await
            .unwrap();

        assert!(ack.is_none());
        let frame = rx.recv().await.unwrap();
        assert_eq!(frame.data, r#"{"hello":"world"}"#);
    }

    #[tokio::test]
    async fn rejects_non_json_payload() {
        let (transport, _rx) =
            StreamTransport::open(SessionId::generate(), Arc::new(EchoEndpoint), 4);

        let result = transport.forward(Bytes::from_static(b"not json")).await;

        assert!(result.is_err());
    }
}
