//! Stream transport: owns one push channel's write and close lifecycle.

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Instant;

use bytes::Bytes;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tokio::sync::{Mutex, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::endpoint::ProtocolEndpoint;
use crate::session::{CloseReason, SessionId, SessionState};

/// One outbound push unit: an optional event name plus a data payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    /// Event name, when the frame is not a plain protocol message.
    pub event: Option<String>,
    /// UTF-8 payload.
    pub data: String,
}

impl Frame {
    /// A plain protocol message frame.
    pub fn message(data: impl Into<String>) -> Self {
        Self {
            event: None,
            data: data.into(),
        }
    }

    /// A named event frame.
    pub fn named(event: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            event: Some(event.into()),
            data: data.into(),
        }
    }
}

/// Errors from pushing a frame down the channel.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransportWriteError {
    /// The push channel is already closed.
    #[error("push channel is closed")]
    Closed,

    /// The consumer's buffer rejected the write; the peer is slow or gone.
    #[error("push channel buffer is full")]
    BufferFull,
}

/// Errors from forwarding an inbound message to the endpoint.
#[derive(Debug, Error)]
pub enum ForwardError {
    /// The transport is closing or closed; the message was not delivered.
    #[error("transport is closed")]
    Closed,

    /// The endpoint rejected or failed on the message.
    #[error(transparent)]
    Endpoint(#[from] crate::endpoint::ProtocolError),
}

/// Teardown callback registered on a transport. Fired exactly once, on the
/// first close, and awaited before `close` returns.
pub type TeardownFn = Box<dyn FnOnce(CloseReason) -> BoxFuture<'static, ()> + Send>;

const STATE_OPEN: u8 = 0;
const STATE_CLOSING: u8 = 1;
const STATE_CLOSED: u8 = 2;

/// Owns one push channel's write and close lifecycle.
///
/// The outbound side is a bounded mpsc channel: concurrent `send`s
/// serialize on it, and a full buffer rejects the write instead of
/// blocking. `close` is idempotent; the first caller runs the registered
/// teardown callback to completion before returning, so registry and store
/// cleanup is never skipped.
pub struct StreamTransport {
    id: SessionId,
    endpoint: Arc<dyn ProtocolEndpoint>,
    opened_at: Instant,
    state: AtomicU8,
    sender: Mutex<Option<mpsc::Sender<Frame>>>,
    teardown: Mutex<Option<TeardownFn>>,
    cancel: CancellationToken,
}

impl StreamTransport {
    /// Open a transport for `id` with a frame buffer of `buffer` slots.
    ///
    /// Returns the transport and the consumer end of its frame channel.
    pub fn open(
        id: SessionId,
        endpoint: Arc<dyn ProtocolEndpoint>,
        buffer: usize,
    ) -> (Arc<Self>, mpsc::Receiver<Frame>) {
        let (tx, rx) = mpsc::channel(buffer);
        let transport = Arc::new(Self {
            id,
            endpoint,
            opened_at: Instant::now(),
            state: AtomicU8::new(STATE_OPEN),
            sender: Mutex::new(Some(tx)),
            teardown: Mutex::new(Some(Box::new(|_| Box::pin(async {})))),
            cancel: CancellationToken::new(),
        });
        (transport, rx)
    }

    /// The session this transport belongs to.
    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        match self.state.load(Ordering::SeqCst) {
            STATE_OPEN => SessionState::Open,
            STATE_CLOSING => SessionState::Closing,
            _ => SessionState::Closed,
        }
    }

    /// Whether teardown has been triggered.
    pub fn is_closed(&self) -> bool {
        self.state.load(Ordering::SeqCst) != STATE_OPEN
    }

    /// Replace the teardown callback. Must be called before the transport
    /// is shared; the callback runs exactly once, on the first close.
    pub async fn set_teardown(&self, teardown: TeardownFn) {
        *self.teardown.lock().await = Some(teardown);
    }

    /// Push a frame to the outbound channel.
    ///
    /// A failed write means the peer is gone or hopelessly behind, so it
    /// triggers teardown of the session before the error is returned.
    pub async fn send(&self, frame: Frame) -> Result<(), TransportWriteError> {
        let result = {
            let guard = self.sender.lock().await;
            match guard.as_ref() {
                None => Err(TransportWriteError::Closed),
                Some(tx) => tx.try_send(frame).map_err(|e| match e {
                    mpsc::error::TrySendError::Full(_) => TransportWriteError::BufferFull,
                    mpsc::error::TrySendError::Closed(_) => TransportWriteError::Closed,
                }),
            }
        };

        if let Err(ref e) = result {
            warn!(session_id = %self.id, error = %e, "push write failed");
            self.close(CloseReason::WriteFailure).await;
        }
        result
    }

    /// Hand one inbound protocol message to the attached endpoint.
    ///
    /// Rejected immediately once the transport is closing; a call racing
    /// its session's teardown is never queued.
    pub async fn forward(&self, payload: Bytes) -> Result<Option<Value>, ForwardError> {
        if self.is_closed() {
            return Err(ForwardError::Closed);
        }
        let ack = self.endpoint.handle(self, payload).await?;
        Ok(ack)
    }

    /// Close the transport.
    ///
    /// Idempotent. The first caller closes the channel (unblocking the
    /// consumer), runs the teardown callback to completion, and only then
    /// marks the transport closed. Later callers return immediately.
    pub async fn close(&self, reason: CloseReason) {
        if self
            .state
            .compare_exchange(STATE_OPEN, STATE_CLOSING, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return;
        }
        debug!(
            session_id = %self.id,
            ?reason,
            age_secs = self.opened_at.elapsed().as_secs(),
            "closing transport"
        );

        self.sender.lock().await.take();
        self.cancel.cancel();

        let teardown = self.teardown.lock().await.take();
        if let Some(teardown) = teardown {
            teardown(reason).await;
        }
        self.state.store(STATE_CLOSED, Ordering::SeqCst);
    }

    /// Watch for the frame consumer going away and tear down when it does.
    ///
    /// The consumer end of the channel is dropped when the peer disconnects;
    /// that drop is the disconnect signal. An explicit close cancels the
    /// watch instead.
    pub async fn spawn_disconnect_watch(self: &Arc<Self>) {
        let sender = { self.sender.lock().await.clone() };
        let Some(sender) = sender else { return };
        let cancel = self.cancel.clone();
        let transport = Arc::clone(self);
        tokio::spawn(async move {
            tokio::select! {
                _ = sender.closed() => {}
                _ = cancel.cancelled() => return,
            }
            drop(sender);
            transport.close(CloseReason::PeerDisconnected).await;
        });
    }
}
