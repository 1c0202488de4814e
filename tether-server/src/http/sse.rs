//! Stream-open handler: one SSE response per session.

use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::Json;
use futures::StreamExt;
use futures::stream;
use serde_json::{Value, json};
use tokio_stream::wrappers::ReceiverStream;
use tracing::error;

use tether_core::Frame;

use crate::AppState;

/// Path clients POST protocol messages to, advertised on stream open.
pub const MESSAGES_PATH: &str = "/messages";

/// GET /sse - open the push channel for a new session
///
/// The first frame is an `endpoint` event telling the client where to POST
/// its calls; everything after that is protocol frames until teardown.
/// Dropping the response (peer disconnect) tears the session down through
/// the transport's disconnect watch.
pub async fn open_stream(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, (StatusCode, Json<Value>)> {
    let session = state.sessions.open_session().await.map_err(|e| {
        error!(error = %e, "failed to open session");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": "Failed to open session"})),
        )
    })?;

    let endpoint_frame = Frame::named(
        "endpoint",
        format!("{}?sessionId={}", MESSAGES_PATH, session.id),
    );

    let frames = ReceiverStream::new(session.frames).map(frame_to_event);
    let stream = stream::once(async move { frame_to_event(endpoint_frame) }).chain(frames);

    let sse = Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(state.sse_keep_alive())
            .text("keep-alive"),
    );
    Ok(([(header::CACHE_CONTROL, "no-cache")], sse))
}

fn frame_to_event(frame: Frame) -> Result<Event, Infallible> {
    let mut event = Event::default().data(frame.data);
    if let Some(name) = frame.event {
        event = event.event(name);
    }
    Ok(event)
}
