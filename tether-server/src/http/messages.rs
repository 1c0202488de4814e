//! Call handler: one protocol message in, one acknowledgment out.

use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, error};

use tether_core::RouterError;

use crate::AppState;

/// Query parameters for POST /messages
#[derive(Debug, Deserialize)]
pub struct CallParams {
    /// Session the message belongs to
    #[serde(rename = "sessionId")]
    pub session_id: Option<String>,
}

/// POST /messages?sessionId=<id> - route one protocol message
///
/// `200` with the handler's payload (or a bare success marker) when the
/// message was delivered; `400` when the session id is missing, unknown,
/// expired, or reachable only from another instance; `500` when the store
/// cannot be consulted or the handler fails.
pub async fn post_message(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CallParams>,
    body: Bytes,
) -> Response {
    let session_id = params.session_id.unwrap_or_default();

    match state.router.route(&session_id, body).await {
        Ok(outcome) => {
            let payload = outcome.ack.unwrap_or_else(|| json!({"success": true}));
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(e) => error_response(e).into_response(),
    }
}

/// Map a routing failure to a client-visible status and body.
fn error_response(error: RouterError) -> (StatusCode, Json<Value>) {
    let (status, message) = match &error {
        RouterError::Validation => (StatusCode::BAD_REQUEST, "Missing sessionId parameter"),
        RouterError::SessionExpired(_) => (StatusCode::BAD_REQUEST, "Invalid or expired session ID"),
        RouterError::TransportUnreachable(_) => (
            StatusCode::BAD_REQUEST,
            "Session transport not available on this instance",
        ),
        RouterError::Protocol(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Message handler failed"),
        RouterError::Store(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Session validation unavailable",
        ),
    };

    if status.is_server_error() {
        error!(error = %error, "call failed");
    } else {
        debug!(error = %error, "call rejected");
    }

    (status, Json(json!({"error": message})))
}
