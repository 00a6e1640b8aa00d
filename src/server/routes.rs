//! Route table and broadcast ingress
//!
//! `PUT /broadcast` validates and enqueues a broadcast request;
//! `GET /register` upgrades to a WebSocket and hands the socket to the
//! connection module. Any other method on `/broadcast` is answered with
//! 405 by the method router.

use std::sync::Arc;

use axum::extract::ws::WebSocketUpgrade;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, put};
use axum::Router;
use serde::Deserialize;

use crate::hub::BroadcastHub;
use crate::server::connection;

/// Query parameters for a broadcast request
#[derive(Debug, Deserialize)]
struct BroadcastParams {
    message: Option<String>,
}

/// Build the router over a shared hub
pub fn router(hub: Arc<BroadcastHub>) -> Router {
    Router::new()
        .route("/broadcast", put(broadcast))
        .route("/register", get(register))
        .with_state(hub)
}

/// PUT /broadcast?message=<text>
///
/// Missing or empty `message` is a client error and never touches the
/// queue. A valid request enqueues exactly once, suspending while the
/// queue is at capacity; 200 with an empty body means enqueued, nothing
/// more — the caller learns nothing about deliveries.
async fn broadcast(
    State(hub): State<Arc<BroadcastHub>>,
    Query(params): Query<BroadcastParams>,
) -> Response {
    let message = match params.message {
        Some(message) if !message.is_empty() => message,
        _ => return (StatusCode::BAD_REQUEST, "Missing message").into_response(),
    };

    tracing::info!(len = message.len(), "Broadcast request received");

    match hub.publish(message).await {
        Ok(()) => StatusCode::OK.into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to enqueue broadcast");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// GET /register
///
/// WebSocket upgrade endpoint; any origin is accepted. A failed upgrade is
/// answered with a client error before any sink exists. On success the
/// socket is driven by the per-connection task pair.
async fn register(State(hub): State<Arc<BroadcastHub>>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| connection::run_connection(socket, hub))
}
