//! Per-connection task pair
//!
//! Each registered client is served by two tasks: the connection handler,
//! which owns the write half of the socket and delivers messages arriving
//! on the client's sink, and the liveness detector, which blocks reading
//! the socket and tears the registration down on the first read failure.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::{mpsc, oneshot};

use crate::hub::{BroadcastHub, SinkId};

/// First frame sent to every client, before any broadcast message
pub const WELCOME_MESSAGE: &str = "[you are connected]";

/// Connection handler states
///
/// The transport handshake precedes the handler (an upgrade failure means
/// no sink is ever created), so the handler starts in `Welcoming`.
/// `Terminated` is absorbing: no further transport or registry operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConnectionState {
    /// Sink registered, welcome frame not yet delivered
    Welcoming,
    /// Relaying broadcast messages to the client
    Serving,
    /// Handler finished; registry cleanup is the detector's responsibility
    Terminated,
}

/// Drive one upgraded WebSocket connection to completion
///
/// Registers a sink, spawns the paired liveness detector, and runs the
/// handler until termination. Returns only after both tasks of the pair
/// have finished, so a sink is fully retired by the time this completes.
pub(crate) async fn run_connection(socket: WebSocket, hub: Arc<BroadcastHub>) {
    let (writer, reader) = socket.split();

    let (id, conduit) = hub.register().await;
    let (death_tx, death_rx) = oneshot::channel();

    let detector = tokio::spawn(liveness_detector(reader, Arc::clone(&hub), id, death_tx));

    connection_handler(writer, conduit, death_rx, id).await;

    if detector.await.is_err() {
        tracing::warn!(sink = %id, "Liveness detector aborted abnormally");
    }

    tracing::info!(sink = %id, "Connection closed");
}

/// The connection handler: welcome the client, then relay sink messages
/// until a transport write fails or the death signal arrives.
async fn connection_handler(
    mut writer: SplitSink<WebSocket, Message>,
    mut conduit: mpsc::Receiver<String>,
    mut death_rx: oneshot::Receiver<()>,
    id: SinkId,
) {
    let mut state = ConnectionState::Welcoming;

    loop {
        state = match state {
            ConnectionState::Welcoming => welcome(&mut writer, id).await,
            ConnectionState::Serving => {
                serve_next(&mut writer, &mut conduit, &mut death_rx, id).await
            }
            ConnectionState::Terminated => break,
        };
    }
}

/// Deliver the welcome frame, the client's first payload
async fn welcome(writer: &mut SplitSink<WebSocket, Message>, id: SinkId) -> ConnectionState {
    if writer.send(Message::Text(WELCOME_MESSAGE.into())).await.is_ok() {
        ConnectionState::Serving
    } else {
        // Transport unusable before the first frame; the detector will
        // observe the same failure and clean up
        tracing::debug!(sink = %id, "Welcome frame rejected");
        ConnectionState::Terminated
    }
}

/// Wait for the next serving event: a message on the sink conduit, or the
/// death signal.
async fn serve_next(
    writer: &mut SplitSink<WebSocket, Message>,
    conduit: &mut mpsc::Receiver<String>,
    death_rx: &mut oneshot::Receiver<()>,
    id: SinkId,
) -> ConnectionState {
    tokio::select! {
        message = conduit.recv() => match message {
            Some(message) => {
                if writer.send(Message::Text(message.into())).await.is_err() {
                    tracing::debug!(sink = %id, "Transport write failed");
                    ConnectionState::Terminated
                } else {
                    tracing::trace!(sink = %id, "Message delivered");
                    ConnectionState::Serving
                }
            }
            // Conduit closed: the sink has already left the registry
            None => ConnectionState::Terminated,
        },
        _ = death_rx => {
            // Terminate immediately, abandoning any message still pending
            // on the conduit
            tracing::debug!(sink = %id, "Death signal received");
            ConnectionState::Terminated
        }
    }
}

/// The liveness detector: block reading the transport, discarding content.
/// On the first read failure, remove the sink from the registry and then
/// raise the death signal for the paired handler. No retries.
async fn liveness_detector(
    mut reader: SplitStream<WebSocket>,
    hub: Arc<BroadcastHub>,
    id: SinkId,
    death_tx: oneshot::Sender<()>,
) {
    loop {
        match reader.next().await {
            Some(Ok(_)) => continue,
            Some(Err(e)) => {
                tracing::debug!(sink = %id, error = %e, "Transport read failed");
                break;
            }
            None => {
                tracing::debug!(sink = %id, "Transport closed by peer");
                break;
            }
        }
    }

    // Removal strictly precedes the death signal: the handler must never
    // observe death while its sink is still reachable by a fan-out pass
    drop(reader);
    hub.deregister(id).await;
    let _ = death_tx.send(());
}
