//! WebSocket upgrade handler for live session observers.
//!
//! Handles the HTTP → WebSocket upgrade and manages the connection lifecycle:
//! 1. Validate the session id
//! 2. Upgrade to WebSocket
//! 3. Register the observer with the gateway
//! 4. Forward published messages (and pongs) until disconnect or eviction
//! 5. Unregister the observer

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    http::StatusCode,
    response::Response,
    routing::get,
    Router,
};
use futures::{stream::SplitSink, SinkExt, StreamExt};
use tokio::sync::mpsc;

use crate::adapters::http::ErrorResponse;
use crate::application::{ObserverConnection, SessionGateway};
use crate::domain::foundation::{ObserverId, SessionId, Timestamp};

use super::messages::{ClientMessage, ConnectedMessage, PongMessage, ServerMessage};

/// Capacity of the per-connection control queue (pongs).
const CONTROL_BUFFER: usize = 8;

/// State required for WebSocket handling.
#[derive(Clone)]
pub struct WebSocketState {
    pub gateway: Arc<SessionGateway>,
}

impl WebSocketState {
    pub fn new(gateway: Arc<SessionGateway>) -> Self {
        Self { gateway }
    }
}

/// Handle WebSocket upgrade requests for a session.
///
/// Route: `GET /api/ws/:session_id`
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Path(session_id): Path<String>,
    State(state): State<WebSocketState>,
) -> Response {
    let session_id: SessionId = match session_id.parse() {
        Ok(id) => id,
        Err(e) => {
            tracing::debug!("Rejected observer upgrade: {}", e);
            return ErrorResponse::invalid_format("Invalid session_id")
                .with_details(serde_json::json!({ "field": e.field() }))
                .into_response_with(StatusCode::UNPROCESSABLE_ENTITY);
        }
    };

    ws.on_upgrade(move |socket| handle_socket(socket, session_id, state))
}

/// Handle an established WebSocket connection.
///
/// Runs for the lifetime of the connection. The send side ends when the
/// registry evicts the observer (its event queue closes) or a write fails;
/// the receive side ends on a close frame or transport error. Either way
/// the observer is unregistered before returning.
async fn handle_socket(socket: WebSocket, session_id: SessionId, state: WebSocketState) {
    let (mut sender, mut receiver) = socket.split();

    let ObserverConnection {
        subscription,
        mut events,
    } = state.gateway.connect_observer(&session_id).await;
    let observer_id = subscription.observer_id;

    let connected = ServerMessage::Connected(ConnectedMessage {
        session_id: session_id.to_string(),
        observer_id: observer_id.to_string(),
        timestamp: Timestamp::now().to_rfc3339(),
    });

    if let Err(e) = send_message(&mut sender, &connected).await {
        tracing::debug!(observer_id = %observer_id, "Failed to send connected message: {}", e);
        state.gateway.disconnect_observer(&subscription).await;
        return;
    }

    let (control_tx, mut control_rx) = mpsc::channel::<ServerMessage>(CONTROL_BUFFER);

    // Forward published events and control replies to the client
    let mut send_task = tokio::spawn(async move {
        loop {
            let msg = tokio::select! {
                event = events.recv() => match event {
                    Some(event) => ServerMessage::from(event),
                    None => {
                        tracing::debug!(observer_id = %observer_id, "Event queue closed");
                        break;
                    }
                },
                Some(reply) = control_rx.recv() => reply,
            };

            if let Err(e) = send_message(&mut sender, &msg).await {
                tracing::debug!(
                    observer_id = %observer_id,
                    "Send error, closing connection: {}",
                    e
                );
                break;
            }
        }
        let _ = sender.close().await;
    });

    // Handle incoming frames from the client
    let mut recv_task = tokio::spawn(async move {
        while let Some(result) = receiver.next().await {
            match result {
                Ok(Message::Text(text)) => handle_client_text(observer_id, &text, &control_tx),
                Ok(Message::Binary(_)) => {
                    tracing::debug!(observer_id = %observer_id, "Ignoring binary frame");
                }
                Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {
                    // Protocol-level keepalive, answered by axum
                }
                Ok(Message::Close(_)) => {
                    tracing::debug!(observer_id = %observer_id, "Client sent close frame");
                    break;
                }
                Err(e) => {
                    tracing::debug!(observer_id = %observer_id, "Receive error: {}", e);
                    break;
                }
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    state.gateway.disconnect_observer(&subscription).await;
}

fn handle_client_text(
    observer_id: ObserverId,
    text: &str,
    control_tx: &mpsc::Sender<ServerMessage>,
) {
    tracing::debug!(observer_id = %observer_id, "Received from observer: {}", text);

    if let Ok(ClientMessage::Ping) = serde_json::from_str::<ClientMessage>(text) {
        let pong = ServerMessage::Pong(PongMessage {
            timestamp: Timestamp::now().to_rfc3339(),
        });
        if control_tx.try_send(pong).is_err() {
            tracing::debug!(observer_id = %observer_id, "Dropping pong, control queue full");
        }
    }
}

/// Send a JSON frame over the WebSocket.
async fn send_message(
    sender: &mut SplitSink<WebSocket, Message>,
    msg: &ServerMessage,
) -> Result<(), axum::Error> {
    let json = serde_json::to_string(msg).map_err(axum::Error::new)?;
    sender.send(Message::Text(json)).await
}

/// Create the router for the observer endpoint, `GET /api/ws/:session_id`.
pub fn websocket_router(state: WebSocketState) -> Router {
    Router::new()
        .route("/api/ws/:session_id", get(ws_handler))
        .with_state(state)
}
