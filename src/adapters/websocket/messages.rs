//! WebSocket frame types for live session observers.
//!
//! Server → client frames are JSON objects of the form
//! `{"event": "<name>", "data": {...}}`. The only client → server frame the
//! relay understands is `{"type": "ping"}`; any other text is logged and
//! otherwise ignored.

use serde::{Deserialize, Serialize};

use crate::domain::message::MessageView;
use crate::ports::ObserverEvent;

// ============================================
// Server → Client Frames
// ============================================

/// All frames the server sends to an observer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Sent once, right after the observer is registered.
    Connected(ConnectedMessage),

    /// A message for the observed session was accepted.
    NewMessage(MessageView),

    /// Reply to a client ping.
    Pong(PongMessage),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConnectedMessage {
    pub session_id: String,
    pub observer_id: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PongMessage {
    pub timestamp: String,
}

impl From<ObserverEvent> for ServerMessage {
    fn from(event: ObserverEvent) -> Self {
        match event {
            ObserverEvent::NewMessage(view) => ServerMessage::NewMessage((*view).clone()),
        }
    }
}

// ============================================
// Client → Server Frames
// ============================================

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Heartbeat request.
    Ping,
}
