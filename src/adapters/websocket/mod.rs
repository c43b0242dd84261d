//! WebSocket adapters for live session observers.
//!
//! # Architecture
//!
//! ```text
//! POST /api/messages
//!         │
//!         ▼
//! ┌───────────────────────────────────────────────┐
//! │ SessionGateway (validate → store → fan out)   │
//! └───────────────────────────────────────────────┘
//!         │ fanout(session_id, event)
//!         ▼
//! ┌───────────────────────────────────────────────┐
//! │ SubscriptionRegistry                          │
//! │   s1: [obs-a, obs-b]     s2: [obs-c]          │
//! └───────────────────────────────────────────────┘
//!         │ per-observer bounded queue
//!         ▼
//! ┌───────────────────────────────────────────────┐
//! │ Connection task (handler) → WebSocket frames  │
//! └───────────────────────────────────────────────┘
//! ```
//!
//! # Components
//!
//! - [`messages`] - WebSocket frame types
//! - [`rooms`] - Subscription registry keyed by session
//! - [`handler`] - Axum WebSocket upgrade handler and connection task

pub mod handler;
pub mod messages;
pub mod rooms;

pub use handler::{websocket_router, ws_handler, WebSocketState};
pub use messages::{ClientMessage, ConnectedMessage, PongMessage, ServerMessage};
pub use rooms::SubscriptionRegistry;
